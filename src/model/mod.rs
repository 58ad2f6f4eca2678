use std::fmt::{Display, Formatter};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;
use crate::config_loader::config_struct::Pan123Config;
use crate::service::session::{Credentials, Session};

/// Provider default for "the drive root".
pub const DEFAULT_ROOT_FOLDER: &str = "0";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AccountId(Uuid);

impl AccountId {
    pub fn new() -> Self {
        AccountId(Uuid::new_v4())
    }
}

impl Default for AccountId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for AccountId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum OrderBy {
    #[serde(rename = "name")]
    Name,
    #[serde(rename = "fileId")]
    FileId,
    #[serde(rename = "updateAt")]
    UpdateAt,
    #[serde(rename = "createAt")]
    CreateAt,
}

impl OrderBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderBy::Name => "name",
            OrderBy::FileId => "fileId",
            OrderBy::UpdateAt => "updateAt",
            OrderBy::CreateAt => "createAt",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderDirection {
    Asc,
    Desc,
}

impl OrderDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderDirection::Asc => "asc",
            OrderDirection::Desc => "desc",
        }
    }
}

/// One configured drive account. Passed explicitly into every driver call.
pub struct Account {
    pub id: AccountId,
    pub name: String,
    pub root_folder: String,
    pub order_by: OrderBy,
    pub order_direction: OrderDirection,
    pub updated_at: DateTime<Utc>,
    pub session: Session,
}

impl Account {
    pub fn from_config(config: &Pan123Config) -> Self {
        let root_folder = match config.root_folder.trim() {
            "" => DEFAULT_ROOT_FOLDER.to_owned(),
            id => id.to_owned(),
        };
        Account {
            id: AccountId::new(),
            name: config.name.clone(),
            root_folder,
            order_by: config.order_by,
            order_direction: config.order_direction,
            updated_at: Utc::now(),
            session: Session::new(Credentials {
                username: config.username.clone(),
                password: config.password.clone(),
            }),
        }
    }
}
