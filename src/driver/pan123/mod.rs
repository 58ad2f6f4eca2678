//! Driver for the 123Pan web drive.
//!
//! Listings are fetched per directory and cached by (path, account). Download
//! links take two hops: a signed-info exchange that returns a gateway url, and
//! a redirect probe against that gateway that reveals the direct url.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt};
use reqwest::header::{HeaderMap, ORIGIN};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use crate::config_loader::config_struct::Pan123Config;
use crate::driver::error::{DriverError, Result};
use crate::driver::{CloudDriver, ConfigItem, DriverInfo, FileStream, ItemType, StorageDriver};
use crate::model::Account;
use crate::service::listing_cache::ListingCache;
use crate::vfs::path::{normalize, split};
use crate::vfs::{File, FileType, Link};

pub mod api;
pub mod types;

use api::{Pan123Api, API_BASE};
use types::RawEntry;

pub const DRIVER_NAME: &str = "123Pan";

pub struct Pan123 {
    api: Pan123Api,
    cache: ListingCache<RawEntry>,
}

impl Pan123 {
    pub fn with_base_url(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        Ok(Pan123 {
            api: Pan123Api::new(base_url, timeout)?,
            cache: ListingCache::new(),
        })
    }

    /// Listing cache, exposed so an external collaborator can invalidate it.
    pub fn cache(&self) -> &ListingCache<RawEntry> {
        &self.cache
    }

    fn root_file(account: &Account) -> File {
        File {
            id: account.root_folder.clone(),
            name: account.name.clone(),
            size: 0,
            kind: FileType::Folder,
            driver: DRIVER_NAME.to_owned(),
            updated_at: account.updated_at,
            url: None,
        }
    }

    /// Runs `call` with the session token. A provider `401` triggers one
    /// refresh and one more attempt; a second `401` is returned as is.
    async fn authorized<T, F, Fut>(&self, account: &Account, cancel: &CancellationToken, mut call: F) -> Result<T>
    where
        F: FnMut(String) -> Fut + Send,
        Fut: Future<Output = Result<T>> + Send,
        T: Send,
    {
        let mut token = account.session.token(&self.api, cancel).await?;
        let mut refreshed = false;
        loop {
            match call(token.clone()).await {
                Err(DriverError::AuthExpired) if !refreshed => {
                    warn!(account = %account.id, "session expired, signing in again");
                    token = account.session.refresh(&token, &self.api, cancel).await?;
                    refreshed = true;
                }
                result => return result,
            }
        }
    }

    /// Raw entries of the directory at `path`, from cache or the provider.
    fn list_raw<'a>(
        &'a self,
        path: &'a str,
        account: &'a Account,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, Result<Arc<Vec<RawEntry>>>> {
        async move {
            let path = normalize(path);
            let dir_path = path.as_str();
            self.cache.get_or_fetch(dir_path, account.id, cancel, move || async move {
                let dir = self.resolve_path(dir_path, account, cancel).await?;
                if !dir.is_dir() {
                    return Err(DriverError::PathNotFound(dir_path.to_owned()));
                }
                let dir_id = dir.id.as_str();
                self.authorized(account, cancel, move |token| {
                    self.api.file_list(token, dir_id, account.order_by, account.order_direction, cancel)
                }).await
            }).await
        }.boxed()
    }

    async fn find_raw(&self, path: &str, account: &Account, cancel: &CancellationToken) -> Result<RawEntry> {
        let path = normalize(path);
        let (parent, name) = split(&path).ok_or_else(|| DriverError::PathNotFound(path.clone()))?;
        let siblings = self.list_raw(&parent, account, cancel).await?;
        siblings.iter()
            .find(|entry| entry.file_name == name)
            .cloned()
            .ok_or(DriverError::PathNotFound(path))
    }

    async fn resolve_path(&self, path: &str, account: &Account, cancel: &CancellationToken) -> Result<File> {
        let path = normalize(path);
        if path == "/" {
            return Ok(Self::root_file(account));
        }
        let entry = self.find_raw(&path, account, cancel).await?;
        Ok(entry.to_file())
    }
}

impl CloudDriver<Pan123Config> for Pan123 {
    fn new(config: &Pan123Config, timeout: Duration) -> Result<Self> {
        let base_url = config.api_base.clone().unwrap_or_else(|| API_BASE.to_owned());
        Self::with_base_url(base_url, timeout)
    }
}

#[async_trait]
impl StorageDriver for Pan123 {
    fn info(&self) -> DriverInfo {
        DriverInfo {
            name: DRIVER_NAME,
            only_proxy: false,
        }
    }

    fn items(&self) -> Vec<ConfigItem> {
        vec![
            ConfigItem {
                name: "username",
                label: "username",
                kind: ItemType::String,
                required: true,
                description: "account username/phone number",
            },
            ConfigItem {
                name: "password",
                label: "password",
                kind: ItemType::String,
                required: true,
                description: "account password",
            },
            ConfigItem {
                name: "root_folder",
                label: "root folder file_id",
                kind: ItemType::String,
                required: false,
                description: "",
            },
            ConfigItem {
                name: "order_by",
                label: "order_by",
                kind: ItemType::Select(&["name", "fileId", "updateAt", "createAt"]),
                required: true,
                description: "",
            },
            ConfigItem {
                name: "order_direction",
                label: "order_direction",
                kind: ItemType::Select(&["asc", "desc"]),
                required: true,
                description: "",
            },
        ]
    }

    async fn list_directory(&self, path: &str, account: &Account, cancel: &CancellationToken) -> Result<Vec<File>> {
        let raw = self.list_raw(path, account, cancel).await?;
        Ok(raw.iter().map(RawEntry::to_file).collect())
    }

    async fn resolve(&self, path: &str, account: &Account, cancel: &CancellationToken) -> Result<File> {
        self.resolve_path(path, account, cancel).await
    }

    async fn link(&self, path: &str, account: &Account, cancel: &CancellationToken) -> Result<Link> {
        let entry = self.find_raw(path, account, cancel).await?;
        if entry.is_folder() {
            return Err(DriverError::PathNotFound(normalize(path)));
        }
        let entry = &entry;
        let provisional = self.authorized(account, cancel, move |token| {
            self.api.download_info(token, entry, cancel)
        }).await?;
        let url = self.api.unwrap_redirect(&provisional, cancel).await?;
        debug!(file = %entry.file_name, "resolved download link");
        Ok(Link { url })
    }

    fn proxy(&self, headers: &mut HeaderMap) {
        headers.remove(ORIGIN);
    }

    async fn preview(&self, _path: &str, _account: &Account) -> Result<serde_json::Value> {
        Err(DriverError::NotSupported)
    }

    async fn make_dir(&self, _path: &str, _account: &Account) -> Result<()> {
        Err(DriverError::NotImplemented)
    }

    async fn move_entry(&self, _src: &str, _dst: &str, _account: &Account) -> Result<()> {
        Err(DriverError::NotImplemented)
    }

    async fn copy_entry(&self, _src: &str, _dst: &str, _account: &Account) -> Result<()> {
        Err(DriverError::NotImplemented)
    }

    async fn delete(&self, _path: &str, _account: &Account) -> Result<()> {
        Err(DriverError::NotImplemented)
    }

    async fn upload(&self, _file: FileStream, _account: &Account) -> Result<()> {
        Err(DriverError::NotImplemented)
    }
}
