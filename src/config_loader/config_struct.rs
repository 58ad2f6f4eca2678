use serde::Deserialize;
use crate::model::{OrderBy, OrderDirection};

#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    pub bind: String,   // e.g. "127.0.0.1:5244"
}

#[derive(Debug, Deserialize)]
pub struct HttpSetting {
    pub timeout_secs: u64,  // per upstream request, default to 30 seconds
}

#[derive(Debug, Clone, Deserialize)]
pub struct Pan123Config {
    pub name: String,           // mount name, also the root folder's display name
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub root_folder: String,    // blank means the drive root
    pub order_by: OrderBy,
    pub order_direction: OrderDirection,
    pub api_base: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "drive_type")]
pub enum DriveConfig {
    #[serde(rename = "123pan")]
    Pan123(Pan123Config),
}

impl DriveConfig {
    pub fn name(&self) -> &str {
        match self {
            DriveConfig::Pan123(config) => &config.name,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ConfigFile {
    pub server: Option<ServerConfig>,   // when not provided, bind to the default address
    pub http: Option<HttpSetting>,      // when not provided, default timeout is used
    pub drives: Vec<DriveConfig>,
}
