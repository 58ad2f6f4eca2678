pub mod config_struct;
pub mod load_config_file;

use std::time::Duration;
use crate::config_loader::config_struct::DriveConfig;

pub const CONFIG_PATH: &str = "config.json";
pub const DEFAULT_BIND: &str = "127.0.0.1:5244";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub struct Config {
    pub bind: String,
    pub request_timeout: Duration,
    pub drives: Vec<DriveConfig>,
}
