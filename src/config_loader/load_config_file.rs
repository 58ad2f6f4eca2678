use std::error::Error;
use std::fs::File;
use std::path::Path;
use std::time::Duration;
use crate::config_loader::{Config, CONFIG_PATH, DEFAULT_BIND, DEFAULT_TIMEOUT_SECS};
use crate::config_loader::config_struct::ConfigFile;

pub fn load_config() -> Result<Config, Box<dyn Error>> {
    load_config_from(CONFIG_PATH)
}

pub fn load_config_from(path: impl AsRef<Path>) -> Result<Config, Box<dyn Error>> {
    let config_file = File::open(path)?;
    let config_file: ConfigFile = serde_json::from_reader(config_file)?;
    Ok(into_config(config_file))
}

fn into_config(config_file: ConfigFile) -> Config {
    // set default values for the optional sections
    let bind = match config_file.server {
        None => DEFAULT_BIND.to_owned(),
        Some(server) => server.bind,
    };
    let timeout_secs = match config_file.http {
        None => DEFAULT_TIMEOUT_SECS,
        Some(http) => http.timeout_secs,
    };
    Config {
        bind,
        request_timeout: Duration::from_secs(timeout_secs),
        drives: config_file.drives,
    }
}
