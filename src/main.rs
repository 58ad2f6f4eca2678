use std::collections::HashMap;
use std::io;
use std::time::Duration;
use actix_web::{web, App, HttpServer};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use driveway::config_loader::load_config_file::load_config;
use driveway::config_loader::Config;
use driveway::driver::load_mount;
use driveway::request_handler::{self, State};

fn load_mounts(config: &Config) -> HashMap<String, driveway::driver::Mount> {
    let mut mounts = HashMap::new();
    for drive in &config.drives {
        match load_mount(drive, config.request_timeout) {
            Ok(mount) => {
                info!(mount = drive.name(), driver = mount.driver.info().name, "mounted");
                mounts.insert(drive.name().to_owned(), mount);
            }
            Err(e) => {
                error!("Failed to create driver {}: {}", drive.name(), e);
            }
        }
    }
    mounts
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = load_config().map_err(|e| {
        error!("Failed to load config: {}", e);
        io::Error::new(io::ErrorKind::Other, e.to_string())
    })?;
    let mounts = load_mounts(&config);
    let client = reqwest::Client::builder()
        .connect_timeout(config.request_timeout.min(Duration::from_secs(10)))
        .build()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
    let state = web::Data::new(State { mounts, client });

    info!("listening on {}", config.bind);
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .configure(request_handler::configure)
    })
        .bind(config.bind.as_str())?
        .run()
        .await
}
