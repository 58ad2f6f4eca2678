pub mod config_loader;
pub mod driver;
pub mod model;
pub mod request_handler;
pub mod service;
pub mod vfs;
