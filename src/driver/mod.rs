use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use tokio::io::AsyncRead;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use crate::config_loader::config_struct::DriveConfig;
use crate::driver::error::{DriverError, Result};
use crate::driver::pan123::Pan123;
use crate::model::Account;
use crate::vfs::{Browse, File, Link};

pub mod error;
pub mod pan123;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverInfo {
    pub name: &'static str,
    pub only_proxy: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemType {
    String,
    Select(&'static [&'static str]),
}

/// One account field a driver needs, as shown by an account editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigItem {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: ItemType,
    pub required: bool,
    pub description: &'static str,
}

pub struct FileStream {
    pub parent_path: String,
    pub name: String,
    pub size: u64,
    pub mime_type: String,
    pub reader: Box<dyn AsyncRead + Send + Unpin>,
}

/// Uniform contract every storage backend satisfies.
///
/// Operations that touch the network take the caller's cancellation token.
/// Mutations a backend cannot perform return `NotImplemented`.
#[async_trait]
pub trait StorageDriver: Send + Sync {
    fn info(&self) -> DriverInfo;

    fn items(&self) -> Vec<ConfigItem>;

    async fn list_directory(&self, path: &str, account: &Account, cancel: &CancellationToken) -> Result<Vec<File>>;

    async fn resolve(&self, path: &str, account: &Account, cancel: &CancellationToken) -> Result<File>;

    async fn link(&self, path: &str, account: &Account, cancel: &CancellationToken) -> Result<Link>;

    /// A leaf comes back with its url attached, a folder with its children.
    async fn browse(&self, path: &str, account: &Account, cancel: &CancellationToken) -> Result<Browse> {
        debug!(driver = self.info().name, path, "browse");
        let mut file = self.resolve(path, account, cancel).await?;
        if file.is_dir() {
            let children = self.list_directory(path, account, cancel).await?;
            return Ok(Browse::Folder(children));
        }
        let link = self.link(path, account, cancel).await?;
        file.url = Some(link.url);
        Ok(Browse::File(file))
    }

    /// Adjusts request headers before a proxied download is forwarded upstream.
    fn proxy(&self, headers: &mut HeaderMap);

    async fn preview(&self, path: &str, account: &Account) -> Result<serde_json::Value>;

    async fn make_dir(&self, path: &str, account: &Account) -> Result<()>;

    async fn move_entry(&self, src: &str, dst: &str, account: &Account) -> Result<()>;

    async fn copy_entry(&self, src: &str, dst: &str, account: &Account) -> Result<()>;

    async fn delete(&self, path: &str, account: &Account) -> Result<()>;

    async fn upload(&self, file: FileStream, account: &Account) -> Result<()>;
}

/// Races `fut` against the caller's cancellation.
pub async fn cancellable<T>(cancel: &CancellationToken, fut: impl Future<Output = Result<T>>) -> Result<T> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(DriverError::Cancelled),
        res = fut => res,
    }
}

pub trait CloudDriver<Config>: StorageDriver {
    fn new(config: &Config, timeout: Duration) -> Result<Self> where Self: Sized;
}

/// A configured account together with the driver serving it.
#[derive(Clone)]
pub struct Mount {
    pub driver: Arc<dyn StorageDriver>,
    pub account: Arc<Account>,
}

pub fn load_mount(config: &DriveConfig, timeout: Duration) -> Result<Mount> {
    match config {
        DriveConfig::Pan123(config) => {
            let driver = Pan123::new(config, timeout)?;
            Ok(Mount {
                driver: Arc::new(driver),
                account: Arc::new(Account::from_config(config)),
            })
        }
    }
}
