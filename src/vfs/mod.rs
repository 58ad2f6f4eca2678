pub mod path;

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Folder,
    File,
}

/// Uniform file entry shared by every driver.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct File {
    pub id: String,
    pub name: String,
    pub size: u64,  // always 0 for folders
    #[serde(rename = "type")]
    pub kind: FileType,
    pub driver: String,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,    // only set once a link has been resolved
}

impl File {
    pub fn is_dir(&self) -> bool {
        self.kind == FileType::Folder
    }
}

/// Direct download url. Expires on the provider side, so it is never cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    pub url: String,
}

/// Result of browsing a path: a leaf with its link attached, or a folder's children.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "content", rename_all = "lowercase")]
pub enum Browse {
    File(File),
    Folder(Vec<File>),
}
