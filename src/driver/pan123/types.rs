use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use crate::driver::error::{DriverError, Result};
use crate::driver::pan123::DRIVER_NAME;
use crate::vfs::{File, FileType};

/// Code the provider uses for "session expired or invalid token".
pub const AUTH_EXPIRED_CODE: i64 = 401;

const FOLDER_TYPE: i64 = 1;

/// Envelope around every provider response.
#[derive(Debug, Deserialize)]
pub struct ApiResp {
    pub code: i64,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

impl ApiResp {
    /// Unwraps a response whose success code is `0`.
    pub fn into_data<T: DeserializeOwned>(self) -> Result<T> {
        match self.code {
            0 => self.data_as(),
            AUTH_EXPIRED_CODE => Err(DriverError::AuthExpired),
            code => Err(DriverError::Provider { code, message: self.message }),
        }
    }

    pub fn data_as<T: DeserializeOwned>(self) -> Result<T> {
        serde_json::from_value(self.data)
            .map_err(|e| DriverError::Transport(format!("unexpected response body: {}", e)))
    }
}

#[derive(Debug, Serialize)]
pub struct SignInReq<'a> {
    pub passport: &'a str,
    pub password: &'a str,
    pub remember: bool,
}

#[derive(Debug, Deserialize)]
pub struct SignInData {
    pub token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListData {
    #[serde(default)]
    pub next: String,
    #[serde(default)]
    pub info_list: Vec<RawEntry>,
}

/// One row of a provider listing, kept as fetched.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawEntry {
    pub file_id: i64,
    #[serde(default)]
    pub parent_file_id: i64,
    pub file_name: String,
    #[serde(default)]
    pub size: i64,
    #[serde(rename = "Type")]
    pub kind: i64,
    #[serde(default)]
    pub etag: String,
    #[serde(default)]
    pub s3_key_flag: String,
    #[serde(default)]
    pub update_at: String,
}

impl RawEntry {
    pub fn is_folder(&self) -> bool {
        self.kind == FOLDER_TYPE
    }

    pub fn to_file(&self) -> File {
        let (kind, size) = if self.is_folder() {
            (FileType::Folder, 0)
        } else {
            (FileType::File, self.size.max(0) as u64)
        };
        File {
            id: self.file_id.to_string(),
            name: self.file_name.clone(),
            size,
            kind,
            driver: DRIVER_NAME.to_owned(),
            updated_at: DateTime::parse_from_rfc3339(&self.update_at)
                .map(|t| t.with_timezone(&Utc))
                .unwrap_or_default(),
            url: None,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadInfoReq<'a> {
    pub drive_id: i64,
    pub etag: &'a str,
    pub file_id: i64,
    pub file_name: &'a str,
    #[serde(rename = "s3keyFlag")]
    pub s3key_flag: &'a str,
    pub size: i64,
    #[serde(rename = "type")]
    pub kind: i64,
}

impl<'a> From<&'a RawEntry> for DownloadInfoReq<'a> {
    fn from(entry: &'a RawEntry) -> Self {
        DownloadInfoReq {
            drive_id: 0,
            etag: &entry.etag,
            file_id: entry.file_id,
            file_name: &entry.file_name,
            s3key_flag: &entry.s3_key_flag,
            size: entry.size,
            kind: entry.kind,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DownloadInfo {
    #[serde(rename = "DownloadUrl", alias = "downloadUrl")]
    pub download_url: String,
}
