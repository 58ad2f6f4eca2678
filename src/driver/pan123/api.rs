use std::time::Duration;
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, LOCATION};
use reqwest::redirect::Policy;
use reqwest::{Client, StatusCode};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use url::Url;
use crate::driver::cancellable;
use crate::driver::error::{DriverError, Result};
use crate::driver::pan123::types::{ApiResp, DownloadInfo, DownloadInfoReq, ListData, RawEntry, SignInData, SignInReq};
use crate::model::{OrderBy, OrderDirection};
use crate::service::session::{Authenticator, Credentials};

pub const API_BASE: &str = "https://www.123pan.com/api";

const SIGN_IN_OK: i64 = 200;
const PAGE_LIMIT: u32 = 100;
const LAST_PAGE: &str = "-1";

/// Raw HTTP calls against the provider. Knows nothing about caching or retries.
pub struct Pan123Api {
    client: Client,
    no_redirect: Client,
    base_url: String,
}

impl Pan123Api {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        let no_redirect = Client::builder()
            .timeout(timeout)
            .redirect(Policy::none())
            .build()?;
        Ok(Pan123Api {
            client,
            no_redirect,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    pub async fn sign_in(&self, credentials: &Credentials, cancel: &CancellationToken) -> Result<String> {
        let body = SignInReq {
            passport: &credentials.username,
            password: &credentials.password,
            remember: true,
        };
        let resp: ApiResp = cancellable(cancel, async {
            let res = self.client.post(self.endpoint("user/sign_in")).json(&body).send().await?;
            Ok::<_, DriverError>(res.json().await?)
        }).await?;
        if resp.code != SIGN_IN_OK {
            return Err(DriverError::AuthFailed(resp.message));
        }
        let data: SignInData = resp.data_as()?;
        Ok(data.token)
    }

    /// Fetches every entry of `parent_id`, following the page cursor.
    pub async fn file_list(
        &self,
        token: String,
        parent_id: &str,
        order_by: OrderBy,
        order_direction: OrderDirection,
        cancel: &CancellationToken,
    ) -> Result<Vec<RawEntry>> {
        let mut entries = Vec::new();
        let mut next = "0".to_owned();
        loop {
            let limit = PAGE_LIMIT.to_string();
            let query = [
                ("driveId", "0"),
                ("limit", limit.as_str()),
                ("next", next.as_str()),
                ("orderBy", order_by.as_str()),
                ("orderDirection", order_direction.as_str()),
                ("parentFileId", parent_id),
                ("trashed", "false"),
            ];
            let resp: ApiResp = cancellable(cancel, async {
                let res = self.client.get(self.endpoint("file/list/new"))
                    .bearer_auth(&token)
                    .query(&query)
                    .send().await?;
                Ok::<_, DriverError>(res.json().await?)
            }).await?;
            let page: ListData = resp.into_data()?;
            entries.extend(page.info_list);
            if page.next.is_empty() || page.next == LAST_PAGE {
                break;
            }
            if page.next == next {
                warn!(parent_id, cursor = %next, "listing cursor did not advance");
                break;
            }
            next = page.next;
        }
        debug!(parent_id, count = entries.len(), "fetched listing");
        Ok(entries)
    }

    /// Signed-info exchange: returns the provisional gateway url of a leaf.
    pub async fn download_info(&self, token: String, entry: &RawEntry, cancel: &CancellationToken) -> Result<String> {
        let body = DownloadInfoReq::from(entry);
        let resp: ApiResp = cancellable(cancel, async {
            let res = self.client.post(self.endpoint("file/download_info"))
                .header(AUTHORIZATION, format!("Bearer {}", token))
                .json(&body)
                .send().await?;
            Ok::<_, DriverError>(res.json().await?)
        }).await?;
        let info: DownloadInfo = resp.into_data()?;
        Ok(info.download_url)
    }

    /// Probes the gateway without following redirects. A `302` yields its
    /// `Location`; any other status means the provisional url is already final.
    pub async fn unwrap_redirect(&self, provisional: &str, cancel: &CancellationToken) -> Result<String> {
        let parsed = Url::parse(provisional)?;
        let params: Vec<(String, String)> = parsed.query_pairs().into_owned().collect();
        let mut target = parsed;
        target.set_query(None);
        target.set_fragment(None);

        let res = cancellable(cancel, async {
            Ok::<_, DriverError>(self.no_redirect.get(target).query(&params).send().await?)
        }).await?;
        if res.status() != StatusCode::FOUND {
            debug!(status = %res.status(), "gateway did not redirect, using provisional url");
            return Ok(provisional.to_owned());
        }
        match res.headers().get(LOCATION).and_then(|v| v.to_str().ok()) {
            Some(location) if !location.is_empty() => Ok(location.to_owned()),
            _ => Err(DriverError::Transport("gateway redirect without location".to_owned())),
        }
    }
}

#[async_trait]
impl Authenticator for Pan123Api {
    async fn login(&self, credentials: &Credentials, cancel: &CancellationToken) -> Result<String> {
        self.sign_in(credentials, cancel).await
    }
}
