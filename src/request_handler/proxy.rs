use actix_web::http::StatusCode;
use actix_web::{get, web, HttpRequest, HttpResponse};
use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT_RANGES, AUTHORIZATION, CACHE_CONTROL, CONNECTION,
    CONTENT_DISPOSITION, CONTENT_RANGE, CONTENT_TYPE, COOKIE, ETAG, HOST, LAST_MODIFIED, PROXY_AUTHENTICATE,
    PROXY_AUTHORIZATION, TE, TRAILER, TRANSFER_ENCODING, UPGRADE,
};
use tokio_util::sync::CancellationToken;
use tracing::debug;
use crate::driver::cancellable;
use crate::driver::error::DriverError;
use crate::request_handler::State;

const HOP_BY_HOP: [HeaderName; 8] = [
    HOST,
    CONNECTION,
    TE,
    TRAILER,
    TRANSFER_ENCODING,
    UPGRADE,
    PROXY_AUTHENTICATE,
    PROXY_AUTHORIZATION,
];

// credentials for this server, never for the download host
const PRIVATE: [HeaderName; 2] = [AUTHORIZATION, COOKIE];

const PASS_BACK: [HeaderName; 7] = [
    CONTENT_TYPE,
    CONTENT_RANGE,
    CONTENT_DISPOSITION,
    ACCEPT_RANGES,
    ETAG,
    LAST_MODIFIED,
    CACHE_CONTROL,
];

fn is_forwarded(name: &HeaderName) -> bool {
    !HOP_BY_HOP.contains(name) && !PRIVATE.contains(name) && name.as_str() != "keep-alive"
}

/// Copies the inbound request headers that may travel to the provider.
pub fn forward_headers(req: &HttpRequest) -> HeaderMap {
    let mut headers = HeaderMap::new();
    for (name, value) in req.headers() {
        let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_str().as_bytes()),
            HeaderValue::from_bytes(value.as_bytes()),
        ) else {
            continue;
        };
        if is_forwarded(&name) {
            headers.append(name, value);
        }
    }
    headers
}

/// ## Proxy Download
/// path: `/p/{mount}/{path}`
///
/// Streams the file through this server. Range requests are forwarded.
#[get("/p/{mount}/{path:.*}")]
pub async fn proxy_download(
    state: web::Data<State>,
    params: web::Path<(String, String)>,
    req: HttpRequest,
) -> Result<HttpResponse, DriverError> {
    let (mount_name, path) = params.into_inner();
    let mount = state.mount(&mount_name)?;
    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();
    let link = mount.driver.link(&path, &mount.account, &cancel).await?;

    let mut headers = forward_headers(&req);
    mount.driver.proxy(&mut headers);
    debug!(mount = %mount_name, path = %path, "proxying download");
    let upstream = cancellable(&cancel, async {
        Ok::<_, DriverError>(state.client.get(&link.url).headers(headers).send().await?)
    }).await?;

    let status = StatusCode::from_u16(upstream.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
    let mut res = HttpResponse::build(status);
    for name in PASS_BACK.iter() {
        if let Some(value) = upstream.headers().get(name).and_then(|v| v.to_str().ok()) {
            res.insert_header((name.as_str(), value));
        }
    }
    if let Some(len) = upstream.content_length() {
        res.no_chunking(len);
    }
    Ok(res.streaming(upstream.bytes_stream()))
}
