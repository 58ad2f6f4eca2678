use actix_web::http::header::LOCATION;
use actix_web::{get, web, HttpResponse};
use tokio_util::sync::CancellationToken;
use tracing::info;
use crate::driver::error::DriverError;
use crate::request_handler::State;

/// # Get Download Link API
/// Resolves a fresh direct link for every request and redirects to it.
#[get("/d/{mount}/{path:.*}")]
pub async fn get_download_link(
    state: web::Data<State>,
    params: web::Path<(String, String)>,
) -> Result<HttpResponse, DriverError> {
    let (mount_name, path) = params.into_inner();
    let mount = state.mount(&mount_name)?;
    let cancel = CancellationToken::new();
    // cancels in-flight provider calls if the client goes away
    let _guard = cancel.clone().drop_guard();
    let link = mount.driver.link(&path, &mount.account, &cancel).await?;
    info!(mount = %mount_name, path = %path, "download");
    Ok(HttpResponse::TemporaryRedirect().append_header((LOCATION, link.url)).finish())
}
