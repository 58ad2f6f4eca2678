use actix_web::{get, web, HttpResponse};
use tokio_util::sync::CancellationToken;
use crate::driver::error::DriverError;
use crate::request_handler::State;

/// ## Browse Handler
/// path: `/api/fs/{mount}/{path}`
///
/// A file comes back with its download url, a folder with its children.
#[get("/api/fs/{mount}/{path:.*}")]
pub async fn browse(
    state: web::Data<State>,
    params: web::Path<(String, String)>,
) -> Result<HttpResponse, DriverError> {
    let (mount_name, path) = params.into_inner();
    let mount = state.mount(&mount_name)?;
    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();
    let result = mount.driver.browse(&path, &mount.account, &cancel).await?;
    Ok(HttpResponse::Ok().json(result))
}
