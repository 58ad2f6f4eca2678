pub mod browse;
pub mod get_download_link;
pub mod proxy;

use std::collections::HashMap;
use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, ResponseError};
use serde_json::json;
use crate::driver::error::{DriverError, ErrorKind};
use crate::driver::Mount;

pub struct State {
    pub mounts: HashMap<String, Mount>,
    pub client: reqwest::Client,  // forwards proxied downloads
}

impl State {
    pub fn mount(&self, name: &str) -> Result<&Mount, DriverError> {
        self.mounts.get(name).ok_or_else(|| DriverError::PathNotFound(format!("/{}", name)))
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(browse::browse)
        .service(get_download_link::get_download_link)
        .service(proxy::proxy_download);
}

impl ResponseError for DriverError {
    fn status_code(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::PathNotFound => StatusCode::NOT_FOUND,
            ErrorKind::NotImplemented => StatusCode::NOT_IMPLEMENTED,
            ErrorKind::NotSupported => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ErrorKind::AuthFailed => StatusCode::UNAUTHORIZED,
            ErrorKind::AuthExpired | ErrorKind::Provider | ErrorKind::Transport => StatusCode::BAD_GATEWAY,
            ErrorKind::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({
            "kind": format!("{:?}", self.kind()),
            "message": self.to_string(),
            "retryable": self.is_retryable(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;
    use actix_web::http::header::LOCATION;
    use actix_web::{test, App};
    use chrono::Utc;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};
    use crate::driver::pan123::Pan123;
    use crate::model::{Account, AccountId, OrderBy, OrderDirection};
    use crate::service::session::{Credentials, Session};
    use super::*;

    async fn mock_provider() -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/file/list/new"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "code": 0,
                "data": { "Next": "-1", "InfoList": [
                    { "FileId": 11, "FileName": "a.txt", "Type": 0, "Size": 120, "Etag": "e", "S3KeyFlag": "f" }
                ] }
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/file/download_info"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "code": 0, "data": { "DownloadUrl": format!("{}/gateway/a.txt?sig=1", server.uri()) }
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/gateway/a.txt"))
            .respond_with(ResponseTemplate::new(302).insert_header("Location", "https://cdn.example/a.txt"))
            .mount(&server)
            .await;
        server
    }

    fn state(server: &MockServer) -> web::Data<State> {
        let driver = Pan123::with_base_url(format!("{}/api", server.uri()), Duration::from_secs(5)).unwrap();
        let account = Account {
            id: AccountId::new(),
            name: "pan".to_owned(),
            root_folder: "0".to_owned(),
            order_by: OrderBy::Name,
            order_direction: OrderDirection::Asc,
            updated_at: Utc::now(),
            session: Session::with_token(Credentials { username: "u".to_owned(), password: "p".to_owned() }, "tok"),
        };
        let mount = Mount { driver: Arc::new(driver), account: Arc::new(account) };
        web::Data::new(State {
            mounts: HashMap::from([("pan".to_owned(), mount)]),
            client: reqwest::Client::new(),
        })
    }

    #[actix_web::test]
    async fn test_browse_route() {
        let server = mock_provider().await;
        let app = test::init_service(App::new().app_data(state(&server)).configure(configure)).await;

        let req = test::TestRequest::get().uri("/api/fs/pan/").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["kind"], "folder");
        assert_eq!(body["content"][0]["name"], "a.txt");
        assert_eq!(body["content"][0]["type"], "file");
        assert_eq!(body["content"][0]["size"], 120);
    }

    #[actix_web::test]
    async fn test_download_route_redirects() {
        let server = mock_provider().await;
        let app = test::init_service(App::new().app_data(state(&server)).configure(configure)).await;

        let req = test::TestRequest::get().uri("/d/pan/a.txt").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(resp.headers().get(LOCATION).unwrap(), "https://cdn.example/a.txt");
    }

    #[actix_web::test]
    async fn test_unknown_mount_and_path() {
        let server = mock_provider().await;
        let app = test::init_service(App::new().app_data(state(&server)).configure(configure)).await;

        let req = test::TestRequest::get().uri("/api/fs/nope/").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::get().uri("/d/pan/missing.txt").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_error_status() {
        assert_eq!(DriverError::PathNotFound("/x".to_owned()).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(DriverError::NotImplemented.status_code(), StatusCode::NOT_IMPLEMENTED);
        assert_eq!(DriverError::NotSupported.status_code(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(DriverError::AuthFailed("locked".to_owned()).status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(DriverError::Transport("reset".to_owned()).status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(DriverError::Cancelled.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
