use actix_web::{HttpResponse, web};
use serde::Serialize;
use utoipa::ToSchema;

use crate::store::{ConnectionProbe, ConnectionState};

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    #[schema(example = "success")]
    pub status: &'static str,
    #[schema(example = "MySQL is Connected")]
    pub message: String,
    /// 0 = disconnected, 1 = connected
    #[schema(example = 1)]
    pub connection_state: u8,
}

/// Database connection state
#[utoipa::path(
    get,
    path = "/api/status",
    responses(
        (status = 200, description = "Backend connection state", body = StatusResponse)
    ),
    tag = "Status"
)]
pub async fn api_status(probe: web::Data<dyn ConnectionProbe>) -> HttpResponse {
    let state = probe.state().await;

    HttpResponse::Ok().json(StatusResponse {
        status: if state == ConnectionState::Connected {
            "success"
        } else {
            "error"
        },
        message: format!("{} is {}", probe.backend(), state.label()),
        connection_state: state.code(),
    })
}

#[cfg(test)]
mod tests {
    use crate::test_support::{TestApp, json_body, test_service};
    use actix_web::{http::StatusCode, test};

    #[actix_web::test]
    async fn status_is_public() {
        let app = TestApp::new();
        let svc = test_service!(app);

        let req = test::TestRequest::get().uri("/api/status").to_request();
        let resp = test::call_service(&svc, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body = json_body(resp).await;
        assert_eq!(body["status"], "success");
        assert_eq!(body["message"], "Memory store is Connected");
        assert_eq!(body["connectionState"], 1);
    }
}
