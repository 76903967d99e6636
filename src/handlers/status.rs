use actix_web::{HttpResponse, Responder};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct StatusResponse {
    pub status: String,
    pub version: String,
    pub timestamp: String,
}

/// Liveness probe with build info
#[utoipa::path(
    get,
    path = "/status",
    responses(
        (status = 200, description = "Service is up", body = StatusResponse)
    ),
    tag = "Health"
)]
pub async fn status() -> impl Responder {
    HttpResponse::Ok().json(StatusResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// Bare liveness probe
#[utoipa::path(
    get,
    path = "/up",
    responses(
        (status = 200, description = "Service is up")
    ),
    tag = "Health"
)]
pub async fn up() -> impl Responder {
    HttpResponse::Ok().finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{test, web, App};

    #[actix_web::test]
    async fn test_status_is_public() {
        let app = test::init_service(
            App::new()
                .route("/status", web::get().to(status))
                .route("/up", web::get().to(up)),
        )
        .await;

        let res = test::call_service(&app, test::TestRequest::get().uri("/status").to_request())
            .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["status"], "ok");

        let res =
            test::call_service(&app, test::TestRequest::get().uri("/up").to_request()).await;
        assert_eq!(res.status(), StatusCode::OK);
    }
}
