use crate::db::resource_repository::ResourceRepository;
use crate::db::ResourceStore;
use crate::errors::StoreError;
use crate::models::user::Principal;
use actix_web::{web, HttpResponse, Responder};
use tracing::{error, info};

/// Which collection a mounted scope serves. Set as scope-level app data so
/// the same handlers back both `/products` and `/protected_data`.
pub struct Collection(pub &'static str);

fn store_error(err: StoreError) -> HttpResponse {
    error!(error = %err, "Resource store operation failed");
    HttpResponse::InternalServerError().json(serde_json::json!({
        "error": "Internal server error"
    }))
}

fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(serde_json::json!({
        "error": "Not found"
    }))
}

/// List all records in the collection
#[utoipa::path(
    get,
    path = "/products",
    responses(
        (status = 200, description = "Resources retrieved", body = [crate::models::resource::Resource]),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Resources"
)]
pub async fn list(
    repo: web::Data<ResourceRepository>,
    collection: web::Data<Collection>,
) -> impl Responder {
    match repo.list(collection.0) {
        Ok(resources) => HttpResponse::Ok().json(resources),
        Err(err) => store_error(err),
    }
}

/// Create a record in the collection
#[utoipa::path(
    post,
    path = "/products",
    responses(
        (status = 201, description = "Resource created", body = crate::models::resource::Resource),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Resources"
)]
pub async fn create(
    repo: web::Data<ResourceRepository>,
    collection: web::Data<Collection>,
    principal: web::ReqData<Principal>,
    payload: web::Json<serde_json::Value>,
) -> impl Responder {
    match repo.create(collection.0, &principal.user_id, payload.into_inner()) {
        Ok(resource) => {
            info!(
                collection = %collection.0,
                resource_id = %resource.id,
                user_id = %principal.user_id,
                "Resource created"
            );
            HttpResponse::Created().json(resource)
        }
        Err(err) => store_error(err),
    }
}

/// Fetch one record by id
#[utoipa::path(
    get,
    path = "/products/{id}",
    params(("id" = String, Path, description = "Resource id")),
    responses(
        (status = 200, description = "Resource retrieved", body = crate::models::resource::Resource),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Resources"
)]
pub async fn read(
    repo: web::Data<ResourceRepository>,
    collection: web::Data<Collection>,
    id: web::Path<String>,
) -> impl Responder {
    match repo.get(collection.0, &id) {
        Ok(Some(resource)) => HttpResponse::Ok().json(resource),
        Ok(None) => not_found(),
        Err(err) => store_error(err),
    }
}

/// Replace a record's payload
#[utoipa::path(
    put,
    path = "/products/{id}",
    params(("id" = String, Path, description = "Resource id")),
    responses(
        (status = 200, description = "Resource updated", body = crate::models::resource::Resource),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Resources"
)]
pub async fn update(
    repo: web::Data<ResourceRepository>,
    collection: web::Data<Collection>,
    principal: web::ReqData<Principal>,
    id: web::Path<String>,
    payload: web::Json<serde_json::Value>,
) -> impl Responder {
    match repo.update(collection.0, &id, payload.into_inner()) {
        Ok(Some(resource)) => {
            info!(
                collection = %collection.0,
                resource_id = %resource.id,
                user_id = %principal.user_id,
                "Resource updated"
            );
            HttpResponse::Ok().json(resource)
        }
        Ok(None) => not_found(),
        Err(err) => store_error(err),
    }
}

/// Delete a record by id
#[utoipa::path(
    delete,
    path = "/products/{id}",
    params(("id" = String, Path, description = "Resource id")),
    responses(
        (status = 204, description = "Resource deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Resources"
)]
pub async fn delete(
    repo: web::Data<ResourceRepository>,
    collection: web::Data<Collection>,
    principal: web::ReqData<Principal>,
    id: web::Path<String>,
) -> impl Responder {
    match repo.delete(collection.0, &id) {
        Ok(true) => {
            info!(
                collection = %collection.0,
                resource_id = %id.as_str(),
                user_id = %principal.user_id,
                "Resource deleted"
            );
            HttpResponse::NoContent().finish()
        }
        Ok(false) => not_found(),
        Err(err) => store_error(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::middleware::auth::TokenGuard;
    use crate::utils::auth::TokenCodec;
    use actix_web::http::{header, StatusCode};
    use actix_web::{test, App};
    use std::sync::Arc;

    macro_rules! products_app {
        ($repo:expr, $codec:expr) => {
            test::init_service(
                App::new().app_data(web::Data::new($repo)).service(
                    web::scope("/products")
                        .wrap(TokenGuard::new($codec))
                        .app_data(web::Data::new(Collection("products")))
                        .route("", web::get().to(list))
                        .route("", web::post().to(create))
                        .route("/{id}", web::get().to(read))
                        .route("/{id}", web::put().to(update))
                        .route("/{id}", web::delete().to(delete)),
                ),
            )
            .await
        };
    }

    fn bearer(token: &str) -> (header::HeaderName, String) {
        (header::AUTHORIZATION, format!("Bearer {}", token))
    }

    #[actix_web::test]
    async fn test_crud_round_trip_with_token() {
        let repo = ResourceRepository::new(Database::in_memory().unwrap());
        let codec = Arc::new(TokenCodec::new("test-secret-key", 3600));
        let token = codec.issue("user-1", "crud@example.com").unwrap();
        let app = products_app!(repo, codec);

        // Create
        let req = test::TestRequest::post()
            .uri("/products")
            .insert_header(bearer(&token))
            .set_json(serde_json::json!({"name": "Widget", "price": 9.99}))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let created: serde_json::Value = test::read_body_json(res).await;
        let id = created["id"].as_str().unwrap().to_string();
        assert_eq!(created["owner_id"], "user-1");

        // Read
        let req = test::TestRequest::get()
            .uri(&format!("/products/{}", id))
            .insert_header(bearer(&token))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);

        // Update
        let req = test::TestRequest::put()
            .uri(&format!("/products/{}", id))
            .insert_header(bearer(&token))
            .set_json(serde_json::json!({"name": "Gadget"}))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);
        let updated: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(updated["data"]["name"], "Gadget");

        // List
        let req = test::TestRequest::get()
            .uri("/products")
            .insert_header(bearer(&token))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);
        let all: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(all.as_array().unwrap().len(), 1);

        // Delete
        let req = test::TestRequest::delete()
            .uri(&format!("/products/{}", id))
            .insert_header(bearer(&token))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::NO_CONTENT);

        // Gone now
        let req = test::TestRequest::get()
            .uri(&format!("/products/{}", id))
            .insert_header(bearer(&token))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_crud_requires_token() {
        let repo = ResourceRepository::new(Database::in_memory().unwrap());
        let codec = Arc::new(TokenCodec::new("test-secret-key", 3600));
        let app = products_app!(repo, codec);

        let req = test::TestRequest::get().uri("/products").to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_read_missing_is_404() {
        let repo = ResourceRepository::new(Database::in_memory().unwrap());
        let codec = Arc::new(TokenCodec::new("test-secret-key", 3600));
        let token = codec.issue("user-1", "crud@example.com").unwrap();
        let app = products_app!(repo, codec);

        let req = test::TestRequest::get()
            .uri("/products/no-such-id")
            .insert_header(bearer(&token))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }
}
