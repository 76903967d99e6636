mod config;
mod db;
mod errors;
mod handlers;
mod middleware;
mod models;
mod utils;

use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use config::AppConfig;
use db::resource_repository::ResourceRepository;
use db::user_repository::UserRepository;
use db::Database;
use dotenv::dotenv;
use handlers::resources::Collection;
use middleware::auth::TokenGuard;
use std::env;
use std::sync::Arc;
use tracing::info;
use tracing_actix_web::TracingLogger;
use utils::auth::TokenCodec;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::status::status,
        handlers::status::up,
        handlers::auth::register,
        handlers::auth::login,
        handlers::resources::list,
        handlers::resources::create,
        handlers::resources::read,
        handlers::resources::update,
        handlers::resources::delete,
    ),
    components(
        schemas(
            handlers::status::StatusResponse,
            handlers::auth::RegisterRequest,
            handlers::auth::LoginRequest,
            handlers::auth::AuthResponse,
            handlers::auth::UserResponse,
            models::user::User,
            models::user::Claims,
            models::resource::Resource,
        )
    ),
    tags(
        (name = "Health", description = "Liveness probes"),
        (name = "Authentication", description = "User login and registration"),
        (name = "Resources", description = "Protected CRUD endpoints requiring a bearer token")
    ),
    modifiers(&SecurityAddon)
)]
struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};

            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Enter your bearer token"))
                        .build(),
                ),
            );
        }
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize tracing subscriber for structured logging
    let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .json()
        .init();

    // Configuration is read once here; nothing below mutates it.
    let config = AppConfig::from_env()
        .expect("Invalid configuration: TOKEN_SECRET must be set (see .env.example)");

    let database = Database::new(&config.db_path).expect("Failed to initialize database");
    info!(db_path = %config.db_path, "Database initialized");

    let codec = Arc::new(TokenCodec::new(
        &config.token_secret,
        config.token_ttl_seconds,
    ));

    let bind_address = config.bind_address();
    info!(
        bind_address = %bind_address,
        token_ttl_seconds = config.token_ttl_seconds,
        "Starting gatekeeper API server"
    );
    info!("Available endpoints:");
    info!("   GET    /status               - Liveness probe (public)");
    info!("   GET    /up                   - Liveness probe (public)");
    info!("   POST   /register             - Register new user (public)");
    info!("   POST   /login                - Login user (public)");
    info!("   CRUD   /products             - Product records (protected)");
    info!("   CRUD   /protected_data       - Protected data records (protected)");
    info!(
        swagger_url = format!("http://{}/swagger-ui/", bind_address),
        "Swagger UI available"
    );

    HttpServer::new(move || {
        let user_repo = UserRepository::new(database.clone());
        let resource_repo = ResourceRepository::new(database.clone());

        // Configure CORS
        let cors = Cors::default()
            .allow_any_origin()
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE"])
            .allowed_headers(vec![
                actix_web::http::header::AUTHORIZATION,
                actix_web::http::header::ACCEPT,
                actix_web::http::header::CONTENT_TYPE,
            ])
            .max_age(3600);

        let openapi = ApiDoc::openapi();

        App::new()
            .app_data(web::Data::new(user_repo))
            .app_data(web::Data::new(resource_repo))
            .app_data(web::Data::from(codec.clone()))
            .wrap(TracingLogger::default())
            .wrap(cors)
            // Swagger UI
            .service(SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", openapi))
            // Public routes
            .route("/status", web::get().to(handlers::status::status))
            .route("/up", web::get().to(handlers::status::up))
            .route("/register", web::post().to(handlers::auth::register))
            .route("/login", web::post().to(handlers::auth::login))
            // Protected resource collections
            .service(
                web::scope("/products")
                    .wrap(TokenGuard::new(codec.clone()))
                    .app_data(web::Data::new(Collection("products")))
                    .route("", web::get().to(handlers::resources::list))
                    .route("", web::post().to(handlers::resources::create))
                    .route("/{id}", web::get().to(handlers::resources::read))
                    .route("/{id}", web::put().to(handlers::resources::update))
                    .route("/{id}", web::delete().to(handlers::resources::delete)),
            )
            .service(
                web::scope("/protected_data")
                    .wrap(TokenGuard::new(codec.clone()))
                    .app_data(web::Data::new(Collection("protected_data")))
                    .route("", web::get().to(handlers::resources::list))
                    .route("", web::post().to(handlers::resources::create))
                    .route("/{id}", web::get().to(handlers::resources::read))
                    .route("/{id}", web::put().to(handlers::resources::update))
                    .route("/{id}", web::delete().to(handlers::resources::delete)),
            )
    })
    .bind(&bind_address)?
    .run()
    .await
}
