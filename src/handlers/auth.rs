use crate::db::user_repository::UserRepository;
use crate::db::UserStore;
use crate::errors::{AuthError, StoreError};
use crate::models::user::User;
use crate::utils::auth::{
    decoy_hash, hash_password, normalize_email, verify_password, TokenCodec,
};
use actix_web::{web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserResponse,
}

#[derive(Serialize, ToSchema)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub email: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        UserResponse {
            id: user.id,
            username: user.username,
            email: user.email,
        }
    }
}

/// The credential verifier. Checks the pair against the user store and mints
/// a signed token on success.
///
/// Unknown email and wrong password both come back as `InvalidCredentials`;
/// the unknown-email branch still runs one hash verification so the two are
/// not trivially distinguishable by response time either.
pub fn authenticate(
    users: &impl UserStore,
    codec: &TokenCodec,
    email: &str,
    password: &str,
) -> Result<(String, User), AuthError> {
    if email.trim().is_empty() || password.is_empty() {
        return Err(AuthError::InvalidCredentials);
    }

    let email = normalize_email(email);

    let user = match users.find_by_email(&email) {
        Ok(Some(user)) => user,
        Ok(None) => {
            verify_password(password, decoy_hash());
            return Err(AuthError::InvalidCredentials);
        }
        Err(err) => {
            error!(error = %err, "User store unavailable during login");
            return Err(AuthError::ServiceUnavailable);
        }
    };

    if !verify_password(password, &user.password_hash) {
        return Err(AuthError::InvalidCredentials);
    }

    let token = codec.issue(&user.id, &user.email)?;
    Ok((token, user))
}

/// Login an existing user
#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials"),
        (status = 503, description = "User store unavailable")
    ),
    tag = "Authentication"
)]
pub async fn login(
    user_repo: web::Data<UserRepository>,
    codec: web::Data<TokenCodec>,
    payload: web::Json<LoginRequest>,
) -> impl Responder {
    info!(email = %payload.email, "Login attempt");

    match authenticate(
        user_repo.get_ref(),
        codec.get_ref(),
        &payload.email,
        &payload.password,
    ) {
        Ok((token, user)) => {
            info!(email = %user.email, user_id = %user.id, "User logged in successfully");
            HttpResponse::Ok().json(AuthResponse {
                token,
                user: UserResponse::from(user),
            })
        }
        Err(AuthError::ServiceUnavailable) => {
            HttpResponse::ServiceUnavailable().json(serde_json::json!({
                "error": "Service unavailable"
            }))
        }
        Err(err) => {
            warn!(email = %payload.email, error = %err, "Login failed");
            HttpResponse::Unauthorized().json(serde_json::json!({
                "error": "Invalid credentials"
            }))
        }
    }
}

/// Register a new user
#[utoipa::path(
    post,
    path = "/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered successfully", body = AuthResponse),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Email already registered")
    ),
    tag = "Authentication"
)]
pub async fn register(
    user_repo: web::Data<UserRepository>,
    codec: web::Data<TokenCodec>,
    payload: web::Json<RegisterRequest>,
) -> impl Responder {
    info!(username = %payload.username, email = %payload.email, "Registration attempt");

    if payload.username.is_empty() || payload.email.is_empty() || payload.password.len() < 8 {
        warn!(username = %payload.username, email = %payload.email, "Registration failed: invalid input");
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": "Invalid input. Password must be at least 8 characters."
        }));
    }

    let password_hash = match hash_password(&payload.password) {
        Ok(hash) => hash,
        Err(e) => {
            error!(error = ?e, "Failed to hash password");
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to hash password"
            }));
        }
    };

    let user = User {
        id: uuid::Uuid::new_v4().to_string(),
        username: payload.username.clone(),
        email: normalize_email(&payload.email),
        password_hash,
        created_at: chrono::Utc::now(),
    };

    let user = match user_repo.create(user) {
        Ok(u) => u,
        Err(StoreError::DuplicateEmail) => {
            warn!(email = %payload.email, "Registration failed: email already exists");
            return HttpResponse::Conflict().json(serde_json::json!({
                "error": "Email already registered"
            }));
        }
        Err(e) => {
            error!(error = %e, "Failed to create user in database");
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to create user"
            }));
        }
    };

    let token = match codec.issue(&user.id, &user.email) {
        Ok(t) => t,
        Err(e) => {
            error!(error = %e, user_id = %user.id, "Failed to generate token");
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to generate token"
            }));
        }
    };

    info!(user_id = %user.id, username = %user.username, "User registered successfully");

    HttpResponse::Created().json(AuthResponse {
        token,
        user: UserResponse::from(user),
    })
}
