use actix_web::HttpResponse;
use thiserror::Error;

/// Failures of the authentication subsystem.
///
/// The variant is for logs and tests only: every auth-related kind maps to
/// the same generic 401 body so a caller cannot tell a bad password from an
/// unknown email, or a tampered token from an expired one.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("authorization header missing or not a bearer token")]
    MissingToken,
    #[error("token malformed or signature mismatch")]
    InvalidToken,
    #[error("token expired")]
    ExpiredToken,
    #[error("authentication dependency unavailable")]
    ServiceUnavailable,
}

impl AuthError {
    /// Response sent by the token guard. Deliberately non-distinguishing.
    pub fn guard_response(&self) -> HttpResponse {
        match self {
            AuthError::ServiceUnavailable => {
                HttpResponse::ServiceUnavailable().json(serde_json::json!({
                    "error": "Service unavailable"
                }))
            }
            _ => HttpResponse::Unauthorized().json(serde_json::json!({
                "error": "Unauthorized"
            })),
        }
    }
}

/// Failures of the storage layer. Never shown to clients verbatim.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage backend error: {0}")]
    Backend(#[from] sled::Error),
    #[error("failed to encode record: {0}")]
    Encode(String),
    #[error("failed to decode record: {0}")]
    Decode(String),
    #[error("email already registered")]
    DuplicateEmail,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("required environment variable {0} is not set")]
    MissingVar(&'static str),
    #[error("environment variable {0} has an invalid value: {1}")]
    InvalidVar(&'static str, String),
}
