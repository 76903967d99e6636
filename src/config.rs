use crate::errors::ConfigError;
use std::env;

pub const DEFAULT_TOKEN_TTL_SECONDS: i64 = 86_400;

/// Process-wide configuration, read from the environment exactly once at
/// startup and immutable afterwards. The token secret has no default: the
/// server refuses to start without one.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub token_secret: String,
    pub token_ttl_seconds: i64,
    pub host: String,
    pub port: u16,
    pub db_path: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let token_secret =
            env::var("TOKEN_SECRET").map_err(|_| ConfigError::MissingVar("TOKEN_SECRET"))?;
        if token_secret.is_empty() {
            return Err(ConfigError::MissingVar("TOKEN_SECRET"));
        }

        let token_ttl_seconds = match env::var("TOKEN_TTL_SECONDS") {
            Ok(raw) => raw
                .parse::<i64>()
                .map_err(|_| ConfigError::InvalidVar("TOKEN_TTL_SECONDS", raw))?,
            Err(_) => DEFAULT_TOKEN_TTL_SECONDS,
        };

        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = match env::var("PORT") {
            Ok(raw) => raw
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidVar("PORT", raw))?,
            Err(_) => 8080,
        };
        let db_path = env::var("DB_PATH").unwrap_or_else(|_| "./data/gatekeeper.db".to_string());

        Ok(AppConfig {
            token_secret,
            token_ttl_seconds,
            host,
            port,
            db_path,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Ensure tests that modify env vars run serially
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn clear_env() {
        for var in ["TOKEN_SECRET", "TOKEN_TTL_SECONDS", "HOST", "PORT", "DB_PATH"] {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_missing_secret_is_an_error() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_env();

        let result = AppConfig::from_env();
        assert!(matches!(result, Err(ConfigError::MissingVar("TOKEN_SECRET"))));
    }

    #[test]
    fn test_defaults_applied() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_env();
        env::set_var("TOKEN_SECRET", "test-secret");

        let config = AppConfig::from_env().unwrap();
        assert_eq!(config.token_ttl_seconds, DEFAULT_TOKEN_TTL_SECONDS);
        assert_eq!(config.bind_address(), "127.0.0.1:8080");
    }

    #[test]
    fn test_ttl_override() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_env();
        env::set_var("TOKEN_SECRET", "test-secret");
        env::set_var("TOKEN_TTL_SECONDS", "3600");

        let config = AppConfig::from_env().unwrap();
        assert_eq!(config.token_ttl_seconds, 3600);
    }

    #[test]
    fn test_bad_ttl_rejected() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_env();
        env::set_var("TOKEN_SECRET", "test-secret");
        env::set_var("TOKEN_TTL_SECONDS", "not-a-number");

        let result = AppConfig::from_env();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidVar("TOKEN_TTL_SECONDS", _))
        ));
    }
}
