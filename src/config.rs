//! Application configuration loaded from environment variables.

use std::env;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// GCP project ID for Firestore
    pub firestore_project_id: String,
    /// Base URL of the hosted identity provider (GoTrue-compatible API)
    pub identity_base_url: String,
    /// Shared HS256 secret the identity provider signs access tokens with
    pub identity_jwt_secret: Vec<u8>,
    /// Service-role key for admin identity operations (user creation by a
    /// system admin); optional because regular deployments don't need it
    pub identity_service_key: Option<String>,
    /// Frontend URL for CORS
    pub frontend_url: String,
    /// Bind host
    pub host: String,
    /// Server port
    pub port: u16,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            firestore_project_id: env::var("FIRESTORE_PROJECT_ID")
                .map_err(|_| ConfigError::Missing("FIRESTORE_PROJECT_ID"))?,
            identity_base_url: env::var("IDENTITY_BASE_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .map_err(|_| ConfigError::Missing("IDENTITY_BASE_URL"))?,
            identity_jwt_secret: env::var("IDENTITY_JWT_SECRET")
                .map_err(|_| ConfigError::Missing("IDENTITY_JWT_SECRET"))?
                .into_bytes(),
            identity_service_key: env::var("IDENTITY_SERVICE_KEY")
                .ok()
                .map(|v| v.trim().to_string()),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
        })
    }

    /// Config for tests; never reads the environment.
    pub fn test_default() -> Self {
        Self {
            firestore_project_id: "test-project".to_string(),
            identity_base_url: "http://localhost:9999".to_string(),
            identity_jwt_secret: b"test_jwt_secret_32_bytes_minimum!".to_vec(),
            identity_service_key: None,
            frontend_url: "http://localhost:5173".to_string(),
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env() {
        env::set_var("FIRESTORE_PROJECT_ID", "test-project");
        env::set_var("IDENTITY_BASE_URL", "http://localhost:9999/");
        env::set_var("IDENTITY_JWT_SECRET", "test_jwt_secret_32_bytes_minimum!");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.firestore_project_id, "test-project");
        // Trailing slash is stripped so URL joining stays predictable
        assert_eq!(config.identity_base_url, "http://localhost:9999");
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_test_default_is_offline() {
        let config = Config::test_default();
        assert_eq!(config.firestore_project_id, "test-project");
        assert!(!config.identity_jwt_secret.is_empty());
    }
}
