//! API server configuration.
//!
//! Configuration is loaded from environment variables with fallback to defaults.

use std::env;

/// Default page size for snapshot exports.
pub const DEFAULT_EXPORT_PAGE_SIZE: i64 = 20;

/// Largest page size an export request may ask for.
pub const MAX_EXPORT_PAGE_SIZE: i64 = 100;

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// HTTP listen port
    pub http_port: u16,

    /// Path to the SQLite database file
    pub database_path: String,

    /// Default page size for report exports
    pub export_page_size: i64,
}

impl ApiConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let config = ApiConfig {
            http_port: env::var("HTTP_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("HTTP_PORT".to_string()))?,

            database_path: env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "ventas.db".to_string()),

            export_page_size: env::var("EXPORT_PAGE_SIZE")
                .unwrap_or_else(|_| DEFAULT_EXPORT_PAGE_SIZE.to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("EXPORT_PAGE_SIZE".to_string()))?,
        };

        if config.export_page_size < 1 || config.export_page_size > MAX_EXPORT_PAGE_SIZE {
            return Err(ConfigError::InvalidValue("EXPORT_PAGE_SIZE".to_string()));
        }

        Ok(config)
    }

    pub fn bind_address(&self) -> String {
        format!("0.0.0.0:{}", self.http_port)
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_without_env() {
        // Relies on the variables not being set in the test environment.
        let config = ApiConfig::load().unwrap();
        assert_eq!(config.http_port, 8080);
        assert_eq!(config.export_page_size, DEFAULT_EXPORT_PAGE_SIZE);
    }
}
