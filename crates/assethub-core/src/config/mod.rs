//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section.

pub mod app;
pub mod auth;
pub mod database;
pub mod logging;
pub mod storage;

use serde::{Deserialize, Serialize};

use self::app::ServerConfig;
use self::auth::AuthConfig;
use self::database::DatabaseConfig;
use self::logging::LoggingConfig;
use self::storage::StorageConfig;

use crate::error::AppError;

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Catalog database settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Bearer token settings.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Object storage settings.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges the default configuration with an environment-specific overlay
    /// and environment variables prefixed with `ASSETHUB_`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("ASSETHUB")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_leave_storage_unconfigured() {
        let config = AppConfig::default();
        assert_eq!(config.storage.provider, "oss");
        assert!(!config.storage.is_configured());
        assert_eq!(config.storage.expire_seconds, 3600);
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let raw = r#"
            [storage]
            endpoint = "https://oss-cn-hangzhou.aliyuncs.com"
            bucket = "assets"
            access_key_id = "id"
            access_key_secret = "secret"
        "#;
        let config: AppConfig = config::Config::builder()
            .add_source(config::File::from_str(raw, config::FileFormat::Toml))
            .build()
            .and_then(|c| c.try_deserialize())
            .expect("config should parse");

        assert!(config.storage.is_configured());
        assert_eq!(config.storage.proxy_cache_control, "private, max-age=3600");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_s3_only_needs_bucket() {
        let mut storage = storage::StorageConfig {
            provider: "s3".to_string(),
            ..Default::default()
        };
        assert!(!storage.is_configured());
        storage.bucket = "assets".to_string();
        assert!(storage.is_configured());
    }
}
