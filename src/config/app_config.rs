use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub auth: AuthSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    pub upload_path: String,
    pub max_file_size: usize, // in bytes
    /// Prefix used when building public asset URLs.
    pub public_base_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthSettings {
    pub access_token_secret: String,
    pub refresh_token_secret: String,
    pub access_ttl_minutes: i64,
    pub refresh_ttl_days: i64,
}

impl AppConfig {
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = Config::builder()
            // Start with default values
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("storage.upload_path", "uploads")?
            .set_default("storage.max_file_size", 1024 * 1024 * 1024)? // 1GB
            .set_default("storage.public_base_url", "http://127.0.0.1:8080")?
            .set_default("auth.access_token_secret", "dev-access-secret")?
            .set_default("auth.refresh_token_secret", "dev-refresh-secret")?
            .set_default("auth.access_ttl_minutes", 60)?
            .set_default("auth.refresh_ttl_days", 10)?
            // Layer on the environment-specific values
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add in settings from the environment
            // E.g. `APP__SERVER__PORT=5001 ./target/app` would set `server.port`
            .add_source(Environment::with_prefix("APP").separator("__"))
            .build()?;

        s.try_deserialize()
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::new()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_path: "uploads".to_string(),
            max_file_size: 1024 * 1024 * 1024, // 1GB
            public_base_url: "http://127.0.0.1:8080".to_string(),
        }
    }
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            access_token_secret: "dev-access-secret".to_string(),
            refresh_token_secret: "dev-refresh-secret".to_string(),
            access_ttl_minutes: 60,
            refresh_ttl_days: 10,
        }
    }
}
