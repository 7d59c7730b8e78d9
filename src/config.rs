use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub ttl_days: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub endpoint: String,
    pub bucket: String,
    pub access_key: String,
    pub secret_key: String,
    pub region: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub storage: StorageConfig,
}

impl AppConfig {
    /// Load configuration from the environment once at startup. Any missing
    /// required variable aborts the process; nothing is read from the
    /// environment during request handling.
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            ttl_days: std::env::var("JWT_TTL_DAYS")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(7),
        };
        let storage = StorageConfig {
            endpoint: std::env::var("STORAGE_ENDPOINT").context("STORAGE_ENDPOINT must be set")?,
            bucket: std::env::var("STORAGE_BUCKET").context("STORAGE_BUCKET must be set")?,
            access_key: std::env::var("STORAGE_ACCESS_KEY")
                .context("STORAGE_ACCESS_KEY must be set")?,
            secret_key: std::env::var("STORAGE_SECRET_KEY")
                .context("STORAGE_SECRET_KEY must be set")?,
            region: std::env::var("STORAGE_REGION").unwrap_or_else(|_| "auto".into()),
        };
        Ok(Self {
            database_url,
            jwt,
            storage,
        })
    }
}
