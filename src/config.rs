use std::{env, fmt::Display, str::FromStr, time::Duration};

use tracing::{info, warn};

use crate::duel::ExhaustionPolicy;
use crate::services::duel_service::{DEFAULT_SESSION_TTL, DuelSettings};

const DEV_JWT_SECRET: &str = "styleduel-dev-secret";

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid {key} value: {message}")]
    Invalid { key: String, message: String },

    #[error("{0} must be set")]
    Missing(String),
}

/// Where repositories keep their data
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    Memory,
    Postgres { database_url: String },
}

/// Runtime settings read from the environment
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub storage: StorageBackend,
    pub jwt_secret: String,
    pub bcrypt_cost: u32,
    pub duel: DuelSettings,
}

impl AppConfig {
    /// Reads `.env` and the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        let storage = match try_load::<String>("STORAGE_BACKEND", "postgres")?
            .to_ascii_lowercase()
            .as_str()
        {
            "memory" => StorageBackend::Memory,
            "postgres" => StorageBackend::Postgres {
                database_url: var("DATABASE_URL")
                    .ok_or_else(|| ConfigError::Missing("DATABASE_URL".to_string()))?,
            },
            other => {
                return Err(ConfigError::Invalid {
                    key: "STORAGE_BACKEND".to_string(),
                    message: format!("expected memory or postgres, got '{other}'"),
                });
            }
        };

        let jwt_secret = match var("JWT_SECRET") {
            Some(secret) => secret,
            None if storage == StorageBackend::Memory => {
                warn!("JWT_SECRET not set, using the development secret");
                DEV_JWT_SECRET.to_string()
            }
            None => return Err(ConfigError::Missing("JWT_SECRET".to_string())),
        };

        let delay_ms: u64 = try_load("DUEL_FEEDBACK_DELAY_MS", "500")?;
        let ttl_secs: u64 = try_load(
            "DUEL_SESSION_TTL_SECS",
            &DEFAULT_SESSION_TTL.as_secs().to_string(),
        )?;
        if ttl_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "DUEL_SESSION_TTL_SECS".to_string(),
                message: "must be at least 1".to_string(),
            });
        }

        Ok(Self {
            host: try_load("HOST", "127.0.0.1")?,
            port: try_load("PORT", "8080")?,
            storage,
            jwt_secret,
            bcrypt_cost: try_load("BCRYPT_COST", &bcrypt::DEFAULT_COST.to_string())?,
            duel: DuelSettings {
                feedback_delay: Duration::from_millis(delay_ms),
                policy: try_load("DUEL_EXHAUSTION_POLICY", "per-outfit")?,
                session_ttl: Duration::from_secs(ttl_secs),
            },
        })
    }

    /// In-memory configuration with instant duel feedback and cheap hashing
    pub fn for_tests() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 0,
            storage: StorageBackend::Memory,
            jwt_secret: "test_secret".to_string(),
            bcrypt_cost: bcrypt::MIN_COST,
            duel: DuelSettings {
                feedback_delay: Duration::ZERO,
                policy: ExhaustionPolicy::PerOutfit,
                session_ttl: DEFAULT_SESSION_TTL,
            },
        }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn try_load<T: FromStr>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    var(key)
        .unwrap_or_else(|| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e: T::Err| {
            warn!("Invalid {key} value: {e}");
            ConfigError::Invalid {
                key: key.to_string(),
                message: e.to_string(),
            }
        })
}
