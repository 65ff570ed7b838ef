use anyhow::{ensure, Context, Result};
use dotenvy::dotenv;
use std::env;

/// Tunables consumed by the membership and cascade operations.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Length of generated invite codes.
    pub invite_code_length: usize,
    /// How many candidate codes are tried before giving up.
    pub invite_code_attempts: u32,
    /// Maximum number of ids deactivated per write during a cascade.
    pub cascade_batch_size: usize,
    /// Age after which a pending invitation is swept to DEACCEPTED.
    pub invitation_ttl_days: i64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            invite_code_length: 8,
            invite_code_attempts: 5,
            cascade_batch_size: 500,
            invitation_ttl_days: 7,
        }
    }
}

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub engine: EngineConfig,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            engine: EngineConfig::from_env()?,
        })
    }
}

impl EngineConfig {
    /// Read engine overrides from the environment, falling back to defaults.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let config = Self {
            invite_code_length: parse_or("INVITE_CODE_LENGTH", defaults.invite_code_length)?,
            invite_code_attempts: parse_or("INVITE_CODE_ATTEMPTS", defaults.invite_code_attempts)?,
            cascade_batch_size: parse_or("CASCADE_BATCH_SIZE", defaults.cascade_batch_size)?,
            invitation_ttl_days: parse_or("INVITATION_TTL_DAYS", defaults.invitation_ttl_days)?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Reject values the operations cannot work with.
    pub fn validate(&self) -> Result<()> {
        ensure!(self.cascade_batch_size > 0, "CASCADE_BATCH_SIZE must be positive");
        ensure!(self.invite_code_attempts > 0, "INVITE_CODE_ATTEMPTS must be positive");
        ensure!(
            (4..=32).contains(&self.invite_code_length),
            "INVITE_CODE_LENGTH must be between 4 and 32"
        );
        ensure!(
            (1..=MAX_INVITATION_TTL_DAYS).contains(&self.invitation_ttl_days),
            "INVITATION_TTL_DAYS must be between 1 and {}",
            MAX_INVITATION_TTL_DAYS
        );
        Ok(())
    }
}

/// Upper bound for `INVITATION_TTL_DAYS` (ten years).
pub const MAX_INVITATION_TTL_DAYS: i64 = 3650;

fn parse_or<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .with_context(|| format!("{} must be a valid number", key)),
        Err(_) => Ok(default),
    }
}
