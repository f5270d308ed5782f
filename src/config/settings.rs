//! Application settings loaded from `config.toml` and the environment.
//!
//! Every section has defaults, so a missing file yields a runnable development
//! configuration. Secrets are expected to come from the environment (or `.env`)
//! and override whatever the file contains.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info, warn};

/// Default location of the settings file
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Lowest bcrypt work factor accepted by the hasher
pub const MIN_BCRYPT_COST: u32 = 4;
/// Highest bcrypt work factor accepted by the hasher
pub const MAX_BCRYPT_COST: u32 = 31;

const DEV_ACCESS_SECRET: &str = "storefront-dev-access-secret";
const DEV_REFRESH_SECRET: &str = "storefront-dev-refresh-secret";

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP listener settings
    pub server: ServerConfig,
    /// Token and password settings
    pub auth: AuthConfig,
    /// Accounts registered with one of these emails receive the admin role
    pub admin_emails: Vec<String>,
}

/// HTTP listener settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind
    pub host: String,
    /// Port to bind
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

/// Token and password settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HMAC secret for access tokens
    pub access_token_secret: String,
    /// HMAC secret for refresh tokens
    pub refresh_token_secret: String,
    /// Access token and cookie lifetime in minutes
    pub access_token_max_age: i64,
    /// Refresh token and cookie lifetime in minutes
    pub refresh_token_max_age: i64,
    /// bcrypt work factor
    pub bcrypt_cost: u32,
    /// Whether auth cookies carry the `Secure` attribute
    pub secure_cookies: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            access_token_secret: DEV_ACCESS_SECRET.to_string(),
            refresh_token_secret: DEV_REFRESH_SECRET.to_string(),
            access_token_max_age: 15,
            refresh_token_max_age: 60 * 24,
            bcrypt_cost: bcrypt::DEFAULT_COST,
            secure_cookies: false,
        }
    }
}

impl AppConfig {
    /// Address string for the listener, e.g. `0.0.0.0:8080`
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Whether `email` is configured as an admin account.
    #[must_use]
    pub fn is_admin_email(&self, email: &str) -> bool {
        self.admin_emails
            .iter()
            .any(|admin| admin.eq_ignore_ascii_case(email.trim()))
    }

    fn validate(&self) -> Result<()> {
        if self.auth.access_token_secret.is_empty() || self.auth.refresh_token_secret.is_empty() {
            return Err(Error::Config {
                message: "Token secrets cannot be empty".to_string(),
            });
        }
        if self.auth.access_token_max_age <= 0 || self.auth.refresh_token_max_age <= 0 {
            return Err(Error::Config {
                message: "Token lifetimes must be positive".to_string(),
            });
        }
        if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&self.auth.bcrypt_cost) {
            return Err(Error::Config {
                message: format!(
                    "bcrypt_cost must be between {} and {}",
                    MIN_BCRYPT_COST,
                    MAX_BCRYPT_COST
                ),
            });
        }
        Ok(())
    }
}

/// Parses settings from TOML text.
///
/// # Errors
/// Returns an error if the TOML syntax is invalid or a field has the wrong type.
pub fn parse_config(contents: &str) -> Result<AppConfig> {
    toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads settings from a TOML file, falling back to defaults when it does not exist,
/// then applies environment overrides and validates the result.
///
/// # Errors
/// Returns an error if:
/// - The file exists but cannot be read or parsed
/// - An environment override cannot be parsed
/// - The final configuration is invalid (empty secrets, bad bcrypt cost)
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path = path.as_ref();
    let mut config = if path.exists() {
        debug!("Loading configuration from {:?}", path);
        let contents = std::fs::read_to_string(path).map_err(|e| Error::Config {
            message: format!("Failed to read config file {path:?}: {e}"),
        })?;
        parse_config(&contents)?
    } else {
        info!("No config file at {:?}, using defaults", path);
        AppConfig::default()
    };

    apply_env_overrides(&mut config)?;

    if config.auth.access_token_secret == DEV_ACCESS_SECRET {
        warn!("ACCESS_TOKEN_SECRET not set, using the development secret");
    }

    config.validate()?;
    Ok(config)
}

/// Loads settings from the default location (./config.toml)
pub fn load_default_config() -> Result<AppConfig> {
    load_config(DEFAULT_CONFIG_PATH)
}

fn apply_env_overrides(config: &mut AppConfig) -> Result<()> {
    if let Ok(port) = std::env::var("PORT") {
        config.server.port = port.parse().map_err(|e| Error::Config {
            message: format!("Invalid PORT value {port:?}: {e}"),
        })?;
    }
    if let Ok(secret) = std::env::var("ACCESS_TOKEN_SECRET") {
        config.auth.access_token_secret = secret;
    }
    if let Ok(secret) = std::env::var("REFRESH_TOKEN_SECRET") {
        config.auth.refresh_token_secret = secret;
    }
    Ok(())
}
