/// Database configuration and connection management
pub mod database;

/// Server, auth and admin settings from config.toml and the environment
pub mod settings;

pub use settings::AppConfig;
