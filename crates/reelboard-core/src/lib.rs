//! Shared domain types and configuration for reelboard.

pub mod app_config;
pub mod config;
pub mod platform;

pub use app_config::{AppConfig, Environment, StoreBackend};
pub use config::{load_app_config, load_app_config_from_env};
pub use platform::{Platform, ViewsConfig};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("unsupported platform: {0}")]
    UnknownPlatform(String),
}
