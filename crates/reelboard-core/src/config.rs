use crate::app_config::{AppConfig, Environment, StoreBackend};
use crate::ConfigError;

/// Desktop Chrome user agent sent with profile-page fetches.
pub const DEFAULT_STATS_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

pub const DEFAULT_OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_OPENROUTER_MODEL: &str = "kwaipilot/kat-coder-pro:free";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can drive it with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let optional = |var: &str| -> Option<String> {
        lookup(var).ok().filter(|v| !v.trim().is_empty())
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let env = parse_environment(&or_default("REELBOARD_ENV", "development"))?;
    let bind_addr = parse_addr("REELBOARD_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("REELBOARD_LOG_LEVEL", "info");

    let store = match or_default("REELBOARD_STORE", "memory").as_str() {
        "memory" => StoreBackend::Memory,
        "firebase" => StoreBackend::Firebase {
            database_url: require("FIREBASE_DATABASE_URL")?,
            auth_token: optional("FIREBASE_AUTH_TOKEN"),
        },
        other => {
            return Err(ConfigError::InvalidEnvVar {
                var: "REELBOARD_STORE".to_string(),
                reason: format!("expected \"memory\" or \"firebase\", got \"{other}\""),
            })
        }
    };
    // User data in production must survive a restart.
    if env == Environment::Production && store == StoreBackend::Memory {
        return Err(ConfigError::InvalidEnvVar {
            var: "REELBOARD_STORE".to_string(),
            reason: "the in-memory store is not allowed in production".to_string(),
        });
    }

    let openrouter_api_key = optional("OPENROUTER_API_KEY");
    let openrouter_base_url = or_default("OPENROUTER_BASE_URL", DEFAULT_OPENROUTER_BASE_URL);
    let openrouter_model = or_default("OPENROUTER_MODEL", DEFAULT_OPENROUTER_MODEL);

    let stats_request_timeout_secs = parse_u64("REELBOARD_STATS_REQUEST_TIMEOUT_SECS", "15")?;
    let stats_user_agent = or_default("REELBOARD_STATS_USER_AGENT", DEFAULT_STATS_USER_AGENT);
    let stats_max_retries = parse_u32("REELBOARD_STATS_MAX_RETRIES", "0")?;
    let stats_retry_backoff_base_secs =
        parse_u64("REELBOARD_STATS_RETRY_BACKOFF_BASE_SECS", "1")?;
    let tiktok_base_url = or_default("REELBOARD_TIKTOK_BASE_URL", "https://www.tiktok.com");
    let youtube_base_url = or_default("REELBOARD_YOUTUBE_BASE_URL", "https://www.youtube.com");

    let calendar_refresh_cron = or_default("REELBOARD_CALENDAR_REFRESH_CRON", "0 0 5 * * *");
    let rate_limit_per_minute = parse_usize("REELBOARD_RATE_LIMIT_PER_MINUTE", "120")?;

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        store,
        openrouter_api_key,
        openrouter_base_url,
        openrouter_model,
        stats_request_timeout_secs,
        stats_user_agent,
        stats_max_retries,
        stats_retry_backoff_base_secs,
        tiktok_base_url,
        youtube_base_url,
        calendar_refresh_cron,
        rate_limit_per_minute,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "REELBOARD_ENV".to_string(),
            reason: format!("unknown environment \"{other}\""),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
