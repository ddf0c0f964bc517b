use std::net::SocketAddr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Which document store backs user data.
#[derive(Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    Firebase {
        database_url: String,
        auth_token: Option<String>,
    },
}

impl std::fmt::Debug for StoreBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreBackend::Memory => f.write_str("Memory"),
            StoreBackend::Firebase {
                database_url,
                auth_token,
            } => f
                .debug_struct("Firebase")
                .field("database_url", database_url)
                .field("auth_token", &auth_token.as_ref().map(|_| "[redacted]"))
                .finish(),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub store: StoreBackend,
    pub openrouter_api_key: Option<String>,
    pub openrouter_base_url: String,
    pub openrouter_model: String,
    pub stats_request_timeout_secs: u64,
    pub stats_user_agent: String,
    pub stats_max_retries: u32,
    pub stats_retry_backoff_base_secs: u64,
    pub tiktok_base_url: String,
    pub youtube_base_url: String,
    pub calendar_refresh_cron: String,
    pub rate_limit_per_minute: usize,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("store", &self.store)
            .field(
                "openrouter_api_key",
                &self.openrouter_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("openrouter_base_url", &self.openrouter_base_url)
            .field("openrouter_model", &self.openrouter_model)
            .field(
                "stats_request_timeout_secs",
                &self.stats_request_timeout_secs,
            )
            .field("stats_user_agent", &self.stats_user_agent)
            .field("stats_max_retries", &self.stats_max_retries)
            .field(
                "stats_retry_backoff_base_secs",
                &self.stats_retry_backoff_base_secs,
            )
            .field("tiktok_base_url", &self.tiktok_base_url)
            .field("youtube_base_url", &self.youtube_base_url)
            .field("calendar_refresh_cron", &self.calendar_refresh_cron)
            .field("rate_limit_per_minute", &self.rate_limit_per_minute)
            .finish()
    }
}
