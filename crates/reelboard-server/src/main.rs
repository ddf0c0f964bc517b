mod api;
mod calendars;
mod middleware;
mod scheduler;

use std::sync::Arc;
use std::time::Duration;

use reelboard_assistant::OpenRouterClient;
use reelboard_core::{AppConfig, StoreBackend};
use reelboard_scraper::{ProfileClient, StatsCollector};
use reelboard_store::{DocumentStore, FirebaseStore, MemoryStore};
use tracing_subscriber::EnvFilter;

use crate::{api::build_app, api::AppState, middleware::RateLimitState};

/// Completions can take a while on the free model tier.
const LLM_TIMEOUT_SECS: u64 = 120;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Arc::new(reelboard_core::load_app_config()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    tracing::info!(config = ?config, "starting reelboard-server");

    let state = build_state(&config)?;
    let _scheduler = scheduler::build_scheduler(state.clone(), &config).await?;

    let rate_limit = RateLimitState::new(config.rate_limit_per_minute, Duration::from_secs(60));
    let app = build_app(state, rate_limit);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

fn build_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let store: Arc<dyn DocumentStore> = match &config.store {
        StoreBackend::Memory => {
            tracing::warn!("using in-memory document store; data is lost on restart");
            Arc::new(MemoryStore::new())
        }
        StoreBackend::Firebase {
            database_url,
            auth_token,
        } => Arc::new(FirebaseStore::new(database_url, auth_token.clone())?),
    };

    let profile_client = ProfileClient::new(
        config.stats_request_timeout_secs,
        &config.stats_user_agent,
        config.stats_max_retries,
        config.stats_retry_backoff_base_secs,
    )?
    .with_base_urls(&config.tiktok_base_url, &config.youtube_base_url);

    let assistant = match &config.openrouter_api_key {
        Some(key) => Some(Arc::new(OpenRouterClient::with_base_url(
            key,
            &config.openrouter_model,
            LLM_TIMEOUT_SECS,
            &config.openrouter_base_url,
        )?)),
        None => {
            tracing::warn!("OPENROUTER_API_KEY not set; calendar and script routes will fail");
            None
        }
    };

    Ok(AppState {
        store,
        stats: Arc::new(StatsCollector::new(profile_client)),
        assistant,
    })
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
