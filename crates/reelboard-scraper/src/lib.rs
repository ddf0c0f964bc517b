pub mod client;
pub mod collector;
pub mod embedded;
pub mod error;
pub mod fallback;
pub mod metadata;
pub mod numeric;
pub mod resolve;
mod retry;
pub mod types;

pub use client::ProfileClient;
pub use collector::{assemble, StatsCollector};
pub use embedded::{EmbeddedLocator, ScriptById};
pub use error::{ExtractionFailure, ScraperError};
pub use fallback::{estimate, fallback_metrics, handle_hash};
pub use types::{
    FallbackReason, ProfileMetrics, ProfileSummary, StatsReport, WeeklyPoint, FALLBACK_WARNING,
};
