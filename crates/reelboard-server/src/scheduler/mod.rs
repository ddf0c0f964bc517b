//! Background job scheduler.
//!
//! Initialises a [`JobScheduler`] at server startup and registers the
//! recurring calendar refresh.

mod calendar_refresh;

use reelboard_core::AppConfig;
use tokio_cron_scheduler::{JobScheduler, JobSchedulerError};

use crate::api::AppState;

/// Builds and starts the background job scheduler.
///
/// The returned handle must be kept alive for the lifetime of the process.
/// Dropping it shuts down all jobs.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised,
/// the cron expression is invalid, or the scheduler fails to start.
pub async fn build_scheduler(
    state: AppState,
    config: &AppConfig,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;
    calendar_refresh::register_calendar_refresh_job(
        &scheduler,
        state,
        &config.calendar_refresh_cron,
    )
    .await?;
    scheduler.start().await?;
    Ok(scheduler)
}
