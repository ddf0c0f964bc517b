//! Regenerates posting calendars that have passed their `calendarExpires`
//! date.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use reelboard_assistant::{is_expired, OpenRouterClient};
use reelboard_store::{get_calendar, list_user_ids, DocumentStore, StoredCalendar};
use serde_json::Value;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use crate::api::AppState;
use crate::calendars;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RefreshSummary {
    pub checked: usize,
    pub refreshed: usize,
    pub failed: usize,
}

/// Registers the refresh job on `cron`. Without an LLM client the job is
/// not registered at all.
pub(super) async fn register_calendar_refresh_job(
    scheduler: &JobScheduler,
    state: AppState,
    cron: &str,
) -> Result<(), JobSchedulerError> {
    let Some(assistant) = state.assistant.clone() else {
        tracing::warn!("scheduler: no LLM configured; calendar refresh disabled");
        return Ok(());
    };
    let store = Arc::clone(&state.store);

    let job = Job::new_async(cron, move |_uuid, _lock| {
        let store = Arc::clone(&store);
        let assistant = Arc::clone(&assistant);

        Box::pin(async move {
            tracing::info!("scheduler: starting calendar refresh run");
            let summary =
                run_calendar_refresh(store.as_ref(), &assistant, Utc::now().date_naive()).await;
            tracing::info!(
                checked = summary.checked,
                refreshed = summary.refreshed,
                failed = summary.failed,
                "scheduler: calendar refresh run complete"
            );
        })
    })?;

    scheduler.add(job).await?;
    tracing::info!(cron, "scheduler: registered calendar refresh job");
    Ok(())
}

/// A calendar is refreshed only if one was generated before and it expired.
fn needs_refresh(stored: &StoredCalendar, today: NaiveDate) -> bool {
    let has_calendar = match &stored.calendar {
        Value::Array(weeks) => !weeks.is_empty(),
        Value::Null => false,
        _ => true,
    };
    (has_calendar || stored.calendar_expires.is_some())
        && is_expired(stored.calendar_expires.as_deref(), today)
}

/// Checks every user and regenerates expired calendars. Per-user failures
/// are logged and counted; they never stop the run.
pub async fn run_calendar_refresh(
    store: &dyn DocumentStore,
    assistant: &OpenRouterClient,
    today: NaiveDate,
) -> RefreshSummary {
    let mut summary = RefreshSummary::default();
    let uids = match list_user_ids(store).await {
        Ok(uids) => uids,
        Err(e) => {
            tracing::error!(error = %e, "scheduler: failed to list users");
            return summary;
        }
    };

    for uid in &uids {
        summary.checked += 1;
        let stored = match get_calendar(store, uid).await {
            Ok(Some(stored)) => stored,
            Ok(None) => continue,
            Err(e) => {
                tracing::error!(uid, error = %e, "scheduler: failed to load calendar");
                summary.failed += 1;
                continue;
            }
        };
        if !needs_refresh(&stored, today) {
            continue;
        }

        match calendars::regenerate(store, assistant, uid, today).await {
            Ok(_) => summary.refreshed += 1,
            Err(e) => {
                tracing::error!(uid, error = %e, "scheduler: calendar refresh failed");
                summary.failed += 1;
            }
        }
    }
    summary
}

#[cfg(test)]
mod tests {
    use reelboard_store::MemoryStore;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, day).unwrap()
    }

    fn stored(calendar: Value, expires: Option<&str>) -> StoredCalendar {
        StoredCalendar {
            calendar,
            calendar_expires: expires.map(str::to_string),
        }
    }

    #[test]
    fn users_without_calendar_are_left_alone() {
        assert!(!needs_refresh(&stored(json!([]), None), date(17)));
    }

    #[test]
    fn expired_calendar_needs_refresh() {
        let weeks = json!([{"day": "Seg", "events": []}]);
        assert!(needs_refresh(&stored(weeks.clone(), Some("2026-10-16")), date(17)));
        assert!(!needs_refresh(&stored(weeks.clone(), Some("2026-10-17")), date(17)));
        // calendar without a usable expiry is treated as expired
        assert!(needs_refresh(&stored(weeks, None), date(17)));
    }

    #[test]
    fn dangling_expiry_counts_as_calendar() {
        assert!(needs_refresh(&stored(json!([]), Some("2026-01-01")), date(17)));
    }

    async fn mock_llm(server: &MockServer) {
        let arguments = json!({
            "weeks": [{"day": "Segunda", "events": [
                {"id": 1, "title": "Novo", "time": "10:00", "color": "red", "height": "h-24"}
            ]}],
            "expires": "2026-10-31"
        })
        .to_string();
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"tool_calls": [{"type": "function", "function": {
                    "name": "generate_calendar", "arguments": arguments
                }}]}}]
            })))
            .expect(1)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn refresh_regenerates_only_expired_calendars() {
        let server = MockServer::start().await;
        mock_llm(&server).await;
        let assistant =
            OpenRouterClient::with_base_url("k", "m", 30, &server.uri()).unwrap();
        let store = MemoryStore::with_tree(json!({"users": {
            "stale": {"preferences": {"niche": "tech"}, "calendar": [{"day": "Seg", "events": []}], "calendarExpires": "2026-10-01"},
            "fresh": {"preferences": {"niche": "food"}, "calendar": [{"day": "Seg", "events": []}], "calendarExpires": "2026-12-01"},
            "never": {"preferences": {"niche": "pets"}}
        }}));

        let summary = run_calendar_refresh(&store, &assistant, date(17)).await;
        assert_eq!(
            summary,
            RefreshSummary {
                checked: 3,
                refreshed: 1,
                failed: 0
            }
        );
        let stale = get_calendar(&store, "stale").await.unwrap().unwrap();
        assert_eq!(stale.calendar_expires.as_deref(), Some("2026-10-31"));
        assert_eq!(stale.calendar[0]["events"][0]["title"], "Novo");
        let fresh = get_calendar(&store, "fresh").await.unwrap().unwrap();
        assert_eq!(fresh.calendar_expires.as_deref(), Some("2026-12-01"));
    }

    #[tokio::test]
    async fn llm_failure_is_counted_not_fatal() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        let assistant =
            OpenRouterClient::with_base_url("k", "m", 30, &server.uri()).unwrap();
        let store = MemoryStore::with_tree(json!({"users": {
            "a": {"calendar": [{"day": "Seg", "events": []}], "calendarExpires": "2026-10-01"},
            "b": {"calendar": [{"day": "Seg", "events": []}], "calendarExpires": "2026-10-02"}
        }}));

        let summary = run_calendar_refresh(&store, &assistant, date(17)).await;
        assert_eq!(summary.refreshed, 0);
        assert_eq!(summary.failed, 2);
    }
}
