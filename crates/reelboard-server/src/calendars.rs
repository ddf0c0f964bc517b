//! Calendar regeneration shared by the HTTP routes and the refresh job.

use chrono::NaiveDate;
use reelboard_assistant::{AssistantError, CalendarPlan, OpenRouterClient};
use reelboard_store::{get_user, save_calendar, DocumentStore, StoreError};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CalendarError {
    #[error("user {0} not found")]
    UserNotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Assistant(#[from] AssistantError),

    #[error("failed to encode calendar: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Fields of the user document that are not preferences and stay out of
/// the prompt.
const NON_PREFERENCE_FIELDS: [&str; 3] = ["calendar", "calendarExpires", "chats"];

/// Generates a fresh calendar from the stored user document and saves it
/// over `calendar` and `calendarExpires`.
pub async fn regenerate(
    store: &dyn DocumentStore,
    assistant: &OpenRouterClient,
    uid: &str,
    today: NaiveDate,
) -> Result<CalendarPlan, CalendarError> {
    let Some(mut user) = get_user(store, uid).await? else {
        return Err(CalendarError::UserNotFound(uid.to_string()));
    };
    if let Value::Object(fields) = &mut user {
        for key in NON_PREFERENCE_FIELDS {
            fields.remove(key);
        }
    }

    let plan = assistant.generate_calendar(&user, today).await?;
    save_calendar(store, uid, serde_json::to_value(&plan.weeks)?, &plan.expires).await?;
    tracing::info!(uid, expires = %plan.expires, "calendar saved");
    Ok(plan)
}
