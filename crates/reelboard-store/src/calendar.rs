//! The generated posting calendar, stored beside the user's preferences as
//! `users/{uid}/calendar` and `users/{uid}/calendarExpires`.

use serde_json::{Map, Value};

use crate::users::user_path;
use crate::{DocumentStore, StoreError};

#[derive(Debug, Clone, PartialEq)]
pub struct StoredCalendar {
    /// Week columns as stored; an empty array when none was generated.
    pub calendar: Value,
    pub calendar_expires: Option<String>,
}

/// Calendar of an existing user, `None` when the user does not exist.
///
/// # Errors
///
/// Returns [`StoreError`] if `uid` is invalid or the store fails.
pub async fn get_calendar(
    store: &dyn DocumentStore,
    uid: &str,
) -> Result<Option<StoredCalendar>, StoreError> {
    let Some(user) = store.get(&user_path(uid)?).await? else {
        return Ok(None);
    };
    Ok(Some(StoredCalendar {
        calendar: user
            .get("calendar")
            .cloned()
            .unwrap_or_else(|| Value::Array(Vec::new())),
        calendar_expires: user
            .get("calendarExpires")
            .and_then(Value::as_str)
            .map(str::to_string),
    }))
}

/// Writes both calendar fields in one update, leaving the rest of the
/// user document alone.
///
/// # Errors
///
/// Returns [`StoreError`] if `uid` is invalid or the store fails.
pub async fn save_calendar(
    store: &dyn DocumentStore,
    uid: &str,
    weeks: Value,
    expires: &str,
) -> Result<(), StoreError> {
    let mut fields = Map::new();
    fields.insert("calendar".to_string(), weeks);
    fields.insert(
        "calendarExpires".to_string(),
        Value::String(expires.to_string()),
    );
    store.update(&user_path(uid)?, fields).await
}

/// Removes the calendar and its expiry date.
///
/// # Errors
///
/// Returns [`StoreError`] if `uid` is invalid or the store fails.
pub async fn clear_calendar(store: &dyn DocumentStore, uid: &str) -> Result<(), StoreError> {
    let user = user_path(uid)?;
    store.remove(&user.child("calendar")?).await?;
    store.remove(&user.child("calendarExpires")?).await
}
