//! User documents under `users/{uid}`.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{json, Map, Value};

use crate::{DocPath, DocumentStore, StoreError};

/// ISO-8601 with millisecond precision and a `Z` suffix.
pub(crate) fn iso_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// `users/{uid}`, rejecting uids that are not a single valid key.
///
/// # Errors
///
/// Returns [`StoreError::InvalidKey`] if `uid` is empty or contains a
/// forbidden character.
pub fn user_path(uid: &str) -> Result<DocPath, StoreError> {
    DocPath::parse("users")?.child(uid)
}

/// The whole user document, or `None` if the user does not exist.
///
/// # Errors
///
/// Returns [`StoreError`] if `uid` is invalid or the store fails.
pub async fn get_user(store: &dyn DocumentStore, uid: &str) -> Result<Option<Value>, StoreError> {
    store.get(&user_path(uid)?).await
}

/// Replaces the user document with `{preferences, createdAt}`.
///
/// # Errors
///
/// Returns [`StoreError`] if `uid` is invalid or the store fails.
pub async fn create_user(
    store: &dyn DocumentStore,
    uid: &str,
    preferences: Value,
    now: DateTime<Utc>,
) -> Result<(), StoreError> {
    let preferences = if preferences.is_null() {
        Value::Object(Map::new())
    } else {
        preferences
    };
    let doc = json!({
        "preferences": preferences,
        "createdAt": iso_timestamp(now),
    });
    store.set(&user_path(uid)?, doc).await
}

#[derive(Debug, Clone, PartialEq)]
pub struct FirstLogin {
    pub is_new_user: bool,
    pub data: Value,
}

/// Creates the user from `user_data` on first login; otherwise returns the
/// stored document untouched.
///
/// New users get `user_data`'s fields plus `createdAt`, and `data` echoes
/// `user_data` back.
///
/// # Errors
///
/// Returns [`StoreError`] if `uid` is invalid or the store fails.
pub async fn first_login(
    store: &dyn DocumentStore,
    uid: &str,
    user_data: Value,
    now: DateTime<Utc>,
) -> Result<FirstLogin, StoreError> {
    let path = user_path(uid)?;
    if let Some(existing) = store.get(&path).await? {
        return Ok(FirstLogin {
            is_new_user: false,
            data: existing,
        });
    }

    let mut doc = match &user_data {
        Value::Object(fields) => fields.clone(),
        _ => Map::new(),
    };
    doc.insert("createdAt".to_string(), Value::String(iso_timestamp(now)));
    store.set(&path, Value::Object(doc)).await?;
    tracing::info!(uid, "user document created on first login");

    Ok(FirstLogin {
        is_new_user: true,
        data: user_data,
    })
}

/// Every uid under `users/`.
///
/// # Errors
///
/// Returns [`StoreError`] if the store fails.
pub async fn list_user_ids(store: &dyn DocumentStore) -> Result<Vec<String>, StoreError> {
    store.child_keys(&DocPath::parse("users")?).await
}
