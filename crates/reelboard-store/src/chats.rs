//! Script-assistant conversations under `users/{uid}/chats/{chatId}`.

use std::cmp::Reverse;

use chrono::{DateTime, Utc};
use serde_json::{json, Map, Value};
use uuid::Uuid;

use crate::users::{iso_timestamp, user_path};
use crate::{DocPath, DocumentStore, StoreError};

pub const DEFAULT_CHAT_TITLE: &str = "Sem título";

fn chat_path(uid: &str, chat_id: &str) -> Result<DocPath, StoreError> {
    user_path(uid)?.child("chats")?.child(chat_id)
}

/// Stores `chat` under a fresh v4 id and returns the id.
///
/// The stored document carries `id` and keeps the caller's `timestamp`
/// when present, otherwise `now`.
///
/// # Errors
///
/// Returns [`StoreError`] if `uid` is invalid or the store fails.
pub async fn create_chat(
    store: &dyn DocumentStore,
    uid: &str,
    chat: Map<String, Value>,
    now: DateTime<Utc>,
) -> Result<String, StoreError> {
    let chat_id = Uuid::new_v4().to_string();
    let mut doc = chat;
    doc.insert("id".to_string(), Value::String(chat_id.clone()));
    let has_timestamp = doc.get("timestamp").is_some_and(is_truthy);
    if !has_timestamp {
        doc.insert("timestamp".to_string(), Value::String(iso_timestamp(now)));
    }
    store
        .set(&chat_path(uid, &chat_id)?, Value::Object(doc))
        .await?;
    Ok(chat_id)
}

/// Replaces the chat with `{id, title, timestamp: now, messages}`.
///
/// A missing or empty `title` becomes [`DEFAULT_CHAT_TITLE`].
///
/// # Errors
///
/// Returns [`StoreError`] if `uid` or `chat_id` is invalid or the store fails.
pub async fn save_chat(
    store: &dyn DocumentStore,
    uid: &str,
    chat_id: &str,
    title: Option<&str>,
    messages: Option<Value>,
    now: DateTime<Utc>,
) -> Result<(), StoreError> {
    let title = title
        .filter(|t| !t.is_empty())
        .unwrap_or(DEFAULT_CHAT_TITLE);
    let doc = json!({
        "id": chat_id,
        "title": title,
        "timestamp": iso_timestamp(now),
        "messages": messages.unwrap_or_else(|| Value::Array(Vec::new())),
    });
    store.set(&chat_path(uid, chat_id)?, doc).await
}

/// One chat with its `id` filled in, or `None`.
///
/// # Errors
///
/// Returns [`StoreError`] if `uid` or `chat_id` is invalid or the store fails.
pub async fn get_chat(
    store: &dyn DocumentStore,
    uid: &str,
    chat_id: &str,
) -> Result<Option<Value>, StoreError> {
    let chat = store.get(&chat_path(uid, chat_id)?).await?;
    Ok(chat.map(|chat| with_id(chat, chat_id)))
}

/// The chat's stored `messages`, empty when the chat or field is missing.
///
/// # Errors
///
/// Returns [`StoreError`] if `uid` or `chat_id` is invalid or the store fails.
pub async fn chat_messages(
    store: &dyn DocumentStore,
    uid: &str,
    chat_id: &str,
) -> Result<Vec<Value>, StoreError> {
    let messages = get_chat(store, uid, chat_id)
        .await?
        .and_then(|chat| chat.get("messages").cloned());
    Ok(match messages {
        Some(Value::Array(items)) => items.into_iter().filter(|m| !m.is_null()).collect(),
        _ => Vec::new(),
    })
}

/// All chats of a user, newest `timestamp` first. Chats without a
/// parsable timestamp sort last.
///
/// # Errors
///
/// Returns [`StoreError`] if `uid` is invalid or the store fails.
pub async fn list_chats(store: &dyn DocumentStore, uid: &str) -> Result<Vec<Value>, StoreError> {
    let Some(Value::Object(chats)) = store.get(&user_path(uid)?.child("chats")?).await? else {
        return Ok(Vec::new());
    };

    let mut list: Vec<Value> = chats
        .into_iter()
        .map(|(chat_id, chat)| with_id(chat, &chat_id))
        .collect();
    list.sort_by_key(|chat| Reverse(timestamp_millis(chat)));
    Ok(list)
}

fn with_id(chat: Value, chat_id: &str) -> Value {
    match chat {
        Value::Object(mut map) => {
            map.insert("id".to_string(), Value::String(chat_id.to_string()));
            Value::Object(map)
        }
        other => other,
    }
}

fn timestamp_millis(chat: &Value) -> i64 {
    chat.get("timestamp")
        .and_then(Value::as_str)
        .and_then(|ts| DateTime::parse_from_rfc3339(ts).ok())
        .map_or(0, |ts| ts.timestamp_millis())
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        _ => true,
    }
}
