//! JSON document store with Firebase Realtime Database semantics, plus the
//! typed per-user records the dashboard keeps in it.
//!
//! Layout of the tree:
//!
//! ```text
//! users/{uid}/preferences
//! users/{uid}/createdAt
//! users/{uid}/views/{tiktok,youtube}
//! users/{uid}/calendar
//! users/{uid}/calendarExpires
//! users/{uid}/chats/{chatId}/{id,title,timestamp,messages}
//! ```

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

pub mod calendar;
pub mod chats;
pub mod firebase;
pub mod memory;
pub mod path;
pub mod users;
pub mod views;

pub use calendar::{clear_calendar, get_calendar, save_calendar, StoredCalendar};
pub use chats::{chat_messages, create_chat, get_chat, list_chats, save_chat, DEFAULT_CHAT_TITLE};
pub use firebase::FirebaseStore;
pub use memory::MemoryStore;
pub use path::DocPath;
pub use users::{create_user, first_login, get_user, list_user_ids, FirstLogin};
pub use views::{get_views, get_views_config, save_views};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid path \"{path}\": {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("invalid key \"{key}\": {reason}")]
    InvalidKey { key: String, reason: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("failed to deserialize {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

/// A JSON tree addressed by `/`-separated paths.
///
/// `null` and empty containers do not exist: writing one removes the node,
/// and removing the last child of a node removes the node itself.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Value at `path`, or `None` if nothing is stored there.
    async fn get(&self, path: &DocPath) -> Result<Option<Value>, StoreError>;

    /// Replaces the value at `path`.
    async fn set(&self, path: &DocPath, value: Value) -> Result<(), StoreError>;

    /// Writes each field under `path`, leaving other children untouched.
    /// Field names may themselves be `/`-separated relative paths.
    async fn update(&self, path: &DocPath, fields: Map<String, Value>) -> Result<(), StoreError>;

    async fn remove(&self, path: &DocPath) -> Result<(), StoreError>;

    /// Immediate child keys of the node at `path`.
    async fn child_keys(&self, path: &DocPath) -> Result<Vec<String>, StoreError>;
}

/// Strips `null`s and empty containers the way the Realtime Database does.
/// Returns `None` when nothing is left.
#[must_use]
pub fn normalize(value: Value) -> Option<Value> {
    match value {
        Value::Null => None,
        Value::Object(map) => {
            let cleaned: Map<String, Value> = map
                .into_iter()
                .filter_map(|(k, v)| normalize(v).map(|v| (k, v)))
                .collect();
            (!cleaned.is_empty()).then_some(Value::Object(cleaned))
        }
        Value::Array(items) => {
            if items.is_empty() {
                return None;
            }
            let cleaned: Vec<Value> = items
                .into_iter()
                .map(|v| normalize(v).unwrap_or(Value::Null))
                .collect();
            cleaned
                .iter()
                .any(|v| !v.is_null())
                .then_some(Value::Array(cleaned))
        }
        other => Some(other),
    }
}
