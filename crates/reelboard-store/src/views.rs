//! Saved platform handles under `users/{uid}/views`.

use reelboard_core::ViewsConfig;
use serde_json::{Map, Value};

use crate::users::user_path;
use crate::{DocumentStore, StoreError};

/// Raw `views` node. Empty or missing configs are `None`.
///
/// # Errors
///
/// Returns [`StoreError`] if `uid` is invalid or the store fails.
pub async fn get_views(store: &dyn DocumentStore, uid: &str) -> Result<Option<Value>, StoreError> {
    store.get(&user_path(uid)?.child("views")?).await
}

/// Typed `views` node. A node that is not an object yields a config with
/// no handles.
///
/// # Errors
///
/// Returns [`StoreError::Deserialize`] if the object cannot be read as a
/// [`ViewsConfig`], or any error from [`get_views`].
pub async fn get_views_config(
    store: &dyn DocumentStore,
    uid: &str,
) -> Result<Option<ViewsConfig>, StoreError> {
    get_views(store, uid)
        .await?
        .map(|value| match value {
            Value::Object(_) => {
                serde_json::from_value(value).map_err(|source| StoreError::Deserialize {
                    context: format!("views config for user {uid}"),
                    source,
                })
            }
            _ => Ok(ViewsConfig::default()),
        })
        .transpose()
}

/// Replaces the `views` node with `usernames`.
///
/// # Errors
///
/// Returns [`StoreError`] if `uid` is invalid or the store fails.
pub async fn save_views(
    store: &dyn DocumentStore,
    uid: &str,
    usernames: Map<String, Value>,
) -> Result<(), StoreError> {
    store
        .set(&user_path(uid)?.child("views")?, Value::Object(usernames))
        .await
}

#[cfg(test)]
mod tests {
    use reelboard_core::Platform;
    use serde_json::json;

    use super::*;
    use crate::MemoryStore;

    #[tokio::test]
    async fn saved_views_round_trip_into_config() {
        let store = MemoryStore::new();
        let usernames = json!({"tiktok": "foo", "youtube": "bar"});
        let Value::Object(map) = usernames else {
            unreachable!()
        };
        save_views(&store, "u1", map).await.unwrap();

        let config = get_views_config(&store, "u1").await.unwrap().unwrap();
        assert_eq!(config.handle_for(Platform::Tiktok), Some("foo"));
        assert_eq!(config.handle_for(Platform::Youtube), Some("bar"));
    }

    #[tokio::test]
    async fn missing_views_is_none() {
        let store = MemoryStore::new();
        assert!(get_views(&store, "u1").await.unwrap().is_none());
        assert!(get_views_config(&store, "u1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn numeric_handle_is_read_as_text() {
        let store = MemoryStore::with_tree(json!({"users": {"u1": {"views": {"tiktok": 42}}}}));
        let config = get_views_config(&store, "u1").await.unwrap().unwrap();
        assert_eq!(config.handle_for(Platform::Tiktok), Some("42"));
    }

    #[tokio::test]
    async fn non_object_views_has_no_handles() {
        let store = MemoryStore::with_tree(json!({"users": {"u1": {"views": "foo"}}}));
        let config = get_views_config(&store, "u1").await.unwrap().unwrap();
        assert_eq!(config.handle_for(Platform::Tiktok), None);
        assert_eq!(config.handle_for(Platform::Youtube), None);
    }
}
