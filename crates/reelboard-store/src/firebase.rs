use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, Response, Url};
use serde_json::{Map, Value};

use crate::{DocPath, DocumentStore, StoreError};

const REQUEST_TIMEOUT_SECS: u64 = 20;

/// [`DocumentStore`] backed by the Firebase Realtime Database REST API.
///
/// Every node is reachable at `{database_url}/{path}.json`; the optional
/// auth token (a database secret or ID token) travels as `?auth=`.
pub struct FirebaseStore {
    client: Client,
    database_url: Url,
    auth_token: Option<String>,
}

impl FirebaseStore {
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidPath`] if `database_url` is not an
    /// absolute URL, or [`StoreError::Http`] if the HTTP client cannot be built.
    pub fn new(database_url: &str, auth_token: Option<String>) -> Result<Self, StoreError> {
        let database_url = Url::parse(database_url).map_err(|e| StoreError::InvalidPath {
            path: database_url.to_string(),
            reason: e.to_string(),
        })?;
        if database_url.cannot_be_a_base() {
            return Err(StoreError::InvalidPath {
                path: database_url.to_string(),
                reason: "database URL cannot carry a path".to_string(),
            });
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            database_url,
            auth_token,
        })
    }

    /// `{database_url}/{path}.json`, without the auth parameter.
    fn node_url(&self, path: &DocPath) -> Url {
        let mut url = self.database_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty();
            match path.segments().split_last() {
                None => {
                    segments.push(".json");
                }
                Some((last, rest)) => {
                    segments.extend(rest);
                    segments.push(&format!("{last}.json"));
                }
            }
        }
        url
    }

    async fn send(
        &self,
        method: Method,
        path: &DocPath,
        query: &[(&str, &str)],
        body: Option<&Value>,
    ) -> Result<Response, StoreError> {
        let url = self.node_url(path);
        let mut request = self.client.request(method.clone(), url.clone()).query(query);
        if let Some(token) = &self.auth_token {
            request = request.query(&[("auth", token.as_str())]);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        // The request URL carries the auth token; keep it out of errors.
        let response = request
            .send()
            .await
            .map_err(|e| StoreError::Http(e.without_url()))?;
        let status = response.status();
        if !status.is_success() {
            tracing::warn!(%method, %url, status = status.as_u16(), "realtime database request failed");
            return Err(StoreError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response)
    }

    async fn read_json(response: Response, path: &DocPath) -> Result<Value, StoreError> {
        let body = response
            .text()
            .await
            .map_err(|e| StoreError::Http(e.without_url()))?;
        serde_json::from_str(&body).map_err(|source| StoreError::Deserialize {
            context: format!("realtime database node {path}"),
            source,
        })
    }
}

#[async_trait]
impl DocumentStore for FirebaseStore {
    async fn get(&self, path: &DocPath) -> Result<Option<Value>, StoreError> {
        let response = self.send(Method::GET, path, &[], None).await?;
        let value = Self::read_json(response, path).await?;
        Ok(crate::normalize(value))
    }

    async fn set(&self, path: &DocPath, value: Value) -> Result<(), StoreError> {
        match crate::normalize(value) {
            Some(value) => {
                self.send(Method::PUT, path, &[("print", "silent")], Some(&value))
                    .await?;
            }
            None => self.remove(path).await?,
        }
        Ok(())
    }

    async fn update(&self, path: &DocPath, fields: Map<String, Value>) -> Result<(), StoreError> {
        if fields.is_empty() {
            return Ok(());
        }
        for key in fields.keys() {
            DocPath::parse(key)?;
        }
        let body = Value::Object(fields);
        self.send(Method::PATCH, path, &[("print", "silent")], Some(&body))
            .await?;
        Ok(())
    }

    async fn remove(&self, path: &DocPath) -> Result<(), StoreError> {
        self.send(Method::DELETE, path, &[], None).await?;
        Ok(())
    }

    async fn child_keys(&self, path: &DocPath) -> Result<Vec<String>, StoreError> {
        let response = self
            .send(Method::GET, path, &[("shallow", "true")], None)
            .await?;
        let keys = match Self::read_json(response, path).await? {
            Value::Object(map) => map.into_iter().map(|(k, _)| k).collect(),
            _ => Vec::new(),
        };
        Ok(keys)
    }
}
