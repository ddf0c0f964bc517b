use std::fmt;

use crate::StoreError;

const FORBIDDEN_KEY_CHARS: [char; 6] = ['.', '#', '$', '[', ']', '/'];

/// Checks a single key against the Realtime Database key rules.
///
/// # Errors
///
/// Returns [`StoreError::InvalidKey`] for an empty key, a key containing
/// `. # $ [ ] /`, or one containing control characters.
pub fn validate_key(key: &str) -> Result<(), StoreError> {
    let invalid = |reason: &str| StoreError::InvalidKey {
        key: key.to_string(),
        reason: reason.to_string(),
    };
    if key.trim().is_empty() {
        return Err(invalid("key is empty"));
    }
    if let Some(c) = key.chars().find(|c| FORBIDDEN_KEY_CHARS.contains(c)) {
        return Err(invalid(&format!("contains forbidden character '{c}'")));
    }
    if key.chars().any(char::is_control) {
        return Err(invalid("contains control characters"));
    }
    Ok(())
}

/// A validated `/`-separated location in the document tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct DocPath {
    segments: Vec<String>,
}

impl DocPath {
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    /// Parses `"users/u1/views"`. Leading and trailing slashes are ignored;
    /// `""` and `"/"` are the root.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidPath`] if any segment is empty or breaks
    /// the key rules.
    pub fn parse(raw: &str) -> Result<Self, StoreError> {
        let trimmed = raw.trim_matches('/');
        if trimmed.is_empty() {
            return Ok(Self::root());
        }
        let segments = trimmed
            .split('/')
            .map(|segment| {
                validate_key(segment)
                    .map(|()| segment.to_string())
                    .map_err(|e| StoreError::InvalidPath {
                        path: raw.to_string(),
                        reason: e.to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { segments })
    }

    /// This path extended by one key.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidKey`] if `key` breaks the key rules.
    pub fn child(&self, key: &str) -> Result<Self, StoreError> {
        validate_key(key)?;
        let mut segments = self.segments.clone();
        segments.push(key.to_string());
        Ok(Self { segments })
    }

    /// This path extended by every segment of `other`.
    #[must_use]
    pub fn join(&self, other: &DocPath) -> Self {
        let mut segments = self.segments.clone();
        segments.extend(other.segments.iter().cloned());
        Self { segments }
    }

    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

impl fmt::Display for DocPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.segments.join("/"))
    }
}
