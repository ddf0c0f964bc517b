//! Locating JSON blobs that pages embed in `<script>` tags.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

static SCRIPT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<script\b[^>]*>(.*?)</script>").expect("valid regex"));
static TRAILING_COMMA_OBJECT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",\s*\}").expect("valid regex"));
static TRAILING_COMMA_ARRAY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",\s*\]").expect("valid regex"));

/// Finds the object literal assigned to one global identifier.
///
/// The assignment forms are tried in order: `var X =`, `window["X"] =`,
/// `window.X =` and a bare `X =`. Only the first occurrence of the first
/// form present in the document is used. If that does not yield an object,
/// each `<script>` block that mentions one of the prefixed forms is searched
/// the same way.
#[derive(Debug)]
pub struct EmbeddedLocator {
    patterns: Vec<Regex>,
    markers: [String; 3],
}

impl EmbeddedLocator {
    /// # Errors
    ///
    /// Returns [`regex::Error`] if the assignment patterns fail to compile.
    pub fn new(identifier: &str) -> Result<Self, regex::Error> {
        let id = regex::escape(identifier);
        let patterns = [
            format!(r"var\s+{id}\s*=\s*"),
            format!(r#"window\["{id}"\]\s*=\s*"#),
            format!(r"window\.{id}\s*=\s*"),
            format!(r"{id}\s*=\s*"),
        ]
        .iter()
        .map(|p| Regex::new(p))
        .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            patterns,
            markers: [
                format!("var {identifier}"),
                format!("window[\"{identifier}\"]"),
                format!("window.{identifier}"),
            ],
        })
    }

    /// Returns `None` when no assignment is found, the object is
    /// unterminated, or it does not parse even after trailing commas are
    /// removed.
    #[must_use]
    pub fn locate(&self, html: &str) -> Option<Value> {
        if let Some(value) = self.from_first_assignment(html) {
            return Some(value);
        }
        SCRIPT_RE.captures_iter(html).find_map(|caps| {
            let content = caps.get(1)?.as_str();
            if !self.markers.iter().any(|m| content.contains(m.as_str())) {
                return None;
            }
            self.from_first_assignment(content)
        })
    }

    fn from_first_assignment(&self, text: &str) -> Option<Value> {
        let start = self.patterns.iter().find_map(|re| re.find(text))?;
        let object = extract_balanced_object(&text[start.end()..])?;
        parse_lenient(object)
    }
}

/// Returns the shortest prefix of `s` that forms a complete `{...}` object.
///
/// Braces inside string literals are ignored, and a backslash escapes the
/// next character in or out of a string, so `{"c": "}{"}` is returned whole.
/// `s` must start with `{`.
pub(crate) fn extract_balanced_object(s: &str) -> Option<&str> {
    if !s.starts_with('{') {
        return None;
    }
    let mut depth: i32 = 0;
    let mut in_string = false;
    let mut escape = false;
    for (i, c) in s.char_indices() {
        if escape {
            escape = false;
            continue;
        }
        if c == '\\' {
            escape = true;
            continue;
        }
        if in_string {
            if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&s[..=i]);
                }
            }
            _ => {}
        }
    }
    None
}

fn parse_lenient(candidate: &str) -> Option<Value> {
    if let Ok(value) = serde_json::from_str::<Value>(candidate) {
        return Some(value);
    }
    let cleaned = TRAILING_COMMA_OBJECT_RE.replace_all(candidate, "}");
    let cleaned = TRAILING_COMMA_ARRAY_RE.replace_all(&cleaned, "]");
    match serde_json::from_str::<Value>(&cleaned) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::debug!(error = %e, "embedded JSON did not parse after cleanup");
            None
        }
    }
}

/// Parses the JSON body of the `<script id="...">` element with one id.
#[derive(Debug)]
pub struct ScriptById {
    re: Regex,
}

impl ScriptById {
    /// # Errors
    ///
    /// Returns [`regex::Error`] if the pattern fails to compile.
    pub fn new(id: &str) -> Result<Self, regex::Error> {
        let pattern = format!(
            r#"(?is)<script[^>]*\bid\s*=\s*["']{}["'][^>]*>(.*?)</script>"#,
            regex::escape(id)
        );
        Ok(Self {
            re: Regex::new(&pattern)?,
        })
    }

    #[must_use]
    pub fn parse(&self, html: &str) -> Option<Value> {
        let body = self.re.captures(html)?.get(1)?.as_str().trim();
        serde_json::from_str(body).ok()
    }
}
