//! Conversion of human-readable magnitude strings ("2.95K subscribers",
//! "1,234 views", "1,2 mi") into integer counts.
//!
//! Parsing never fails loudly: anything that does not look like a number
//! yields `None` and the caller moves on to its next pattern or source.

use std::sync::LazyLock;

use regex::Regex;

use crate::types::MetricKind;

static SUBSCRIBERS_PHRASE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)([\d.,]+)\s*([MK]?)\s*subscribers?").expect("valid regex")
});
static VIEWS_PHRASE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)([\d.,]+)\s*([MK]?)\s*(?:total\s*)?(?:views?|visualizações)")
        .expect("valid regex")
});
static VIDEOS_PHRASE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)([\d.,]+)\s*([MK]?)\s*(?:videos?|vídeos)").expect("valid regex")
});
static LIKES_PHRASE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)([\d.,]+)\s*([MK]?)\s*(?:likes?|curtidas?)").expect("valid regex")
});
// Raw magnitude followed by whatever word comes next; the word is mapped to
// a unit by `unit_from_word` so "1.2M", "12 mil" and "1,234 subscribers"
// all land in the same place.
static COUNT_TEXT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([\d.,]+)\s*(\p{L}*)").expect("valid regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    None,
    Thousand,
    Million,
}

impl Unit {
    fn multiplier(self) -> f64 {
        match self {
            Unit::None => 1.0,
            Unit::Thousand => 1_000.0,
            Unit::Million => 1_000_000.0,
        }
    }

    /// Maps a single unit letter (`K`/`M`, any case) to a unit.
    #[must_use]
    pub fn from_letter(letter: &str) -> Self {
        match letter {
            "K" | "k" => Unit::Thousand,
            "M" | "m" => Unit::Million,
            _ => Unit::None,
        }
    }
}

/// A parsed decimal value plus its abbreviation unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Magnitude {
    pub value: f64,
    pub unit: Unit,
}

impl Magnitude {
    /// `floor(value × unit)`, saturating at `u64::MAX`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn to_count(self) -> u64 {
        let scaled = (self.value * self.unit.multiplier()).floor();
        if scaled.is_finite() && scaled > 0.0 {
            scaled as u64
        } else {
            0
        }
    }
}

/// Parses the numeric part of a magnitude string.
///
/// Thousands-separator commas are stripped, then the longest leading
/// decimal prefix is read ("1.2.3" reads as 1.2). Returns `None` when no
/// digit is present.
#[must_use]
pub fn parse_number(raw: &str) -> Option<f64> {
    let cleaned: String = raw.chars().filter(|c| *c != ',').collect();
    let mut end = 0usize;
    let mut seen_dot = false;
    let mut seen_digit = false;
    for (i, c) in cleaned.char_indices() {
        if c.is_ascii_digit() {
            seen_digit = true;
        } else if c == '.' && !seen_dot {
            seen_dot = true;
        } else {
            break;
        }
        end = i + c.len_utf8();
    }
    if !seen_digit {
        return None;
    }
    cleaned[..end].parse::<f64>().ok()
}

/// Parses `number` and a unit letter into a [`Magnitude`].
#[must_use]
pub fn parse_magnitude(number: &str, unit: &str) -> Option<Magnitude> {
    let value = parse_number(number)?;
    Some(Magnitude {
        value,
        unit: Unit::from_letter(unit),
    })
}

/// Parses the first "<number> [K|M] <keyword>" phrase for `kind` in `text`.
///
/// Keywords include the Portuguese forms the platforms serve to pt-BR
/// visitors ("visualizações", "vídeos", "curtidas").
#[must_use]
pub fn parse_metric_phrase(kind: MetricKind, text: &str) -> Option<Magnitude> {
    let re: &Regex = match kind {
        MetricKind::Subscribers => &SUBSCRIBERS_PHRASE_RE,
        MetricKind::Views => &VIEWS_PHRASE_RE,
        MetricKind::Videos => &VIDEOS_PHRASE_RE,
        MetricKind::Likes => &LIKES_PHRASE_RE,
    };
    let caps = re.captures(text)?;
    parse_magnitude(caps.get(1)?.as_str(), caps.get(2).map_or("", |m| m.as_str()))
}

/// Parses a bare count text such as `"1.2M subscribers"`, `"2,95K"` or
/// `"12 mil inscritos"`; no trailing keyword is required.
#[must_use]
pub fn parse_count_text(text: &str) -> Option<Magnitude> {
    let caps = COUNT_TEXT_RE.captures(text)?;
    let value = parse_number(caps.get(1)?.as_str())?;
    let unit = unit_from_word(caps.get(2).map_or("", |m| m.as_str()));
    Some(Magnitude { value, unit })
}

fn unit_from_word(word: &str) -> Unit {
    match word {
        "K" | "k" | "mil" | "thousand" => Unit::Thousand,
        "M" | "m" | "mi" | "million" | "millions" | "milhão" | "milhões" | "mln" => Unit::Million,
        _ => Unit::None,
    }
}

#[cfg(test)]
#[path = "numeric_test.rs"]
mod tests;
