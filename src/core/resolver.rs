//! Resource ID resolution
//!
//! Turns whatever the user typed (a bare ID, a watch URL, a short link, an
//! embed or shorts URL) into the canonical 11-character resource ID.

use std::fmt;

use log::info;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::core::error::{Error, Result};

/// Characters that mark a reference as URL-shaped rather than a bare ID
const URL_INDICATOR_CHARS: &[char] = &['"', '?', '&', '/', '<', '%', '='];

/// Characters a resolved ID may never contain
const FORBIDDEN_ID_CHARS: &[char] = &['?', '&', '/', '<', '%', '='];

/// Substring that identifies the hosting service in full or short URLs
const HOST_MARKER: &str = "youtu";

/// Minimum accepted ID length
const MIN_ID_LEN: usize = 10;

/// Extraction patterns, most specific first
static ID_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r#"(?:v|embed|shorts|watch\?v)(?:=|/)([^"&?/=%]{11})"#,
        r#"(?:=|/)([^"&?/=%]{11})"#,
        r#"([^"&?/=%]{11})"#,
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("ID pattern must compile"))
    .collect()
});

/// Canonical identifier of a hosted video
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceId(String);

impl ResourceId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ResourceId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Whether a reference needs pattern extraction at all
fn looks_like_url(reference: &str) -> bool {
    reference.contains(HOST_MARKER) || reference.contains(URL_INDICATOR_CHARS)
}

/// Pick the candidate ID out of a reference without validating it
///
/// Bare references come back unchanged. URL-shaped ones go through the
/// extraction patterns in order and the first pattern that matches wins; if
/// none matches the reference itself is the candidate.
pub fn extract_candidate(reference: &str) -> &str {
    if !looks_like_url(reference) {
        return reference;
    }

    ID_PATTERNS
        .iter()
        .find_map(|pattern| pattern.captures(reference))
        .and_then(|captures| captures.get(1))
        .map_or(reference, |m| m.as_str())
}

/// Resolve a user-supplied reference to a validated resource ID
pub fn resolve(reference: &str) -> Result<ResourceId> {
    let candidate = extract_candidate(reference);
    info!("Found video id: '{candidate}'");

    if candidate.contains(FORBIDDEN_ID_CHARS) {
        return Err(Error::InvalidIdFormat(candidate.to_string()));
    }
    if candidate.chars().count() < MIN_ID_LEN {
        return Err(Error::IdTooShort(candidate.to_string()));
    }

    Ok(ResourceId(candidate.to_string()))
}
