//! Flat query-string documents
//!
//! The metadata endpoint answers with an `application/x-www-form-urlencoded`
//! body, and each entry of its stream map is itself such a document. Parsing
//! is strict: a `;` inside a pair or a broken percent escape rejects the document.

use std::collections::HashMap;

use thiserror::Error;
use url::form_urlencoded;

/// Parsed key/value document, keeping every value seen for a key in order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryDocument {
    values: HashMap<String, Vec<String>>,
}

impl QueryDocument {
    /// Value at index 0 for `key`
    pub fn first(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// All values recorded for `key`
    pub fn all(&self, key: &str) -> &[String] {
        self.values.get(key).map_or(&[], Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over keys paired with their first value
    pub fn firsts(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().filter_map(|(key, values)| {
            values.first().map(|value| (key.as_str(), value.as_str()))
        })
    }
}

/// Error raised for a document that is not valid query-string syntax
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct QueryError(pub String);

/// Check that every `%` starts a two-digit hex escape
fn validate_escapes(segment: &str) -> Result<(), QueryError> {
    let bytes = segment.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let escape = bytes.get(i + 1..i + 3);
            match escape {
                Some([hi, lo]) if hi.is_ascii_hexdigit() && lo.is_ascii_hexdigit() => i += 3,
                _ => {
                    let end = (i + 3).min(bytes.len());
                    let bad = String::from_utf8_lossy(&bytes[i..end]);
                    return Err(QueryError(format!("invalid URL escape \"{bad}\"")));
                }
            }
        } else {
            i += 1;
        }
    }
    Ok(())
}

/// Decode one key or value: `+` is a space, `%XX` a byte
fn decode_component(raw: &str) -> String {
    form_urlencoded::parse(raw.as_bytes())
        .next()
        .map(|(decoded, _)| decoded.into_owned())
        .unwrap_or_default()
}

/// Parse a flat query-string document
pub fn parse_query(raw: &str) -> Result<QueryDocument, QueryError> {
    let mut doc = QueryDocument::default();

    for segment in raw.split('&') {
        if segment.contains(';') {
            return Err(QueryError("invalid semicolon separator in query".to_string()));
        }
        if segment.is_empty() {
            continue;
        }
        let (raw_key, raw_value) = segment.split_once('=').unwrap_or((segment, ""));
        validate_escapes(raw_key)?;
        validate_escapes(raw_value)?;

        // `decode_component` splits on `=`, so decode key and value separately
        let key = decode_component(raw_key);
        let value = decode_component(&raw_value.replace('=', "%3D"));
        doc.values.entry(key).or_default().push(value);
    }

    Ok(doc)
}

/// Encode key/value pairs as a query-string document
pub fn encode_query<'a, I>(pairs: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish()
}
