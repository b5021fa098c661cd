//! Manifest decoding
//!
//! Turns the raw `get_video_info` body into an ordered list of
//! [`StreamRecord`]s, one per encoded variant.

use std::collections::BTreeMap;

use log::{debug, warn};
use serde::Serialize;

use crate::core::error::{Error, Result};
use crate::core::query::{encode_query, parse_query};

/// Top-level field carrying the manifest status
pub const STATUS_FIELD: &str = "status";

/// Status value of a usable manifest
pub const STATUS_OK: &str = "ok";

/// Top-level field holding the comma-separated variant descriptors
pub const STREAM_MAP_FIELD: &str = "url_encoded_fmt_stream_map";

/// Shared fields copied from the manifest onto every record
const SHARED_FIELDS: [&str; 2] = ["title", "author"];

/// One encoded variant: attribute name to value
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct StreamRecord {
    attributes: BTreeMap<String, String>,
}

impl StreamRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(key.into(), value.into());
    }

    /// Fetch location of the media bytes
    pub fn url(&self) -> Option<&str> {
        self.get("url")
    }

    /// MIME-like type string, e.g. `video/mp4; codecs="avc1.64001F, mp4a.40.2"`
    pub fn mime_type(&self) -> Option<&str> {
        self.get("type")
    }

    pub fn title(&self) -> Option<&str> {
        self.get("title")
    }

    pub fn author(&self) -> Option<&str> {
        self.get("author")
    }

    /// Coarse quality label such as `hd720` or `medium`
    pub fn quality(&self) -> Option<&str> {
        self.get("quality")
    }

    pub fn itag(&self) -> Option<&str> {
        self.get("itag")
    }

    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Encode the record back into query-string form
    pub fn to_query(&self) -> String {
        encode_query(self.attributes.iter().map(|(k, v)| (k.as_str(), v.as_str())))
    }

    /// Parse one variant descriptor, keeping the first value seen per key
    pub fn from_query(raw: &str) -> Result<Self> {
        let doc = parse_query(raw).map_err(|e| Error::MalformedManifest(e.to_string()))?;
        let attributes = doc
            .firsts()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        Ok(Self { attributes })
    }
}

/// Decode a raw manifest body into its variants, in source order
///
/// Variant descriptors that fail to parse or carry no `url` are logged and
/// skipped, so an empty list is a valid result.
pub fn decode(raw: &str) -> Result<Vec<StreamRecord>> {
    let manifest = parse_query(raw).map_err(|e| Error::MalformedManifest(e.to_string()))?;

    let status = manifest
        .first(STATUS_FIELD)
        .ok_or(Error::StatusFieldMissing)?;
    if status != STATUS_OK {
        return Err(Error::StatusNotOk(status.to_string()));
    }

    let stream_map = manifest
        .first(STREAM_MAP_FIELD)
        .ok_or(Error::NoStreamsFound)?;

    let mut variants = Vec::new();
    for (index, chunk) in stream_map.split(',').enumerate() {
        let mut record = match StreamRecord::from_query(chunk) {
            Ok(record) => record,
            Err(e) => {
                warn!("Video stream cannot be parsed: index {index}: {e}");
                continue;
            }
        };
        if record.url().is_none() {
            warn!("Video stream has no url: index {index}");
            continue;
        }

        for field in SHARED_FIELDS {
            if let Some(value) = manifest.first(field) {
                record.insert(field, value);
            }
        }
        variants.push(record);
    }

    debug!("Decoded {} variant(s) from stream map", variants.len());
    Ok(variants)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest(status: &str, chunks: &[&str]) -> String {
        let stream_map = chunks.join(",");
        encode_query([
            ("status", status),
            ("title", "Never Gonna Give You Up"),
            ("author", "Rick Astley"),
            (STREAM_MAP_FIELD, stream_map.as_str()),
        ])
    }

    fn chunk(itag: &str, quality: &str, mime: &str) -> String {
        let url = format!("https://media.example/{itag}");
        encode_query([
            ("itag", itag),
            ("quality", quality),
            ("type", mime),
            ("url", url.as_str()),
        ])
    }

    #[test]
    fn test_decode_variants_in_order() {
        let chunks = [
            chunk("22", "hd720", "video/mp4; codecs=\"avc1\""),
            chunk("43", "medium", "video/webm; codecs=\"vp8\""),
            chunk("18", "small", "video/mp4; codecs=\"avc1\""),
        ];
        let refs: Vec<&str> = chunks.iter().map(String::as_str).collect();

        let variants = decode(&manifest("ok", &refs)).unwrap();

        assert_eq!(variants.len(), 3);
        let itags: Vec<_> = variants.iter().map(|v| v.itag().unwrap()).collect();
        assert_eq!(itags, ["22", "43", "18"]);
        assert_eq!(variants[1].mime_type(), Some("video/webm; codecs=\"vp8\""));
        assert_eq!(variants[2].url(), Some("https://media.example/18"));
    }

    #[test]
    fn test_decode_enriches_shared_fields() {
        let chunks = [chunk("22", "hd720", "video/mp4;")];
        let variants = decode(&manifest("ok", &[chunks[0].as_str()])).unwrap();

        assert_eq!(variants[0].title(), Some("Never Gonna Give You Up"));
        assert_eq!(variants[0].author(), Some("Rick Astley"));
    }

    #[test]
    fn test_decode_status_not_ok() {
        let chunks = [chunk("22", "hd720", "video/mp4;")];
        match decode(&manifest("fail", &[chunks[0].as_str()])) {
            Err(Error::StatusNotOk(status)) => assert_eq!(status, "fail"),
            other => panic!("Expected StatusNotOk, got {other:?}"),
        }

        // Status is checked before anything else is looked at
        assert!(matches!(decode("status=fail"), Err(Error::StatusNotOk(_))));
    }

    #[test]
    fn test_decode_status_missing() {
        let raw = encode_query([(STREAM_MAP_FIELD, "itag=22")]);
        assert!(matches!(decode(&raw), Err(Error::StatusFieldMissing)));
    }

    #[test]
    fn test_decode_no_stream_map() {
        assert!(matches!(
            decode("status=ok&title=x&author=y"),
            Err(Error::NoStreamsFound)
        ));
    }

    #[test]
    fn test_decode_malformed_manifest() {
        assert!(matches!(
            decode("status=ok&title=%zz"),
            Err(Error::MalformedManifest(_))
        ));
    }

    #[test]
    fn test_decode_skips_malformed_chunk() {
        let good_a = chunk("22", "hd720", "video/mp4;");
        let good_b = chunk("18", "small", "video/mp4;");
        let broken = "itag=43&url=%zz";

        let variants = decode(&manifest("ok", &[good_a.as_str(), broken, good_b.as_str()])).unwrap();

        assert_eq!(variants.len(), 2);
        assert_eq!(variants[0].itag(), Some("22"));
        assert_eq!(variants[1].itag(), Some("18"));

        // The reason logged for the skipped chunk
        match StreamRecord::from_query(broken) {
            Err(Error::MalformedManifest(msg)) => {
                assert_eq!(msg, "invalid URL escape \"%zz\"")
            }
            other => panic!("Expected MalformedManifest, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_skips_chunks_without_url() {
        let good = chunk("22", "hd720", "video/mp4;");

        // Trailing comma leaves an empty chunk behind
        let trailing = decode(&manifest("ok", &[good.as_str(), ""])).unwrap();
        assert_eq!(trailing.len(), 1);
        assert_eq!(trailing[0].itag(), Some("22"));

        let no_url = decode(&manifest("ok", &["itag=43&type=video%2Fwebm%3B", good.as_str()])).unwrap();
        assert_eq!(no_url.len(), 1);
        assert_eq!(no_url[0].itag(), Some("22"));

        assert!(decode(&manifest("ok", &[""])).unwrap().is_empty());
    }

    #[test]
    fn test_decode_all_chunks_broken_is_empty() {
        let variants = decode(&manifest("ok", &["a=%zz", "b=1;c=2"])).unwrap();
        assert!(variants.is_empty());
    }

    #[test]
    fn test_decode_first_value_wins() {
        let raw = encode_query([
            ("status", "ok"),
            (STREAM_MAP_FIELD, "itag=22&itag=18&url=x"),
        ]);
        let variants = decode(&raw).unwrap();
        assert_eq!(variants[0].itag(), Some("22"));
        assert_eq!(variants[0].title(), None);
    }

    #[test]
    fn test_record_query_round_trip() {
        let original = StreamRecord::from_query(&chunk(
            "22",
            "hd720",
            "video/mp4; codecs=\"avc1.64001F, mp4a.40.2\"",
        ))
        .unwrap();

        let reparsed = StreamRecord::from_query(&original.to_query()).unwrap();
        assert_eq!(reparsed, original);
    }
}
