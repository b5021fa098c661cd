//! Variant selection by quality tier
//!
//! Selection is positional over a best-to-worst list. [`order_by_quality`]
//! establishes that order from the records' own `quality` labels when every
//! record has one; otherwise the source order is trusted as-is.

use std::fmt;
use std::str::FromStr;

use crate::core::error::{suggest_tier, Error, Result};
use crate::core::manifest::StreamRecord;

/// Known quality labels, best first
const QUALITY_RANKS: [&str; 8] = [
    "hd2160", "hd1440", "hd1080", "hd720", "large", "medium", "small", "tiny",
];

/// Coarse quality preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QualityTier {
    #[default]
    High,
    Medium,
    Low,
}

impl QualityTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityTier::High => "high",
            QualityTier::Medium => "medium",
            QualityTier::Low => "low",
        }
    }

    /// Position picked from a best-to-worst list of `len` (> 0) variants
    fn index_for(&self, len: usize) -> usize {
        match self {
            QualityTier::High => 0,
            QualityTier::Medium => (len - 1) / 2,
            QualityTier::Low => len - 1,
        }
    }
}

impl fmt::Display for QualityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QualityTier {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "high" => Ok(QualityTier::High),
            "medium" => Ok(QualityTier::Medium),
            "low" => Ok(QualityTier::Low),
            _ => {
                let message = match suggest_tier(s) {
                    Some(suggestion) => {
                        format!("Unknown quality '{s}'. Did you mean '{suggestion}'?")
                    }
                    None => format!("Unknown quality '{s}'. Expected one of: low, medium, high"),
                };
                Err(Error::InvalidInput(message))
            }
        }
    }
}

/// Pick the variant for `tier` from a best-to-worst list
pub fn select(variants: &[StreamRecord], tier: QualityTier) -> Result<&StreamRecord> {
    if variants.is_empty() {
        return Err(Error::EmptyVariantList);
    }
    Ok(&variants[tier.index_for(variants.len())])
}

/// Rank of a record's quality label, lower is better
fn quality_rank(record: &StreamRecord) -> Option<usize> {
    let label = record.quality()?;
    QUALITY_RANKS.iter().position(|known| *known == label)
}

/// Sort variants best-to-worst by their quality labels
///
/// Only applies when every record carries a known label; a single unknown or
/// missing label leaves the source order untouched. The sort is stable, so
/// variants of equal quality keep their relative order.
pub fn order_by_quality(mut variants: Vec<StreamRecord>) -> Vec<StreamRecord> {
    if variants.iter().all(|record| quality_rank(record).is_some()) {
        variants.sort_by_key(|record| quality_rank(record).unwrap_or(usize::MAX));
    }
    variants
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(itag: &str, quality: Option<&str>) -> StreamRecord {
        let mut record = StreamRecord::new();
        record.insert("itag", itag);
        if let Some(quality) = quality {
            record.insert("quality", quality);
        }
        record
    }

    fn itags(variants: &[StreamRecord]) -> Vec<&str> {
        variants.iter().map(|v| v.itag().unwrap()).collect()
    }

    #[test]
    fn test_select_positions() {
        let variants: Vec<_> = ["a", "b", "c", "d"].iter().map(|i| record(i, None)).collect();

        assert_eq!(select(&variants, QualityTier::High).unwrap().itag(), Some("a"));
        assert_eq!(select(&variants, QualityTier::Medium).unwrap().itag(), Some("b"));
        assert_eq!(select(&variants, QualityTier::Low).unwrap().itag(), Some("d"));
    }

    #[test]
    fn test_select_medium_of_three() {
        let variants: Vec<_> = ["a", "b", "c"].iter().map(|i| record(i, None)).collect();
        assert_eq!(select(&variants, QualityTier::Medium).unwrap().itag(), Some("b"));
    }

    #[test]
    fn test_select_single_variant() {
        let variants = vec![record("only", None)];
        for tier in [QualityTier::High, QualityTier::Medium, QualityTier::Low] {
            assert_eq!(select(&variants, tier).unwrap().itag(), Some("only"));
        }
    }

    #[test]
    fn test_select_empty_list() {
        for tier in [QualityTier::High, QualityTier::Medium, QualityTier::Low] {
            assert!(matches!(select(&[], tier), Err(Error::EmptyVariantList)));
        }
    }

    #[test]
    fn test_order_by_quality_sorts_labelled_variants() {
        let variants = vec![
            record("18", Some("medium")),
            record("22", Some("hd720")),
            record("17", Some("tiny")),
            record("37", Some("hd1080")),
        ];

        let ordered = order_by_quality(variants);
        assert_eq!(itags(&ordered), ["37", "22", "18", "17"]);
    }

    #[test]
    fn test_order_by_quality_is_stable() {
        let variants = vec![
            record("43", Some("medium")),
            record("22", Some("hd720")),
            record("18", Some("medium")),
        ];

        let ordered = order_by_quality(variants);
        assert_eq!(itags(&ordered), ["22", "43", "18"]);
    }

    #[test]
    fn test_order_by_quality_keeps_source_order_without_labels() {
        let variants = vec![
            record("18", Some("medium")),
            record("22", None),
            record("37", Some("hd1080")),
        ];
        assert_eq!(itags(&order_by_quality(variants)), ["18", "22", "37"]);

        let unknown = vec![record("5", Some("potato")), record("22", Some("hd720"))];
        assert_eq!(itags(&order_by_quality(unknown)), ["5", "22"]);
    }

    #[test]
    fn test_quality_tier_from_str() {
        assert_eq!("high".parse::<QualityTier>().unwrap(), QualityTier::High);
        assert_eq!("Medium".parse::<QualityTier>().unwrap(), QualityTier::Medium);
        assert_eq!(" LOW ".parse::<QualityTier>().unwrap(), QualityTier::Low);
        assert_eq!(QualityTier::default(), QualityTier::High);
    }

    #[test]
    fn test_quality_tier_from_str_suggests() {
        match "meduim".parse::<QualityTier>() {
            Err(Error::InvalidInput(msg)) => assert!(msg.contains("Did you mean 'medium'?")),
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
        match "xyzzy".parse::<QualityTier>() {
            Err(Error::InvalidInput(msg)) => assert!(msg.contains("Expected one of")),
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }
}
