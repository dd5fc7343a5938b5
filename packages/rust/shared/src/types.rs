//! Core domain types for the Threatwire pipeline.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum number of items kept per signal source.
pub const MAX_ITEMS_PER_SOURCE: usize = 100;

// ---------------------------------------------------------------------------
// RunId
// ---------------------------------------------------------------------------

/// A UUID v7 wrapper identifying one pipeline run (time-sortable).
///
/// Used for log correlation only — runs leave no state behind beyond the
/// report files.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(pub Uuid);

impl RunId {
    /// Generate a new time-sortable run identifier.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for RunId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

// ---------------------------------------------------------------------------
// FeedItem
// ---------------------------------------------------------------------------

/// A single item parsed from the RSS signal source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedItem {
    /// Item headline.
    pub title: String,
    /// Link to the full article.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    /// Publication date as given by the feed (not normalized).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published: Option<String>,
    /// Item description/summary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

// ---------------------------------------------------------------------------
// SignalBundle
// ---------------------------------------------------------------------------

/// The joined output of the three signal fetches.
///
/// Serializes with exactly the keys `rss`, `nvd`, `twitter`; each list holds
/// at most [`MAX_ITEMS_PER_SOURCE`] entries and there are no cross-references
/// between them. `nvd` and `twitter` entries are kept as the raw JSON the
/// sources returned.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignalBundle {
    pub rss: Vec<FeedItem>,
    pub nvd: Vec<serde_json::Value>,
    pub twitter: Vec<serde_json::Value>,
}

impl SignalBundle {
    /// Total number of collected items across all three sources.
    pub fn item_count(&self) -> usize {
        self.rss.len() + self.nvd.len() + self.twitter.len()
    }
}

// ---------------------------------------------------------------------------
// Enrichment
// ---------------------------------------------------------------------------

/// The model's extraction result.
///
/// Missing keys default to empty; unknown keys are ignored. A key holding a
/// value of the wrong type fails deserialization and is surfaced as an
/// enrichment error by the caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Enrichment {
    /// Indicators of compromise (IPs, domains, hashes, CVEs).
    #[serde(default)]
    pub iocs: Vec<String>,
    /// MITRE ATT&CK technique identifiers.
    #[serde(default)]
    pub mitre: Vec<String>,
    /// Analyst summary, intended ≤120 words (not enforced).
    #[serde(default)]
    pub summary: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_id_roundtrip() {
        let id = RunId::new();
        let s = id.to_string();
        let parsed: RunId = s.parse().expect("parse RunId");
        assert_eq!(id, parsed);
    }

    #[test]
    fn bundle_serializes_with_exact_keys() {
        let bundle = SignalBundle {
            rss: vec![FeedItem {
                title: "New campaign observed".into(),
                link: Some("https://example.com/post".into()),
                published: None,
                summary: None,
            }],
            nvd: vec![serde_json::json!({"cve": {"id": "CVE-2024-0001"}})],
            twitter: vec![serde_json::json!({"id": "1", "text": "ioc drop"})],
        };

        let value = serde_json::to_value(&bundle).expect("serialize");
        let obj = value.as_object().expect("object");
        let mut keys: Vec<&str> = obj.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(keys, ["nvd", "rss", "twitter"]);
        assert_eq!(bundle.item_count(), 3);
    }

    #[test]
    fn enrichment_roundtrip_is_exact() {
        let raw = r#"{"iocs": ["1.1.1.1"], "mitre": ["T1000"], "summary": "s"}"#;
        let parsed: Enrichment = serde_json::from_str(raw).expect("deserialize");
        assert_eq!(parsed.iocs, vec!["1.1.1.1"]);
        assert_eq!(parsed.mitre, vec!["T1000"]);
        assert_eq!(parsed.summary, "s");

        let back = serde_json::to_string(&parsed).expect("serialize");
        let reparsed: Enrichment = serde_json::from_str(&back).expect("re-deserialize");
        assert_eq!(parsed, reparsed);
    }

    #[test]
    fn enrichment_tolerates_missing_keys() {
        let parsed: Enrichment = serde_json::from_str(r#"{"summary": "quiet day"}"#).expect("lax");
        assert!(parsed.iocs.is_empty());
        assert!(parsed.mitre.is_empty());
        assert_eq!(parsed.summary, "quiet day");
    }

    #[test]
    fn enrichment_rejects_wrongly_typed_keys() {
        let result = serde_json::from_str::<Enrichment>(r#"{"iocs": "1.1.1.1"}"#);
        assert!(result.is_err());
    }
}
