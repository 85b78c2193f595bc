//! Configuration for the in-memory relation store plugin.

use relation_store_sdk::MAX_PAGE_SIZE;
use serde::Deserialize;

/// Plugin configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InMemoryRelationStoreConfig {
    /// Tuples present when the store starts.
    pub tuples: Vec<TupleConfig>,

    /// Largest page `read_related_objects` accepts (`1..=100`).
    pub max_page_size: u32,

    /// Artificial delay before every request, in milliseconds.
    pub latency_ms: u64,
}

impl Default for InMemoryRelationStoreConfig {
    fn default() -> Self {
        Self {
            tuples: Vec::new(),
            max_page_size: MAX_PAGE_SIZE,
            latency_ms: 0,
        }
    }
}

/// A seed tuple, each part in its text form.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TupleConfig {
    /// Subject tag, e.g. `user-alice` or `group-ops#member`.
    pub object: String,

    /// Relation name, e.g. `administrator`.
    pub relation: String,

    /// Resource tag, e.g. `serviceaccount-acme-bot`.
    pub target: String,
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn config_defaults_are_applied() {
        let yaml = r#"
tuples:
  - object: "user-alice"
    relation: "administrator"
    target: "serviceaccount-acme-bot"
"#;

        let parsed: Result<InMemoryRelationStoreConfig, _> = serde_saphyr::from_str(yaml);
        let cfg = match parsed {
            Ok(cfg) => cfg,
            Err(e) => panic!("failed to parse config: {e}"),
        };

        assert_eq!(cfg.tuples.len(), 1);
        assert_eq!(cfg.tuples[0].object, "user-alice");
        assert_eq!(cfg.max_page_size, MAX_PAGE_SIZE);
        assert_eq!(cfg.latency_ms, 0);
    }

    #[test]
    fn config_rejects_unknown_fields() {
        let yaml = r#"
max_page_size: 10
store_url: "http://localhost:8080"
"#;

        let parsed: Result<InMemoryRelationStoreConfig, _> = serde_saphyr::from_str(yaml);
        assert!(parsed.is_err());
    }

    #[test]
    fn tuple_entries_require_every_part() {
        let yaml = r#"
tuples:
  - object: "user-alice"
    relation: "administrator"
"#;

        let parsed: Result<InMemoryRelationStoreConfig, _> = serde_saphyr::from_str(yaml);
        assert!(parsed.is_err());
    }

    #[test]
    fn config_allows_empty_store() {
        let parsed: Result<InMemoryRelationStoreConfig, _> = serde_saphyr::from_str("{}");
        let cfg = match parsed {
            Ok(cfg) => cfg,
            Err(e) => panic!("failed to parse config: {e}"),
        };
        assert!(cfg.tuples.is_empty());
        assert_eq!(cfg.max_page_size, MAX_PAGE_SIZE);
    }
}
