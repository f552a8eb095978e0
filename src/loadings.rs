//! Loading-name join against the "Loadings" reference feed.
//!
//! Shipment records only carry a `LoadingId`. The reference feed maps that
//! id to a loading record whose human-readable name becomes the record's
//! `LoadingName`, which the analysis uses as a destination hint. Reference
//! feeds are not consistent about where the name lives, so
//! [`resolve_loading_name`] walks a fixed cascade of candidates.

use std::collections::HashMap;

use serde_json::Value;
use tracing::debug;

use crate::analyzers::normalize::{LOADING_NAME, field_str, scalar_to_string};
use crate::analyzers::types::RawRecord;
use crate::analyzers::utility::is_numeric_like;

pub const LOADING_ID: &str = "LoadingId";
const REFERENCE_ID_KEYS: &[&str] = &[LOADING_ID, "Id"];

/// Loading id -> resolved loading name.
#[derive(Debug, Default, Clone)]
pub struct LoadingIndex {
    names: HashMap<String, String>,
}

impl LoadingIndex {
    /// Indexes reference records by id. When an id repeats, the first record
    /// wins. Records without an id are ignored.
    pub fn from_records(records: &[RawRecord]) -> Self {
        let mut names = HashMap::new();
        for record in records {
            let Some(id) = reference_id(record) else {
                continue;
            };
            names
                .entry(id)
                .or_insert_with(|| resolve_loading_name(record));
        }
        debug!(loadings = names.len(), "Loading index built");
        Self { names }
    }

    /// Resolved name for `id`, or `""` when the id is unknown.
    pub fn name_for(&self, id: &str) -> &str {
        self.names
            .get(&normalize_id(id))
            .map(String::as_str)
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Returns a copy of every record with `LoadingName` set from the index.
/// Records with a missing or unknown `LoadingId` get an empty name.
pub fn join_loading_names(records: &[RawRecord], index: &LoadingIndex) -> Vec<RawRecord> {
    let mut matched = 0usize;
    let joined: Vec<RawRecord> = records
        .iter()
        .map(|record| {
            let id = field_str(record, LOADING_ID);
            let name = if id.trim().is_empty() {
                ""
            } else {
                index.name_for(&id)
            };
            if !name.is_empty() {
                matched += 1;
            }

            let mut out = record.clone();
            out.insert(LOADING_NAME.to_string(), Value::String(name.to_string()));
            out
        })
        .collect();

    debug!(records = records.len(), matched, "Loading names joined");
    joined
}

/// Picks the display name of a loading reference record.
///
/// Candidates, in order: `LoadingName`, `Name`, the second field, the first
/// field whose key mentions "name", the first and fifth fields joined, and
/// finally any field holding an alphabetic, non-id value. A candidate counts
/// only if it is non-empty and not numeric.
pub fn resolve_loading_name(record: &RawRecord) -> String {
    let positional: Vec<String> = record.values().map(scalar_to_string).collect();

    let explicit = [LOADING_NAME, "Name"]
        .iter()
        .filter_map(|key| record.get(*key).map(scalar_to_string));

    let second = positional.get(1).cloned();

    let named_key = record
        .iter()
        .filter(|(key, _)| key.to_lowercase().contains("name") && !is_id_or_date_key(key))
        .map(|(_, value)| scalar_to_string(value));

    let first_and_fifth = match (positional.first(), positional.get(4)) {
        (Some(first), Some(fifth)) if !first.trim().is_empty() && !fifth.trim().is_empty() => {
            Some(format!("{} {}", first.trim(), fifth.trim()))
        }
        _ => None,
    };

    let any_text = record
        .iter()
        .filter(|(key, _)| !is_id_or_date_key(key))
        .map(|(_, value)| scalar_to_string(value))
        .filter(|value| value.chars().any(char::is_alphabetic) && !looks_like_guid(value));

    explicit
        .chain(second)
        .chain(named_key)
        .chain(first_and_fifth)
        .chain(any_text)
        .map(|candidate| candidate.trim().to_string())
        .find(|candidate| !is_numeric_like(candidate))
        .unwrap_or_default()
}

/// Canonical form of an id so that `12`, `"12"` and `12.0` all match.
pub fn normalize_id(raw: &str) -> String {
    let trimmed = raw.trim();
    match trimmed.parse::<f64>() {
        Ok(n) if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", n as i64),
        _ => trimmed.to_string(),
    }
}

fn reference_id(record: &RawRecord) -> Option<String> {
    REFERENCE_ID_KEYS
        .iter()
        .map(|key| field_str(record, key))
        .find(|id| !id.trim().is_empty())
        .map(|id| normalize_id(&id))
}

fn is_id_or_date_key(key: &str) -> bool {
    let lower = key.to_lowercase();
    lower.ends_with("id") || lower.contains("date")
}

fn looks_like_guid(value: &str) -> bool {
    let v = value.trim();
    v.len() == 36
        && v.chars().filter(|c| *c == '-').count() == 4
        && v.chars().all(|c| c == '-' || c.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_explicit_loading_name_preferred() {
        let r = record(json!({ "Id": 1, "Name": "Other", "LoadingName": "Verona Hub" }));
        assert_eq!(resolve_loading_name(&r), "Verona Hub");
    }

    #[test]
    fn test_name_field_second() {
        let r = record(json!({ "Id": 1, "Code": "X", "Name": "Padova" }));
        assert_eq!(resolve_loading_name(&r), "Padova");
    }

    #[test]
    fn test_numeric_loading_name_is_skipped() {
        let r = record(json!({ "Id": 1, "LoadingName": "123456", "Name": "Bologna" }));
        assert_eq!(resolve_loading_name(&r), "Bologna");
    }

    #[test]
    fn test_second_positional_field() {
        let r = record(json!({ "Id": 7, "Descr": "Milano Nord", "Other": "x" }));
        assert_eq!(resolve_loading_name(&r), "Milano Nord");
    }

    #[test]
    fn test_key_containing_name() {
        let r = record(json!({
            "Id": 7,
            "Seq": 99,
            "NameId": "Should skip",
            "ShortName": "Brescia",
        }));
        assert_eq!(resolve_loading_name(&r), "Brescia");
    }

    #[test]
    fn test_first_and_fifth_fields() {
        let r = record(json!({
            "Zone": "NORD",
            "Seq": 1,
            "Slot": 2,
            "Bay": 3,
            "Area": "EST",
        }));
        assert_eq!(resolve_loading_name(&r), "NORD EST");
    }

    #[test]
    fn test_alphabetic_scan_fallback() {
        let r = record(json!({
            "LoadingId": 5,
            "Seq": 1,
            "Guid": "3f2a9c1e-0000-4b7d-9a1e-1234567890ab",
            "Label": "Trento",
            "CreatedDate": "2024-01-01",
        }));
        assert_eq!(resolve_loading_name(&r), "Trento");
    }

    #[test]
    fn test_nothing_usable_resolves_empty() {
        let r = record(json!({ "Id": 5, "Seq": 1, "Qty": "000123456" }));
        assert_eq!(resolve_loading_name(&r), "");
    }

    #[test]
    fn test_normalize_id() {
        assert_eq!(normalize_id("12"), "12");
        assert_eq!(normalize_id(" 12.0 "), "12");
        assert_eq!(normalize_id("A-12"), "A-12");
        assert_eq!(normalize_id("12.5"), "12.5");
    }

    #[test]
    fn test_join_matches_on_normalized_id() {
        let reference = vec![
            record(json!({ "LoadingId": 12, "LoadingName": "Verona" })),
            record(json!({ "LoadingId": "12", "LoadingName": "Duplicate" })),
            record(json!({ "Id": "A7", "Name": "Trieste" })),
            record(json!({ "Name": "No id" })),
        ];
        let index = LoadingIndex::from_records(&reference);
        assert_eq!(index.len(), 2);

        let records = vec![
            record(json!({ "Route": "R1", "LoadingId": "12.0" })),
            record(json!({ "Route": "R1", "LoadingId": "a7" })),
            record(json!({ "Route": "R2", "LoadingId": "A7" })),
            record(json!({ "Route": "R2" })),
        ];
        let joined = join_loading_names(&records, &index);

        assert_eq!(joined.len(), 4);
        assert_eq!(joined[0]["LoadingName"], "Verona");
        assert_eq!(joined[1]["LoadingName"], "");
        assert_eq!(joined[2]["LoadingName"], "Trieste");
        assert_eq!(joined[3]["LoadingName"], "");
        // original fields are kept
        assert_eq!(joined[2]["Route"], "R2");
    }

    #[test]
    fn test_unknown_id_reads_empty() {
        let index = LoadingIndex::default();
        assert!(index.is_empty());
        assert_eq!(index.name_for("99"), "");
    }

    // Helper functions for tests
    fn record(value: Value) -> RawRecord {
        match value {
            Value::Object(map) => map,
            _ => panic!("test record must be an object"),
        }
    }
}
