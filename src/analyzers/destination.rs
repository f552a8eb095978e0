//! Route destination resolution.
//!
//! A route's destination is the first usable loading name found among its
//! items, in input order. Items are never mutated; only the route-level
//! destination is resolved.

use std::collections::HashMap;

use crate::analyzers::types::NormalizedItem;
use crate::analyzers::utility::is_numeric_like;

/// Filters a joined loading name down to a destination hint. Empty and
/// numeric-looking names (ids, codes) yield `""`.
pub fn destination_hint(loading_name: &str) -> String {
    let trimmed = loading_name.trim();
    if is_numeric_like(trimmed) {
        String::new()
    } else {
        trimmed.to_string()
    }
}

/// First non-empty destination hint for each route.
///
/// Routes whose items carry no hint are absent from the map; callers read
/// them as `""`.
pub fn resolve_destinations<'a, I>(items: I) -> HashMap<&'a str, &'a str>
where
    I: IntoIterator<Item = &'a NormalizedItem>,
{
    let mut destinations: HashMap<&str, &str> = HashMap::new();
    for item in items {
        if item.destination_hint.is_empty() {
            continue;
        }
        destinations
            .entry(item.route.as_str())
            .or_insert(item.destination_hint.as_str());
    }
    destinations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::normalize::normalize_record;
    use serde_json::json;

    #[test]
    fn test_hint_filters_numeric_values() {
        assert_eq!(destination_hint(""), "");
        assert_eq!(destination_hint("12345"), "");
        assert_eq!(destination_hint("001-234-567"), "");
        assert_eq!(destination_hint("  Warehouse North  "), "Warehouse North");
        assert_eq!(destination_hint("Hub 7"), "Hub 7");
    }

    #[test]
    fn test_first_valid_hint_wins() {
        let items = vec![
            item("R1", ""),
            item("R1", "12345"),
            item("R1", "Warehouse North"),
            item("R1", "Warehouse South"),
        ];
        let resolved = resolve_destinations(&items);
        assert_eq!(resolved.get("R1"), Some(&"Warehouse North"));
    }

    #[test]
    fn test_route_without_hint_resolves_empty() {
        let items = vec![item("R2", ""), item("R2", "99999999")];
        assert!(resolve_destinations(&items).get("R2").is_none());
    }

    #[test]
    fn test_routes_resolve_independently() {
        let items = vec![
            item("R1", ""),
            item("R2", "Torino"),
            item("R1", "Verona"),
            item("R2", "Genova"),
        ];
        let resolved = resolve_destinations(&items);

        assert_eq!(resolved["R1"], "Verona");
        assert_eq!(resolved["R2"], "Torino");
        // items keep their own hint
        assert_eq!(items[0].destination_hint, "");
    }

    fn item(route: &str, loading_name: &str) -> NormalizedItem {
        let value = json!({ "Route": route, "LoadingName": loading_name });
        match value {
            serde_json::Value::Object(map) => normalize_record(&map),
            _ => unreachable!(),
        }
    }
}
