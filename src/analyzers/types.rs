//! Data types used by the giro analysis pipeline.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::AnalysisError;

/// One record as delivered by the upstream feed. No schema is guaranteed.
pub type RawRecord = serde_json::Map<String, serde_json::Value>;

/// Cost center a product belongs to, derived from its code prefix.
///
/// Variant order matches the lexicographic order of the tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CostCenter {
    Camso,
    Euromaster,
    Michelin,
}

impl CostCenter {
    pub fn as_str(&self) -> &'static str {
        match self {
            CostCenter::Camso => "CAMSO",
            CostCenter::Euromaster => "EUROMASTER",
            CostCenter::Michelin => "MICHELIN",
        }
    }
}

impl std::fmt::Display for CostCenter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A raw record mapped onto the canonical attribute set, with its
/// classification flags derived.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedItem {
    pub route: String,
    pub customer: String,
    pub raw_product_code: String,
    pub description: String,
    pub check_value: String,
    /// Trimmed location, with `"1"` / `"1.0"` rewritten to `"CROSSDOCK"`.
    pub location_raw: String,
    /// Joined loading name, empty when missing or numeric.
    pub destination_hint: String,
    pub launch_date: Option<NaiveDate>,
    pub is_accessory: bool,
    pub is_crossdock: bool,
    pub product_code: String,
    pub cost_center: CostCenter,
    pub is_checked: bool,
}

impl NormalizedItem {
    pub fn detail(&self) -> ItemDetail {
        ItemDetail {
            product_code: self.product_code.clone(),
            customer: self.customer.clone(),
            description: self.description.clone(),
            location: self.location_raw.clone(),
            cost_center: self.cost_center,
        }
    }
}

/// Compact display row for unchecked, accessory and crossdock listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDetail {
    pub product_code: String,
    pub customer: String,
    pub description: String,
    pub location: String,
    pub cost_center: CostCenter,
}

/// Item counts shared by routes, cost centers and the global totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Counts {
    pub total: usize,
    pub checked: usize,
    pub to_check: usize,
    pub accessory: usize,
    pub crossdock: usize,
    pub non_classified: usize,
    pub percentage: f64,
}

/// Per-route counts, as listed under `statistics.per_route`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteSummary {
    pub route: String,
    pub destination: String,
    #[serde(flatten)]
    pub counts: Counts,
    pub completed: bool,
}

/// Everything known about a single route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteAggregate {
    #[serde(flatten)]
    pub summary: RouteSummary,
    pub customers: Vec<String>,
    pub cost_centers: Vec<CostCenter>,
    pub unchecked_items: Vec<ItemDetail>,
    pub accessory_items: Vec<ItemDetail>,
    pub crossdock_items: Vec<ItemDetail>,
}

/// Per-cost-center rollup, as listed under `statistics.per_cost_center`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostCenterSummary {
    pub cost_center: CostCenter,
    #[serde(flatten)]
    pub counts: Counts,
}

/// Totals across every in-scope item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GlobalTotals {
    #[serde(flatten)]
    pub counts: Counts,
    pub total_routes: usize,
    pub routes_completed: usize,
    pub routes_incomplete: usize,
    pub route_completion_pct: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub totals: GlobalTotals,
    pub per_route: Vec<RouteSummary>,
    pub per_cost_center: Vec<CostCenterSummary>,
}

/// Reverse lookup from product code to the routes still holding it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductSearchIndex {
    /// product code -> route -> occurrences
    pub routes: BTreeMap<String, BTreeMap<String, usize>>,
    /// product code -> first non-empty description seen
    pub descriptions: BTreeMap<String, String>,
}

impl ProductSearchIndex {
    /// Case-insensitive lookup on the transformed product code.
    pub fn find(&self, product_code: &str) -> Option<(&str, &BTreeMap<String, usize>)> {
        let wanted = product_code.trim();
        self.routes
            .get_key_value(wanted)
            .or_else(|| {
                self.routes
                    .iter()
                    .find(|(code, _)| code.eq_ignore_ascii_case(wanted))
            })
            .map(|(code, routes)| (code.as_str(), routes))
    }

    pub fn description(&self, product_code: &str) -> Option<&str> {
        self.descriptions.get(product_code).map(String::as_str)
    }
}

/// Complete result of one analysis call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GiroReport {
    /// Routes in order of first appearance.
    pub routes: Vec<RouteAggregate>,
    pub product_search: ProductSearchIndex,
    /// Distinct launch dates (`YYYY-MM-DD`), ascending.
    pub dates: Vec<String>,
    pub statistics: Statistics,
}

/// JSON envelope returned to callers: either a full report or an error.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResponse {
    pub success: bool,
    #[serde(flatten)]
    pub report: Option<GiroReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AnalysisResponse {
    pub fn from_result(result: Result<GiroReport, AnalysisError>) -> Self {
        match result {
            Ok(report) => Self {
                success: true,
                report: Some(report),
                error: None,
            },
            Err(e) => Self {
                success: false,
                report: None,
                error: Some(e.to_string()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cost_center_serializes_uppercase() {
        let json = serde_json::to_string(&CostCenter::Euromaster).unwrap();
        assert_eq!(json, "\"EUROMASTER\"");
        assert_eq!(CostCenter::Camso.to_string(), "CAMSO");
    }

    #[test]
    fn test_cost_center_order_is_lexicographic() {
        let mut tags = vec![CostCenter::Michelin, CostCenter::Camso, CostCenter::Euromaster];
        tags.sort();
        let names: Vec<_> = tags.iter().map(CostCenter::as_str).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }

    #[test]
    fn test_failure_response_has_no_report() {
        let response = AnalysisResponse::from_result(Err(AnalysisError::MalformedPayload(
            "root is a number".to_string(),
        )));
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "malformed payload: root is a number");
        assert!(json.get("routes").is_none());
        assert!(json.get("statistics").is_none());
    }

    #[test]
    fn test_success_response_flattens_report() {
        let response = AnalysisResponse::from_result(Ok(GiroReport::default()));
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["success"], true);
        assert!(json.get("error").is_none());
        assert_eq!(json["routes"], serde_json::json!([]));
        assert_eq!(json["statistics"]["totals"]["total"], 0);
    }

    #[test]
    fn test_product_lookup_ignores_case() {
        let mut index = ProductSearchIndex::default();
        index
            .routes
            .entry("Cso_99".to_string())
            .or_default()
            .insert("R1".to_string(), 2);

        let (code, routes) = index.find("CSO_99").unwrap();
        assert_eq!(code, "Cso_99");
        assert_eq!(routes["R1"], 2);
        assert!(index.find("nope").is_none());
    }
}
