use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analyzers::types::GiroReport;

/// One-row summary of an analysis run, appended to the run history CSV.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ReportStats {
    pub timestamp: DateTime<Utc>,
    pub source: Option<String>,
    pub site: Option<String>,
    pub records: usize,

    // routes
    pub routes: usize,
    pub routes_completed: usize,
    pub route_completion_pct: f64,

    // items
    pub total_items: usize,
    pub checked: usize,
    pub to_check: usize,
    pub accessory: usize,
    pub crossdock: usize,
    pub percentage: f64,

    // dates covered, joined with ';'
    pub dates: String,

    // error tracking
    pub error_type: Option<String>,
    pub error_message: Option<String>,
}

impl ReportStats {
    pub fn from_report(records: usize, report: &GiroReport) -> Self {
        let totals = &report.statistics.totals;
        ReportStats {
            timestamp: Utc::now(),
            records,
            routes: totals.total_routes,
            routes_completed: totals.routes_completed,
            route_completion_pct: totals.route_completion_pct,
            total_items: totals.counts.total,
            checked: totals.counts.checked,
            to_check: totals.counts.to_check,
            accessory: totals.counts.accessory,
            crossdock: totals.counts.crossdock,
            percentage: totals.counts.percentage,
            dates: report.dates.join(";"),
            ..Default::default()
        }
    }

    /// Create an error record with timestamp and error information
    pub fn from_error(error_type: &str, error_message: &str) -> Self {
        ReportStats {
            timestamp: Utc::now(),
            error_type: Some(error_type.to_string()),
            error_message: Some(error_message.to_string()),
            ..Default::default()
        }
    }

    /// Set run metadata (source and site)
    pub fn with_source_info(mut self, source: &str, site: Option<&str>) -> Self {
        self.source = Some(source.to_string());
        self.site = site.map(str::to_string);
        self
    }

    pub fn is_error(&self) -> bool {
        self.error_type.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::analyzer::analyze_values;
    use serde_json::json;

    #[test]
    fn test_from_report_copies_totals() {
        let values = vec![
            json!({ "Route": "R1", "InvRem": "X", "LaunchDate": "2024-05-01" }),
            json!({ "Route": "R1", "ADD": "LX4" }),
            json!({ "Route": "R2", "LaunchDate": "2024-05-02" }),
            json!({ "CAI": "no route" }),
        ];
        let report = analyze_values(&values).unwrap();
        let stats = ReportStats::from_report(values.len(), &report);

        assert_eq!(stats.records, 4);
        assert_eq!(stats.routes, 2);
        assert_eq!(stats.routes_completed, 1);
        assert_eq!(stats.route_completion_pct, 50.0);
        assert_eq!(stats.total_items, 3);
        assert_eq!(stats.checked, 1);
        assert_eq!(stats.to_check, 1);
        assert_eq!(stats.accessory, 1);
        assert_eq!(stats.percentage, 33.33);
        assert_eq!(stats.dates, "2024-05-01;2024-05-02");
        assert!(!stats.is_error());
    }

    #[test]
    fn test_from_error() {
        let stats = ReportStats::from_error("parse_error", "invalid JSON")
            .with_source_info("feed.json", Some("VR01"));

        assert!(stats.is_error());
        assert_eq!(stats.error_message.as_deref(), Some("invalid JSON"));
        assert_eq!(stats.source.as_deref(), Some("feed.json"));
        assert_eq!(stats.site.as_deref(), Some("VR01"));
        assert_eq!(stats.total_items, 0);
    }
}
