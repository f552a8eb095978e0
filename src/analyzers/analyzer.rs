use crate::analyzers::aggregate::aggregate_items;
use crate::analyzers::normalize::normalize_all;
use crate::analyzers::types::{AnalysisResponse, Counts, GiroReport, RawRecord};
use crate::error::AnalysisError;
use serde_json::Value;
use tracing::{debug, info};

/// Runs the full pipeline (normalize, resolve destinations, aggregate) over
/// one batch of records.
///
/// Pure with respect to its input: the same records always produce the same
/// report. The result is self-checked before it is returned; a report that
/// fails the check is discarded and reported as an error.
#[tracing::instrument(skip(records), fields(records = records.len()))]
pub fn analyze(records: &[RawRecord]) -> Result<GiroReport, AnalysisError> {
    let items = normalize_all(records);
    debug!(items = items.len(), "Records normalized");

    let report = aggregate_items(&items);
    verify(&report)?;

    let totals = &report.statistics.totals;
    info!(
        routes = totals.total_routes,
        items = totals.counts.total,
        checked = totals.counts.checked,
        to_check = totals.counts.to_check,
        percentage = totals.counts.percentage,
        "Giro analysis complete"
    );

    Ok(report)
}

/// Same as [`analyze`], for records that have not been checked to be
/// key/value objects yet. A single non-object entry fails the whole call.
pub fn analyze_values(values: &[Value]) -> Result<GiroReport, AnalysisError> {
    analyze(&records_from_values(values)?)
}

/// Converts decoded JSON values into records, rejecting anything that is not
/// an object.
pub fn records_from_values(values: &[Value]) -> Result<Vec<RawRecord>, AnalysisError> {
    values
        .iter()
        .enumerate()
        .map(|(index, value)| match value {
            Value::Object(map) => Ok(map.clone()),
            other => Err(AnalysisError::MalformedRecord {
                index,
                kind: value_kind(other),
            }),
        })
        .collect()
}

/// Wraps [`analyze`] into the success/error envelope handed to callers.
pub fn run(records: &[RawRecord]) -> AnalysisResponse {
    AnalysisResponse::from_result(analyze(records))
}

fn verify(report: &GiroReport) -> Result<(), AnalysisError> {
    let per_route = &report.statistics.per_route;
    for route in per_route {
        check_counts(&format!("route '{}'", route.route), &route.counts)?;
    }

    for cc in &report.statistics.per_cost_center {
        check_counts(&format!("cost center {}", cc.cost_center), &cc.counts)?;
    }

    let totals = &report.statistics.totals;
    check_counts("totals", &totals.counts)?;

    let route_sum: usize = per_route.iter().map(|r| r.counts.total).sum();
    if route_sum != totals.counts.total {
        return Err(AnalysisError::Inconsistent(format!(
            "routes hold {} items but totals report {}",
            route_sum, totals.counts.total
        )));
    }

    if totals.routes_completed + totals.routes_incomplete != totals.total_routes {
        return Err(AnalysisError::Inconsistent(format!(
            "{} completed + {} incomplete routes != {} routes",
            totals.routes_completed, totals.routes_incomplete, totals.total_routes
        )));
    }

    if !(0.0..=100.0).contains(&totals.route_completion_pct) {
        return Err(AnalysisError::Inconsistent(format!(
            "route completion {} out of range",
            totals.route_completion_pct
        )));
    }

    Ok(())
}

fn check_counts(scope: &str, c: &Counts) -> Result<(), AnalysisError> {
    if c.total != c.checked + c.to_check + c.accessory + c.crossdock {
        return Err(AnalysisError::Inconsistent(format!(
            "{scope}: {} items != {} checked + {} to check + {} accessory + {} crossdock",
            c.total, c.checked, c.to_check, c.accessory, c.crossdock
        )));
    }
    if !(0.0..=100.0).contains(&c.percentage) {
        return Err(AnalysisError::Inconsistent(format!(
            "{scope}: percentage {} out of range",
            c.percentage
        )));
    }
    Ok(())
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
