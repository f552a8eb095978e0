//! Maps raw feed records onto [`NormalizedItem`]s.
//!
//! Normalization never fails: absent or unusable fields degrade to empty
//! strings (or `None` for the launch date) and every input record yields
//! exactly one item, in input order.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;

use crate::analyzers::destination::destination_hint;
use crate::analyzers::types::{CostCenter, NormalizedItem, RawRecord};

pub const ROUTE: &str = "Route";
pub const CUSTOMER: &str = "CustomerName";
pub const PRODUCT_CODE: &str = "CAI";
pub const DESCRIPTION: &str = "ItemDescription";
pub const CHECK_VALUE: &str = "InvRem";
pub const LOCATION: &str = "ADD";
pub const LOADING_NAME: &str = "LoadingName";
pub const LAUNCH_DATE: &str = "LaunchDate";

pub const CROSSDOCK: &str = "CROSSDOCK";
const ACCESSORY_PREFIX: &str = "LX";

/// Prefix rules for the product code, checked in order. First match wins.
static PRODUCT_PREFIXES: &[(&str, char, CostCenter)] = &[
    ("IG", 'T', CostCenter::Euromaster),
    ("AR", 'Y', CostCenter::Euromaster),
    ("FG", 'B', CostCenter::Euromaster),
    ("SO", 'C', CostCenter::Camso),
];

/// Normalizes every record, preserving order.
pub fn normalize_all(records: &[RawRecord]) -> Vec<NormalizedItem> {
    records.iter().map(normalize_record).collect()
}

pub fn normalize_record(record: &RawRecord) -> NormalizedItem {
    let location_raw = rewrite_location(&field_str(record, LOCATION));
    let location_upper = location_raw.to_uppercase();
    let is_accessory = location_upper.starts_with(ACCESSORY_PREFIX);
    let is_crossdock = !is_accessory && location_upper == CROSSDOCK;

    let raw_product_code = field_str(record, PRODUCT_CODE);
    let (product_code, cost_center) = transform_product_code(&raw_product_code);

    let check_value = field_str(record, CHECK_VALUE);
    let is_checked = !is_accessory && !is_crossdock && !check_value.trim().is_empty();

    NormalizedItem {
        route: field_str(record, ROUTE),
        customer: field_str(record, CUSTOMER),
        raw_product_code,
        description: field_str(record, DESCRIPTION),
        check_value,
        location_raw,
        destination_hint: destination_hint(&field_str(record, LOADING_NAME)),
        launch_date: parse_launch_date(&field_str(record, LAUNCH_DATE)),
        is_accessory,
        is_crossdock,
        product_code,
        cost_center,
        is_checked,
    }
}

/// Reads `name` from the record as a string. Exact key first, then a
/// case-insensitive match. Missing fields read as `""`.
pub fn field_str(record: &RawRecord, name: &str) -> String {
    record
        .get(name)
        .or_else(|| {
            record
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
                .map(|(_, value)| value)
        })
        .map(scalar_to_string)
        .unwrap_or_default()
}

/// Renders a scalar JSON value as text. Null and nested values become `""`.
pub fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => String::new(),
    }
}

/// Trims the location and rewrites the crossdock markers `"1"` / `"1.0"`.
pub fn rewrite_location(raw: &str) -> String {
    let trimmed = raw.trim();
    match trimmed {
        "1" | "1.0" => CROSSDOCK.to_string(),
        _ => trimmed.to_string(),
    }
}

/// Applies the prefix table to a raw product code.
///
/// The prefix test runs on an uppercased copy, while the new leading
/// character is prepended to the trimmed code in its original casing.
pub fn transform_product_code(raw: &str) -> (String, CostCenter) {
    let trimmed = raw.trim();
    let upper = trimmed.to_uppercase();

    PRODUCT_PREFIXES
        .iter()
        .find(|(prefix, _, _)| upper.starts_with(prefix))
        .map(|(_, lead, cost_center)| (format!("{lead}{trimmed}"), *cost_center))
        .unwrap_or_else(|| (trimmed.to_string(), CostCenter::Michelin))
}

/// Parses the launch date in any of the formats the feed has been seen to
/// use. Returns `None` for anything unrecognised.
pub fn parse_launch_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Some(date) = parse_odata_date(s) {
        return Some(date);
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date);
    }

    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt.date());
    }

    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(dt.date());
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }

    NaiveDate::parse_from_str(s, "%d/%m/%Y").ok()
}

/// OData v2 wire format: `/Date(1714521600000)/`, optionally with a
/// `+hhmm` offset that does not affect the UTC instant.
fn parse_odata_date(s: &str) -> Option<NaiveDate> {
    let inner = s.strip_prefix("/Date(")?.strip_suffix(")/")?;
    let sign_len = usize::from(inner.starts_with('-'));
    let digits_end = inner[sign_len..]
        .find(|c: char| !c.is_ascii_digit())
        .map_or(inner.len(), |i| i + sign_len);
    let millis: i64 = inner[..digits_end].parse().ok()?;
    DateTime::from_timestamp_millis(millis).map(|dt| dt.date_naive())
}
