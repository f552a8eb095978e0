//! Giro completion analysis.
//!
//! Normalizes raw shipment records, resolves a destination per route, and
//! aggregates checked / unchecked / accessory / crossdock counts per route,
//! per cost center and overall, together with a product-to-route search
//! index.

pub mod aggregate;
pub mod analyzer;
pub mod destination;
pub mod normalize;
pub mod types;
pub mod utility;
