//! Failure kinds surfaced by the giro analysis.
//!
//! Missing fields, unparsable dates and records without a route are all
//! absorbed by the normalizer and never show up here. Anything in this enum
//! aborts the whole call.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("record {index} is not a key/value object (found {kind})")]
    MalformedRecord { index: usize, kind: &'static str },
    #[error("malformed payload: {0}")]
    MalformedPayload(String),
    #[error("aggregate failed consistency check: {0}")]
    Inconsistent(String),
}
