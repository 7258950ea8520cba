// ❗ Input errors - every variant aborts the run
//
// Per-ZIP data-quality cases (no rate area, ambiguous, no silver plans) are
// NOT errors; they resolve to an unknown rate. See resolver.rs.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum SlcspError {
    #[error("invalid metal level: {0:?}")]
    InvalidMetalLevel(String),

    #[error("invalid premium {value:?} for plan {plan_id}")]
    InvalidPremium { plan_id: String, value: String },

    #[error("invalid rate area code {value:?} for state {state}")]
    InvalidRateArea { state: String, value: String },

    #[error("invalid zipcode: {0:?}")]
    InvalidZipcode(String),

    #[error("missing column {0:?} in header")]
    MissingColumn(String),
}
