//! Error types for parcel planning.
//!
//! Only input validation is a hard error. A box that cannot hold the load is
//! reported by leaving it out of the results, never through this type.

use thiserror::Error;

use crate::model::ValidationError;

/// Result type alias for planner operations.
pub type Result<T> = std::result::Result<T, PlannerError>;

/// Reasons a shipment request is rejected before packing starts.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RequestError {
    #[error("at least one product must be requested")]
    EmptyRequest,

    #[error("unknown product size: {0}")]
    UnknownSize(String),

    #[error("invalid quantity for {label}: {quantity}")]
    NegativeQuantity { label: String, quantity: i64 },

    #[error("quantity for {label} is too large: {quantity} (max {max})")]
    QuantityTooLarge { label: String, quantity: i64, max: u32 },

    #[error("too many products in total: {total} (max {max})")]
    TooManyItems { total: u64, max: u32 },
}

#[derive(Debug, Error)]
pub enum PlannerError {
    #[error("invalid input: {0}")]
    InvalidInput(#[from] RequestError),

    #[error("invalid catalog data: {0}")]
    Catalog(#[from] ValidationError),
}
