//! Error types shared across the nowcasting library

use thiserror::Error;

/// Errors raised while loading data, fitting models or serving pages
#[derive(Debug, Error)]
pub enum NowcastError {
    /// A page needs state that another page has not produced yet
    #[error("missing prerequisite: {0}")]
    MissingPrerequisite(String),

    /// Forecasting was requested for a region without a model
    #[error("forecasting is only available for Egypt (selected: {0})")]
    UnsupportedRegion(String),

    /// Caller-supplied input is inconsistent or out of range
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Not enough usable rows to identify every model coefficient
    #[error("model is underdetermined: {rows} usable rows for {features} features")]
    Underdetermined { rows: usize, features: usize },

    /// A single commodity quote lookup failed
    #[error("quote for {symbol} unavailable: {message}")]
    Quote { symbol: String, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, NowcastError>;
