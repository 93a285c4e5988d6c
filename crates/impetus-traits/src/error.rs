//! Error types for the Impetus framework.
//!
//! Configuration and alignment problems are reported as errors. Missing price
//! observations are not: they travel through the pipeline as empty panel cells.

use thiserror::Error;

use crate::types::PriceField;

/// The main error type for Impetus operations.
#[derive(Debug, Error)]
pub enum ImpetusError {
    /// Invalid parameter combination, detected before any computation.
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// A price field required by a stage is absent from the price panel.
    #[error("Missing required price field: {0}")]
    MissingField(PriceField),

    /// Panels handed between stages do not share the same dates or securities.
    #[error("Panel alignment mismatch: {0}")]
    Alignment(String),

    /// Error due to invalid or malformed data.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Error from Polars operations.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// Error while decoding a JSON configuration.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error while reading a configuration file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ImpetusError {
    /// Returns true for errors raised while validating configuration.
    pub const fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_) | Self::MissingField(_))
    }
}

/// A specialized Result type for Impetus operations.
///
/// This is a convenience type that uses [`ImpetusError`] as the error type.
pub type Result<T> = std::result::Result<T, ImpetusError>;
