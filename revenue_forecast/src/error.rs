//! Error types for the revenue_forecast crate

use thiserror::Error;

/// Custom error types for the revenue_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// Error related to data validation or processing
    #[error("Data error: {0}")]
    DataError(String),

    /// Not enough observations to fit or evaluate something
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// Error related to parameter validation
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Error related to consistency checks between series
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Error from numeric primitives
    #[error("Math error: {0}")]
    MathError(#[from] commerce_math::MathError),

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from CSV parsing
    #[error("CSV error: {0}")]
    CsvError(String),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<csv::Error> for ForecastError {
    fn from(err: csv::Error) -> Self {
        ForecastError::CsvError(err.to_string())
    }
}

impl ForecastError {
    /// True when the error means "not enough data", as opposed to a fault
    pub fn is_insufficient_data(&self) -> bool {
        matches!(
            self,
            ForecastError::InsufficientData(_)
                | ForecastError::MathError(commerce_math::MathError::InsufficientData(_))
        )
    }
}
