//! # Commerce Math
//!
//! Numeric building blocks shared by the revenue analytics crates.
//! This crate provides trailing moving averages with pandas-style
//! minimum-period rules and a small ridge-penalised least squares solver
//! used when fitting additive forecast models.

use thiserror::Error;

pub mod linear_algebra;
pub mod moving_averages;

pub use linear_algebra::{solve_penalized_least_squares, DesignMatrix};
pub use moving_averages::{trailing_means, TrailingMean};

/// Errors that can occur in numeric calculations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),
}

/// Result type for numeric operations
pub type Result<T> = std::result::Result<T, MathError>;
