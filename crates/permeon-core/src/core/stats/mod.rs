pub mod bandwidth;
pub mod histogram;
pub mod kde;
pub mod summary;

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum EstimatorError {
    #[error("Estimator parameter '{name}' must be positive, got {value}")]
    NonPositiveParameter { name: &'static str, value: f64 },

    #[error("Sample and weight vectors differ in length ({samples} vs {weights})")]
    WeightLengthMismatch { samples: usize, weights: usize },

    #[error("Density spline construction failed: {0}")]
    Spline(#[from] crate::core::geometry::GeometryError),
}
