use thiserror::Error;

use crate::core::db::LookupError;
use crate::core::geometry::GeometryError;
use crate::core::models::frame::FrameSourceError;
use crate::core::stats::EstimatorError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Configuration error: option '{option}': {message}")]
    Config {
        option: &'static str,
        message: String,
    },

    #[error("Parameter lookup failed: {source}")]
    Lookup {
        #[from]
        source: LookupError,
    },

    #[error("Degenerate probe sample sequence: {reason}")]
    DegenerateSamples { reason: String },

    #[error("Spline construction failed: {source}")]
    Geometry {
        #[from]
        source: GeometryError,
    },

    #[error("Density estimation failed: {source}")]
    Estimator {
        #[from]
        source: EstimatorError,
    },

    #[error("Selection group '{0}' not found in topology")]
    UnknownSelection(String),

    #[error("Trajectory input failed: {source}")]
    FrameSource {
        #[from]
        source: FrameSourceError,
    },

    #[error("Per-frame stream line {line} is not a valid record: {message}")]
    MalformedRecord { line: usize, message: String },

    #[error("I/O error on '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Internal logic error: {0}")]
    Internal(String),
}
