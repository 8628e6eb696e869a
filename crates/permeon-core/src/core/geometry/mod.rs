pub mod basis;
pub mod interp;
pub mod spline1d;
pub mod spline3d;

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeometryError {
    #[error("Need at least {min} support points for interpolation, got {actual}")]
    TooFewPoints { min: usize, actual: usize },

    #[error("Support points and values differ in length ({points} vs {values})")]
    LengthMismatch { points: usize, values: usize },

    #[error("Support points must be strictly increasing (violated at index {index})")]
    NonMonotonic { index: usize },

    #[error("Non-finite value encountered at index {index}")]
    NonFinite { index: usize },

    #[error("Singular collocation system in spline interpolation")]
    SingularSystem,
}
