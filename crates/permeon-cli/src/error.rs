use permeon::core::db::LookupError;
use permeon::core::models::frame::FrameSourceError;
use permeon::engine::error::EngineError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("Input error: {0}")]
    FrameSource(#[from] FrameSourceError),

    #[error("Database error: {0}")]
    Lookup(#[from] LookupError),

    #[error("Invalid argument: {0}")]
    Argument(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
