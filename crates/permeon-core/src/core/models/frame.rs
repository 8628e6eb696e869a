use nalgebra::Point3;
use thiserror::Error;

/// Per-frame particle positions handed over by the trajectory reader.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Timestamp of the frame (ps).
    pub time: f64,
    /// One position per topology atom, in nm.
    pub positions: Vec<Point3<f64>>,
}

#[derive(Debug, Error)]
pub enum FrameSourceError {
    #[error("I/O error while reading frame: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed frame data: {0}")]
    Malformed(String),

    #[error("Frame has {actual} positions but topology declares {expected} atoms")]
    AtomCountMismatch { expected: usize, actual: usize },
}

/// Contract presented by the external trajectory reader.
///
/// `next_frame` yields frames in trajectory order and `Ok(None)` at the end
/// of the trajectory.
pub trait FrameSource {
    fn next_frame(&mut self) -> Result<Option<Frame>, FrameSourceError>;
}
