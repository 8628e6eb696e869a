pub mod aggregate;
pub mod config;
pub mod error;
pub mod path;
pub mod pathfinding;
pub mod pipeline;
pub mod progress;
