pub mod db;
pub mod geometry;
pub mod models;
pub mod optim;
pub mod stats;
