pub mod frame;
pub mod particle;
pub mod selection;
pub mod topology;
