pub mod cost;
pub mod cylindrical;
pub mod probe;

use nalgebra::Point3;
use thiserror::Error;

use super::config::{AnalysisConfig, PathFindingMethod};
use crate::core::models::particle::Particle;
use cylindrical::NaiveCylindricalPathFinder;
use probe::InplaneOptimizedPathFinder;

/// One probe position on the pathway: optimized centre, free radius, and the
/// arc position assigned post hoc from cumulative chord length.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeSample {
    pub centre: Point3<f64>,
    pub radius: f64,
    pub s: f64,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum PathFindingError {
    #[error("Initial probe optimization found no free space (radius {radius})")]
    SeedBlocked { radius: f64 },

    #[error("Probe optimization produced a non-finite radius at step {step}")]
    NonFiniteRadius { step: usize },
}

/// Assigns cumulative chord-length arc positions to an ordered sample
/// sequence, starting at zero.
pub(crate) fn assign_arc_positions(samples: &mut [ProbeSample]) {
    let mut acc = 0.0;
    for i in 0..samples.len() {
        if i > 0 {
            acc += (samples[i].centre - samples[i - 1].centre).norm();
        }
        samples[i].s = acc;
    }
}

/// Runs the configured path-finding strategy over the particle cloud.
///
/// The strategies are concrete types behind this narrow dispatch; no state
/// is shared between them.
pub fn find_path(
    config: &AnalysisConfig,
    particles: &[Particle],
    init_probe_pos: &Point3<f64>,
) -> Result<Vec<ProbeSample>, PathFindingError> {
    match config.path_finding_method {
        PathFindingMethod::InplaneOptimized => InplaneOptimizedPathFinder::new(
            &config.path_finder,
            &config.annealing,
            &config.nelder_mead,
            particles,
        )
        .find_path(init_probe_pos),
        PathFindingMethod::NaiveCylindrical => {
            Ok(NaiveCylindricalPathFinder::new(&config.path_finder).find_path(init_probe_pos))
        }
    }
}
