//! Trivial cylindrical pathway, for debugging and as a baseline.

use nalgebra::{Point3, Unit};

use super::{assign_arc_positions, ProbeSample};
use crate::engine::config::PathFinderConfig;

/// Emits samples at a fixed step along the channel direction, all with the
/// maximum free radius. No optimization and no particle input.
pub struct NaiveCylindricalPathFinder<'a> {
    config: &'a PathFinderConfig,
}

impl<'a> NaiveCylindricalPathFinder<'a> {
    pub fn new(config: &'a PathFinderConfig) -> Self {
        Self { config }
    }

    pub fn find_path(&self, init_probe_pos: &Point3<f64>) -> Vec<ProbeSample> {
        let direction = Unit::new_normalize(self.config.channel_direction).into_inner();
        let n = self.config.max_probe_steps as i64;

        let mut samples = Vec::with_capacity(2 * self.config.max_probe_steps + 1);
        for k in -n..=n {
            samples.push(ProbeSample {
                centre: init_probe_pos + k as f64 * self.config.probe_step * direction,
                radius: self.config.max_free_dist,
                s: 0.0,
            });
        }
        assign_arc_positions(&mut samples);
        samples
    }
}
