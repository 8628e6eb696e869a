//! Probe-based path finding with in-plane radius optimization.

use nalgebra::{Point3, Unit, Vector3};
use tracing::{debug, trace};

use super::cost::FreeRadiusOracle;
use super::{assign_arc_positions, PathFindingError, ProbeSample};
use crate::core::models::particle::Particle;
use crate::core::optim::annealing::{AnnealingConfig, SimulatedAnnealing};
use crate::core::optim::nelder_mead::{NelderMead, NelderMeadConfig};
use crate::engine::config::PathFinderConfig;

/// Locates a maximum-inscribed-sphere curve through a particle cloud.
///
/// Starting from the seed position, the probe centre is optimized in the
/// plane perpendicular to the channel direction (simulated annealing seeding
/// a Nelder–Mead simplex), then advanced by one probe step and re-optimized
/// in the next parallel plane, forward and backward, until the free radius
/// reaches `max_free_dist` (the probe has exited into bulk) or the step cap
/// is hit.
pub struct InplaneOptimizedPathFinder<'a> {
    config: &'a PathFinderConfig,
    annealing: &'a AnnealingConfig,
    nelder_mead: &'a NelderMeadConfig,
    oracle: FreeRadiusOracle,
    direction: Unit<Vector3<f64>>,
    plane_u: Vector3<f64>,
    plane_v: Vector3<f64>,
}

impl<'a> InplaneOptimizedPathFinder<'a> {
    pub fn new(
        config: &'a PathFinderConfig,
        annealing: &'a AnnealingConfig,
        nelder_mead: &'a NelderMeadConfig,
        particles: &[Particle],
    ) -> Self {
        let oracle = FreeRadiusOracle::new(particles, config.max_free_dist, config.cutoff);
        let direction = Unit::new_normalize(config.channel_direction);
        let (plane_u, plane_v) = plane_basis(&direction);
        Self {
            config,
            annealing,
            nelder_mead,
            oracle,
            direction,
            plane_u,
            plane_v,
        }
    }

    pub fn find_path(
        &self,
        init_probe_pos: &Point3<f64>,
    ) -> Result<Vec<ProbeSample>, PathFindingError> {
        let (seed_centre, seed_radius) = self.optimize_in_plane(init_probe_pos);
        if !seed_radius.is_finite() {
            return Err(PathFindingError::NonFiniteRadius { step: 0 });
        }
        if seed_radius <= 0.0 {
            return Err(PathFindingError::SeedBlocked {
                radius: seed_radius,
            });
        }
        debug!(
            radius = seed_radius,
            "Seed probe optimization succeeded, extending along the channel"
        );

        let forward = self.extend(&seed_centre, self.direction.into_inner())?;
        let backward = self.extend(&seed_centre, -self.direction.into_inner())?;

        let mut samples: Vec<ProbeSample> = Vec::with_capacity(forward.len() + backward.len() + 1);
        samples.extend(backward.into_iter().rev());
        samples.push(ProbeSample {
            centre: seed_centre,
            radius: seed_radius,
            s: 0.0,
        });
        samples.extend(forward);

        assign_arc_positions(&mut samples);
        debug!(num_samples = samples.len(), "Path finding finished");
        Ok(samples)
    }

    /// Extends the pathway in one direction until the probe exits into bulk
    /// or the step cap is reached.
    fn extend(
        &self,
        seed: &Point3<f64>,
        step_dir: Vector3<f64>,
    ) -> Result<Vec<ProbeSample>, PathFindingError> {
        let mut samples = Vec::new();
        let mut prev = *seed;
        for step in 1..=self.config.max_probe_steps {
            let proposal = prev + self.config.probe_step * step_dir;
            let (centre, radius) = self.optimize_in_plane(&proposal);
            if !radius.is_finite() {
                return Err(PathFindingError::NonFiniteRadius { step });
            }
            trace!(step, radius, "probe step");
            samples.push(ProbeSample {
                centre,
                radius,
                s: 0.0,
            });
            if radius >= self.config.max_free_dist {
                return Ok(samples);
            }
            prev = centre;
        }
        debug!(
            steps = self.config.max_probe_steps,
            "Probe step cap reached before exiting into bulk"
        );
        Ok(samples)
    }

    /// Maximizes the free radius within the plane through `anchor`
    /// perpendicular to the channel direction.
    fn optimize_in_plane(&self, anchor: &Point3<f64>) -> (Point3<f64>, f64) {
        let objective = |x: &[f64]| {
            let q = anchor + x[0] * self.plane_u + x[1] * self.plane_v;
            self.oracle.free_radius(&q)
        };

        let seeded = SimulatedAnnealing::new(self.annealing.clone()).maximize(objective, &[0.0; 2]);
        let refined = NelderMead::new(self.nelder_mead.clone()).maximize(objective, &seeded.state);

        let best = if refined.cost >= seeded.cost {
            refined
        } else {
            seeded
        };
        let centre = anchor + best.state[0] * self.plane_u + best.state[1] * self.plane_v;
        (centre, best.cost)
    }
}

/// Orthonormal in-plane basis perpendicular to the channel direction.
fn plane_basis(direction: &Unit<Vector3<f64>>) -> (Vector3<f64>, Vector3<f64>) {
    let d = direction.into_inner();
    let axis = if d.x.abs() <= d.y.abs() && d.x.abs() <= d.z.abs() {
        Vector3::x()
    } else if d.y.abs() <= d.z.abs() {
        Vector3::y()
    } else {
        Vector3::z()
    };
    let u = d.cross(&axis).normalize();
    let v = d.cross(&u);
    (u, v)
}
