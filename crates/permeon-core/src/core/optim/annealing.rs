//! Simulated annealing with isotropic candidate generation.

use super::OptimPoint;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Parameters of the annealing schedule.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnealingConfig {
    /// PRNG seed; identical seeds and inputs produce identical trajectories.
    pub seed: u64,
    /// Number of cooling iterations; zero disables the stage entirely.
    pub max_iter: usize,
    /// Initial temperature.
    pub init_temp: f64,
    /// Exponential cooling factor, in (0, 1).
    pub cooling_factor: f64,
    /// Isotropic step length factor for candidate generation.
    pub step_length_factor: f64,
}

impl Default for AnnealingConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            max_iter: 100,
            init_temp: 0.1,
            cooling_factor: 0.98,
            step_length_factor: 0.001,
        }
    }
}

/// A maximizer over a real vector space using isotropic simulated annealing.
///
/// Candidate states are generated by a uniform step in `[-sigma*sqrt(3),
/// sigma*sqrt(3)]` per component (so the per-component standard deviation is
/// `sigma`), accepted with the Boltzmann probability
/// `min(1, exp((c_cand - c_crnt) / T))`, and the temperature decays
/// exponentially after every iteration.
#[derive(Debug, Clone)]
pub struct SimulatedAnnealing {
    config: AnnealingConfig,
}

impl SimulatedAnnealing {
    pub fn new(config: AnnealingConfig) -> Self {
        Self { config }
    }

    /// Runs the annealing loop from `init` and returns the best state found.
    ///
    /// If no finite-valued candidate is ever accepted, the initial state is
    /// returned together with its (possibly non-finite) cost; the caller
    /// decides whether that constitutes a failure.
    pub fn maximize<F>(&self, objective: F, init: &[f64]) -> OptimPoint
    where
        F: Fn(&[f64]) -> f64,
    {
        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed);
        let half_width = self.config.step_length_factor * 3.0_f64.sqrt();

        let mut crnt = init.to_vec();
        let mut crnt_cost = objective(&crnt);
        let mut best = crnt.clone();
        let mut best_cost = crnt_cost;

        let mut temp = self.config.init_temp;
        let mut cand = vec![0.0; crnt.len()];

        for _ in 0..self.config.max_iter {
            for (c, x) in cand.iter_mut().zip(&crnt) {
                *c = x + rng.gen_range(-half_width..=half_width);
            }
            let cand_cost = objective(&cand);

            // Boltzmann acceptance; a NaN candidate is never accepted, and a
            // finite candidate always replaces a NaN current state
            let acc_prob = if cand_cost.is_nan() {
                0.0
            } else if crnt_cost.is_nan() {
                1.0
            } else {
                ((cand_cost - crnt_cost) / temp).exp().min(1.0)
            };
            if rng.gen::<f64>() < acc_prob {
                crnt.copy_from_slice(&cand);
                crnt_cost = cand_cost;
                if cand_cost > best_cost || !best_cost.is_finite() {
                    best.copy_from_slice(&cand);
                    best_cost = cand_cost;
                }
            }

            temp *= self.config.cooling_factor;
        }

        OptimPoint {
            state: best,
            cost: best_cost,
        }
    }
}
