//! Downhill simplex refinement (maximizing variant).

use super::OptimPoint;

/// Parameters of the Nelder–Mead stage.
#[derive(Debug, Clone, PartialEq)]
pub struct NelderMeadConfig {
    /// Iteration cap; zero disables the stage entirely.
    pub max_iter: usize,
    /// Distance of the non-anchor vertices in the initial simplex.
    pub init_shift: f64,
}

impl Default for NelderMeadConfig {
    fn default() -> Self {
        Self {
            max_iter: 100,
            init_shift: 0.1,
        }
    }
}

const ALPHA: f64 = 1.0; // reflection
const GAMMA: f64 = 2.0; // expansion
const BETA: f64 = 0.5; // contraction
const DELTA: f64 = 0.5; // shrink

/// The Nelder–Mead simplex method, run as a maximizer by negating the
/// objective internally. The initial simplex consists of the start point and
/// one vertex shifted by `init_shift` along each coordinate axis.
#[derive(Debug, Clone)]
pub struct NelderMead {
    config: NelderMeadConfig,
}

impl NelderMead {
    pub fn new(config: NelderMeadConfig) -> Self {
        Self { config }
    }

    pub fn maximize<F>(&self, objective: F, init: &[f64]) -> OptimPoint
    where
        F: Fn(&[f64]) -> f64,
    {
        let dim = init.len();
        let neg = |x: &[f64]| -objective(x);

        // vertices carry (point, negated cost)
        let mut simplex: Vec<(Vec<f64>, f64)> = Vec::with_capacity(dim + 1);
        simplex.push((init.to_vec(), neg(init)));
        for j in 0..dim {
            let mut vertex = init.to_vec();
            vertex[j] += self.config.init_shift;
            let cost = neg(&vertex);
            simplex.push((vertex, cost));
        }

        for _ in 0..self.config.max_iter {
            simplex.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
            let worst = simplex.len() - 1;

            let centroid = centroid_excluding(&simplex, worst);
            let reflected = affine(&centroid, &simplex[worst].0, -ALPHA);
            let reflected_cost = neg(&reflected);

            if reflected_cost < simplex[0].1 {
                // try to expand past the reflected point
                let expanded = affine(&centroid, &simplex[worst].0, -GAMMA);
                let expanded_cost = neg(&expanded);
                simplex[worst] = if expanded_cost < reflected_cost {
                    (expanded, expanded_cost)
                } else {
                    (reflected, reflected_cost)
                };
            } else if reflected_cost < simplex[worst - 1].1 {
                simplex[worst] = (reflected, reflected_cost);
            } else {
                let contracted = affine(&centroid, &simplex[worst].0, BETA);
                let contracted_cost = neg(&contracted);
                if contracted_cost < simplex[worst].1 {
                    simplex[worst] = (contracted, contracted_cost);
                } else {
                    shrink_towards_best(&mut simplex, &neg);
                }
            }
        }

        simplex.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
        let (state, neg_cost) = simplex.swap_remove(0);
        OptimPoint {
            state,
            cost: -neg_cost,
        }
    }
}

fn centroid_excluding(simplex: &[(Vec<f64>, f64)], excluded: usize) -> Vec<f64> {
    let dim = simplex[0].0.len();
    let mut centroid = vec![0.0; dim];
    for (i, (vertex, _)) in simplex.iter().enumerate() {
        if i == excluded {
            continue;
        }
        for (c, v) in centroid.iter_mut().zip(vertex) {
            *c += v;
        }
    }
    let count = (simplex.len() - 1) as f64;
    for c in &mut centroid {
        *c /= count;
    }
    centroid
}

/// Point `centroid + factor * (worst - centroid)`; negative factors reflect.
fn affine(centroid: &[f64], worst: &[f64], factor: f64) -> Vec<f64> {
    centroid
        .iter()
        .zip(worst)
        .map(|(c, w)| c + factor * (w - c))
        .collect()
}

fn shrink_towards_best<F>(simplex: &mut [(Vec<f64>, f64)], neg: &F)
where
    F: Fn(&[f64]) -> f64,
{
    let best = simplex[0].0.clone();
    for (vertex, cost) in simplex.iter_mut().skip(1) {
        for (v, b) in vertex.iter_mut().zip(&best) {
            *v = b + DELTA * (*v - b);
        }
        *cost = neg(vertex);
    }
}
