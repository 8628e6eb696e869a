//! Gaussian kernel density estimation.

use super::EstimatorError;
use crate::core::geometry::interp;
use crate::core::geometry::spline1d::SplineCurve1D;

/// A density estimate rendered as a spline, together with the effective
/// bandwidth and a degeneracy flag.
#[derive(Debug, Clone)]
pub struct DensityEstimate {
    pub curve: SplineCurve1D,
    pub band_width: f64,
    pub degenerate: bool,
}

impl DensityEstimate {
    /// The zero function around `centre`, flagged as degenerate. Used when
    /// no meaningful estimate exists (empty sample, vanishing bandwidth).
    pub fn zero(centre: f64) -> Self {
        zero_estimate(&[centre])
    }
}

/// Gaussian kernel evaluated at `u`.
#[inline]
pub fn gaussian_kernel(u: f64) -> f64 {
    (-0.5 * u * u).exp() / (2.0 * std::f64::consts::PI).sqrt()
}

/// Gaussian kernel density estimator.
///
/// The density is evaluated on a uniform grid extending `eval_range_cutoff`
/// bandwidths beyond the data range with spacing at most
/// `max_eval_point_dist`, and returned as a cubic interpolating spline. The
/// padding makes the spline fall off smoothly to zero in the tails.
#[derive(Debug, Clone, PartialEq)]
pub struct KernelDensityEstimator {
    pub band_width: f64,
    pub eval_range_cutoff: f64,
    pub max_eval_point_dist: f64,
}

impl KernelDensityEstimator {
    /// Estimates the probability density of `samples`.
    ///
    /// Fewer than two samples or a vanishing sample spread yield a
    /// degenerate zero spline.
    pub fn estimate(&self, samples: &[f64]) -> Result<DensityEstimate, EstimatorError> {
        self.validate()?;
        if is_degenerate(samples) {
            return Ok(zero_estimate(samples));
        }

        let grid = evaluation_grid(
            samples,
            self.band_width,
            self.eval_range_cutoff,
            self.max_eval_point_dist,
        );
        let norm = 1.0 / (samples.len() as f64 * self.band_width);
        let density: Vec<f64> = grid
            .iter()
            .map(|&x| {
                norm * samples
                    .iter()
                    .map(|&xi| gaussian_kernel((x - xi) / self.band_width))
                    .sum::<f64>()
            })
            .collect();

        let curve = interp::cubic_interp_1d(&grid, &density)?;
        Ok(DensityEstimate {
            curve,
            band_width: self.band_width,
            degenerate: false,
        })
    }

    fn validate(&self) -> Result<(), EstimatorError> {
        for (name, value) in [
            ("band_width", self.band_width),
            ("eval_range_cutoff", self.eval_range_cutoff),
            ("max_eval_point_dist", self.max_eval_point_dist),
        ] {
            if value <= 0.0 || !value.is_finite() {
                return Err(EstimatorError::NonPositiveParameter { name, value });
            }
        }
        Ok(())
    }
}

/// Weighted Gaussian kernel density estimator,
/// `f(x) = sum_i w_i K((x - x_i)/h) / (h sum_i w_i)`.
///
/// Used for hydrophobicity profiles, where the weights are per-residue
/// hydrophobicity values at mapped arc-length positions.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedKernelDensityEstimator {
    pub band_width: f64,
    pub eval_range_cutoff: f64,
    pub max_eval_point_dist: f64,
}

impl WeightedKernelDensityEstimator {
    pub fn estimate(
        &self,
        samples: &[f64],
        weights: &[f64],
    ) -> Result<DensityEstimate, EstimatorError> {
        KernelDensityEstimator {
            band_width: self.band_width,
            eval_range_cutoff: self.eval_range_cutoff,
            max_eval_point_dist: self.max_eval_point_dist,
        }
        .validate()?;

        if samples.len() != weights.len() {
            return Err(EstimatorError::WeightLengthMismatch {
                samples: samples.len(),
                weights: weights.len(),
            });
        }
        if is_degenerate(samples) {
            return Ok(zero_estimate(samples));
        }

        let grid = evaluation_grid(
            samples,
            self.band_width,
            self.eval_range_cutoff,
            self.max_eval_point_dist,
        );
        let total_weight: f64 = weights.iter().sum();
        let norm = if total_weight.abs() > 0.0 {
            1.0 / (self.band_width * total_weight)
        } else {
            0.0
        };
        let density: Vec<f64> = grid
            .iter()
            .map(|&x| {
                norm * samples
                    .iter()
                    .zip(weights)
                    .map(|(&xi, &wi)| wi * gaussian_kernel((x - xi) / self.band_width))
                    .sum::<f64>()
            })
            .collect();

        let curve = interp::cubic_interp_1d(&grid, &density)?;
        Ok(DensityEstimate {
            curve,
            band_width: self.band_width,
            degenerate: false,
        })
    }
}

fn is_degenerate(samples: &[f64]) -> bool {
    if samples.len() < 2 {
        return true;
    }
    let lo = samples.iter().cloned().fold(f64::INFINITY, f64::min);
    let hi = samples.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    !(hi - lo).is_finite() || hi - lo <= 0.0
}

/// The zero function on a unit interval around the data (or the origin),
/// flagged as degenerate.
fn zero_estimate(samples: &[f64]) -> DensityEstimate {
    let centre = if samples.is_empty() { 0.0 } else { samples[0] };
    let curve = interp::linear_interp_1d(&[centre - 1.0, centre + 1.0], &[0.0, 0.0])
        .expect("zero spline over a fixed interval is always valid");
    DensityEstimate {
        curve,
        band_width: 0.0,
        degenerate: true,
    }
}

/// Uniform evaluation grid padded `cutoff` bandwidths beyond the data range.
fn evaluation_grid(samples: &[f64], h: f64, cutoff: f64, max_spacing: f64) -> Vec<f64> {
    let data_lo = samples.iter().cloned().fold(f64::INFINITY, f64::min);
    let data_hi = samples.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let lo = data_lo - cutoff * h;
    let hi = data_hi + cutoff * h;
    let n = (((hi - lo) / max_spacing).ceil() as usize).max(3);
    let step = (hi - lo) / n as f64;
    (0..=n).map(|i| lo + i as f64 * step).collect()
}
