//! Histogram density estimation.

use super::kde::DensityEstimate;
use super::EstimatorError;
use crate::core::geometry::interp;

/// A fixed-bin-width histogram density estimator.
///
/// Bin counts are normalized to `count / (n * h)` and the bin-centre values
/// are rendered as a degree-1 spline, with zero anchors half a bin beyond
/// the data range so the profile drops to zero at the edges.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramDensityEstimator {
    pub bin_width: f64,
}

impl HistogramDensityEstimator {
    pub fn estimate(&self, samples: &[f64]) -> Result<DensityEstimate, EstimatorError> {
        if self.bin_width <= 0.0 || !self.bin_width.is_finite() {
            return Err(EstimatorError::NonPositiveParameter {
                name: "bin_width",
                value: self.bin_width,
            });
        }

        let lo = samples.iter().cloned().fold(f64::INFINITY, f64::min);
        let hi = samples.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        if samples.len() < 2 || !(hi - lo).is_finite() || hi - lo <= 0.0 {
            return Ok(degenerate(samples));
        }

        let h = self.bin_width;
        let num_bins = (((hi - lo) / h).ceil() as usize).max(1);
        let mut counts = vec![0usize; num_bins];
        for &x in samples {
            let bin = (((x - lo) / h) as usize).min(num_bins - 1);
            counts[bin] += 1;
        }

        let norm = 1.0 / (samples.len() as f64 * h);
        let mut support = Vec::with_capacity(num_bins + 2);
        let mut density = Vec::with_capacity(num_bins + 2);
        support.push(lo - 0.5 * h);
        density.push(0.0);
        for (bin, &count) in counts.iter().enumerate() {
            support.push(lo + (bin as f64 + 0.5) * h);
            density.push(count as f64 * norm);
        }
        support.push(lo + (num_bins as f64 + 0.5) * h);
        density.push(0.0);

        let curve = interp::linear_interp_1d(&support, &density)?;
        Ok(DensityEstimate {
            curve,
            band_width: 0.0,
            degenerate: false,
        })
    }
}

fn degenerate(samples: &[f64]) -> DensityEstimate {
    let centre = if samples.is_empty() { 0.0 } else { samples[0] };
    let curve = interp::linear_interp_1d(&[centre - 1.0, centre + 1.0], &[0.0, 0.0])
        .expect("zero spline over a fixed interval is always valid");
    DensityEstimate {
        curve,
        band_width: 0.0,
        degenerate: true,
    }
}
