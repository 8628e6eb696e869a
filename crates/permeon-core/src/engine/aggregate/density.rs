//! Conversion of probability density to physical number density.

use crate::core::geometry::interp;
use crate::core::geometry::spline1d::SplineCurve1D;
use crate::engine::error::EngineError;

/// Radii below this are clamped so near-closed pores give large but finite
/// number densities.
const MIN_RADIUS: f64 = 1e-6;

/// Number density `n(s) = f(s) * N / (pi R(s)^2)` at each support point.
pub fn number_density_samples(density: &[f64], radius: &[f64], num_sample: usize) -> Vec<f64> {
    density
        .iter()
        .zip(radius)
        .map(|(&f, &r)| {
            let r = r.max(MIN_RADIUS);
            (f * num_sample as f64 / (std::f64::consts::PI * r * r)).max(0.0)
        })
        .collect()
}

/// Number density as a spline over the knots of the probability-density
/// spline.
pub fn number_density_spline(
    density: &SplineCurve1D,
    radius: &SplineCurve1D,
    num_sample: usize,
) -> Result<SplineCurve1D, EngineError> {
    let knots = density.unique_knots();
    let density_values = density.evaluate_multiple(&knots, 0);
    let radius_values = radius.evaluate_multiple(&knots, 0);
    let values = number_density_samples(&density_values, &radius_values, num_sample);
    Ok(interp::cubic_interp_1d(&knots, &values)?)
}
