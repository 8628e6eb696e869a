//! Scalar-valued parametric spline curves.

use itertools::Itertools;

use super::basis;
use crate::core::optim::golden_section_minimize;

/// A scalar B-spline curve over a clamped knot vector.
///
/// Inside the knot range evaluation sums the non-vanishing basis functions;
/// outside the knot range the curve is continued linearly using the value and
/// first derivative at the nearest boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct SplineCurve1D {
    degree: usize,
    knots: Vec<f64>,
    ctrl: Vec<f64>,
}

impl SplineCurve1D {
    /// Builds a curve from a full (padded) knot vector and control points.
    ///
    /// Knot vector length must equal `ctrl.len() + degree + 1`.
    pub fn new(degree: usize, knots: Vec<f64>, ctrl: Vec<f64>) -> Self {
        assert_eq!(
            knots.len(),
            ctrl.len() + degree + 1,
            "knot vector size must be number of control points plus degree plus one"
        );
        Self {
            degree,
            knots,
            ctrl,
        }
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    pub fn ctrl_points(&self) -> &[f64] {
        &self.ctrl
    }

    pub fn knots(&self) -> &[f64] {
        &self.knots
    }

    /// Knot vector with repeated knots collapsed.
    pub fn unique_knots(&self) -> Vec<f64> {
        self.knots.iter().copied().dedup().collect()
    }

    /// Curve values at the unique knots. Together with the unique knots these
    /// fully describe an interpolating spline for serialization.
    pub fn knot_values(&self) -> Vec<f64> {
        self.unique_knots()
            .iter()
            .map(|&k| self.evaluate(k, 0))
            .collect()
    }

    /// Lower end of the knot range.
    pub fn domain_lo(&self) -> f64 {
        self.knots[self.degree]
    }

    /// Upper end of the knot range.
    pub fn domain_hi(&self) -> f64 {
        self.knots[self.knots.len() - 1 - self.degree]
    }

    /// Evaluates the curve or one of its derivatives at `x`.
    ///
    /// Outside the knot range the zeroth derivative is extrapolated linearly,
    /// the first derivative is constant, and higher derivatives vanish.
    pub fn evaluate(&self, x: f64, deriv: usize) -> f64 {
        let lo = self.domain_lo();
        let hi = self.domain_hi();
        if x < lo {
            return self.extrapolate(x, lo, deriv);
        }
        if x > hi {
            return self.extrapolate(x, hi, deriv);
        }
        self.evaluate_internal(x, deriv)
    }

    pub fn evaluate_multiple(&self, xs: &[f64], deriv: usize) -> Vec<f64> {
        xs.iter().map(|&x| self.evaluate(x, deriv)).collect()
    }

    /// Locates the minimum of the curve on `interval` by scanning a grid of
    /// spacing `sample_step` and refining around the best grid point with a
    /// golden-section search. Returns `(argmin, min)`.
    pub fn minimum(&self, interval: (f64, f64), sample_step: f64) -> (f64, f64) {
        let (lo, hi) = interval;
        let n = (((hi - lo) / sample_step).ceil() as usize).max(2);
        let step = (hi - lo) / n as f64;

        let mut best_x = lo;
        let mut best_val = self.evaluate(lo, 0);
        for i in 1..=n {
            let x = lo + i as f64 * step;
            let val = self.evaluate(x, 0);
            if val < best_val {
                best_val = val;
                best_x = x;
            }
        }

        let a = (best_x - step).max(lo);
        let b = (best_x + step).min(hi);
        golden_section_minimize(|x| self.evaluate(x, 0), a, b, 1e-9)
    }

    /// Shifts the parameter origin: all knots move by `delta`.
    pub fn shift_parameter(&mut self, delta: f64) {
        for k in &mut self.knots {
            *k += delta;
        }
    }

    fn extrapolate(&self, x: f64, boundary: f64, deriv: usize) -> f64 {
        match deriv {
            0 => {
                self.evaluate_internal(boundary, 0)
                    + (x - boundary) * self.evaluate_internal(boundary, 1)
            }
            1 => self.evaluate_internal(boundary, 1),
            _ => 0.0,
        }
    }

    fn evaluate_internal(&self, x: f64, deriv: usize) -> f64 {
        let ival = self.find_interval(x);
        let lo = ival.saturating_sub(self.degree);
        (lo..=ival)
            .map(|j| self.ctrl[j] * basis::eval_derivative(&self.knots, self.degree, j, x, deriv))
            .sum()
    }

    /// Index of the knot interval containing `x`, clamped into the valid
    /// basis range so the upper domain boundary falls into the last
    /// non-empty interval.
    fn find_interval(&self, x: f64) -> usize {
        let upper = self.ctrl.len() - 1;
        let raw = self.knots.partition_point(|&k| k <= x);
        raw.saturating_sub(1).clamp(self.degree, upper)
    }
}
