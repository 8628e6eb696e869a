//! Vector-valued parametric spline curves.

use itertools::Itertools;
use nalgebra::{Point3, Vector3};

use super::basis;

/// A 3-D B-spline curve over a clamped knot vector.
///
/// Shares the evaluation semantics of
/// [`SplineCurve1D`](super::spline1d::SplineCurve1D): Cox–de Boor evaluation
/// inside the knot range, linear continuation outside. Additionally provides
/// arc-length integration and a local orthonormal frame, which the molecular
/// path model uses for curvilinear coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct SplineCurve3D {
    degree: usize,
    knots: Vec<f64>,
    ctrl: Vec<Point3<f64>>,
}

impl SplineCurve3D {
    pub fn new(degree: usize, knots: Vec<f64>, ctrl: Vec<Point3<f64>>) -> Self {
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

    pub fn ctrl_points(&self) -> &[Point3<f64>] {
        &self.ctrl
    }

    pub fn unique_knots(&self) -> Vec<f64> {
        self.knots.iter().copied().dedup().collect()
    }

    /// Curve points at the unique knots, for serialization of an
    /// interpolating curve.
    pub fn knot_points(&self) -> Vec<Point3<f64>> {
        self.unique_knots()
            .iter()
            .map(|&k| self.evaluate(k))
            .collect()
    }

    pub fn domain_lo(&self) -> f64 {
        self.knots[self.degree]
    }

    pub fn domain_hi(&self) -> f64 {
        self.knots[self.knots.len() - 1 - self.degree]
    }

    pub fn evaluate(&self, t: f64) -> Point3<f64> {
        let lo = self.domain_lo();
        let hi = self.domain_hi();
        if t < lo {
            return self.evaluate_internal(lo) + (t - lo) * self.derivative_internal(lo, 1);
        }
        if t > hi {
            return self.evaluate_internal(hi) + (t - hi) * self.derivative_internal(hi, 1);
        }
        self.evaluate_internal(t)
    }

    /// Derivative of the given order; constant first derivative and vanishing
    /// higher derivatives outside the knot range.
    pub fn derivative(&self, t: f64, order: usize) -> Vector3<f64> {
        let lo = self.domain_lo();
        let hi = self.domain_hi();
        let clamped = t.clamp(lo, hi);
        if clamped != t && order > 1 {
            return Vector3::zeros();
        }
        self.derivative_internal(clamped, order)
    }

    pub fn speed(&self, t: f64) -> f64 {
        self.derivative(t, 1).norm()
    }

    /// Arc length between two parameter values by adaptive Simpson
    /// quadrature of the parametric speed.
    pub fn arc_length_between(&self, a: f64, b: f64, tol: f64) -> f64 {
        if a == b {
            return 0.0;
        }
        let f = |t: f64| self.speed(t);
        let fa = f(a);
        let fb = f(b);
        let fm = f(0.5 * (a + b));
        adaptive_simpson(&f, a, b, fa, fm, fb, tol, 24)
    }

    /// Cumulative arc length at every unique knot, starting at zero.
    pub fn arc_length_at_knots(&self, tol: f64) -> Vec<f64> {
        let knots = self.unique_knots();
        let mut lengths = Vec::with_capacity(knots.len());
        let mut acc = 0.0;
        lengths.push(0.0);
        for pair in knots.windows(2) {
            acc += self.arc_length_between(pair[0], pair[1], tol);
            lengths.push(acc);
        }
        lengths
    }

    /// Unit tangent at `t`.
    pub fn tangent(&self, t: f64) -> Vector3<f64> {
        let d = self.derivative(t, 1);
        let norm = d.norm();
        if norm > 0.0 {
            d / norm
        } else {
            Vector3::z()
        }
    }

    /// Local orthonormal frame (tangent, normal, binormal) at `t`.
    ///
    /// The normal follows the curvature vector; on straight segments, where
    /// the curvature vanishes, an arbitrary but deterministic perpendicular
    /// direction is substituted so azimuth angles stay well defined.
    pub fn frame(&self, t: f64) -> (Vector3<f64>, Vector3<f64>, Vector3<f64>) {
        let tangent = self.tangent(t);
        let second = self.derivative(t, 2);
        let mut normal = second - second.dot(&tangent) * tangent;
        if normal.norm() < 1e-10 {
            normal = perpendicular(&tangent);
        }
        let normal = normal.normalize();
        let binormal = tangent.cross(&normal);
        (tangent, normal, binormal)
    }

    /// Translates the curve by a constant offset.
    pub fn shift(&mut self, offset: &Vector3<f64>) {
        for p in &mut self.ctrl {
            *p += offset;
        }
    }

    /// Shifts the parameter origin: all knots move by `delta`.
    pub fn shift_parameter(&mut self, delta: f64) {
        for k in &mut self.knots {
            *k += delta;
        }
    }

    fn evaluate_internal(&self, t: f64) -> Point3<f64> {
        let ival = self.find_interval(t);
        let lo = ival.saturating_sub(self.degree);
        let mut acc = Vector3::zeros();
        for j in lo..=ival {
            acc += self.ctrl[j].coords * basis::eval(&self.knots, self.degree, j, t);
        }
        Point3::from(acc)
    }

    fn derivative_internal(&self, t: f64, order: usize) -> Vector3<f64> {
        let ival = self.find_interval(t);
        let lo = ival.saturating_sub(self.degree);
        let mut acc = Vector3::zeros();
        for j in lo..=ival {
            acc +=
                self.ctrl[j].coords * basis::eval_derivative(&self.knots, self.degree, j, t, order);
        }
        acc
    }

    fn find_interval(&self, t: f64) -> usize {
        let upper = self.ctrl.len() - 1;
        let raw = self.knots.partition_point(|&k| k <= t);
        raw.saturating_sub(1).clamp(self.degree, upper)
    }
}

/// A deterministic unit vector perpendicular to `v`.
fn perpendicular(v: &Vector3<f64>) -> Vector3<f64> {
    let axis = if v.x.abs() <= v.y.abs() && v.x.abs() <= v.z.abs() {
        Vector3::x()
    } else if v.y.abs() <= v.z.abs() {
        Vector3::y()
    } else {
        Vector3::z()
    };
    let p = axis - axis.dot(v) * v;
    p.normalize()
}

#[allow(clippy::too_many_arguments)]
fn adaptive_simpson(
    f: &dyn Fn(f64) -> f64,
    a: f64,
    b: f64,
    fa: f64,
    fm: f64,
    fb: f64,
    tol: f64,
    depth: usize,
) -> f64 {
    let m = 0.5 * (a + b);
    let h = b - a;
    let whole = h / 6.0 * (fa + 4.0 * fm + fb);

    let lm = 0.5 * (a + m);
    let rm = 0.5 * (m + b);
    let flm = f(lm);
    let frm = f(rm);
    let left = h / 12.0 * (fa + 4.0 * flm + fm);
    let right = h / 12.0 * (fm + 4.0 * frm + fb);
    let delta = left + right - whole;

    if depth == 0 || delta.abs() <= 15.0 * tol {
        left + right + delta / 15.0
    } else {
        adaptive_simpson(f, a, m, fa, flm, fm, 0.5 * tol, depth - 1)
            + adaptive_simpson(f, m, b, fm, frm, fb, 0.5 * tol, depth - 1)
    }
}
