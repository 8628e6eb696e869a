//! Spline interpolation of sampled data.
//!
//! Cubic interpolation builds a clamped B-spline through the data with
//! Hermite end conditions; the end derivatives are estimated from a parabola
//! through the three outermost points, so quadratic data is reproduced
//! exactly. The collocation system is tridiagonal in the clamped basis and
//! solved with the Thomas algorithm.

use super::basis;
use super::spline1d::SplineCurve1D;
use super::spline3d::SplineCurve3D;
use super::GeometryError;
use nalgebra::Point3;

/// Interpolates scalar data with a clamped cubic B-spline.
///
/// # Arguments
///
/// * `x` - Strictly increasing support points (at least two).
/// * `f` - Function values, one per support point.
///
/// # Return
///
/// Returns the interpolating curve; it reproduces `f` at every support point
/// and extrapolates linearly outside the support range.
pub fn cubic_interp_1d(x: &[f64], f: &[f64]) -> Result<SplineCurve1D, GeometryError> {
    validate(x, f)?;
    let knots = basis::clamped_knots(x, 3);
    let ctrl = solve_cubic_coeffs(&knots, x, f)?;
    Ok(SplineCurve1D::new(3, knots, ctrl))
}

/// Interpolates 3-D points component-wise with clamped cubic B-splines
/// sharing one knot vector.
pub fn cubic_interp_3d(t: &[f64], points: &[Point3<f64>]) -> Result<SplineCurve3D, GeometryError> {
    if t.len() != points.len() {
        return Err(GeometryError::LengthMismatch {
            points: t.len(),
            values: points.len(),
        });
    }
    for (i, p) in points.iter().enumerate() {
        if !(p.x.is_finite() && p.y.is_finite() && p.z.is_finite()) {
            return Err(GeometryError::NonFinite { index: i });
        }
    }

    let components: [Vec<f64>; 3] = [
        points.iter().map(|p| p.x).collect(),
        points.iter().map(|p| p.y).collect(),
        points.iter().map(|p| p.z).collect(),
    ];
    validate(t, &components[0])?;

    let knots = basis::clamped_knots(t, 3);
    let cx = solve_cubic_coeffs(&knots, t, &components[0])?;
    let cy = solve_cubic_coeffs(&knots, t, &components[1])?;
    let cz = solve_cubic_coeffs(&knots, t, &components[2])?;

    let ctrl = cx
        .into_iter()
        .zip(cy)
        .zip(cz)
        .map(|((x, y), z)| Point3::new(x, y, z))
        .collect();
    Ok(SplineCurve3D::new(3, knots, ctrl))
}

/// Interpolates scalar data with a degree-1 B-spline (polyline).
pub fn linear_interp_1d(x: &[f64], f: &[f64]) -> Result<SplineCurve1D, GeometryError> {
    validate(x, f)?;
    let knots = basis::clamped_knots(x, 1);
    Ok(SplineCurve1D::new(1, knots, f.to_vec()))
}

fn validate(x: &[f64], f: &[f64]) -> Result<(), GeometryError> {
    if x.len() < 2 {
        return Err(GeometryError::TooFewPoints {
            min: 2,
            actual: x.len(),
        });
    }
    if x.len() != f.len() {
        return Err(GeometryError::LengthMismatch {
            points: x.len(),
            values: f.len(),
        });
    }
    for i in 0..x.len() {
        if !x[i].is_finite() || !f[i].is_finite() {
            return Err(GeometryError::NonFinite { index: i });
        }
        if i > 0 && x[i] <= x[i - 1] {
            return Err(GeometryError::NonMonotonic { index: i });
        }
    }
    Ok(())
}

/// Solves the clamped-cubic collocation system for the control points.
///
/// Row ordering [S(x0), S'(x0), S(x1), ..., S(x_{n-2}), S'(x_{n-1}),
/// S(x_{n-1})] makes the system tridiagonal: at a break point only three
/// consecutive cubic basis functions are non-zero, and the derivative rows
/// at the clamped ends involve only the two outermost basis functions.
fn solve_cubic_coeffs(knots: &[f64], x: &[f64], f: &[f64]) -> Result<Vec<f64>, GeometryError> {
    let n = x.len();
    let m = n + 2;

    let mut sub = vec![0.0; m];
    let mut diag = vec![0.0; m];
    let mut sup = vec![0.0; m];
    let mut rhs = vec![0.0; m];

    // interpolation at the clamped ends
    diag[0] = 1.0;
    rhs[0] = f[0];
    diag[m - 1] = 1.0;
    rhs[m - 1] = f[n - 1];

    // Hermite end conditions
    sub[1] = basis::eval_derivative(knots, 3, 0, x[0], 1);
    diag[1] = basis::eval_derivative(knots, 3, 1, x[0], 1);
    rhs[1] = end_derivative(x, f, true);

    diag[m - 2] = basis::eval_derivative(knots, 3, m - 2, x[n - 1], 1);
    sup[m - 2] = basis::eval_derivative(knots, 3, m - 1, x[n - 1], 1);
    rhs[m - 2] = end_derivative(x, f, false);

    // interpolation at the interior break points
    for r in 2..m - 2 {
        let xi = x[r - 1];
        sub[r] = basis::eval(knots, 3, r - 1, xi);
        diag[r] = basis::eval(knots, 3, r, xi);
        sup[r] = basis::eval(knots, 3, r + 1, xi);
        rhs[r] = f[r - 1];
    }

    solve_tridiagonal(&mut sub, &mut diag, &mut sup, &mut rhs)?;
    Ok(rhs)
}

/// End derivative from the parabola through the three outermost points, or
/// the secant when only two points exist.
fn end_derivative(x: &[f64], f: &[f64], lower: bool) -> f64 {
    let n = x.len();
    if n == 2 {
        return (f[1] - f[0]) / (x[1] - x[0]);
    }
    let (i0, i1, i2) = if lower { (0, 1, 2) } else { (n - 1, n - 2, n - 3) };
    let (x0, x1, x2) = (x[i0], x[i1], x[i2]);
    f[i0] * (2.0 * x0 - x1 - x2) / ((x0 - x1) * (x0 - x2))
        + f[i1] * (x0 - x2) / ((x1 - x0) * (x1 - x2))
        + f[i2] * (x0 - x1) / ((x2 - x0) * (x2 - x1))
}

fn solve_tridiagonal(
    sub: &mut [f64],
    diag: &mut [f64],
    sup: &mut [f64],
    rhs: &mut [f64],
) -> Result<(), GeometryError> {
    let m = diag.len();
    for r in 1..m {
        if diag[r - 1].abs() < 1e-14 {
            return Err(GeometryError::SingularSystem);
        }
        let w = sub[r] / diag[r - 1];
        diag[r] -= w * sup[r - 1];
        rhs[r] -= w * rhs[r - 1];
    }
    if diag[m - 1].abs() < 1e-14 {
        return Err(GeometryError::SingularSystem);
    }
    rhs[m - 1] /= diag[m - 1];
    for r in (0..m - 1).rev() {
        rhs[r] = (rhs[r] - sup[r] * rhs[r + 1]) / diag[r];
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cubic_interpolant_passes_through_all_support_points() {
        let x = vec![0.0, 0.7, 1.1, 2.0, 3.5, 4.0];
        let f = vec![1.0, -0.3, 0.8, 2.2, -1.0, 0.4];
        let spline = cubic_interp_1d(&x, &f).unwrap();
        for (xi, fi) in x.iter().zip(&f) {
            assert!(
                (spline.evaluate(*xi, 0) - fi).abs() < 1e-9,
                "mismatch at x = {xi}"
            );
        }
    }

    #[test]
    fn cubic_interpolation_of_two_points_is_the_secant_line() {
        let spline = cubic_interp_1d(&[0.0, 2.0], &[1.0, 5.0]).unwrap();
        assert!((spline.evaluate(1.0, 0) - 3.0).abs() < 1e-9);
        assert!((spline.evaluate(0.5, 0) - 2.0).abs() < 1e-9);
    }

    #[test]
    fn cubic_interpolation_reproduces_cubic_polynomials() {
        let x: Vec<f64> = (0..7).map(|i| i as f64 * 0.5).collect();
        let poly = |v: f64| 0.5 * v * v * v - v * v + 2.0;
        let f: Vec<f64> = x.iter().map(|&v| poly(v)).collect();
        let spline = cubic_interp_1d(&x, &f).unwrap();
        // cubic data with parabolic end derivatives is not reproduced exactly
        // near the ends, but interior accuracy must be high
        for &v in &[1.2, 1.6, 2.0] {
            assert!((spline.evaluate(v, 0) - poly(v)).abs() < 1e-2);
        }
    }

    #[test]
    fn rejects_degenerate_input() {
        assert!(matches!(
            cubic_interp_1d(&[1.0], &[1.0]),
            Err(GeometryError::TooFewPoints { .. })
        ));
        assert!(matches!(
            cubic_interp_1d(&[0.0, 1.0, 1.0], &[0.0, 1.0, 2.0]),
            Err(GeometryError::NonMonotonic { index: 2 })
        ));
        assert!(matches!(
            cubic_interp_1d(&[0.0, 1.0], &[f64::NAN, 1.0]),
            Err(GeometryError::NonFinite { index: 0 })
        ));
        assert!(matches!(
            cubic_interp_1d(&[0.0, 1.0, 2.0], &[0.0, 1.0]),
            Err(GeometryError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn linear_interpolant_is_piecewise_linear() {
        let spline = linear_interp_1d(&[0.0, 1.0, 2.0], &[0.0, 2.0, 0.0]).unwrap();
        assert!((spline.evaluate(0.5, 0) - 1.0).abs() < 1e-12);
        assert!((spline.evaluate(1.5, 0) - 1.0).abs() < 1e-12);
        assert!((spline.evaluate(1.0, 0) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn three_d_interpolant_passes_through_sample_points() {
        let t = vec![0.0, 1.0, 2.0, 3.0, 4.0];
        let points: Vec<Point3<f64>> = t
            .iter()
            .map(|&v: &f64| Point3::new(v.cos(), v.sin(), 0.5 * v))
            .collect();
        let curve = cubic_interp_3d(&t, &points).unwrap();
        for (ti, pi) in t.iter().zip(&points) {
            let q = curve.evaluate(*ti);
            assert!((q - pi).norm() < 1e-9, "mismatch at t = {ti}");
        }
    }
}
