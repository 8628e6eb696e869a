//! B-spline basis functions over arbitrary knot vectors.
//!
//! Evaluation uses the Cox–de Boor recurrence; derivatives use the standard
//! knot-difference identity. Knot vectors must be non-decreasing. The last
//! non-empty knot interval is treated as closed so that evaluation at the
//! upper end of the support returns the clamped end value rather than zero.

/// Evaluates the `i`-th B-spline basis function of the given degree at `x`.
///
/// # Arguments
///
/// * `knots` - The full (padded) non-decreasing knot vector.
/// * `degree` - The polynomial degree of the basis.
/// * `i` - The index of the basis function, `0 <= i < knots.len() - degree - 1`.
/// * `x` - The evaluation point.
///
/// # Return
///
/// Returns the basis function value; zero outside the support of the basis
/// function.
pub fn eval(knots: &[f64], degree: usize, i: usize, x: f64) -> f64 {
    if degree == 0 {
        let hi = knots[i + 1];
        if knots[i] <= x && x < hi {
            return 1.0;
        }
        // close the last non-empty interval at the right end of the support
        let last = *knots.last().unwrap();
        if x == last && hi == last && knots[i] < hi {
            return 1.0;
        }
        return 0.0;
    }

    let mut value = 0.0;
    let d_lo = knots[i + degree] - knots[i];
    if d_lo > 0.0 {
        value += (x - knots[i]) / d_lo * eval(knots, degree - 1, i, x);
    }
    let d_hi = knots[i + degree + 1] - knots[i + 1];
    if d_hi > 0.0 {
        value += (knots[i + degree + 1] - x) / d_hi * eval(knots, degree - 1, i + 1, x);
    }
    value
}

/// Evaluates a derivative of the `i`-th B-spline basis function at `x`.
///
/// Uses the recurrence
/// dB(i,k) = k * ( B(i,k-1)/(t(i+k) - t(i)) - B(i+1,k-1)/(t(i+k+1) - t(i+1)) ),
/// applied `order` times; terms with a vanishing knot difference drop out.
pub fn eval_derivative(knots: &[f64], degree: usize, i: usize, x: f64, order: usize) -> f64 {
    if order == 0 {
        return eval(knots, degree, i, x);
    }
    if degree == 0 {
        return 0.0;
    }

    let mut value = 0.0;
    let d_lo = knots[i + degree] - knots[i];
    if d_lo > 0.0 {
        value += eval_derivative(knots, degree - 1, i, x, order - 1) / d_lo;
    }
    let d_hi = knots[i + degree + 1] - knots[i + 1];
    if d_hi > 0.0 {
        value -= eval_derivative(knots, degree - 1, i + 1, x, order - 1) / d_hi;
    }
    degree as f64 * value
}

/// Builds a clamped knot vector of the given degree from strictly increasing
/// break points: the first and last break point are repeated `degree`
/// additional times.
pub fn clamped_knots(breaks: &[f64], degree: usize) -> Vec<f64> {
    let mut knots = Vec::with_capacity(breaks.len() + 2 * degree);
    for _ in 0..degree {
        knots.push(breaks[0]);
    }
    knots.extend_from_slice(breaks);
    for _ in 0..degree {
        knots.push(*breaks.last().unwrap());
    }
    knots
}

#[cfg(test)]
mod tests {
    use super::*;

    // knot layout from the classic worked B-spline example; evaluation
    // points probe values at and between the original knots
    fn break_points() -> Vec<f64> {
        vec![-4.0, -0.5, 0.0, 0.5, 4.0]
    }

    fn eval_points() -> Vec<f64> {
        vec![-4.0, -2.5, 0.0, 0.5, -1.0, std::f64::consts::SQRT_2, 4.0]
    }

    #[test]
    fn basis_forms_partition_of_unity_up_to_degree_five() {
        let breaks = break_points();
        for degree in 0..=5 {
            let knots = clamped_knots(&breaks, degree);
            let n_basis = breaks.len() + degree - 1;
            for &x in &eval_points() {
                let unity: f64 = (0..n_basis).map(|i| eval(&knots, degree, i, x)).sum();
                assert!(
                    (unity - 1.0).abs() <= 2.0 * f64::EPSILON,
                    "degree {degree}, x = {x}: sum = {unity}"
                );
            }
        }
    }

    #[test]
    fn basis_is_one_at_clamped_ends() {
        let knots = clamped_knots(&break_points(), 3);
        assert_eq!(eval(&knots, 3, 0, -4.0), 1.0);
        assert_eq!(eval(&knots, 3, 6, 4.0), 1.0);
    }

    #[test]
    fn basis_vanishes_outside_support() {
        let knots = clamped_knots(&break_points(), 3);
        assert_eq!(eval(&knots, 3, 0, 1.0), 0.0);
        assert_eq!(eval(&knots, 3, 6, -4.0), 0.0);
    }

    #[test]
    fn analytic_derivative_matches_central_difference() {
        let breaks = break_points();
        let degree = 3;
        let knots = clamped_knots(&breaks, degree);
        let n_basis = breaks.len() + degree - 1;
        let h = 1e-6;

        // probe strictly inside the support so the one-sided jumps at the
        // clamped ends do not pollute the central difference
        for &x in &[-3.1, -1.0, -0.25, 0.3, 1.7, 3.2] {
            for i in 0..n_basis {
                let analytic = eval_derivative(&knots, degree, i, x, 1);
                let numeric = (eval(&knots, degree, i, x + h) - eval(&knots, degree, i, x - h))
                    / (2.0 * h);
                assert!(
                    (analytic - numeric).abs() < 1e-8,
                    "basis {i} at x = {x}: analytic {analytic} vs numeric {numeric}"
                );
            }
        }
    }

    #[test]
    fn second_derivative_of_cubic_is_piecewise_linear() {
        let knots = clamped_knots(&[0.0, 1.0, 2.0, 3.0], 3);
        // second derivative of a cubic basis function is linear on each
        // interval, so the midpoint equals the mean of nearby values
        let a = eval_derivative(&knots, 3, 2, 1.25, 2);
        let b = eval_derivative(&knots, 3, 2, 1.75, 2);
        let mid = eval_derivative(&knots, 3, 2, 1.5, 2);
        assert!((mid - 0.5 * (a + b)).abs() < 1e-9);
    }
}
