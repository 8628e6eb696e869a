//! The molecular pathway model.

pub mod mapping;

use nalgebra::{Point3, Vector3};

use super::error::EngineError;
use super::pathfinding::ProbeSample;
use crate::core::geometry::interp;
use crate::core::geometry::spline1d::SplineCurve1D;
use crate::core::geometry::spline3d::SplineCurve3D;

/// Quadrature tolerance for arc-length integration.
const ARC_LENGTH_TOL: f64 = 1e-6;

/// A molecular pathway: an arc-length parameterized centre line paired with
/// a radius profile over the shared parameter interval.
///
/// Built from the ordered probe samples of a path finder. The centre line
/// interpolates the sample centres and is reparameterized so that the curve
/// parameter is arc length to within the quadrature tolerance; the radius
/// spline interpolates the sample radii at the same parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct MolecularPath {
    centre_line: SplineCurve3D,
    pore_radius: SplineCurve1D,
    points: Vec<Point3<f64>>,
    radii: Vec<f64>,
    sample_s: Vec<f64>,
}

impl MolecularPath {
    /// Builds the path model from probe samples.
    ///
    /// Rejects sequences with fewer than four samples, non-finite
    /// coordinates, or repeated centres (which would make the chord-length
    /// parameter non-monotone).
    pub fn new(samples: &[ProbeSample]) -> Result<Self, EngineError> {
        if samples.len() < 4 {
            return Err(EngineError::DegenerateSamples {
                reason: format!("need at least 4 probe samples, got {}", samples.len()),
            });
        }
        for (i, sample) in samples.iter().enumerate() {
            let p = &sample.centre;
            if !(p.x.is_finite() && p.y.is_finite() && p.z.is_finite() && sample.radius.is_finite())
            {
                return Err(EngineError::DegenerateSamples {
                    reason: format!("non-finite coordinate or radius at sample {i}"),
                });
            }
        }

        let points: Vec<Point3<f64>> = samples.iter().map(|p| p.centre).collect();
        let radii: Vec<f64> = samples.iter().map(|p| p.radius).collect();

        // chord-length parameter
        let mut chord = Vec::with_capacity(points.len());
        let mut acc = 0.0;
        chord.push(0.0);
        for pair in points.windows(2) {
            let step = (pair[1] - pair[0]).norm();
            if step <= 0.0 {
                return Err(EngineError::DegenerateSamples {
                    reason: "repeated probe centres give a non-monotone parameter".to_string(),
                });
            }
            acc += step;
            chord.push(acc);
        }

        // arc-length reparameterization: measure the chord-parameterized
        // interpolant, then re-interpolate the same points at their arc
        // lengths
        let chord_curve = interp::cubic_interp_3d(&chord, &points)?;
        let sample_s = chord_curve.arc_length_at_knots(ARC_LENGTH_TOL);
        for pair in sample_s.windows(2) {
            if pair[1] <= pair[0] {
                return Err(EngineError::DegenerateSamples {
                    reason: "arc-length parameter is non-monotone".to_string(),
                });
            }
        }

        let centre_line = interp::cubic_interp_3d(&sample_s, &points)?;
        let pore_radius = interp::cubic_interp_1d(&sample_s, &radii)?;

        Ok(Self {
            centre_line,
            pore_radius,
            points,
            radii,
            sample_s,
        })
    }

    /// Rebuilds a path from serialized spline descriptors (unique knots and
    /// the spline values at them), as stored in the per-frame stream.
    pub fn from_spline_data(
        radius_knots: &[f64],
        radius_values: &[f64],
        centre_knots: &[f64],
        centre_points: &[Point3<f64>],
    ) -> Result<Self, EngineError> {
        let centre_line = interp::cubic_interp_3d(centre_knots, centre_points)?;
        let pore_radius = interp::cubic_interp_1d(radius_knots, radius_values)?;
        Ok(Self {
            centre_line,
            pore_radius,
            points: centre_points.to_vec(),
            radii: radius_values.to_vec(),
            sample_s: centre_knots.to_vec(),
        })
    }

    /// Original sample centres, unchanged.
    pub fn path_points(&self) -> &[Point3<f64>] {
        &self.points
    }

    /// Original sample radii, unchanged.
    pub fn path_radii(&self) -> &[f64] {
        &self.radii
    }

    pub fn s_lo(&self) -> f64 {
        self.centre_line.domain_lo()
    }

    pub fn s_hi(&self) -> f64 {
        self.centre_line.domain_hi()
    }

    /// Pathway length along the centre line.
    pub fn length(&self) -> f64 {
        self.s_hi() - self.s_lo()
    }

    /// Local pore radius, extrapolated linearly outside the pathway.
    pub fn radius(&self, s: f64) -> f64 {
        self.pore_radius.evaluate(s, 0)
    }

    pub fn sample_radii(&self, support: &[f64]) -> Vec<f64> {
        self.pore_radius.evaluate_multiple(support, 0)
    }

    /// Centre-line point at arc position `s`.
    pub fn centre(&self, s: f64) -> Point3<f64> {
        self.centre_line.evaluate(s)
    }

    pub fn centre_line(&self) -> &SplineCurve3D {
        &self.centre_line
    }

    pub fn pore_radius_spline(&self) -> &SplineCurve1D {
        &self.pore_radius
    }

    pub fn pore_radius_unique_knots(&self) -> Vec<f64> {
        self.pore_radius.unique_knots()
    }

    pub fn pore_radius_knot_values(&self) -> Vec<f64> {
        self.pore_radius.knot_values()
    }

    pub fn centre_line_unique_knots(&self) -> Vec<f64> {
        self.centre_line.unique_knots()
    }

    pub fn centre_line_knot_points(&self) -> Vec<Point3<f64>> {
        self.centre_line.knot_points()
    }

    /// Pore volume, the integral of `pi R(s)^2` over the pathway, by
    /// composite Simpson quadrature on the unique knot intervals.
    pub fn volume(&self) -> f64 {
        let area = |s: f64| {
            let r = self.radius(s);
            std::f64::consts::PI * r * r
        };
        let knots = self.pore_radius.unique_knots();
        let mut volume = 0.0;
        for pair in knots.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            let m = 0.5 * (a + b);
            volume += (b - a) / 6.0 * (area(a) + 4.0 * area(m) + area(b));
        }
        volume
    }

    /// Minimum pore radius over the pathway: a dense evaluation with the
    /// given spacing, refined locally. Returns `(argmin, min)`.
    pub fn min_radius(&self, sample_step: f64) -> (f64, f64) {
        self.pore_radius
            .minimum((self.s_lo(), self.s_hi()), sample_step)
    }

    /// Translates the centre line (control points and original samples) by a
    /// constant offset.
    pub fn shift(&mut self, offset: &Vector3<f64>) {
        self.centre_line.shift(offset);
        for p in &mut self.points {
            *p += offset;
        }
    }

    /// Re-origins the arc-length coordinate so that the position `s0` maps
    /// to zero; used to align pathway profiles across frames by the mapped
    /// initial probe position.
    pub fn align_arc_origin(&mut self, s0: f64) {
        self.centre_line.shift_parameter(-s0);
        self.pore_radius.shift_parameter(-s0);
        for s in &mut self.sample_s {
            *s -= s0;
        }
    }
}
