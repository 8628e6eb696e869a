//! Curvilinear coordinate mapping of external particles onto the pathway.

use nalgebra::Point3;
use std::collections::BTreeMap;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::MolecularPath;
use crate::core::optim::golden_section_minimize;
use crate::engine::config::MappingConfig;

/// Position of an external point relative to the pathway.
///
/// `s` is the arc-length parameter of the nearest centre-line point, `rho_sq`
/// the squared radial distance from the centre line (kept squared so
/// containment tests need no square root), and `phi` the signed azimuth of
/// the offset vector in the local tangent/normal/binormal frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurvilinearCoord {
    pub s: f64,
    pub rho_sq: f64,
    pub phi: f64,
}

impl MolecularPath {
    /// Maps a single point onto the pathway.
    ///
    /// The nearest probe sample brackets a golden-section refinement of
    /// `min_s |p - C(s)|^2`; at the pathway ends the bracket extends
    /// `extrap_dist` beyond the domain, where the centre line continues
    /// linearly.
    pub fn map_position(&self, p: &Point3<f64>, config: &MappingConfig) -> CurvilinearCoord {
        let nearest = self
            .points
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                let da = (p - *a).norm_squared();
                let db = (p - *b).norm_squared();
                da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|(i, _)| i)
            .expect("a valid path has at least four samples");

        let lo = if nearest == 0 {
            self.sample_s[0] - config.extrap_dist
        } else {
            self.sample_s[nearest - 1]
        };
        let hi = if nearest == self.sample_s.len() - 1 {
            self.sample_s[nearest] + config.extrap_dist
        } else {
            self.sample_s[nearest + 1]
        };

        let (s, rho_sq) = golden_section_minimize(
            |s| (p - self.centre_line.evaluate(s)).norm_squared(),
            lo,
            hi,
            config.map_tol,
        );

        let (_, normal, binormal) = self.centre_line.frame(s);
        let offset = p - self.centre_line.evaluate(s);
        let phi = offset.dot(&binormal).atan2(offset.dot(&normal));

        CurvilinearCoord { s, rho_sq, phi }
    }

    /// Maps a batch of points onto the pathway.
    pub fn map_positions(
        &self,
        points: &[Point3<f64>],
        config: &MappingConfig,
    ) -> Vec<CurvilinearCoord> {
        #[cfg(feature = "parallel")]
        {
            points
                .par_iter()
                .map(|p| self.map_position(p, config))
                .collect()
        }
        #[cfg(not(feature = "parallel"))]
        {
            points
                .iter()
                .map(|p| self.map_position(p, config))
                .collect()
        }
    }

    /// Maps per-residue representative positions onto the pathway, keyed by
    /// residue id. Residues whose mapped arc position falls further than
    /// `extrap_dist` beyond the pathway ends are omitted; such points show
    /// up as refinements pinned against the extended search bracket.
    pub fn map_selection(
        &self,
        positions: &BTreeMap<i64, Point3<f64>>,
        config: &MappingConfig,
    ) -> BTreeMap<i64, CurvilinearCoord> {
        let edge = 2.0 * config.map_tol;
        let lo = self.s_lo() - config.extrap_dist + edge;
        let hi = self.s_hi() + config.extrap_dist - edge;
        positions
            .iter()
            .map(|(&res_id, p)| (res_id, self.map_position(p, config)))
            .filter(|(_, coord)| coord.s > lo && coord.s < hi)
            .collect()
    }

    /// Containment test for mapped coordinates: a point at arc position `s`
    /// is inside iff `s` lies within `bounds` (the pathway extended by
    /// `extrap_dist` when unspecified) and its radial distance does not
    /// exceed the local pore radius plus `margin`.
    pub fn check_if_inside(
        &self,
        mapped: &BTreeMap<i64, CurvilinearCoord>,
        margin: f64,
        bounds: Option<(f64, f64)>,
        config: &MappingConfig,
    ) -> BTreeMap<i64, bool> {
        let (lo, hi) = bounds.unwrap_or((
            self.s_lo() - config.extrap_dist,
            self.s_hi() + config.extrap_dist,
        ));
        mapped
            .iter()
            .map(|(&res_id, coord)| {
                let allowed = self.radius(coord.s) + margin;
                let inside =
                    coord.s >= lo && coord.s <= hi && coord.rho_sq <= allowed * allowed;
                (res_id, inside)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::straight_path;
    use super::*;

    fn mapping_config() -> MappingConfig {
        MappingConfig {
            map_tol: 1e-9,
            extrap_dist: 1.0,
            sample_step: 0.01,
        }
    }

    #[test]
    fn point_beside_a_straight_path_maps_to_its_foot_point() {
        let path = straight_path();
        let coord = path.map_position(&Point3::new(0.5, 0.3, 0.0), &mapping_config());
        assert!((coord.s - 0.5).abs() < 1e-5);
        assert!((coord.rho_sq - 0.09).abs() < 1e-6);
        assert!((path.radius(coord.s) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn mapped_point_inside_for_any_nonnegative_margin() {
        let path = straight_path();
        let config = mapping_config();
        let mut mapped = BTreeMap::new();
        mapped.insert(1, path.map_position(&Point3::new(0.5, 0.3, 0.0), &config));
        for margin in [0.0, 0.1, 2.0] {
            let inside = path.check_if_inside(&mapped, margin, None, &config);
            assert!(inside[&1], "not inside at margin {margin}");
        }
    }

    #[test]
    fn growing_margin_never_expels_an_inside_point() {
        let path = straight_path();
        let config = mapping_config();
        let mut mapped = BTreeMap::new();
        // a ring of points at varying radial distances
        for (i, rho) in [0.5, 0.9, 1.1, 1.6, 3.0].iter().enumerate() {
            mapped.insert(
                i as i64,
                path.map_position(&Point3::new(4.0, *rho, 0.0), &config),
            );
        }
        let mut previous: Option<BTreeMap<i64, bool>> = None;
        for margin in [0.0, 0.25, 0.5, 1.0, 2.5] {
            let inside = path.check_if_inside(&mapped, margin, None, &config);
            if let Some(prev) = &previous {
                for (res_id, was_inside) in prev {
                    assert!(
                        !was_inside || inside[res_id],
                        "margin increase expelled residue {res_id}"
                    );
                }
            }
            previous = Some(inside);
        }
    }

    #[test]
    fn explicit_bounds_restrict_containment_along_the_axis() {
        let path = straight_path();
        let config = mapping_config();
        let mut mapped = BTreeMap::new();
        mapped.insert(1, path.map_position(&Point3::new(8.5, 0.0, 0.0), &config));
        let inside_all = path.check_if_inside(&mapped, 0.0, None, &config);
        assert!(inside_all[&1]);
        let inside_window = path.check_if_inside(&mapped, 0.0, Some((0.0, 5.0)), &config);
        assert!(!inside_window[&1]);
    }

    #[test]
    fn points_beyond_the_ends_map_into_the_extrapolated_region() {
        let path = straight_path();
        let config = mapping_config();
        let coord = path.map_position(&Point3::new(-0.4, 0.1, 0.0), &config);
        assert!(coord.s < 0.0 && coord.s > -0.5);
        assert!((coord.rho_sq - 0.01).abs() < 1e-6);
    }

    #[test]
    fn map_selection_omits_residues_beyond_the_extrapolation_distance() {
        let path = straight_path();
        let config = MappingConfig {
            map_tol: 1e-9,
            extrap_dist: 0.5,
            sample_step: 0.01,
        };
        let mut positions = BTreeMap::new();
        positions.insert(1, Point3::new(4.0, 0.4, 0.0)); // well inside
        positions.insert(2, Point3::new(12.0, 0.0, 0.0)); // far past the end
        let mapped = path.map_selection(&positions, &config);
        assert!(mapped.contains_key(&1));
        assert!(!mapped.contains_key(&2));
    }

    #[test]
    fn azimuth_distinguishes_the_four_quadrants() {
        let path = straight_path();
        let config = mapping_config();
        let a = path.map_position(&Point3::new(4.0, 0.3, 0.0), &config);
        let b = path.map_position(&Point3::new(4.0, -0.3, 0.0), &config);
        let c = path.map_position(&Point3::new(4.0, 0.0, 0.3), &config);
        // opposite sides differ by pi in azimuth, orthogonal sides by pi/2
        assert!(((a.phi - b.phi).abs() - std::f64::consts::PI).abs() < 1e-6);
        assert!(((a.phi - c.phi).abs() - std::f64::consts::FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn batch_mapping_matches_single_point_mapping() {
        let path = straight_path();
        let config = mapping_config();
        let points = vec![
            Point3::new(1.0, 0.2, 0.0),
            Point3::new(5.5, -0.4, 0.3),
            Point3::new(8.0, 0.0, 0.9),
        ];
        let batch = path.map_positions(&points, &config);
        for (p, coord) in points.iter().zip(&batch) {
            let single = path.map_position(p, &config);
            assert_eq!(*coord, single);
        }
    }
}
