//! Free-radius cost oracle over a spatial neighbor query.

use kiddo::{KdTree, SquaredEuclidean};
use nalgebra::Point3;

use crate::core::models::particle::Particle;

/// Answers "how large a sphere fits at q" against a fixed particle cloud.
///
/// The free radius at a probe position is `min_i(|q - x_i| - r_i)` over all
/// particles within the search radius `max_free_dist + max r_vdw + cutoff`
/// of q; every particle that could constrain a sphere of radius up to
/// `max_free_dist` lies inside that ball. An empty neighborhood caps the
/// answer at `max_free_dist`.
pub struct FreeRadiusOracle {
    tree: KdTree<f64, 3>,
    radii: Vec<f64>,
    max_free_dist: f64,
    search_radius: f64,
}

impl FreeRadiusOracle {
    pub fn new(particles: &[Particle], max_free_dist: f64, cutoff: Option<f64>) -> Self {
        let mut tree: KdTree<f64, 3> = KdTree::new();
        let mut radii = Vec::with_capacity(particles.len());
        let mut max_vdw: f64 = 0.0;
        for (i, particle) in particles.iter().enumerate() {
            let p = &particle.position;
            tree.add(&[p.x, p.y, p.z], i as u64);
            radii.push(particle.vdw_radius);
            max_vdw = max_vdw.max(particle.vdw_radius);
        }
        let search_radius = max_free_dist + max_vdw + cutoff.unwrap_or(0.0).max(0.0);
        Self {
            tree,
            radii,
            max_free_dist,
            search_radius,
        }
    }

    /// Free radius at `q`, the quantity the in-plane optimizer maximizes.
    pub fn free_radius(&self, q: &Point3<f64>) -> f64 {
        let neighbours = self
            .tree
            .within_unsorted::<SquaredEuclidean>(&[q.x, q.y, q.z], self.search_radius.powi(2));
        if neighbours.is_empty() {
            return self.max_free_dist;
        }
        neighbours
            .iter()
            .map(|nn| nn.distance.sqrt() - self.radii[nn.item as usize])
            .fold(f64::INFINITY, f64::min)
    }
}
