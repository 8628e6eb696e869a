//! Boltzmann inversion of density profiles.

/// Densities below this floor are clamped so empty regions produce large but
/// finite energies instead of non-finite values that JSON cannot carry.
const DENSITY_FLOOR: f64 = 1e-12;

/// Free-energy profile from a number-density profile by Boltzmann inversion,
/// `G(s) = -ln n(s)` in units of kT. The absolute offset is meaningless
/// until the aggregator anchors the profile at the pathway ends.
pub fn boltzmann_energies(densities: &[f64]) -> Vec<f64> {
    densities
        .iter()
        .map(|&d| -d.max(DENSITY_FLOOR).ln())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn density_ratio_maps_to_energy_difference() {
        let energies = boltzmann_energies(&[1.0, std::f64::consts::E]);
        assert!((energies[0] - 0.0).abs() < 1e-12);
        assert!((energies[1] + 1.0).abs() < 1e-12);
    }

    #[test]
    fn zero_density_gives_a_large_finite_barrier() {
        let energies = boltzmann_energies(&[0.0]);
        assert!(energies[0].is_finite());
        assert!(energies[0] > 20.0);
    }
}
