use crate::core::optim::annealing::AnnealingConfig;
use crate::core::optim::nelder_mead::NelderMeadConfig;
use nalgebra::{Point3, Vector3};

use super::error::EngineError;

/// Strategy used to locate the pathway through the particle cloud.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PathFindingMethod {
    /// Probe-sphere search with in-plane radius maximization.
    #[default]
    InplaneOptimized,
    /// Fixed-step cylinder along the channel direction, for debugging and as
    /// a trivial baseline.
    NaiveCylindrical,
}

/// How pathway coordinates are aligned across time steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PathAlignmentMethod {
    None,
    /// Re-origin the arc-length coordinate at the mapped initial probe
    /// position.
    #[default]
    InitialProbePosition,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PathFinderConfig {
    /// Probe displacement along the channel direction (nm).
    pub probe_step: f64,
    /// Free radius at which the probe has exited into bulk (nm).
    pub max_free_dist: f64,
    /// Maximum number of probe steps in either direction.
    pub max_probe_steps: usize,
    /// Optional extra margin on the neighbor-search radius (nm).
    pub cutoff: Option<f64>,
    /// Channel direction; normalized internally.
    pub channel_direction: Vector3<f64>,
}

impl Default for PathFinderConfig {
    fn default() -> Self {
        Self {
            probe_step: 0.025,
            max_free_dist: 1.0,
            max_probe_steps: 10_000,
            cutoff: None,
            channel_direction: Vector3::z(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MappingConfig {
    /// Termination width for the nearest-point refinement.
    pub map_tol: f64,
    /// How far mapped coordinates may extend beyond the pathway ends (nm).
    pub extrap_dist: f64,
    /// Grid spacing for minimum searches and surface sampling (nm).
    pub sample_step: f64,
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            map_tol: 1e-7,
            extrap_dist: 0.0,
            sample_step: 0.001,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DensityEstimationMethod {
    Histogram,
    #[default]
    Kernel,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DensityEstimationConfig {
    pub method: DensityEstimationMethod,
    /// Bin width (histogram) or evaluation-point spacing (kernel), in nm.
    pub resolution: f64,
    /// Kernel bandwidth; `None` selects the AMISE-optimal value per frame.
    pub band_width: Option<f64>,
    /// Scale factor applied to the (possibly estimated) bandwidth.
    pub band_width_scale: f64,
    /// Evaluation range padding in multiples of the bandwidth.
    pub eval_range_cutoff: f64,
}

impl Default for DensityEstimationConfig {
    fn default() -> Self {
        Self {
            method: DensityEstimationMethod::Kernel,
            resolution: 0.01,
            band_width: None,
            band_width_scale: 1.0,
            eval_range_cutoff: 5.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HydrophobicityProfileConfig {
    /// Bandwidth of the hydrophobicity kernel (nm).
    pub band_width: f64,
}

impl Default for HydrophobicityProfileConfig {
    fn default() -> Self {
        Self { band_width: 0.35 }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutputGridConfig {
    /// Number of support points of the common aggregation grid.
    pub num_points: usize,
    /// Extrapolation distance added on both sides of the observed arc-length
    /// range (nm).
    pub extrap_dist: f64,
}

impl Default for OutputGridConfig {
    fn default() -> Self {
        Self {
            num_points: 1000,
            extrap_dist: 0.0,
        }
    }
}

/// Complete analysis configuration, constructed once from the CLI and passed
/// by reference through the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    pub path_finding_method: PathFindingMethod,
    pub path_alignment_method: PathAlignmentMethod,
    pub path_finder: PathFinderConfig,
    pub annealing: AnnealingConfig,
    pub nelder_mead: NelderMeadConfig,
    pub mapping: MappingConfig,
    /// Margin for the pore-lining containment test (nm).
    pub pore_mapping_margin: f64,
    /// Margin for the solvent containment test (nm).
    pub solvent_mapping_margin: f64,
    /// Explicit initial probe position; otherwise the mass-weighted centroid
    /// of the seed selection is used.
    pub init_probe_pos: Option<Point3<f64>>,
    pub density: DensityEstimationConfig,
    pub hydrophobicity_profile: HydrophobicityProfileConfig,
    pub output_grid: OutputGridConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            path_finding_method: PathFindingMethod::default(),
            path_alignment_method: PathAlignmentMethod::default(),
            path_finder: PathFinderConfig::default(),
            annealing: AnnealingConfig::default(),
            nelder_mead: NelderMeadConfig::default(),
            mapping: MappingConfig::default(),
            pore_mapping_margin: 0.75,
            solvent_mapping_margin: 0.0,
            init_probe_pos: None,
            density: DensityEstimationConfig::default(),
            hydrophobicity_profile: HydrophobicityProfileConfig::default(),
            output_grid: OutputGridConfig::default(),
        }
    }
}

impl AnalysisConfig {
    /// Validates all positive-real and range constraints. Violations are
    /// fatal before any frame work starts.
    pub fn validate(&self) -> Result<(), EngineError> {
        let positive: [(&'static str, f64); 6] = [
            ("pf-probe-step", self.path_finder.probe_step),
            ("pf-max-free-dist", self.path_finder.max_free_dist),
            ("pm-tol", self.mapping.map_tol),
            ("pm-sample-step", self.mapping.sample_step),
            ("de-res", self.density.resolution),
            ("hydrophob-bandwidth", self.hydrophobicity_profile.band_width),
        ];
        for (option, value) in positive {
            if value <= 0.0 || !value.is_finite() {
                return Err(EngineError::Config {
                    option,
                    message: format!("must be a positive real, got {value}"),
                });
            }
        }

        if self.mapping.extrap_dist < 0.0 || !self.mapping.extrap_dist.is_finite() {
            return Err(EngineError::Config {
                option: "pm-extrap-dist",
                message: format!("may not be negative, got {}", self.mapping.extrap_dist),
            });
        }

        if self.path_finder.max_probe_steps == 0 {
            return Err(EngineError::Config {
                option: "pf-max-probe-steps",
                message: "must be at least one".to_string(),
            });
        }

        let gamma = self.annealing.cooling_factor;
        if !(0.0 < gamma && gamma < 1.0) {
            return Err(EngineError::Config {
                option: "sa-cooling-fac",
                message: format!("must lie in (0, 1), got {gamma}"),
            });
        }

        if self.path_finder.channel_direction.norm() == 0.0 {
            return Err(EngineError::Config {
                option: "pf-chan-dir-vec",
                message: "must not be the zero vector".to_string(),
            });
        }

        if let Some(bw) = self.density.band_width {
            if !bw.is_finite() {
                return Err(EngineError::Config {
                    option: "de-bandwidth",
                    message: format!("must be finite, got {bw}"),
                });
            }
        }

        if self.output_grid.num_points < 2 {
            return Err(EngineError::Config {
                option: "out-num-points",
                message: "need at least two support points".to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_configuration_is_valid() {
        assert!(AnalysisConfig::default().validate().is_ok());
    }

    #[test]
    fn non_positive_tolerance_is_rejected() {
        let mut config = AnalysisConfig::default();
        config.mapping.map_tol = 0.0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("pm-tol"));
    }

    #[test]
    fn negative_extrapolation_distance_is_rejected() {
        let mut config = AnalysisConfig::default();
        config.mapping.extrap_dist = -0.1;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("pm-extrap-dist"));
    }

    #[test]
    fn cooling_factor_outside_unit_interval_is_rejected() {
        let mut config = AnalysisConfig::default();
        config.annealing.cooling_factor = 1.0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("sa-cooling-fac"));
    }

    #[test]
    fn zero_channel_direction_is_rejected() {
        let mut config = AnalysisConfig::default();
        config.path_finder.channel_direction = Vector3::zeros();
        assert!(config.validate().is_err());
    }
}
