//! Translation of CLI arguments into the engine configuration.

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use nalgebra::{Point3, Vector3};
use tracing::info;

use permeon::core::db::hydrophobicity::{HydrophobicityDatabase, HydrophobicityScale};
use permeon::core::db::radii::{VdwRadiusDatabase, VdwRadiusProvider};
use permeon::core::optim::annealing::AnnealingConfig;
use permeon::core::optim::nelder_mead::NelderMeadConfig;
use permeon::engine::config::{
    AnalysisConfig, DensityEstimationConfig, DensityEstimationMethod, HydrophobicityProfileConfig,
    MappingConfig, OutputGridConfig, PathAlignmentMethod, PathFinderConfig, PathFindingMethod,
};

use crate::cli::{
    AnalyzeArgs, DensityMethodArg, HydrophobicityDatabaseArg, PathAlignmentMethodArg,
    PathFindingMethodArg, VdwRadiusDatabaseArg,
};
use crate::error::{CliError, Result};

/// Everything the workflow needs, resolved and validated from the CLI.
#[derive(Debug)]
pub struct RunInputs {
    pub config: AnalysisConfig,
    pub radius_provider: VdwRadiusProvider,
    pub hydrophobicity: HydrophobicityScale,
    pub topology_path: PathBuf,
    pub trajectory_path: PathBuf,
    pub pathway_group: String,
    pub solvent_group: Option<String>,
    pub ipp_group: Option<String>,
    pub out_basename: PathBuf,
}

pub fn build_run_inputs(args: &AnalyzeArgs) -> Result<RunInputs> {
    let config = build_analysis_config(args)?;
    config.validate()?;

    let radius_provider = build_radius_provider(args)?;
    let hydrophobicity = build_hydrophobicity_scale(args)?;

    Ok(RunInputs {
        config,
        radius_provider,
        hydrophobicity,
        topology_path: args.topology.clone(),
        trajectory_path: args.trajectory.clone(),
        pathway_group: args.sel_pathway.clone(),
        solvent_group: args.sel_solvent.clone(),
        ipp_group: args.pf_sel_ipp.clone(),
        out_basename: args.out_filename.clone(),
    })
}

fn build_analysis_config(args: &AnalyzeArgs) -> Result<AnalysisConfig> {
    let channel_direction = match &args.pf_chan_dir_vec {
        Some(v) => Vector3::new(v[0], v[1], v[2]),
        None => Vector3::z(),
    };
    let init_probe_pos = args
        .pf_init_probe_pos
        .as_ref()
        .map(|v| Point3::new(v[0], v[1], v[2]));

    let seed = match args.sa_seed {
        Some(seed) => seed,
        None => {
            let seed = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.subsec_nanos() as u64 ^ d.as_secs())
                .unwrap_or(0);
            info!(seed, "No annealing seed given, using a clock-derived seed");
            seed
        }
    };

    Ok(AnalysisConfig {
        path_finding_method: match args.pf_method {
            PathFindingMethodArg::InplaneOptim => PathFindingMethod::InplaneOptimized,
            PathFindingMethodArg::NaiveCylindrical => PathFindingMethod::NaiveCylindrical,
        },
        path_alignment_method: match args.pf_align_method {
            PathAlignmentMethodArg::None => PathAlignmentMethod::None,
            PathAlignmentMethodArg::Ipp => PathAlignmentMethod::InitialProbePosition,
        },
        path_finder: PathFinderConfig {
            probe_step: args.pf_probe_step,
            max_free_dist: args.pf_max_free_dist,
            max_probe_steps: args.pf_max_probe_steps,
            cutoff: args.pf_cutoff.filter(|&c| c > 0.0),
            channel_direction,
        },
        annealing: AnnealingConfig {
            seed,
            max_iter: args.sa_max_iter,
            init_temp: args.sa_init_temp,
            cooling_factor: args.sa_cooling_fac,
            step_length_factor: args.sa_step,
        },
        nelder_mead: NelderMeadConfig {
            max_iter: args.nm_max_iter,
            init_shift: args.nm_init_shift,
        },
        mapping: MappingConfig {
            map_tol: args.pm_tol,
            extrap_dist: args.pm_extrap_dist,
            sample_step: args.pm_sample_step,
        },
        pore_mapping_margin: args.pm_pl_margin,
        solvent_mapping_margin: 0.0,
        init_probe_pos,
        density: DensityEstimationConfig {
            method: match args.de_method {
                DensityMethodArg::Histogram => DensityEstimationMethod::Histogram,
                DensityMethodArg::Kernel => DensityEstimationMethod::Kernel,
            },
            resolution: args.de_res,
            band_width: (args.de_bandwidth > 0.0).then_some(args.de_bandwidth),
            band_width_scale: args.de_bw_scale,
            eval_range_cutoff: args.de_eval_cutoff,
        },
        hydrophobicity_profile: HydrophobicityProfileConfig {
            band_width: args.hydrophob_bandwidth,
        },
        output_grid: OutputGridConfig {
            num_points: args.out_num_points,
            extrap_dist: args.out_extrap_dist,
        },
    })
}

fn build_radius_provider(args: &AnalyzeArgs) -> Result<VdwRadiusProvider> {
    let mut provider = match args.pf_vdwr_database {
        VdwRadiusDatabaseArg::Simple => VdwRadiusProvider::from_builtin(VdwRadiusDatabase::Simple),
        VdwRadiusDatabaseArg::Bondi => VdwRadiusProvider::from_builtin(VdwRadiusDatabase::Bondi),
        VdwRadiusDatabaseArg::User => {
            let path = args.pf_vdwr_json.as_ref().ok_or_else(|| {
                CliError::Argument(
                    "pf-vdwr-database is 'user' but no database was given with pf-vdwr-json"
                        .to_string(),
                )
            })?;
            VdwRadiusProvider::from_json_file(path)?
        }
    };
    if args.pf_vdwr_fallback >= 0.0 {
        provider.set_fallback(args.pf_vdwr_fallback);
    }
    Ok(provider)
}

fn build_hydrophobicity_scale(args: &AnalyzeArgs) -> Result<HydrophobicityScale> {
    let mut scale = match args.hydrophob_database {
        HydrophobicityDatabaseArg::WimleyWhite1996 => {
            HydrophobicityScale::from_builtin(HydrophobicityDatabase::WimleyWhite1996)
        }
        HydrophobicityDatabaseArg::KyteDoolittle1982 => {
            HydrophobicityScale::from_builtin(HydrophobicityDatabase::KyteDoolittle1982)
        }
        HydrophobicityDatabaseArg::User => {
            let path = args.hydrophob_json.as_ref().ok_or_else(|| {
                CliError::Argument(
                    "hydrophob-database is 'user' but no scale was given with hydrophob-json"
                        .to_string(),
                )
            })?;
            HydrophobicityScale::from_json_file(path)?
        }
    };
    if let Some(fallback) = args.hydrophob_fallback {
        scale.set_fallback(fallback);
    }
    Ok(scale)
}
