use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

const ABOUT: &str = "permeon - annotation of ion-permeation pathways in molecular dynamics trajectories of channel proteins.";
const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "The permeon developers",
    version,
    about = ABOUT,
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze the permeation pathway of a channel protein over a trajectory.
    Analyze(AnalyzeArgs),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum PathFindingMethodArg {
    /// Probe-sphere search with in-plane radius optimization.
    #[value(name = "inplane_optim")]
    InplaneOptim,
    /// Fixed cylinder along the channel direction (debugging baseline).
    #[value(name = "naive_cylindrical")]
    NaiveCylindrical,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum PathAlignmentMethodArg {
    /// No alignment across frames.
    #[value(name = "none")]
    None,
    /// Re-origin arc length at the mapped initial probe position.
    #[value(name = "ipp")]
    Ipp,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum VdwRadiusDatabaseArg {
    /// Built-in element radii in the tradition of pore-profiling tools.
    #[value(name = "simple")]
    Simple,
    /// Bondi (1964) element radii.
    #[value(name = "bondi")]
    Bondi,
    /// User-supplied JSON database (requires --pf-vdwr-json).
    #[value(name = "user")]
    User,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum HydrophobicityDatabaseArg {
    /// Wimley & White (1996) interface scale.
    #[value(name = "wimley_white_1996")]
    WimleyWhite1996,
    /// Kyte & Doolittle (1982) hydropathy scale.
    #[value(name = "kyte_doolittle_1982")]
    KyteDoolittle1982,
    /// User-supplied JSON scale (requires --hydrophob-json).
    #[value(name = "user")]
    User,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum DensityMethodArg {
    #[value(name = "histogram")]
    Histogram,
    #[value(name = "kernel")]
    Kernel,
}

/// Arguments for the `analyze` subcommand.
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    // --- Input ---
    /// Topology file (JSON): atom table plus named index groups.
    #[arg(short = 't', long, required = true, value_name = "PATH")]
    pub topology: PathBuf,

    /// Trajectory file (JSON Lines): one frame of positions per line.
    #[arg(short = 'f', long, required = true, value_name = "PATH")]
    pub trajectory: PathBuf,

    /// Index group that defines the permeation pathway (usually the protein).
    #[arg(long, default_value = "pathway", value_name = "GROUP")]
    pub sel_pathway: String,

    /// Index group of small particles to compute the density of (usually water).
    #[arg(long, value_name = "GROUP")]
    pub sel_solvent: Option<String>,

    // --- Output ---
    /// File name for output files without extension; proper extensions are
    /// added internally.
    #[arg(long, default_value = "output", value_name = "NAME")]
    pub out_filename: PathBuf,

    /// Number of support points of the aggregation grid.
    #[arg(long, default_value_t = 1000, value_name = "INT")]
    pub out_num_points: usize,

    /// Extrapolation distance added on both sides of the aggregation grid.
    #[arg(long, default_value_t = 0.0, value_name = "FLOAT")]
    pub out_extrap_dist: f64,

    // --- Path finding ---
    /// Path finding method.
    #[arg(long, value_enum, default_value = "inplane_optim")]
    pub pf_method: PathFindingMethodArg,

    /// Step length for probe movement (nm).
    #[arg(long, default_value_t = 0.025, value_name = "FLOAT")]
    pub pf_probe_step: f64,

    /// Maximum free distance terminating probe extension (nm).
    #[arg(long, default_value_t = 1.0, value_name = "FLOAT")]
    pub pf_max_free_dist: f64,

    /// Maximum number of probe steps in either direction.
    #[arg(long, default_value_t = 10_000, value_name = "INT")]
    pub pf_max_probe_steps: usize,

    /// Explicit initial probe position; overrides the selection-based seed.
    #[arg(long, num_args = 3, value_names = ["X", "Y", "Z"], allow_negative_numbers = true)]
    pub pf_init_probe_pos: Option<Vec<f64>>,

    /// Index group whose centre of mass seeds the probe; defaults to the
    /// pathway group.
    #[arg(long, value_name = "GROUP")]
    pub pf_sel_ipp: Option<String>,

    /// Channel direction vector; normalized internally.
    #[arg(long, num_args = 3, value_names = ["X", "Y", "Z"], allow_negative_numbers = true)]
    pub pf_chan_dir_vec: Option<Vec<f64>>,

    /// Extra margin on the neighbor-search cutoff; zero or less means none.
    #[arg(long, value_name = "FLOAT", allow_negative_numbers = true)]
    pub pf_cutoff: Option<f64>,

    /// Method for aligning pathway coordinates across time steps.
    #[arg(long, value_enum, default_value = "ipp")]
    pub pf_align_method: PathAlignmentMethodArg,

    /// Database of van-der-Waals radii used in pore finding.
    #[arg(long, value_enum, default_value = "simple")]
    pub pf_vdwr_database: VdwRadiusDatabaseArg,

    /// JSON file with user-defined van-der-Waals radii; ignored unless
    /// --pf-vdwr-database is 'user'.
    #[arg(long, value_name = "PATH")]
    pub pf_vdwr_json: Option<PathBuf>,

    /// Fallback van-der-Waals radius for atoms missing from the database.
    /// If negative, a missing radius is an error.
    #[arg(long, default_value_t = -1.0, value_name = "FLOAT", allow_negative_numbers = true)]
    pub pf_vdwr_fallback: f64,

    // --- Optimization ---
    /// Seed for the simulated-annealing PRNG; random if unset.
    #[arg(long, value_name = "INT")]
    pub sa_seed: Option<u64>,

    /// Number of cooling iterations per in-plane optimization.
    #[arg(long, default_value_t = 100, value_name = "INT")]
    pub sa_max_iter: usize,

    /// Simulated annealing initial temperature.
    #[arg(long, default_value_t = 0.1, value_name = "FLOAT")]
    pub sa_init_temp: f64,

    /// Simulated annealing cooling factor.
    #[arg(long, default_value_t = 0.98, value_name = "FLOAT")]
    pub sa_cooling_fac: f64,

    /// Step length factor used in candidate generation.
    #[arg(long, default_value_t = 0.001, value_name = "FLOAT")]
    pub sa_step: f64,

    /// Number of Nelder-Mead simplex iterations per in-plane optimization.
    #[arg(long, default_value_t = 100, value_name = "INT")]
    pub nm_max_iter: usize,

    /// Distance of vertices in the initial Nelder-Mead simplex.
    #[arg(long, default_value_t = 0.1, value_name = "FLOAT")]
    pub nm_init_shift: f64,

    // --- Path mapping ---
    /// Margin for determining pathway-lining residues.
    #[arg(long, default_value_t = 0.75, value_name = "FLOAT")]
    pub pm_pl_margin: f64,

    /// Termination tolerance of the nearest-point mapping.
    #[arg(long, default_value_t = 1e-7, value_name = "FLOAT")]
    pub pm_tol: f64,

    /// How far mapped coordinates may extend beyond the pathway ends.
    #[arg(long, default_value_t = 0.0, value_name = "FLOAT")]
    pub pm_extrap_dist: f64,

    /// Grid spacing for minimum searches along the pathway.
    #[arg(long, default_value_t = 0.001, value_name = "FLOAT")]
    pub pm_sample_step: f64,

    // --- Density estimation ---
    /// Method for estimating the solvent density along the pathway.
    #[arg(long, value_enum, default_value = "kernel")]
    pub de_method: DensityMethodArg,

    /// Spatial resolution: bin width for the histogram, evaluation-point
    /// spacing for the kernel estimator.
    #[arg(long, default_value_t = 0.01, value_name = "FLOAT")]
    pub de_res: f64,

    /// Kernel bandwidth; zero or negative selects the AMISE-optimal value.
    #[arg(long, default_value_t = -1.0, value_name = "FLOAT", allow_negative_numbers = true)]
    pub de_bandwidth: f64,

    /// Scale factor applied to the bandwidth.
    #[arg(long, default_value_t = 1.0, value_name = "FLOAT")]
    pub de_bw_scale: f64,

    /// Evaluation range cutoff in multiples of the bandwidth.
    #[arg(long, default_value_t = 5.0, value_name = "FLOAT")]
    pub de_eval_cutoff: f64,

    // --- Hydrophobicity ---
    /// Hydrophobicity scale for pore-forming residues.
    #[arg(long, value_enum, default_value = "wimley_white_1996")]
    pub hydrophob_database: HydrophobicityDatabaseArg,

    /// JSON file with a user-defined hydrophobicity scale; ignored unless
    /// --hydrophob-database is 'user'.
    #[arg(long, value_name = "PATH")]
    pub hydrophob_json: Option<PathBuf>,

    /// Fallback hydrophobicity for residues missing from the scale; if
    /// unset, a missing residue is an error.
    #[arg(long, value_name = "FLOAT", allow_negative_numbers = true)]
    pub hydrophob_fallback: Option<f64>,

    /// Bandwidth of the hydrophobicity kernel.
    #[arg(long, default_value_t = 0.35, value_name = "FLOAT")]
    pub hydrophob_bandwidth: f64,
}
