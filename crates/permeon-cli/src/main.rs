mod cli;
mod config;
mod error;
mod logging;
mod progress;

use clap::Parser;
use tracing::info;

use permeon::engine::progress::ProgressReporter;
use permeon::io::frames::{load_topology, JsonTrajectoryReader};
use permeon::workflows::analyze::{self, AnalysisSetup};

use cli::{Cli, Commands};
use error::Result;
use progress::CliProgressHandler;

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::setup_logging(cli.verbose, cli.quiet, cli.log_file.clone()) {
        eprintln!("permeon: {e}");
        std::process::exit(1);
    }

    let result = match cli.command {
        Commands::Analyze(args) => run_analyze(&args, cli.quiet),
    };

    if let Err(e) = result {
        eprintln!("permeon: {e}");
        std::process::exit(1);
    }
}

fn run_analyze(args: &cli::AnalyzeArgs, quiet: bool) -> Result<()> {
    let inputs = config::build_run_inputs(args)?;

    let topology = load_topology(&inputs.topology_path)?;
    let mut trajectory = JsonTrajectoryReader::open(&inputs.trajectory_path)?;

    let reporter = if quiet {
        ProgressReporter::new()
    } else {
        ProgressReporter::with_callback(CliProgressHandler::new().get_callback())
    };

    let setup = AnalysisSetup {
        config: &inputs.config,
        topology: &topology,
        radius_provider: &inputs.radius_provider,
        hydrophobicity: &inputs.hydrophobicity,
        pathway_group: &inputs.pathway_group,
        solvent_group: inputs.solvent_group.as_deref(),
        ipp_group: inputs.ipp_group.as_deref(),
        out_basename: &inputs.out_basename,
    };

    let summary = analyze::run(&setup, &mut trajectory, &reporter, None)?;

    info!(
        frames = summary.num_frames,
        failed = summary.num_failed,
        output = %summary.json_path.display(),
        "Analysis finished"
    );
    println!(
        "Analyzed {} frames ({} failed); results written to {}",
        summary.num_frames,
        summary.num_failed,
        summary.json_path.display()
    );
    Ok(())
}
