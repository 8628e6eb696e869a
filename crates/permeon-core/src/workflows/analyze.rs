//! The complete trajectory-analysis workflow.
//!
//! Ties the engine and I/O layers together: database setup, the per-frame
//! loop emitting the JSON Lines stream, the two-pass aggregation, and the
//! final JSON/OBJ/PDB outputs.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use nalgebra::Point3;
use tracing::{info, instrument, warn};

use crate::core::db::hydrophobicity::HydrophobicityScale;
use crate::core::db::radii::VdwRadiusProvider;
use crate::core::models::frame::FrameSource;
use crate::core::models::topology::Topology;
use crate::engine::aggregate::{AggregatedResults, Aggregator};
use crate::engine::config::AnalysisConfig;
use crate::engine::error::EngineError;
use crate::engine::path::MolecularPath;
use crate::engine::pipeline::FramePipeline;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::io::jsonl::JsonRecordWriter;
use crate::io::obj::{write_obj, PoreSurfaceBuilder};
use crate::io::pdb::write_pdb;
use crate::io::record::PerFrameRecord;
use crate::io::results;

/// Frame-independent inputs of a run.
pub struct AnalysisSetup<'a> {
    pub config: &'a AnalysisConfig,
    pub topology: &'a Topology,
    pub radius_provider: &'a VdwRadiusProvider,
    pub hydrophobicity: &'a HydrophobicityScale,
    /// Name of the pore-defining index group.
    pub pathway_group: &'a str,
    /// Name of the solvent index group, if solvent mapping is requested.
    pub solvent_group: Option<&'a str>,
    /// Name of the group seeding the initial probe position; defaults to
    /// the pathway group.
    pub ipp_group: Option<&'a str>,
    /// Base name for all output files; extensions are added internally.
    pub out_basename: &'a Path,
}

/// What a finished run produced.
#[derive(Debug, Clone)]
pub struct AnalysisSummary {
    pub num_frames: usize,
    pub num_failed: usize,
    pub json_path: PathBuf,
    pub obj_path: Option<PathBuf>,
    pub pdb_path: PathBuf,
}

struct OutputPaths {
    json: PathBuf,
    obj: PathBuf,
    pdb: PathBuf,
    stream: PathBuf,
}

fn output_paths(base: &Path) -> OutputPaths {
    let stem = base
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "output".to_string());
    let dir = base.parent().unwrap_or_else(|| Path::new(""));
    OutputPaths {
        json: dir.join(format!("{stem}.json")),
        obj: dir.join(format!("{stem}.obj")),
        pdb: dir.join(format!("{stem}.pdb")),
        stream: dir.join(format!("stream_{stem}.json")),
    }
}

/// Runs the full analysis over a trajectory.
///
/// Cancellation is honored between frames: when the flag is raised, the
/// frames analyzed so far are aggregated and written out normally.
#[instrument(skip_all, name = "analysis_workflow")]
pub fn run(
    setup: &AnalysisSetup,
    source: &mut dyn FrameSource,
    reporter: &ProgressReporter,
    cancel: Option<&AtomicBool>,
) -> Result<AnalysisSummary, EngineError> {
    setup.config.validate()?;
    let paths = output_paths(setup.out_basename);

    // --- Setup: selections and parameter lookups ---
    reporter.report(Progress::PhaseStart { name: "Setup" });
    let pathway = setup
        .topology
        .selection(setup.pathway_group)
        .ok_or_else(|| EngineError::UnknownSelection(setup.pathway_group.to_string()))?;
    let solvent = match setup.solvent_group {
        Some(name) => Some(
            setup
                .topology
                .selection(name)
                .ok_or_else(|| EngineError::UnknownSelection(name.to_string()))?,
        ),
        None => None,
    };
    let ipp = match setup.ipp_group {
        Some(name) => Some(
            setup
                .topology
                .selection(name)
                .ok_or_else(|| EngineError::UnknownSelection(name.to_string()))?,
        ),
        None => None,
    };

    let vdw_radii = setup
        .radius_provider
        .radii_for_selection(setup.topology, &pathway)?;

    let mut hydrophobicity = BTreeMap::new();
    for res_id in setup.topology.residues_in_selection(&pathway) {
        let res_name = setup.topology.residue_name(res_id).unwrap_or("UNK");
        hydrophobicity.insert(res_id, setup.hydrophobicity.lookup(res_name)?);
    }
    info!(
        pathway_atoms = pathway.len(),
        pore_residues = hydrophobicity.len(),
        "Setup complete"
    );
    reporter.report(Progress::PhaseFinish);

    // --- Per-frame analysis into the JSON Lines stream ---
    let pipeline = FramePipeline::new(
        setup.config,
        setup.topology,
        pathway,
        solvent,
        ipp,
        vdw_radii,
        hydrophobicity.clone(),
    );

    reporter.report(Progress::PhaseStart {
        name: "Analyzing frames",
    });
    let mut writer = JsonRecordWriter::create(&paths.stream)?;
    let mut num_frames = 0;
    let mut num_failed = 0;
    let mut first_positions: Option<Vec<Point3<f64>>> = None;
    let mut last_complete: Option<PerFrameRecord> = None;

    while let Some(frame) = source.next_frame()? {
        if cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
            warn!(num_frames, "Cancellation requested, stopping frame loop");
            break;
        }

        let record = pipeline.analyze_frame(num_frames, &frame)?;
        if record.path_summary.is_complete() {
            last_complete = Some(record.clone());
        } else {
            num_failed += 1;
        }
        writer.write_record(&record)?;

        first_positions.get_or_insert_with(|| frame.positions.clone());
        num_frames += 1;
        reporter.report(Progress::StatusUpdate {
            text: format!("frame {num_frames}"),
        });
    }
    writer.finish()?;
    info!(num_frames, num_failed, "Frame loop finished");
    reporter.report(Progress::PhaseFinish);

    // --- Aggregation and final outputs ---
    let aggregated = Aggregator::new(setup.config.output_grid.clone()).run(&paths.stream, reporter)?;

    reporter.report(Progress::PhaseStart {
        name: "Writing results",
    });
    let document = results::build_document(&aggregated, setup.topology, &hydrophobicity);
    results::write_with_stream(&paths.json, &document, &paths.stream)?;
    std::fs::remove_file(&paths.stream).map_err(|e| EngineError::Io {
        path: paths.stream.to_string_lossy().to_string(),
        source: e,
    })?;

    let obj_path = match &last_complete {
        Some(record) => {
            let centre_points: Vec<Point3<f64>> = record
                .mol_path_centre_line_spline
                .ctrl_x
                .iter()
                .zip(&record.mol_path_centre_line_spline.ctrl_y)
                .zip(&record.mol_path_centre_line_spline.ctrl_z)
                .map(|((&x, &y), &z)| Point3::new(x, y, z))
                .collect();
            match MolecularPath::from_spline_data(
                &record.mol_path_radius_spline.knots,
                &record.mol_path_radius_spline.ctrl,
                &record.mol_path_centre_line_spline.knots,
                &centre_points,
            ) {
                Ok(path) => {
                    let mesh = PoreSurfaceBuilder::default().build(&path);
                    write_obj(&paths.obj, &mesh)?;
                    Some(paths.obj.clone())
                }
                Err(e) => {
                    warn!(error = %e, "Could not rebuild final path for surface export");
                    None
                }
            }
        }
        None => None,
    };

    write_classification_pdb(&paths.pdb, setup.topology, &first_positions, &aggregated)?;
    reporter.report(Progress::PhaseFinish);

    Ok(AnalysisSummary {
        num_frames,
        num_failed,
        json_path: paths.json,
        obj_path,
        pdb_path: paths.pdb,
    })
}

fn write_classification_pdb(
    path: &Path,
    topology: &Topology,
    first_positions: &Option<Vec<Point3<f64>>>,
    aggregated: &AggregatedResults,
) -> Result<(), EngineError> {
    let Some(positions) = first_positions else {
        return Ok(());
    };
    let mut lining = BTreeMap::new();
    let mut facing = BTreeMap::new();
    for (i, &res_id) in aggregated.residue_ids.iter().enumerate() {
        lining.insert(res_id, aggregated.residue_summaries.pore_lining[i].mean());
        facing.insert(res_id, aggregated.residue_summaries.pore_facing[i].mean());
    }
    write_pdb(path, topology, positions, &lining, &facing)
}
