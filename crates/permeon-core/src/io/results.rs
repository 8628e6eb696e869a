//! The final results document.
//!
//! A single JSON object with pathway-level summaries, time-averaged profiles
//! on the common support grid, scalar and profile-valued time series, and
//! residue-level summaries enriched with residue metadata. The per-frame
//! JSON Lines are appended verbatim after the document, as the downstream
//! tooling expects.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use serde_json::{json, Map, Value};

use crate::core::models::topology::Topology;
use crate::core::stats::summary::SummaryStatistics;
use crate::engine::aggregate::AggregatedResults;
use crate::engine::error::EngineError;

/// Per-support-point arrays of a profile's summary statistics.
fn profile_to_json(stats: &[SummaryStatistics]) -> (Value, Value, Value, Value) {
    let mean: Vec<f64> = stats.iter().map(|s| s.mean()).collect();
    let sd: Vec<f64> = stats.iter().map(|s| s.sd()).collect();
    let min: Vec<f64> = stats.iter().map(|s| s.min()).collect();
    let max: Vec<f64> = stats.iter().map(|s| s.max()).collect();
    (json!(mean), json!(sd), json!(min), json!(max))
}

fn residue_property_to_json(stats: &[SummaryStatistics]) -> Value {
    json!({
        "mean": stats.iter().map(|s| s.mean()).collect::<Vec<_>>(),
        "sd": stats.iter().map(|s| s.sd()).collect::<Vec<_>>(),
        "min": stats.iter().map(|s| s.min()).collect::<Vec<_>>(),
        "max": stats.iter().map(|s| s.max()).collect::<Vec<_>>(),
        "n": stats.iter().map(|s| s.num()).collect::<Vec<_>>(),
    })
}

/// Builds the results document from the aggregates, enriching residue rows
/// with names, chains, and hydrophobicity from the topology.
pub fn build_document(
    results: &AggregatedResults,
    topology: &Topology,
    hydrophobicity: &BTreeMap<i64, f64>,
) -> Value {
    let mut pathway_summary = Map::new();
    for (name, stats) in &results.scalar_summaries {
        pathway_summary.insert(name.to_string(), stats.to_json());
    }

    let mut profile = Map::new();
    profile.insert("s".to_string(), json!(results.support_points));
    for (name, stats) in [
        ("radius", &results.radius_profile),
        ("density", &results.density_profile),
        ("energy", &results.energy_profile),
        ("plHydrophobicity", &results.pl_hydrophobicity_profile),
        ("pfHydrophobicity", &results.pf_hydrophobicity_profile),
    ] {
        let (mean, sd, min, max) = profile_to_json(stats);
        profile.insert(format!("{name}Mean"), mean);
        profile.insert(format!("{name}Sd"), sd);
        profile.insert(format!("{name}Min"), min);
        profile.insert(format!("{name}Max"), max);
    }

    let mut scalar_ts = Map::new();
    scalar_ts.insert("timeStamps".to_string(), json!(results.time_stamps));
    for (name, series) in &results.scalar_time_series {
        scalar_ts.insert(name.to_string(), json!(series));
    }

    let profile_ts = json!({
        "timeStamps": results.time_stamps,
        "supportPoints": results.support_points,
        "radius": results.radius_profile_ts,
        "density": results.density_profile_ts,
        "plHydrophobicity": results.pl_hydrophobicity_profile_ts,
        "pfHydrophobicity": results.pf_hydrophobicity_profile_ts,
    });

    let names: Vec<String> = results
        .residue_ids
        .iter()
        .map(|&id| topology.residue_name(id).unwrap_or("UNK").to_string())
        .collect();
    let chains: Vec<String> = results
        .residue_ids
        .iter()
        .map(|&id| topology.residue_chain(id).unwrap_or("").to_string())
        .collect();
    let hydrophobicities: Vec<f64> = results
        .residue_ids
        .iter()
        .map(|id| hydrophobicity.get(id).copied().unwrap_or(f64::NAN))
        .collect();

    let rs = &results.residue_summaries;
    let residue_summary = json!({
        "id": results.residue_ids,
        "name": names,
        "chain": chains,
        "hydrophobicity": hydrophobicities,
        "s": residue_property_to_json(&rs.s),
        "rho": residue_property_to_json(&rs.rho),
        "phi": residue_property_to_json(&rs.phi),
        "poreLining": residue_property_to_json(&rs.pore_lining),
        "poreFacing": residue_property_to_json(&rs.pore_facing),
        "poreRadius": residue_property_to_json(&rs.pore_radius),
        "solventDensity": residue_property_to_json(&rs.solvent_density),
        "x": residue_property_to_json(&rs.x),
        "y": residue_property_to_json(&rs.y),
        "z": residue_property_to_json(&rs.z),
    });

    json!({
        "pathwaySummary": Value::Object(pathway_summary),
        "pathwayProfile": Value::Object(profile),
        "pathwayScalarTimeSeries": Value::Object(scalar_ts),
        "pathwayProfileTimeSeries": profile_ts,
        "residueSummary": residue_summary,
    })
}

/// Writes the results document to `out_path` and appends the per-frame
/// stream verbatim, line by line.
pub fn write_with_stream(
    out_path: &Path,
    document: &Value,
    stream_path: &Path,
) -> Result<(), EngineError> {
    let io_err = |path: &Path| {
        let path = path.to_string_lossy().to_string();
        move |e: std::io::Error| EngineError::Io { path, source: e }
    };

    let file = File::create(out_path).map_err(io_err(out_path))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, document)
        .map_err(|e| EngineError::Internal(format!("result serialization failed: {e}")))?;
    writeln!(writer).map_err(io_err(out_path))?;

    let stream = File::open(stream_path).map_err(io_err(stream_path))?;
    for line in BufReader::new(stream).lines() {
        let line = line.map_err(io_err(stream_path))?;
        writeln!(writer, "{line}").map_err(io_err(out_path))?;
    }
    writer.flush().map_err(io_err(out_path))
}
