//! JSON input adapter for topology and trajectory data.
//!
//! Stands in for the external trajectory reader while honoring its
//! contract: a topology with named index groups, and frames delivered in
//! trajectory order through [`FrameSource`].

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use nalgebra::Point3;
use serde::Deserialize;

use crate::core::models::frame::{Frame, FrameSource, FrameSourceError};
use crate::core::models::topology::{AtomInfo, Topology};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TopologyAtomJson {
    name: String,
    res_name: String,
    res_id: i64,
    #[serde(default = "default_chain")]
    chain: String,
    mass: f64,
}

fn default_chain() -> String {
    "A".to_string()
}

#[derive(Debug, Deserialize)]
struct TopologyJson {
    atoms: Vec<TopologyAtomJson>,
    #[serde(default)]
    groups: HashMap<String, Vec<usize>>,
}

/// Loads a topology document: an atom table plus named index groups
/// produced by the selection engine.
pub fn load_topology(path: &Path) -> Result<Topology, FrameSourceError> {
    let content = std::fs::read_to_string(path)?;
    let parsed: TopologyJson = serde_json::from_str(&content)
        .map_err(|e| FrameSourceError::Malformed(format!("topology: {e}")))?;

    let num_atoms = parsed.atoms.len();
    for (name, group) in &parsed.groups {
        if let Some(&bad) = group.iter().find(|&&i| i >= num_atoms) {
            return Err(FrameSourceError::Malformed(format!(
                "group '{name}' references atom index {bad} but the topology has {num_atoms} atoms"
            )));
        }
    }

    let atoms = parsed
        .atoms
        .into_iter()
        .map(|a| AtomInfo {
            name: a.name,
            res_name: a.res_name,
            res_id: a.res_id,
            chain: a.chain,
            mass: a.mass,
        })
        .collect();
    Ok(Topology::new(atoms, parsed.groups))
}

#[derive(Debug, Deserialize)]
struct FrameJson {
    time: f64,
    positions: Vec<[f64; 3]>,
}

/// Streaming trajectory reader: one frame per line, each line a JSON object
/// with a timestamp and a flat position array.
pub struct JsonTrajectoryReader {
    lines: std::io::Lines<BufReader<File>>,
    line_no: usize,
}

impl JsonTrajectoryReader {
    pub fn open(path: &Path) -> Result<Self, FrameSourceError> {
        let file = File::open(path)?;
        Ok(Self {
            lines: BufReader::new(file).lines(),
            line_no: 0,
        })
    }
}

impl FrameSource for JsonTrajectoryReader {
    fn next_frame(&mut self) -> Result<Option<Frame>, FrameSourceError> {
        loop {
            let Some(line) = self.lines.next() else {
                return Ok(None);
            };
            let line = line?;
            self.line_no += 1;
            if line.trim().is_empty() {
                continue;
            }
            let parsed: FrameJson = serde_json::from_str(&line).map_err(|e| {
                FrameSourceError::Malformed(format!("trajectory line {}: {e}", self.line_no))
            })?;
            let positions = parsed
                .positions
                .iter()
                .map(|&[x, y, z]| Point3::new(x, y, z))
                .collect();
            return Ok(Some(Frame {
                time: parsed.time,
                positions,
            }));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn topology_with_groups_loads() {
        let content = r#"{
            "atoms": [
                { "name": "CA", "resName": "ALA", "resId": 1, "chain": "A", "mass": 12.0 },
                { "name": "OW", "resName": "SOL", "resId": 2, "mass": 16.0 }
            ],
            "groups": { "pathway": [0], "solvent": [1] }
        }"#;
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();

        let topology = load_topology(file.path()).unwrap();
        assert_eq!(topology.num_atoms(), 2);
        assert_eq!(topology.atom(1).unwrap().chain, "A"); // defaulted
        assert_eq!(topology.selection("pathway").unwrap().as_slice(), &[0]);
    }

    #[test]
    fn out_of_range_group_index_is_rejected() {
        let content = r#"{
            "atoms": [ { "name": "CA", "resName": "ALA", "resId": 1, "mass": 12.0 } ],
            "groups": { "pathway": [3] }
        }"#;
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        assert!(matches!(
            load_topology(file.path()),
            Err(FrameSourceError::Malformed(_))
        ));
    }

    #[test]
    fn trajectory_frames_stream_in_order() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"{{ "time": 0.0, "positions": [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]] }}"#
        )
        .unwrap();
        writeln!(
            file,
            r#"{{ "time": 2.0, "positions": [[0.0, 0.1, 0.0], [1.0, 0.1, 0.0]] }}"#
        )
        .unwrap();

        let mut reader = JsonTrajectoryReader::open(file.path()).unwrap();
        let first = reader.next_frame().unwrap().unwrap();
        assert_eq!(first.time, 0.0);
        assert_eq!(first.positions.len(), 2);
        let second = reader.next_frame().unwrap().unwrap();
        assert_eq!(second.positions[0].y, 0.1);
        assert!(reader.next_frame().unwrap().is_none());
    }

    #[test]
    fn malformed_trajectory_line_names_its_position() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "garbage").unwrap();
        let mut reader = JsonTrajectoryReader::open(file.path()).unwrap();
        match reader.next_frame() {
            Err(FrameSourceError::Malformed(msg)) => assert!(msg.contains("line 1")),
            other => panic!("expected malformed error, got {other:?}"),
        }
    }
}
