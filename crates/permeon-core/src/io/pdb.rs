//! PDB export of the analyzed structure.
//!
//! Coordinates come from the topology's reference frame; the occupancy
//! column carries the time-averaged pore-lining indicator and the B-factor
//! column the time-averaged pore-facing indicator of each residue, so the
//! classification can be colored in any molecular viewer.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use nalgebra::Point3;

use crate::core::models::topology::Topology;
use crate::engine::error::EngineError;

/// Writes the structure with per-residue classification indicators.
///
/// Positions are in nm and converted to Angstrom on output. Residues absent
/// from the indicator maps get zero occupancy and B-factor.
pub fn write_pdb(
    path: &Path,
    topology: &Topology,
    positions: &[Point3<f64>],
    pore_lining: &BTreeMap<i64, f64>,
    pore_facing: &BTreeMap<i64, f64>,
) -> Result<(), EngineError> {
    let as_io_err = |e: std::io::Error| EngineError::Io {
        path: path.to_string_lossy().to_string(),
        source: e,
    };

    let file = File::create(path).map_err(as_io_err)?;
    let mut writer = BufWriter::new(file);
    writeln!(writer, "REMARK     pathway annotation produced by permeon").map_err(as_io_err)?;

    for (i, atom) in topology.atoms().iter().enumerate() {
        let p = positions[i] * 10.0;
        let occupancy = pore_lining.get(&atom.res_id).copied().unwrap_or(0.0);
        let b_factor = pore_facing.get(&atom.res_id).copied().unwrap_or(0.0);
        let chain = atom.chain.chars().next().unwrap_or(' ');
        writeln!(
            writer,
            "ATOM  {:>5} {:<4}{:>3} {}{:>4}    {:8.3}{:8.3}{:8.3}{:6.2}{:6.2}",
            (i + 1) % 100_000,
            format_atom_name(&atom.name),
            atom.res_name,
            chain,
            atom.res_id % 10_000,
            p.x,
            p.y,
            p.z,
            occupancy,
            b_factor,
        )
        .map_err(as_io_err)?;
    }

    writeln!(writer, "END").map_err(as_io_err)?;
    writer.flush().map_err(as_io_err)
}

/// PDB atom-name column convention: names shorter than four characters are
/// indented by one space.
fn format_atom_name(name: &str) -> String {
    if name.len() >= 4 {
        name[..4].to_string()
    } else {
        format!(" {name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::topology::AtomInfo;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn test_topology() -> Topology {
        let atoms = vec![
            AtomInfo {
                name: "CA".to_string(),
                res_name: "ALA".to_string(),
                res_id: 1,
                chain: "A".to_string(),
                mass: 12.0,
            },
            AtomInfo {
                name: "HB12".to_string(),
                res_name: "ALA".to_string(),
                res_id: 1,
                chain: "A".to_string(),
                mass: 1.0,
            },
        ];
        Topology::new(atoms, HashMap::new())
    }

    #[test]
    fn atom_records_carry_classification_in_occupancy_and_bfactor() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("out.pdb");
        let positions = vec![Point3::new(0.1, 0.2, 0.3), Point3::new(0.4, 0.5, 0.6)];
        let mut lining = BTreeMap::new();
        lining.insert(1, 0.75);
        let mut facing = BTreeMap::new();
        facing.insert(1, 0.25);

        write_pdb(&out, &test_topology(), &positions, &lining, &facing).unwrap();
        let content = std::fs::read_to_string(&out).unwrap();
        let lines: Vec<&str> = content.lines().collect();

        assert!(lines[1].starts_with("ATOM"));
        // nm to Angstrom conversion
        assert!(lines[1].contains("   1.000   2.000   3.000"));
        assert!(lines[1].contains("  0.75  0.25"));
        assert_eq!(*lines.last().unwrap(), "END");
    }

    #[test]
    fn atom_name_column_follows_the_pdb_convention() {
        assert_eq!(format_atom_name("CA"), " CA");
        assert_eq!(format_atom_name("HB12"), "HB12");
    }

    #[test]
    fn unclassified_residues_default_to_zero() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("out.pdb");
        let positions = vec![Point3::origin(), Point3::origin()];
        write_pdb(
            &out,
            &test_topology(),
            &positions,
            &BTreeMap::new(),
            &BTreeMap::new(),
        )
        .unwrap();
        let content = std::fs::read_to_string(&out).unwrap();
        assert!(content.lines().nth(1).unwrap().contains("  0.00  0.00"));
    }
}
