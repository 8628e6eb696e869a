//! Van-der-Waals radius lookup.

use super::builtin;
use super::LookupError;
use crate::core::models::selection::Selection;
use crate::core::models::topology::Topology;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// Built-in radius database selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VdwRadiusDatabase {
    Simple,
    Bondi,
    User,
}

#[derive(Debug, Deserialize)]
struct RadiusEntry {
    res: String,
    atom: String,
    radius: f64,
}

#[derive(Debug, Deserialize)]
struct RadiusFile {
    vdwradii: Vec<RadiusEntry>,
}

/// Resolves van-der-Waals radii for atoms, keyed on (residue name, atom
/// name).
///
/// Lookup falls through exact (residue, atom) entries, wildcard-residue
/// entries (`res == "*"`), the element table keyed on the first alphabetic
/// character of the atom name, and finally the configured fallback radius.
/// A miss with no fallback is an error, so incomplete databases surface
/// before any path finding happens.
#[derive(Debug, Clone, Default)]
pub struct VdwRadiusProvider {
    exact: HashMap<(String, String), f64>,
    wildcard: HashMap<String, f64>,
    element: HashMap<char, f64>,
    fallback: Option<f64>,
}

impl VdwRadiusProvider {
    /// Provider backed by one of the built-in element tables.
    pub fn from_builtin(database: VdwRadiusDatabase) -> Self {
        let table = match database {
            VdwRadiusDatabase::Simple => &builtin::SIMPLE_VDW_RADII,
            VdwRadiusDatabase::Bondi => &builtin::BONDI_VDW_RADII,
            VdwRadiusDatabase::User => {
                return Self::default();
            }
        };
        let element = table
            .entries()
            .map(|(k, &v)| (k.chars().next().unwrap(), v))
            .collect();
        Self {
            element,
            ..Self::default()
        }
    }

    /// Provider from a user-supplied JSON database.
    pub fn from_json_file(path: &Path) -> Result<Self, LookupError> {
        let content = std::fs::read_to_string(path).map_err(|e| LookupError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        let file: RadiusFile = serde_json::from_str(&content).map_err(|e| LookupError::Json {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;

        let mut provider = Self::default();
        for entry in file.vdwradii {
            if entry.res == "*" {
                provider.wildcard.insert(entry.atom, entry.radius);
            } else {
                provider.exact.insert((entry.res, entry.atom), entry.radius);
            }
        }
        Ok(provider)
    }

    pub fn set_fallback(&mut self, radius: f64) {
        self.fallback = Some(radius);
    }

    /// Radius for one atom.
    pub fn lookup(&self, res_name: &str, atom_name: &str) -> Result<f64, LookupError> {
        if let Some(&r) = self
            .exact
            .get(&(res_name.to_string(), atom_name.to_string()))
        {
            return Ok(r);
        }
        if let Some(&r) = self.wildcard.get(atom_name) {
            return Ok(r);
        }
        if let Some(element) = atom_name.chars().find(|c| c.is_ascii_alphabetic()) {
            if let Some(&r) = self.element.get(&element.to_ascii_uppercase()) {
                return Ok(r);
            }
        }
        self.fallback.ok_or_else(|| LookupError::RadiusMiss {
            res_name: res_name.to_string(),
            atom_name: atom_name.to_string(),
        })
    }

    /// Radii for every atom of a selection, in selection order.
    pub fn radii_for_selection(
        &self,
        topology: &Topology,
        selection: &Selection,
    ) -> Result<Vec<f64>, LookupError> {
        selection
            .iter()
            .map(|idx| {
                let atom = topology
                    .atom(idx)
                    .expect("selection indices are validated against the topology");
                self.lookup(&atom.res_name, &atom.name)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn builtin_simple_table_resolves_by_element() {
        let provider = VdwRadiusProvider::from_builtin(VdwRadiusDatabase::Simple);
        assert_eq!(provider.lookup("ALA", "CA").unwrap(), 0.185);
        assert_eq!(provider.lookup("SOL", "OW").unwrap(), 0.165);
        // leading digits are skipped when looking for the element character
        assert_eq!(provider.lookup("POPC", "2H1").unwrap(), 0.100);
    }

    #[test]
    fn user_database_takes_precedence_over_fallback() {
        let content = r#"{
            "vdwradii": [
                { "res": "ALA", "atom": "CA", "radius": 0.19 },
                { "res": "*", "atom": "P", "radius": 0.21 }
            ]
        }"#;
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();

        let mut provider = VdwRadiusProvider::from_json_file(file.path()).unwrap();
        provider.set_fallback(0.15);

        assert_eq!(provider.lookup("ALA", "CA").unwrap(), 0.19);
        assert_eq!(provider.lookup("POPC", "P").unwrap(), 0.21);
        assert_eq!(provider.lookup("XYZ", "QQ").unwrap(), 0.15);
    }

    #[test]
    fn miss_without_fallback_is_an_error() {
        let provider = VdwRadiusProvider::from_builtin(VdwRadiusDatabase::User);
        let result = provider.lookup("ALA", "CA");
        assert!(matches!(result, Err(LookupError::RadiusMiss { .. })));
    }

    #[test]
    fn malformed_json_database_is_reported() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        let result = VdwRadiusProvider::from_json_file(file.path());
        assert!(matches!(result, Err(LookupError::Json { .. })));
    }

    #[test]
    fn missing_database_file_is_reported() {
        let result = VdwRadiusProvider::from_json_file(Path::new("no_such_radii.json"));
        assert!(matches!(result, Err(LookupError::Io { .. })));
    }
}
