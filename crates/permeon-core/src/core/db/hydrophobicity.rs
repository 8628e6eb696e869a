//! Residue hydrophobicity scales.

use super::builtin;
use super::LookupError;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HydrophobicityDatabase {
    WimleyWhite1996,
    KyteDoolittle1982,
    User,
}

#[derive(Debug, Deserialize)]
struct ScaleEntry {
    res: String,
    value: f64,
}

#[derive(Debug, Deserialize)]
struct ScaleFile {
    hydrophobicity: Vec<ScaleEntry>,
}

/// Residue-keyed hydrophobicity lookup with an optional fallback value.
#[derive(Debug, Clone, Default)]
pub struct HydrophobicityScale {
    values: HashMap<String, f64>,
    fallback: Option<f64>,
}

impl HydrophobicityScale {
    pub fn from_builtin(database: HydrophobicityDatabase) -> Self {
        let table = match database {
            HydrophobicityDatabase::WimleyWhite1996 => &builtin::WIMLEY_WHITE_1996,
            HydrophobicityDatabase::KyteDoolittle1982 => &builtin::KYTE_DOOLITTLE_1982,
            HydrophobicityDatabase::User => return Self::default(),
        };
        Self {
            values: table
                .entries()
                .map(|(k, &v)| (k.to_string(), v))
                .collect(),
            fallback: None,
        }
    }

    pub fn from_json_file(path: &Path) -> Result<Self, LookupError> {
        let content = std::fs::read_to_string(path).map_err(|e| LookupError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        let file: ScaleFile = serde_json::from_str(&content).map_err(|e| LookupError::Json {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        Ok(Self {
            values: file
                .hydrophobicity
                .into_iter()
                .map(|e| (e.res, e.value))
                .collect(),
            fallback: None,
        })
    }

    pub fn set_fallback(&mut self, value: f64) {
        self.fallback = Some(value);
    }

    pub fn lookup(&self, res_name: &str) -> Result<f64, LookupError> {
        if let Some(&v) = self.values.get(res_name) {
            return Ok(v);
        }
        self.fallback.ok_or_else(|| LookupError::HydrophobicityMiss {
            res_name: res_name.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn builtin_scales_cover_the_twenty_amino_acids() {
        let ww = HydrophobicityScale::from_builtin(HydrophobicityDatabase::WimleyWhite1996);
        let kd = HydrophobicityScale::from_builtin(HydrophobicityDatabase::KyteDoolittle1982);
        for res in [
            "ALA", "ARG", "ASN", "ASP", "CYS", "GLN", "GLU", "GLY", "HIS", "ILE", "LEU", "LYS",
            "MET", "PHE", "PRO", "SER", "THR", "TRP", "TYR", "VAL",
        ] {
            assert!(ww.lookup(res).is_ok(), "Wimley-White misses {res}");
            assert!(kd.lookup(res).is_ok(), "Kyte-Doolittle misses {res}");
        }
        assert!((kd.lookup("ILE").unwrap() - 4.5).abs() < 1e-12);
    }

    #[test]
    fn fallback_covers_nonstandard_residues() {
        let mut scale = HydrophobicityScale::from_builtin(HydrophobicityDatabase::WimleyWhite1996);
        assert!(matches!(
            scale.lookup("LIG"),
            Err(LookupError::HydrophobicityMiss { .. })
        ));
        scale.set_fallback(0.0);
        assert_eq!(scale.lookup("LIG").unwrap(), 0.0);
    }

    #[test]
    fn user_scale_loads_from_json() {
        let content = r#"{ "hydrophobicity": [ { "res": "ALA", "value": -0.5 } ] }"#;
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        let scale = HydrophobicityScale::from_json_file(file.path()).unwrap();
        assert_eq!(scale.lookup("ALA").unwrap(), -0.5);
    }
}
