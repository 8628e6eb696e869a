pub mod builtin;
pub mod hydrophobicity;
pub mod radii;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("JSON parsing error for '{path}': {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },

    #[error(
        "No van-der-Waals radius for atom '{atom_name}' in residue '{res_name}' and no fallback configured"
    )]
    RadiusMiss { res_name: String, atom_name: String },

    #[error("No hydrophobicity for residue '{res_name}' and no fallback configured")]
    HydrophobicityMiss { res_name: String },
}
