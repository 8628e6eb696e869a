//! Built-in parameter tables.
//!
//! Radii are element-keyed (first alphabetic character of the atom name) in
//! nm. Hydrophobicity scales are residue-keyed; the Wimley–White values are
//! interface-scale free energies in kcal/mol, the Kyte–Doolittle values are
//! the classic hydropathy indices.

use phf::phf_map;

/// Simple element radii in the tradition of pore-profiling tools.
pub static SIMPLE_VDW_RADII: phf::Map<&'static str, f64> = phf_map! {
    "C" => 0.185,
    "N" => 0.175,
    "O" => 0.165,
    "S" => 0.200,
    "H" => 0.100,
    "P" => 0.210,
};

/// Bondi (1964) element radii.
pub static BONDI_VDW_RADII: phf::Map<&'static str, f64> = phf_map! {
    "C" => 0.170,
    "N" => 0.155,
    "O" => 0.152,
    "S" => 0.180,
    "H" => 0.120,
    "P" => 0.180,
};

/// Wimley & White (1996) interface hydrophobicity scale.
pub static WIMLEY_WHITE_1996: phf::Map<&'static str, f64> = phf_map! {
    "ALA" => 0.17,
    "ARG" => 0.81,
    "ASN" => 0.42,
    "ASP" => 1.23,
    "CYS" => -0.24,
    "GLN" => 0.58,
    "GLU" => 2.02,
    "GLY" => 0.01,
    "HIS" => 0.96,
    "ILE" => -0.31,
    "LEU" => -0.56,
    "LYS" => 0.99,
    "MET" => -0.23,
    "PHE" => -1.13,
    "PRO" => 0.45,
    "SER" => 0.13,
    "THR" => 0.14,
    "TRP" => -1.85,
    "TYR" => -0.94,
    "VAL" => 0.07,
};

/// Kyte & Doolittle (1982) hydropathy scale.
pub static KYTE_DOOLITTLE_1982: phf::Map<&'static str, f64> = phf_map! {
    "ALA" => 1.8,
    "ARG" => -4.5,
    "ASN" => -3.5,
    "ASP" => -3.5,
    "CYS" => 2.5,
    "GLN" => -3.5,
    "GLU" => -3.5,
    "GLY" => -0.4,
    "HIS" => -3.2,
    "ILE" => 4.5,
    "LEU" => 3.8,
    "LYS" => -3.9,
    "MET" => 1.9,
    "PHE" => 2.8,
    "PRO" => -1.6,
    "SER" => -0.8,
    "THR" => -0.7,
    "TRP" => -0.9,
    "TYR" => -1.3,
    "VAL" => 4.2,
};
