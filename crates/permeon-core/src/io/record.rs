//! The per-frame record of the JSON Lines stream.
//!
//! Field names are part of the external contract and must not change.

use serde::{Deserialize, Serialize};

/// Scalar aggregates of one frame.
///
/// All fields except the timestamp are optional: a failed frame carries only
/// its timestamp, and the aggregator skips scalar updates for the missing
/// fields.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PathSummary {
    pub time_stamp: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arg_min_radius: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_radius: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_path: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_sample: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solvent_range_lo: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solvent_range_hi: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arg_min_solvent_density: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_solvent_density: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arc_length_lo: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arc_length_hi: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub band_width: Option<f64>,
}

impl PathSummary {
    /// Whether this frame carries a full set of scalar aggregates.
    pub fn is_complete(&self) -> bool {
        self.min_radius.is_some() && self.arc_length_lo.is_some() && self.arc_length_hi.is_some()
    }
}

/// Original probe sample points and radii.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct OrigPoints {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<f64>,
    pub r: Vec<f64>,
}

/// Descriptor of a scalar spline: unique knots and the curve values at them.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct SplineData {
    pub knots: Vec<f64>,
    pub ctrl: Vec<f64>,
}

/// Descriptor of the centre-line spline.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CentreLineSplineData {
    pub knots: Vec<f64>,
    pub ctrl_x: Vec<f64>,
    pub ctrl_y: Vec<f64>,
    pub ctrl_z: Vec<f64>,
}

/// Mapped pore-residue table, one entry per column array element.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResiduePositions {
    pub res_id: Vec<i64>,
    pub s: Vec<f64>,
    pub rho: Vec<f64>,
    pub phi: Vec<f64>,
    pub pore_lining: Vec<f64>,
    pub pore_facing: Vec<f64>,
    pub pore_radius: Vec<f64>,
    pub solvent_density: Vec<f64>,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<f64>,
}

/// Mapped solvent-residue table.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SolventPositions {
    pub res_id: Vec<i64>,
    pub s: Vec<f64>,
    pub rho: Vec<f64>,
    pub phi: Vec<f64>,
    pub in_pore: Vec<f64>,
    pub in_sample: Vec<f64>,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<f64>,
}

/// One line of the per-frame stream: nine keyed datasets.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PerFrameRecord {
    pub path_summary: PathSummary,
    pub mol_path_orig_points: OrigPoints,
    pub mol_path_radius_spline: SplineData,
    pub mol_path_centre_line_spline: CentreLineSplineData,
    pub residue_positions: ResiduePositions,
    pub solvent_positions: SolventPositions,
    pub solvent_density_spline: SplineData,
    pub pl_hydrophobicity_spline: SplineData,
    pub pf_hydrophobicity_spline: SplineData,
}

impl PerFrameRecord {
    /// Record for a frame whose path finding failed: only the timestamp is
    /// set, all path-dependent datasets stay empty.
    pub fn failure(time_stamp: f64) -> Self {
        Self {
            path_summary: PathSummary {
                time_stamp,
                ..PathSummary::default()
            },
            ..Self::default()
        }
    }
}
