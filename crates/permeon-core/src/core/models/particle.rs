use bitflags::bitflags;
use nalgebra::Point3;

bitflags! {
    #[derive(Default, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct ResidueFlags: u8 {
        const PORE_LINING = 0b0000_0001; // Residue COG lies within the local pore radius plus margin
        const PORE_FACING = 0b0000_0010; // Pore lining and COG is closer to the centre line than the C-alpha
    }
}

/// A single particle as seen by the path finder for one frame.
///
/// Positions are in nm in a right-handed Euclidean frame; the van-der-Waals
/// radius comes from the database lookup performed once per analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub index: usize,          // Global index in the frame's atom list
    pub res_id: i64,           // Residue sequence number from the topology
    pub position: Point3<f64>, // 3D coordinates (nm)
    pub mass: f64,             // Atomic mass
    pub vdw_radius: f64,       // van der Waals radius (nm)
}
