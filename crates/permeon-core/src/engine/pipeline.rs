//! The per-frame analysis pipeline.
//!
//! Drives path finding, pathway modelling, residue and solvent mapping,
//! density and hydrophobicity estimation for one frame, and assembles the
//! per-frame record. Data and numeric errors fail the frame, not the run:
//! the pipeline then emits a record carrying only the timestamp.

use std::collections::BTreeMap;

use nalgebra::Point3;
use tracing::{debug, instrument, warn};

use super::aggregate::density::number_density_spline;
use super::config::{AnalysisConfig, DensityEstimationMethod, PathAlignmentMethod};
use super::error::EngineError;
use super::path::mapping::CurvilinearCoord;
use super::path::MolecularPath;
use super::pathfinding::{find_path, ProbeSample};
use crate::core::models::frame::{Frame, FrameSourceError};
use crate::core::models::particle::{Particle, ResidueFlags};
use crate::core::models::selection::Selection;
use crate::core::models::topology::Topology;
use crate::core::stats::bandwidth::AmiseOptimalBandwidthEstimator;
use crate::core::stats::histogram::HistogramDensityEstimator;
use crate::core::stats::kde::{DensityEstimate, KernelDensityEstimator, WeightedKernelDensityEstimator};
use crate::io::record::{
    CentreLineSplineData, OrigPoints, PathSummary, PerFrameRecord, ResiduePositions, SolventPositions,
    SplineData,
};

/// Frame-invariant inputs of the per-frame analysis, set up once per run.
pub struct FramePipeline<'a> {
    config: &'a AnalysisConfig,
    topology: &'a Topology,
    pathway: Selection,
    init_pos_selection: Selection,
    pathway_vdw_radii: Vec<f64>,
    pore_residue_atoms: BTreeMap<i64, Vec<usize>>,
    solvent_residue_atoms: BTreeMap<i64, Vec<usize>>,
    hydrophobicity: BTreeMap<i64, f64>,
}

impl<'a> FramePipeline<'a> {
    /// # Arguments
    ///
    /// * `pathway` - The pore-defining selection.
    /// * `solvent` - Optional solvent selection.
    /// * `init_pos_selection` - Selection whose mass-weighted centroid seeds
    ///   the probe when no explicit position is configured; defaults to the
    ///   pathway selection.
    /// * `pathway_vdw_radii` - One radius per pathway-selection atom, from
    ///   the database lookup.
    /// * `hydrophobicity` - Resolved hydrophobicity per pore residue.
    pub fn new(
        config: &'a AnalysisConfig,
        topology: &'a Topology,
        pathway: Selection,
        solvent: Option<Selection>,
        init_pos_selection: Option<Selection>,
        pathway_vdw_radii: Vec<f64>,
        hydrophobicity: BTreeMap<i64, f64>,
    ) -> Self {
        let pore_residue_atoms = group_by_residue(topology, &pathway);
        let solvent_residue_atoms = solvent
            .as_ref()
            .map(|sel| group_by_residue(topology, sel))
            .unwrap_or_default();
        let init_pos_selection = init_pos_selection.unwrap_or_else(|| pathway.clone());

        Self {
            config,
            topology,
            pathway,
            init_pos_selection,
            pathway_vdw_radii,
            pore_residue_atoms,
            solvent_residue_atoms,
            hydrophobicity,
        }
    }

    /// Residue ids of the pore-defining group, in residue order.
    pub fn pore_residue_ids(&self) -> Vec<i64> {
        self.pore_residue_atoms.keys().copied().collect()
    }

    /// Analyzes one frame. Returns the per-frame record; a failed frame
    /// yields a record with empty path fields rather than an error. Only
    /// malformed input (wrong atom count) is escalated.
    #[instrument(skip_all, fields(frame = frame_index, time = frame.time))]
    pub fn analyze_frame(
        &self,
        frame_index: usize,
        frame: &Frame,
    ) -> Result<PerFrameRecord, EngineError> {
        if frame.positions.len() != self.topology.num_atoms() {
            return Err(EngineError::FrameSource {
                source: FrameSourceError::AtomCountMismatch {
                    expected: self.topology.num_atoms(),
                    actual: frame.positions.len(),
                },
            });
        }

        // seed position: explicit, or mass-weighted centroid of the seed
        // selection
        let init_probe_pos = self
            .config
            .init_probe_pos
            .unwrap_or_else(|| mass_weighted_centroid(self.topology, &self.init_pos_selection, frame));

        let particles = self.collect_particles(frame);
        let samples = match find_path(self.config, &particles, &init_probe_pos) {
            Ok(samples) => samples,
            Err(e) => {
                warn!(frame = frame_index, error = %e, "Path finding failed, emitting failure record");
                return Ok(PerFrameRecord::failure(frame.time));
            }
        };

        let mut path = match MolecularPath::new(&samples) {
            Ok(path) => path,
            Err(e) => {
                warn!(frame = frame_index, error = %e, "Path construction failed, emitting failure record");
                return Ok(PerFrameRecord::failure(frame.time));
            }
        };

        if self.config.path_alignment_method == PathAlignmentMethod::InitialProbePosition {
            let mapped = path.map_position(&init_probe_pos, &self.config.mapping);
            path.align_arc_origin(mapped.s);
        }

        // residue mapping by centre of geometry and by C-alpha
        let cog_positions = self.residue_cog_positions(frame, &self.pore_residue_atoms);
        let cal_positions = self.residue_calpha_positions(frame);
        let cog_mapped = path.map_selection(&cog_positions, &self.config.mapping);
        let cal_mapped = path.map_selection(&cal_positions, &self.config.mapping);
        let flags = self.classify_residues(&path, &cog_mapped, &cal_mapped);

        // hydrophobicity profiles from the classified residues
        let (pl_estimate, pf_estimate) = self.hydrophobicity_profiles(&cog_mapped, &flags);

        // solvent mapping and containment counts
        let solvent_positions = self.residue_cog_positions(frame, &self.solvent_residue_atoms);
        let solvent_mapped = path.map_selection(&solvent_positions, &self.config.mapping);
        let inside_sample = path.check_if_inside(
            &solvent_mapped,
            self.config.solvent_mapping_margin,
            None,
            &self.config.mapping,
        );
        let inside_pore = path.check_if_inside(
            &solvent_mapped,
            self.config.solvent_mapping_margin,
            Some((path.s_lo(), path.s_hi())),
            &self.config.mapping,
        );
        let num_inside_sample = inside_sample.values().filter(|&&b| b).count();
        let num_inside_pore = inside_pore.values().filter(|&&b| b).count();

        // solvent density along the pathway
        let sample_coords: Vec<f64> = solvent_mapped
            .iter()
            .filter(|(res_id, _)| inside_sample[*res_id])
            .map(|(_, coord)| coord.s)
            .collect();
        let pore_coords: Vec<f64> = solvent_mapped
            .iter()
            .filter(|(res_id, _)| inside_pore[*res_id])
            .map(|(_, coord)| coord.s)
            .collect();
        let density = self.estimate_density(&sample_coords, &pore_coords)?;

        let number_density =
            number_density_spline(&density.curve, path.pore_radius_spline(), num_inside_sample)?;
        let (arg_min_density, min_density) = number_density.minimum(
            (path.s_lo(), path.s_hi()),
            self.config.mapping.sample_step,
        );

        let (arg_min_radius, min_radius) = path.min_radius(self.config.mapping.sample_step);
        debug!(
            min_radius,
            length = path.length(),
            num_inside_pore,
            num_inside_sample,
            "Frame analysis complete"
        );

        Ok(self.assemble_record(
            frame,
            &samples,
            &path,
            &cog_positions,
            &cog_mapped,
            &flags,
            &solvent_positions,
            &solvent_mapped,
            &inside_pore,
            &inside_sample,
            &density,
            RecordScalars {
                arg_min_radius,
                min_radius,
                num_inside_pore,
                num_inside_sample,
                arg_min_density,
                min_density,
            },
            &pl_estimate,
            &pf_estimate,
        ))
    }

    fn collect_particles(&self, frame: &Frame) -> Vec<Particle> {
        self.pathway
            .iter()
            .enumerate()
            .map(|(local, global)| {
                let atom = self
                    .topology
                    .atom(global)
                    .expect("selection indices are validated against the topology");
                Particle {
                    index: global,
                    res_id: atom.res_id,
                    position: frame.positions[global],
                    mass: atom.mass,
                    vdw_radius: self.pathway_vdw_radii[local],
                }
            })
            .collect()
    }

    /// Centre of geometry per residue over the given residue-to-atom table.
    fn residue_cog_positions(
        &self,
        frame: &Frame,
        residue_atoms: &BTreeMap<i64, Vec<usize>>,
    ) -> BTreeMap<i64, Point3<f64>> {
        residue_atoms
            .iter()
            .map(|(&res_id, atoms)| {
                let mut acc = nalgebra::Vector3::zeros();
                for &idx in atoms {
                    acc += frame.positions[idx].coords;
                }
                (res_id, Point3::from(acc / atoms.len() as f64))
            })
            .collect()
    }

    fn residue_calpha_positions(&self, frame: &Frame) -> BTreeMap<i64, Point3<f64>> {
        self.pore_residue_atoms
            .keys()
            .filter_map(|&res_id| {
                self.topology
                    .calpha_index(res_id)
                    .map(|idx| (res_id, frame.positions[idx]))
            })
            .collect()
    }

    /// A residue is pore-lining iff its COG passes the containment test with
    /// the pore mapping margin, and pore-facing iff additionally its COG is
    /// strictly closer to the centre line than its C-alpha.
    fn classify_residues(
        &self,
        path: &MolecularPath,
        cog_mapped: &BTreeMap<i64, CurvilinearCoord>,
        cal_mapped: &BTreeMap<i64, CurvilinearCoord>,
    ) -> BTreeMap<i64, ResidueFlags> {
        let lining = path.check_if_inside(
            cog_mapped,
            self.config.pore_mapping_margin,
            None,
            &self.config.mapping,
        );
        cog_mapped
            .iter()
            .map(|(&res_id, cog)| {
                let mut flags = ResidueFlags::empty();
                if lining[&res_id] {
                    flags |= ResidueFlags::PORE_LINING;
                    if let Some(cal) = cal_mapped.get(&res_id) {
                        if cog.rho_sq < cal.rho_sq {
                            flags |= ResidueFlags::PORE_FACING;
                        }
                    }
                }
                (res_id, flags)
            })
            .collect()
    }

    /// Pore-lining and pore-facing hydrophobicity profiles as weighted
    /// kernel estimates, with zero-weight anchors half a bandwidth beyond
    /// the mapped residue range so both profiles vanish in the tails.
    fn hydrophobicity_profiles(
        &self,
        cog_mapped: &BTreeMap<i64, CurvilinearCoord>,
        flags: &BTreeMap<i64, ResidueFlags>,
    ) -> (DensityEstimate, DensityEstimate) {
        if cog_mapped.is_empty() {
            return (DensityEstimate::zero(0.0), DensityEstimate::zero(0.0));
        }

        let mut s_min = f64::INFINITY;
        let mut s_max = f64::NEG_INFINITY;
        let mut pl_series: (Vec<f64>, Vec<f64>) = (Vec::new(), Vec::new());
        let mut pf_series: (Vec<f64>, Vec<f64>) = (Vec::new(), Vec::new());
        for (res_id, coord) in cog_mapped {
            s_min = s_min.min(coord.s);
            s_max = s_max.max(coord.s);
            let h = self.hydrophobicity.get(res_id).copied().unwrap_or(0.0);
            if flags[res_id].contains(ResidueFlags::PORE_LINING) {
                pl_series.0.push(coord.s);
                pl_series.1.push(h);
            }
            if flags[res_id].contains(ResidueFlags::PORE_FACING) {
                pf_series.0.push(coord.s);
                pf_series.1.push(h);
            }
        }

        let half_bw = 0.5 * self.config.hydrophobicity_profile.band_width;
        for series in [&mut pl_series, &mut pf_series] {
            series.0.push(s_min - half_bw);
            series.1.push(0.0);
            series.0.push(s_max + half_bw);
            series.1.push(0.0);
        }

        let smoother = WeightedKernelDensityEstimator {
            band_width: self.config.hydrophobicity_profile.band_width,
            eval_range_cutoff: self.config.density.eval_range_cutoff,
            max_eval_point_dist: self.config.density.resolution,
        };
        let pl = smoother
            .estimate(&pl_series.0, &pl_series.1)
            .unwrap_or_else(|_| DensityEstimate::zero(0.0));
        let pf = smoother
            .estimate(&pf_series.0, &pf_series.1)
            .unwrap_or_else(|_| DensityEstimate::zero(0.0));
        (pl, pf)
    }

    /// Solvent density estimate along the arc-length coordinate. The
    /// bandwidth, when not fixed by configuration, is the AMISE-optimal
    /// value on the in-pore samples, scaled by the configured factor.
    fn estimate_density(
        &self,
        sample_coords: &[f64],
        pore_coords: &[f64],
    ) -> Result<DensityEstimate, EngineError> {
        match self.config.density.method {
            DensityEstimationMethod::Histogram => {
                let estimator = HistogramDensityEstimator {
                    bin_width: self.config.density.resolution,
                };
                Ok(estimator.estimate(sample_coords)?)
            }
            DensityEstimationMethod::Kernel => {
                let base = match self.config.density.band_width {
                    Some(h) if h > 0.0 => h,
                    _ => AmiseOptimalBandwidthEstimator::default().estimate(pore_coords),
                };
                let band_width = base * self.config.density.band_width_scale;
                if band_width <= 0.0 {
                    return Ok(DensityEstimate::zero(
                        sample_coords.first().copied().unwrap_or(0.0),
                    ));
                }
                let estimator = KernelDensityEstimator {
                    band_width,
                    eval_range_cutoff: self.config.density.eval_range_cutoff,
                    max_eval_point_dist: self.config.density.resolution,
                };
                Ok(estimator.estimate(sample_coords)?)
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn assemble_record(
        &self,
        frame: &Frame,
        samples: &[ProbeSample],
        path: &MolecularPath,
        cog_positions: &BTreeMap<i64, Point3<f64>>,
        cog_mapped: &BTreeMap<i64, CurvilinearCoord>,
        flags: &BTreeMap<i64, ResidueFlags>,
        solvent_positions: &BTreeMap<i64, Point3<f64>>,
        solvent_mapped: &BTreeMap<i64, CurvilinearCoord>,
        inside_pore: &BTreeMap<i64, bool>,
        inside_sample: &BTreeMap<i64, bool>,
        density: &DensityEstimate,
        scalars: RecordScalars,
        pl_estimate: &DensityEstimate,
        pf_estimate: &DensityEstimate,
    ) -> PerFrameRecord {
        let density_knots = density.curve.unique_knots();

        let mut residue_positions = ResiduePositions::default();
        for (res_id, coord) in cog_mapped {
            let f = flags[res_id];
            let p = cog_positions[res_id];
            residue_positions.res_id.push(*res_id);
            residue_positions.s.push(coord.s);
            residue_positions.rho.push(coord.rho_sq.sqrt());
            residue_positions.phi.push(coord.phi);
            residue_positions
                .pore_lining
                .push(f.contains(ResidueFlags::PORE_LINING) as u8 as f64);
            residue_positions
                .pore_facing
                .push(f.contains(ResidueFlags::PORE_FACING) as u8 as f64);
            residue_positions.pore_radius.push(path.radius(coord.s));
            residue_positions
                .solvent_density
                .push(density.curve.evaluate(coord.s, 0));
            residue_positions.x.push(p.x);
            residue_positions.y.push(p.y);
            residue_positions.z.push(p.z);
        }

        let mut solvent_records = SolventPositions::default();
        for (res_id, coord) in solvent_mapped {
            let p = solvent_positions[res_id];
            solvent_records.res_id.push(*res_id);
            solvent_records.s.push(coord.s);
            solvent_records.rho.push(coord.rho_sq.sqrt());
            solvent_records.phi.push(coord.phi);
            solvent_records
                .in_pore
                .push(inside_pore[res_id] as u8 as f64);
            solvent_records
                .in_sample
                .push(inside_sample[res_id] as u8 as f64);
            solvent_records.x.push(p.x);
            solvent_records.y.push(p.y);
            solvent_records.z.push(p.z);
        }

        let centre_knot_points = path.centre_line_knot_points();
        PerFrameRecord {
            path_summary: PathSummary {
                time_stamp: frame.time,
                arg_min_radius: Some(scalars.arg_min_radius),
                min_radius: Some(scalars.min_radius),
                length: Some(path.length()),
                volume: Some(path.volume()),
                num_path: Some(scalars.num_inside_pore as f64),
                num_sample: Some(scalars.num_inside_sample as f64),
                solvent_range_lo: density_knots.first().copied(),
                solvent_range_hi: density_knots.last().copied(),
                arg_min_solvent_density: Some(scalars.arg_min_density),
                min_solvent_density: Some(scalars.min_density),
                arc_length_lo: Some(path.s_lo()),
                arc_length_hi: Some(path.s_hi()),
                band_width: Some(density.band_width),
            },
            mol_path_orig_points: OrigPoints {
                x: samples.iter().map(|p| p.centre.x).collect(),
                y: samples.iter().map(|p| p.centre.y).collect(),
                z: samples.iter().map(|p| p.centre.z).collect(),
                r: samples.iter().map(|p| p.radius).collect(),
            },
            mol_path_radius_spline: SplineData {
                knots: path.pore_radius_unique_knots(),
                ctrl: path.pore_radius_knot_values(),
            },
            mol_path_centre_line_spline: CentreLineSplineData {
                knots: path.centre_line_unique_knots(),
                ctrl_x: centre_knot_points.iter().map(|p| p.x).collect(),
                ctrl_y: centre_knot_points.iter().map(|p| p.y).collect(),
                ctrl_z: centre_knot_points.iter().map(|p| p.z).collect(),
            },
            residue_positions,
            solvent_positions: solvent_records,
            solvent_density_spline: SplineData {
                knots: density_knots,
                ctrl: density.curve.knot_values(),
            },
            pl_hydrophobicity_spline: SplineData {
                knots: pl_estimate.curve.unique_knots(),
                ctrl: pl_estimate.curve.knot_values(),
            },
            pf_hydrophobicity_spline: SplineData {
                knots: pf_estimate.curve.unique_knots(),
                ctrl: pf_estimate.curve.knot_values(),
            },
        }
    }
}

struct RecordScalars {
    arg_min_radius: f64,
    min_radius: f64,
    num_inside_pore: usize,
    num_inside_sample: usize,
    arg_min_density: f64,
    min_density: f64,
}

/// Atoms of a selection grouped by residue id, ordered by residue id.
fn group_by_residue(topology: &Topology, selection: &Selection) -> BTreeMap<i64, Vec<usize>> {
    let mut groups: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
    for idx in selection.iter() {
        let res_id = topology
            .atom(idx)
            .expect("selection indices are validated against the topology")
            .res_id;
        groups.entry(res_id).or_default().push(idx);
    }
    groups
}

/// Mass-weighted centroid of a selection in the given frame.
fn mass_weighted_centroid(
    topology: &Topology,
    selection: &Selection,
    frame: &Frame,
) -> Point3<f64> {
    let mut total_mass = 0.0;
    let mut acc = nalgebra::Vector3::zeros();
    for idx in selection.iter() {
        let mass = topology
            .atom(idx)
            .expect("selection indices are validated against the topology")
            .mass;
        total_mass += mass;
        acc += mass * frame.positions[idx].coords;
    }
    Point3::from(acc / total_mass)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::topology::AtomInfo;
    use crate::core::optim::annealing::AnnealingConfig;
    use crate::core::optim::nelder_mead::NelderMeadConfig;
    use crate::engine::config::PathFinderConfig;
    use nalgebra::Vector3;
    use std::collections::HashMap;

    /// A synthetic channel: six rings of four two-atom residues around the
    /// z-axis, plus a few single-atom water residues inside and outside the
    /// pore.
    fn channel_system() -> (Topology, Frame) {
        let mut atoms = Vec::new();
        let mut positions = Vec::new();
        let mut pathway = Vec::new();
        let mut solvent = Vec::new();
        let mut res_id = 0;

        for ring in 0..6 {
            let z = -0.75 + 0.3 * ring as f64;
            for quarter in 0..4 {
                res_id += 1;
                let theta = std::f64::consts::FRAC_PI_2 * quarter as f64
                    + 0.2 * ring as f64;
                // side-chain-like atom closer to the axis than the C-alpha
                for (name, radius) in [("CB", 0.55), ("CA", 0.70)] {
                    atoms.push(AtomInfo {
                        name: name.to_string(),
                        res_name: "LEU".to_string(),
                        res_id,
                        chain: "A".to_string(),
                        mass: 12.0,
                    });
                    positions.push(Point3::new(
                        radius * theta.cos(),
                        radius * theta.sin(),
                        z,
                    ));
                    pathway.push(atoms.len() - 1);
                }
            }
        }

        // three waters inside the pore, one far outside
        for (i, z) in [-0.4, 0.0, 0.4, 5.0].iter().enumerate() {
            res_id += 1;
            atoms.push(AtomInfo {
                name: "OW".to_string(),
                res_name: "SOL".to_string(),
                res_id,
                chain: "W".to_string(),
                mass: 18.0,
            });
            positions.push(Point3::new(0.05 * i as f64, 0.0, *z));
            solvent.push(atoms.len() - 1);
        }

        let mut groups = HashMap::new();
        groups.insert("pathway".to_string(), pathway);
        groups.insert("solvent".to_string(), solvent);
        let topology = Topology::new(atoms, groups);
        let frame = Frame {
            time: 10.0,
            positions,
        };
        (topology, frame)
    }

    fn test_config() -> AnalysisConfig {
        AnalysisConfig {
            path_finder: PathFinderConfig {
                probe_step: 0.1,
                max_free_dist: 1.0,
                max_probe_steps: 100,
                cutoff: None,
                channel_direction: Vector3::z(),
            },
            annealing: AnnealingConfig {
                seed: 17,
                max_iter: 150,
                init_temp: 0.1,
                cooling_factor: 0.98,
                step_length_factor: 0.03,
            },
            nelder_mead: NelderMeadConfig {
                max_iter: 60,
                init_shift: 0.05,
            },
            ..AnalysisConfig::default()
        }
    }

    fn build_pipeline<'a>(config: &'a AnalysisConfig, topology: &'a Topology) -> FramePipeline<'a> {
        let pathway = topology.selection("pathway").unwrap();
        let solvent = topology.selection("solvent");
        let radii = vec![0.15; pathway.len()];
        let hydrophobicity = topology
            .residues_in_selection(&pathway)
            .into_iter()
            .map(|id| (id, 0.5))
            .collect();
        FramePipeline::new(
            config,
            topology,
            pathway,
            solvent,
            None,
            radii,
            hydrophobicity,
        )
    }

    #[test]
    fn channel_frame_produces_a_complete_record() {
        let (topology, frame) = channel_system();
        let config = test_config();
        let pipeline = build_pipeline(&config, &topology);

        let record = pipeline.analyze_frame(0, &frame).unwrap();
        let ps = &record.path_summary;
        assert!(ps.is_complete());
        assert_eq!(ps.time_stamp, 10.0);

        let min_radius = ps.min_radius.unwrap();
        assert!(
            min_radius > 0.2 && min_radius < 0.5,
            "min radius = {min_radius}"
        );
        assert!(ps.length.unwrap() > 1.0);
        assert!(ps.volume.unwrap() > 0.0);

        // alignment puts the seed near arc position zero
        assert!(ps.arc_length_lo.unwrap() < 0.0);
        assert!(ps.arc_length_hi.unwrap() > 0.0);

        // all 24 pore residues map onto the pathway
        assert_eq!(record.residue_positions.res_id.len(), 24);
        assert_eq!(record.residue_positions.s.len(), 24);
        assert!(record
            .residue_positions
            .pore_lining
            .iter()
            .any(|&v| v == 1.0));

        // the in-pore waters are found, the distant one is not inside
        assert_eq!(ps.num_path.unwrap() as usize, 3);
        assert!(record.solvent_positions.res_id.len() >= 3);

        // spline descriptors are aligned pairs
        assert_eq!(
            record.mol_path_radius_spline.knots.len(),
            record.mol_path_radius_spline.ctrl.len()
        );
        assert_eq!(
            record.mol_path_centre_line_spline.knots.len(),
            record.mol_path_centre_line_spline.ctrl_x.len()
        );
        assert!(!record.solvent_density_spline.knots.is_empty());
        assert!(!record.pl_hydrophobicity_spline.knots.is_empty());
    }

    #[test]
    fn pore_facing_residues_are_a_subset_of_pore_lining() {
        let (topology, frame) = channel_system();
        let config = test_config();
        let pipeline = build_pipeline(&config, &topology);
        let record = pipeline.analyze_frame(0, &frame).unwrap();

        for (lining, facing) in record
            .residue_positions
            .pore_lining
            .iter()
            .zip(&record.residue_positions.pore_facing)
        {
            assert!(*facing <= *lining);
        }
        // with CB closer to the axis than CA, lining residues face the pore
        assert!(record
            .residue_positions
            .pore_facing
            .iter()
            .any(|&v| v == 1.0));
    }

    /// A dense slab of atoms with no pore anywhere the optimizer can reach.
    fn blocked_system() -> (Topology, Frame) {
        let mut atoms = Vec::new();
        let mut positions = Vec::new();
        let mut pathway = Vec::new();
        for ix in -10..=10 {
            for iy in -10..=10 {
                for iz in -1..=1 {
                    atoms.push(AtomInfo {
                        name: "CB".to_string(),
                        res_name: "LEU".to_string(),
                        res_id: 1,
                        chain: "A".to_string(),
                        mass: 12.0,
                    });
                    positions.push(Point3::new(
                        0.15 * ix as f64,
                        0.15 * iy as f64,
                        0.15 * iz as f64,
                    ));
                    pathway.push(atoms.len() - 1);
                }
            }
        }
        let mut groups = HashMap::new();
        groups.insert("pathway".to_string(), pathway);
        let topology = Topology::new(atoms, groups);
        let frame = Frame {
            time: 10.0,
            positions,
        };
        (topology, frame)
    }

    #[test]
    fn blocked_channel_yields_a_failure_record() {
        let (topology, frame) = blocked_system();
        let config = test_config();
        let pathway = topology.selection("pathway").unwrap();
        let radii = vec![0.2; pathway.len()];
        let pipeline = FramePipeline::new(
            &config,
            &topology,
            pathway,
            None,
            None,
            radii,
            BTreeMap::from([(1, 0.5)]),
        );

        let record = pipeline.analyze_frame(0, &frame).unwrap();
        assert!(!record.path_summary.is_complete());
        assert!(record.mol_path_orig_points.x.is_empty());
        assert!(record.residue_positions.res_id.is_empty());
        assert_eq!(record.path_summary.time_stamp, 10.0);
    }

    #[test]
    fn mismatched_atom_count_is_escalated() {
        let (topology, frame) = channel_system();
        let config = test_config();
        let pipeline = build_pipeline(&config, &topology);

        let truncated = Frame {
            time: 0.0,
            positions: frame.positions[..10].to_vec(),
        };
        let result = pipeline.analyze_frame(0, &truncated);
        assert!(matches!(result, Err(EngineError::FrameSource { .. })));
    }

    #[test]
    fn explicit_probe_position_overrides_the_centroid() {
        let (topology, frame) = channel_system();
        let mut config = test_config();
        config.init_probe_pos = Some(Point3::new(0.0, 0.0, 0.2));
        let pipeline = build_pipeline(&config, &topology);
        let record = pipeline.analyze_frame(0, &frame).unwrap();
        assert!(record.path_summary.is_complete());
    }
}
