//! Streaming aggregation of the per-frame record stream.

pub mod density;
pub mod energy;

use std::collections::HashMap;
use std::path::Path;

use tracing::{info, instrument, warn};

use super::config::OutputGridConfig;
use super::error::EngineError;
use super::progress::{Progress, ProgressReporter};
use crate::core::geometry::interp;
use crate::core::geometry::spline1d::SplineCurve1D;
use crate::core::stats::summary::SummaryStatistics;
use crate::io::jsonl::JsonRecordReader;
use crate::io::record::SplineData;

/// Names of the exported scalar aggregates, in output order.
pub const SCALAR_NAMES: [&str; 9] = [
    "argMinRadius",
    "minRadius",
    "length",
    "volume",
    "numPathway",
    "numSample",
    "argMinSolventDensity",
    "minSolventDensity",
    "bandWidth",
];

/// Per-residue summary statistics over all frames.
#[derive(Debug, Clone, Default)]
pub struct ResidueSummaries {
    pub s: Vec<SummaryStatistics>,
    pub rho: Vec<SummaryStatistics>,
    pub phi: Vec<SummaryStatistics>,
    pub pore_lining: Vec<SummaryStatistics>,
    pub pore_facing: Vec<SummaryStatistics>,
    pub pore_radius: Vec<SummaryStatistics>,
    pub solvent_density: Vec<SummaryStatistics>,
    pub x: Vec<SummaryStatistics>,
    pub y: Vec<SummaryStatistics>,
    pub z: Vec<SummaryStatistics>,
}

impl ResidueSummaries {
    fn with_len(n: usize) -> Self {
        let make = || vec![SummaryStatistics::new(); n];
        Self {
            s: make(),
            rho: make(),
            phi: make(),
            pore_lining: make(),
            pore_facing: make(),
            pore_radius: make(),
            solvent_density: make(),
            x: make(),
            y: make(),
            z: make(),
        }
    }
}

/// Everything the aggregator distills from the per-frame stream.
#[derive(Debug, Clone)]
pub struct AggregatedResults {
    pub num_frames: usize,
    pub time_stamps: Vec<f64>,
    pub support_points: Vec<f64>,

    /// Summary statistics per exported scalar, ordered as [`SCALAR_NAMES`].
    pub scalar_summaries: Vec<(&'static str, SummaryStatistics)>,
    /// Scalar time series, ordered as [`SCALAR_NAMES`]; failed frames carry
    /// NaN entries so the series stay aligned with the timestamps.
    pub scalar_time_series: Vec<(&'static str, Vec<f64>)>,

    pub radius_profile: Vec<SummaryStatistics>,
    pub density_profile: Vec<SummaryStatistics>,
    pub energy_profile: Vec<SummaryStatistics>,
    pub pl_hydrophobicity_profile: Vec<SummaryStatistics>,
    pub pf_hydrophobicity_profile: Vec<SummaryStatistics>,

    pub radius_profile_ts: Vec<Vec<f64>>,
    pub density_profile_ts: Vec<Vec<f64>>,
    pub pl_hydrophobicity_profile_ts: Vec<Vec<f64>>,
    pub pf_hydrophobicity_profile_ts: Vec<Vec<f64>>,

    pub residue_ids: Vec<i64>,
    pub residue_summaries: ResidueSummaries,
}

/// Two-pass streaming aggregator over a per-frame stream file.
///
/// Pass one accumulates scalar summaries and time series and determines the
/// arc-length bounds; pass two evaluates the per-frame splines on the common
/// support grid derived from those bounds. The two separate passes guarantee
/// that grid construction has seen every frame before any profile sampling
/// happens.
pub struct Aggregator {
    output: OutputGridConfig,
}

struct PassOne {
    time_stamps: Vec<f64>,
    scalar_stats: Vec<SummaryStatistics>,
    scalar_ts: Vec<Vec<f64>>,
    arc_lo_min: f64,
    arc_hi_max: f64,
    residue_ids: Vec<i64>,
    num_frames: usize,
    num_complete: usize,
}

impl Aggregator {
    pub fn new(output: OutputGridConfig) -> Self {
        Self { output }
    }

    #[instrument(skip_all, name = "aggregation")]
    pub fn run(
        &self,
        stream_path: &Path,
        reporter: &ProgressReporter,
    ) -> Result<AggregatedResults, EngineError> {
        reporter.report(Progress::PhaseStart {
            name: "Aggregating scalar summaries",
        });
        let pass_one = self.pass_one(stream_path)?;
        reporter.report(Progress::PhaseFinish);

        if pass_one.num_complete == 0 {
            return Err(EngineError::Internal(
                "no successfully analyzed frames in the per-frame stream".to_string(),
            ));
        }
        info!(
            frames = pass_one.num_frames,
            complete = pass_one.num_complete,
            "Scalar aggregation finished"
        );

        // common support grid over the union of all pathway extents
        let lo = pass_one.arc_lo_min - self.output.extrap_dist;
        let hi = pass_one.arc_hi_max + self.output.extrap_dist;
        let n = self.output.num_points;
        let step = (hi - lo) / (n - 1) as f64;
        let support_points: Vec<f64> = (0..n).map(|i| lo + i as f64 * step).collect();

        reporter.report(Progress::PhaseStart {
            name: "Forming time averages",
        });
        let results = self.pass_two(stream_path, pass_one, support_points, reporter)?;
        reporter.report(Progress::PhaseFinish);
        Ok(results)
    }

    fn pass_one(&self, stream_path: &Path) -> Result<PassOne, EngineError> {
        let mut state = PassOne {
            time_stamps: Vec::new(),
            scalar_stats: vec![SummaryStatistics::new(); SCALAR_NAMES.len()],
            scalar_ts: vec![Vec::new(); SCALAR_NAMES.len()],
            arc_lo_min: f64::INFINITY,
            arc_hi_max: f64::NEG_INFINITY,
            residue_ids: Vec::new(),
            num_frames: 0,
            num_complete: 0,
        };

        for record in JsonRecordReader::open(stream_path)? {
            let record = record?;
            let ps = &record.path_summary;
            state.num_frames += 1;
            state.time_stamps.push(ps.time_stamp);

            let scalars = [
                ps.arg_min_radius,
                ps.min_radius,
                ps.length,
                ps.volume,
                ps.num_path,
                ps.num_sample,
                ps.arg_min_solvent_density,
                ps.min_solvent_density,
                ps.band_width,
            ];
            if ps.is_complete() {
                state.num_complete += 1;
                for (i, value) in scalars.iter().enumerate() {
                    let v = value.unwrap_or(f64::NAN);
                    if v.is_finite() {
                        state.scalar_stats[i].update(v);
                    }
                    state.scalar_ts[i].push(v);
                }
                state.arc_lo_min = state.arc_lo_min.min(ps.arc_length_lo.unwrap());
                state.arc_hi_max = state.arc_hi_max.max(ps.arc_length_hi.unwrap());
            } else {
                for ts in &mut state.scalar_ts {
                    ts.push(f64::NAN);
                }
            }

            if state.residue_ids.is_empty() && !record.residue_positions.res_id.is_empty() {
                state.residue_ids = record.residue_positions.res_id.clone();
            }
        }

        Ok(state)
    }

    fn pass_two(
        &self,
        stream_path: &Path,
        pass_one: PassOne,
        support_points: Vec<f64>,
        reporter: &ProgressReporter,
    ) -> Result<AggregatedResults, EngineError> {
        let n = support_points.len();
        let nan_row = || vec![f64::NAN; n];

        let mut radius_profile = vec![SummaryStatistics::new(); n];
        let mut density_profile = vec![SummaryStatistics::new(); n];
        let mut energy_profile = vec![SummaryStatistics::new(); n];
        let mut pl_profile = vec![SummaryStatistics::new(); n];
        let mut pf_profile = vec![SummaryStatistics::new(); n];

        let mut radius_ts: Vec<Vec<f64>> = Vec::new();
        let mut density_ts: Vec<Vec<f64>> = Vec::new();
        let mut pl_ts: Vec<Vec<f64>> = Vec::new();
        let mut pf_ts: Vec<Vec<f64>> = Vec::new();

        // energies are anchored where the pathway meets bulk on either side
        let anchor_lo = pass_one.arc_lo_min;
        let anchor_hi = pass_one.arc_hi_max;
        let mut anchor_lo_energy = SummaryStatistics::new();
        let mut anchor_hi_energy = SummaryStatistics::new();

        let residue_index: HashMap<i64, usize> = pass_one
            .residue_ids
            .iter()
            .enumerate()
            .map(|(i, &id)| (id, i))
            .collect();
        let mut residues = ResidueSummaries::with_len(pass_one.residue_ids.len());

        reporter.report(Progress::TaskStart {
            total: pass_one.num_frames as u64,
        });
        for record in JsonRecordReader::open(stream_path)? {
            let record = record?;
            reporter.report(Progress::TaskIncrement { amount: 1 });

            let radius_spline = rebuild_spline(&record.mol_path_radius_spline);
            if !record.path_summary.is_complete() || radius_spline.is_none() {
                if !record.path_summary.is_complete() {
                    warn!(
                        time = record.path_summary.time_stamp,
                        "Skipping failed frame in profile aggregation"
                    );
                }
                radius_ts.push(nan_row());
                density_ts.push(nan_row());
                pl_ts.push(nan_row());
                pf_ts.push(nan_row());
                continue;
            }
            let radius_spline = radius_spline.expect("checked above");
            let num_sample = record.path_summary.num_sample.unwrap_or(0.0) as usize;

            let radius_sample = radius_spline.evaluate_multiple(&support_points, 0);
            SummaryStatistics::update_multiple(&mut radius_profile, &radius_sample);

            // number density and energy on the common grid
            let (density_sample, energy_sample) =
                match rebuild_spline(&record.solvent_density_spline) {
                    Some(density_spline) => {
                        let prob = density_spline.evaluate_multiple(&support_points, 0);
                        let nd =
                            density::number_density_samples(&prob, &radius_sample, num_sample);
                        let en = energy::boltzmann_energies(&nd);
                        (nd, en)
                    }
                    None => (vec![0.0; n], energy::boltzmann_energies(&vec![0.0; n])),
                };
            SummaryStatistics::update_multiple(&mut density_profile, &density_sample);
            SummaryStatistics::update_multiple(&mut energy_profile, &energy_sample);

            // energy at the anchor points by linear interpolation
            let energy_interp = interp::linear_interp_1d(&support_points, &energy_sample)?;
            anchor_lo_energy.update(energy_interp.evaluate(anchor_lo, 0));
            anchor_hi_energy.update(energy_interp.evaluate(anchor_hi, 0));

            let pl_sample = rebuild_spline(&record.pl_hydrophobicity_spline)
                .map(|s| s.evaluate_multiple(&support_points, 0))
                .unwrap_or_else(|| vec![0.0; n]);
            SummaryStatistics::update_multiple(&mut pl_profile, &pl_sample);
            let pf_sample = rebuild_spline(&record.pf_hydrophobicity_spline)
                .map(|s| s.evaluate_multiple(&support_points, 0))
                .unwrap_or_else(|| vec![0.0; n]);
            SummaryStatistics::update_multiple(&mut pf_profile, &pf_sample);

            radius_ts.push(radius_sample);
            density_ts.push(density_sample);
            pl_ts.push(pl_sample);
            pf_ts.push(pf_sample);

            // residue summaries keyed on the first frame's residue ids;
            // residues absent in later frames contribute no update
            let rp = &record.residue_positions;
            for (row, res_id) in rp.res_id.iter().enumerate() {
                let Some(&idx) = residue_index.get(res_id) else {
                    continue;
                };
                residues.s[idx].update(rp.s[row]);
                residues.rho[idx].update(rp.rho[row]);
                residues.phi[idx].update(rp.phi[row]);
                residues.pore_lining[idx].update(rp.pore_lining[row]);
                residues.pore_facing[idx].update(rp.pore_facing[row]);
                residues.pore_radius[idx].update(rp.pore_radius[row]);
                // residue-local number density from the stored probability
                let r = rp.pore_radius[row].max(1e-6);
                residues.solvent_density[idx].update(
                    rp.solvent_density[row] * num_sample as f64 / (std::f64::consts::PI * r * r),
                );
                residues.x[idx].update(rp.x[row]);
                residues.y[idx].update(rp.y[row]);
                residues.z[idx].update(rp.z[row]);
            }
        }
        reporter.report(Progress::TaskFinish);

        // shift the energy profile so the anchor energies average to zero
        let shift = -0.5 * (anchor_lo_energy.mean() + anchor_hi_energy.mean());
        if shift.is_finite() {
            for stat in &mut energy_profile {
                stat.shift(shift);
            }
        }

        Ok(AggregatedResults {
            num_frames: pass_one.num_frames,
            time_stamps: pass_one.time_stamps,
            support_points,
            scalar_summaries: SCALAR_NAMES
                .iter()
                .copied()
                .zip(pass_one.scalar_stats)
                .collect(),
            scalar_time_series: SCALAR_NAMES
                .iter()
                .copied()
                .zip(pass_one.scalar_ts)
                .collect(),
            radius_profile,
            density_profile,
            energy_profile,
            pl_hydrophobicity_profile: pl_profile,
            pf_hydrophobicity_profile: pf_profile,
            radius_profile_ts: radius_ts,
            density_profile_ts: density_ts,
            pl_hydrophobicity_profile_ts: pl_ts,
            pf_hydrophobicity_profile_ts: pf_ts,
            residue_ids: pass_one.residue_ids,
            residue_summaries: residues,
        })
    }
}

/// Re-fits an interpolating spline through a serialized descriptor; `None`
/// when the descriptor is empty or inconsistent.
fn rebuild_spline(data: &SplineData) -> Option<SplineCurve1D> {
    if data.knots.len() < 2 || data.knots.len() != data.ctrl.len() {
        return None;
    }
    interp::cubic_interp_1d(&data.knots, &data.ctrl).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::jsonl::JsonRecordWriter;
    use crate::io::record::{CentreLineSplineData, PerFrameRecord};
    use tempfile::tempdir;

    /// A coherent record for a straight unit-radius pathway on [0, 9].
    fn straight_record(time: f64) -> PerFrameRecord {
        let knots: Vec<f64> = (0..10).map(|k| k as f64).collect();
        let mut record = PerFrameRecord::failure(time);
        record.path_summary.arg_min_radius = Some(4.5);
        record.path_summary.min_radius = Some(1.0);
        record.path_summary.length = Some(9.0);
        record.path_summary.volume = Some(9.0 * std::f64::consts::PI);
        record.path_summary.num_path = Some(4.0);
        record.path_summary.num_sample = Some(6.0);
        record.path_summary.solvent_range_lo = Some(0.0);
        record.path_summary.solvent_range_hi = Some(9.0);
        record.path_summary.arg_min_solvent_density = Some(4.0);
        record.path_summary.min_solvent_density = Some(0.1);
        record.path_summary.arc_length_lo = Some(0.0);
        record.path_summary.arc_length_hi = Some(9.0);
        record.path_summary.band_width = Some(0.25);

        record.mol_path_radius_spline = SplineData {
            knots: knots.clone(),
            ctrl: vec![1.0; 10],
        };
        record.mol_path_centre_line_spline = CentreLineSplineData {
            knots: knots.clone(),
            ctrl_x: knots.clone(),
            ctrl_y: vec![0.0; 10],
            ctrl_z: vec![0.0; 10],
        };
        record.solvent_density_spline = SplineData {
            knots: vec![0.0, 3.0, 6.0, 9.0],
            ctrl: vec![0.08, 0.14, 0.14, 0.08],
        };
        record.pl_hydrophobicity_spline = SplineData {
            knots: vec![0.0, 4.5, 9.0],
            ctrl: vec![0.0, 0.4, 0.0],
        };
        record.pf_hydrophobicity_spline = SplineData {
            knots: vec![0.0, 4.5, 9.0],
            ctrl: vec![0.0, 0.2, 0.0],
        };

        record.residue_positions.res_id = vec![1, 2];
        record.residue_positions.s = vec![2.0, 7.0];
        record.residue_positions.rho = vec![1.1, 1.2];
        record.residue_positions.phi = vec![0.0, 1.0];
        record.residue_positions.pore_lining = vec![1.0, 1.0];
        record.residue_positions.pore_facing = vec![1.0, 0.0];
        record.residue_positions.pore_radius = vec![1.0, 1.0];
        record.residue_positions.solvent_density = vec![0.12, 0.1];
        record.residue_positions.x = vec![2.0, 7.0];
        record.residue_positions.y = vec![1.1, -1.2];
        record.residue_positions.z = vec![0.0, 0.0];
        record
    }

    fn write_stream(records: &[PerFrameRecord]) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stream.json");
        let mut writer = JsonRecordWriter::create(&path).unwrap();
        for record in records {
            writer.write_record(record).unwrap();
        }
        writer.finish().unwrap();
        (dir, path)
    }

    #[test]
    fn identical_frames_average_to_the_per_frame_values_with_zero_variance() {
        let (_dir, path) = write_stream(&[straight_record(0.0), straight_record(1.0)]);
        let aggregator = Aggregator::new(OutputGridConfig {
            num_points: 61,
            extrap_dist: 0.0,
        });
        let results = aggregator.run(&path, &ProgressReporter::new()).unwrap();

        assert_eq!(results.num_frames, 2);
        assert_eq!(results.time_stamps, vec![0.0, 1.0]);

        // every profile value equals the single-frame sample exactly
        let per_frame = &results.radius_profile_ts[0];
        for (stat, value) in results.radius_profile.iter().zip(per_frame) {
            assert_eq!(stat.num(), 2);
            assert_eq!(stat.mean(), *value);
            assert_eq!(stat.var(), 0.0);
        }
        for stat in &results.density_profile {
            assert_eq!(stat.var(), 0.0);
        }

        // scalar summaries match the per-frame scalars with zero spread
        let min_radius = &results.scalar_summaries[1];
        assert_eq!(min_radius.0, "minRadius");
        assert_eq!(min_radius.1.mean(), 1.0);
        assert_eq!(min_radius.1.sd(), 0.0);

        // anchor energies average to zero after the shift
        let energy_mean: Vec<f64> = results.energy_profile.iter().map(|s| s.mean()).collect();
        let energy_interp =
            interp::linear_interp_1d(&results.support_points, &energy_mean).unwrap();
        let anchor_sum = energy_interp.evaluate(0.0, 0) + energy_interp.evaluate(9.0, 0);
        assert!(anchor_sum.abs() < 1e-9, "anchor sum = {anchor_sum}");

        // residue summaries saw both frames
        assert_eq!(results.residue_ids, vec![1, 2]);
        assert_eq!(results.residue_summaries.s[0].num(), 2);
        assert_eq!(results.residue_summaries.pore_facing[1].mean(), 0.0);
    }

    #[test]
    fn failed_frames_are_tolerated_and_skipped() {
        let (_dir, path) = write_stream(&[straight_record(0.0), PerFrameRecord::failure(1.0)]);
        let aggregator = Aggregator::new(OutputGridConfig {
            num_points: 31,
            extrap_dist: 0.5,
        });
        let results = aggregator.run(&path, &ProgressReporter::new()).unwrap();

        assert_eq!(results.num_frames, 2);
        // scalar summaries only saw the complete frame
        assert_eq!(results.scalar_summaries[1].1.num(), 1);
        // the time series keeps a NaN placeholder for the failed frame
        assert!(results.scalar_time_series[1].1[1].is_nan());
        assert!(results.radius_profile_ts[1][0].is_nan());
        // support grid extends the observed bounds by the extrapolation
        assert!((results.support_points[0] + 0.5).abs() < 1e-12);
        assert!((results.support_points.last().unwrap() - 9.5).abs() < 1e-12);
    }

    #[test]
    fn stream_with_no_complete_frames_is_an_error() {
        let (_dir, path) = write_stream(&[PerFrameRecord::failure(0.0)]);
        let aggregator = Aggregator::new(OutputGridConfig::default());
        let result = aggregator.run(&path, &ProgressReporter::new());
        assert!(matches!(result, Err(EngineError::Internal(_))));
    }

    #[test]
    fn residues_missing_in_later_frames_contribute_no_update() {
        let first = straight_record(0.0);
        let mut second = straight_record(1.0);
        // second frame only maps residue 2
        second.residue_positions.res_id = vec![2];
        second.residue_positions.s = vec![7.1];
        second.residue_positions.rho = vec![1.2];
        second.residue_positions.phi = vec![1.0];
        second.residue_positions.pore_lining = vec![1.0];
        second.residue_positions.pore_facing = vec![0.0];
        second.residue_positions.pore_radius = vec![1.0];
        second.residue_positions.solvent_density = vec![0.1];
        second.residue_positions.x = vec![7.1];
        second.residue_positions.y = vec![-1.2];
        second.residue_positions.z = vec![0.0];

        let (_dir, path) = write_stream(&[first, second]);
        let aggregator = Aggregator::new(OutputGridConfig {
            num_points: 31,
            extrap_dist: 0.0,
        });
        let results = aggregator.run(&path, &ProgressReporter::new()).unwrap();

        assert_eq!(results.residue_summaries.s[0].num(), 1);
        assert_eq!(results.residue_summaries.s[1].num(), 2);
    }
}
