use std::io::{self, Write};

use crate::track::{CycleRecord, TrackState};
use crate::tuning::TrackProfile;

/// Summary statistics computed from a finished session.
#[derive(Debug, Clone)]
pub struct SessionSummary {
    pub cycles: u64,
    pub duration_s: f64,
    pub tracked_cycles: u64,
    pub tracked_fraction: f64,
    pub acquisitions: u32,
    pub longest_gap: u64,
    pub mean_abs_err_x: f64,
    pub mean_abs_err_y: f64,
    pub mean_abs_err_area: f64,
    pub peak_yaw: f64,
}

impl SessionSummary {
    /// Compute summary from session records. An empty session yields zeros.
    pub fn from_records(records: &[CycleRecord]) -> Self {
        let cycles = records.len() as u64;
        let duration_s = match (records.first(), records.last()) {
            (Some(first), Some(last)) => last.t - first.t,
            _ => 0.0,
        };

        let tracked_cycles = records
            .iter()
            .filter(|r| r.state == TrackState::Tracking)
            .count() as u64;
        let tracked_fraction = if cycles > 0 {
            tracked_cycles as f64 / cycles as f64
        } else {
            0.0
        };

        let mut acquisitions = 0u32;
        let mut prev = TrackState::Searching;
        for r in records {
            if prev == TrackState::Searching && r.state == TrackState::Tracking {
                acquisitions += 1;
            }
            prev = r.state;
        }

        // Longest searching streak after the first acquisition; the lead-in
        // search before any target was ever seen does not count.
        let mut longest_gap = 0u64;
        let mut streak = 0u64;
        let mut armed = false;
        for r in records {
            match r.state {
                TrackState::Tracking => {
                    armed = true;
                    streak = 0;
                }
                TrackState::Searching => {
                    if armed {
                        streak += 1;
                        longest_gap = longest_gap.max(streak);
                    }
                }
            }
        }

        let mut updates = 0u64;
        let (mut sum_x, mut sum_y, mut sum_area) = (0.0, 0.0, 0.0);
        for e in records.iter().filter_map(|r| r.error) {
            updates += 1;
            sum_x += e.x.abs();
            sum_y += e.y.abs();
            sum_area += e.area.abs();
        }
        let denom = if updates > 0 { updates as f64 } else { 1.0 };

        let peak_yaw = records
            .iter()
            .map(|r| r.command.yaw.abs())
            .fold(0.0_f64, f64::max);

        SessionSummary {
            cycles,
            duration_s,
            tracked_cycles,
            tracked_fraction,
            acquisitions,
            longest_gap,
            mean_abs_err_x: sum_x / denom,
            mean_abs_err_y: sum_y / denom,
            mean_abs_err_area: sum_area / denom,
            peak_yaw,
        }
    }
}

/// Write session summary as JSON to a writer.
pub fn write_summary<W: Write>(
    writer: &mut W,
    profile: &TrackProfile,
    summary: &SessionSummary,
) -> io::Result<()> {
    writeln!(writer, "{{")?;
    writeln!(writer, "  \"profile\": {{")?;
    writeln!(writer, "    \"name\": \"{}\",", profile.name)?;
    writeln!(writer, "    \"frame_width\": {},", profile.frame_width)?;
    writeln!(writer, "    \"frame_height\": {},", profile.frame_height)?;
    writeln!(writer, "    \"target_id\": {},", profile.target_id)?;
    writeln!(writer, "    \"target_area\": {:.1}", profile.target_area)?;
    writeln!(writer, "  }},")?;
    writeln!(writer, "  \"session\": {{")?;
    writeln!(writer, "    \"cycles\": {},", summary.cycles)?;
    writeln!(writer, "    \"duration_s\": {:.3},", summary.duration_s)?;
    writeln!(writer, "    \"tracked_cycles\": {},", summary.tracked_cycles)?;
    writeln!(writer, "    \"tracked_fraction\": {:.3},", summary.tracked_fraction)?;
    writeln!(writer, "    \"acquisitions\": {},", summary.acquisitions)?;
    writeln!(writer, "    \"longest_gap_cycles\": {},", summary.longest_gap)?;
    writeln!(writer, "    \"mean_abs_err_x\": {:.3},", summary.mean_abs_err_x)?;
    writeln!(writer, "    \"mean_abs_err_y\": {:.3},", summary.mean_abs_err_y)?;
    writeln!(writer, "    \"mean_abs_err_area\": {:.3},", summary.mean_abs_err_area)?;
    writeln!(writer, "    \"peak_yaw\": {:.3}", summary.peak_yaw)?;
    writeln!(writer, "  }}")?;
    writeln!(writer, "}}")?;
    Ok(())
}

/// Write session summary JSON to a file.
pub fn write_summary_file(
    path: &str,
    profile: &TrackProfile,
    summary: &SessionSummary,
) -> io::Result<()> {
    let mut file = std::fs::File::create(path)?;
    write_summary(&mut file, profile, summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actuate::RcCommand;
    use crate::control::AxisError;
    use crate::tuning::presets;

    fn rec(cycle: u64, state: TrackState, err: Option<AxisError>, yaw: f64) -> CycleRecord {
        CycleRecord {
            cycle,
            t: cycle as f64 * 0.1,
            state,
            error: err,
            command: RcCommand { yaw, ..RcCommand::neutral() },
        }
    }

    fn mixed_session() -> Vec<CycleRecord> {
        use TrackState::{Searching as S, Tracking as T};
        vec![
            rec(0, S, None, 0.0),
            rec(1, T, Some(AxisError { x: 100.0, y: 0.0, area: 0.0 }), -25.0),
            rec(2, T, Some(AxisError { x: -50.0, y: 10.0, area: 0.0 }), 12.5),
            rec(3, S, None, 0.0),
            rec(4, S, None, 0.0),
            rec(5, T, Some(AxisError { x: 0.0, y: 0.0, area: 0.0 }), 0.0),
        ]
    }

    #[test]
    fn summary_counts_tracking_and_gaps() {
        let s = SessionSummary::from_records(&mixed_session());
        assert_eq!(s.cycles, 6);
        assert!((s.duration_s - 0.5).abs() < 1e-12);
        assert_eq!(s.tracked_cycles, 3);
        assert_eq!(s.acquisitions, 2);
        assert_eq!(s.longest_gap, 2);
        assert!((s.mean_abs_err_x - 50.0).abs() < 1e-9);
        assert!((s.peak_yaw - 25.0).abs() < 1e-9);
    }

    #[test]
    fn empty_session_summarizes_to_zeros() {
        let s = SessionSummary::from_records(&[]);
        assert_eq!(s.cycles, 0);
        assert_eq!(s.duration_s, 0.0);
        assert_eq!(s.acquisitions, 0);
        assert_eq!(s.mean_abs_err_x, 0.0);
    }

    #[test]
    fn json_output_is_valid() {
        let summary = SessionSummary::from_records(&mixed_session());
        let profile = presets::tello();

        let mut buf = Vec::new();
        write_summary(&mut buf, &profile, &summary).unwrap();
        let json = String::from_utf8(buf).unwrap();
        assert!(json.contains("\"profile\""));
        assert!(json.contains("\"tracked_fraction\""));
        assert!(json.contains("\"Tello Follow\""));
    }
}
