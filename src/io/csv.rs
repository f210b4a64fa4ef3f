use std::io::{self, Write};

use crate::track::{CycleRecord, TrackState};

fn state_label(state: TrackState) -> &'static str {
    match state {
        TrackState::Searching => "searching",
        TrackState::Tracking => "tracking",
    }
}

/// Write session records to CSV format.
///
/// Columns: cycle, t, state, err_x, err_y, err_area,
///          lateral, longitudinal, vertical, yaw
///
/// The error columns are blank on cycles where no PID update ran
/// (searching, or a rejected timestep).
pub fn write_session<W: Write>(writer: &mut W, records: &[CycleRecord]) -> io::Result<()> {
    writeln!(
        writer,
        "cycle,t,state,err_x,err_y,err_area,lateral,longitudinal,vertical,yaw"
    )?;

    for r in records {
        let (ex, ey, ea) = match r.error {
            Some(e) => (
                format!("{:.3}", e.x),
                format!("{:.3}", e.y),
                format!("{:.3}", e.area),
            ),
            None => (String::new(), String::new(), String::new()),
        };
        writeln!(
            writer,
            "{},{:.4},{},{},{},{},{:.4},{:.4},{:.4},{:.4}",
            r.cycle,
            r.t,
            state_label(r.state),
            ex, ey, ea,
            r.command.lateral,
            r.command.longitudinal,
            r.command.vertical,
            r.command.yaw,
        )?;
    }

    Ok(())
}

/// Write session records to a CSV file at the given path.
pub fn write_session_file(path: &str, records: &[CycleRecord]) -> io::Result<()> {
    let mut file = std::fs::File::create(path)?;
    write_session(&mut file, records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actuate::RcCommand;
    use crate::control::AxisError;

    #[test]
    fn csv_output_has_header_and_rows() {
        let records = vec![
            CycleRecord {
                cycle: 0,
                t: 0.0,
                state: TrackState::Searching,
                error: None,
                command: RcCommand::neutral(),
            },
            CycleRecord {
                cycle: 1,
                t: 0.0333,
                state: TrackState::Tracking,
                error: Some(AxisError { x: 100.0, y: -20.0, area: 500.0 }),
                command: RcCommand { lateral: 0.0, longitudinal: 1.5, vertical: -0.4, yaw: -25.0 },
            },
        ];

        let mut buf = Vec::new();
        write_session(&mut buf, &records).unwrap();
        let output = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = output.lines().collect();

        assert!(lines[0].starts_with("cycle,"));
        assert_eq!(lines.len(), 3); // header + 2 data rows
        assert!(lines[1].contains("searching"));
        assert!(lines[2].contains("tracking"));
    }

    #[test]
    fn searching_rows_leave_error_cells_blank() {
        let records = vec![CycleRecord {
            cycle: 0,
            t: 0.0,
            state: TrackState::Searching,
            error: None,
            command: RcCommand::neutral(),
        }];

        let mut buf = Vec::new();
        write_session(&mut buf, &records).unwrap();
        let output = String::from_utf8(buf).unwrap();
        let row = output.lines().nth(1).unwrap();

        assert!(row.contains(",searching,,,,"), "err_x/err_y/err_area must be empty");
    }
}
