use std::sync::atomic::AtomicBool;

use marker_servo::io::{csv, json};
use marker_servo::io::json::SessionSummary;
use marker_servo::types::{
    track, LoopConfig, ManualClock, RecordingLink, ScriptFrame, ScriptedSource, TargetFix,
};
use marker_servo::tuning::presets;

/// Scripted approach: the marker drifts in from low-left, blinks out for
/// half a second, and settles near the center.
fn approach_script() -> Vec<ScriptFrame> {
    let mut frames = Vec::new();
    for i in 0..120u32 {
        if (60..75).contains(&i) {
            frames.push(ScriptFrame::Empty);
            continue;
        }
        let f = f64::from(i) / 120.0;
        frames.push(ScriptFrame::Fix(TargetFix {
            cx: 300.0 + 180.0 * f,
            cy: 500.0 - 140.0 * f,
            area: 4000.0 + 6000.0 * f,
        }));
    }
    frames
}

fn main() {
    let profile = presets::tello();
    let config = LoopConfig { max_cycles: Some(120), ..Default::default() };

    let mut source = ScriptedSource::new(approach_script());
    let mut link = RecordingLink::new();
    let mut clock = ManualClock::with_step(0.0, 1.0 / 30.0);
    let stop = AtomicBool::new(false);

    let session = track(&profile, &config, &mut source, &mut link, &mut clock, &stop)
        .expect("recording link never fails");

    std::fs::create_dir_all("out").expect("create out/");
    csv::write_session_file("out/session.csv", &session.records).expect("write csv");

    let summary = SessionSummary::from_records(&session.records);
    json::write_summary_file("out/session.json", &profile, &summary).expect("write json");

    println!("Wrote out/session.csv ({} rows) and out/session.json", session.records.len());
    println!();
    println!("Tracked {} of {} cycles, longest gap {} cycles",
        summary.tracked_cycles, summary.cycles, summary.longest_gap);
    println!("Mean |err|: x {:.1} px, y {:.1} px, area {:.1} px^2",
        summary.mean_abs_err_x, summary.mean_abs_err_y, summary.mean_abs_err_area);

    let head = std::fs::read_to_string("out/session.csv").expect("read back csv");
    println!();
    println!("CSV head:");
    for line in head.lines().take(4) {
        println!("  {}", line);
    }
}
