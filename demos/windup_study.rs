use std::sync::atomic::AtomicBool;

use marker_servo::control::ServoController;
use marker_servo::track::event::{scan, standard_detectors, EventKind};
use marker_servo::types::{
    track_with, LoopConfig, ManualClock, ScriptFrame, ScriptedSource, Session, TargetFix,
    TrackProfile,
};
use marker_servo::tuning::{presets, ProfileBuilder};

/// Off-center target, a two-second dropout, then the target pops back up
/// on the other side. What the loop does next depends on the reacquire
/// policy.
fn dropout_script() -> Vec<ScriptFrame> {
    let before = TargetFix { cx: 380.0, cy: 360.0, area: 10_000.0 };
    let after = TargetFix { cx: 560.0, cy: 360.0, area: 10_000.0 };
    let mut frames = vec![ScriptFrame::Fix(before); 30];
    frames.extend(vec![ScriptFrame::Empty; 60]);
    frames.extend(vec![ScriptFrame::Fix(after); 30]);
    frames
}

fn run(profile: &TrackProfile) -> (Session, ServoController) {
    let mut servo = ServoController::new(profile);
    let mut source = ScriptedSource::new(dropout_script());
    let mut link = marker_servo::actuate::RecordingLink::new();
    let mut clock = ManualClock::with_step(0.0, 1.0 / 30.0);
    let config = LoopConfig { max_cycles: Some(120), ..Default::default() };
    let stop = AtomicBool::new(false);

    let session = track_with(
        profile, &config, &mut servo, &mut source, &mut link, &mut clock, &stop,
    )
    .expect("recording link never fails");
    (session, servo)
}

fn reacquire_yaw(session: &Session) -> f64 {
    let mut detectors = standard_detectors(10);
    let events = scan(&session.records, &mut detectors);
    let cycle = events
        .iter()
        .rev()
        .find(|e| e.kind == EventKind::Acquired)
        .expect("script reacquires")
        .cycle;
    session.records[cycle as usize].command.yaw
}

fn main() {
    println!("=== Integral Carry-over Across a Dropout ===\n");

    let reset = presets::tello();
    let carry = ProfileBuilder::new("Tello (carry-over)")
        .reset_on_reacquire(false)
        .build();

    let (reset_session, reset_servo) = run(&reset);
    let (carry_session, carry_servo) = run(&carry);

    println!("Script: 30 cycles at err_x = +100 px, 60 cycles blind,");
    println!("then 30 cycles at err_x = -80 px.\n");
    println!(
        "{:<24}  {:>16}  {:>20}",
        "policy", "final integral", "yaw on reacquire"
    );
    println!(
        "{:<24}  {:>16.1}  {:>20.2}",
        "reset channels",
        reset_servo.x.integral(),
        reacquire_yaw(&reset_session)
    );
    println!(
        "{:<24}  {:>16.1}  {:>20.2}",
        "carry state over",
        carry_servo.x.integral(),
        reacquire_yaw(&carry_session)
    );

    println!();
    println!("Carrying state keeps the pre-loss integral pushing the wrong");
    println!("way, and the derivative term kicks against the stale previous");
    println!("error. Resetting starts the channel clean on the new fix.");
}
