use std::cell::RefCell;
use std::process;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use marker_servo::io::json::SessionSummary;
use marker_servo::track::event::{scan, standard_detectors};
use marker_servo::types::{
    track, AcquisitionError, ActuatorLink, DetectionSource, DispatchError, LoopConfig,
    ManualClock, RcCommand, TargetFix, TrackState,
};
use marker_servo::tuning::presets;

const DT: f64 = 1.0 / 30.0;
const CYCLES: u64 = 600;

// ---------------------------------------------------------------------------
// Synthetic scene: a drifting marker that reacts to the commands we send
// ---------------------------------------------------------------------------

/// Toy camera/vehicle dynamics closing the loop without hardware. Commands
/// pan, climb, and advance the camera; the marker wanders on its own and
/// disappears behind an occlusion for a stretch mid-session.
struct ScenePlant {
    cx: f64,
    cy: f64,
    area: f64,
    t: f64,
    cycle: u64,
    occlusion: std::ops::Range<u64>,
}

impl ScenePlant {
    fn new() -> Self {
        Self {
            // Start low-left and far away.
            cx: 320.0,
            cy: 260.0,
            area: 4200.0,
            t: 0.0,
            cycle: 0,
            occlusion: 200..260,
        }
    }

    fn observe(&self) -> Option<TargetFix> {
        if self.occlusion.contains(&self.cycle) {
            return None;
        }
        Some(TargetFix { cx: self.cx, cy: self.cy, area: self.area })
    }

    fn apply(&mut self, cmd: RcCommand) {
        // Camera response: clockwise yaw pans the scene left, ascending
        // pushes it down the image, advancing grows the marker.
        self.cx -= 4.0 * cmd.yaw * DT;
        self.cy += 4.0 * cmd.vertical * DT;
        self.area += 600.0 * cmd.longitudinal * DT;

        // The marker wanders on its own.
        self.cx += 30.0 * (0.7 * self.t).sin() * DT;
        self.cy += 20.0 * (0.9 * self.t).cos() * DT;

        self.area = self.area.max(1.0);
        self.t += DT;
        self.cycle += 1;
    }
}

struct SceneSource(Rc<RefCell<ScenePlant>>);

impl DetectionSource for SceneSource {
    fn detect(&mut self) -> Result<Option<TargetFix>, AcquisitionError> {
        Ok(self.0.borrow().observe())
    }

    fn name(&self) -> &str {
        "synthetic scene"
    }
}

struct SceneLink(Rc<RefCell<ScenePlant>>);

impl ActuatorLink for SceneLink {
    fn send(&mut self, command: RcCommand) -> Result<(), DispatchError> {
        self.0.borrow_mut().apply(command);
        Ok(())
    }

    fn shutdown(&mut self) {
        // Nothing to power down in a synthetic scene.
    }

    fn name(&self) -> &str {
        "scene dynamics"
    }
}

fn main() {
    env_logger::init();

    // -----------------------------------------------------------------------
    // Stop flag, raised by Ctrl-C
    // -----------------------------------------------------------------------
    let stop = Arc::new(AtomicBool::new(false));
    {
        let stop = Arc::clone(&stop);
        if let Err(e) = ctrlc::set_handler(move || stop.store(true, Ordering::Relaxed)) {
            eprintln!("could not install Ctrl-C handler: {}", e);
        }
    }

    // -----------------------------------------------------------------------
    // Run the loop against the synthetic scene
    // -----------------------------------------------------------------------
    let profile = presets::tello();
    let config = LoopConfig { max_cycles: Some(CYCLES), ..Default::default() };

    let plant = Rc::new(RefCell::new(ScenePlant::new()));
    let mut source = SceneSource(Rc::clone(&plant));
    let mut link = SceneLink(Rc::clone(&plant));
    let mut clock = ManualClock::with_step(0.0, DT);

    let session = match track(&profile, &config, &mut source, &mut link, &mut clock, &stop) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("tracking failed: {}", e);
            process::exit(1);
        }
    };

    // -----------------------------------------------------------------------
    // Report
    // -----------------------------------------------------------------------
    println!();
    println!("====================================================================");
    println!("  MARKER SERVO — {}", profile.name);
    println!("====================================================================");
    println!();
    println!("  Profile");
    println!("  ──────────────────────────────────────────────────────────────────");
    println!(
        "  Frame:        {:>4.0} x {:<4.0} px   Center:      ({:.0}, {:.0})",
        profile.frame_width,
        profile.frame_height,
        profile.center_x(),
        profile.center_y()
    );
    println!(
        "  Target id:    {:<6}          Target area: {:.0} px^2",
        profile.target_id, profile.target_area
    );
    println!(
        "  Gains x/y:    kp {:.3}  ki {:.4}  kd {:.3}",
        profile.gains_x.kp, profile.gains_x.ki, profile.gains_x.kd
    );
    println!(
        "  Gains area:   kp {:.3}  ki {:.4}  kd {:.3}",
        profile.gains_area.kp, profile.gains_area.ki, profile.gains_area.kd
    );
    println!(
        "  Reacquire:    {}",
        if profile.reset_on_reacquire { "reset channels" } else { "carry state over" }
    );
    println!();

    println!("  Session Events");
    println!("  ──────────────────────────────────────────────────────────────────");
    let mut detectors = standard_detectors(10);
    let events = scan(&session.records, &mut detectors);
    if events.is_empty() {
        println!("  (none)");
    }
    for event in &events {
        println!("  {}", event);
    }
    println!();

    // -----------------------------------------------------------------------
    // Cycle table (sampled)
    // -----------------------------------------------------------------------
    println!("  Cycles");
    println!("  ──────────────────────────────────────────────────────────────────");
    println!(
        "  {:>6}  {:>7}  {:>6}  {:>8}  {:>8}  {:>9}  {:>7}  {:>7}  {:>7}",
        "cycle", "t (s)", "state", "err_x", "err_y", "err_area", "yaw", "vert", "long"
    );
    println!("  {}", "─".repeat(76));

    let sample_interval = (session.records.len() / 30).max(1);
    for (i, r) in session.records.iter().enumerate() {
        let flipped = i > 0 && session.records[i - 1].state != r.state;
        let print = i % sample_interval == 0 || flipped || i == session.records.len() - 1;
        if !print {
            continue;
        }

        let state = match r.state {
            TrackState::Searching => "SEARCH",
            TrackState::Tracking => "TRACK",
        };
        match r.error {
            Some(e) => println!(
                "  {:>6}  {:>7.2}  {:>6}  {:>8.1}  {:>8.1}  {:>9.1}  {:>7.2}  {:>7.2}  {:>7.2}",
                r.cycle, r.t, state, e.x, e.y, e.area,
                r.command.yaw, r.command.vertical, r.command.longitudinal
            ),
            None => println!(
                "  {:>6}  {:>7.2}  {:>6}  {:>8}  {:>8}  {:>9}  {:>7.2}  {:>7.2}  {:>7.2}",
                r.cycle, r.t, state, "-", "-", "-",
                r.command.yaw, r.command.vertical, r.command.longitudinal
            ),
        }
    }
    println!();

    // -----------------------------------------------------------------------
    // Summary
    // -----------------------------------------------------------------------
    let summary = SessionSummary::from_records(&session.records);
    println!("  Summary");
    println!("  ──────────────────────────────────────────────────────────────────");
    println!(
        "  Cycles:        {:>6}         Duration:     {:>7.2} s",
        summary.cycles, summary.duration_s
    );
    println!(
        "  Tracked:       {:>6} cycles  ({:.1}%)",
        summary.tracked_cycles,
        100.0 * summary.tracked_fraction
    );
    println!(
        "  Acquisitions:  {:>6}         Longest gap:  {:>7} cycles",
        summary.acquisitions, summary.longest_gap
    );
    println!(
        "  Mean |err|:    x {:>6.1} px   y {:>6.1} px   area {:>8.1} px^2",
        summary.mean_abs_err_x, summary.mean_abs_err_y, summary.mean_abs_err_area
    );
    println!("  Peak |yaw|:    {:>6.1}", summary.peak_yaw);
    println!();
    println!(
        "  Session: {} cycles at {:.1} Hz ({:?})",
        session.records.len(),
        1.0 / DT,
        session.reason
    );
    println!("====================================================================");
    println!();
}
