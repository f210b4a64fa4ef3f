use std::sync::atomic::AtomicBool;

use nalgebra::Point2;

use marker_servo::io::json::SessionSummary;
use marker_servo::types::{
    select_target, track, AcquisitionError, ActuatorLink, DetectionSource, DispatchError,
    LoopConfig, ManualClock, MarkerSighting, ProfileBuilder, RcCommand, TargetFix,
};

/// Detection feed that sees whole frames of tagged markers and picks the
/// one we follow, the way a real detector output looks.
struct FrameFeed {
    frames: Vec<Vec<MarkerSighting>>,
    next: usize,
    target_id: u32,
}

impl DetectionSource for FrameFeed {
    fn detect(&mut self) -> Result<Option<TargetFix>, AcquisitionError> {
        let frame = match self.frames.get(self.next) {
            Some(frame) => frame,
            None => return Ok(None),
        };
        self.next += 1;
        Ok(select_target(frame, self.target_id).map(MarkerSighting::fix))
    }

    fn name(&self) -> &str {
        "frame feed"
    }
}

/// Link that narrates every non-neutral command instead of flying anything.
struct ConsoleLink {
    dispatched: u32,
}

impl ActuatorLink for ConsoleLink {
    fn send(&mut self, command: RcCommand) -> Result<(), DispatchError> {
        self.dispatched += 1;
        if !command.is_neutral() {
            println!(
                "  rc -> long {:+7.2}  vert {:+7.2}  yaw {:+7.2}",
                command.longitudinal, command.vertical, command.yaw
            );
        }
        Ok(())
    }

    fn shutdown(&mut self) {
        println!("  link closed after {} commands", self.dispatched);
    }

    fn name(&self) -> &str {
        "console"
    }
}

fn square(id: u32, cx: f64, cy: f64, half: f64) -> MarkerSighting {
    MarkerSighting {
        id,
        corners: [
            Point2::new(cx - half, cy - half),
            Point2::new(cx + half, cy - half),
            Point2::new(cx + half, cy + half),
            Point2::new(cx - half, cy + half),
        ],
    }
}

fn main() {
    let profile = ProfileBuilder::new("Bench rig")
        .frame(960.0, 720.0)
        .target_id(3)
        .target_area(10_000.0)
        .build();

    // Hand-built detector frames: clutter tags, our tag easing toward the
    // center, one frame with a duplicate id (the later sighting wins), and
    // a blink at the end.
    let frames = vec![
        vec![],
        vec![square(7, 150.0, 600.0, 30.0)],
        vec![square(7, 150.0, 600.0, 30.0), square(3, 700.0, 250.0, 40.0)],
        vec![square(3, 650.0, 280.0, 42.0)],
        vec![square(3, 610.0, 300.0, 43.0), square(3, 580.0, 315.0, 44.0)],
        vec![square(3, 560.0, 325.0, 45.0)],
        vec![square(3, 530.0, 340.0, 47.0)],
        vec![],
        vec![square(3, 505.0, 350.0, 49.0)],
        vec![square(3, 482.0, 358.0, 50.0)],
    ];
    let cycles = frames.len() as u64;

    let mut source = FrameFeed { frames, next: 0, target_id: profile.target_id };
    let mut link = ConsoleLink { dispatched: 0 };
    let mut clock = ManualClock::with_step(0.0, 1.0 / 30.0);
    let config = LoopConfig { max_cycles: Some(cycles), ..Default::default() };
    let stop = AtomicBool::new(false);

    println!("Tracking '{}' through {} frames...", profile.name, cycles);
    let session = track(&profile, &config, &mut source, &mut link, &mut clock, &stop)
        .expect("console link never fails");

    let summary = SessionSummary::from_records(&session.records);
    println!();
    println!("Tracked {} of {} cycles ({:.0}%)",
        summary.tracked_cycles, summary.cycles, 100.0 * summary.tracked_fraction);
    println!("Acquisitions: {}", summary.acquisitions);
    println!("Mean |err_x|: {:.1} px", summary.mean_abs_err_x);
}
