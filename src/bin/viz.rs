use std::cell::RefCell;
use std::process;
use std::rc::Rc;
use std::sync::atomic::AtomicBool;

use eframe::egui;
use egui_plot::{Line, Plot, PlotPoints};

use marker_servo::io::json::SessionSummary;
use marker_servo::track::{CycleRecord, Session};
use marker_servo::tuning::{presets, TrackProfile};
use marker_servo::types::{
    track, AcquisitionError, ActuatorLink, DetectionSource, DispatchError, LoopConfig,
    ManualClock, RcCommand, TargetFix,
};

const DT: f64 = 1.0 / 30.0;

fn main() -> eframe::Result {
    let profile = presets::tello();
    let session = match canned_session(&profile) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("tracking failed: {}", e);
            process::exit(1);
        }
    };

    let app = ServoViz { profile, session };
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1200.0, 800.0]),
        ..Default::default()
    };
    eframe::run_native("Marker Servo", options, Box::new(|_| Ok(Box::new(app))))
}

// ---------------------------------------------------------------------------
// Canned scene to plot: approach, mid-run occlusion, reacquire
// ---------------------------------------------------------------------------

struct CannedScene {
    cx: f64,
    cy: f64,
    area: f64,
    t: f64,
    cycle: u64,
}

impl CannedScene {
    fn observe(&self) -> Option<TargetFix> {
        // The marker ducks out of view for two seconds mid-run.
        if (240..300).contains(&self.cycle) {
            return None;
        }
        Some(TargetFix { cx: self.cx, cy: self.cy, area: self.area })
    }

    fn apply(&mut self, cmd: RcCommand) {
        self.cx -= 4.0 * cmd.yaw * DT;
        self.cy += 4.0 * cmd.vertical * DT;
        self.area += 600.0 * cmd.longitudinal * DT;

        self.cx += 25.0 * (0.6 * self.t).sin() * DT;
        self.cy += 18.0 * (0.8 * self.t).cos() * DT;

        self.area = self.area.max(1.0);
        self.t += DT;
        self.cycle += 1;
    }
}

struct SceneSource(Rc<RefCell<CannedScene>>);

impl DetectionSource for SceneSource {
    fn detect(&mut self) -> Result<Option<TargetFix>, AcquisitionError> {
        Ok(self.0.borrow().observe())
    }
}

struct SceneLink(Rc<RefCell<CannedScene>>);

impl ActuatorLink for SceneLink {
    fn send(&mut self, command: RcCommand) -> Result<(), DispatchError> {
        self.0.borrow_mut().apply(command);
        Ok(())
    }

    fn shutdown(&mut self) {}
}

fn canned_session(
    profile: &TrackProfile,
) -> Result<Session, marker_servo::track::TrackError> {
    let scene = Rc::new(RefCell::new(CannedScene {
        cx: 700.0,
        cy: 220.0,
        area: 3200.0,
        t: 0.0,
        cycle: 0,
    }));
    let mut source = SceneSource(Rc::clone(&scene));
    let mut link = SceneLink(Rc::clone(&scene));
    let mut clock = ManualClock::with_step(0.0, DT);
    let config = LoopConfig { max_cycles: Some(900), ..Default::default() };
    let stop = AtomicBool::new(false);
    track(profile, &config, &mut source, &mut link, &mut clock, &stop)
}

// ---------------------------------------------------------------------------
// Plots
// ---------------------------------------------------------------------------

struct ServoViz {
    profile: TrackProfile,
    session: Session,
}

impl eframe::App for ServoViz {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let records = &self.session.records;
        let step = (records.len() / 2000).max(1);
        let sampled: Vec<&CycleRecord> = records.iter().step_by(step).collect();

        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.heading(format!("Profile: {}", self.profile.name));
            let summary = SessionSummary::from_records(records);
            ui.label(format!(
                "Cycles: {}  |  Tracked: {:.1}%  |  Acquisitions: {}  |  Longest gap: {} cycles  |  Peak |yaw|: {:.1}",
                summary.cycles,
                100.0 * summary.tracked_fraction,
                summary.acquisitions,
                summary.longest_gap,
                summary.peak_yaw,
            ));
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            let available = ui.available_size();
            let half_w = available.x / 2.0 - 8.0;
            let half_h = available.y / 2.0 - 8.0;

            ui.horizontal(|ui| {
                // Pixel error vs Time
                ui.vertical(|ui| {
                    ui.label("Pixel Error (px)");
                    let err_x: PlotPoints = sampled.iter()
                        .filter_map(|r| r.error.map(|e| [r.t, e.x]))
                        .collect();
                    let err_y: PlotPoints = sampled.iter()
                        .filter_map(|r| r.error.map(|e| [r.t, e.y]))
                        .collect();
                    Plot::new("pixel_error")
                        .width(half_w)
                        .height(half_h)
                        .x_axis_label("Time (s)")
                        .show(ui, |plot_ui| {
                            plot_ui.line(Line::new("err_x", err_x));
                            plot_ui.line(Line::new("err_y", err_y));
                        });
                });

                // Area error vs Time
                ui.vertical(|ui| {
                    ui.label("Area Error (px^2)");
                    let points: PlotPoints = sampled.iter()
                        .filter_map(|r| r.error.map(|e| [r.t, e.area]))
                        .collect();
                    Plot::new("area_error")
                        .width(half_w)
                        .height(half_h)
                        .x_axis_label("Time (s)")
                        .show(ui, |plot_ui| {
                            plot_ui.line(Line::new("err_area", points));
                        });
                });
            });

            ui.horizontal(|ui| {
                // Commands vs Time
                ui.vertical(|ui| {
                    ui.label("Commands");
                    let yaw: PlotPoints = sampled.iter()
                        .map(|r| [r.t, r.command.yaw])
                        .collect();
                    let vertical: PlotPoints = sampled.iter()
                        .map(|r| [r.t, r.command.vertical])
                        .collect();
                    let longitudinal: PlotPoints = sampled.iter()
                        .map(|r| [r.t, r.command.longitudinal])
                        .collect();
                    Plot::new("commands")
                        .width(half_w)
                        .height(half_h)
                        .x_axis_label("Time (s)")
                        .show(ui, |plot_ui| {
                            plot_ui.line(Line::new("yaw", yaw));
                            plot_ui.line(Line::new("vertical", vertical));
                            plot_ui.line(Line::new("longitudinal", longitudinal));
                        });
                });

                // Marker path across the frame
                ui.vertical(|ui| {
                    ui.label("Marker Path (frame px)");
                    let cx = self.profile.center_x();
                    let cy = self.profile.center_y();
                    let points: PlotPoints = sampled.iter()
                        .filter_map(|r| r.error.map(|e| [cx - e.x, cy - e.y]))
                        .collect();
                    Plot::new("marker_path")
                        .width(half_w)
                        .height(half_h)
                        .x_axis_label("cx (px)")
                        .data_aspect(1.0)
                        .show(ui, |plot_ui| {
                            plot_ui.line(Line::new("marker", points));
                        });
                });
            });
        });
    }
}
