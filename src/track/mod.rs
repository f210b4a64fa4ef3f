pub mod clock;
pub mod runner;
pub mod event;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use runner::{
    track, track_with, CycleRecord, LoopConfig, Session, StopReason, TrackError, TrackState,
};
