pub mod actuate;
pub mod vision;
pub mod tuning;
pub mod control;
pub mod track;
pub mod io;

// Flat re-exports so bins and demos can pull the common set in one import
pub mod types {
    pub use crate::actuate::{ActuatorLink, DispatchError, RcCommand, RecordingLink, AXIS_LIMIT};
    pub use crate::control::{AxisError, InvalidTimestep, PidChannel, ServoController};
    pub use crate::track::{
        track, track_with, Clock, CycleRecord, LoopConfig, ManualClock, MonotonicClock, Session,
        StopReason, TrackError, TrackState,
    };
    pub use crate::tuning::{presets, ChannelGains, ProfileBuilder, TrackProfile};
    pub use crate::vision::{
        select_target, AcquisitionError, DetectionSource, MarkerSighting, ScriptFrame,
        ScriptedSource, TargetFix,
    };
}
