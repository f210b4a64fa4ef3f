pub mod marker;
pub mod source;

pub use marker::{select_target, MarkerSighting, TargetFix};
pub use source::{AcquisitionError, DetectionSource, ScriptFrame, ScriptedSource};
