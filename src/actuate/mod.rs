pub mod command;
pub mod link;

pub use command::{RcCommand, AXIS_LIMIT};
pub use link::{ActuatorLink, DispatchError, RecordingLink};
