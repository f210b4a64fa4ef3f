pub mod pid;
pub mod servo;

pub use pid::{InvalidTimestep, PidChannel};
pub use servo::{AxisError, ServoController};
