pub mod gains;
pub mod profile;

pub use gains::ChannelGains;
pub use profile::{presets, ProfileBuilder, TrackProfile};
