//! Frame timing and render statistics.

mod frame_clock;
mod stats;

pub use frame_clock::{FrameClock, FrameTime};
pub use stats::RenderStats;
