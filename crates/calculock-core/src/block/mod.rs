mod duration;
mod session;

pub use duration::{BlockDuration, DEFAULT_MINUTES, PRESET_MINUTES};
pub use session::{BlockSession, BlockState, DisplayStatus};
