//! The audio timeline: sample clock, scheduled cues, voices and output.

pub mod context;
pub mod output;
pub mod scheduler;

pub use context::{AudioContext, TimerHandler, TimerId};
pub use output::{OutputDevice, RenderSource};
pub use scheduler::{CueId, Timeline};
