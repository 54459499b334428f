pub mod player;
pub mod sequence;

pub use player::{PlayerState, SequencePlayer};
pub use sequence::{Sequence, DEFAULT_INTERVAL};
