// Purpose - boundaries to processes outside the synth

#[cfg(feature = "serde")]
pub mod generation;
