//! Low-level DSP primitives used by the higher level graph nodes.
//!
//! Everything in here works on caller-provided slices and never allocates
//! while rendering, so it can run inside the audio callback.

/// Breakpoint automation with set/linear/exponential segments.
pub mod automation;
/// The fixed per-note gain curve.
pub mod envelope;
/// Two-pole TPT low-pass filter.
pub mod filter;
/// Control-rate modulation helpers.
pub mod modulate;
/// Phase-accumulator oscillators (sine, band-limited saw).
pub mod oscillator;

pub use automation::{Automation, Breakpoint, Ramp};
pub use envelope::EnvelopeShape;
