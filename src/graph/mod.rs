//! Composable building blocks for constructing audio-processing graphs.
//!
//! Graph nodes wrap the low-level DSP primitives with what a voice needs:
//! block rendering against the timeline, note-on resets and modulation. The
//! `extensions` module adds fluent helpers so a voice chain reads left to
//! right, source first.

/// Multiply two signals together (amplitude control).
pub mod amplify;
/// Envelope node rendering a scheduled gain curve.
pub mod envelope;
/// Fluent combinators (`.amplify()`, `.through()`, `.modulate()`).
pub mod extensions;
/// Low-pass filter node.
pub mod filter;
/// Low frequency oscillators for parameter modulation.
pub mod lfo;
/// Connect modulation sources to node parameters.
pub mod modulate;
/// Core traits shared by all graph nodes.
pub mod node;
/// Audio-band oscillators.
pub mod oscillator;
/// Serial chaining of two nodes (source → effect).
pub mod through;
