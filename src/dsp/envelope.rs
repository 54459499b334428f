#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dsp::automation::Automation;

/*
Vocal Envelope
==============

The amplitude shape every note is given. It is a fixed, four-segment curve
written into the gain automation the instant the note is triggered, so it
plays out on its own with no further input.

Vocabulary
----------

  t0          Trigger time of the note on the audio timeline.

  peak        Loudest point, reached at the end of the attack.

  sustain     Level held in the middle of the note. A sung note settles a
              little below its onset.

  floor       Where the exponential release ends. Not zero: an exponential
              curve can only approach silence, never reach it.


The Shape (reference values)
----------------------------

    gain
    0.5 ┤   ╱╲
    0.4 ┤  ╱  ╲______________
        │ ╱                   ╲
        │╱                     ╲___
    0.0 ┼──┬────┬──────────┬──────┬──┬──→ seconds after t0
          0.1  0.4        1.0    1.4 1.5
         attack decay   sustain  release  (voice stops at 1.5)

    attack    linear 0.0 → 0.5    over [t0,       t0 + 0.1]
    decay     linear 0.5 → 0.4    over [t0 + 0.1, t0 + 0.4]
    sustain   held at 0.4         over [t0 + 0.4, t0 + 1.0]
    release   exp.   0.4 → 0.001  over [t0 + 1.0, t0 + 1.4]

The 0.1 s between the end of the release and the voice's auto-stop keeps
the oscillator from being cut while still audible.
*/

/// Breakpoints of the per-note gain curve, as offsets from the trigger time.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopeShape {
    /// Seconds from t0 to the peak.
    pub attack: f64,
    pub peak: f32,
    /// Seconds from t0 to the end of the decay.
    pub decay_end: f64,
    pub sustain: f32,
    /// Seconds from t0 at which the release begins.
    pub release_start: f64,
    /// Seconds from t0 at which the release reaches `floor`.
    pub release_end: f64,
    pub floor: f32,
}

impl EnvelopeShape {
    pub const VOCAL: EnvelopeShape = EnvelopeShape {
        attack: 0.1,
        peak: 0.5,
        decay_end: 0.4,
        sustain: 0.4,
        release_start: 1.0,
        release_end: 1.4,
        floor: 0.001,
    };

    /// Write all four segments into `lane`, anchored at `t0`.
    pub fn schedule(&self, lane: &mut Automation, t0: f64) {
        lane.set_value_at(0.0, t0)
            .linear_ramp_to(self.peak, t0 + self.attack)
            .linear_ramp_to(self.sustain, t0 + self.decay_end)
            .set_value_at(self.sustain, t0 + self.release_start)
            .exponential_ramp_to(self.floor, t0 + self.release_end);
    }

    /// Seconds from t0 until the curve has settled at `floor`.
    pub fn duration(&self) -> f64 {
        self.release_end
    }
}

impl Default for EnvelopeShape {
    fn default() -> Self {
        Self::VOCAL
    }
}
