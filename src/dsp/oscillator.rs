use std::f32::consts::TAU;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::graph::node::RenderCtx;

/*
Phase Accumulator
=================

Every periodic waveform is a function of *phase*: how far through one cycle
we are, as a fraction in [0, 1). Each sample the phase advances by

    increment = frequency / sample_rate

and wraps back below 1.0. The waveform then maps phase to amplitude:

    sine:  sin(2π · phase)
    saw:   2 · phase − 1          (ramps −1 → +1, then snaps back)

A sample is computed from the phase *before* advancing, so sample n of a
fresh oscillator is exactly waveform(n · increment).


Aliasing and PolyBLEP
---------------------

The naive saw has an instantaneous drop once per cycle. That jump contains
energy at every frequency, including far above Nyquist (sample_rate / 2),
and those components fold back down as inharmonic "aliasing" whine. It is
worst on high notes.

PolyBLEP (polynomial band-limited step) subtracts a small polynomial
correction in the one sample on each side of the jump, rounding the corner
enough to push most of that energy back under Nyquist:

    just after the wrap  (phase < inc):       t = phase / inc
                                              corr = 2t − t² − 1
    just before the wrap (phase > 1 − inc):   t = (phase − 1) / inc
                                              corr = t² + 2t + 1

    saw = (2 · phase − 1) − corr

Outside those two samples the correction is zero, so the cost is a pair of
comparisons per sample.
*/

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OscillatorWaveform {
    Sine,
    Saw,
}

#[derive(Debug, Clone)]
pub struct OscillatorBlock {
    waveform: OscillatorWaveform,
    phase: f32,
}

impl OscillatorBlock {
    pub fn new(waveform: OscillatorWaveform) -> Self {
        Self {
            waveform,
            phase: 0.0,
        }
    }

    pub fn sine() -> Self {
        Self::new(OscillatorWaveform::Sine)
    }

    pub fn sawtooth() -> Self {
        Self::new(OscillatorWaveform::Saw)
    }

    pub fn waveform(&self) -> OscillatorWaveform {
        self.waveform
    }

    pub fn reset(&mut self) {
        self.phase = 0.0;
    }

    /// Fill `out` at `ctx.frequency`, continuing from the current phase.
    pub fn render(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        let increment = (ctx.frequency / ctx.sample_rate).clamp(0.0, 0.5);

        match self.waveform {
            OscillatorWaveform::Sine => {
                for sample in out.iter_mut() {
                    *sample = (TAU * self.phase).sin();
                    self.advance(increment);
                }
            }
            OscillatorWaveform::Saw => {
                for sample in out.iter_mut() {
                    let naive = 2.0 * self.phase - 1.0;
                    *sample = naive - poly_blep(self.phase, increment);
                    self.advance(increment);
                }
            }
        }
    }

    #[inline]
    fn advance(&mut self, increment: f32) {
        self.phase += increment;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }
    }
}

#[inline]
fn poly_blep(phase: f32, increment: f32) -> f32 {
    if increment <= 0.0 {
        return 0.0;
    }
    if phase < increment {
        let t = phase / increment;
        2.0 * t - t * t - 1.0
    } else if phase > 1.0 - increment {
        let t = (phase - 1.0) / increment;
        t * t + 2.0 * t + 1.0
    } else {
        0.0
    }
}
