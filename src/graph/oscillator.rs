use crate::dsp::oscillator::OscillatorBlock;
use crate::graph::node::{GraphNode, Modulatable, RenderCtx};

/*
Audio Oscillator
================

The oscillator is the sound source of a voice: it repeats one waveform at
the note's pitch and everything downstream only shapes that raw material.

Waveform Types and Their Character:
-----------------------------------

Sine: a single frequency with no harmonics.
  - Sound: Smooth, hollow, flute-like
  - Use here: the vibrato LFO

Sawtooth: every harmonic, falling off as 1/n.
  - Sound: Bright, buzzy, reedy
  - Use here: the voice source. Its dense harmonic series is what the
    low-pass filter carves into a softer, throat-like tone.

What are Harmonics?
-------------------
Playing A4 (440 Hz) on a sawtooth gives:
  1st (fundamental): 440 Hz  - the pitch you hear
  2nd harmonic:      880 Hz  - one octave up
  3rd harmonic:      1320 Hz - octave + fifth
  4th harmonic:      1760 Hz - two octaves up   ← filter cutoff (4 × f)
  5th and above:     rolled off at 12 dB/octave

Frequency Source
----------------

By default the node plays `ctx.frequency`. A voice pins its own pitch with
`with_frequency`, which also makes the frequency modulatable:

  let osc = OscNode::sawtooth()
      .with_frequency(440.0)
      .modulate(LfoNode::sine(5.5), OscParam::Frequency, 5.0);
*/

pub struct OscNode {
    osc: OscillatorBlock,
    /// Fixed frequency (Hz). If Some, ignores ctx.frequency and uses this instead.
    base_frequency: Option<f32>,
    /// Current frequency after modulation (only used when base_frequency is Some)
    current_frequency: f32,
}

/// Parameters that can be modulated on an oscillator
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OscParam {
    /// Oscillator frequency in Hz
    Frequency,
}

impl OscNode {
    fn new(osc: OscillatorBlock) -> Self {
        Self {
            osc,
            base_frequency: None,
            current_frequency: 440.0,
        }
    }

    pub fn sine() -> Self {
        Self::new(OscillatorBlock::sine())
    }

    pub fn sawtooth() -> Self {
        Self::new(OscillatorBlock::sawtooth())
    }

    /// Set a fixed frequency, ignoring the pitch carried by the RenderCtx.
    pub fn with_frequency(mut self, freq: f32) -> Self {
        self.base_frequency = Some(freq);
        self.current_frequency = freq;
        self
    }

    /// Frequency the next block will be rendered at, if pinned.
    pub fn frequency(&self) -> Option<f32> {
        self.base_frequency.map(|_| self.current_frequency)
    }
}

impl GraphNode for OscNode {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        let frequency = if self.base_frequency.is_some() {
            self.current_frequency
        } else {
            ctx.frequency
        };

        let modified_ctx = RenderCtx { frequency, ..*ctx };
        self.osc.render(out, &modified_ctx);
    }

    fn note_on(&mut self, _ctx: &RenderCtx) {
        self.osc.reset();
        if let Some(base) = self.base_frequency {
            self.current_frequency = base;
        }
    }
}

impl Modulatable for OscNode {
    type Param = OscParam;

    fn get_param(&self, param: Self::Param) -> f32 {
        match param {
            OscParam::Frequency => self.base_frequency.unwrap_or(440.0),
        }
    }

    fn apply_modulation(&mut self, param: Self::Param, base: f32, modulation: f32) {
        match param {
            OscParam::Frequency => {
                // Clamp to audible range (20 Hz - 20 kHz)
                self.current_frequency = (base + modulation).clamp(20.0, 20_000.0);
            }
        }
    }
}
