//! Engine and voice configuration.
//!
//! `Default` gives the reference voice: a filtered sawtooth with a 5.5 Hz
//! vibrato and the vocal gain envelope, lasting 1.5 s.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dsp::envelope::EnvelopeShape;

pub const DEFAULT_SAMPLE_RATE: f32 = 48_000.0;
/// One sounding voice plus two decaying tails.
pub const DEFAULT_MAX_VOICES: usize = 3;
/// Samples the monitor tap can hold between two UI refreshes.
pub const DEFAULT_TAP_CAPACITY: usize = 16_384;

/// Parameters of the per-note signal chain.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceParams {
    pub envelope: EnvelopeShape,
    /// Seconds from trigger to the automatic stop.
    pub lifetime: f64,
    /// Filter cutoff as a multiple of the note frequency.
    pub cutoff_ratio: f32,
    pub filter_q: f32,
    pub vibrato_rate: f32,
    /// Peak pitch deviation in Hz.
    pub vibrato_depth: f32,
}

impl Default for VoiceParams {
    fn default() -> Self {
        Self {
            envelope: EnvelopeShape::VOCAL,
            lifetime: 1.5,
            cutoff_ratio: 4.0,
            filter_q: 1.0,
            vibrato_rate: 5.5,
            vibrato_depth: 5.0,
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub sample_rate: f32,
    pub max_voices: usize,
    pub tap_capacity: usize,
    pub voice: VoiceParams,
}

impl EngineConfig {
    pub fn with_sample_rate(mut self, sample_rate: f32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    /// At least one voice is always allowed.
    pub fn with_max_voices(mut self, max_voices: usize) -> Self {
        self.max_voices = max_voices.max(1);
        self
    }

    pub fn with_tap_capacity(mut self, capacity: usize) -> Self {
        self.tap_capacity = capacity.max(1);
        self
    }

    pub fn with_voice(mut self, voice: VoiceParams) -> Self {
        self.voice = voice;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            max_voices: DEFAULT_MAX_VOICES,
            tap_capacity: DEFAULT_TAP_CAPACITY,
            voice: VoiceParams::default(),
        }
    }
}
