use std::fmt;

use crate::{
    config::VoiceParams,
    dsp::automation::Automation,
    error::{Result, SynthError},
    graph::{
        amplify::Amplify,
        envelope::EnvNode,
        extensions::NodeExt,
        filter::FilterNode,
        lfo::LfoNode,
        modulate::Modulate,
        node::{GraphNode, RenderCtx},
        oscillator::{OscNode, OscParam},
        through::Through,
    },
};

/*
One Note, One Chain
===================

Every trigger builds a fresh signal chain that belongs to exactly one voice:

    ┌───────────┐   ┌───────────┐   ┌──────────┐
    │ saw osc   │──→│ low-pass  │──→│ × gain   │──→ mix
    │ f ± 5 Hz  │   │ 4f, Q = 1 │   │ envelope │
    └─────▲─────┘   └───────────┘   └──────────┘
          │
    ┌─────┴─────┐
    │ LFO 5.5Hz │
    └───────────┘

Nothing in the chain is shared or reused. When the voice ends, for any
reason, `teardown` drops the chain and the voice becomes an inert record.

Lifecycle
---------

    Pending ──begin──→ Sounding ──teardown──→ Stopped
       │                                        ▲
       └──────────────teardown──────────────────┘

Pending voices have been scheduled for a future start frame; the audio
context moves them to Sounding when their start cue fires.
*/

/// The per-note signal chain.
pub type VoiceChain = Amplify<Through<Modulate<OscNode, LfoNode>, FilterNode>, EnvNode>;

/// Build the chain for one note starting at `t0` seconds on the timeline.
pub fn vocal_chain(frequency: f32, params: &VoiceParams, t0: f64) -> VoiceChain {
    OscNode::sawtooth()
        .with_frequency(frequency)
        .modulate(
            LfoNode::sine(params.vibrato_rate),
            OscParam::Frequency,
            params.vibrato_depth,
        )
        .through(FilterNode::lowpass(frequency * params.cutoff_ratio).with_q(params.filter_q))
        .amplify(EnvNode::scheduled(&params.envelope, t0))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VoiceId(pub(crate) u64);

impl fmt::Display for VoiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "voice#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceState {
    Pending,
    Sounding,
    Stopped,
}

pub struct Voice {
    id: VoiceId,
    frequency: f32,
    start_time: f64,
    stop_time: f64,
    start_frame: u64,
    state: VoiceState,
    chain: Option<VoiceChain>,
}

impl Voice {
    /// Build a pending voice. The gain envelope is written here, in full.
    pub fn new(
        id: VoiceId,
        frequency: f32,
        start_time: f64,
        start_frame: u64,
        params: &VoiceParams,
    ) -> Result<Self> {
        if !frequency.is_finite() || frequency <= 0.0 {
            return Err(SynthError::InvalidFrequency(frequency));
        }

        Ok(Self {
            id,
            frequency,
            start_time,
            stop_time: start_time + params.lifetime,
            start_frame,
            state: VoiceState::Pending,
            chain: Some(vocal_chain(frequency, params, start_time)),
        })
    }

    /// Move a pending voice to Sounding. No-op in any other state.
    pub fn begin(&mut self, ctx: &RenderCtx) {
        if self.state != VoiceState::Pending {
            return;
        }
        if let Some(chain) = self.chain.as_mut() {
            chain.note_on(ctx);
            self.state = VoiceState::Sounding;
        }
    }

    /// Render this voice into `out`, overwriting it. Silent unless sounding.
    pub fn render(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        match (self.state, self.chain.as_mut()) {
            (VoiceState::Sounding, Some(chain)) => chain.render_block(out, ctx),
            _ => out.fill(0.0),
        }
    }

    /// Drop the chain. Returns whether the voice was still live.
    pub fn teardown(&mut self) -> bool {
        let was_live = self.chain.take().is_some();
        self.state = VoiceState::Stopped;
        was_live
    }

    pub fn id(&self) -> VoiceId {
        self.id
    }

    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    /// Scheduled automatic stop.
    pub fn stop_time(&self) -> f64 {
        self.stop_time
    }

    pub fn start_frame(&self) -> u64 {
        self.start_frame
    }

    pub fn state(&self) -> VoiceState {
        self.state
    }

    pub fn is_live(&self) -> bool {
        self.chain.is_some()
    }

    pub fn filter_cutoff(&self) -> Option<f32> {
        self.chain.as_ref().map(|c| c.signal.effect().cutoff())
    }

    pub fn filter_q(&self) -> Option<f32> {
        self.chain.as_ref().map(|c| c.signal.effect().q())
    }

    /// Vibrato `(rate_hz, depth_hz)`.
    pub fn vibrato(&self) -> Option<(f32, f32)> {
        self.chain.as_ref().map(|c| {
            let vibrato = c.signal.source();
            (vibrato.lfo().rate(), vibrato.depth())
        })
    }

    /// The gain automation scheduled for this voice.
    pub fn envelope(&self) -> Option<&Automation> {
        self.chain.as_ref().map(|c| c.modulator.automation())
    }

    /// Gain at the end of the last rendered block.
    pub fn level(&self) -> Option<f32> {
        self.chain.as_ref().and_then(|c| c.get_envelope_level())
    }
}

impl fmt::Debug for Voice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Voice")
            .field("id", &self.id)
            .field("frequency", &self.frequency)
            .field("start_time", &self.start_time)
            .field("stop_time", &self.stop_time)
            .field("state", &self.state)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::automation::Ramp;

    fn voice(frequency: f32, t0: f64) -> Voice {
        Voice::new(VoiceId(1), frequency, t0, 0, &VoiceParams::default()).unwrap()
    }

    #[test]
    fn rejects_bad_frequencies() {
        let params = VoiceParams::default();
        for bad in [0.0, -440.0, f32::NAN, f32::INFINITY] {
            let err = Voice::new(VoiceId(1), bad, 0.0, 0, &params).unwrap_err();
            assert!(matches!(err, SynthError::InvalidFrequency(_)));
        }
    }

    #[test]
    fn cutoff_is_four_times_frequency() {
        let v = voice(440.0, 0.0);
        assert_eq!(v.filter_cutoff(), Some(1760.0));
        assert_eq!(v.filter_q(), Some(1.0));
        assert_eq!(v.vibrato(), Some((5.5, 5.0)));
    }

    #[test]
    fn envelope_is_scheduled_at_creation() {
        let v = voice(261.63, 3.0);
        let env = v.envelope().unwrap();
        let expected = [3.0, 3.1, 3.4, 4.0, 4.4];
        assert_eq!(env.breakpoints().len(), expected.len());
        for (b, t) in env.breakpoints().iter().zip(expected) {
            assert!((b.time - t).abs() < 1e-9, "breakpoint at {} not {t}", b.time);
        }
        assert_eq!(env.breakpoints()[4].ramp, Ramp::Exponential);
        assert_eq!(v.stop_time(), 4.5);
    }

    #[test]
    fn pending_voice_is_silent() {
        let mut v = voice(440.0, 0.0);
        let mut out = [1.0f32; 64];
        v.render(&mut out, &RenderCtx::from_freq(48_000.0, 0.0).at_time(0.05));
        assert!(out.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn sounding_voice_produces_audio() {
        let mut v = voice(440.0, 0.0);
        let ctx = RenderCtx::from_freq(48_000.0, 0.0);
        v.begin(&ctx);
        assert_eq!(v.state(), VoiceState::Sounding);

        let mut out = [0.0f32; 4800];
        v.render(&mut out, &ctx);
        assert!(out.iter().any(|s| s.abs() > 0.05));
        assert!(out.iter().all(|s| s.abs() <= 1.0));
    }

    #[test]
    fn teardown_is_idempotent() {
        let mut v = voice(440.0, 0.0);
        assert!(v.teardown());
        assert!(!v.teardown());
        assert_eq!(v.state(), VoiceState::Stopped);
        assert!(v.envelope().is_none());
    }
}
