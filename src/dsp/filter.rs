use std::f32::consts::TAU;

use crate::graph::node::RenderCtx;

/*
Low-pass State-Variable Filter
==============================

A two-pole (12 dB/octave) low-pass built on the topology-preserving
transform ("TPT", a.k.a. zero-delay-feedback) state-variable structure.

    g  = tan(π · cutoff / sample_rate)      pre-warped integrator gain
    k  = 1 / Q                              damping
    h  = 1 / (1 + g · (g + k))

    per sample:
      v3 = x − ic2
      v1 = h · (ic1 + g · v3)               band-pass
      v2 = ic2 + g · v1                     low-pass   ← output
      ic1 = 2 · v1 − ic1
      ic2 = 2 · v2 − ic2

Q controls the bump at the cutoff:

    Q = 0.707   maximally flat (Butterworth), no bump
    Q = 1.0     gentle ~1.25 dB bump, never self-oscillates
    Q → ∞       k → 0, the filter rings and eventually sings on its own

Cutoff is kept inside [20 Hz, 0.49 · sample_rate]; tan() blows up as the
argument approaches π/2.
*/

pub const MIN_CUTOFF_HZ: f32 = 20.0;
pub const DEFAULT_Q: f32 = 1.0;

#[derive(Debug, Clone)]
pub struct SVFilter {
    ic1eq: f32, // First integrator's memory
    ic2eq: f32, // Second integrator's memory

    pub cutoff_hz: f32,
    pub q: f32,
}

impl SVFilter {
    pub fn lowpass(cutoff_hz: f32) -> Self {
        Self {
            ic1eq: 0.0,
            ic2eq: 0.0,
            cutoff_hz,
            q: DEFAULT_Q,
        }
    }

    #[inline]
    fn compute_g(&self, ctx: &RenderCtx) -> f32 {
        let cutoff = self
            .cutoff_hz
            .clamp(MIN_CUTOFF_HZ, 0.49 * ctx.sample_rate);
        (TAU * cutoff / (2.0 * ctx.sample_rate)).tan()
    }

    #[inline]
    fn compute_k(&self) -> f32 {
        1.0 / self.q.max(0.05)
    }

    #[inline]
    pub fn next_sample(&mut self, sample: f32, k: f32, g: f32) -> f32 {
        let h = 1.0 / (1.0 + g * (g + k));
        let v3 = sample - self.ic2eq;
        let v1 = h * (self.ic1eq + g * v3);
        let v2 = self.ic2eq + g * v1;

        self.ic1eq = 2.0 * v1 - self.ic1eq;
        self.ic2eq = 2.0 * v2 - self.ic2eq;

        v2
    }

    pub fn render(&mut self, buffer: &mut [f32], ctx: &RenderCtx) {
        let g = self.compute_g(ctx);
        let k = self.compute_k();

        for sample in buffer.iter_mut() {
            *sample = self.next_sample(*sample, k, g);
        }
    }

    pub fn reset(&mut self) {
        self.ic1eq = 0.0;
        self.ic2eq = 0.0;
    }

    pub fn set_cutoff(&mut self, cutoff: f32) {
        self.cutoff_hz = cutoff;
    }

    pub fn set_q(&mut self, q: f32) {
        self.q = q;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::oscillator::OscillatorBlock;

    fn peak_after_transient(buffer: &[f32]) -> f32 {
        let skip = buffer.len().min(256);
        buffer
            .get(skip..)
            .unwrap_or(buffer)
            .iter()
            .fold(0.0f32, |acc, &x| acc.max(x.abs()))
    }

    fn filtered_sine_peak(cutoff: f32, q: f32, freq: f32) -> f32 {
        let ctx = RenderCtx::from_freq(48_000.0, freq);
        let mut osc = OscillatorBlock::sine();
        let mut buffer = vec![0.0f32; 2048];
        osc.render(&mut buffer, &ctx);

        let mut filter = SVFilter::lowpass(cutoff);
        filter.set_q(q);
        filter.render(&mut buffer, &ctx);
        peak_after_transient(&buffer)
    }

    #[test]
    fn test_lowpass_passes_dc() {
        let mut filter = SVFilter::lowpass(500.0);
        let mut buffer = vec![1.0; 512];
        let ctx = RenderCtx::from_freq(48_000.0, 440.0);

        filter.render(&mut buffer, &ctx);

        assert!(buffer[511] > 0.99, "dc settled at {}", buffer[511]);
    }

    #[test]
    fn test_lowpass_filters_high_freq() {
        // ten times the cutoff: roughly 40 dB down for a 12 dB/oct slope
        let peak = filtered_sine_peak(500.0, DEFAULT_Q, 5_000.0);
        assert!(peak < 0.05, "expected high freq attenuation, got peak: {peak}");
    }

    #[test]
    fn test_passband_is_near_unity() {
        let peak = filtered_sine_peak(4.0 * 440.0, DEFAULT_Q, 440.0);
        assert!((0.9..1.2).contains(&peak), "passband peak {peak}");
    }

    #[test]
    fn test_unit_q_bump_is_gentle() {
        let at_cutoff = filtered_sine_peak(1_000.0, 1.0, 1_000.0);
        assert!(
            (0.9..=1.1).contains(&at_cutoff),
            "Q = 1 should give unity gain at the cutoff, got {at_cutoff}"
        );
    }

    #[test]
    fn test_higher_q_boosts_cutoff() {
        let low = filtered_sine_peak(1_000.0, 0.5, 1_000.0);
        let high = filtered_sine_peak(1_000.0, 4.0, 1_000.0);
        assert!(high > low * 2.0, "high_q={high}, low_q={low}");
    }

    #[test]
    fn test_cutoff_clamped_below_nyquist() {
        let mut filter = SVFilter::lowpass(1.0e9);
        let mut buffer = vec![0.5f32; 256];
        let ctx = RenderCtx::from_freq(48_000.0, 440.0);
        filter.render(&mut buffer, &ctx);

        assert!(buffer.iter().all(|s| s.is_finite()));
    }
}
