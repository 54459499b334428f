use crate::{
    dsp::oscillator::OscillatorBlock,
    graph::node::{GraphNode, RenderCtx},
};

/*
LFO (Low Frequency Oscillator)
==============================

An oscillator running below the audible range, used to move a parameter
instead of being heard. Audio oscillators live in 20 Hz - 20 kHz; LFOs
typically sit between 0.1 and 20 Hz.

Vibrato
-------

The only LFO in a voice drives pitch:

    LfoNode::sine(5.5)  →  OscParam::Frequency, depth 5 Hz

5-7 Hz is the classic vibrato speed. Slower reads as a deliberate bend,
faster as a nervous tremble.

The LFO ignores the note frequency in the RenderCtx and always runs at its
own rate, so every note wobbles at the same speed. It starts at phase 0
when its voice starts, so the first cycle always swings upward first.

Output is bipolar, in [-1.0, +1.0].
*/

pub struct LfoNode {
    osc: OscillatorBlock,
    frequency: f32, // Fixed rate in Hz (ignores note context)
}

impl LfoNode {
    pub fn sine(frequency: f32) -> Self {
        Self {
            osc: OscillatorBlock::sine(),
            frequency,
        }
    }

    pub fn rate(&self) -> f32 {
        self.frequency
    }
}

impl GraphNode for LfoNode {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        let lfo_ctx = RenderCtx::from_freq(ctx.sample_rate, self.frequency).at_time(ctx.time);
        self.osc.render(out, &lfo_ctx);
    }

    fn note_on(&mut self, _ctx: &RenderCtx) {
        self.osc.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lfo_sine_output_range() {
        let mut lfo = LfoNode::sine(5.5);
        let mut buffer = vec![0.0; 1024];
        let ctx = RenderCtx::from_freq(48000.0, 440.0);

        lfo.render_block(&mut buffer, &ctx);

        for &sample in &buffer {
            assert!(
                (-1.0..=1.0).contains(&sample),
                "LFO sine sample {} out of range [-1.0, 1.0]",
                sample
            );
        }
    }

    #[test]
    fn test_lfo_ignores_note_frequency() {
        let mut lfo = LfoNode::sine(5.5);
        let mut buffer1 = vec![0.0; 512];
        let mut buffer2 = vec![0.0; 512];

        lfo.render_block(&mut buffer1, &RenderCtx::from_freq(48000.0, 440.0));

        let mut lfo = LfoNode::sine(5.5);
        lfo.render_block(&mut buffer2, &RenderCtx::from_freq(48000.0, 880.0));

        for (i, (&s1, &s2)) in buffer1.iter().zip(&buffer2).enumerate() {
            assert!(
                (s1 - s2).abs() < 1e-6,
                "LFO output differs at sample {}: {} vs {}",
                i,
                s1,
                s2
            );
        }
    }

    #[test]
    fn test_lfo_completes_cycle_at_rate() {
        // 4 Hz at 48 kHz: one cycle every 12000 samples
        let mut lfo = LfoNode::sine(4.0);
        let mut buffer = vec![0.0; 12_001];
        lfo.render_block(&mut buffer, &RenderCtx::from_freq(48000.0, 0.0));

        assert!(buffer[3_000] > 0.999);
        assert!(buffer[9_000] < -0.999);
        assert!(buffer[12_000].abs() < 1e-2);
    }
}
