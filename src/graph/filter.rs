use crate::{
    dsp::filter::SVFilter,
    graph::node::{GraphNode, Modulatable, RenderCtx},
};

/*
Low-pass Filter Node
====================

Subtractive synthesis starts from a harmonically rich waveform and removes
what it does not want. The voice filter passes everything below its cutoff
and rolls off above it at 12 dB/octave.

Cutoff tracks the note
----------------------

The cutoff is set per voice to exactly four times the note frequency:

    note     f         cutoff (4f)   harmonics kept at full level
    C3       130.81    523.24        1st-4th
    A4       440.00    1760.00       1st-4th
    B5       987.77    3951.08       1st-4th

Every note therefore keeps the same tone colour.

Resonance
---------

Q = 1 is a gentle bump at the cutoff that never self-oscillates. See
`dsp/filter.rs` for the filter math.

Example:
  let voice = OscNode::sawtooth()
      .with_frequency(440.0)
      .through(FilterNode::lowpass(1760.0).with_q(1.0));
*/

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterParam {
    Cutoff,
}

pub struct FilterNode {
    filter: SVFilter,
    base_cutoff: f32,
}

impl FilterNode {
    pub fn lowpass(cutoff_hz: f32) -> Self {
        FilterNode {
            filter: SVFilter::lowpass(cutoff_hz),
            base_cutoff: cutoff_hz,
        }
    }

    pub fn with_q(mut self, q: f32) -> Self {
        self.filter.set_q(q);
        self
    }

    /// Scheduled cutoff, before any modulation.
    pub fn cutoff(&self) -> f32 {
        self.base_cutoff
    }

    pub fn q(&self) -> f32 {
        self.filter.q
    }
}

impl Modulatable for FilterNode {
    type Param = FilterParam;

    fn get_param(&self, param: Self::Param) -> f32 {
        match param {
            FilterParam::Cutoff => self.base_cutoff,
        }
    }

    fn apply_modulation(&mut self, param: Self::Param, base: f32, modulation: f32) {
        match param {
            FilterParam::Cutoff => {
                self.base_cutoff = base;
                self.filter.set_cutoff((base + modulation).clamp(20.0, 20_000.0));
            }
        }
    }
}

impl GraphNode for FilterNode {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        self.filter.render(out, ctx);
    }

    fn note_on(&mut self, _ctx: &RenderCtx) {
        self.filter.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_scheduled_cutoff_and_q() {
        let node = FilterNode::lowpass(1760.0).with_q(1.0);
        assert_eq!(node.cutoff(), 1760.0);
        assert_eq!(node.q(), 1.0);
    }

    #[test]
    fn modulation_keeps_base_cutoff() {
        let mut node = FilterNode::lowpass(1000.0);
        node.apply_modulation(FilterParam::Cutoff, 1000.0, 500.0);
        assert_eq!(node.get_param(FilterParam::Cutoff), 1000.0);
    }
}
