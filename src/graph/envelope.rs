use crate::{
    dsp::{automation::Automation, envelope::EnvelopeShape},
    graph::node::{GraphNode, RenderCtx},
};

/*
Envelope Node
=============

Renders a gain curve as a control signal. Used as the modulator of an
`Amplify`, it shapes the loudness of whatever signal it multiplies:

    OscNode::sawtooth()
        .through(FilterNode::lowpass(1760.0))
        .amplify(EnvNode::scheduled(&EnvelopeShape::VOCAL, t0))

The node is clocked by the timeline, not by its own sample counter: each
block is evaluated at `ctx.time + n / sample_rate`. A voice that starts in
the middle of a render block therefore hits its breakpoints on the exact
frame they were scheduled for.
*/

pub struct EnvNode {
    lane: Automation,
    last_level: f32,
}

impl EnvNode {
    /// Envelope that holds `initial` until breakpoints are added.
    pub fn new(initial: f32) -> Self {
        Self {
            lane: Automation::new(initial),
            last_level: initial,
        }
    }

    /// Envelope with `shape` written in, starting at `t0`.
    pub fn scheduled(shape: &EnvelopeShape, t0: f64) -> Self {
        let mut node = Self::new(0.0);
        shape.schedule(&mut node.lane, t0);
        node
    }

    pub fn automation(&self) -> &Automation {
        &self.lane
    }

    pub fn automation_mut(&mut self) -> &mut Automation {
        &mut self.lane
    }
}

impl GraphNode for EnvNode {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        self.lane.render(out, ctx.time, ctx.sample_period());
        if let Some(&last) = out.last() {
            self.last_level = last;
        }
    }

    fn get_envelope_level(&self) -> Option<f32> {
        Some(self.last_level)
    }
}
