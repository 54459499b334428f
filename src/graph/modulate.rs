use crate::{
    dsp::modulate::{apply_modulation, block_average, CONTROL_BLOCK},
    graph::node::{GraphNode, Modulatable, RenderCtx},
};

/*
Modulate Node
=============

Connects an LFO (or any signal) to a parameter on another node. In a voice
this is the vibrato: a 5.5 Hz sine pushing the oscillator frequency ±5 Hz.

  let vibrato = OscNode::sawtooth()
      .with_frequency(440.0)
      .modulate(LfoNode::sine(5.5), OscParam::Frequency, 5.0);


Understanding Depth
-------------------

    modulated_value = base_value + (LFO × depth)

With base = 440 Hz and depth = 5 Hz the pitch sweeps 435 - 445 Hz.


How It Works
------------

The output block is walked in control blocks of `CONTROL_BLOCK` samples.
For each one the LFO is rendered, averaged, applied to the source
parameter, and then the source renders that slice. See `dsp/modulate.rs`
for the rate trade-offs.
*/

pub struct Modulate<S, L>
where
    S: GraphNode + Modulatable,
    L: GraphNode,
{
    source: S,       // The node being modulated (e.g., OscNode)
    lfo: L,          // The modulation source (e.g., LfoNode)
    param: S::Param, // Which parameter to modulate
    depth: f32,      // Modulation amount (scales LFO output)
    lfo_buffer: [f32; CONTROL_BLOCK],
}

impl<S, L> Modulate<S, L>
where
    S: GraphNode + Modulatable,
    L: GraphNode,
{
    pub fn new(source: S, lfo: L, param: S::Param, depth: f32) -> Self {
        Self {
            source,
            lfo,
            param,
            depth,
            lfo_buffer: [0.0; CONTROL_BLOCK],
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn lfo(&self) -> &L {
        &self.lfo
    }

    pub fn depth(&self) -> f32 {
        self.depth
    }
}

impl<S, L> GraphNode for Modulate<S, L>
where
    S: GraphNode + Modulatable,
    L: GraphNode,
{
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        let base_value = self.source.get_param(self.param);

        let mut offset = 0;
        for chunk in out.chunks_mut(CONTROL_BLOCK) {
            let chunk_ctx = ctx.advanced(offset);
            let lfo = &mut self.lfo_buffer[..chunk.len()];
            self.lfo.render_block(lfo, &chunk_ctx);

            let modulation = apply_modulation(0.0, block_average(lfo), self.depth);
            self.source
                .apply_modulation(self.param, base_value, modulation);
            self.source.render_block(chunk, &chunk_ctx);

            offset += chunk.len();
        }
    }

    fn note_on(&mut self, ctx: &RenderCtx) {
        self.source.note_on(ctx);
        self.lfo.note_on(ctx);
    }

    fn get_envelope_level(&self) -> Option<f32> {
        self.source.get_envelope_level()
    }
}
