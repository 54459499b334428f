//! Benchmarks for the vocal voice chain.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use raga_synth::{
    config::VoiceParams,
    graph::node::{GraphNode, RenderCtx},
    synth::vocal_chain,
};

use crate::BLOCK_SIZES;

pub fn bench_voice(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/voice");
    let params = VoiceParams::default();
    // Mid-sustain, where every stage is active
    let ctx = RenderCtx::from_freq(48_000.0, 0.0).at_time(0.7);

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // sawtooth + vibrato → lowpass → scheduled gain
        let mut voice = vocal_chain(261.63, &params, 0.0);
        voice.note_on(&ctx);

        group.bench_with_input(BenchmarkId::new("vocal", size), &size, |b, _| {
            b.iter(|| {
                voice.render_block(black_box(&mut buffer), black_box(&ctx));
            })
        });
    }

    group.finish();
}
