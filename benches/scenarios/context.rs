//! Benchmarks for the audio context with a full voice pool.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use raga_synth::{engine::AudioContext, EngineConfig};

use crate::BLOCK_SIZES;

pub fn bench_context(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/context");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // Three overlapping voices, retriggered before they expire
        let mut ctx = AudioContext::new(EngineConfig::default());
        group.bench_with_input(BenchmarkId::new("three_voices", size), &size, |b, _| {
            b.iter(|| {
                if ctx.live_voices() < 3 {
                    for f in [261.63, 329.63, 392.0] {
                        let _ = ctx.trigger(f, 0.0);
                    }
                }
                ctx.render(black_box(&mut buffer));
            })
        });

        // Same, with the level monitor tap attached and never drained
        let mut ctx = AudioContext::new(EngineConfig::default());
        let _tap = ctx.attach_tap(4096);
        group.bench_with_input(BenchmarkId::new("tapped", size), &size, |b, _| {
            b.iter(|| {
                if ctx.live_voices() < 3 {
                    for f in [261.63, 329.63, 392.0] {
                        let _ = ctx.trigger(f, 0.0);
                    }
                }
                ctx.render(black_box(&mut buffer));
            })
        });
    }

    group.finish();
}
