//! Benchmarks for the state-variable lowpass.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use raga_synth::dsp::filter::SVFilter;
use raga_synth::graph::node::RenderCtx;

use crate::BLOCK_SIZES;

pub fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/filter");
    let ctx = RenderCtx::from_freq(48_000.0, 440.0);

    for &size in BLOCK_SIZES {
        // Noise-ish input so the filter state keeps moving
        let input: Vec<f32> = (0..size).map(|i| ((i * 7919) % 97) as f32 / 48.5 - 1.0).collect();
        let mut buffer = input.clone();

        let mut filter = SVFilter::lowpass(1760.0);
        group.bench_with_input(BenchmarkId::new("lowpass", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                filter.render(black_box(&mut buffer), black_box(&ctx));
            })
        });
    }

    group.finish();
}
