//! Benchmarks for rendering gain automation.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use raga_synth::dsp::{Automation, EnvelopeShape};

use crate::BLOCK_SIZES;

pub fn bench_automation(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/automation");
    let period = 1.0 / 48_000.0;

    let mut lane = Automation::new(0.0);
    EnvelopeShape::VOCAL.schedule(&mut lane, 0.0);

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // Inside a linear segment
        group.bench_with_input(BenchmarkId::new("attack", size), &size, |b, _| {
            b.iter(|| lane.render(black_box(&mut buffer), black_box(0.05), period))
        });

        // Inside the exponential release
        group.bench_with_input(BenchmarkId::new("release", size), &size, |b, _| {
            b.iter(|| lane.render(black_box(&mut buffer), black_box(1.2), period))
        });
    }

    group.finish();
}
