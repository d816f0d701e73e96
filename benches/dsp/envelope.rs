//! Benchmarks for the click envelope.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use metronium::dsp::Envelope;

use crate::BLOCK_SIZES;

fn run(env: &mut Envelope, buffer: &mut [f32]) {
    for sample in buffer.iter_mut() {
        *sample = env.next_sample();
    }
}

pub fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/envelope");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // Held at sustain, the common case while a click sounds
        let mut env = Envelope::click(48_000.0);
        env.note_on();
        for _ in 0..200 {
            env.next_sample();
        }
        group.bench_with_input(BenchmarkId::new("sustain", size), &size, |b, _| {
            b.iter(|| run(&mut env, black_box(&mut buffer)))
        });

        // Idle envelopes are skipped by the renderer but still cost a branch
        let mut env = Envelope::click(48_000.0);
        group.bench_with_input(BenchmarkId::new("idle", size), &size, |b, _| {
            b.iter(|| run(&mut env, black_box(&mut buffer)))
        });
    }

    group.finish();
}
