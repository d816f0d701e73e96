use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use metronium::{engine::ToneRenderer, ClickKind, Tone};

use crate::BLOCK_SIZES;

pub fn bench_renderer(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/renderer");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // Nothing queued: the callback cost while stopped
        let (mut renderer, _tones) = ToneRenderer::new(48_000.0);
        group.bench_with_input(BenchmarkId::new("silent", size), &size, |b, _| {
            b.iter(|| renderer.render_block(black_box(&mut buffer)))
        });

        // Every voice sounding at once, which only happens with stolen voices
        let (mut renderer, mut tones) = ToneRenderer::new(48_000.0);
        for i in 0..8 {
            let kind = if i == 0 {
                ClickKind::Accent
            } else {
                ClickKind::Subdivision
            };
            let mut tone = Tone::click(kind, 0.0, 1.0);
            tone.stop = 3_600.0;
            tones.send(tone);
        }
        renderer.render_block(&mut buffer);
        group.bench_with_input(BenchmarkId::new("full", size), &size, |b, _| {
            b.iter(|| renderer.render_block(black_box(&mut buffer)))
        });
    }

    group.finish();
}
