use std::hint::black_box;
use std::time::Duration;

use criterion::Criterion;
use metronium::{AudioClock, BeatScheduler, Settings, Timer, Tone};

/// Clock that is moved by hand and drops every tone
struct StepClock {
    now: f64,
}

impl AudioClock for StepClock {
    fn current_time(&self) -> f64 {
        self.now
    }

    fn play_tone(&mut self, tone: Tone) {
        black_box(tone);
    }
}

struct NullTimer;

impl Timer for NullTimer {
    fn start_interval(&mut self, _period: Duration) {}
    fn cancel_interval(&mut self) {}
    fn defer_beat(&mut self, delay: Duration, beat: u32) {
        black_box((delay, beat));
    }
}

pub fn bench_scheduling(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/scheduling");

    // 400 BPM, 2 subdivisions: the densest grid allowed
    let settings = Settings::new().with_tempo(400).with_subdivisions(2);
    let mut scheduler = BeatScheduler::with_settings(StepClock { now: 0.0 }, NullTimer, settings);
    scheduler.set_on_beat(Box::new(|beat| {
        black_box(beat);
    }));
    scheduler.start();
    group.bench_function("poll_25ms", |b| {
        b.iter(|| {
            scheduler.clock_mut().now += 0.025;
            scheduler.poll();
        })
    });

    // A one second stall: the catch-up pass after a hung thread
    let mut scheduler = BeatScheduler::with_settings(StepClock { now: 0.0 }, NullTimer, settings);
    scheduler.start();
    group.bench_function("poll_after_stall", |b| {
        b.iter(|| {
            scheduler.clock_mut().now += 1.0;
            scheduler.poll();
        })
    });

    group.finish();
}
