//! Render one measure of clicks without an audio device.
//!
//! Drives the beat scheduler against the offline engine, polling every 25 ms
//! of rendered audio, and prints the peak of every beat.
//!
//! Run with: cargo run --example offline_click

use std::time::Duration;

use metronium::{engine::OfflineEngine, BeatScheduler, Settings, Timer};

/// Polls are driven by the render loop; beats are just collected.
#[derive(Default)]
struct CollectTimer {
    beats: Vec<(Duration, u32)>,
}

impl Timer for CollectTimer {
    fn start_interval(&mut self, _period: Duration) {}
    fn cancel_interval(&mut self) {}
    fn defer_beat(&mut self, delay: Duration, beat: u32) {
        self.beats.push((delay, beat));
    }
}

fn main() {
    let sample_rate = 48_000.0;
    let settings = Settings::new()
        .with_tempo(100)
        .with_beats_per_measure(4)
        .with_subdivisions(2);

    let mut scheduler = BeatScheduler::with_settings(
        OfflineEngine::new(sample_rate),
        CollectTimer::default(),
        settings,
    );
    scheduler.start();

    let measure = settings.seconds_per_beat() * settings.beats_per_measure() as f64;
    let frames = (measure * sample_rate as f64) as usize;
    let mut buffer = vec![0.0f32; frames];
    for block in buffer.chunks_mut(1_200) {
        scheduler.clock_mut().render(block);
        scheduler.poll();
    }
    scheduler.stop();

    println!("=== Offline Click ===\n");
    println!(
        "{} BPM, {}/4, {} subdivisions, {} frames",
        settings.tempo(),
        settings.beats_per_measure(),
        settings.subdivisions(),
        frames
    );

    let beat_frames = (settings.seconds_per_beat() * sample_rate as f64) as usize;
    for (beat, chunk) in buffer.chunks(beat_frames).enumerate() {
        let peak = chunk.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()));
        println!("beat {}: peak {:.3}", beat + 1, peak);
    }
    println!(
        "\n{} beat notifications deferred",
        scheduler.timer().beats.len()
    );
}
