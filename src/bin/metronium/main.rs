//! metronium - terminal metronome
//!
//! Run with: cargo run -- --bpm 90 --beats 3

mod ui;

use std::{
    fs::File,
    path::{Path, PathBuf},
    sync::Mutex,
};

use clap::Parser;
use color_eyre::eyre::{Result as EyreResult, WrapErr};
use metronium::{settings::MAX_BEATS_PER_MEASURE, InstantClock, Metronome, Settings};
use rtrb::RingBuffer;
use tracing_subscriber::EnvFilter;

use ui::UiApp;

/// Capacity of the scheduler -> UI beat ring
const BEAT_QUEUE_SIZE: usize = 64;

#[derive(Debug, Parser)]
#[command(name = "metronium", version, about = "Terminal metronome with lookahead click scheduling")]
struct Args {
    /// Tempo in beats per minute (20-400)
    #[arg(long, default_value_t = 120)]
    bpm: u32,

    /// Beats per measure (1-12)
    #[arg(long, default_value_t = 4)]
    beats: u32,

    /// Clicks per beat (limited to 800 clicks per minute)
    #[arg(long, default_value_t = 1)]
    subdivisions: u32,

    /// Volume in percent (0-100)
    #[arg(long, default_value_t = 80)]
    volume: u32,

    /// Run without an audio device (beat display only)
    #[arg(long)]
    silent: bool,

    /// Write logs to this file; RUST_LOG sets the filter
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

impl Args {
    fn settings(&self) -> Settings {
        Settings::default()
            .with_tempo(self.bpm)
            .with_beats_per_measure(self.beats.min(MAX_BEATS_PER_MEASURE))
            .with_subdivisions(self.subdivisions)
            .with_volume(self.volume as f32 / 100.0)
    }
}

fn init_logging(path: &Path) -> EyreResult<()> {
    let file = File::create(path)
        .wrap_err_with(|| format!("failed to create log file {}", path.display()))?;

    // The terminal belongs to the TUI, so logs only ever go to the file
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();

    Ok(())
}

fn main() -> EyreResult<()> {
    color_eyre::install()?;
    let args = Args::parse();

    if let Some(path) = &args.log_file {
        init_logging(path)?;
    }

    let settings = args.settings();
    let mut metronome = if args.silent {
        Metronome::spawn_with(|| Ok(InstantClock::new()), settings)
    } else {
        Metronome::spawn(settings)
    }
    .wrap_err("failed to start metronome")?;

    let (mut beat_tx, beat_rx) = RingBuffer::<u32>::new(BEAT_QUEUE_SIZE);
    metronome.set_on_beat(move |beat| {
        let _ = beat_tx.push(beat);
    });

    let terminal = ratatui::init();
    let res = UiApp::new(metronome, beat_rx).run(terminal);
    ratatui::restore();
    res
}
