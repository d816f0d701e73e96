//! Threaded runtime around the beat scheduler.
//!
//! The scheduler is single-threaded by nature: counters, parameters and the
//! beat callback are only ever touched by one event loop. [`Metronome`] gives
//! every other thread a cheap handle to that loop: setters and transport
//! commands are sent as messages, and the handle keeps its own copy of the
//! (already clamped) settings so reads never wait on the loop.
//!
//! # Example
//!
//! ```ignore
//! use metronium::{Metronome, Settings};
//!
//! let mut metronome = Metronome::spawn(Settings::default().with_tempo(90))?;
//! metronome.set_on_beat(|beat| println!("beat {beat}"));
//! metronome.start();
//! ```

mod pump;

use std::sync::mpsc::{self, Sender};
use std::thread::{self, JoinHandle};

use tracing::{debug, warn};

use crate::{
    clock::AudioClock, engine::AudioEngine, error::AudioError, scheduler::BeatCallback,
    settings::Settings,
};

pub(crate) enum Command {
    Start,
    Stop,
    Toggle,
    SetTempo(u32),
    SetBeatsPerMeasure(u32),
    SetSubdivisions(u32),
    SetVolume(f32),
    SetOnBeat(BeatCallback),
    ClearOnBeat,
}

/// Handle to a beat scheduler running on its own thread.
///
/// Dropping the handle stops the scheduler thread.
pub struct Metronome {
    tx: Option<Sender<Command>>,
    handle: Option<JoinHandle<()>>,
    settings: Settings,
    playing: bool,
}

impl Metronome {
    /// Spawn the scheduler on the default audio output device.
    pub fn spawn(settings: Settings) -> Result<Self, AudioError> {
        Self::spawn_with(AudioEngine::open, settings)
    }

    /// Spawn the scheduler with a custom audio clock.
    ///
    /// `make_clock` runs on the scheduler thread, so the clock itself does not
    /// need to be `Send`. Its error is returned from here.
    pub fn spawn_with<C, F>(make_clock: F, settings: Settings) -> Result<Self, AudioError>
    where
        C: AudioClock + 'static,
        F: FnOnce() -> Result<C, AudioError> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let (ready_tx, ready_rx) = mpsc::sync_channel(1);

        let handle = thread::Builder::new()
            .name("metronium-scheduler".into())
            .spawn(move || match make_clock() {
                Ok(clock) => {
                    let _ = ready_tx.send(Ok(()));
                    pump::run(clock, settings, rx);
                }
                Err(err) => {
                    let _ = ready_tx.send(Err(err));
                }
            })?;

        match ready_rx.recv() {
            Ok(Ok(())) => {
                debug!("scheduler thread running");
                Ok(Self {
                    tx: Some(tx),
                    handle: Some(handle),
                    settings,
                    playing: false,
                })
            }
            Ok(Err(err)) => {
                let _ = handle.join();
                Err(err)
            }
            Err(_) => {
                let _ = handle.join();
                Err(AudioError::ThreadExited)
            }
        }
    }

    fn send(&self, command: Command) {
        let Some(ref tx) = self.tx else {
            return;
        };
        if tx.send(command).is_err() {
            warn!("scheduler thread disconnected");
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn tempo(&self) -> u32 {
        self.settings.tempo()
    }

    pub fn set_tempo(&mut self, tempo: u32) {
        self.settings.set_tempo(tempo);
        self.send(Command::SetTempo(self.settings.tempo()));
    }

    pub fn beats_per_measure(&self) -> u32 {
        self.settings.beats_per_measure()
    }

    pub fn set_beats_per_measure(&mut self, beats: u32) {
        self.settings.set_beats_per_measure(beats);
        self.send(Command::SetBeatsPerMeasure(self.settings.beats_per_measure()));
    }

    pub fn subdivisions(&self) -> u32 {
        self.settings.subdivisions()
    }

    pub fn max_subdivisions(&self) -> u32 {
        self.settings.max_subdivisions()
    }

    pub fn set_subdivisions(&mut self, subdivisions: u32) {
        self.settings.set_subdivisions(subdivisions);
        self.send(Command::SetSubdivisions(self.settings.subdivisions()));
    }

    pub fn volume(&self) -> f32 {
        self.settings.volume()
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.settings.set_volume(volume);
        self.send(Command::SetVolume(self.settings.volume()));
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn start(&mut self) {
        self.playing = true;
        self.send(Command::Start);
    }

    pub fn stop(&mut self) {
        self.playing = false;
        self.send(Command::Stop);
    }

    pub fn toggle(&mut self) {
        self.playing = !self.playing;
        self.send(Command::Toggle);
    }

    /// Register the beat callback. It runs on the scheduler thread.
    pub fn set_on_beat<F>(&mut self, callback: F)
    where
        F: FnMut(u32) + Send + 'static,
    {
        self.send(Command::SetOnBeat(Box::new(callback)));
    }

    pub fn clear_on_beat(&mut self) {
        self.send(Command::ClearOnBeat);
    }
}

impl Drop for Metronome {
    fn drop(&mut self) {
        // Close the channel first so the loop's recv_timeout sees Disconnected
        drop(self.tx.take());

        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
