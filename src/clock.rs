//! The precise side of lookahead scheduling.
//!
//! An [`AudioClock`] is a free-running, always-increasing timeline measured in
//! seconds, plus the ability to play a [`Tone`] at any future point on it.
//! The scheduler reads the clock to decide what is due and hands tones over
//! early; the clock owner is responsible for sounding them on time.

use std::time::Instant;

use tracing::trace;

use crate::click::Tone;

pub trait AudioClock {
    /// Current position of the audio timeline in seconds.
    fn current_time(&self) -> f64;

    /// Whether the clock is paused and must be resumed before playback.
    fn is_suspended(&self) -> bool {
        false
    }

    /// Start (or restart) the clock. Only called while suspended.
    fn resume(&mut self) {}

    /// Queue a tone. `tone.start` may be in the past, in which case it
    /// should sound as soon as possible.
    fn play_tone(&mut self, tone: Tone);
}

/// Silent clock driven by [`Instant`].
///
/// Useful when no audio device is available: the scheduler and its beat
/// notifications run normally, tones are counted and discarded.
#[derive(Debug)]
pub struct InstantClock {
    origin: Option<Instant>,
    tones_played: u64,
}

impl InstantClock {
    /// Create a suspended clock. Time stays at 0 until it is resumed.
    pub fn new() -> Self {
        Self {
            origin: None,
            tones_played: 0,
        }
    }

    /// Number of tones handed to this clock
    pub fn tones_played(&self) -> u64 {
        self.tones_played
    }
}

impl Default for InstantClock {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioClock for InstantClock {
    fn current_time(&self) -> f64 {
        self.origin
            .map(|origin| origin.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }

    fn is_suspended(&self) -> bool {
        self.origin.is_none()
    }

    fn resume(&mut self) {
        if self.origin.is_none() {
            self.origin = Some(Instant::now());
        }
    }

    fn play_tone(&mut self, tone: Tone) {
        self.tones_played += 1;
        trace!(start = tone.start, kind = ?tone.kind, "silent tone");
    }
}
