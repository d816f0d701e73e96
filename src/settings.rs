//! Tempo, meter, subdivision and volume parameters.
//!
//! Every setter clamps instead of rejecting, so a `Settings` value is always
//! playable. The tempo and subdivision ranges are linked: the metronome never
//! clicks more than [`MAX_CLICKS_PER_MINUTE`] times a minute, so raising the
//! tempo can pull `subdivisions` down with it.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Slowest supported tempo in beats per minute
pub const MIN_TEMPO: u32 = 20;
/// Fastest supported tempo in beats per minute
pub const MAX_TEMPO: u32 = 400;
/// Upper bound on `tempo * subdivisions`
pub const MAX_CLICKS_PER_MINUTE: u32 = 800;
/// Largest meter the front end offers. The scheduler itself only requires >= 1.
pub const MAX_BEATS_PER_MEASURE: u32 = 12;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "RawSettings"))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Settings {
    tempo: u32,
    beats_per_measure: u32,
    subdivisions: u32,
    volume: f32,
}

impl Settings {
    pub fn new() -> Self {
        Self {
            tempo: 120,
            beats_per_measure: 4,
            subdivisions: 1,
            volume: 0.8,
        }
    }

    pub fn with_tempo(mut self, tempo: u32) -> Self {
        self.set_tempo(tempo);
        self
    }

    pub fn with_beats_per_measure(mut self, beats: u32) -> Self {
        self.set_beats_per_measure(beats);
        self
    }

    pub fn with_subdivisions(mut self, subdivisions: u32) -> Self {
        self.set_subdivisions(subdivisions);
        self
    }

    pub fn with_volume(mut self, volume: f32) -> Self {
        self.set_volume(volume);
        self
    }

    /// Tempo in beats per minute
    pub fn tempo(&self) -> u32 {
        self.tempo
    }

    /// Set the tempo, clamped to `MIN_TEMPO..=MAX_TEMPO`.
    ///
    /// Lowers `subdivisions` if the new tempo no longer allows the current value.
    pub fn set_tempo(&mut self, tempo: u32) {
        self.tempo = tempo.clamp(MIN_TEMPO, MAX_TEMPO);
        self.subdivisions = self.subdivisions.min(self.max_subdivisions());
    }

    pub fn beats_per_measure(&self) -> u32 {
        self.beats_per_measure
    }

    pub fn set_beats_per_measure(&mut self, beats: u32) {
        self.beats_per_measure = beats.max(1);
    }

    /// Clicks per beat (1 = quarter notes only)
    pub fn subdivisions(&self) -> u32 {
        self.subdivisions
    }

    pub fn set_subdivisions(&mut self, subdivisions: u32) {
        self.subdivisions = subdivisions.clamp(1, self.max_subdivisions());
    }

    /// Most subdivisions allowed at the current tempo: `floor(800 / tempo)`
    pub fn max_subdivisions(&self) -> u32 {
        (MAX_CLICKS_PER_MINUTE / self.tempo).max(1)
    }

    /// Master gain (0.0-1.0)
    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Set the master gain, clamped to 0.0-1.0. NaN is ignored.
    pub fn set_volume(&mut self, volume: f32) {
        if volume.is_nan() {
            return;
        }
        self.volume = volume.clamp(0.0, 1.0);
    }

    /// Length of one beat in seconds
    pub fn seconds_per_beat(&self) -> f64 {
        60.0 / self.tempo as f64
    }

    /// Spacing between consecutive clicks in seconds
    pub fn subdivision_interval(&self) -> f64 {
        self.seconds_per_beat() / self.subdivisions as f64
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::new()
    }
}

/// Unchecked field values as they appear in a config file. Missing fields
/// take the defaults.
#[cfg(feature = "serde")]
#[derive(Deserialize)]
#[serde(default)]
struct RawSettings {
    tempo: u32,
    beats_per_measure: u32,
    subdivisions: u32,
    volume: f32,
}

#[cfg(feature = "serde")]
impl Default for RawSettings {
    fn default() -> Self {
        let s = Settings::new();
        Self {
            tempo: s.tempo,
            beats_per_measure: s.beats_per_measure,
            subdivisions: s.subdivisions,
            volume: s.volume,
        }
    }
}

#[cfg(feature = "serde")]
impl From<RawSettings> for Settings {
    // Tempo first so subdivisions clamp against the loaded tempo
    fn from(raw: RawSettings) -> Self {
        Settings::new()
            .with_tempo(raw.tempo)
            .with_beats_per_measure(raw.beats_per_measure)
            .with_subdivisions(raw.subdivisions)
            .with_volume(raw.volume)
    }
}
