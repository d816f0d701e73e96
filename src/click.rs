//! Click sounds.
//!
//! A click is a short sine burst. Three profiles exist so the ear can follow
//! the meter: the downbeat of each measure is higher and louder than the other
//! beats, and subdivision clicks sit lowest and quietest.

/// How long each click sounds, in seconds
pub const TONE_DURATION: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickKind {
    /// First beat of the measure
    Accent,
    /// Any other primary beat
    Beat,
    /// Intermediate click between primary beats
    Subdivision,
}

impl ClickKind {
    /// Pick the click for a note given its beat index and subdivision index.
    pub fn classify(beat: u32, subdivision: u32) -> Self {
        if subdivision > 0 {
            ClickKind::Subdivision
        } else if beat == 0 {
            ClickKind::Accent
        } else {
            ClickKind::Beat
        }
    }

    /// Oscillator frequency in Hz
    pub fn frequency(self) -> f32 {
        match self {
            ClickKind::Accent => 1000.0,
            ClickKind::Beat => 800.0,
            ClickKind::Subdivision => 600.0,
        }
    }

    /// Gain before the master volume is applied
    pub fn gain(self) -> f32 {
        match self {
            ClickKind::Accent => 1.0,
            ClickKind::Beat => 0.5,
            ClickKind::Subdivision => 0.25,
        }
    }

    /// Primary beats carry a beat notification, subdivisions do not.
    pub fn is_primary(self) -> bool {
        !matches!(self, ClickKind::Subdivision)
    }
}

/// A tone to be rendered on the audio clock.
///
/// `start` and `stop` are audio-clock seconds. The renderer starts the tone
/// at exactly `start`, however early the scheduler decided on it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    pub start: f64,
    pub stop: f64,
    pub frequency: f32,
    pub gain: f32,
    pub kind: ClickKind,
}

impl Tone {
    /// Build the click tone for `kind` at `start`, scaled by `volume`.
    pub fn click(kind: ClickKind, start: f64, volume: f32) -> Self {
        Self {
            start,
            stop: start + TONE_DURATION,
            frequency: kind.frequency(),
            gain: kind.gain() * volume,
            kind,
        }
    }
}
