pub mod click; // Click kinds and the tone events handed to the audio clock
pub mod clock;
pub mod dsp;
pub mod engine; // cpal output stream + sample-accurate tone rendering
pub mod error;
pub mod runtime; // Owning-thread handle around the scheduler
pub mod scheduler;
pub mod settings;
pub mod timer;

pub use click::{ClickKind, Tone};
pub use clock::{AudioClock, InstantClock};
pub use error::AudioError;
pub use runtime::Metronome;
pub use scheduler::{BeatCallback, BeatScheduler};
pub use settings::Settings;
pub use timer::{Timer, TimerEvent, TimerQueue};

pub const MAX_BLOCK_SIZE: usize = 2048;
pub(crate) const MIN_TIME: f32 = 1.0 / 48_000.0;
