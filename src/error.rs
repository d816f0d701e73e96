//! Errors from setting up audio output.
//!
//! Scheduling itself never fails; only opening the device and starting the
//! scheduler thread can.

#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    #[error("no default output device available")]
    NoOutputDevice,

    #[error("failed to fetch default output config: {0}")]
    DefaultConfig(#[from] cpal::DefaultStreamConfigError),

    #[error("unsupported sample format {0:?} (only f32 output is supported)")]
    UnsupportedFormat(cpal::SampleFormat),

    #[error("failed to build output stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[error("failed to start output stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),

    #[error("failed to spawn scheduler thread: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("scheduler thread exited during startup")]
    ThreadExited,
}
