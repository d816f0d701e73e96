//! Audio output.
//!
//! [`AudioEngine`] is the real [`AudioClock`]: a cpal output stream whose
//! callback runs a [`ToneRenderer`]. Time on this clock is "frames the
//! device has consumed", so a tone scheduled for time `t` lands on the exact
//! sample `t * sample_rate` no matter when the scheduler got around to it.
//!
//! [`OfflineEngine`] wires the same renderer to a caller-driven buffer, for
//! bouncing clicks without a device.

pub mod renderer;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::SampleFormat;
use tracing::{info, warn};

pub use renderer::{FrameClock, ToneRenderer, ToneSender};

use crate::{click::Tone, clock::AudioClock, error::AudioError, MAX_BLOCK_SIZE};

/// Default output device driven by the tone renderer.
///
/// The stream is opened suspended: the callback outputs silence and the clock
/// stays at 0 until [`AudioClock::resume`] is called. Not `Send` on every
/// platform, so create it on the thread that will use it.
pub struct AudioEngine {
    stream: cpal::Stream,
    tones: ToneSender,
    clock: FrameClock,
    running: Arc<AtomicBool>,
    channels: usize,
}

impl AudioEngine {
    pub fn open() -> Result<Self, AudioError> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(AudioError::NoOutputDevice)?;
        let config = device.default_output_config()?;
        if config.sample_format() != SampleFormat::F32 {
            return Err(AudioError::UnsupportedFormat(config.sample_format()));
        }

        let sample_rate = config.sample_rate().0 as f32;
        let channels = config.channels() as usize;

        let (mut renderer, tones) = ToneRenderer::new(sample_rate);
        let clock = renderer.frame_clock();
        let running = Arc::new(AtomicBool::new(false));

        let stream = device.build_output_stream(
            &config.into(),
            {
                let running = running.clone();
                let mut render_buf = vec![0.0f32; MAX_BLOCK_SIZE];
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    if !running.load(Ordering::Acquire) {
                        data.fill(0.0);
                        return;
                    }

                    let total_frames = data.len() / channels;
                    let mut frames_written = 0;
                    while frames_written < total_frames {
                        let frames_to_render = (total_frames - frames_written).min(MAX_BLOCK_SIZE);
                        let block = &mut render_buf[..frames_to_render];
                        renderer.render_block(block);

                        // Mono to all channels
                        let out_off = frames_written * channels;
                        for (i, &s) in block.iter().enumerate() {
                            for ch in 0..channels {
                                data[out_off + i * channels + ch] = s;
                            }
                        }

                        frames_written += frames_to_render;
                    }
                }
            },
            |err| warn!(%err, "audio stream error"),
            None,
        )?;

        info!(
            device = %device.name().unwrap_or_else(|_| "unknown".into()),
            sample_rate,
            channels,
            "audio engine opened"
        );

        Ok(Self {
            stream,
            tones,
            clock,
            running,
            channels,
        })
    }

    pub fn sample_rate(&self) -> f32 {
        self.clock.sample_rate()
    }

    pub fn channels(&self) -> usize {
        self.channels
    }
}

impl AudioClock for AudioEngine {
    fn current_time(&self) -> f64 {
        self.clock.seconds()
    }

    fn is_suspended(&self) -> bool {
        !self.running.load(Ordering::Acquire)
    }

    fn resume(&mut self) {
        self.running.store(true, Ordering::Release);
        if let Err(err) = self.stream.play().map_err(AudioError::from) {
            warn!(%err, "failed to resume audio stream");
        }
    }

    fn play_tone(&mut self, tone: Tone) {
        if !self.tones.send(tone) {
            warn!(start = tone.start, "tone queue full, dropping click");
        }
    }
}

/// Renderer and clock without a device: time advances only when
/// [`OfflineEngine::render`] is called.
pub struct OfflineEngine {
    renderer: ToneRenderer,
    tones: ToneSender,
    clock: FrameClock,
}

impl OfflineEngine {
    pub fn new(sample_rate: f32) -> Self {
        let (renderer, tones) = ToneRenderer::new(sample_rate);
        let clock = renderer.frame_clock();
        Self {
            renderer,
            tones,
            clock,
        }
    }

    /// Render mono output, splitting into `MAX_BLOCK_SIZE` blocks.
    pub fn render(&mut self, out: &mut [f32]) {
        for block in out.chunks_mut(MAX_BLOCK_SIZE) {
            self.renderer.render_block(block);
        }
    }

    pub fn sample_rate(&self) -> f32 {
        self.clock.sample_rate()
    }

    pub fn active_voices(&self) -> usize {
        self.renderer.active_voices()
    }
}

impl AudioClock for OfflineEngine {
    fn current_time(&self) -> f64 {
        self.clock.seconds()
    }

    fn play_tone(&mut self, tone: Tone) {
        if !self.tones.send(tone) {
            warn!(start = tone.start, "tone queue full, dropping click");
        }
    }
}
