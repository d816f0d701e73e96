//! Audio-thread half of the engine.
//!
//! The scheduler thread pushes [`Tone`]s through a lock-free ring; the
//! renderer pulls them at the top of each block and starts every tone at the
//! exact frame its start time maps to. The frame counter it publishes *is*
//! the audio clock.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use rtrb::{Consumer, Producer, PushError, RingBuffer};

use crate::{
    click::Tone,
    dsp::{Envelope, SineOscillator},
};

/// Capacity of the scheduler -> audio thread tone ring
pub const TONE_QUEUE_SIZE: usize = 256;
/// Simultaneous clicks (release tails can overlap at fast tempos)
pub const MAX_VOICES: usize = 8;

/// Sending half of the tone ring, owned by the scheduler side.
pub struct ToneSender {
    tx: Producer<Tone>,
}

impl ToneSender {
    /// Queue a tone without blocking. Returns false if the ring is full.
    pub fn send(&mut self, tone: Tone) -> bool {
        !matches!(self.tx.push(tone), Err(PushError::Full(_)))
    }
}

/// Read-only view of the renderer's frame position.
#[derive(Debug, Clone)]
pub struct FrameClock {
    frames: Arc<AtomicU64>,
    sample_rate: f32,
}

impl FrameClock {
    /// Frames rendered so far
    pub fn frames(&self) -> u64 {
        self.frames.load(Ordering::Acquire)
    }

    pub fn seconds(&self) -> f64 {
        self.frames() as f64 / self.sample_rate as f64
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }
}

#[derive(Debug, Clone, Copy)]
struct PendingTone {
    start_frame: u64,
    stop_frame: u64,
    frequency: f32,
    gain: f32,
}

#[derive(Debug, Clone, Copy)]
struct ClickVoice {
    osc: SineOscillator,
    env: Envelope,
    gain: f32,
    started_at: u64,
    stop_frame: u64,
}

impl ClickVoice {
    fn new(sample_rate: f32) -> Self {
        Self {
            osc: SineOscillator::new(sample_rate, 440.0),
            env: Envelope::click(sample_rate),
            gain: 0.0,
            started_at: 0,
            stop_frame: 0,
        }
    }

    fn start(&mut self, tone: &PendingTone) {
        self.osc.set_frequency(tone.frequency);
        self.osc.reset();
        self.env.note_on();
        self.gain = tone.gain;
        self.started_at = tone.start_frame;
        self.stop_frame = tone.stop_frame;
    }

    #[inline]
    fn next_sample(&mut self, frame: u64) -> f32 {
        if frame >= self.stop_frame {
            self.env.note_off();
        }
        self.osc.next_sample() * self.env.next_sample() * self.gain
    }

    fn is_active(&self) -> bool {
        self.env.is_active()
    }
}

pub struct ToneRenderer {
    rx: Consumer<Tone>,
    sample_rate: f32,
    frame: u64,
    position: Arc<AtomicU64>,
    pending: VecDeque<PendingTone>,
    voices: Vec<ClickVoice>,
}

impl ToneRenderer {
    pub fn new(sample_rate: f32) -> (Self, ToneSender) {
        let (tx, rx) = RingBuffer::<Tone>::new(TONE_QUEUE_SIZE);

        let renderer = Self {
            rx,
            sample_rate,
            frame: 0,
            position: Arc::new(AtomicU64::new(0)),
            pending: VecDeque::with_capacity(TONE_QUEUE_SIZE),
            voices: vec![ClickVoice::new(sample_rate); MAX_VOICES],
        };

        (renderer, ToneSender { tx })
    }

    pub fn frame_clock(&self) -> FrameClock {
        FrameClock {
            frames: self.position.clone(),
            sample_rate: self.sample_rate,
        }
    }

    /// Frames rendered so far
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Number of voices still sounding
    pub fn active_voices(&self) -> usize {
        self.voices.iter().filter(|v| v.is_active()).count()
    }

    /// Render the next `out.len()` mono frames and advance the clock.
    pub fn render_block(&mut self, out: &mut [f32]) {
        self.drain_queue();

        for (i, sample) in out.iter_mut().enumerate() {
            let frame = self.frame + i as u64;

            while let Some(tone) = self.pending.front().copied() {
                if tone.start_frame > frame {
                    break;
                }
                self.pending.pop_front();
                self.start_voice(&tone);
            }

            let mut acc = 0.0;
            for voice in self.voices.iter_mut().filter(|v| v.is_active()) {
                acc += voice.next_sample(frame);
            }
            *sample = acc;
        }

        self.frame += out.len() as u64;
        self.position.store(self.frame, Ordering::Release);
    }

    fn drain_queue(&mut self) {
        // Capacity matches the ring, so this never reallocates
        while self.pending.len() < TONE_QUEUE_SIZE {
            let Ok(tone) = self.rx.pop() else {
                break;
            };
            let start_frame = self.to_frame(tone.start);
            let stop_frame = self.to_frame(tone.stop).max(start_frame + 1);
            // Keep pending sorted by start frame: a restart queues tones
            // earlier than the trailing ones of the previous run
            let idx = self.pending.partition_point(|p| p.start_frame <= start_frame);
            self.pending.insert(
                idx,
                PendingTone {
                    start_frame,
                    stop_frame,
                    frequency: tone.frequency,
                    gain: tone.gain,
                },
            );
        }
    }

    fn to_frame(&self, seconds: f64) -> u64 {
        (seconds * self.sample_rate as f64).round().max(0.0) as u64
    }

    fn start_voice(&mut self, tone: &PendingTone) {
        // Free voice first, otherwise steal the oldest
        let idx = self
            .voices
            .iter()
            .position(|v| !v.is_active())
            .or_else(|| {
                self.voices
                    .iter()
                    .enumerate()
                    .min_by_key(|(_, v)| v.started_at)
                    .map(|(idx, _)| idx)
            });

        if let Some(idx) = idx {
            self.voices[idx].start(tone);
        }
    }
}
