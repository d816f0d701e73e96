//! Virtual-time harness for the beat scheduler.
//!
//! Both clocks are simulated: the audio clock reads a virtual `now`, and the
//! poll timer fires on a nominal 25 ms grid plus a pseudo-random delay, the
//! way a busy UI thread would. Beat timers fire exactly on their deadline.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use metronium::{AudioClock, BeatScheduler, Settings, Timer, Tone};

#[derive(Debug, Default)]
pub struct SimClock {
    pub now: f64,
    /// (tone, audio-clock time at which it was handed over)
    pub tones: Vec<(Tone, f64)>,
}

impl AudioClock for SimClock {
    fn current_time(&self) -> f64 {
        self.now
    }

    fn play_tone(&mut self, tone: Tone) {
        self.tones.push((tone, self.now));
    }
}

#[derive(Debug, Default)]
pub struct SimTimer {
    pub now: f64,
    pub period: Option<f64>,
    pub next_poll: f64,
    pub intervals_started: u32,
    /// (due, beat)
    pub beats: Vec<(f64, u32)>,
}

impl Timer for SimTimer {
    fn start_interval(&mut self, period: Duration) {
        let period = period.as_secs_f64();
        self.period = Some(period);
        self.next_poll = self.now + period;
        self.intervals_started += 1;
    }

    fn cancel_interval(&mut self) {
        self.period = None;
    }

    fn defer_beat(&mut self, delay: Duration, beat: u32) {
        self.beats.push((self.now + delay.as_secs_f64(), beat));
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Notification {
    pub at: f64,
    pub beat: u32,
}

pub struct Simulation {
    pub scheduler: BeatScheduler<SimClock, SimTimer>,
    notifications: Arc<Mutex<Vec<Notification>>>,
    now: Arc<Mutex<f64>>,
    max_jitter: f64,
    rng: u32,
}

impl Simulation {
    pub fn new(settings: Settings) -> Self {
        let scheduler =
            BeatScheduler::with_settings(SimClock::default(), SimTimer::default(), settings);
        let mut sim = Self {
            scheduler,
            notifications: Arc::new(Mutex::new(Vec::new())),
            now: Arc::new(Mutex::new(0.0)),
            max_jitter: 0.0,
            rng: 0x9E37_79B9,
        };

        let sink = sim.notifications.clone();
        let now = sim.now.clone();
        sim.scheduler.set_on_beat(Box::new(move |beat| {
            let at = *now.lock().unwrap();
            sink.lock().unwrap().push(Notification { at, beat });
        }));
        sim
    }

    /// Delay every poll by up to `max_jitter` seconds.
    pub fn with_jitter(mut self, max_jitter: f64) -> Self {
        self.max_jitter = max_jitter;
        self
    }

    pub fn now(&self) -> f64 {
        self.scheduler.clock().now
    }

    pub fn set_now(&mut self, t: f64) {
        self.scheduler.clock_mut().now = t;
        self.scheduler.timer_mut().now = t;
        *self.now.lock().unwrap() = t;
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications.lock().unwrap().clone()
    }

    pub fn tones(&self) -> &[(Tone, f64)] {
        &self.scheduler.clock().tones
    }

    /// Push the next poll back by `stall` seconds, as if the host thread hung.
    pub fn stall(&mut self, stall: f64) {
        self.scheduler.timer_mut().next_poll += stall;
    }

    /// Run every timer event due up to and including `end`.
    pub fn advance_to(&mut self, end: f64) {
        loop {
            let poll_due = self
                .scheduler
                .timer()
                .period
                .map(|_| self.scheduler.timer().next_poll);
            let beat_due = self
                .scheduler
                .timer()
                .beats
                .iter()
                .map(|&(due, _)| due)
                .fold(None, |acc: Option<f64>, due| Some(acc.map_or(due, |a| a.min(due))));

            let now = self.now();
            let poll_at = poll_due.map(|due| (due + self.next_jitter()).max(now));

            let next = match (poll_at, beat_due) {
                (Some(p), Some(b)) if b <= p => Event::Beat(b),
                (Some(p), _) => Event::Poll(p),
                (None, Some(b)) => Event::Beat(b),
                (None, None) => break,
            };

            match next {
                Event::Beat(at) if at <= end => {
                    self.set_now(at);
                    let timer = self.scheduler.timer_mut();
                    let idx = timer
                        .beats
                        .iter()
                        .position(|&(due, _)| due == at)
                        .expect("beat due");
                    let (_, beat) = timer.beats.remove(idx);
                    self.scheduler.deliver_beat(beat);
                }
                Event::Poll(at) if at <= end => {
                    self.set_now(at);
                    let timer = self.scheduler.timer_mut();
                    if let Some(period) = timer.period {
                        timer.next_poll = (timer.next_poll + period).max(at);
                    }
                    self.scheduler.poll();
                }
                _ => break,
            }
        }
        self.set_now(end);
    }

    fn next_jitter(&mut self) -> f64 {
        if self.max_jitter == 0.0 {
            return 0.0;
        }
        // xorshift32
        self.rng ^= self.rng << 13;
        self.rng ^= self.rng >> 17;
        self.rng ^= self.rng << 5;
        (self.rng as f64 / u32::MAX as f64) * self.max_jitter
    }
}

enum Event {
    Poll(f64),
    Beat(f64),
}
