//! The coarse side of lookahead scheduling.
//!
//! A [`Timer`] offers two things with no precision guarantee: a repeating
//! poll that drives scheduling passes, and one-shot delays that carry a beat
//! notification to the moment its click is actually heard.
//!
//! [`TimerQueue`] implements it for a single-threaded event loop. It never
//! calls back into anything; the loop asks it which events are due and
//! dispatches them itself.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::time::{Duration, Instant};

pub trait Timer {
    /// Start firing [`TimerEvent::Poll`] every `period`, replacing any running poll.
    fn start_interval(&mut self, period: Duration);

    /// Stop the repeating poll. Pending beat timers are left alone.
    fn cancel_interval(&mut self);

    /// Fire [`TimerEvent::Beat`] for `beat` once, after `delay`.
    fn defer_beat(&mut self, delay: Duration, beat: u32);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// Time for a scheduling pass
    Poll,
    /// A deferred beat notification is due
    Beat(u32),
}

#[derive(Debug, Clone, Copy)]
struct Interval {
    period: Duration,
    next: Instant,
}

/// Deadline-ordered timer facility for an event loop.
#[derive(Debug, Default)]
pub struct TimerQueue {
    interval: Option<Interval>,
    /// (due, insertion order, beat) - insertion order keeps equal deadlines FIFO
    beats: BinaryHeap<Reverse<(Instant, u64, u32)>>,
    seq: u64,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Earliest instant at which an event becomes due, if any.
    pub fn next_deadline(&self) -> Option<Instant> {
        let poll = self.interval.map(|i| i.next);
        let beat = self.beats.peek().map(|Reverse((due, _, _))| *due);
        match (poll, beat) {
            (Some(p), Some(b)) => Some(p.min(b)),
            (p, b) => p.or(b),
        }
    }

    /// Pop the next event due at or before `now`.
    ///
    /// Beat notifications come out before a poll due at the same time. A late
    /// poll fires once and is re-armed one period after `now`, like a browser
    /// interval that skips missed periods.
    pub fn pop_due(&mut self, now: Instant) -> Option<TimerEvent> {
        if let Some(Reverse((due, _, beat))) = self.beats.peek().copied() {
            let beat_first = self.interval.map_or(true, |i| due <= i.next);
            if due <= now && beat_first {
                self.beats.pop();
                return Some(TimerEvent::Beat(beat));
            }
        }

        let interval = self.interval.as_mut()?;
        if interval.next > now {
            return None;
        }
        interval.next += interval.period;
        if interval.next <= now {
            interval.next = now + interval.period;
        }
        Some(TimerEvent::Poll)
    }

    /// Whether the repeating poll is armed
    pub fn is_polling(&self) -> bool {
        self.interval.is_some()
    }

    /// Number of beat notifications still waiting
    pub fn pending_beats(&self) -> usize {
        self.beats.len()
    }

    fn schedule_interval(&mut self, period: Duration, now: Instant) {
        self.interval = Some(Interval {
            period,
            next: now + period,
        });
    }

    fn schedule_beat(&mut self, due: Instant, beat: u32) {
        self.seq = self.seq.wrapping_add(1);
        self.beats.push(Reverse((due, self.seq, beat)));
    }
}

impl Timer for TimerQueue {
    fn start_interval(&mut self, period: Duration) {
        self.schedule_interval(period, Instant::now());
    }

    fn cancel_interval(&mut self) {
        self.interval = None;
    }

    fn defer_beat(&mut self, delay: Duration, beat: u32) {
        self.schedule_beat(Instant::now() + delay, beat);
    }
}
