//! Lookahead beat scheduler.
//!
//! Deciding *when* a click plays and actually *playing* it happen on two
//! different clocks:
//!
//! ```text
//!   coarse timer   |  poll     poll     poll (late)        poll
//!                  |   v        v            v              v
//!   audio clock    |---x----x----x----x----x----x----x----x----->
//!                      \__________/
//!                    lookahead window (0.1 s)
//! ```
//!
//! Every poll fills the window `[now, now + LOOKAHEAD)` of the audio clock
//! with whatever notes fall inside it. The audio clock renders each note at
//! its exact time, so the poll only has to run *often enough*, never *on
//! time*. With a 25 ms poll and a 100 ms window a poll can be ~75 ms late
//! before the queue of decided notes runs dry.
//!
//! A late poll simply finds more notes inside the window and schedules all
//! of them; nothing is skipped.
//!
//! Beat notifications go through a second, cruder compensation: the UI has
//! no equivalent of the audio clock, so each primary beat arms a one-shot
//! timer for `note_time - now`, firing roughly when the click is heard.

use std::time::Duration;

use tracing::{debug, info, trace};

use crate::{
    click::{ClickKind, Tone},
    clock::AudioClock,
    settings::Settings,
    timer::Timer,
};

/// Period of the coarse scheduling poll
pub const POLL_INTERVAL: Duration = Duration::from_millis(25);
/// How far ahead of the audio clock notes are decided, in seconds
pub const LOOKAHEAD: f64 = 0.1;

/// Called with the 0-based beat index of every primary beat.
pub type BeatCallback = Box<dyn FnMut(u32) + Send>;

pub struct BeatScheduler<C, T> {
    clock: C,
    timer: T,
    settings: Settings,
    playing: bool,
    /// Audio-clock time of the next note not yet handed to the clock
    next_note_time: f64,
    current_beat: u32,
    current_subdiv: u32,
    on_beat: Option<BeatCallback>,
}

impl<C: AudioClock, T: Timer> BeatScheduler<C, T> {
    pub fn new(clock: C, timer: T) -> Self {
        Self::with_settings(clock, timer, Settings::default())
    }

    pub fn with_settings(clock: C, timer: T, settings: Settings) -> Self {
        Self {
            clock,
            timer,
            settings,
            playing: false,
            next_note_time: 0.0,
            current_beat: 0,
            current_subdiv: 0,
            on_beat: None,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn tempo(&self) -> u32 {
        self.settings.tempo()
    }

    /// Set the tempo (clamped to 20-400 BPM).
    ///
    /// May lower `subdivisions` when the new tempo allows fewer of them.
    pub fn set_tempo(&mut self, tempo: u32) {
        self.settings.set_tempo(tempo);
        self.rewrap_counters();
        debug!(tempo = self.settings.tempo(), "tempo changed");
    }

    pub fn beats_per_measure(&self) -> u32 {
        self.settings.beats_per_measure()
    }

    pub fn set_beats_per_measure(&mut self, beats: u32) {
        self.settings.set_beats_per_measure(beats);
        self.rewrap_counters();
        debug!(beats = self.settings.beats_per_measure(), "meter changed");
    }

    pub fn subdivisions(&self) -> u32 {
        self.settings.subdivisions()
    }

    pub fn max_subdivisions(&self) -> u32 {
        self.settings.max_subdivisions()
    }

    pub fn set_subdivisions(&mut self, subdivisions: u32) {
        self.settings.set_subdivisions(subdivisions);
        self.rewrap_counters();
        debug!(subdivisions = self.settings.subdivisions(), "subdivisions changed");
    }

    pub fn volume(&self) -> f32 {
        self.settings.volume()
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.settings.set_volume(volume);
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Beat index the next primary note will carry
    pub fn current_beat(&self) -> u32 {
        self.current_beat
    }

    pub fn current_subdivision(&self) -> u32 {
        self.current_subdiv
    }

    /// Audio-clock time of the next undecided note
    pub fn next_note_time(&self) -> f64 {
        self.next_note_time
    }

    /// Register the beat callback, dropping any previous one.
    pub fn set_on_beat(&mut self, callback: BeatCallback) {
        self.on_beat = Some(callback);
    }

    pub fn clear_on_beat(&mut self) {
        self.on_beat = None;
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }

    pub fn timer_mut(&mut self) -> &mut T {
        &mut self.timer
    }

    /// Start the transport. Does nothing if already playing.
    ///
    /// The first pass runs right away so the downbeat is not held back by a
    /// full poll period.
    pub fn start(&mut self) {
        if self.playing {
            return;
        }

        if self.clock.is_suspended() {
            self.clock.resume();
        }

        self.playing = true;
        self.current_beat = 0;
        self.current_subdiv = 0;
        self.next_note_time = self.clock.current_time();
        info!(
            tempo = self.settings.tempo(),
            beats = self.settings.beats_per_measure(),
            subdivisions = self.settings.subdivisions(),
            at = self.next_note_time,
            "transport started"
        );

        self.schedule_ahead();
        self.timer.start_interval(POLL_INTERVAL);
    }

    /// Stop the transport. Does nothing if already stopped.
    ///
    /// Tones and beat timers already handed out are not recalled; they play
    /// out over the next ~125 ms. Counters are reset by the next `start`.
    pub fn stop(&mut self) {
        if !self.playing {
            return;
        }
        self.playing = false;
        self.timer.cancel_interval();
        info!("transport stopped");
    }

    pub fn toggle(&mut self) {
        if self.playing {
            self.stop();
        } else {
            self.start();
        }
    }

    /// Scheduling pass for one tick of the coarse poll.
    pub fn poll(&mut self) {
        if !self.playing {
            return;
        }
        self.schedule_ahead();
    }

    /// Deliver a deferred beat notification to the callback.
    ///
    /// Not gated on `is_playing`: notifications armed before a
    /// `stop` still reach the callback.
    pub fn deliver_beat(&mut self, beat: u32) {
        if let Some(on_beat) = self.on_beat.as_mut() {
            on_beat(beat);
        }
    }

    fn schedule_ahead(&mut self) {
        let interval = self.settings.subdivision_interval();
        let horizon = self.clock.current_time() + LOOKAHEAD;

        while self.next_note_time < horizon {
            let kind = ClickKind::classify(self.current_beat, self.current_subdiv);
            self.schedule_note(self.next_note_time, self.current_beat, kind);

            self.current_subdiv += 1;
            if self.current_subdiv >= self.settings.subdivisions() {
                self.current_subdiv = 0;
                self.current_beat = (self.current_beat + 1) % self.settings.beats_per_measure();
            }

            self.next_note_time += interval;
        }
    }

    fn schedule_note(&mut self, time: f64, beat: u32, kind: ClickKind) {
        trace!(time, beat, ?kind, "note");
        self.clock
            .play_tone(Tone::click(kind, time, self.settings.volume()));

        if !kind.is_primary() {
            return;
        }

        let delay = time - self.clock.current_time();
        if delay > 0.0 {
            self.timer.defer_beat(Duration::from_secs_f64(delay), beat);
        } else {
            self.deliver_beat(beat);
        }
    }

    /// Keep the counters inside the current meter after a setter shrank it.
    fn rewrap_counters(&mut self) {
        if self.current_subdiv >= self.settings.subdivisions() {
            self.current_subdiv = 0;
            self.current_beat += 1;
        }
        if self.current_beat >= self.settings.beats_per_measure() {
            self.current_beat = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct FakeClock {
        now: f64,
        suspended: bool,
        resumed: u32,
        tones: Vec<Tone>,
    }

    impl AudioClock for FakeClock {
        fn current_time(&self) -> f64 {
            self.now
        }

        fn is_suspended(&self) -> bool {
            self.suspended
        }

        fn resume(&mut self) {
            self.suspended = false;
            self.resumed += 1;
        }

        fn play_tone(&mut self, tone: Tone) {
            self.tones.push(tone);
        }
    }

    #[derive(Default)]
    struct FakeTimer {
        interval: Option<Duration>,
        intervals_started: u32,
        deferred: Vec<(Duration, u32)>,
    }

    impl Timer for FakeTimer {
        fn start_interval(&mut self, period: Duration) {
            self.interval = Some(period);
            self.intervals_started += 1;
        }

        fn cancel_interval(&mut self) {
            self.interval = None;
        }

        fn defer_beat(&mut self, delay: Duration, beat: u32) {
            self.deferred.push((delay, beat));
        }
    }

    fn scheduler() -> (BeatScheduler<FakeClock, FakeTimer>, Arc<Mutex<Vec<u32>>>) {
        let mut s = BeatScheduler::new(FakeClock::default(), FakeTimer::default());
        let beats = Arc::new(Mutex::new(Vec::new()));
        let sink = beats.clone();
        s.set_on_beat(Box::new(move |b| sink.lock().unwrap().push(b)));
        (s, beats)
    }

    #[test]
    fn lookahead_outlasts_poll_interval() {
        assert!(LOOKAHEAD > POLL_INTERVAL.as_secs_f64());
    }

    #[test]
    fn start_schedules_downbeat_immediately() {
        let (mut s, beats) = scheduler();
        s.clock_mut().now = 3.0;
        s.start();

        assert!(s.is_playing());
        let tones = &s.clock().tones;
        assert_eq!(tones.len(), 1);
        assert_eq!(tones[0].start, 3.0);
        assert_eq!(tones[0].kind, ClickKind::Accent);

        // Note time equals now, so the notification is not deferred
        assert_eq!(*beats.lock().unwrap(), vec![0]);
        assert!(s.timer().deferred.is_empty());
        assert_eq!(s.timer().interval, Some(POLL_INTERVAL));
        assert!((s.next_note_time() - 3.5).abs() < 1e-9);
    }

    #[test]
    fn start_resumes_suspended_clock() {
        let (mut s, _) = scheduler();
        s.clock_mut().suspended = true;
        s.start();
        assert_eq!(s.clock().resumed, 1);
        assert!(!s.clock().is_suspended());
    }

    #[test]
    fn second_start_is_ignored() {
        let (mut s, beats) = scheduler();
        s.start();
        s.clock_mut().now = 0.45;
        s.poll();
        let beat = s.current_beat();
        let tones = s.clock().tones.len();

        s.start();
        assert_eq!(s.timer().intervals_started, 1);
        assert_eq!(s.current_beat(), beat);
        assert_eq!(s.clock().tones.len(), tones);
        assert_eq!(beats.lock().unwrap().len(), 1);
    }

    #[test]
    fn poll_defers_future_beats() {
        let (mut s, beats) = scheduler();
        s.start();

        s.clock_mut().now = 0.42;
        s.poll();

        // Note at 0.5 falls inside [0.42, 0.52)
        assert_eq!(s.clock().tones.len(), 2);
        assert_eq!(s.timer().deferred.len(), 1);
        let (delay, beat) = s.timer().deferred[0];
        assert_eq!(beat, 1);
        assert!((delay.as_secs_f64() - 0.08).abs() < 1e-6);
        assert_eq!(*beats.lock().unwrap(), vec![0]);

        s.deliver_beat(beat);
        assert_eq!(*beats.lock().unwrap(), vec![0, 1]);
    }

    #[test]
    fn late_poll_catches_up_without_dropping_notes() {
        let (mut s, beats) = scheduler();
        s.start();

        // Poll arrives 1.2 s late: notes at 0.5, 1.0 are past, 1.5 and 2.0 are not
        s.clock_mut().now = 1.2;
        s.poll();

        let starts: Vec<f64> = s.clock().tones.iter().map(|t| t.start).collect();
        assert_eq!(starts.len(), 3);
        assert!((starts[1] - 0.5).abs() < 1e-9);
        assert!((starts[2] - 1.0).abs() < 1e-9);

        // Past-due beats are notified immediately
        assert_eq!(*beats.lock().unwrap(), vec![0, 1, 2]);
        assert!(s.timer().deferred.is_empty());
    }

    #[test]
    fn subdivisions_use_their_own_profile() {
        let (mut s, beats) = scheduler();
        s.set_subdivisions(4);
        s.start();
        s.clock_mut().now = 0.45;
        s.poll();

        let kinds: Vec<ClickKind> = s.clock().tones.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ClickKind::Accent,
                ClickKind::Subdivision,
                ClickKind::Subdivision,
                ClickKind::Subdivision,
                ClickKind::Beat,
            ]
        );
        // Only primary beats notify
        assert_eq!(beats.lock().unwrap().len(), 1);
        assert_eq!(s.timer().deferred.len(), 1);
    }

    #[test]
    fn beat_index_wraps_at_measure() {
        let (mut s, beats) = scheduler();
        s.set_beats_per_measure(3);
        s.start();
        s.clock_mut().now = 2.0;
        s.poll();

        assert_eq!(*beats.lock().unwrap(), vec![0, 1, 2, 0, 1]);
        let accents = s
            .clock()
            .tones
            .iter()
            .filter(|t| t.kind == ClickKind::Accent)
            .count();
        assert_eq!(accents, 2);
    }

    #[test]
    fn volume_scales_tone_gain() {
        let (mut s, _) = scheduler();
        s.set_volume(0.5);
        s.start();
        assert_eq!(s.clock().tones[0].gain, 0.5);
    }

    #[test]
    fn stop_cancels_poll_but_keeps_counters() {
        let (mut s, _) = scheduler();
        s.start();
        s.clock_mut().now = 0.45;
        s.poll();
        let beat = s.current_beat();

        s.stop();
        assert!(!s.is_playing());
        assert_eq!(s.timer().interval, None);
        assert_eq!(s.current_beat(), beat);

        // A poll that was already in flight does nothing
        let tones = s.clock().tones.len();
        s.clock_mut().now = 5.0;
        s.poll();
        assert_eq!(s.clock().tones.len(), tones);
    }

    #[test]
    fn deferred_beats_still_delivered_after_stop() {
        let (mut s, beats) = scheduler();
        s.start();
        s.clock_mut().now = 0.45;
        s.poll();
        s.stop();

        let (_, beat) = s.timer().deferred[0];
        s.deliver_beat(beat);
        assert_eq!(*beats.lock().unwrap(), vec![0, 1]);
    }

    #[test]
    fn restart_resets_counters() {
        let (mut s, beats) = scheduler();
        s.start();
        s.clock_mut().now = 1.2;
        s.poll();
        s.stop();

        s.clock_mut().now = 10.0;
        s.start();
        assert_eq!(s.timer().intervals_started, 2);
        assert_eq!(beats.lock().unwrap().last(), Some(&0));
        assert_eq!(s.clock().tones.last().map(|t| t.start), Some(10.0));
    }

    #[test]
    fn toggle_flips_transport() {
        let (mut s, _) = scheduler();
        s.toggle();
        assert!(s.is_playing());
        s.toggle();
        assert!(!s.is_playing());
    }

    #[test]
    fn tempo_change_clamps_subdivisions() {
        let (mut s, _) = scheduler();
        s.set_subdivisions(3);
        s.set_tempo(400);
        assert_eq!(s.subdivisions(), 2);
        assert_eq!(s.max_subdivisions(), 2);
    }

    #[test]
    fn shrinking_subdivisions_moves_to_next_beat() {
        let (mut s, _) = scheduler();
        s.set_subdivisions(4);
        s.start();
        s.clock_mut().now = 0.2;
        s.poll();
        // Notes at 0.0, 0.125, 0.25 decided; next is subdivision 3 of beat 0
        assert_eq!(s.current_subdivision(), 3);

        s.set_subdivisions(2);
        assert_eq!(s.current_subdivision(), 0);
        assert_eq!(s.current_beat(), 1);
    }

    #[test]
    fn shrinking_meter_restarts_measure() {
        let (mut s, _) = scheduler();
        s.start();
        s.clock_mut().now = 1.45;
        s.poll();
        assert_eq!(s.current_beat(), 0); // notes at 0, .5, 1, 1.5 decided

        s.clock_mut().now = 1.95;
        s.poll();
        assert_eq!(s.current_beat(), 1);
        s.clock_mut().now = 2.45;
        s.poll();
        assert_eq!(s.current_beat(), 2);

        s.set_beats_per_measure(2);
        assert_eq!(s.current_beat(), 0);
    }

    #[test]
    fn replacing_callback_drops_previous() {
        let (mut s, first) = scheduler();
        let second = Arc::new(Mutex::new(Vec::new()));
        let sink = second.clone();
        s.set_on_beat(Box::new(move |b| sink.lock().unwrap().push(b)));

        s.start();
        assert!(first.lock().unwrap().is_empty());
        assert_eq!(*second.lock().unwrap(), vec![0]);
    }
}
