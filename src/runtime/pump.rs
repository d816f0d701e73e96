//! Scheduler event loop.
//!
//! One thread, one loop: fire whatever the timer queue says is due, then
//! sleep on the command channel until the next deadline. Polls, deferred beat
//! notifications and commands are all handled here, one at a time.

use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use tracing::debug;

use super::Command;
use crate::{
    clock::AudioClock,
    scheduler::BeatScheduler,
    settings::Settings,
    timer::{TimerEvent, TimerQueue},
};

/// Wait used when no timer is armed
const IDLE_WAIT: Duration = Duration::from_millis(250);

pub(super) fn run<C: AudioClock>(clock: C, settings: Settings, rx: Receiver<Command>) {
    let mut scheduler = BeatScheduler::with_settings(clock, TimerQueue::new(), settings);

    loop {
        let now = Instant::now();
        while let Some(event) = scheduler.timer_mut().pop_due(now) {
            match event {
                TimerEvent::Poll => scheduler.poll(),
                TimerEvent::Beat(beat) => scheduler.deliver_beat(beat),
            }
        }

        let timeout = scheduler
            .timer()
            .next_deadline()
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
            .unwrap_or(IDLE_WAIT);

        match rx.recv_timeout(timeout) {
            Ok(command) => apply(&mut scheduler, command),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    scheduler.stop();
    debug!("scheduler thread exiting");
}

fn apply<C: AudioClock>(scheduler: &mut BeatScheduler<C, TimerQueue>, command: Command) {
    match command {
        Command::Start => scheduler.start(),
        Command::Stop => scheduler.stop(),
        Command::Toggle => scheduler.toggle(),
        Command::SetTempo(tempo) => scheduler.set_tempo(tempo),
        Command::SetBeatsPerMeasure(beats) => scheduler.set_beats_per_measure(beats),
        Command::SetSubdivisions(subdivisions) => scheduler.set_subdivisions(subdivisions),
        Command::SetVolume(volume) => scheduler.set_volume(volume),
        Command::SetOnBeat(callback) => scheduler.set_on_beat(callback),
        Command::ClearOnBeat => scheduler.clear_on_beat(),
    }
}
