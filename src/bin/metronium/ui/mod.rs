//! TUI module for metronium
//!
//! Drives the metronome from the keyboard and lights a beat dot for every
//! beat notification coming back from the scheduler thread.

mod beats;
mod theme;
mod transport;

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use metronium::{settings::MAX_BEATS_PER_MEASURE, Metronome};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::Style,
    widgets::Paragraph,
    DefaultTerminal, Frame,
};
use rtrb::Consumer;
use std::time::Duration;

use beats::render_beats;
use theme::Theme;
use transport::render_transport;

const HELP: &str =
    " [Space] Start/Stop  [↑/↓] BPM ±1  [PgUp/PgDn] BPM ±10  [←/→] Beats  [ [ ] ] Subdiv  [-/=] Vol  [T] Theme  [Q] Quit";

/// UI application state
pub struct UiApp {
    metronome: Metronome,
    /// Beat notifications from the scheduler thread
    beat_rx: Consumer<u32>,
    /// Most recently notified beat
    active_beat: Option<u32>,
    theme: Theme,
    should_quit: bool,
}

impl UiApp {
    pub fn new(metronome: Metronome, beat_rx: Consumer<u32>) -> Self {
        Self {
            metronome,
            beat_rx,
            active_beat: None,
            theme: Theme::default(),
            should_quit: false,
        }
    }

    /// Run the UI event loop
    pub fn run(&mut self, mut terminal: DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            self.poll_beats();

            terminal.draw(|frame| self.render(frame))?;

            // Handle keyboard input (non-blocking, ~60fps)
            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code);
                    }
                }
            }
        }

        self.metronome.stop();
        Ok(())
    }

    /// Keep only the latest beat
    fn poll_beats(&mut self) {
        while let Ok(beat) = self.beat_rx.pop() {
            self.active_beat = Some(beat);
        }
    }

    fn handle_key(&mut self, key: KeyCode) {
        let m = &mut self.metronome;
        match key {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Char(' ') => {
                m.toggle();
                if !m.is_playing() {
                    self.active_beat = None;
                }
            }
            KeyCode::Up => m.set_tempo(m.tempo() + 1),
            KeyCode::Down => m.set_tempo(m.tempo().saturating_sub(1)),
            KeyCode::PageUp => m.set_tempo(m.tempo() + 10),
            KeyCode::PageDown => m.set_tempo(m.tempo().saturating_sub(10)),
            KeyCode::Right => {
                if m.beats_per_measure() < MAX_BEATS_PER_MEASURE {
                    m.set_beats_per_measure(m.beats_per_measure() + 1);
                }
            }
            KeyCode::Left => {
                if m.beats_per_measure() > 1 {
                    m.set_beats_per_measure(m.beats_per_measure() - 1);
                    if self.active_beat >= Some(m.beats_per_measure()) {
                        self.active_beat = None;
                    }
                }
            }
            KeyCode::Char(']') => m.set_subdivisions(m.subdivisions() + 1),
            KeyCode::Char('[') => {
                if m.subdivisions() > 1 {
                    m.set_subdivisions(m.subdivisions() - 1);
                }
            }
            KeyCode::Char('=') | KeyCode::Char('+') => step_volume(m, 5),
            KeyCode::Char('-') => step_volume(m, -5),
            KeyCode::Char('t') | KeyCode::Char('T') => {
                self.theme = self.theme.next();
            }
            _ => {}
        }
    }

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();
        let palette = self.theme.palette();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Transport bar
                Constraint::Min(5),    // Beat dots
                Constraint::Length(1), // Help bar
            ])
            .split(area);

        render_transport(frame, chunks[0], &self.metronome, self.theme, &palette);
        render_beats(
            frame,
            chunks[1],
            self.metronome.beats_per_measure(),
            self.active_beat,
            &palette,
        );

        let help = Paragraph::new(HELP).style(Style::default().fg(palette.dim).bg(palette.bg));
        frame.render_widget(help, chunks[2]);
    }
}

/// Move the volume in whole percent steps so repeated presses don't drift.
fn step_volume(metronome: &mut Metronome, delta: i32) {
    let percent = (metronome.volume() * 100.0).round() as i32 + delta;
    metronome.set_volume(percent.clamp(0, 100) as f32 / 100.0);
}
