//! Transport bar widget - tempo, meter, subdivisions, volume and play state

use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use metronium::Metronome;

use super::theme::{Palette, Theme};

pub fn render_transport(
    frame: &mut Frame,
    area: Rect,
    metronome: &Metronome,
    theme: Theme,
    palette: &Palette,
) {
    let block = Block::default()
        .title(" metronium ")
        .borders(Borders::ALL)
        .style(Style::default().fg(palette.fg).bg(palette.bg));

    let playing = metronome.is_playing();
    let play_symbol = if playing { "▶" } else { "■" };
    let play_state_str = if playing { "Playing" } else { "Stopped" };

    let line = Line::from(vec![
        Span::styled(
            format!(" {} {}  ", play_symbol, play_state_str),
            Style::default().fg(if playing {
                palette.playing
            } else {
                palette.stopped
            }),
        ),
        Span::styled(
            format!("BPM: {}  ", metronome.tempo()),
            Style::default().fg(palette.accent),
        ),
        Span::raw(format!("Beats: {}  ", metronome.beats_per_measure())),
        Span::raw(format!(
            "Subdiv: {} (max {})  ",
            metronome.subdivisions(),
            metronome.max_subdivisions()
        )),
        Span::raw(format!("Vol: {:.0}%  ", metronome.volume() * 100.0)),
        Span::styled(
            format!("Theme: {}", theme.name()),
            Style::default().fg(palette.dim),
        ),
    ]);

    let paragraph = Paragraph::new(line).block(block);
    frame.render_widget(paragraph, area);
}
