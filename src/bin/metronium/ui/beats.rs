//! Beat indicator dots

use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::theme::Palette;

/// Render one dot per beat; the first is the accent, `active` is lit.
pub fn render_beats(
    frame: &mut Frame,
    area: Rect,
    beats_per_measure: u32,
    active: Option<u32>,
    palette: &Palette,
) {
    let block = Block::default()
        .title(" Beats ")
        .borders(Borders::ALL)
        .style(Style::default().fg(palette.fg).bg(palette.bg));

    let mut dots = Vec::with_capacity(beats_per_measure as usize * 2);
    let mut numbers = Vec::with_capacity(beats_per_measure as usize * 2);
    for i in 0..beats_per_measure {
        let lit = active == Some(i);
        let symbol = if lit { "●" } else { "○" };
        let style = if lit {
            Style::default().fg(palette.active).add_modifier(Modifier::BOLD)
        } else if i == 0 {
            Style::default().fg(palette.accent)
        } else {
            Style::default().fg(palette.dim)
        };

        dots.push(Span::styled(format!(" {symbol} "), style));
        numbers.push(Span::styled(
            format!("{:^3}", i + 1),
            Style::default().fg(palette.dim),
        ));
    }

    let text = vec![Line::default(), Line::from(dots), Line::from(numbers)];
    let paragraph = Paragraph::new(text)
        .alignment(Alignment::Center)
        .block(block);
    frame.render_widget(paragraph, area);
}
