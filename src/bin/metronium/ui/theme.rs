//! Colour themes, cycled with `t`. Not persisted between runs.

use ratatui::style::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Nium,
    Dark,
    Light,
    Win31,
    Tui,
}

/// Colours used by every widget
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub bg: Color,
    pub fg: Color,
    pub dim: Color,
    pub accent: Color,
    pub active: Color,
    pub playing: Color,
    pub stopped: Color,
}

const ORDER: [Theme; 5] = [Theme::Nium, Theme::Dark, Theme::Light, Theme::Win31, Theme::Tui];

impl Theme {
    pub fn name(self) -> &'static str {
        match self {
            Theme::Nium => "nium",
            Theme::Dark => "dark",
            Theme::Light => "light",
            Theme::Win31 => "3.1",
            Theme::Tui => "tui",
        }
    }

    pub fn next(self) -> Self {
        let idx = ORDER.iter().position(|&t| t == self).unwrap_or(0);
        ORDER[(idx + 1) % ORDER.len()]
    }

    pub fn palette(self) -> Palette {
        match self {
            Theme::Nium => Palette {
                bg: Color::Reset,
                fg: Color::White,
                dim: Color::DarkGray,
                accent: Color::LightMagenta,
                active: Color::LightCyan,
                playing: Color::Green,
                stopped: Color::Yellow,
            },
            Theme::Dark => Palette {
                bg: Color::Black,
                fg: Color::Gray,
                dim: Color::DarkGray,
                accent: Color::LightRed,
                active: Color::White,
                playing: Color::LightGreen,
                stopped: Color::LightYellow,
            },
            Theme::Light => Palette {
                bg: Color::White,
                fg: Color::Black,
                dim: Color::Gray,
                accent: Color::Red,
                active: Color::Blue,
                playing: Color::Green,
                stopped: Color::Magenta,
            },
            Theme::Win31 => Palette {
                bg: Color::Gray,
                fg: Color::Black,
                dim: Color::DarkGray,
                accent: Color::Blue,
                active: Color::Rgb(0, 0, 128),
                playing: Color::Rgb(0, 128, 0),
                stopped: Color::Rgb(128, 0, 0),
            },
            Theme::Tui => Palette {
                bg: Color::Black,
                fg: Color::Green,
                dim: Color::Rgb(0, 96, 0),
                accent: Color::LightGreen,
                active: Color::LightGreen,
                playing: Color::LightGreen,
                stopped: Color::Green,
            },
        }
    }
}
