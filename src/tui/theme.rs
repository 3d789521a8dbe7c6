// Fixed color styles for the TUI
//
// Theming proper is out of scope for the dashboard shell; this is just the
// one place styles live so the views stay free of color literals.

use ratatui::style::{Color, Modifier, Style};

#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub border: Style,
    pub title: Style,
    pub text: Style,
    pub dim: Style,
    pub error: Style,
    pub warn: Style,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            border: Style::default().fg(Color::DarkGray),
            title: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            text: Style::default().fg(Color::Gray),
            dim: Style::default().fg(Color::DarkGray),
            error: Style::default().fg(Color::Red),
            warn: Style::default().fg(Color::Yellow),
        }
    }
}
