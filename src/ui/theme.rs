//! Colour palette and text styles used across the UI.

use ratatui::style::{Color, Modifier, Style};

/// Brand blue.
pub const PRIMARY: Color = Color::Rgb(47, 107, 255);

/// Central theme: change colours here and they propagate everywhere.
pub struct Theme;

impl Theme {
    /// Parse a `#rrggbb` accent from content.  Falls back to the brand blue.
    pub fn accent(hex: &str) -> Color {
        let hex = hex.trim().trim_start_matches('#');
        if hex.len() != 6 {
            return PRIMARY;
        }
        let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
        match (channel(0), channel(2), channel(4)) {
            (Some(r), Some(g), Some(b)) => Color::Rgb(r, g, b),
            _ => PRIMARY,
        }
    }

    // ── page text ──────────────────────────────────────────────
    pub fn label_style() -> Style {
        Style::default().fg(PRIMARY).add_modifier(Modifier::BOLD)
    }

    pub fn heading_style() -> Style {
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD)
    }

    pub fn body_style() -> Style {
        Style::default().fg(Color::Gray)
    }

    pub fn muted_style() -> Style {
        Style::default().fg(Color::DarkGray)
    }

    pub fn quote_style() -> Style {
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::ITALIC)
    }

    pub fn metric_style() -> Style {
        Style::default().fg(PRIMARY).add_modifier(Modifier::BOLD)
    }

    /// Sections not yet scrolled into view.
    pub fn unrevealed_style() -> Style {
        Style::default().add_modifier(Modifier::DIM)
    }

    // ── interactive ────────────────────────────────────────────
    pub fn link_style() -> Style {
        Style::default()
            .fg(PRIMARY)
            .add_modifier(Modifier::UNDERLINED)
    }

    pub fn button_style() -> Style {
        Style::default()
            .fg(Color::White)
            .bg(PRIMARY)
            .add_modifier(Modifier::BOLD)
    }

    pub fn focused_style() -> Style {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    }

    pub fn tab_style() -> Style {
        Style::default().fg(Color::Gray)
    }

    pub fn tab_active_style() -> Style {
        Style::default()
            .fg(Color::White)
            .bg(PRIMARY)
            .add_modifier(Modifier::BOLD)
    }

    pub fn progress_style() -> Style {
        Style::default().fg(PRIMARY)
    }

    pub fn input_style() -> Style {
        Style::default().fg(Color::White).bg(Color::Rgb(30, 30, 38))
    }

    pub fn input_editing_style() -> Style {
        Style::default().fg(Color::White).bg(Color::Rgb(30, 45, 90))
    }

    pub fn error_style() -> Style {
        Style::default().fg(Color::LightRed)
    }

    pub fn success_style() -> Style {
        Style::default()
            .fg(Color::LightGreen)
            .add_modifier(Modifier::BOLD)
    }

    // ── chrome ─────────────────────────────────────────────────
    pub fn nav_style() -> Style {
        Style::default().fg(Color::Gray)
    }

    /// Nav bar once the page has scrolled.
    pub fn nav_scrolled_style() -> Style {
        Style::default().fg(Color::White).bg(Color::Rgb(20, 24, 36))
    }

    pub fn logo_style() -> Style {
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD)
    }

    pub fn border_style() -> Style {
        Style::default().fg(Color::DarkGray)
    }

    pub fn title_style() -> Style {
        Style::default().fg(PRIMARY).add_modifier(Modifier::BOLD)
    }

    pub fn status_bar_style() -> Style {
        Style::default().bg(Color::DarkGray).fg(Color::White)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accent_parses_hex() {
        assert_eq!(Theme::accent("#10b981"), Color::Rgb(0x10, 0xb9, 0x81));
        assert_eq!(Theme::accent("zzzzzz"), PRIMARY);
        assert_eq!(Theme::accent("#fff"), PRIMARY);
    }
}
