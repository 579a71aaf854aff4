//! Popup overlay listing the active key bindings.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Widget},
};

use crate::config::{Action, AppConfig};

use super::theme::Theme;

/// Read-only keys overlay.
pub struct HelpPopup<'a> {
    pub config: &'a AppConfig,
}

impl Widget for HelpPopup<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // actions + sector digits + blank + hint + 2 border
        let height = (Action::ALL.len() as u16) + 6;
        let popup = centered_fixed(52, height, area);
        Clear.render(popup, buf);

        let block = Block::default()
            .title(" Keys ")
            .title_style(Theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Theme::border_style());

        let inner = block.inner(popup);
        block.render(popup, buf);

        let label_style = Style::default().fg(Color::White);
        let key_style = Style::default().fg(Color::Yellow);
        let inner_width = inner.width as usize;

        let mut rows: Vec<(&str, String)> = Action::ALL
            .iter()
            .map(|&action| (action.label(), self.config.display_bindings(action)))
            .collect();
        rows.insert(9, ("Pick Sector", "1-9".to_string()));

        let mut lines = vec![Line::raw("")];
        for (label, keys) in rows {
            // Fixed-width columns: label left-aligned, keys right-aligned.
            let label_col = format!("   {label:<22}");
            let keys_width = inner_width.saturating_sub(label_col.len() + 1).max(1);
            lines.push(Line::from(vec![
                Span::styled(label_col, label_style),
                Span::styled(format!("{keys:>keys_width$}"), key_style),
            ]));
        }
        lines.push(Line::from(Span::styled(
            "  Esc / ?: close",
            Style::default().fg(Color::DarkGray),
        )));

        Paragraph::new(lines).render(inner, buf);
    }
}

/// Create a centered rectangle with fixed dimensions, clamped to the available area.
fn centered_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(w)) / 2;
    let y = area.y + (area.height.saturating_sub(h)) / 2;
    Rect::new(x, y, w, h)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_fixed_clamps_to_area() {
        let area = Rect::new(0, 0, 40, 10);
        assert_eq!(centered_fixed(52, 19, area), Rect::new(0, 0, 40, 10));
        assert_eq!(centered_fixed(20, 4, area), Rect::new(10, 3, 20, 4));
    }
}
