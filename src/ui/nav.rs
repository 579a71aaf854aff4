//! Top navigation bar.
//!
//! [`nav_geometry`] is shared by the renderer and the mouse handler.

use std::ops::Range;

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Widget,
};
use unicode_width::UnicodeWidthStr;

use super::page::{Anchor, Target};
use super::theme::Theme;

const LOGO: &str = " ◆ Locus Analytics ";
const DEMO: &str = "[ Request a demo ]";

/// One clickable item in the bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavItem {
    pub cols: Range<u16>,
    pub label: &'static str,
    pub target: Target,
}

/// Lay out the bar for `width` columns.  Links that do not fit between the
/// logo and the demo button are dropped from the right.
pub fn nav_geometry(width: u16) -> Vec<NavItem> {
    let logo_w = LOGO.width() as u16;
    let demo_w = DEMO.width() as u16;
    let mut items = vec![NavItem {
        cols: 0..logo_w.min(width),
        label: LOGO,
        target: Target::Nav(Anchor::Hero),
    }];

    let demo_start = width.saturating_sub(demo_w + 1);
    let mut col = logo_w + 2;
    for &anchor in Anchor::NAV {
        let w = anchor.label().width() as u16;
        if col + w + 2 > demo_start {
            break;
        }
        items.push(NavItem {
            cols: col..col + w,
            label: anchor.label(),
            target: Target::Nav(anchor),
        });
        col += w + 3;
    }

    if demo_start >= logo_w {
        items.push(NavItem {
            cols: demo_start..demo_start + demo_w,
            label: DEMO,
            target: Target::DemoCta,
        });
    }
    items
}

pub fn nav_hit(width: u16, col: u16) -> Option<Target> {
    nav_geometry(width)
        .into_iter()
        .find(|item| item.cols.contains(&col))
        .map(|item| item.target)
}

pub struct NavBar {
    /// Page scrolled past its first rows.
    pub scrolled: bool,
    pub focus: Option<Target>,
}

impl Widget for NavBar {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let base = if self.scrolled {
            Theme::nav_scrolled_style()
        } else {
            Theme::nav_style()
        };
        buf.set_style(area, base);

        let mut spans: Vec<Span> = Vec::new();
        let mut col: u16 = 0;
        for item in nav_geometry(area.width) {
            if item.cols.start > col {
                spans.push(Span::raw(" ".repeat((item.cols.start - col) as usize)));
            }
            let style: Style = if self.focus == Some(item.target) {
                Theme::focused_style()
            } else {
                match item.target {
                    Target::Nav(Anchor::Hero) => Theme::logo_style(),
                    Target::DemoCta => Theme::button_style(),
                    _ => base,
                }
            };
            spans.push(Span::styled(item.label, style));
            col = item.cols.end;
        }
        buf.set_line(area.x, area.y, &Line::from(spans), area.width);
    }
}
