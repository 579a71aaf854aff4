//! UI / rendering layer: everything that touches Ratatui widgets.
//!
//! The page is laid out once per frame into a [`page::PageDoc`]; drawing and
//! mouse hit-testing both read from that same document.

pub mod layout;
pub mod nav;
pub mod page;
pub mod popup;
pub mod smooth_scroll;
pub mod spinner;
pub mod theme;
pub mod wrap;

use ratatui::{widgets::Paragraph, Frame};

use crate::app::state::{ActiveView, AppState};

use self::layout::AppLayout;
use self::nav::NavBar;
use self::page::{PageDoc, PageView};
use self::popup::HelpPopup;
use self::spinner::SendingIndicator;
use self::theme::Theme;

/// Rows the page must scroll before the nav bar switches to its raised look.
const NAV_RAISE_AFTER: usize = 2;

/// Draw one frame from `state` and its already-built page.
pub fn draw(frame: &mut Frame, state: &AppState, doc: &PageDoc) {
    let layout = AppLayout::from_area(frame.area());

    frame.render_widget(
        NavBar {
            scrolled: state.scroll.displayed() > NAV_RAISE_AFTER,
            focus: state.focus,
        },
        layout.nav_area,
    );

    frame.render_widget(
        PageView {
            doc,
            scroll: state.scroll.displayed(),
        },
        layout.body_area,
    );

    let hint = state.config.status_bar_hint();
    let status_text = state.status_message.as_deref().unwrap_or(&hint);
    frame.render_widget(
        Paragraph::new(status_text).style(Theme::status_bar_style()),
        layout.status_area,
    );
    frame.render_widget(
        SendingIndicator {
            visible: state.form.is_submitting(),
            tick: state.tick,
        },
        layout.status_area,
    );

    if state.active_view == ActiveView::Help {
        frame.render_widget(HelpPopup { config: &state.config }, frame.area());
    }
}
