//! Central application state.
//!
//! All mutable state lives here so that the rest of the app can be pure
//! functions over `&AppState` (rendering) or `&mut AppState` (event handling).
//! Time-driven pieces take `now` explicitly; `main` passes the wall clock.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use chrono::Datelike;
use ratatui::layout::Rect;
use tokio::sync::mpsc::UnboundedSender;

use crate::config::AppConfig;
use crate::core::{
    analytics,
    contact::{ContactForm, Field},
    content::SiteContent,
    reveal::{RevealLatch, DEFAULT_THRESHOLD},
    rotator::{Rotator, RotatorTimings, FRAME_INTERVAL},
    schedule::{earliest, Task},
    transport::ContactClient,
};
use crate::ui::{
    layout::AppLayout,
    page::{Anchor, PageDoc, Target},
    smooth_scroll::SmoothScroll,
};

use super::contact_runtime::ContactUpdate;
use super::router::Route;

/// Testimonials rotate slowly and swap without a transition delay.
pub const TESTIMONIAL_INTERVAL: Duration = Duration::from_millis(6000);
/// Testimonials need a little more of the section on screen to reveal.
pub const TESTIMONIAL_THRESHOLD: f32 = 0.15;

/// Which view / overlay is currently active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActiveView {
    #[default]
    Page,
    Help,
}

/// Top-level application state.
pub struct AppState {
    pub content: SiteContent,
    pub config: AppConfig,
    pub route: Route,
    /// Sector showcase carousel.  Replaced with a fresh one on every return home.
    pub sector_rotator: Rotator,
    pub testimonial_rotator: Rotator,
    /// Per-section "faded until first seen" latches.
    pub reveals: BTreeMap<Anchor, RevealLatch>,
    pub scroll: SmoothScroll,
    /// Frame ticks for the scroll animation; armed only while it moves.
    scroll_frame: Task,
    /// Anchor to jump to once the next page has been laid out.
    pub pending_anchor: Option<Anchor>,
    pub focus: Option<Target>,
    /// Contact field receiving typed characters.
    pub editing: Option<Field>,
    pub form: ContactForm,
    pub client: ContactClient,
    /// Where spawned submissions report back.  `None` in tests.
    pub contact_tx: Option<UnboundedSender<ContactUpdate>>,
    /// Last screen cell the mouse reported.
    pub pointer: Option<(u16, u16)>,
    /// Pointer currently over the sector panel.
    pub hover_panel: bool,
    /// Pause requested from the keyboard.
    pub manual_pause: bool,
    pub active_view: ActiveView,
    pub should_quit: bool,
    /// An optional status message shown in the bottom bar.
    pub status_message: Option<String>,
    pub terminal_area: Rect,
    /// Event-loop tick counter (drives the spinner).
    pub tick: u64,
    pub year: i32,
}

impl AppState {
    pub fn new(content: SiteContent, config: AppConfig, client: ContactClient) -> Self {
        let timings = config.timings();
        let mut state = Self {
            sector_rotator: Rotator::new(content.sectors.len(), timings),
            testimonial_rotator: testimonial_rotator(content.testimonials.len()),
            content,
            config,
            route: Route::Home,
            reveals: BTreeMap::new(),
            scroll: SmoothScroll::default(),
            scroll_frame: Task::default(),
            pending_anchor: None,
            focus: None,
            editing: None,
            form: ContactForm::default(),
            client,
            contact_tx: None,
            pointer: None,
            hover_panel: false,
            manual_pause: false,
            active_view: ActiveView::default(),
            should_quit: false,
            status_message: None,
            terminal_area: Rect::new(0, 0, 100, 40),
            tick: 0,
            year: chrono::Local::now().year(),
        };
        state.reveals = fresh_reveals();
        state
    }

    pub fn layout(&self) -> AppLayout {
        AppLayout::from_area(self.terminal_area)
    }

    pub fn viewport_height(&self) -> usize {
        self.layout().body_area.height as usize
    }

    pub fn is_revealed(&self, anchor: Anchor) -> bool {
        self.reveals.get(&anchor).is_none_or(RevealLatch::is_revealed)
    }

    // ── routing ────────────────────────────────────────────────

    /// Switch pages.  Leaving home unmounts its rotators; returning mounts
    /// fresh ones and restores the capabilities section.
    pub fn navigate(&mut self, route: Route) {
        if route == self.route {
            return;
        }
        tracing::debug!(from = %self.route.path(), to = %route.path(), "navigate");
        let was_home = self.route.is_home();
        self.route = route;
        self.editing = None;
        self.focus = None;
        self.hover_panel = false;

        match self.route.clone() {
            Route::Home => {
                self.mount_home();
                if !was_home {
                    self.pending_anchor = Some(Anchor::Capabilities);
                }
            }
            Route::Capability(slug) => {
                if was_home {
                    self.sector_rotator.unmount();
                    self.testimonial_rotator.unmount();
                }
                analytics::track_event("capability_view", &[("slug", slug.as_str())]);
                self.scroll.jump(0);
                self.scroll_frame.cancel();
            }
            Route::NotFound(_) => {
                if was_home {
                    self.sector_rotator.unmount();
                    self.testimonial_rotator.unmount();
                }
                self.scroll.jump(0);
                self.scroll_frame.cancel();
            }
        }
    }

    fn mount_home(&mut self) {
        self.sector_rotator = Rotator::new(self.content.sectors.len(), self.config.timings());
        self.testimonial_rotator = testimonial_rotator(self.content.testimonials.len());
        self.reveals = fresh_reveals();
        self.manual_pause = false;
    }

    // ── timers ─────────────────────────────────────────────────

    pub fn poll(&mut self, now: Instant) {
        self.sector_rotator.poll(now);
        self.testimonial_rotator.poll(now);

        while let Some(at) = self.scroll_frame.due(now) {
            self.scroll_frame.consume(at);
            self.scroll.tick();
            if !self.scroll.is_animating() {
                self.scroll_frame.cancel();
            }
        }
    }

    /// When the loop next has something to do without input.
    pub fn next_deadline(&self) -> Option<Instant> {
        earliest([
            self.sector_rotator.next_deadline(),
            self.testimonial_rotator.next_deadline(),
            self.scroll_frame.deadline(),
        ])
    }

    // ── scrolling ──────────────────────────────────────────────

    /// Animate toward `row`, clamped so the last page row stays at the
    /// bottom of the viewport.
    pub fn scroll_to(&mut self, row: usize, page_height: usize, now: Instant) {
        let max = page_height.saturating_sub(self.viewport_height());
        self.scroll.set_target(row.min(max));
        if self.scroll.is_animating() && !self.scroll_frame.is_armed() {
            self.scroll_frame.every(now, FRAME_INTERVAL);
        }
    }

    pub fn scroll_by(&mut self, delta: isize, page_height: usize, now: Instant) {
        let target = self.scroll.target().saturating_add_signed(delta);
        self.scroll_to(target, page_height, now);
    }

    /// Visible page rows right now.
    pub fn viewport(&self) -> std::ops::Range<usize> {
        let top = self.scroll.displayed();
        top..top + self.viewport_height()
    }

    /// Apply a pending anchor jump and feed the reveal latches.  Returns
    /// `true` when anything changed that affects the rendered page.
    pub fn observe(&mut self, doc: &PageDoc, now: Instant) -> bool {
        let mut changed = false;

        if let Some(anchor) = self.pending_anchor.take() {
            if let Some(range) = doc.anchor(anchor) {
                let max = doc.height().saturating_sub(self.viewport_height());
                self.scroll.jump(range.start.min(max));
                self.scroll_frame.cancel();
                changed = true;
            }
        }

        let viewport = self.viewport();
        for (anchor, range) in &doc.anchors {
            let Some(latch) = self.reveals.get_mut(anchor) else {
                continue;
            };
            if !latch.observe(range, &viewport) {
                continue;
            }
            changed = true;
            tracing::debug!(?anchor, "section revealed");
            match anchor {
                Anchor::Sectors => {
                    self.sector_rotator.reveal(now);
                }
                Anchor::Testimonials => {
                    self.testimonial_rotator.reveal(now);
                }
                _ => {}
            }
        }
        changed
    }

    // ── rotator input ──────────────────────────────────────────

    /// Pointer entered or left the sector panel.
    pub fn set_hover(&mut self, hover: bool, now: Instant) {
        if hover != self.hover_panel {
            self.hover_panel = hover;
            self.sync_pause(now);
        }
    }

    pub fn toggle_pause(&mut self, now: Instant) {
        self.manual_pause = !self.manual_pause;
        self.sync_pause(now);
        self.status_message = Some(if self.manual_pause {
            "Sector rotation paused".into()
        } else {
            "Sector rotation resumed".into()
        });
    }

    fn sync_pause(&mut self, now: Instant) {
        let paused = self.hover_panel || self.manual_pause;
        if paused != self.sector_rotator.state().paused {
            self.sector_rotator.set_paused(paused, now);
        }
    }

    // ── contact ────────────────────────────────────────────────

    pub fn apply_contact_update(&mut self, update: ContactUpdate) {
        match update {
            ContactUpdate::Finished { result } => {
                if self.form.finish_submit(result) {
                    analytics::track_event("contact_submit_success", &[]);
                    self.status_message = Some("Message sent".into());
                    if matches!(self.focus, Some(Target::Submit)) {
                        self.focus = Some(Target::SendAnother);
                    }
                } else {
                    self.status_message = None;
                }
            }
        }
    }
}

fn testimonial_rotator(len: usize) -> Rotator {
    Rotator::new(len, RotatorTimings::new(TESTIMONIAL_INTERVAL, Duration::ZERO))
}

fn fresh_reveals() -> BTreeMap<Anchor, RevealLatch> {
    use Anchor::*;
    let mut m = BTreeMap::new();
    for anchor in [Systems, Sectors, Capabilities, Process, Principles, Results, Proof, Demo, Contact] {
        m.insert(anchor, RevealLatch::new(DEFAULT_THRESHOLD));
    }
    m.insert(Testimonials, RevealLatch::new(TESTIMONIAL_THRESHOLD));
    m
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::app::handler::build_page;
    use crate::core::rotator::Phase;
    use crate::core::transport::DEFAULT_TIMEOUT;

    pub(crate) fn test_state() -> AppState {
        let content = SiteContent::embedded().unwrap();
        let client = ContactClient::new(None, DEFAULT_TIMEOUT).unwrap();
        AppState::new(content, AppConfig::default(), client)
    }

    #[test]
    fn starts_home_with_idle_rotators() {
        let state = test_state();
        assert_eq!(state.route, Route::Home);
        assert_eq!(state.sector_rotator.phase(), Phase::Idle);
        assert_eq!(state.testimonial_rotator.len(), 3);
        assert!(!state.is_revealed(Anchor::Sectors));
        assert!(state.is_revealed(Anchor::Hero));
    }

    #[test]
    fn leaving_home_unmounts_and_returning_remounts() {
        let mut state = test_state();
        let now = Instant::now();
        state.sector_rotator.reveal(now);
        assert_eq!(state.sector_rotator.phase(), Phase::Running);

        state.navigate(Route::Capability("data-pipelines".into()));
        assert_eq!(state.sector_rotator.phase(), Phase::Unmounted);
        assert_eq!(state.sector_rotator.next_deadline(), None);
        assert_eq!(state.scroll.target(), 0);

        state.navigate(Route::Home);
        assert_eq!(state.sector_rotator.phase(), Phase::Idle);
        assert_eq!(state.pending_anchor, Some(Anchor::Capabilities));
    }

    /// Fewest visible rows that reveal a section of `len` rows.
    fn rows_to_reveal(len: usize, threshold: f32) -> usize {
        (1..=len).find(|&k| k as f32 / len as f32 >= threshold).unwrap()
    }

    /// Scroll so exactly `rows` rows of `section` show at the bottom edge.
    fn peek(state: &mut AppState, section: &std::ops::Range<usize>, rows: usize) {
        let top = section.start + rows - state.viewport_height();
        state.scroll.jump(top);
    }

    fn short_terminal() -> AppState {
        let mut state = test_state();
        state.terminal_area = Rect::new(0, 0, 100, 12);
        state
    }

    #[test]
    fn sectors_start_rotating_once_a_tenth_is_on_screen() {
        let mut state = short_terminal();
        let now = Instant::now();
        let doc = build_page(&state);
        let sectors = doc.anchor(Anchor::Sectors).unwrap();
        let need = rows_to_reveal(sectors.len(), DEFAULT_THRESHOLD);
        assert!(need > 1 && need <= state.viewport_height());

        peek(&mut state, &sectors, need - 1);
        state.observe(&doc, now);
        assert_eq!(state.sector_rotator.phase(), Phase::Idle);
        assert!(!state.is_revealed(Anchor::Sectors));

        peek(&mut state, &sectors, need);
        assert!(state.observe(&doc, now));
        assert_eq!(state.sector_rotator.phase(), Phase::Running);
        // First progress frame is due at once.
        assert_eq!(state.sector_rotator.next_deadline(), Some(now));

        // Scrolling away again does not un-reveal.
        state.scroll.jump(0);
        state.observe(&doc, now);
        assert_eq!(state.sector_rotator.phase(), Phase::Running);
        assert!(state.is_revealed(Anchor::Sectors));
    }

    #[test]
    fn testimonials_reveal_at_fifteen_percent_and_rotate_every_six_seconds() {
        let mut state = short_terminal();
        let now = Instant::now();
        let doc = build_page(&state);
        let section = doc.anchor(Anchor::Testimonials).unwrap();
        let need = rows_to_reveal(section.len(), TESTIMONIAL_THRESHOLD);
        assert!(need > 1);

        peek(&mut state, &section, need - 1);
        state.observe(&doc, now);
        assert_eq!(state.testimonial_rotator.phase(), Phase::Idle);

        peek(&mut state, &section, need);
        state.observe(&doc, now);
        assert_eq!(state.testimonial_rotator.phase(), Phase::Running);

        state.poll(now + Duration::from_millis(5999));
        assert_eq!(state.testimonial_rotator.state().active_index, 0);

        state.poll(now + TESTIMONIAL_INTERVAL);
        let s = state.testimonial_rotator.state();
        assert_eq!((s.active_index, s.display_index, s.transitioning), (1, 1, false));
    }

    #[test]
    fn hover_and_manual_pause_combine() {
        let mut state = test_state();
        let now = Instant::now();
        state.sector_rotator.reveal(now);

        state.set_hover(true, now);
        assert!(state.sector_rotator.state().paused);
        state.toggle_pause(now);
        state.set_hover(false, now);
        // Still paused from the keyboard.
        assert!(state.sector_rotator.state().paused);
        state.toggle_pause(now);
        assert!(!state.sector_rotator.state().paused);
    }

    #[test]
    fn scroll_animation_arms_frame_ticks_until_settled() {
        let mut state = test_state();
        let start = Instant::now();
        state.scroll_to(30, 500, start);
        assert_eq!(state.next_deadline(), Some(start + FRAME_INTERVAL));

        state.poll(start + Duration::from_secs(2));
        assert_eq!(state.scroll.displayed(), 30);
        assert_eq!(state.next_deadline(), None);
    }

    #[test]
    fn scroll_target_is_clamped_to_page() {
        let mut state = test_state();
        let now = Instant::now();
        let viewport = state.viewport_height();
        state.scroll_to(10_000, viewport + 12, now);
        assert_eq!(state.scroll.target(), 12);
        state.scroll_by(-100, viewport + 12, now);
        assert_eq!(state.scroll.target(), 0);
    }
}
