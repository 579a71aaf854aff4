//! Input handling: maps key/mouse events to state mutations.

use std::time::Instant;

use crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

use crate::config::Action;
use crate::core::analytics;
use crate::core::contact::{Field, SubmitAction};
use crate::core::transport::ContactError;
use crate::ui::layout::point_in_rect;
use crate::ui::nav::nav_hit;
use crate::ui::page::{self, Anchor, PageDoc, Target};

use super::contact_runtime;
use super::router::Route;
use super::state::{ActiveView, AppState};

/// Rows moved per scroll step (arrow key or wheel notch).
const SCROLL_STEP: isize = 3;

/// Process a key event, dispatching based on the active view.
pub fn handle_key(state: &mut AppState, key: KeyEvent, now: Instant) {
    if key.kind != KeyEventKind::Press {
        return;
    }
    // Ctrl+c always quits, regardless of view.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        state.should_quit = true;
        return;
    }

    match state.active_view {
        ActiveView::Help => handle_help_key(state, key),
        ActiveView::Page => {
            if let Some(field) = state.editing {
                handle_edit_key(state, field, key, now);
            } else {
                handle_page_key(state, key, now);
            }
        }
    }
}

// ── Page (configurable bindings) ────────────────────────────────

fn handle_page_key(state: &mut AppState, key: KeyEvent, now: Instant) {
    state.status_message = None;

    // Direct sector picks and jumps that are not rebindable.
    match key.code {
        KeyCode::Char(c @ '1'..='9') if key.modifiers.is_empty() => {
            let index = (c as usize) - ('1' as usize);
            if state.route.is_home() && index < state.sector_rotator.len() {
                state.sector_rotator.select_manually(index, now);
            }
            return;
        }
        KeyCode::Home => {
            let doc = build_page(state);
            state.scroll_to(0, doc.height(), now);
            return;
        }
        KeyCode::End => {
            let doc = build_page(state);
            state.scroll_to(usize::MAX, doc.height(), now);
            return;
        }
        _ => {}
    }

    let Some(action) = state.config.match_key(key) else {
        return;
    };

    match action {
        Action::Quit => state.should_quit = true,
        Action::ShowHelp => state.active_view = ActiveView::Help,
        Action::ScrollUp => scroll_rows(state, -SCROLL_STEP, now),
        Action::ScrollDown => scroll_rows(state, SCROLL_STEP, now),
        Action::PageUp => {
            let page = page_step(state);
            scroll_rows(state, -page, now);
        }
        Action::PageDown => {
            let page = page_step(state);
            scroll_rows(state, page, now);
        }
        Action::NextFocus => move_focus(state, 1, now),
        Action::PrevFocus => move_focus(state, -1, now),
        Action::Activate => {
            if let Some(target) = state.focus {
                activate(state, target, now);
            }
        }
        Action::PrevSector => step_sector(state, -1, now),
        Action::NextSector => step_sector(state, 1, now),
        Action::TogglePause => {
            if state.route.is_home() && !state.sector_rotator.is_empty() {
                state.toggle_pause(now);
            }
        }
        Action::Back => {
            if !state.route.is_home() {
                state.navigate(Route::Home);
            } else {
                state.focus = None;
            }
        }
    }
}

fn handle_help_key(state: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Enter | KeyCode::Char('?') | KeyCode::Char('q') => {
            state.active_view = ActiveView::Page;
        }
        _ => {}
    }
}

// ── Contact field editing ───────────────────────────────────────

fn handle_edit_key(state: &mut AppState, field: Field, key: KeyEvent, now: Instant) {
    match key.code {
        KeyCode::Esc => state.editing = None,
        KeyCode::Tab => {
            state.editing = None;
            move_focus(state, 1, now);
        }
        KeyCode::BackTab => {
            state.editing = None;
            move_focus(state, -1, now);
        }
        KeyCode::Enter if field.multiline() => state.form.push_char(field, '\n'),
        KeyCode::Enter => {
            // Single-line fields hand over to the next field, then the button.
            let next = Field::ALL
                .iter()
                .position(|f| *f == field)
                .and_then(|i| Field::ALL.get(i + 1).copied());
            match next {
                Some(next) => {
                    state.editing = Some(next);
                    state.focus = Some(Target::Field(next));
                }
                None => {
                    state.editing = None;
                    state.focus = Some(Target::Submit);
                }
            }
            ensure_visible(state, now);
        }
        KeyCode::Backspace => state.form.pop_char(field),
        KeyCode::Char(c)
            if !key
                .modifiers
                .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
        {
            state.form.push_char(field, c);
        }
        _ => {}
    }
}

// ── Mouse ───────────────────────────────────────────────────────

/// Process a mouse event.
pub fn handle_mouse(state: &mut AppState, mouse: MouseEvent, now: Instant) {
    if state.active_view != ActiveView::Page {
        if let MouseEventKind::Down(_) = mouse.kind {
            state.active_view = ActiveView::Page;
        }
        return;
    }

    let layout = state.layout();
    state.pointer = Some((mouse.column, mouse.row));

    match mouse.kind {
        MouseEventKind::Moved => {
            let doc = build_page(state);
            sync_hover(state, &doc, now);
        }
        MouseEventKind::Down(MouseButton::Left) => {
            if point_in_rect(layout.nav_area, mouse.column, mouse.row) {
                let col = mouse.column - layout.nav_area.x;
                if let Some(target) = nav_hit(layout.nav_area.width, col) {
                    click(state, target, now);
                }
                return;
            }

            let Some((row, col)) = page_point(state, mouse.column, mouse.row) else {
                return;
            };
            let doc = build_page(state);
            match doc.hit_at(row, col) {
                Some(target) => click(state, target, now),
                None => state.editing = None,
            }
        }
        MouseEventKind::ScrollUp => scroll_rows(state, -SCROLL_STEP, now),
        MouseEventKind::ScrollDown => scroll_rows(state, SCROLL_STEP, now),
        _ => {}
    }
}

/// Re-check whether the pointer rests on the sector panel.  The page can
/// scroll under a pointer that never moves, so the main loop calls this after
/// every layout as well.  Returns `true` when the hover state flipped.
pub fn sync_hover(state: &mut AppState, doc: &PageDoc, now: Instant) -> bool {
    let over_panel = state.route.is_home()
        && state
            .pointer
            .and_then(|(column, row)| page_point(state, column, row))
            .is_some_and(|(row, col)| {
                doc.hits.iter().any(|h| {
                    h.target == Target::SectorPanel && h.rows.contains(&row) && h.cols.contains(&col)
                })
            });
    let changed = over_panel != state.hover_panel;
    state.set_hover(over_panel, now);
    changed
}

fn click(state: &mut AppState, target: Target, now: Instant) {
    if target.in_focus_ring() {
        state.focus = Some(target);
    }
    if !matches!(target, Target::Field(_)) {
        state.editing = None;
    }
    activate(state, target, now);
}

/// Map a screen cell to page `(row, col)`, if it lies on the page body.
fn page_point(state: &AppState, column: u16, row: u16) -> Option<(usize, u16)> {
    let body = state.layout().body_area;
    if !point_in_rect(body, column, row) || column < body.x + 1 {
        return None;
    }
    let page_row = state.scroll.displayed() + (row - body.y) as usize;
    Some((page_row, column - body.x - 1))
}

// ── Activation ──────────────────────────────────────────────────

/// Perform whatever `target` stands for (Enter on focus, or a click).
pub fn activate(state: &mut AppState, target: Target, now: Instant) {
    match target {
        Target::Nav(anchor) => go_to_anchor(state, anchor, now),
        Target::DemoCta => {
            analytics::track_event("demo_cta_click", &[]);
            go_to_anchor(state, Anchor::Contact, now);
            state.focus = Some(Target::Field(Field::Name));
        }
        Target::HeroExplore => {
            analytics::track_event("hero_cta_click", &[]);
            go_to_anchor(state, Anchor::Systems, now);
        }
        Target::EngineerCta => go_to_anchor(state, Anchor::Contact, now),
        Target::LiveDemoCta => {
            analytics::track_event("demo_cta_click", &[]);
            go_to_anchor(state, Anchor::Contact, now);
            state.focus = Some(Target::Field(Field::Name));
        }
        Target::SectorTab(i) => {
            state.sector_rotator.select_manually(i, now);
        }
        Target::SectorPanel => {}
        Target::SectorCta => go_to_anchor(state, Anchor::Contact, now),
        Target::Card(i) => {
            if let Some(slug) = state.content.capabilities.get(i).map(|c| c.slug.clone()) {
                state.navigate(Route::Capability(slug));
            }
        }
        Target::TestimonialDot(i) => {
            state.testimonial_rotator.select_manually(i, now);
        }
        Target::Field(field) => {
            state.editing = Some(field);
            state.focus = Some(target);
        }
        Target::Submit => submit(state),
        Target::SendAnother => {
            state.form.reset_after_success();
            state.focus = Some(Target::Field(Field::Name));
        }
        Target::BackHome => state.navigate(Route::Home),
        Target::PrevCapability | Target::NextCapability => {
            let Route::Capability(slug) = &state.route else {
                return;
            };
            let Some((prev, next)) = state.content.neighbours(slug) else {
                return;
            };
            let slug = if target == Target::PrevCapability {
                prev.slug.clone()
            } else {
                next.slug.clone()
            };
            state.navigate(Route::Capability(slug));
            state.focus = Some(target);
        }
    }
}

fn submit(state: &mut AppState) {
    state.editing = None;
    match state.form.begin_submit(state.client.is_configured()) {
        SubmitAction::Send(payload) => match &state.contact_tx {
            Some(tx) => {
                contact_runtime::spawn_submit(tx.clone(), state.client.clone(), payload);
            }
            None => {
                tracing::warn!("no contact runtime attached; submission dropped");
                state.form.finish_submit(Err(ContactError::NotConfigured));
            }
        },
        SubmitAction::Rejected => {
            state.status_message = Some("Please fix the highlighted fields".into());
            if let Some(&field) = state.form.errors().keys().next() {
                state.focus = Some(Target::Field(field));
            }
        }
        SubmitAction::Discarded | SubmitAction::Busy | SubmitAction::Misconfigured => {}
    }
}

/// Scroll to a home section, leaving the current page first if needed.
fn go_to_anchor(state: &mut AppState, anchor: Anchor, now: Instant) {
    if !state.route.is_home() {
        state.navigate(Route::Home);
        state.pending_anchor = Some(anchor);
        return;
    }
    let doc = build_page(state);
    if let Some(range) = doc.anchor(anchor) {
        state.scroll_to(range.start, doc.height(), now);
    }
}

// ── Focus ───────────────────────────────────────────────────────

/// Nav links and the demo button, then the page's own targets.
fn focus_ring(doc: &PageDoc) -> Vec<Target> {
    let mut ring: Vec<Target> = Anchor::NAV.iter().map(|&a| Target::Nav(a)).collect();
    ring.push(Target::DemoCta);
    for target in doc.focus_targets() {
        if !ring.contains(&target) {
            ring.push(target);
        }
    }
    ring
}

fn move_focus(state: &mut AppState, step: isize, now: Instant) {
    let ring = focus_ring(&build_page(state));
    if ring.is_empty() {
        return;
    }
    let len = ring.len() as isize;
    let next = match state.focus.and_then(|f| ring.iter().position(|t| *t == f)) {
        Some(i) => (i as isize + step).rem_euclid(len),
        None if step > 0 => 0,
        None => len - 1,
    };
    state.focus = Some(ring[next as usize]);
    ensure_visible(state, now);
}

/// Scroll just enough to bring the focused page target on screen.
fn ensure_visible(state: &mut AppState, now: Instant) {
    let Some(target) = state.focus else {
        return;
    };
    let doc = build_page(state);
    let Some(rows) = doc.rows_of(target) else {
        return;
    };
    let top = state.scroll.target();
    let height = state.viewport_height();
    if rows.start < top {
        state.scroll_to(rows.start.saturating_sub(1), doc.height(), now);
    } else if rows.end > top + height {
        state.scroll_to((rows.end + 1).saturating_sub(height), doc.height(), now);
    }
}

// ── helpers ─────────────────────────────────────────────────────

pub fn build_page(state: &AppState) -> PageDoc {
    page::build(state, state.layout().content_width())
}

fn scroll_rows(state: &mut AppState, delta: isize, now: Instant) {
    let height = build_page(state).height();
    state.scroll_by(delta, height, now);
}

fn page_step(state: &AppState) -> isize {
    state.viewport_height().saturating_sub(2).max(1) as isize
}

fn step_sector(state: &mut AppState, step: isize, now: Instant) {
    let len = state.sector_rotator.len();
    if !state.route.is_home() || len == 0 {
        return;
    }
    let active = state.sector_rotator.state().active_index as isize;
    let next = (active + step).rem_euclid(len as isize) as usize;
    state.sector_rotator.select_manually(next, now);
}
