//! The scrolling page: every route laid out as pre-wrapped rows.
//!
//! [`build`] turns the current [`AppState`] into a [`PageDoc`]: the rendered
//! lines plus the row range of each section ([`Anchor`]) and the clickable
//! regions ([`Hit`]).  The input handler rebuilds the same document to
//! hit-test the mouse, so rendering and hit-testing never disagree.

use std::ops::Range;

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};
use unicode_width::UnicodeWidthStr;

use crate::app::router::Route;
use crate::app::state::AppState;
use crate::core::contact::{Field, SubmitState};
use crate::core::content::{Capability, DemoPanel, Metric, Principle, ProofStory, SectorItem, TitledText};

use super::spinner;
use super::theme::Theme;
use super::wrap::{fit, wrap};

// ───────────────────────────────────────── model ─────────────

/// Home page sections, in page order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Anchor {
    Hero,
    Systems,
    Sectors,
    Capabilities,
    Process,
    Principles,
    Results,
    Proof,
    Testimonials,
    Demo,
    Contact,
    Footer,
}

impl Anchor {
    /// Sections linked from the nav bar.
    pub const NAV: &[Anchor] = &[
        Anchor::Systems,
        Anchor::Sectors,
        Anchor::Capabilities,
        Anchor::Results,
        Anchor::Contact,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Anchor::Hero => "Home",
            Anchor::Systems => "Systems",
            Anchor::Sectors => "Sectors",
            Anchor::Capabilities => "Capabilities",
            Anchor::Process => "Process",
            Anchor::Principles => "Approach",
            Anchor::Results => "Results",
            Anchor::Proof => "Proof",
            Anchor::Testimonials => "Testimonials",
            Anchor::Demo => "Demo",
            Anchor::Contact => "Contact",
            Anchor::Footer => "Footer",
        }
    }
}

/// Anything the user can click or focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Nav(Anchor),
    DemoCta,
    HeroExplore,
    SectorTab(usize),
    /// The sector display; hovering it pauses rotation.
    SectorPanel,
    SectorCta,
    Card(usize),
    /// "Talk to an engineer" under the principles.
    EngineerCta,
    TestimonialDot(usize),
    /// "Request a live demo" under the demo panels.
    LiveDemoCta,
    Field(Field),
    Submit,
    SendAnother,
    BackHome,
    PrevCapability,
    NextCapability,
}

impl Target {
    /// Whether Tab / Shift+Tab stops here.
    pub fn in_focus_ring(self) -> bool {
        !matches!(
            self,
            Target::SectorPanel
                | Target::HeroExplore
                | Target::SectorCta
                | Target::TestimonialDot(_)
        )
    }
}

/// A clickable region in page coordinates (rows from the page top, columns
/// from the content's left edge).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hit {
    pub rows: Range<usize>,
    pub cols: Range<u16>,
    pub target: Target,
}

#[derive(Debug, Default)]
pub struct PageDoc {
    pub lines: Vec<Line<'static>>,
    pub anchors: Vec<(Anchor, Range<usize>)>,
    pub hits: Vec<Hit>,
}

impl PageDoc {
    pub fn height(&self) -> usize {
        self.lines.len()
    }

    pub fn anchor(&self, anchor: Anchor) -> Option<Range<usize>> {
        self.anchors
            .iter()
            .find(|(a, _)| *a == anchor)
            .map(|(_, r)| r.clone())
    }

    /// Innermost target under a page cell (later hits nest inside earlier ones).
    pub fn hit_at(&self, row: usize, col: u16) -> Option<Target> {
        self.hits
            .iter()
            .rev()
            .find(|h| h.rows.contains(&row) && h.cols.contains(&col))
            .map(|h| h.target)
    }

    pub fn rows_of(&self, target: Target) -> Option<Range<usize>> {
        self.hits
            .iter()
            .find(|h| h.target == target)
            .map(|h| h.rows.clone())
    }

    /// Focusable page targets in reading order.
    pub fn focus_targets(&self) -> Vec<Target> {
        let mut hits: Vec<&Hit> = self.hits.iter().filter(|h| h.target.in_focus_ring()).collect();
        hits.sort_by_key(|h| (h.rows.start, h.cols.start));
        let mut out: Vec<Target> = Vec::new();
        for hit in hits {
            if !out.contains(&hit.target) {
                out.push(hit.target);
            }
        }
        out
    }
}

// ───────────────────────────────────────── builder ───────────

struct Doc<'a> {
    state: &'a AppState,
    width: usize,
    page: PageDoc,
}

impl<'a> Doc<'a> {
    fn row(&self) -> usize {
        self.page.lines.len()
    }

    fn push(&mut self, line: Line<'static>) {
        self.page.lines.push(line);
    }

    fn blank(&mut self) {
        self.push(Line::default());
    }

    fn text(&mut self, text: &str, style: Style, indent: usize) {
        let pad = " ".repeat(indent);
        for l in wrap(text, self.width.saturating_sub(indent)) {
            self.push(Line::from(vec![Span::raw(pad.clone()), Span::styled(l, style)]));
        }
    }

    fn hit(&mut self, rows: Range<usize>, cols: Range<u16>, target: Target) {
        self.page.hits.push(Hit { rows, cols, target });
    }

    fn focused(&self, target: Target) -> bool {
        self.state.focus == Some(target)
    }

    fn style_for(&self, target: Target, normal: Style) -> Style {
        if self.focused(target) {
            Theme::focused_style()
        } else {
            normal
        }
    }

    /// A row of buttons, laid out left to right with a two-cell gap.
    fn buttons(&mut self, items: &[(String, Target, Style)]) {
        let row = self.row();
        let mut spans = Vec::new();
        let mut col: u16 = 0;
        for (i, (label, target, style)) in items.iter().enumerate() {
            if i > 0 {
                spans.push(Span::raw("  "));
                col += 2;
            }
            let w = label.width() as u16;
            spans.push(Span::styled(label.clone(), self.style_for(*target, *style)));
            self.hit(row..row + 1, col..col + w, *target);
            col += w;
        }
        self.push(Line::from(spans));
    }

    fn section_heading(&mut self, label: &str, title: &str) {
        self.push(Line::from(Span::styled(label.to_uppercase(), Theme::label_style())));
        self.text(title, Theme::heading_style(), 0);
        self.blank();
    }

    /// Record `anchor` around whatever `f` pushes; fade it if not yet revealed.
    fn section(&mut self, anchor: Anchor, f: impl FnOnce(&mut Self)) {
        let start = self.row();
        f(self);
        let end = self.row();
        self.page.anchors.push((anchor, start..end));

        if !self.state.is_revealed(anchor) {
            for line in &mut self.page.lines[start..end] {
                *line = std::mem::take(line).patch_style(Theme::unrevealed_style());
            }
        }
    }
}

/// Lay out the page for the current route at `width` cells.
pub fn build(state: &AppState, width: u16) -> PageDoc {
    let mut doc = Doc {
        state,
        width: width.max(1) as usize,
        page: PageDoc::default(),
    };

    match &state.route {
        Route::Home => home(&mut doc),
        Route::Capability(slug) => match state.content.capability(slug) {
            Some(cap) => detail(&mut doc, cap),
            None => not_found(&mut doc, &state.route.path()),
        },
        Route::NotFound(path) => not_found(&mut doc, path),
    }
    footer(&mut doc);
    doc.page
}

// ───────────────────────────────────────── home ──────────────

fn home(doc: &mut Doc) {
    let state = doc.state;
    let content = &state.content;

    doc.section(Anchor::Hero, |doc| {
        let hero = &content.hero;
        doc.blank();
        doc.push(Line::from(Span::styled(hero.label.clone(), Theme::label_style())));
        doc.blank();
        doc.text(&hero.title, Theme::heading_style().add_modifier(Modifier::UNDERLINED), 0);
        doc.text(&hero.subtitle, Theme::body_style(), 0);
        doc.blank();
        doc.buttons(&[
            (format!("[ {} → ]", hero.primary_cta), Target::HeroExplore, Theme::button_style()),
            (format!("[ {} ]", hero.secondary_cta), Target::DemoCta, Theme::link_style()),
        ]);
        doc.blank();
        metrics_row(doc, &hero.snapshot);
        doc.blank();
    });

    doc.section(Anchor::Systems, |doc| {
        let systems = &content.systems;
        doc.section_heading(&systems.label, &systems.title);
        for module in &systems.modules {
            doc.push(Line::from(vec![
                Span::styled("■ ", Theme::label_style()),
                Span::styled(module.title.clone(), Theme::heading_style()),
            ]));
            doc.text(&module.description, Theme::body_style(), 2);
        }
        doc.blank();
    });

    doc.section(Anchor::Sectors, |doc| {
        doc.section_heading("Sectors", "Built for the sectors that matter");
        sector_showcase(doc, &content.sectors);
        metrics_row(doc, &content.stats);
        doc.blank();
    });

    doc.section(Anchor::Capabilities, |doc| {
        doc.section_heading("Capabilities", "What we build");
        for (i, cap) in content.capabilities.iter().enumerate() {
            capability_card(doc, i, cap);
        }
    });

    doc.section(Anchor::Process, |doc| {
        doc.section_heading("Process", "From first call to production");
        for step in &content.process {
            doc.push(Line::from(vec![
                Span::styled(format!("{}  ", step.number), Theme::metric_style()),
                Span::styled(step.title.clone(), Theme::heading_style()),
            ]));
            doc.text(&step.description, Theme::body_style(), 4);
            for detail in &step.details {
                doc.text(&format!("· {detail}"), Theme::muted_style(), 4);
            }
            doc.blank();
        }
    });

    if let Some(approach) = &content.approach {
        doc.section(Anchor::Principles, |doc| {
            doc.section_heading(&approach.label, &approach.title);
            doc.text(&approach.description, Theme::body_style(), 0);
            doc.blank();
            doc.push(Line::from(Span::styled("Trusted by", Theme::muted_style())));
            doc.text(&approach.clients.join(" · "), Theme::heading_style(), 2);
            doc.blank();
            for principle in &approach.principles {
                principle_block(doc, principle);
            }
            doc.buttons(&[(
                format!("[ {} → ]", approach.cta),
                Target::EngineerCta,
                Theme::button_style(),
            )]);
            doc.blank();
        });
    }

    doc.section(Anchor::Results, |doc| {
        doc.section_heading("Results", "Systems already in production");
        for study in &content.case_studies {
            doc.push(Line::from(vec![
                Span::styled(
                    format!("[{}] ", study.tag),
                    Style::default()
                        .fg(Theme::accent(&study.tag_color))
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(study.title.clone(), Theme::heading_style()),
            ]));
            doc.text(&study.description, Theme::body_style(), 2);
            for metric in &study.results {
                doc.push(Line::from(vec![
                    Span::styled(format!("  {:>6}  ", metric.value), Theme::metric_style()),
                    Span::styled(metric.label.clone(), Theme::body_style()),
                ]));
            }
            doc.blank();
        }
    });

    if let Some(proof) = &content.proof {
        doc.section(Anchor::Proof, |doc| {
            doc.section_heading(&proof.label, &proof.title);
            doc.text(&proof.subtitle, Theme::body_style(), 0);
            doc.blank();
            for story in &proof.stories {
                proof_story(doc, story);
            }
            if !proof.quotes.is_empty() {
                doc.push(Line::from(Span::styled("What our partners say", Theme::heading_style())));
                doc.blank();
                for quote in &proof.quotes {
                    doc.text(&format!("“{}”", quote.quote), Theme::quote_style(), 2);
                    doc.push(Line::from(vec![
                        Span::styled(format!("  — {}", quote.role), Theme::body_style()),
                        Span::styled(format!(", {}", quote.org), Theme::muted_style()),
                    ]));
                    doc.blank();
                }
            }
        });
    }

    doc.section(Anchor::Testimonials, |doc| {
        if content.testimonials.is_empty() {
            return;
        }
        doc.section_heading("Testimonials", "What our clients say");
        testimonial(doc);
        doc.blank();
    });

    if let Some(demo) = &content.demo {
        doc.section(Anchor::Demo, |doc| {
            doc.section_heading(&demo.label, &demo.title);
            doc.text(&demo.subtitle, Theme::body_style(), 0);
            doc.blank();
            for panel in &demo.panels {
                demo_panel(doc, panel);
            }
            doc.buttons(&[(
                format!("[ {} → ]", demo.cta),
                Target::LiveDemoCta,
                Theme::button_style(),
            )]);
            doc.blank();
        });
    }

    doc.section(Anchor::Contact, contact);
}

// ── approach, proof, demo ──────────────────────────────────────

fn principle_block(doc: &mut Doc, principle: &Principle) {
    doc.push(Line::from(vec![
        Span::styled("◆ ", Theme::label_style()),
        Span::styled(principle.title.clone(), Theme::heading_style()),
    ]));
    doc.text(&principle.description, Theme::body_style(), 2);
    for detail in &principle.details {
        doc.text(&format!("✓ {detail}"), Theme::muted_style(), 4);
    }
    doc.blank();
}

fn proof_story(doc: &mut Doc, story: &ProofStory) {
    doc.push(Line::from(Span::styled(
        format!("[{}]", story.sector),
        Theme::label_style().add_modifier(Modifier::BOLD),
    )));
    for (heading, text, style) in [
        ("Problem", &story.problem, Theme::body_style()),
        ("Solution", &story.solution, Theme::body_style()),
        ("Outcome", &story.outcome, Theme::heading_style()),
    ] {
        doc.push(Line::from(Span::styled(format!("  {heading}"), Theme::muted_style())));
        doc.text(text, style, 4);
    }
    doc.blank();
}

/// A boxed mock screen: title bar, caption, readouts, optional rule chain.
fn demo_panel(doc: &mut Doc, panel: &DemoPanel) {
    let inner = doc.width.saturating_sub(4).max(1);
    let border = Theme::border_style();
    let edge = |text: Span<'static>| {
        Line::from(vec![Span::styled("│ ", border), text, Span::styled(" │", border)])
    };

    let title = fit(&format!(" {} ", panel.title), inner);
    doc.push(Line::from(vec![
        Span::styled("╭─", border),
        Span::styled(title, Theme::title_style()),
        Span::styled("─╮", border),
    ]));
    for l in wrap(&panel.description, inner) {
        doc.push(edge(Span::styled(fit(&l, inner), Theme::muted_style())));
    }
    if !panel.readouts.is_empty() {
        let cell = (inner / panel.readouts.len().min(4)).max(1);
        for chunk in panel.readouts.chunks(4) {
            let values: String = chunk.iter().map(|m| fit(&m.value, cell)).collect();
            let labels: String = chunk.iter().map(|m| fit(&m.label, cell)).collect();
            doc.push(edge(Span::styled(fit(&values, inner), Theme::metric_style())));
            doc.push(edge(Span::styled(fit(&labels, inner), Theme::muted_style())));
        }
    }
    if !panel.flow.is_empty() {
        for l in wrap(&panel.flow.join(" → "), inner) {
            doc.push(edge(Span::styled(fit(&l, inner), Theme::body_style())));
        }
    }
    doc.push(Line::from(Span::styled(
        format!("╰{}╯", "─".repeat(inner + 2)),
        border,
    )));
    doc.blank();
}

fn metrics_row(doc: &mut Doc, metrics: &[Metric]) {
    let mut spans = Vec::new();
    let mut used = 0;
    for metric in metrics {
        let w = metric.value.width() + metric.label.width() + 4;
        if used > 0 && used + w > doc.width {
            doc.push(Line::from(std::mem::take(&mut spans)));
            used = 0;
        }
        spans.push(Span::styled(metric.value.clone(), Theme::metric_style()));
        spans.push(Span::styled(format!(" {}   ", metric.label), Theme::muted_style()));
        used += w;
    }
    if !spans.is_empty() {
        doc.push(Line::from(spans));
    }
}

// ── sector showcase ────────────────────────────────────────────

fn sector_showcase(doc: &mut Doc, sectors: &[SectorItem]) {
    if sectors.is_empty() {
        return;
    }
    let st = doc.state.sector_rotator.state();

    // Tabs: full titles when they fit, numbers otherwise.
    let full: usize = sectors.iter().map(|s| s.title.width() + 3).sum();
    let labels: Vec<String> = sectors
        .iter()
        .enumerate()
        .map(|(i, s)| {
            if full <= doc.width {
                format!(" {} ", s.title)
            } else {
                format!(" {} ", i + 1)
            }
        })
        .collect();

    let tab_row = doc.row();
    let mut tabs = Vec::new();
    let mut bar = Vec::new();
    let mut col: u16 = 0;
    for (i, label) in labels.iter().enumerate() {
        let w = label.width();
        let style = if doc.focused(Target::SectorTab(i)) {
            Theme::focused_style()
        } else if i == st.active_index {
            Theme::tab_active_style()
        } else {
            Theme::tab_style()
        };
        tabs.push(Span::styled(label.clone(), style));
        tabs.push(Span::raw(" "));

        if i == st.active_index {
            let percent = doc.state.sector_rotator.progress_percent();
            let filled = ((percent / 100.0 * w as f32).round() as usize).min(w);
            bar.push(Span::styled("━".repeat(filled), Theme::progress_style()));
            bar.push(Span::styled("─".repeat(w - filled), Theme::muted_style()));
        } else {
            bar.push(Span::raw(" ".repeat(w)));
        }
        bar.push(Span::raw(" "));

        doc.hit(tab_row..tab_row + 1, col..col + w as u16, Target::SectorTab(i));
        col += w as u16 + 1;
    }
    if st.paused {
        tabs.push(Span::styled(" ⏸ paused", Theme::muted_style()));
    }
    doc.push(Line::from(tabs));
    doc.push(Line::from(bar));
    doc.blank();

    // Panel: fixed height so the page does not jump as sectors change.
    let panels: Vec<Vec<Line<'static>>> = sectors
        .iter()
        .map(|s| sector_panel(s, doc.width))
        .collect();
    let height = panels.iter().map(Vec::len).max().unwrap_or(0);
    let shown = st.display_index.min(sectors.len() - 1);

    let start = doc.row();
    let mut lines = panels[shown].clone();
    let cta_row = start + lines.len().saturating_sub(1);
    if st.transitioning {
        lines = lines
            .into_iter()
            .map(|l| l.patch_style(Style::default().add_modifier(Modifier::DIM)))
            .collect();
    }
    let cta_width = lines.last().map_or(0, |l| l.width()) as u16;
    for line in lines {
        doc.push(line);
    }
    while doc.row() < start + height {
        doc.blank();
    }

    doc.hit(start..start + height, 0..doc.width as u16, Target::SectorPanel);
    doc.hit(cta_row..cta_row + 1, 0..cta_width, Target::SectorCta);
    doc.blank();
}

fn sector_panel(sector: &SectorItem, width: usize) -> Vec<Line<'static>> {
    let mut out = Vec::new();
    out.push(Line::from(Span::styled(sector.headline.clone(), Theme::heading_style())));
    for l in wrap(&sector.description, width) {
        out.push(Line::from(Span::styled(l, Theme::body_style())));
    }
    out.push(Line::default());

    // Two feature columns when there is room.
    let columns = if width >= 60 { 2 } else { 1 };
    let col_w = width / columns;
    for pair in sector.features.chunks(columns) {
        let spans: Vec<Span<'static>> = pair
            .iter()
            .map(|f| Span::styled(fit(&format!("✓ {f}"), col_w), Theme::body_style()))
            .collect();
        out.push(Line::from(spans));
    }
    out.push(Line::default());
    out.push(Line::from(vec![
        Span::styled(format!("▣ {}  ", sector.image_ref), Theme::muted_style()),
        Span::styled(sector.short_caption().to_string(), Theme::label_style()),
        Span::styled(format!("  {}", sector.caption_text), Theme::muted_style()),
    ]));
    out.push(Line::default());
    out.push(Line::from(Span::styled(
        format!("[ {} → ]", sector.cta_label),
        Theme::button_style(),
    )));
    out
}

// ── capabilities ───────────────────────────────────────────────

fn capability_card(doc: &mut Doc, index: usize, cap: &Capability) {
    let target = Target::Card(index);
    let accent = Theme::accent(&cap.accent_color);
    let bar = Span::styled("▎ ", Style::default().fg(accent));
    let inner = doc.width.saturating_sub(2);
    let start = doc.row();

    let title_style = doc.style_for(
        target,
        Style::default().fg(accent).add_modifier(Modifier::BOLD),
    );
    doc.push(Line::from(vec![bar.clone(), Span::styled(cap.title.clone(), title_style)]));
    doc.push(Line::from(vec![
        bar.clone(),
        Span::styled(cap.headline.clone(), Theme::heading_style()),
    ]));
    for l in wrap(&cap.description, inner) {
        doc.push(Line::from(vec![bar.clone(), Span::styled(l, Theme::body_style())]));
    }
    for l in wrap(&cap.features.join(" · "), inner) {
        doc.push(Line::from(vec![bar.clone(), Span::styled(l, Theme::muted_style())]));
    }
    doc.push(Line::from(vec![bar, Span::styled("Learn more →", Theme::link_style())]));

    let end = doc.row();
    doc.hit(start..end, 0..doc.width as u16, target);
    doc.blank();
}

// ── testimonials ───────────────────────────────────────────────

fn testimonial(doc: &mut Doc) {
    let state = doc.state;
    let testimonials = &state.content.testimonials;
    let st = state.testimonial_rotator.state();
    let shown = &testimonials[st.display_index.min(testimonials.len() - 1)];

    // Reserve the tallest quote so the dots stay put.
    let height = testimonials
        .iter()
        .map(|t| wrap(&format!("“{}”", t.quote), doc.width.saturating_sub(2)).len())
        .max()
        .unwrap_or(0);
    let start = doc.row();
    doc.text(&format!("“{}”", shown.quote), Theme::quote_style(), 2);
    while doc.row() < start + height {
        doc.blank();
    }
    doc.push(Line::from(vec![
        Span::styled(format!("  — {}", shown.name), Theme::heading_style()),
        Span::styled(format!(", {} · {}", shown.title, shown.org), Theme::muted_style()),
    ]));
    doc.blank();

    let row = doc.row();
    let mut spans = vec![Span::raw("  ")];
    for i in 0..testimonials.len() {
        let (glyph, style) = if i == st.active_index {
            ("●", Theme::label_style())
        } else {
            ("○", Theme::muted_style())
        };
        let col = 2 + 2 * i as u16;
        spans.push(Span::styled(glyph, style));
        spans.push(Span::raw(" "));
        doc.hit(row..row + 1, col..col + 1, Target::TestimonialDot(i));
    }
    doc.push(Line::from(spans));
}

// ── contact ────────────────────────────────────────────────────

fn contact(doc: &mut Doc) {
    let state = doc.state;
    let info = &state.content.contact;
    doc.section_heading("Contact", "Let's build something that works");
    for (label, value) in [("Office", &info.office), ("Email", &info.email), ("Phone", &info.phone)] {
        doc.push(Line::from(vec![
            Span::styled(format!("{label:<8}"), Theme::muted_style()),
            Span::styled(value.clone(), Theme::body_style()),
        ]));
    }
    doc.blank();

    let form = &state.form;
    if *form.state() == SubmitState::Success {
        doc.text(
            "✓ Message sent. We'll be in touch within one business day.",
            Theme::success_style(),
            0,
        );
        doc.blank();
        doc.buttons(&[(
            "[ Send another message ]".to_string(),
            Target::SendAnother,
            Theme::button_style(),
        )]);
        doc.blank();
        return;
    }

    let input_w = doc.width.min(64);
    for &field in Field::ALL {
        let start = doc.row();
        let editing = state.editing == Some(field);
        let label = if field.required() {
            format!("{} *", field.label())
        } else {
            field.label().to_string()
        };
        let label_style = doc.style_for(Target::Field(field), Theme::heading_style());
        doc.push(Line::from(Span::styled(label, label_style)));

        let value = form.value(field);
        let box_style = if editing {
            Theme::input_editing_style()
        } else {
            Theme::input_style()
        };
        let mut rows: Vec<Line<'static>> = if value.is_empty() && !editing {
            vec![Line::from(Span::styled(
                fit(field.placeholder(), input_w),
                box_style.patch(Theme::muted_style()),
            ))]
        } else {
            let shown = if editing { format!("{value}▏") } else { value.to_string() };
            let wrapped = if field.multiline() {
                wrap(&shown, input_w)
            } else {
                // Single-line inputs show the tail of long values.
                let tail: String = shown
                    .chars()
                    .rev()
                    .scan(0, |w, c| {
                        *w += unicode_width::UnicodeWidthChar::width(c).unwrap_or(0);
                        (*w <= input_w).then_some(c)
                    })
                    .collect::<Vec<_>>()
                    .into_iter()
                    .rev()
                    .collect();
                vec![tail]
            };
            wrapped
                .into_iter()
                .map(|l| Line::from(Span::styled(fit(&l, input_w), box_style)))
                .collect()
        };
        if field.multiline() {
            while rows.len() < 4 {
                rows.push(Line::from(Span::styled(" ".repeat(input_w), box_style)));
            }
        }
        for row in rows {
            doc.push(row);
        }
        let end = doc.row();
        doc.hit(start..end, 0..input_w as u16, Target::Field(field));

        if let Some(err) = form.error(field) {
            doc.push(Line::from(Span::styled(format!("! {err}"), Theme::error_style())));
        }
        doc.blank();
    }

    let label = if form.is_submitting() {
        format!("[ {} Sending… ]", spinner::frame(state.tick))
    } else {
        "[ Send message ]".to_string()
    };
    doc.buttons(&[(label, Target::Submit, Theme::button_style())]);
    if let SubmitState::Error(msg) = form.state() {
        doc.blank();
        doc.text(msg, Theme::error_style(), 0);
    }
    doc.blank();
    doc.text(
        &format!("Prefer email? Write to {}", info.direct_email),
        Theme::muted_style(),
        0,
    );
    doc.blank();
}

// ───────────────────────────────────────── detail ────────────

fn back_link(doc: &mut Doc) {
    doc.buttons(&[("← Back to home".to_string(), Target::BackHome, Theme::link_style())]);
}

fn detail(doc: &mut Doc, cap: &Capability) {
    let accent = Theme::accent(&cap.accent_color);
    doc.blank();
    back_link(doc);
    doc.blank();
    doc.push(Line::from(Span::styled("CAPABILITY", Theme::label_style())));
    doc.text(&cap.title, Style::default().fg(accent).add_modifier(Modifier::BOLD), 0);
    doc.text(&cap.headline, Theme::heading_style(), 0);
    doc.blank();
    for para in &cap.extended_description {
        doc.text(para, Theme::body_style(), 0);
        doc.blank();
    }

    titled_list(doc, "What's included", &cap.detailed_features, accent);
    titled_list(doc, "Use cases", &cap.use_cases, accent);

    if !cap.tech_stack.is_empty() {
        doc.push(Line::from(Span::styled("Tech stack", Theme::heading_style())));
        doc.text(&cap.tech_stack.join(" · "), Theme::muted_style(), 0);
        doc.blank();
    }
    if !cap.whos_it_for.is_empty() {
        doc.push(Line::from(Span::styled("Who it's for", Theme::heading_style())));
        for who in &cap.whos_it_for {
            doc.text(&format!("• {who}"), Theme::body_style(), 0);
        }
        doc.blank();
    }

    let state = doc.state;
    if let Some((prev, next)) = state.content.neighbours(&cap.slug) {
        let left = format!("← {}", prev.title);
        let right = format!("{} →", next.title);
        let (lw, rw) = (left.width(), right.width());
        let row = doc.row();
        let gap = doc.width.saturating_sub(lw + rw).max(2);
        doc.push(Line::from(vec![
            Span::styled(left, doc.style_for(Target::PrevCapability, Theme::link_style())),
            Span::raw(" ".repeat(gap)),
            Span::styled(right, doc.style_for(Target::NextCapability, Theme::link_style())),
        ]));
        doc.hit(row..row + 1, 0..lw as u16, Target::PrevCapability);
        let rstart = (lw + gap) as u16;
        doc.hit(row..row + 1, rstart..rstart + rw as u16, Target::NextCapability);
        doc.blank();
    }
}

fn titled_list(doc: &mut Doc, heading: &str, items: &[TitledText], accent: Color) {
    if items.is_empty() {
        return;
    }
    doc.push(Line::from(Span::styled(heading.to_string(), Theme::heading_style())));
    for item in items {
        doc.push(Line::from(vec![
            Span::styled("■ ", Style::default().fg(accent)),
            Span::styled(item.title.clone(), Style::default().add_modifier(Modifier::BOLD)),
        ]));
        doc.text(&item.description, Theme::body_style(), 2);
    }
    doc.blank();
}

fn not_found(doc: &mut Doc, path: &str) {
    doc.blank();
    doc.push(Line::from(Span::styled("404", Theme::metric_style())));
    doc.push(Line::from(Span::styled("Page not found", Theme::heading_style())));
    doc.text(&format!("Nothing lives at {path}."), Theme::body_style(), 0);
    doc.blank();
    back_link(doc);
    doc.blank();
}

fn footer(doc: &mut Doc) {
    let start = doc.row();
    doc.push(Line::from(Span::styled("─".repeat(doc.width), Theme::border_style())));
    doc.push(Line::from(vec![
        Span::styled(format!("© {} Locus Analytics", doc.state.year), Theme::muted_style()),
        Span::styled(format!("  ·  {}", doc.state.content.contact.email), Theme::muted_style()),
    ]));
    let end = doc.row();
    doc.page.anchors.push((Anchor::Footer, start..end));
}

// ───────────────────────────────────────── widget ────────────

/// Renders the visible slice of a [`PageDoc`].
pub struct PageView<'a> {
    pub doc: &'a PageDoc,
    pub scroll: usize,
}

impl Widget for PageView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inner = Rect {
            x: area.x.saturating_add(1),
            width: area.width.saturating_sub(2),
            ..area
        };
        let end = (self.scroll + area.height as usize).min(self.doc.lines.len());
        let visible = self.doc.lines.get(self.scroll..end).unwrap_or_default().to_vec();
        Paragraph::new(visible).render(inner, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::state::tests::test_state;
    use std::time::Instant;

    fn text_of(doc: &PageDoc) -> String {
        doc.lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn home_has_every_section_in_order() {
        let state = test_state();
        let doc = build(&state, 90);
        let order: Vec<Anchor> = doc.anchors.iter().map(|(a, _)| *a).collect();
        assert_eq!(
            order,
            vec![
                Anchor::Hero,
                Anchor::Systems,
                Anchor::Sectors,
                Anchor::Capabilities,
                Anchor::Process,
                Anchor::Principles,
                Anchor::Results,
                Anchor::Proof,
                Anchor::Testimonials,
                Anchor::Demo,
                Anchor::Contact,
                Anchor::Footer,
            ]
        );
        for pair in doc.anchors.windows(2) {
            assert!(pair[0].1.end <= pair[1].1.start);
        }
    }

    #[test]
    fn one_tab_per_sector_and_one_card_per_capability() {
        let state = test_state();
        let doc = build(&state, 90);
        let tabs = doc.hits.iter().filter(|h| matches!(h.target, Target::SectorTab(_))).count();
        let cards = doc.hits.iter().filter(|h| matches!(h.target, Target::Card(_))).count();
        assert_eq!(tabs, 4);
        assert_eq!(cards, 6);
    }

    #[test]
    fn sector_panel_height_is_stable_across_sectors() {
        let mut state = test_state();
        let now = Instant::now();
        let first = build(&state, 90).rows_of(Target::SectorPanel).unwrap();
        state.sector_rotator.reveal(now);
        state.sector_rotator.select_manually(3, now);
        state.sector_rotator.poll(now + std::time::Duration::from_millis(500));
        assert_eq!(state.sector_rotator.state().display_index, 3);
        let later = build(&state, 90).rows_of(Target::SectorPanel).unwrap();
        assert_eq!(first.len(), later.len());
    }

    #[test]
    fn hit_at_prefers_the_innermost_region() {
        let state = test_state();
        let doc = build(&state, 90);
        let panel = doc.rows_of(Target::SectorPanel).unwrap();
        let cta = doc.rows_of(Target::SectorCta).unwrap();
        assert!(panel.contains(&cta.start));
        assert_eq!(doc.hit_at(cta.start, 0), Some(Target::SectorCta));
        assert_eq!(doc.hit_at(panel.start, 0), Some(Target::SectorPanel));
    }

    #[test]
    fn empty_sector_list_renders_no_rotator() {
        let mut state = test_state();
        state.content.sectors.clear();
        state.sector_rotator = crate::core::rotator::Rotator::new(0, Default::default());
        let doc = build(&state, 90);
        assert!(doc.rows_of(Target::SectorPanel).is_none());
        assert!(doc.anchor(Anchor::Sectors).is_some());
    }

    #[test]
    fn focus_ring_follows_reading_order() {
        let state = test_state();
        let targets = build(&state, 90).focus_targets();
        assert_eq!(targets.first(), Some(&Target::DemoCta));
        let tab = targets.iter().position(|t| *t == Target::SectorTab(0)).unwrap();
        let card = targets.iter().position(|t| *t == Target::Card(0)).unwrap();
        let name = targets.iter().position(|t| *t == Target::Field(Field::Name)).unwrap();
        let submit = targets.iter().position(|t| *t == Target::Submit).unwrap();
        assert!(tab < card && card < name && name < submit);
        assert!(!targets.contains(&Target::SectorPanel));

        let engineer = targets.iter().position(|t| *t == Target::EngineerCta).unwrap();
        let live_demo = targets.iter().position(|t| *t == Target::LiveDemoCta).unwrap();
        assert!(card < engineer && engineer < live_demo && live_demo < name);
    }

    #[test]
    fn approach_proof_and_demo_render_their_copy() {
        let state = test_state();
        let doc = build(&state, 90);
        let text = text_of(&doc);
        assert!(text.contains("Built to run"));
        assert!(text.contains("Operational runbooks"));
        assert!(text.contains("Ministry of Health Uganda"));
        assert!(text.contains("Problem"));
        assert!(text.contains("[Education]"));
        assert!(text.contains("Retail & Hospitality Group"));
        assert!(text.contains("Health Dashboard"));
        assert!(text.contains("New report → Score ≥ 80%?"));
        assert!(text.contains("[ Request a live demo → ]"));
        assert!(text.contains("[ Talk to an engineer → ]"));
    }

    #[test]
    fn demo_panels_stay_inside_the_width() {
        let state = test_state();
        for width in [40, 90] {
            let doc = build(&state, width);
            let demo = doc.anchor(Anchor::Demo).unwrap();
            for line in &doc.lines[demo] {
                assert!(line.width() <= width as usize, "{line:?} wider than {width}");
            }
        }
    }

    #[test]
    fn optional_sections_are_skipped_when_absent() {
        let mut state = test_state();
        state.content.approach = None;
        state.content.proof = None;
        state.content.demo = None;
        let doc = build(&state, 90);
        assert!(doc.anchor(Anchor::Principles).is_none());
        assert!(doc.anchor(Anchor::Proof).is_none());
        assert!(doc.anchor(Anchor::Demo).is_none());
        assert!(doc.rows_of(Target::LiveDemoCta).is_none());
    }

    #[test]
    fn detail_page_links_wrap_around() {
        let mut state = test_state();
        state.navigate(Route::Capability("health-dashboards".into()));
        let doc = build(&state, 90);
        let text = text_of(&doc);
        assert!(text.contains("← AI Assistants"));
        assert!(text.contains("Education Management →"));
        assert!(doc.rows_of(Target::PrevCapability).is_some());
        assert!(doc.rows_of(Target::NextCapability).is_some());
        assert!(doc.rows_of(Target::BackHome).is_some());
    }

    #[test]
    fn unknown_route_renders_not_found() {
        let mut state = test_state();
        state.navigate(Route::NotFound("/capabilities/nope".into()));
        let text = text_of(&build(&state, 90));
        assert!(text.contains("Page not found"));
        assert!(text.contains("/capabilities/nope"));
    }

    #[test]
    fn footer_carries_the_year() {
        let state = test_state();
        let text = text_of(&build(&state, 90));
        assert!(text.contains(&format!("© {} Locus Analytics", state.year)));
    }

    #[test]
    fn field_errors_are_rendered() {
        let mut state = test_state();
        state.form.begin_submit(true);
        let text = text_of(&build(&state, 90));
        assert!(text.contains("! Name is required"));
        assert!(text.contains("! Message is required"));
    }
}
