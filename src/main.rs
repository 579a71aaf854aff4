//! Locus Analytics in the terminal: a scrollable brochure with a rotating
//! sector showcase, capability pages, and a working contact form.
//!
//! Run the binary to open the home page.  `--route /capabilities/<slug>`
//! opens a capability page directly; `--dump-content` prints the effective
//! content as TOML.

mod app;
mod config;
mod core;
mod ui;

use std::fs::File;
use std::io::{self, stderr};
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, layout::Rect, Terminal};
use tracing_subscriber::EnvFilter;

use crate::app::{
    contact_runtime::ContactUpdate,
    event::{spawn_event_reader, AppEvent},
    handler,
    router::Route,
    state::AppState,
};
use crate::config::{AppConfig, Overrides};
use crate::core::{
    analytics::{self, Analytics, Provider},
    content::SiteContent,
    transport::ContactClient,
};

/// How long the event reader waits before reporting an idle tick.
const TICK_RATE: Duration = Duration::from_millis(100);

// ───────────────────────────────────────── CLI ───────────────

#[derive(Parser, Debug)]
#[command(name = "locus", version, about = "Locus Analytics terminal brochure")]
struct Cli {
    /// Config file (defaults to `$XDG_CONFIG_HOME/locus-site/config.toml`).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Content TOML to use instead of the built-in copy.
    #[arg(long)]
    content: Option<PathBuf>,

    /// Start on this path, e.g. `/capabilities/ai-assistants`.
    #[arg(long, default_value = "/")]
    route: String,

    /// URL the contact form POSTs to.
    #[arg(long, env = "LOCUS_CONTACT_ENDPOINT")]
    contact_endpoint: Option<String>,

    /// `plausible`, `ga4`, or `none`.
    #[arg(long, env = "LOCUS_ANALYTICS_PROVIDER")]
    analytics_provider: Option<String>,

    #[arg(long, env = "LOCUS_PLAUSIBLE_DOMAIN")]
    plausible_domain: Option<String>,

    #[arg(long, env = "LOCUS_GA4_ID")]
    ga4_id: Option<String>,

    /// Sector rotation interval in milliseconds.
    #[arg(long)]
    interval_ms: Option<u64>,

    /// Sector crossfade length in milliseconds.
    #[arg(long)]
    transition_ms: Option<u64>,

    /// Write logs here instead of stderr.
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Print the effective content as TOML and exit.
    #[arg(long)]
    dump_content: bool,

    /// Pre-fill the hidden anti-spam field (submissions are then dropped).
    #[arg(long, hide = true)]
    honeypot: Option<String>,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            contact_endpoint: self.contact_endpoint.clone(),
            analytics_provider: self.analytics_provider.clone(),
            plausible_domain: self.plausible_domain.clone(),
            ga4_id: self.ga4_id.clone(),
            interval_ms: self.interval_ms,
            transition_ms: self.transition_ms,
        }
    }
}

fn init_tracing(log_file: Option<&PathBuf>) -> Result<()> {
    let builder = tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env());
    match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("creating log file {}", path.display()))?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
        // Never pollute stdout; `--dump-content` writes there.
        None => builder.with_writer(io::stderr).init(),
    }
    Ok(())
}

// ───────────────────────────────────────── main ─────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_file.as_ref())?;

    // ── content + config ──────────────────────────────────────
    let content = match &cli.content {
        Some(path) => SiteContent::from_path(path)
            .with_context(|| format!("loading content from {}", path.display()))?,
        None => SiteContent::embedded().context("loading built-in content")?,
    };

    if cli.dump_content {
        print!("{}", content.to_toml().context("serialising content")?);
        return Ok(());
    }

    let mut config = AppConfig::load(cli.config.as_deref()).context("loading config")?;
    config
        .apply(cli.overrides())
        .context("applying command-line overrides")?;

    let section = &config.analytics;
    let tracker = Analytics::new(Provider::resolve(
        section.provider.as_deref(),
        section.plausible_domain.as_deref(),
        section.ga4_id.as_deref(),
    ));
    tracing::info!(provider = tracker.provider().name(), "analytics ready");
    analytics::install(tracker);

    let client = ContactClient::new(config.contact_endpoint.clone(), config.contact_timeout)
        .context("building HTTP client")?;
    if !client.is_configured() {
        tracing::warn!("no contact endpoint configured; the form will report an error");
    }

    let (contact_tx, mut contact_rx) = tokio::sync::mpsc::unbounded_channel::<ContactUpdate>();
    let route = Route::parse(&cli.route, &content);
    let mut state = AppState::new(content, config, client);
    state.contact_tx = Some(contact_tx);
    if let Some(honeypot) = cli.honeypot {
        state.form.honeypot = honeypot;
    }
    state.navigate(route);

    // ── terminal setup ────────────────────────────────────────
    enable_raw_mode()?;
    let mut stderr_handle = stderr();
    execute!(stderr_handle, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stderr());
    let mut terminal = Terminal::new(backend)?;
    let size = terminal.size()?;
    state.terminal_area = Rect::new(0, 0, size.width, size.height);

    let mut events = spawn_event_reader(TICK_RATE);

    // ── event loop ────────────────────────────────────────────
    let result: Result<()> = loop {
        let now = Instant::now();
        state.poll(now);

        // Lay out once; re-lay only when a reveal, an anchor jump or a
        // hover change altered it.
        let mut doc = handler::build_page(&state);
        if state.observe(&doc, now) {
            doc = handler::build_page(&state);
        }
        if handler::sync_hover(&mut state, &doc, now) {
            doc = handler::build_page(&state);
        }

        if let Err(err) = terminal.draw(|frame| ui::draw(frame, &state, &doc)) {
            break Err(err.into());
        }

        let deadline = state.next_deadline();
        let sleep = async {
            match deadline {
                Some(at) => tokio::time::sleep_until(tokio::time::Instant::from_std(at)).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;

            Some(event) = events.recv() => {
                let now = Instant::now();
                match event {
                    AppEvent::Key(k) => handler::handle_key(&mut state, k, now),
                    AppEvent::Mouse(m) => handler::handle_mouse(&mut state, m, now),
                    AppEvent::Resize(w, h) => state.terminal_area = Rect::new(0, 0, w, h),
                    AppEvent::Tick => state.tick = state.tick.wrapping_add(1),
                }
            }

            Some(update) = contact_rx.recv() => {
                state.apply_contact_update(update);
            }

            () = sleep => {}
        }

        if state.should_quit {
            break Ok(());
        }
    };

    // ── teardown ──────────────────────────────────────────────
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}
