//! User configuration: key bindings, contact endpoint, analytics, rotator timing.
//!
//! Read from `$XDG_CONFIG_HOME/locus-site/config.toml` (default
//! `~/.config/locus-site/config.toml`).  A missing file means defaults;
//! command-line and environment values are layered on top by `main`.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use reqwest::Url;
use serde::Deserialize;

use crate::core::rotator::{RotatorTimings, DEFAULT_INTERVAL, DEFAULT_TRANSITION};
use crate::core::transport::DEFAULT_TIMEOUT;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid contact endpoint `{url}`: {reason}")]
    InvalidEndpoint { url: String, reason: String },
    #[error("invalid key binding `{key}` for `{action}`")]
    InvalidKey { action: String, key: String },
    #[error("key `{key}` is bound to both `{first}` and `{second}`")]
    DuplicateKey {
        key: String,
        first: String,
        second: String,
    },
}

// ───────────────────────────────────────── actions ───────────

/// All configurable user actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    ScrollUp,
    ScrollDown,
    PageUp,
    PageDown,
    NextFocus,
    PrevFocus,
    Activate,
    PrevSector,
    NextSector,
    TogglePause,
    Back,
    ShowHelp,
    Quit,
}

impl Action {
    /// Ordered list of all actions (used for the help popup).
    pub const ALL: &[Action] = &[
        Action::ScrollUp,
        Action::ScrollDown,
        Action::PageUp,
        Action::PageDown,
        Action::NextFocus,
        Action::PrevFocus,
        Action::Activate,
        Action::PrevSector,
        Action::NextSector,
        Action::TogglePause,
        Action::Back,
        Action::ShowHelp,
        Action::Quit,
    ];

    /// Human-readable label for the UI.
    pub fn label(self) -> &'static str {
        match self {
            Action::ScrollUp => "Scroll Up",
            Action::ScrollDown => "Scroll Down",
            Action::PageUp => "Page Up",
            Action::PageDown => "Page Down",
            Action::NextFocus => "Next Item",
            Action::PrevFocus => "Previous Item",
            Action::Activate => "Open / Edit",
            Action::PrevSector => "Previous Sector",
            Action::NextSector => "Next Sector",
            Action::TogglePause => "Pause Rotation",
            Action::Back => "Back",
            Action::ShowHelp => "Show Keys",
            Action::Quit => "Quit",
        }
    }

    /// Key used in the `[keys]` table.
    fn config_key(self) -> &'static str {
        match self {
            Action::ScrollUp => "scroll_up",
            Action::ScrollDown => "scroll_down",
            Action::PageUp => "page_up",
            Action::PageDown => "page_down",
            Action::NextFocus => "next_focus",
            Action::PrevFocus => "prev_focus",
            Action::Activate => "activate",
            Action::PrevSector => "prev_sector",
            Action::NextSector => "next_sector",
            Action::TogglePause => "toggle_pause",
            Action::Back => "back",
            Action::ShowHelp => "show_help",
            Action::Quit => "quit",
        }
    }

    fn from_config_key(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|a| a.config_key() == s)
    }
}

// ───────────────────────────────────────── key bind ──────────

/// A single key binding: key code plus modifier combination.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyBind {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyBind {
    pub fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    /// Only CTRL/ALT/SHIFT are compared.  `BackTab` ignores SHIFT since
    /// terminals disagree on whether they report it.
    pub fn matches(&self, event: KeyEvent) -> bool {
        let mut mask = KeyModifiers::CONTROL | KeyModifiers::ALT | KeyModifiers::SHIFT;
        if self.code == KeyCode::BackTab {
            mask.remove(KeyModifiers::SHIFT);
        }
        self.code == event.code && (self.modifiers & mask) == (event.modifiers & mask)
    }

    /// User-friendly display string (e.g. `"Alt+↑"`, `"Ctrl+c"`, `"q"`).
    pub fn display(&self) -> String {
        let mut modifiers = self.modifiers;
        if self.code == KeyCode::BackTab {
            modifiers.remove(KeyModifiers::SHIFT);
        }
        let mut s = modifier_prefix(modifiers);
        s.push_str(&match self.code {
            KeyCode::Char(' ') => "Space".into(),
            KeyCode::Char(c) => c.to_string(),
            KeyCode::Up => "↑".into(),
            KeyCode::Down => "↓".into(),
            KeyCode::Left => "←".into(),
            KeyCode::Right => "→".into(),
            KeyCode::Enter => "Enter".into(),
            KeyCode::Esc => "Esc".into(),
            KeyCode::Tab => "Tab".into(),
            KeyCode::BackTab => "Shift+Tab".into(),
            KeyCode::Backspace => "Bksp".into(),
            KeyCode::Home => "Home".into(),
            KeyCode::End => "End".into(),
            KeyCode::PageUp => "PgUp".into(),
            KeyCode::PageDown => "PgDn".into(),
            KeyCode::F(n) => format!("F{n}"),
            other => format!("{other:?}"),
        });
        s
    }

    /// Parse a key string like `"Ctrl+c"`, `"Alt+Up"`, `"q"`, `"Enter"`.
    pub fn parse(s: &str) -> Option<Self> {
        let mut modifiers = KeyModifiers::NONE;
        // `"+"` on its own is the plus key, not a separator.
        let parts: Vec<&str> = if s == "+" { vec!["+"] } else { s.split('+').collect() };
        let (key_part, mods) = parts.split_last()?;

        for part in mods {
            match part.trim().to_lowercase().as_str() {
                "ctrl" => modifiers |= KeyModifiers::CONTROL,
                "alt" => modifiers |= KeyModifiers::ALT,
                "shift" => modifiers |= KeyModifiers::SHIFT,
                _ => return None,
            }
        }

        let code = match key_part.trim().to_lowercase().as_str() {
            "up" => KeyCode::Up,
            "down" => KeyCode::Down,
            "left" => KeyCode::Left,
            "right" => KeyCode::Right,
            "enter" | "return" => KeyCode::Enter,
            "esc" | "escape" => KeyCode::Esc,
            "tab" if modifiers.contains(KeyModifiers::SHIFT) => KeyCode::BackTab,
            "tab" => KeyCode::Tab,
            "backtab" => KeyCode::BackTab,
            "backspace" | "bksp" => KeyCode::Backspace,
            "home" => KeyCode::Home,
            "end" => KeyCode::End,
            "pageup" | "pgup" => KeyCode::PageUp,
            "pagedown" | "pgdn" => KeyCode::PageDown,
            "space" => KeyCode::Char(' '),
            k if k.starts_with('f') && k.len() > 1 => KeyCode::F(k[1..].parse().ok()?),
            _ => {
                // Single characters keep their case (`"G"` differs from `"g"`).
                let mut chars = key_part.trim().chars();
                let c = chars.next()?;
                if chars.next().is_some() {
                    return None;
                }
                KeyCode::Char(c)
            }
        };

        Some(KeyBind { code, modifiers })
    }
}

fn modifier_prefix(modifiers: KeyModifiers) -> String {
    let mut s = String::new();
    if modifiers.contains(KeyModifiers::CONTROL) {
        s.push_str("Ctrl+");
    }
    if modifiers.contains(KeyModifiers::ALT) {
        s.push_str("Alt+");
    }
    if modifiers.contains(KeyModifiers::SHIFT) {
        s.push_str("Shift+");
    }
    s
}

// ───────────────────────────────────────── file format ───────

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileConfig {
    contact: ContactSection,
    analytics: AnalyticsSection,
    rotator: RotatorSection,
    /// `action = "Key1, Key2"`.
    keys: BTreeMap<String, String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ContactSection {
    endpoint: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct AnalyticsSection {
    pub provider: Option<String>,
    pub plausible_domain: Option<String>,
    pub ga4_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RotatorSection {
    interval_ms: Option<u64>,
    transition_ms: Option<u64>,
}

// ───────────────────────────────────────── config ────────────

/// Values supplied on the command line or through the environment.
/// `Some` wins over whatever the file says.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub contact_endpoint: Option<String>,
    pub analytics_provider: Option<String>,
    pub plausible_domain: Option<String>,
    pub ga4_id: Option<String>,
    pub interval_ms: Option<u64>,
    pub transition_ms: Option<u64>,
}

/// Effective application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bindings: HashMap<Action, Vec<KeyBind>>,
    pub contact_endpoint: Option<Url>,
    pub contact_timeout: Duration,
    pub analytics: AnalyticsSection,
    pub interval: Duration,
    pub transition: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bindings: Self::default_bindings(),
            contact_endpoint: None,
            contact_timeout: DEFAULT_TIMEOUT,
            analytics: AnalyticsSection::default(),
            interval: DEFAULT_INTERVAL,
            transition: DEFAULT_TRANSITION,
        }
    }
}

impl AppConfig {
    pub fn default_bindings() -> HashMap<Action, Vec<KeyBind>> {
        use Action::*;
        use KeyCode::*;
        let n = KeyModifiers::NONE;
        let mut m = HashMap::new();

        m.insert(ScrollUp, vec![KeyBind::new(Up, n), KeyBind::new(Char('k'), n)]);
        m.insert(ScrollDown, vec![KeyBind::new(Down, n), KeyBind::new(Char('j'), n)]);
        m.insert(Action::PageUp, vec![KeyBind::new(KeyCode::PageUp, n)]);
        m.insert(
            Action::PageDown,
            vec![KeyBind::new(KeyCode::PageDown, n), KeyBind::new(Char(' '), n)],
        );
        m.insert(NextFocus, vec![KeyBind::new(Tab, n)]);
        m.insert(PrevFocus, vec![KeyBind::new(BackTab, KeyModifiers::SHIFT)]);
        m.insert(Activate, vec![KeyBind::new(Enter, n)]);
        m.insert(PrevSector, vec![KeyBind::new(Left, n), KeyBind::new(Char('h'), n)]);
        m.insert(NextSector, vec![KeyBind::new(Right, n), KeyBind::new(Char('l'), n)]);
        m.insert(TogglePause, vec![KeyBind::new(Char('p'), n)]);
        m.insert(Back, vec![KeyBind::new(Esc, n), KeyBind::new(Backspace, n)]);
        m.insert(ShowHelp, vec![KeyBind::new(Char('?'), n)]);
        m.insert(Quit, vec![KeyBind::new(Char('q'), n)]);

        m
    }

    /// Find the action that matches a key event.  When several bindings
    /// match, the one with the most modifiers wins; ties go to the action
    /// listed first in [`Action::ALL`].
    pub fn match_key(&self, event: KeyEvent) -> Option<Action> {
        let mut best: Option<Action> = None;
        let mut best_mod_count = 0;

        for &action in Action::ALL {
            let Some(binds) = self.bindings.get(&action) else {
                continue;
            };
            for bind in binds {
                if bind.matches(event) {
                    let mc = bind.modifiers.bits().count_ones();
                    if best.is_none() || mc > best_mod_count {
                        best = Some(action);
                        best_mod_count = mc;
                    }
                }
            }
        }
        best
    }

    /// Replace `action`'s bindings.  The keys are taken away from any
    /// other action so no key ever maps to two actions.
    pub fn set_bindings(&mut self, action: Action, binds: Vec<KeyBind>) {
        for (_, other) in self.bindings.iter_mut() {
            other.retain(|b| !binds.contains(b));
        }
        self.bindings.insert(action, binds);
    }

    /// Format the binding list for a given action (e.g. `"↑/k"`).
    pub fn display_bindings(&self, action: Action) -> String {
        match self.bindings.get(&action) {
            Some(binds) if !binds.is_empty() => {
                binds.iter().map(|b| b.display()).collect::<Vec<_>>().join("/")
            }
            _ => "unbound".into(),
        }
    }

    fn short_binding(&self, action: Action) -> String {
        match self.bindings.get(&action) {
            Some(binds) if !binds.is_empty() => binds[0].display(),
            _ => "?".into(),
        }
    }

    /// Build the status-bar hint string from current bindings.
    pub fn status_bar_hint(&self) -> String {
        format!(
            "{}: scroll | {}: next item | {}: open | 1-9/{}: sector | {}: pause | {}: keys | {}: quit",
            self.short_binding(Action::ScrollDown),
            self.short_binding(Action::NextFocus),
            self.short_binding(Action::Activate),
            self.short_binding(Action::NextSector),
            self.short_binding(Action::TogglePause),
            self.short_binding(Action::ShowHelp),
            self.short_binding(Action::Quit),
        )
    }

    pub fn timings(&self) -> RotatorTimings {
        RotatorTimings::new(self.interval, self.transition)
    }

    // ── loading ─────────────────────────────────────────────────

    /// Load from `path`, or from the default location when `None`.  A
    /// missing file yields defaults; a malformed one is an error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path.map(Path::to_path_buf).unwrap_or_else(config_path);
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let file: FileConfig = toml::from_str(text)?;
        let mut config = Self::default();

        if let Some(url) = file.contact.endpoint.as_deref() {
            config.contact_endpoint = parse_endpoint(url)?;
        }
        if let Some(secs) = file.contact.timeout_secs {
            config.contact_timeout = Duration::from_secs(secs.clamp(1, 120));
        }
        config.analytics = file.analytics;
        if let Some(ms) = file.rotator.interval_ms {
            config.interval = clamp_interval(ms);
        }
        if let Some(ms) = file.rotator.transition_ms {
            config.transition = clamp_transition(ms);
        }

        // Keys claimed by the file so far, and by which action.
        let mut claimed: HashMap<KeyBind, &str> = HashMap::new();
        for (key, value) in &file.keys {
            let Some(action) = Action::from_config_key(key) else {
                tracing::warn!(key, "unknown action in [keys], ignored");
                continue;
            };
            let mut parsed = Vec::new();
            for part in value.split(',').map(str::trim).filter(|p| !p.is_empty()) {
                let bind = KeyBind::parse(part).ok_or_else(|| ConfigError::InvalidKey {
                    action: key.clone(),
                    key: part.to_string(),
                })?;
                if let Some(first) = claimed.insert(bind.clone(), key.as_str()) {
                    return Err(ConfigError::DuplicateKey {
                        key: part.to_string(),
                        first: first.to_string(),
                        second: key.clone(),
                    });
                }
                parsed.push(bind);
            }
            if !parsed.is_empty() {
                config.set_bindings(action, parsed);
            }
        }

        Ok(config)
    }

    /// Layer command-line / environment values over the file.
    pub fn apply(&mut self, overrides: Overrides) -> Result<(), ConfigError> {
        if let Some(url) = overrides.contact_endpoint.as_deref() {
            self.contact_endpoint = parse_endpoint(url)?;
        }
        if overrides.analytics_provider.is_some() {
            self.analytics.provider = overrides.analytics_provider;
        }
        if overrides.plausible_domain.is_some() {
            self.analytics.plausible_domain = overrides.plausible_domain;
        }
        if overrides.ga4_id.is_some() {
            self.analytics.ga4_id = overrides.ga4_id;
        }
        if let Some(ms) = overrides.interval_ms {
            self.interval = clamp_interval(ms);
        }
        if let Some(ms) = overrides.transition_ms {
            self.transition = clamp_transition(ms);
        }
        Ok(())
    }
}

/// An empty string means "not configured".
fn parse_endpoint(url: &str) -> Result<Option<Url>, ConfigError> {
    let url = url.trim();
    if url.is_empty() {
        return Ok(None);
    }
    Url::parse(url)
        .map(Some)
        .map_err(|e| ConfigError::InvalidEndpoint {
            url: url.to_string(),
            reason: e.to_string(),
        })
}

fn clamp_interval(ms: u64) -> Duration {
    Duration::from_millis(ms.clamp(250, 60_000))
}

fn clamp_transition(ms: u64) -> Duration {
    Duration::from_millis(ms.min(5_000))
}

/// Return the config file path (`$XDG_CONFIG_HOME/locus-site/config.toml`).
pub fn config_path() -> PathBuf {
    let config_dir = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
            PathBuf::from(home).join(".config")
        });
    config_dir.join("locus-site").join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn empty_file_gives_defaults() {
        let config = AppConfig::parse("").unwrap();
        assert_eq!(config.interval, DEFAULT_INTERVAL);
        assert_eq!(config.transition, DEFAULT_TRANSITION);
        assert!(config.contact_endpoint.is_none());
        assert_eq!(
            config.match_key(key(KeyCode::Char('q'), KeyModifiers::NONE)),
            Some(Action::Quit)
        );
    }

    #[test]
    fn sections_override_defaults() {
        let config = AppConfig::parse(
            r#"
            [contact]
            endpoint = "https://forms.example.com/f/abc"

            [analytics]
            provider = "plausible"
            plausible_domain = "locus.example"

            [rotator]
            interval_ms = 3000
            transition_ms = 0

            [keys]
            quit = "Ctrl+q, x"
            "#,
        )
        .unwrap();
        assert_eq!(
            config.contact_endpoint.as_ref().map(Url::as_str),
            Some("https://forms.example.com/f/abc")
        );
        assert_eq!(config.analytics.provider.as_deref(), Some("plausible"));
        assert_eq!(config.interval, Duration::from_millis(3000));
        assert_eq!(config.transition, Duration::ZERO);
        assert_eq!(
            config.match_key(key(KeyCode::Char('q'), KeyModifiers::CONTROL)),
            Some(Action::Quit)
        );
        assert_eq!(config.match_key(key(KeyCode::Char('q'), KeyModifiers::NONE)), None);
    }

    #[test]
    fn interval_is_clamped() {
        let config = AppConfig::parse("[rotator]\ninterval_ms = 1").unwrap();
        assert_eq!(config.interval, Duration::from_millis(250));
    }

    #[test]
    fn transition_never_outlasts_the_interval() {
        let mut config = AppConfig::default();
        config
            .apply(Overrides {
                interval_ms: Some(250),
                transition_ms: Some(400),
                ..Overrides::default()
            })
            .unwrap();
        let timings = config.timings();
        assert!(timings.transition < timings.interval);
    }

    #[test]
    fn bad_endpoint_is_rejected() {
        let err = AppConfig::parse("[contact]\nendpoint = \"not a url\"").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEndpoint { .. }));
    }

    #[test]
    fn bad_key_is_rejected() {
        let err = AppConfig::parse("[keys]\nquit = \"Hyper+q\"").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidKey { ref key, .. } if key == "Hyper+q"));
    }

    #[test]
    fn overrides_win_over_file() {
        let mut config = AppConfig::parse("[contact]\nendpoint = \"https://a.example/x\"").unwrap();
        config
            .apply(Overrides {
                contact_endpoint: Some("https://b.example/y".into()),
                interval_ms: Some(5000),
                ..Overrides::default()
            })
            .unwrap();
        assert_eq!(config.contact_endpoint.unwrap().host_str(), Some("b.example"));
        assert_eq!(config.interval, Duration::from_millis(5000));
    }

    #[test]
    fn back_tab_matches_with_or_without_shift() {
        let config = AppConfig::default();
        assert_eq!(
            config.match_key(key(KeyCode::BackTab, KeyModifiers::SHIFT)),
            Some(Action::PrevFocus)
        );
        assert_eq!(
            config.match_key(key(KeyCode::BackTab, KeyModifiers::NONE)),
            Some(Action::PrevFocus)
        );
    }

    #[test]
    fn key_strings_parse() {
        assert_eq!(
            KeyBind::parse("Alt+Up"),
            Some(KeyBind::new(KeyCode::Up, KeyModifiers::ALT))
        );
        assert_eq!(
            KeyBind::parse("Shift+Tab"),
            Some(KeyBind::new(KeyCode::BackTab, KeyModifiers::SHIFT))
        );
        assert_eq!(KeyBind::parse("G"), Some(KeyBind::new(KeyCode::Char('G'), KeyModifiers::NONE)));
        assert_eq!(KeyBind::parse("F5").map(|b| b.code), Some(KeyCode::F(5)));
        assert_eq!(KeyBind::parse("ab"), None);
    }

    #[test]
    fn rebinding_a_default_key_moves_it() {
        let config = AppConfig::parse("[keys]\nscroll_down = \"q\"").unwrap();
        assert_eq!(
            config.match_key(key(KeyCode::Char('q'), KeyModifiers::NONE)),
            Some(Action::ScrollDown)
        );
        assert_eq!(config.display_bindings(Action::Quit), "unbound");
    }

    #[test]
    fn one_key_for_two_actions_is_rejected() {
        let err = AppConfig::parse("[keys]\nquit = \"x\"\nshow_help = \"x, ?\"").unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateKey { ref key, .. } if key == "x"));
    }

    #[test]
    fn ties_resolve_in_action_order() {
        let mut config = AppConfig::default();
        let x = KeyBind::new(KeyCode::Char('x'), KeyModifiers::NONE);
        config.bindings.insert(Action::Quit, vec![x.clone()]);
        config.bindings.insert(Action::ScrollUp, vec![x]);
        for _ in 0..8 {
            assert_eq!(
                config.match_key(key(KeyCode::Char('x'), KeyModifiers::NONE)),
                Some(Action::ScrollUp)
            );
        }
    }

    #[test]
    fn missing_file_is_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load(Some(&dir.path().join("none.toml"))).unwrap();
        assert_eq!(config.interval, DEFAULT_INTERVAL);
    }

    #[test]
    fn file_on_disk_is_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[rotator]\ntransition_ms = 100\n").unwrap();
        let config = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(config.transition, Duration::from_millis(100));
    }
}
