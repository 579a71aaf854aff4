//! Page analytics: an init-once, process-wide event sink.
//!
//! [`install`] may succeed exactly once per process; the first installed
//! [`Analytics`] stays in place for the process lifetime and later calls
//! return `false` without touching it.  Until something is installed,
//! [`track_event`] is a no-op, exactly like a provider of `none`.

use std::collections::BTreeMap;
use std::sync::OnceLock;

static INSTANCE: OnceLock<Analytics> = OnceLock::new();

/// Which analytics backend events are tagged for.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Provider {
    #[default]
    None,
    Plausible { domain: String },
    Ga4 { measurement_id: String },
}

impl Provider {
    /// Resolve a provider name plus its identifiers.  A provider missing its
    /// identifier degrades to [`Provider::None`].
    pub fn resolve(name: Option<&str>, plausible_domain: Option<&str>, ga4_id: Option<&str>) -> Self {
        let non_empty = |s: Option<&str>| s.map(str::trim).filter(|s| !s.is_empty()).map(String::from);
        match name.map(|n| n.trim().to_ascii_lowercase()).as_deref() {
            None | Some("") | Some("none") => Provider::None,
            Some("plausible") => match non_empty(plausible_domain) {
                Some(domain) => Provider::Plausible { domain },
                None => {
                    tracing::warn!("analytics provider `plausible` needs a domain; disabled");
                    Provider::None
                }
            },
            Some("ga4") => match non_empty(ga4_id) {
                Some(measurement_id) => Provider::Ga4 { measurement_id },
                None => {
                    tracing::warn!("analytics provider `ga4` needs a measurement id; disabled");
                    Provider::None
                }
            },
            Some(other) => {
                tracing::warn!(provider = other, "unknown analytics provider; disabled");
                Provider::None
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Provider::None => "none",
            Provider::Plausible { .. } => "plausible",
            Provider::Ga4 { .. } => "ga4",
        }
    }
}

pub type Props = BTreeMap<String, String>;

/// An event as handed to the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedEvent {
    pub provider: &'static str,
    pub name: String,
    pub props: Props,
}

#[derive(Debug, Default)]
pub struct Analytics {
    provider: Provider,
}

impl Analytics {
    pub fn new(provider: Provider) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &Provider {
        &self.provider
    }

    /// Emit one event.  Returns what was sent, or `None` when disabled.
    pub fn dispatch(&self, name: &str, props: Props) -> Option<TrackedEvent> {
        let provider = match &self.provider {
            Provider::None => return None,
            p => p.name(),
        };
        tracing::info!(target: "analytics", provider, event = name, ?props, "track");
        Some(TrackedEvent {
            provider,
            name: name.to_string(),
            props,
        })
    }
}

/// Install the process-wide instance.  Returns `false` if one already exists.
pub fn install(analytics: Analytics) -> bool {
    let provider = analytics.provider.name();
    let installed = INSTANCE.set(analytics).is_ok();
    if installed {
        tracing::debug!(provider, "analytics initialised");
    }
    installed
}

#[cfg(test)]
thread_local! {
    static TRACKED: std::cell::RefCell<Vec<String>> = const { std::cell::RefCell::new(Vec::new()) };
}

/// Event names passed to [`track_event`] on this thread since the last call.
#[cfg(test)]
pub fn take_tracked() -> Vec<String> {
    TRACKED.with(|t| std::mem::take(&mut *t.borrow_mut()))
}

/// Track an event on the installed instance, if any.
pub fn track_event(name: &str, props: &[(&str, &str)]) {
    #[cfg(test)]
    TRACKED.with(|t| t.borrow_mut().push(name.to_string()));
    if let Some(analytics) = INSTANCE.get() {
        let props = props
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        analytics.dispatch(name, props);
    }
}
