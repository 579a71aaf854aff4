//! Page routes: the home page and one detail page per capability.

use crate::core::content::SiteContent;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Route {
    #[default]
    Home,
    /// `/capabilities/:slug`, slug known to exist.
    Capability(String),
    /// Anything else; keeps the requested path for display.
    NotFound(String),
}

impl Route {
    /// Resolve a path such as `/`, `/capabilities/data-pipelines`.  Trailing
    /// slashes and a `#fragment` are ignored.
    pub fn parse(path: &str, content: &SiteContent) -> Self {
        let trimmed = path.trim();
        let without_fragment = trimmed.split('#').next().unwrap_or_default();
        let clean = without_fragment.trim_end_matches('/');

        if clean.is_empty() {
            return Route::Home;
        }
        match clean.strip_prefix("/capabilities/") {
            Some(slug) if content.capability(slug).is_some() => Route::Capability(slug.to_string()),
            _ => Route::NotFound(trimmed.to_string()),
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".into(),
            Route::Capability(slug) => format!("/capabilities/{slug}"),
            Route::NotFound(path) => path.clone(),
        }
    }

    pub fn is_home(&self) -> bool {
        matches!(self, Route::Home)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_routes() {
        let content = SiteContent::embedded().unwrap();
        assert_eq!(Route::parse("/", &content), Route::Home);
        assert_eq!(Route::parse("", &content), Route::Home);
        assert_eq!(Route::parse("/#contact", &content), Route::Home);
        assert_eq!(
            Route::parse("/capabilities/data-pipelines/", &content),
            Route::Capability("data-pipelines".into())
        );
    }

    #[test]
    fn unknown_paths_are_not_found() {
        let content = SiteContent::embedded().unwrap();
        assert_eq!(
            Route::parse("/capabilities/teleportation", &content),
            Route::NotFound("/capabilities/teleportation".into())
        );
        assert!(matches!(Route::parse("/about", &content), Route::NotFound(_)));
    }

    #[test]
    fn path_round_trips_for_detail_pages() {
        let content = SiteContent::embedded().unwrap();
        let route = Route::Capability("ai-assistants".into());
        assert_eq!(Route::parse(&route.path(), &content), route);
    }
}
