//! Static brochure content: sectors, capabilities, approach, proof, demo,
//! contact.
//!
//! The default dataset ships inside the binary (`content/site.toml`).  Every
//! record is immutable once loaded; the UI only ever borrows it.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

const EMBEDDED: &str = include_str!("../../content/site.toml");

#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("failed to read content file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid content: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("duplicate capability slug `{0}`")]
    DuplicateSlug(String),
    #[error("duplicate sector id `{0}`")]
    DuplicateSector(String),
    #[error("content defines no capabilities")]
    NoCapabilities,
}

// ───────────────────────────────────────── records ───────────

/// One entry in the sector showcase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectorItem {
    pub id: String,
    pub title: String,
    pub headline: String,
    pub description: String,
    pub cta_label: String,
    pub image_ref: String,
    pub caption_text: String,
    pub features: Vec<String>,
}

impl SectorItem {
    /// First segment of the caption (`"Clinics • Hospitals"` → `"Clinics"`).
    pub fn short_caption(&self) -> &str {
        self.caption_text
            .split(" • ")
            .next()
            .unwrap_or(&self.caption_text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitledText {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metric {
    pub value: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capability {
    pub slug: String,
    pub image_ref: String,
    pub title: String,
    pub headline: String,
    pub description: String,
    /// `#rrggbb`.
    pub accent_color: String,
    pub features: Vec<String>,
    pub extended_description: Vec<String>,
    pub detailed_features: Vec<TitledText>,
    pub use_cases: Vec<TitledText>,
    pub tech_stack: Vec<String>,
    pub whos_it_for: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessStep {
    pub number: String,
    pub title: String,
    pub description: String,
    pub details: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseStudy {
    pub tag: String,
    pub tag_color: String,
    pub title: String,
    pub description: String,
    pub results: Vec<Metric>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principle {
    pub title: String,
    pub description: String,
    pub details: Vec<String>,
}

/// "How we build": principles plus the organisations already served.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Approach {
    pub label: String,
    pub title: String,
    pub description: String,
    pub clients: Vec<String>,
    pub cta: String,
    pub principles: Vec<Principle>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofStory {
    pub sector: String,
    pub problem: String,
    pub solution: String,
    pub outcome: String,
}

/// An unattributed partner quote (role and organisation only).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartnerQuote {
    pub quote: String,
    pub role: String,
    pub org: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proof {
    pub label: String,
    pub title: String,
    pub subtitle: String,
    pub stories: Vec<ProofStory>,
    #[serde(default)]
    pub quotes: Vec<PartnerQuote>,
}

/// One mock screen in the platform demo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DemoPanel {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub readouts: Vec<Metric>,
    /// Rule steps, drawn as a chain (`a → b → c`).
    #[serde(default)]
    pub flow: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Demo {
    pub label: String,
    pub title: String,
    pub subtitle: String,
    pub cta: String,
    pub panels: Vec<DemoPanel>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Testimonial {
    pub quote: String,
    pub name: String,
    pub title: String,
    pub org: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hero {
    pub label: String,
    pub title: String,
    pub subtitle: String,
    pub primary_cta: String,
    pub secondary_cta: String,
    pub snapshot: Vec<Metric>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Systems {
    pub label: String,
    pub title: String,
    pub modules: Vec<TitledText>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub office: String,
    pub email: String,
    pub phone: String,
    pub direct_email: String,
}

// ───────────────────────────────────────── dataset ───────────

/// The whole brochure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteContent {
    pub hero: Hero,
    pub systems: Systems,
    #[serde(default)]
    pub sectors: Vec<SectorItem>,
    #[serde(default)]
    pub stats: Vec<Metric>,
    pub capabilities: Vec<Capability>,
    #[serde(default)]
    pub process: Vec<ProcessStep>,
    #[serde(default)]
    pub approach: Option<Approach>,
    #[serde(default)]
    pub case_studies: Vec<CaseStudy>,
    #[serde(default)]
    pub proof: Option<Proof>,
    #[serde(default)]
    pub testimonials: Vec<Testimonial>,
    #[serde(default)]
    pub demo: Option<Demo>,
    pub contact: ContactInfo,
}

impl SiteContent {
    /// The dataset compiled into the binary.
    pub fn embedded() -> Result<Self, ContentError> {
        Self::parse(EMBEDDED)
    }

    pub fn from_path(path: &Path) -> Result<Self, ContentError> {
        let text = std::fs::read_to_string(path).map_err(|source| ContentError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self, ContentError> {
        let content: Self = toml::from_str(text)?;
        content.validate()?;
        Ok(content)
    }

    fn validate(&self) -> Result<(), ContentError> {
        if self.capabilities.is_empty() {
            return Err(ContentError::NoCapabilities);
        }
        let mut slugs = HashSet::new();
        for cap in &self.capabilities {
            if !slugs.insert(cap.slug.as_str()) {
                return Err(ContentError::DuplicateSlug(cap.slug.clone()));
            }
        }
        let mut ids = HashSet::new();
        for sector in &self.sectors {
            if !ids.insert(sector.id.as_str()) {
                return Err(ContentError::DuplicateSector(sector.id.clone()));
            }
        }
        Ok(())
    }

    pub fn capability_index(&self, slug: &str) -> Option<usize> {
        self.capabilities.iter().position(|c| c.slug == slug)
    }

    pub fn capability(&self, slug: &str) -> Option<&Capability> {
        self.capabilities.iter().find(|c| c.slug == slug)
    }

    /// Previous and next capability around `slug`, wrapping at both ends.
    pub fn neighbours(&self, slug: &str) -> Option<(&Capability, &Capability)> {
        let idx = self.capability_index(slug)?;
        let n = self.capabilities.len();
        let prev = &self.capabilities[(idx + n - 1) % n];
        let next = &self.capabilities[(idx + 1) % n];
        Some((prev, next))
    }

    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
