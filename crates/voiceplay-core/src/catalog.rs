//! Source catalog
//!
//! An ordered list of embed providers. Each provider owns a builder that
//! turns a [`MediaReference`] into an embed URL, or reports that the
//! reference lacks the ids it needs. Order is significant: it is the tab
//! order shown to the user and index 0 is the default selection.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::{ProviderConfig, VariantConfig};
use crate::embed::FramePolicy;
use crate::error::{PlayerError, Result};
use crate::types::{IdField, MediaReference};

/// Placeholder for the media kind route segment (`movie` / `tv`).
const MEDIA_TYPE_PLACEHOLDER: &str = "media_type";

/// Builds an embed URL for a media reference.
///
/// Implementations must be pure: the same reference always yields the same
/// answer, and a missing id yields `None` rather than a malformed URL.
pub trait EmbedBuilder: Send + Sync {
    fn build(&self, reference: &MediaReference) -> Option<String>;
}

/// Builder backed by a closure, mostly useful for fake providers in tests.
pub struct FnBuilder<F>(F);

impl<F> FnBuilder<F>
where
    F: Fn(&MediaReference) -> Option<String> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> EmbedBuilder for FnBuilder<F>
where
    F: Fn(&MediaReference) -> Option<String> + Send + Sync,
{
    fn build(&self, reference: &MediaReference) -> Option<String> {
        (self.0)(reference)
    }
}

/// One URL template together with the fields it needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlVariant {
    template: String,
    requires: Vec<IdField>,
}

impl UrlVariant {
    /// Create a variant, validating its placeholders.
    ///
    /// Every id placeholder (`{tmdb_id}`, `{imdb_id}`, `{kinopoisk_id}`) used
    /// by the template must be listed in `requires`; `{title}`, `{year}` and
    /// `{media_type}` may be used freely.
    ///
    /// # Errors
    /// `PlayerError::InvalidConfig` for unknown or unterminated placeholders
    /// and for id placeholders that are not required.
    pub fn new(template: impl Into<String>, requires: &[IdField]) -> Result<Self> {
        let template = template.into();
        for name in placeholders(&template)? {
            if name == MEDIA_TYPE_PLACEHOLDER {
                continue;
            }
            let field = field_for_placeholder(name).ok_or_else(|| {
                PlayerError::InvalidConfig(format!(
                    "unknown placeholder {{{name}}} in template {template}"
                ))
            })?;
            let is_id = matches!(field, IdField::Tmdb | IdField::Imdb | IdField::Kinopoisk);
            if is_id && !requires.contains(&field) {
                return Err(PlayerError::InvalidConfig(format!(
                    "template {template} uses {{{name}}} without requiring it"
                )));
            }
        }

        Ok(Self {
            template,
            requires: requires.to_vec(),
        })
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn requires(&self) -> &[IdField] {
        &self.requires
    }

    fn is_satisfied(&self, reference: &MediaReference) -> bool {
        self.requires.iter().all(|field| reference.has(*field))
    }

    /// Render the template, or `None` if a required field is missing or the
    /// result is not an absolute URL.
    fn render(&self, reference: &MediaReference) -> Option<String> {
        if !self.is_satisfied(reference) {
            return None;
        }

        let mut out = String::with_capacity(self.template.len() + 16);
        let mut rest = self.template.as_str();
        while let Some(start) = rest.find('{') {
            out.push_str(&rest[..start]);
            let end = rest[start..].find('}')? + start;
            let name = &rest[start + 1..end];
            let value = if name == MEDIA_TYPE_PLACEHOLDER {
                reference.media_kind().route_segment().to_string()
            } else {
                let field = field_for_placeholder(name)?;
                reference.field(field).unwrap_or_default()
            };
            out.push_str(&urlencoding::encode(value.trim()));
            rest = &rest[end + 1..];
        }
        out.push_str(rest);

        url::Url::parse(&out).ok().map(|_| out)
    }
}

/// Names of the `{placeholders}` in a template, in order of appearance.
fn placeholders(template: &str) -> Result<Vec<&str>> {
    let mut names = Vec::new();
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        let end = rest[start..]
            .find('}')
            .map(|offset| offset + start)
            .ok_or_else(|| {
                PlayerError::InvalidConfig(format!("unterminated placeholder in {template}"))
            })?;
        names.push(&rest[start + 1..end]);
        rest = &rest[end + 1..];
    }
    Ok(names)
}

fn field_for_placeholder(name: &str) -> Option<IdField> {
    [
        IdField::Tmdb,
        IdField::Imdb,
        IdField::Kinopoisk,
        IdField::Title,
        IdField::Year,
    ]
    .into_iter()
    .find(|field| field.placeholder() == name)
}

/// Builder that tries URL templates in order and renders the first one whose
/// required fields are present.
#[derive(Debug, Clone)]
pub struct TemplateBuilder {
    variants: Vec<UrlVariant>,
}

impl TemplateBuilder {
    pub fn new(variants: Vec<UrlVariant>) -> Self {
        Self { variants }
    }

    pub fn variants(&self) -> &[UrlVariant] {
        &self.variants
    }
}

impl EmbedBuilder for TemplateBuilder {
    fn build(&self, reference: &MediaReference) -> Option<String> {
        self.variants
            .iter()
            .find(|variant| variant.is_satisfied(reference))
            .and_then(|variant| variant.render(reference))
    }
}

/// An embed provider shown as one source tab
#[derive(Clone)]
pub struct ProviderDescriptor {
    /// Unique display name
    pub name: String,
    /// Icon or short label
    pub icon: String,
    /// Human-readable description
    pub description: String,
    /// Quality label (e.g., "HD/Full HD")
    pub quality: String,
    /// Voice-over note, if the provider advertises one
    pub voiceovers: Option<String>,
    builder: Arc<dyn EmbedBuilder>,
}

impl ProviderDescriptor {
    pub fn new(name: impl Into<String>, builder: impl EmbedBuilder + 'static) -> Self {
        Self {
            name: name.into(),
            icon: String::new(),
            description: String::new(),
            quality: String::new(),
            voiceovers: None,
            builder: Arc::new(builder),
        }
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = icon.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_quality(mut self, quality: impl Into<String>) -> Self {
        self.quality = quality.into();
        self
    }

    pub fn with_voiceovers(mut self, voiceovers: impl Into<String>) -> Self {
        self.voiceovers = Some(voiceovers.into());
        self
    }

    /// Run the provider's builder.
    ///
    /// Prefer [`crate::filter::available_sources`], which also contains
    /// builder panics.
    pub fn build_url(&self, reference: &MediaReference) -> Option<String> {
        self.builder.build(reference)
    }

    /// Build a descriptor from its configuration entry.
    ///
    /// # Errors
    /// `PlayerError::InvalidConfig` if the entry has no variants or a
    /// variant template is invalid.
    pub fn from_config(config: &ProviderConfig) -> Result<Self> {
        if config.variants.is_empty() {
            return Err(PlayerError::InvalidConfig(format!(
                "provider {} has no URL variants",
                config.name
            )));
        }
        let variants = config
            .variants
            .iter()
            .map(|VariantConfig { template, requires }| UrlVariant::new(template.clone(), requires))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            name: config.name.clone(),
            icon: config.icon.clone(),
            description: config.description.clone(),
            quality: config.quality.clone(),
            voiceovers: config.voiceovers.clone(),
            builder: Arc::new(TemplateBuilder::new(variants)),
        })
    }
}

impl fmt::Debug for ProviderDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderDescriptor")
            .field("name", &self.name)
            .field("icon", &self.icon)
            .field("quality", &self.quality)
            .finish_non_exhaustive()
    }
}

/// Which built-in catalog to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogKind {
    /// TMDB-keyed multi-source player; no catalog id resolution
    Multi,
    /// Voice-over player keyed by the Kinopoisk catalog id
    Voice,
}

impl CatalogKind {
    /// Whether players over this catalog resolve the catalog id on mount.
    pub fn resolves_catalog_id(self) -> bool {
        matches!(self, Self::Voice)
    }

    /// Iframe attributes for players over this catalog.
    pub fn frame_policy(self) -> FramePolicy {
        match self {
            Self::Multi => FramePolicy::multi_source(),
            Self::Voice => FramePolicy::voice_over(),
        }
    }
}

impl FromStr for CatalogKind {
    type Err = PlayerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "multi" => Ok(Self::Multi),
            "voice" => Ok(Self::Voice),
            other => Err(PlayerError::InvalidConfig(format!("unknown catalog: {other}"))),
        }
    }
}

/// Ordered, name-unique list of providers
#[derive(Debug, Clone, Default)]
pub struct SourceCatalog {
    providers: Vec<ProviderDescriptor>,
    frame: FramePolicy,
}

impl SourceCatalog {
    /// Create a catalog, keeping the given order.
    ///
    /// # Errors
    /// `PlayerError::InvalidConfig` if two providers share a name or a name
    /// is blank.
    pub fn new(providers: Vec<ProviderDescriptor>) -> Result<Self> {
        let mut seen = HashSet::new();
        for provider in &providers {
            if provider.name.trim().is_empty() {
                return Err(PlayerError::InvalidConfig(
                    "provider name cannot be empty".to_string(),
                ));
            }
            if !seen.insert(provider.name.as_str()) {
                return Err(PlayerError::InvalidConfig(format!(
                    "duplicate provider name: {}",
                    provider.name
                )));
            }
        }
        Ok(Self {
            providers,
            frame: FramePolicy::default(),
        })
    }

    /// Replace the iframe attributes used for this catalog's sources.
    pub fn with_frame_policy(mut self, frame: FramePolicy) -> Self {
        self.frame = frame;
        self
    }

    pub fn frame_policy(&self) -> &FramePolicy {
        &self.frame
    }

    /// Build a catalog from configuration entries.
    pub fn from_config(configs: &[ProviderConfig]) -> Result<Self> {
        let providers = configs
            .iter()
            .map(ProviderDescriptor::from_config)
            .collect::<Result<Vec<_>>>()?;
        Self::new(providers)
    }

    /// Built-in catalog of the given kind.
    pub fn builtin(kind: CatalogKind) -> Result<Self> {
        match kind {
            CatalogKind::Multi => Self::multi_source(),
            CatalogKind::Voice => Self::voice_over(),
        }
    }

    /// TMDB-keyed providers, tried in this order.
    pub fn multi_source() -> Result<Self> {
        Ok(Self::from_config(&multi_source_providers())?
            .with_frame_policy(CatalogKind::Multi.frame_policy()))
    }

    /// Kinopoisk-keyed voice-over providers.
    pub fn voice_over() -> Result<Self> {
        Ok(Self::from_config(&voice_over_providers())?
            .with_frame_policy(CatalogKind::Voice.frame_policy()))
    }

    pub fn providers(&self) -> &[ProviderDescriptor] {
        &self.providers
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProviderDescriptor> {
        self.providers.iter()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&ProviderDescriptor> {
        self.providers.iter().find(|p| p.name == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name.as_str()).collect()
    }
}

fn provider(
    name: &str,
    icon: &str,
    description: &str,
    quality: &str,
    variants: Vec<(&str, Vec<IdField>)>,
) -> ProviderConfig {
    ProviderConfig {
        name: name.to_string(),
        icon: icon.to_string(),
        description: description.to_string(),
        quality: quality.to_string(),
        voiceovers: None,
        variants: variants
            .into_iter()
            .map(|(template, requires)| VariantConfig {
                template: template.to_string(),
                requires,
            })
            .collect(),
    }
}

/// Default configuration of the multi-source catalog.
pub fn multi_source_providers() -> Vec<ProviderConfig> {
    use IdField::{Imdb, Title, Tmdb};

    vec![
        provider(
            "VidSrc Pro",
            "🎬",
            "Russian voice-over, keyed by TMDB id",
            "HD/Full HD",
            vec![("https://vidsrc.pro/embed/{media_type}/{tmdb_id}", vec![Tmdb])],
        ),
        provider(
            "VidSrc.in",
            "🇷🇺",
            "Multiple voice-overs, subtitles",
            "HD",
            vec![("https://vidsrc.in/embed/{media_type}/{tmdb_id}", vec![Tmdb])],
        ),
        provider(
            "VidSrc.cc",
            "⚡",
            "Fast start, Russian subtitles",
            "HD/Full HD",
            vec![("https://vidsrc.cc/v2/embed/{media_type}/{tmdb_id}", vec![Tmdb])],
        ),
        provider(
            "Embed.su",
            "📺",
            "Stable source with voice-over",
            "HD",
            vec![("https://embed.su/embed/{media_type}/{tmdb_id}", vec![Tmdb])],
        ),
        provider(
            "VidSrc.net",
            "🎥",
            "Alternative voice-over",
            "HD",
            vec![
                ("https://vidsrc.net/embed/{media_type}/{tmdb_id}", vec![Tmdb]),
                ("https://vidsrc.net/embed/{media_type}/{imdb_id}", vec![Imdb]),
            ],
        ),
        provider(
            "Kodik (TMDB)",
            "🔍",
            "Title search for accuracy",
            "HD/Full HD",
            vec![
                ("https://kodik.info/search?title={title}&year={year}", vec![Tmdb, Title]),
                ("https://kodik.info/find-player?imdb_id={imdb_id}", vec![Imdb]),
            ],
        ),
    ]
}

/// Default configuration of the voice-over catalog.
pub fn voice_over_providers() -> Vec<ProviderConfig> {
    use IdField::{Imdb, Kinopoisk};

    let mut collaps = provider(
        "Collaps",
        "🎬",
        "Many voice-overs",
        "HD/Full HD",
        vec![
            ("https://api.delivembd.ws/embed/kp/{kinopoisk_id}", vec![Kinopoisk]),
            ("https://api.delivembd.ws/embed/imdb/{imdb_id}", vec![Imdb]),
        ],
    );
    collaps.voiceovers = Some("Russian voice-over".to_string());

    let mut kodik = provider(
        "Kodik",
        "🎙️",
        "Voice-over database keyed by Kinopoisk id",
        "HD/Full HD",
        vec![(
            "https://kodik.info/find-player?kinopoiskId={kinopoisk_id}&only_translations=&strict=false&autoplay=true",
            vec![Kinopoisk],
        )],
    );
    kodik.voiceovers = Some("Russian voice-over".to_string());

    vec![collaps, kodik]
}
