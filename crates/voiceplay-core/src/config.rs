//! Configuration for voiceplay
//!
//! Provider URL templates and lookup credentials are configuration, loaded
//! from TOML and overridable from the environment. Nothing here is required:
//! an empty file yields the built-in catalogs and default timeouts.
//!
//! ```toml
//! [lookup]
//! base_url = "https://kinopoiskapiunofficial.tech"
//! timeout_secs = 5
//!
//! [resolver]
//! step_timeout_secs = 5
//!
//! [[providers]]
//! name = "Collaps"
//! quality = "HD"
//!
//! [[providers.variants]]
//! template = "https://api.delivembd.ws/embed/kp/{kinopoisk_id}"
//! requires = ["kinopoisk"]
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::catalog::{CatalogKind, SourceCatalog};
use crate::client::ClientConfig;
use crate::error::{PlayerError, Result};
use crate::types::IdField;

/// Environment variable holding the lookup service API key
pub const API_KEY_ENV: &str = "VOICEPLAY_API_KEY";

/// Default time bound for each resolution step, in seconds
pub const DEFAULT_STEP_TIMEOUT_SECS: u64 = 5;

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceplayConfig {
    /// Lookup service connection settings
    pub lookup: ClientConfig,
    /// Identifier resolver settings
    pub resolver: ResolverConfig,
    /// Custom provider catalog; empty means "use the built-in catalog"
    pub providers: Vec<ProviderConfig>,
}

/// Identifier resolver settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Time bound for each lookup step, in seconds (default: 5)
    pub step_timeout_secs: u64,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            step_timeout_secs: DEFAULT_STEP_TIMEOUT_SECS,
        }
    }
}

impl ResolverConfig {
    pub fn step_timeout(&self) -> Duration {
        Duration::from_secs(self.step_timeout_secs)
    }
}

/// One provider entry in the catalog configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub name: String,
    pub icon: String,
    pub description: String,
    pub quality: String,
    pub voiceovers: Option<String>,
    /// URL templates tried in order
    pub variants: Vec<VariantConfig>,
}

/// A URL template and the reference fields it needs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariantConfig {
    pub template: String,
    #[serde(default)]
    pub requires: Vec<IdField>,
}

impl VoiceplayConfig {
    /// Load configuration from a TOML file and apply environment overrides.
    ///
    /// # Errors
    /// - `PlayerError::Io` if the file cannot be read
    /// - `PlayerError::InvalidConfig` if it is not valid configuration
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Ok(Self::from_toml_str(&text)?.with_env_overrides())
    }

    /// Parse configuration from a TOML string. No environment overrides.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| PlayerError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `VOICEPLAY_API_KEY` when set.
    pub fn with_env_overrides(self) -> Self {
        self.with_api_key_override(std::env::var(API_KEY_ENV).ok())
    }

    fn with_api_key_override(mut self, key: Option<String>) -> Self {
        if let Some(key) = key.filter(|k| !k.trim().is_empty()) {
            self.lookup.api_key = Some(key);
        }
        self
    }

    fn validate(&self) -> Result<()> {
        if self.resolver.step_timeout_secs == 0 {
            return Err(PlayerError::InvalidConfig(
                "resolver.step_timeout_secs must be positive".to_string(),
            ));
        }
        if self.lookup.timeout_secs == 0 {
            return Err(PlayerError::InvalidConfig(
                "lookup.timeout_secs must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Catalog to present: the configured providers, or the built-in
    /// catalog of `fallback` kind when none are configured.
    pub fn catalog(&self, fallback: CatalogKind) -> Result<SourceCatalog> {
        if self.providers.is_empty() {
            SourceCatalog::builtin(fallback)
        } else {
            Ok(SourceCatalog::from_config(&self.providers)?
                .with_frame_policy(fallback.frame_policy()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = VoiceplayConfig::default();
        assert_eq!(config.resolver.step_timeout_secs, 5);
        assert_eq!(config.resolver.step_timeout(), Duration::from_secs(5));
        assert!(config.providers.is_empty());
        assert!(config.lookup.api_key.is_none());
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config = VoiceplayConfig::from_toml_str("").unwrap();
        assert_eq!(config.resolver.step_timeout_secs, 5);
        assert_eq!(config.lookup.timeout_secs, 5);
    }

    #[test]
    fn test_parse_providers() {
        let text = r#"
            [lookup]
            base_url = "http://127.0.0.1:9000"
            api_key = "test-key"

            [resolver]
            step_timeout_secs = 2

            [[providers]]
            name = "Fake"
            icon = "F"
            quality = "SD"

            [[providers.variants]]
            template = "https://fake.test/kp/{kinopoisk_id}"
            requires = ["kinopoisk"]

            [[providers.variants]]
            template = "https://fake.test/{media_type}/{tmdb_id}"
            requires = ["tmdb"]
        "#;
        let config = VoiceplayConfig::from_toml_str(text).unwrap();

        assert_eq!(config.lookup.base_url, "http://127.0.0.1:9000");
        assert_eq!(config.lookup.api_key.as_deref(), Some("test-key"));
        assert_eq!(config.resolver.step_timeout_secs, 2);
        assert_eq!(config.providers.len(), 1);
        assert_eq!(config.providers[0].variants[0].requires, vec![IdField::Kinopoisk]);

        let catalog = config.catalog(CatalogKind::Voice).unwrap();
        assert_eq!(catalog.names(), vec!["Fake"]);
        assert_eq!(catalog.frame_policy(), &CatalogKind::Voice.frame_policy());
    }

    #[test]
    fn test_catalog_falls_back_to_builtin() {
        let config = VoiceplayConfig::default();
        let catalog = config.catalog(CatalogKind::Multi).unwrap();
        assert_eq!(catalog.len(), 6);
        assert_eq!(catalog.frame_policy().sandbox, None);
    }

    #[test]
    fn test_unknown_requirement_rejected() {
        let text = r#"
            [[providers]]
            name = "Fake"
            [[providers.variants]]
            template = "https://fake.test/{tmdb_id}"
            requires = ["shikimori"]
        "#;
        assert!(matches!(
            VoiceplayConfig::from_toml_str(text),
            Err(PlayerError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let text = "[resolver]\nstep_timeout_secs = 0\n";
        assert!(VoiceplayConfig::from_toml_str(text).is_err());
    }

    #[test]
    fn test_api_key_override() {
        let config = VoiceplayConfig::default().with_api_key_override(Some("from-env".to_string()));
        assert_eq!(config.lookup.api_key.as_deref(), Some("from-env"));

        let config = config.with_api_key_override(Some("  ".to_string()));
        assert_eq!(config.lookup.api_key.as_deref(), Some("from-env"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[resolver]\nstep_timeout_secs = 3").unwrap();

        let config = VoiceplayConfig::load(file.path()).unwrap();
        assert_eq!(config.resolver.step_timeout_secs, 3);
    }

    #[test]
    fn test_load_missing_file() {
        let result = VoiceplayConfig::load("/nonexistent/voiceplay.toml");
        assert!(matches!(result, Err(PlayerError::Io(_))));
    }
}
