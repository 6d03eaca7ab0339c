//! Availability filter
//!
//! Narrows a [`SourceCatalog`] to the providers that can build an embed URL
//! for a given reference, keeping catalog order.

use std::panic::{self, AssertUnwindSafe};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::catalog::{ProviderDescriptor, SourceCatalog};
use crate::types::MediaReference;

/// A provider that produced a URL for the current reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailableSource {
    /// Position of the provider in the full catalog
    pub catalog_index: usize,
    pub name: String,
    pub icon: String,
    pub description: String,
    pub quality: String,
    pub voiceovers: Option<String>,
    /// Embed URL built for the reference
    pub url: String,
}

impl AvailableSource {
    fn new(catalog_index: usize, provider: &ProviderDescriptor, url: String) -> Self {
        Self {
            catalog_index,
            name: provider.name.clone(),
            icon: provider.icon.clone(),
            description: provider.description.clone(),
            quality: provider.quality.clone(),
            voiceovers: provider.voiceovers.clone(),
            url,
        }
    }
}

/// Run a provider's builder, reading a panic as "unavailable".
fn build_contained(provider: &ProviderDescriptor, reference: &MediaReference) -> Option<String> {
    match panic::catch_unwind(AssertUnwindSafe(|| provider.build_url(reference))) {
        Ok(url) => url,
        Err(_) => {
            warn!(provider = %provider.name, "embed builder panicked, treating as unavailable");
            None
        }
    }
}

/// Providers of `catalog` that can build a URL for `reference`, in catalog order.
///
/// # Examples
/// ```
/// use voiceplay_core::{available_sources, MediaKind, MediaReference, SourceCatalog};
///
/// let catalog = SourceCatalog::voice_over().unwrap();
/// let reference = MediaReference::new("The Matrix", MediaKind::Movie).with_imdb_id("tt0133093");
///
/// let sources = available_sources(&catalog, &reference);
/// assert_eq!(sources.len(), 1);
/// assert_eq!(sources[0].name, "Collaps");
/// ```
pub fn available_sources(catalog: &SourceCatalog, reference: &MediaReference) -> Vec<AvailableSource> {
    catalog
        .iter()
        .enumerate()
        .filter_map(|(index, provider)| {
            build_contained(provider, reference).map(|url| AvailableSource::new(index, provider, url))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::FnBuilder;
    use crate::types::MediaKind;
    use proptest::prelude::*;

    fn fake_catalog(available: &[bool]) -> SourceCatalog {
        let providers = available
            .iter()
            .enumerate()
            .map(|(i, &ok)| {
                ProviderDescriptor::new(
                    format!("p{i}"),
                    FnBuilder::new(move |_| ok.then(|| format!("https://p{i}.test/embed"))),
                )
            })
            .collect();
        SourceCatalog::new(providers).unwrap()
    }

    #[test]
    fn test_no_ids_means_no_sources() {
        let bare = MediaReference::default();
        let multi = SourceCatalog::multi_source().unwrap();
        let voice = SourceCatalog::voice_over().unwrap();

        assert!(available_sources(&multi, &bare).is_empty());
        assert!(available_sources(&voice, &bare).is_empty());
    }

    #[test]
    fn test_title_alone_is_not_enough() {
        let reference = MediaReference::new("The Matrix", MediaKind::Movie).with_year(1999);
        let multi = SourceCatalog::multi_source().unwrap();
        assert!(available_sources(&multi, &reference).is_empty());
    }

    #[test]
    fn test_imdb_only_reference() {
        let reference = MediaReference::new("The Matrix", MediaKind::Movie).with_imdb_id("tt0133093");
        let multi = SourceCatalog::multi_source().unwrap();
        let sources = available_sources(&multi, &reference);

        let names: Vec<_> = sources.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["VidSrc.net", "Kodik (TMDB)"]);
        assert_eq!(sources[0].catalog_index, 4);
        assert_eq!(sources[1].url, "https://kodik.info/find-player?imdb_id=tt0133093");
    }

    #[test]
    fn test_panicking_builder_is_unavailable() {
        let providers = vec![
            ProviderDescriptor::new("boom", FnBuilder::new(|_| panic!("broken template"))),
            ProviderDescriptor::new(
                "ok",
                FnBuilder::new(|_| Some("https://ok.test/embed".to_string())),
            ),
        ];
        let catalog = SourceCatalog::new(providers).unwrap();

        let sources = available_sources(&catalog, &MediaReference::default());
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].name, "ok");
        assert_eq!(sources[0].catalog_index, 1);
    }

    #[test]
    fn test_filter_is_deterministic() {
        let reference = MediaReference::new("Dark", MediaKind::Series).with_tmdb_id("70523");
        let multi = SourceCatalog::multi_source().unwrap();

        assert_eq!(
            available_sources(&multi, &reference),
            available_sources(&multi, &reference)
        );
    }

    proptest! {
        #[test]
        fn prop_filter_preserves_catalog_order(available in proptest::collection::vec(any::<bool>(), 0..12)) {
            let catalog = fake_catalog(&available);
            let sources = available_sources(&catalog, &MediaReference::default());

            let expected: Vec<usize> = available
                .iter()
                .enumerate()
                .filter(|(_, &ok)| ok)
                .map(|(i, _)| i)
                .collect();
            let indices: Vec<usize> = sources.iter().map(|s| s.catalog_index).collect();
            prop_assert_eq!(indices, expected);

            for source in &sources {
                prop_assert_eq!(&source.name, &format!("p{}", source.catalog_index));
            }
        }
    }
}
