//! Ordered provider lookup

use std::sync::Arc;

use modsync_config::Config;
use modsync_events::EventSender;
use modsync_net::NetClient;

use crate::{CdnProvider, ContentProvider, ReleaseProvider};

/// Providers in resolution order
///
/// Earlier providers win. The registry only grows; it is built once per
/// run and shared read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct ProviderRegistry {
    providers: Vec<Arc<dyn ContentProvider>>,
}

impl ProviderRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry for a run: the static CDN first, then the release host when
    /// it is enabled
    #[must_use]
    pub fn from_config(config: &Config, client: &NetClient, tx: Option<EventSender>) -> Self {
        let mut registry = Self::new();
        registry.add_provider(CdnProvider::new(client.clone(), &config.cdn).with_events(tx.clone()));

        if config.github.enabled {
            registry.add_provider(
                ReleaseProvider::new(client.clone(), &config.github)
                    .with_presets()
                    .with_events(tx),
            );
        }

        registry
    }

    /// Append a provider at the lowest priority
    pub fn add_provider(&mut self, provider: impl ContentProvider + 'static) {
        self.providers.push(Arc::new(provider));
    }

    /// First provider that serves `module`
    #[must_use]
    pub fn resolve(&self, module: &str) -> Option<Arc<dyn ContentProvider>> {
        self.providers
            .iter()
            .find(|provider| provider.has(module))
            .cloned()
    }

    /// Provider names in resolution order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.providers.iter().map(|provider| provider.name())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}
