//! Release host provider
//!
//! Modules published as release assets rather than through the CDN. Each
//! module maps to a [`ReleaseSource`]: a repository plus the strategies that
//! pick the release for a branch, the assets for an architecture, and the
//! on-disk layout of those assets.

mod strategy;

pub use strategy::{
    ArchInName, AssetFilter, BranchInName, BranchPrefix, InstallUnder, ManifestBuilder,
    ReleaseFilter, ReleaseManifest, SharedLibraryAssets,
};

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use modsync_config::GithubConfig;
use modsync_errors::{ConfigError, Error, ProviderError};
use modsync_events::{AppEvent, EventEmitter, EventSender, ProviderEvent};
use modsync_net::{fetch_json, HeaderMap, HeaderName, HeaderValue, NetClient};
use modsync_types::{Arch, Branch, File, FileKind, Manifest};
use serde::Deserialize;

use crate::ContentProvider;

pub const GO_MODULE: &str = "go-module";
pub const JS_MODULE_V2: &str = "js-module-v2";

/// A release as listed by the releases API
#[derive(Debug, Clone, Deserialize)]
pub struct Release {
    #[serde(default)]
    pub name: Option<String>,
    pub tag_name: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub draft: bool,
    #[serde(default)]
    pub prerelease: bool,
    #[serde(default)]
    pub assets: Vec<ReleaseAsset>,
}

impl Release {
    /// Display name, empty when unset
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseAsset {
    pub name: String,
    pub size: u64,
    pub browser_download_url: String,
}

/// Where a module is released and how its release is picked apart
#[derive(Debug, Clone)]
pub struct ReleaseSource {
    pub owner: String,
    pub repo: String,
    pub release_filter: Arc<dyn ReleaseFilter>,
    pub asset_filter: Arc<dyn AssetFilter>,
    pub manifest_builder: Arc<dyn ManifestBuilder>,
}

impl ReleaseSource {
    pub fn new(
        owner: impl Into<String>,
        repo: impl Into<String>,
        release_filter: impl ReleaseFilter + 'static,
        asset_filter: impl AssetFilter + 'static,
        manifest_builder: impl ManifestBuilder + 'static,
    ) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            release_filter: Arc::new(release_filter),
            asset_filter: Arc::new(asset_filter),
            manifest_builder: Arc::new(manifest_builder),
        }
    }

    /// Go module: shared libraries from the newest release naming the branch
    #[must_use]
    pub fn go_module() -> Self {
        Self::new(
            "timo972",
            "altv-go",
            BranchInName,
            SharedLibraryAssets,
            InstallUnder::new("modules/go-module"),
        )
    }

    /// JS module v2: releases named `<branch>/<version>`, assets per arch
    #[must_use]
    pub fn js_module_v2() -> Self {
        Self::new(
            "altmp",
            "altv-js-module-v2",
            BranchPrefix,
            ArchInName,
            InstallUnder::new("modules/js-module-v2"),
        )
    }
}

/// Provider backed by a GitHub-compatible releases API
#[derive(Clone)]
pub struct ReleaseProvider {
    client: NetClient,
    api_url: String,
    token: Option<String>,
    sources: BTreeMap<String, ReleaseSource>,
    tx: Option<EventSender>,
}

impl fmt::Debug for ReleaseProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReleaseProvider")
            .field("api_url", &self.api_url)
            .field("authenticated", &self.token.is_some())
            .field("modules", &self.sources.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl ReleaseProvider {
    #[must_use]
    pub fn new(client: NetClient, config: &GithubConfig) -> Self {
        Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            sources: BTreeMap::new(),
            tx: None,
        }
    }

    /// Serve `module` from `source`, replacing any earlier source for it
    #[must_use]
    pub fn with_source(mut self, module: impl Into<String>, source: ReleaseSource) -> Self {
        self.sources.insert(module.into(), source);
        self
    }

    /// Register the built-in release-hosted modules
    #[must_use]
    pub fn with_presets(self) -> Self {
        self.with_source(GO_MODULE, ReleaseSource::go_module())
            .with_source(JS_MODULE_V2, ReleaseSource::js_module_v2())
    }

    #[must_use]
    pub fn with_events(mut self, tx: Option<EventSender>) -> Self {
        self.tx = tx;
        self
    }

    fn headers(&self) -> Result<HeaderMap, Error> {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static("accept"),
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            HeaderName::from_static("x-github-api-version"),
            HeaderValue::from_static("2022-11-28"),
        );
        if let Some(token) = &self.token {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|_| {
                ConfigError::InvalidValue {
                    field: "github.token".to_string(),
                    value: "<redacted>".to_string(),
                }
            })?;
            value.set_sensitive(true);
            headers.insert(HeaderName::from_static("authorization"), value);
        }
        Ok(headers)
    }

    fn source(&self, module: &str) -> Result<&ReleaseSource, Error> {
        self.sources.get(module).ok_or_else(|| {
            ProviderError::UnsupportedModule {
                module: module.to_string(),
            }
            .into()
        })
    }

    async fn releases(&self, source: &ReleaseSource) -> Result<Vec<Release>, Error> {
        let url = format!(
            "{}/repos/{}/{}/releases?per_page=100",
            self.api_url, source.owner, source.repo
        );
        fetch_json(&self.client, &url, &self.headers()?, self).await
    }

    /// Pick the release and assets for `module` and lay them out
    async fn resolve(
        &self,
        branch: Branch,
        arch: Arch,
        module: &str,
    ) -> Result<ReleaseManifest, Error> {
        let source = self.source(module)?;
        let releases = self.releases(source).await?;
        self.emit_debug(format!(
            "{module}: {} releases in {}/{}",
            releases.len(),
            source.owner,
            source.repo
        ));

        let release = source
            .release_filter
            .select(&releases, branch)
            .ok_or_else(|| ProviderError::NoMatchingRelease {
                module: module.to_string(),
                branch: branch.to_string(),
            })?;

        let assets: Vec<&ReleaseAsset> = release
            .assets
            .iter()
            .filter(|asset| source.asset_filter.matches(asset, arch))
            .collect();
        if assets.is_empty() {
            return Err(ProviderError::NoAssets {
                module: module.to_string(),
                release: release.tag_name.clone(),
            }
            .into());
        }

        self.emit(AppEvent::Provider(ProviderEvent::ReleaseSelected {
            module: module.to_string(),
            release: release.tag_name.clone(),
            assets: assets.len(),
        }));

        Ok(source.manifest_builder.build(release, &assets))
    }
}

impl EventEmitter for ReleaseProvider {
    fn event_sender(&self) -> Option<&EventSender> {
        self.tx.as_ref()
    }
}

#[async_trait::async_trait]
impl ContentProvider for ReleaseProvider {
    fn name(&self) -> &str {
        "github"
    }

    fn has(&self, module: &str) -> bool {
        self.sources.contains_key(module)
    }

    async fn manifest(&self, branch: Branch, arch: Arch, module: &str) -> Result<Manifest, Error> {
        Ok(self.resolve(branch, arch, module).await?.manifest)
    }

    /// Release hosts publish no manifest document, so `include_manifest`
    /// adds nothing here.
    async fn files(
        &self,
        branch: Branch,
        arch: Arch,
        module: &str,
        _include_manifest: bool,
    ) -> Result<Vec<File>, Error> {
        let ReleaseManifest { manifest, urls } = self.resolve(branch, arch, module).await?;

        manifest
            .paths()
            .map(|path| {
                let url = urls.get(path).cloned().ok_or_else(|| {
                    Error::internal(format!("{module}: no download URL for {path}"))
                })?;
                Ok(File {
                    kind: FileKind::Data,
                    module: module.to_string(),
                    path: path.to_string(),
                    url,
                    hash: manifest.expected_hash(path)?,
                    size: manifest.expected_size(path),
                })
            })
            .collect()
    }
}
