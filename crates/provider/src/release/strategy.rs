//! Per-module release and asset selection

use std::collections::BTreeMap;
use std::fmt;

use modsync_types::{Arch, Branch, Manifest};

use super::{Release, ReleaseAsset};

/// Decides which releases belong to a branch
pub trait ReleaseFilter: Send + Sync + fmt::Debug {
    fn matches(&self, release: &Release, branch: Branch) -> bool;

    /// Newest non-draft release that matches `branch`
    fn select<'a>(&self, releases: &'a [Release], branch: Branch) -> Option<&'a Release> {
        releases
            .iter()
            .filter(|release| !release.draft && self.matches(release, branch))
            .max_by_key(|release| release.created_at)
    }
}

/// Decides which assets of a release are installed for an architecture
pub trait AssetFilter: Send + Sync + fmt::Debug {
    fn matches(&self, asset: &ReleaseAsset, arch: Arch) -> bool;
}

/// Turns the selected assets into a manifest and download locations
pub trait ManifestBuilder: Send + Sync + fmt::Debug {
    fn build(&self, release: &Release, assets: &[&ReleaseAsset]) -> ReleaseManifest;
}

/// Synthesized manifest plus the URL of every listed path
#[derive(Debug, Clone, Default)]
pub struct ReleaseManifest {
    pub manifest: Manifest,
    pub urls: BTreeMap<String, String>,
}

/// Release name contains the branch name
#[derive(Debug, Clone, Copy, Default)]
pub struct BranchInName;

impl ReleaseFilter for BranchInName {
    fn matches(&self, release: &Release, branch: Branch) -> bool {
        release.name().contains(branch.as_str())
    }
}

/// Release name is `<branch>/<version>`
#[derive(Debug, Clone, Copy, Default)]
pub struct BranchPrefix;

impl ReleaseFilter for BranchPrefix {
    fn matches(&self, release: &Release, branch: Branch) -> bool {
        release.name().split('/').next() == Some(branch.as_str())
    }
}

/// Shared libraries for the target platform (`.so` / `.dll`)
#[derive(Debug, Clone, Copy, Default)]
pub struct SharedLibraryAssets;

impl AssetFilter for SharedLibraryAssets {
    fn matches(&self, asset: &ReleaseAsset, arch: Arch) -> bool {
        asset
            .name
            .rsplit_once('.')
            .is_some_and(|(_, ext)| ext == arch.shared_lib_ext())
    }
}

/// Asset name mentions the architecture, e.g. `js-module-v2-x64_linux.zip`
#[derive(Debug, Clone, Copy, Default)]
pub struct ArchInName;

impl AssetFilter for ArchInName {
    fn matches(&self, asset: &ReleaseAsset, arch: Arch) -> bool {
        asset.name.contains(arch.as_str())
    }
}

/// Install every asset as-is under one directory
///
/// Release hosts publish no digests, so only sizes are recorded.
#[derive(Debug, Clone)]
pub struct InstallUnder {
    dir: String,
}

impl InstallUnder {
    pub fn new(dir: impl Into<String>) -> Self {
        Self { dir: dir.into() }
    }
}

impl ManifestBuilder for InstallUnder {
    fn build(&self, release: &Release, assets: &[&ReleaseAsset]) -> ReleaseManifest {
        let mut out = ReleaseManifest {
            manifest: Manifest {
                version: release.tag_name.clone(),
                ..Manifest::default()
            },
            urls: BTreeMap::new(),
        };

        let dir = self.dir.trim_end_matches('/');
        for asset in assets {
            let path = format!("{dir}/{}", asset.name);
            out.manifest.insert(path.clone(), None, Some(asset.size));
            out.urls.insert(path, asset.browser_download_url.clone());
        }

        out
    }
}
