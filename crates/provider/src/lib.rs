#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Content providers for modsync
//!
//! A [`ContentProvider`] answers, for a given branch and architecture, which
//! files a module consists of and where to fetch them. Providers are
//! collected in a [`ProviderRegistry`] that resolves each module to the first
//! provider claiming it.
//!
//! Two providers ship with the crate:
//! - [`CdnProvider`]: a static file host with per-module path templates and a
//!   published `update.json` per module
//! - [`ReleaseProvider`]: a release host whose releases and assets are picked
//!   by per-module strategies, with the manifest synthesized from asset
//!   metadata

mod cdn;
mod registry;
pub mod release;

pub use cdn::CdnProvider;
pub use registry::ProviderRegistry;
pub use release::{ReleaseProvider, ReleaseSource};

use modsync_errors::Error;
use modsync_types::{Arch, Branch, File, Manifest};

/// A source of module manifests and downloadable files
#[async_trait::async_trait]
pub trait ContentProvider: Send + Sync + std::fmt::Debug {
    /// Short identifier used in events and logs
    fn name(&self) -> &str;

    /// Whether this provider serves `module`
    fn has(&self, module: &str) -> bool;

    /// Fetch or synthesize the manifest of `module`
    ///
    /// # Errors
    ///
    /// Returns an error if the module is not served, or the manifest cannot
    /// be obtained or parsed.
    async fn manifest(&self, branch: Branch, arch: Arch, module: &str) -> Result<Manifest, Error>;

    /// Expand the manifest of `module` into downloadable files
    ///
    /// With `include_manifest`, providers that publish a manifest document
    /// add it as a [`modsync_types::FileKind::Manifest`] entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the manifest cannot be obtained or names a file
    /// that cannot be addressed.
    async fn files(
        &self,
        branch: Branch,
        arch: Arch,
        module: &str,
        include_manifest: bool,
    ) -> Result<Vec<File>, Error>;
}
