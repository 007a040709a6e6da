//! Static CDN provider

use std::collections::BTreeMap;

use modsync_config::CdnConfig;
use modsync_errors::{Error, NetworkError, ProviderError};
use modsync_events::{EventEmitter, EventSender};
use modsync_net::{fetch_text, parse_url, NetClient};
use modsync_types::{
    manifest_file_name, Arch, Branch, File, FileKind, Manifest, REMOTE_MANIFEST_NAME,
};

use crate::ContentProvider;

/// Provider for a static file host
///
/// Every module lives under `<base_url>/<template>/`, where the template may
/// contain `{branch}` and `{arch}`. The module's manifest is published next
/// to its files as `update.json`.
#[derive(Debug, Clone)]
pub struct CdnProvider {
    client: NetClient,
    base_url: String,
    templates: BTreeMap<String, String>,
    tx: Option<EventSender>,
}

impl CdnProvider {
    #[must_use]
    pub fn new(client: NetClient, config: &CdnConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.clone(),
            templates: config.modules.clone(),
            tx: None,
        }
    }

    #[must_use]
    pub fn with_events(mut self, tx: Option<EventSender>) -> Self {
        self.tx = tx;
        self
    }

    /// Content path of `module` with placeholders filled in
    #[must_use]
    pub fn module_path(&self, branch: Branch, arch: Arch, module: &str) -> Option<String> {
        self.templates.get(module).map(|template| {
            template
                .replace("{branch}", branch.as_str())
                .replace("{arch}", arch.as_str())
        })
    }

    /// URL of `file` within the content path of `module`
    ///
    /// # Errors
    ///
    /// Returns an error if the module is not served or the base URL cannot
    /// carry a path.
    pub fn file_url(
        &self,
        branch: Branch,
        arch: Arch,
        module: &str,
        file: &str,
    ) -> Result<String, Error> {
        let content_path =
            self.module_path(branch, arch, module)
                .ok_or_else(|| ProviderError::UnsupportedModule {
                    module: module.to_string(),
                })?;

        let mut url = parse_url(&self.base_url)?;
        url.path_segments_mut()
            .map_err(|()| NetworkError::InvalidUrl(self.base_url.clone()))?
            .pop_if_empty()
            .extend(content_path.split('/').filter(|s| !s.is_empty()))
            .extend(file.split('/').filter(|s| !s.is_empty()));

        Ok(url.into())
    }
}

impl EventEmitter for CdnProvider {
    fn event_sender(&self) -> Option<&EventSender> {
        self.tx.as_ref()
    }
}

#[async_trait::async_trait]
impl ContentProvider for CdnProvider {
    fn name(&self) -> &str {
        "cdn"
    }

    fn has(&self, module: &str) -> bool {
        self.templates.contains_key(module)
    }

    async fn manifest(&self, branch: Branch, arch: Arch, module: &str) -> Result<Manifest, Error> {
        let url = self.file_url(branch, arch, module, REMOTE_MANIFEST_NAME)?;
        let text = fetch_text(&self.client, &url, self).await?;
        Manifest::from_json(&text, &url)
    }

    async fn files(
        &self,
        branch: Branch,
        arch: Arch,
        module: &str,
        include_manifest: bool,
    ) -> Result<Vec<File>, Error> {
        let manifest = self.manifest(branch, arch, module).await?;

        let mut files = Vec::with_capacity(manifest.len() + 1);
        if include_manifest {
            files.push(File {
                kind: FileKind::Manifest,
                module: module.to_string(),
                path: manifest_file_name(module),
                url: self.file_url(branch, arch, module, REMOTE_MANIFEST_NAME)?,
                hash: None,
                size: None,
            });
        }

        for path in manifest.paths() {
            files.push(File {
                kind: FileKind::Data,
                module: module.to_string(),
                path: path.to_string(),
                url: self.file_url(branch, arch, module, path)?,
                hash: manifest.expected_hash(path)?,
                size: manifest.expected_size(path),
            });
        }

        self.emit_debug(format!("{module}: {} files listed", files.len()));
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(base_url: &str) -> CdnProvider {
        let config = CdnConfig {
            base_url: base_url.to_string(),
            ..CdnConfig::default()
        };
        CdnProvider::new(NetClient::with_defaults().unwrap(), &config)
    }

    #[test]
    fn templates_fill_branch_and_arch() {
        let cdn = provider("https://cdn.alt-mp.com");
        assert_eq!(
            cdn.module_path(Branch::Rc, Arch::X64Win32, "csharp-module")
                .as_deref(),
            Some("coreclr-module/rc/x64_win32")
        );
        assert_eq!(
            cdn.module_path(Branch::Dev, Arch::X64Linux, "data-files")
                .as_deref(),
            Some("data/dev")
        );
        assert!(cdn.module_path(Branch::Dev, Arch::X64Linux, "go-module").is_none());
    }

    #[test]
    fn urls_join_and_escape_segments() {
        let cdn = provider("https://cdn.alt-mp.com/");
        assert_eq!(
            cdn.file_url(Branch::Release, Arch::X64Linux, "server", "update.json")
                .unwrap(),
            "https://cdn.alt-mp.com/server/release/x64_linux/update.json"
        );
        assert_eq!(
            cdn.file_url(Branch::Release, Arch::X64Linux, "data-files", "data/clothes 1.bin")
                .unwrap(),
            "https://cdn.alt-mp.com/data/release/data/clothes%201.bin"
        );
    }

    #[test]
    fn unknown_module_is_unsupported() {
        let cdn = provider("https://cdn.alt-mp.com");
        assert!(!cdn.has("go-module"));
        let err = cdn
            .file_url(Branch::Release, Arch::X64Linux, "go-module", "update.json")
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Provider(ProviderError::UnsupportedModule { .. })
        ));
    }
}
