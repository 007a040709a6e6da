//! Module manifests and the file lists derived from them

use modsync_errors::{Error, ManifestError};
use modsync_hash::Hash;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

/// Suffix of manifest files kept on disk, one per module
pub const MANIFEST_SUFFIX: &str = ".update.json";

/// Name of the manifest under a module's remote content path
pub const REMOTE_MANIFEST_NAME: &str = "update.json";

/// On-disk manifest file name for a module
#[must_use]
pub fn manifest_file_name(module: &str) -> String {
    format!("{module}{MANIFEST_SUFFIX}")
}

/// Module name encoded in a manifest file name, if it is one
#[must_use]
pub fn module_from_manifest_file(file_name: &str) -> Option<&str> {
    file_name
        .strip_suffix(MANIFEST_SUFFIX)
        .filter(|module| !module.is_empty())
}

/// Join a manifest-relative path onto the install root
///
/// # Errors
///
/// Returns an error if the path is absolute, empty, or climbs out of `root`.
pub fn resolve_in_root(root: &Path, relative: &str) -> Result<PathBuf, Error> {
    let rel = Path::new(relative);
    let mut normal = 0usize;
    for component in rel.components() {
        match component {
            Component::Normal(_) => normal += 1,
            Component::CurDir => {}
            _ => {
                return Err(ManifestError::UnsafePath {
                    path: relative.to_string(),
                }
                .into())
            }
        }
    }
    if normal == 0 {
        return Err(ManifestError::UnsafePath {
            path: relative.to_string(),
        }
        .into());
    }
    Ok(root.join(rel))
}

/// Version-stamped listing of a module's files
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Build number, -1 when the source does not publish one
    #[serde(rename = "latestBuildNumber", default = "unknown_build")]
    pub build_number: i64,
    #[serde(default)]
    pub version: String,
    /// Relative path -> hex SHA-1; empty when the source has no digest
    #[serde(rename = "hashList", default)]
    pub hash_list: BTreeMap<String, String>,
    /// Relative path -> byte count; negative means unchecked
    #[serde(rename = "sizeList", default)]
    pub size_list: BTreeMap<String, i64>,
}

fn unknown_build() -> i64 {
    -1
}

impl Default for Manifest {
    fn default() -> Self {
        Self {
            build_number: unknown_build(),
            version: String::new(),
            hash_list: BTreeMap::new(),
            size_list: BTreeMap::new(),
        }
    }
}

impl Manifest {
    /// Parse a manifest from JSON text
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::ParseFailed`] naming `origin` on malformed input.
    pub fn from_json(text: &str, origin: &str) -> Result<Self, Error> {
        serde_json::from_str(text).map_err(|e| {
            ManifestError::ParseFailed {
                path: origin.to_string(),
                message: e.to_string(),
            }
            .into()
        })
    }

    /// Record a file; an empty `hash` or missing `size` leaves that check off
    pub fn insert(&mut self, path: impl Into<String>, hash: Option<&Hash>, size: Option<u64>) {
        let path = path.into();
        self.hash_list
            .insert(path.clone(), hash.map(Hash::to_hex).unwrap_or_default());
        self.size_list.insert(
            path,
            size.and_then(|s| i64::try_from(s).ok()).unwrap_or(-1),
        );
    }

    /// All file paths named by either list
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        let mut paths: Vec<&str> = self
            .hash_list
            .keys()
            .chain(self.size_list.keys())
            .map(String::as_str)
            .collect();
        paths.sort_unstable();
        paths.dedup();
        paths.into_iter()
    }

    /// Expected digest for a file; `None` when unpublished
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::InvalidHash`] if the listed digest is not valid hex.
    pub fn expected_hash(&self, path: &str) -> Result<Option<Hash>, Error> {
        match self.hash_list.get(path).map(|h| h.trim()) {
            None | Some("") => Ok(None),
            Some(hex) => Hash::from_hex(hex).map(Some).map_err(|_| {
                ManifestError::InvalidHash {
                    path: path.to_string(),
                    value: hex.to_string(),
                }
                .into()
            }),
        }
    }

    /// Expected size for a file; `None` when absent or negative
    #[must_use]
    pub fn expected_size(&self, path: &str) -> Option<u64> {
        self.size_list
            .get(path)
            .and_then(|size| u64::try_from(*size).ok())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.paths().count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hash_list.is_empty() && self.size_list.is_empty()
    }
}

/// Role of a file within a module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Data,
    Manifest,
}

/// A single downloadable file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct File {
    pub kind: FileKind,
    /// Module this file belongs to
    pub module: String,
    /// Destination relative to the install root
    pub path: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash: Option<Hash>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

impl File {
    /// Destination of this file under `root`
    ///
    /// # Errors
    ///
    /// Returns an error if the relative path would escape `root`.
    pub fn destination(&self, root: &Path) -> Result<PathBuf, Error> {
        resolve_in_root(root, &self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SERVER_MANIFEST: &str = r#"{
        "latestBuildNumber": 3725,
        "version": "16.2.1",
        "hashList": {
            "altv-server": "2aae6c35c94fcfb415dbe95f408b9ce91ee846ed",
            "data/vehmodels.bin": ""
        },
        "sizeList": {
            "altv-server": 11,
            "data/vehmodels.bin": 4096
        }
    }"#;

    #[test]
    fn parses_wire_format() {
        let manifest = Manifest::from_json(SERVER_MANIFEST, "server.update.json").unwrap();
        assert_eq!(manifest.build_number, 3725);
        assert_eq!(manifest.version, "16.2.1");
        assert_eq!(manifest.len(), 2);
        assert_eq!(
            manifest.expected_hash("altv-server").unwrap(),
            Some(Hash::from_data(b"hello world"))
        );
        assert_eq!(manifest.expected_hash("data/vehmodels.bin").unwrap(), None);
        assert_eq!(manifest.expected_size("data/vehmodels.bin"), Some(4096));
    }

    #[test]
    fn missing_fields_default() {
        let manifest = Manifest::from_json("{}", "x").unwrap();
        assert_eq!(manifest.build_number, -1);
        assert!(manifest.is_empty());
    }

    #[test]
    fn malformed_json_names_origin() {
        let err = Manifest::from_json("{not json", "js-module.update.json").unwrap_err();
        assert!(err.to_string().contains("js-module.update.json"));
    }

    #[test]
    fn negative_size_is_unchecked() {
        let mut manifest = Manifest::default();
        manifest.insert("modules/go-module/go-module.so", None, None);
        assert_eq!(manifest.expected_size("modules/go-module/go-module.so"), None);
        assert_eq!(manifest.hash_list["modules/go-module/go-module.so"], "");
        assert_eq!(manifest.size_list["modules/go-module/go-module.so"], -1);
    }

    #[test]
    fn invalid_hash_is_reported_with_path() {
        let mut manifest = Manifest::default();
        manifest.hash_list.insert("bin".into(), "aaa111".into());
        let err = manifest.expected_hash("bin").unwrap_err();
        assert!(matches!(
            err,
            Error::Manifest(ManifestError::InvalidHash { ref path, .. }) if path == "bin"
        ));
    }

    #[test]
    fn manifest_file_names() {
        assert_eq!(manifest_file_name("data-files"), "data-files.update.json");
        assert_eq!(
            module_from_manifest_file("js-module.update.json"),
            Some("js-module")
        );
        assert_eq!(module_from_manifest_file(".update.json"), None);
        assert_eq!(module_from_manifest_file("server.toml"), None);
    }

    #[test]
    fn paths_cannot_escape_root() {
        let root = Path::new("/srv/altv");
        assert_eq!(
            resolve_in_root(root, "modules/js-module/libnode.so").unwrap(),
            root.join("modules/js-module/libnode.so")
        );
        assert!(resolve_in_root(root, "../etc/passwd").is_err());
        assert!(resolve_in_root(root, "/etc/passwd").is_err());
        assert!(resolve_in_root(root, "").is_err());
    }
}
