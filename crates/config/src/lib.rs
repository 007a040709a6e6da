#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Configuration management for modsync
//!
//! This crate handles loading and merging configuration from:
//! - Default values (hard-coded)
//! - Configuration file (~/.config/modsync/config.toml)
//! - Environment variables (`MODSYNC_*`)
//! - CLI flags (applied by the binary)

use modsync_errors::{ConfigError, Error};
use modsync_types::{Arch, Branch, ColorChoice};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;

/// Public CDN serving the static modules
pub const DEFAULT_CDN_URL: &str = "https://cdn.alt-mp.com";

/// Release host API
pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub network: NetworkConfig,

    #[serde(default)]
    pub cdn: CdnConfig,

    #[serde(default)]
    pub github: GithubConfig,
}

/// What to install and where
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Install root
    #[serde(default = "default_path")]
    pub path: PathBuf,
    #[serde(default)]
    pub branch: Branch,
    #[serde(default)]
    pub arch: Arch,
    #[serde(default = "default_modules")]
    pub modules: Vec<String>,
    #[serde(default)]
    pub color: ColorChoice,
    #[serde(default = "default_parallel_downloads")]
    pub parallel_downloads: usize,
}

/// HTTP client and deadline settings (seconds)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64,
    #[serde(default = "default_retries")]
    pub retries: u32,
    #[serde(default = "default_retry_delay")]
    pub retry_delay: u64,
    /// Whole-command deadline, 0 = none
    #[serde(default)]
    pub deadline: u64,
}

/// Static CDN layout
///
/// Module path templates may use `{branch}` and `{arch}`. Setting
/// `[cdn.modules]` replaces the default table entirely.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CdnConfig {
    #[serde(default = "default_cdn_url")]
    pub base_url: String,
    #[serde(default = "default_cdn_modules")]
    pub modules: BTreeMap<String, String>,
}

/// Experimental release host provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GithubConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_github_api_url")]
    pub api_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
            branch: Branch::default(),
            arch: Arch::default(),
            modules: default_modules(),
            color: ColorChoice::default(),
            parallel_downloads: default_parallel_downloads(),
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            connect_timeout: default_connect_timeout(),
            retries: default_retries(),
            retry_delay: default_retry_delay(),
            deadline: 0,
        }
    }
}

impl Default for CdnConfig {
    fn default() -> Self {
        Self {
            base_url: default_cdn_url(),
            modules: default_cdn_modules(),
        }
    }
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_url: default_github_api_url(),
            token: None,
        }
    }
}

fn default_path() -> PathBuf {
    PathBuf::from(".")
}

fn default_modules() -> Vec<String> {
    vec!["server".to_string()]
}

fn default_parallel_downloads() -> usize {
    8
}

fn default_timeout() -> u64 {
    300
}

fn default_connect_timeout() -> u64 {
    30
}

fn default_retries() -> u32 {
    3
}

fn default_retry_delay() -> u64 {
    1
}

fn default_cdn_url() -> String {
    DEFAULT_CDN_URL.to_string()
}

fn default_github_api_url() -> String {
    DEFAULT_GITHUB_API_URL.to_string()
}

fn default_cdn_modules() -> BTreeMap<String, String> {
    [
        ("server", "server/{branch}/{arch}"),
        ("data-files", "data/{branch}"),
        ("js-module", "js-module/{branch}/{arch}"),
        ("csharp-module", "coreclr-module/{branch}/{arch}"),
        ("js-bytecode-module", "js-bytecode-module/{branch}/{arch}"),
    ]
    .into_iter()
    .map(|(module, template)| (module.to_string(), template.to_string()))
    .collect()
}

impl Config {
    /// Get the default config file path
    ///
    /// # Errors
    ///
    /// Returns an error if the system config directory cannot be determined.
    pub fn default_path() -> Result<PathBuf, Error> {
        let config_dir = dirs::config_dir().ok_or_else(|| ConfigError::NotFound {
            path: "config directory".to_string(),
        })?;
        Ok(config_dir.join("modsync").join("config.toml"))
    }

    /// Load configuration from a specific file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or contains invalid TOML.
    pub async fn load_from_file(path: &Path) -> Result<Self, Error> {
        let contents = fs::read_to_string(path)
            .await
            .map_err(|_| ConfigError::NotFound {
                path: path.display().to_string(),
            })?;

        toml::from_str(&contents)
            .map_err(|e| ConfigError::ParseError {
                message: e.to_string(),
            })
            .map_err(Into::into)
    }

    /// Load from the default location, falling back to defaults when absent
    ///
    /// # Errors
    ///
    /// Returns an error if an existing config file cannot be read or parsed.
    pub async fn load() -> Result<Self, Error> {
        let config_path = Self::default_path()?;

        if fs::try_exists(&config_path).await.unwrap_or(false) {
            Self::load_from_file(&config_path).await
        } else {
            Ok(Self::default())
        }
    }

    /// Load from an explicit path if given, otherwise from the default location
    ///
    /// # Errors
    ///
    /// Returns an error if the chosen file cannot be read or parsed.
    pub async fn load_or_default(path: Option<&Path>) -> Result<Self, Error> {
        match path {
            Some(config_path) => Self::load_from_file(config_path).await,
            None => Self::load().await,
        }
    }

    /// Merge `MODSYNC_*` environment variables over the loaded values
    ///
    /// # Errors
    ///
    /// Returns an error if a variable holds a value that cannot be parsed.
    pub fn merge_env(&mut self) -> Result<(), Error> {
        self.merge_vars(|name| std::env::var(name).ok())
    }

    fn merge_vars(&mut self, var: impl Fn(&str) -> Option<String>) -> Result<(), Error> {
        let invalid = |field: &str, value: String| -> Error {
            ConfigError::InvalidValue {
                field: field.to_string(),
                value,
            }
            .into()
        };

        if let Some(path) = var("MODSYNC_PATH") {
            self.general.path = PathBuf::from(path);
        }

        if let Some(branch) = var("MODSYNC_BRANCH") {
            self.general.branch = branch
                .parse()
                .map_err(|_| invalid("MODSYNC_BRANCH", branch))?;
        }

        if let Some(arch) = var("MODSYNC_ARCH") {
            self.general.arch = arch.parse().map_err(|_| invalid("MODSYNC_ARCH", arch))?;
        }

        if let Some(color) = var("MODSYNC_COLOR") {
            self.general.color = match color.as_str() {
                "always" => ColorChoice::Always,
                "auto" => ColorChoice::Auto,
                "never" => ColorChoice::Never,
                _ => return Err(invalid("MODSYNC_COLOR", color)),
            };
        }

        if let Some(downloads) = var("MODSYNC_PARALLEL_DOWNLOADS") {
            self.general.parallel_downloads = downloads
                .parse()
                .map_err(|_| invalid("MODSYNC_PARALLEL_DOWNLOADS", downloads))?;
        }

        if let Some(url) = var("MODSYNC_CDN_URL") {
            self.cdn.base_url = url;
        }

        if let Some(token) = var("MODSYNC_GITHUB_TOKEN") {
            self.github.token = Some(token).filter(|t| !t.is_empty());
        }

        Ok(())
    }

    /// Reject values that would make a run meaningless
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] naming the offending field.
    pub fn validate(&self) -> Result<(), Error> {
        if self.general.parallel_downloads == 0 {
            return Err(ConfigError::InvalidValue {
                field: "general.parallel_downloads".to_string(),
                value: "0".to_string(),
            }
            .into());
        }
        if self.general.modules.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "general.modules".to_string(),
                value: "[]".to_string(),
            }
            .into());
        }
        if self.cdn.base_url.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "cdn.base_url".to_string(),
                value: self.cdn.base_url.clone(),
            }
            .into());
        }
        Ok(())
    }

    /// Whole-command deadline, if one is configured
    #[must_use]
    pub fn deadline(&self) -> Option<Duration> {
        (self.network.deadline > 0).then(|| Duration::from_secs(self.network.deadline))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_match_public_cdn_layout() {
        let config = Config::default();
        assert_eq!(config.general.modules, vec!["server"]);
        assert_eq!(config.general.branch, Branch::Release);
        assert_eq!(config.cdn.base_url, DEFAULT_CDN_URL);
        assert_eq!(config.cdn.modules["data-files"], "data/{branch}");
        assert_eq!(
            config.cdn.modules["csharp-module"],
            "coreclr-module/{branch}/{arch}"
        );
        assert!(!config.github.enabled);
        assert_eq!(config.deadline(), None);
        config.validate().unwrap();
    }

    #[test]
    fn env_overrides_apply() {
        let mut config = Config::default();
        config
            .merge_vars(vars(&[
                ("MODSYNC_BRANCH", "dev"),
                ("MODSYNC_ARCH", "x64_win32"),
                ("MODSYNC_PARALLEL_DOWNLOADS", "2"),
                ("MODSYNC_CDN_URL", "http://127.0.0.1:9000"),
                ("MODSYNC_GITHUB_TOKEN", "ghp_test"),
            ]))
            .unwrap();

        assert_eq!(config.general.branch, Branch::Dev);
        assert_eq!(config.general.arch, Arch::X64Win32);
        assert_eq!(config.general.parallel_downloads, 2);
        assert_eq!(config.cdn.base_url, "http://127.0.0.1:9000");
        assert_eq!(config.github.token.as_deref(), Some("ghp_test"));
    }

    #[test]
    fn invalid_env_value_names_variable() {
        let mut config = Config::default();
        let err = config
            .merge_vars(vars(&[("MODSYNC_BRANCH", "nightly")]))
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::InvalidValue { ref field, .. }) if field == "MODSYNC_BRANCH"
        ));
    }

    #[test]
    fn zero_parallelism_is_rejected() {
        let mut config = Config::default();
        config.general.parallel_downloads = 0;
        assert!(config.validate().is_err());
    }
}
