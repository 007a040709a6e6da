//! Integration tests for config loading

use modsync_config::Config;
use modsync_types::{Arch, Branch, ColorChoice};
use std::io::Write;
use tempfile::NamedTempFile;

#[tokio::test]
async fn test_load_config_from_file() {
    let mut temp_file = NamedTempFile::new().unwrap();
    writeln!(
        temp_file,
        r#"
[general]
path = "/srv/altv"
branch = "rc"
arch = "x64_win32"
modules = ["server", "data-files", "js-module"]
color = "never"
parallel_downloads = 3

[network]
timeout = 60
deadline = 120

[cdn]
base_url = "https://mirror.example.com"

[cdn.modules]
server = "srv/{{branch}}/{{arch}}"

[github]
enabled = true
"#
    )
    .unwrap();

    let config = Config::load_from_file(temp_file.path()).await.unwrap();
    assert_eq!(config.general.path.to_str(), Some("/srv/altv"));
    assert_eq!(config.general.branch, Branch::Rc);
    assert_eq!(config.general.arch, Arch::X64Win32);
    assert_eq!(config.general.modules.len(), 3);
    assert_eq!(config.general.color, ColorChoice::Never);
    assert_eq!(config.general.parallel_downloads, 3);
    assert_eq!(config.network.timeout, 60);
    assert_eq!(config.network.retries, 3);
    assert_eq!(config.deadline(), Some(std::time::Duration::from_secs(120)));
    assert_eq!(config.cdn.base_url, "https://mirror.example.com");
    assert_eq!(config.cdn.modules.len(), 1);
    assert_eq!(config.cdn.modules["server"], "srv/{branch}/{arch}");
    assert!(config.github.enabled);
    assert_eq!(config.github.api_url, "https://api.github.com");
}

#[tokio::test]
async fn test_empty_file_uses_defaults() {
    let temp_file = NamedTempFile::new().unwrap();
    let config = Config::load_from_file(temp_file.path()).await.unwrap();
    assert_eq!(config.general.modules, vec!["server"]);
    assert_eq!(config.cdn.modules.len(), 5);
}

#[tokio::test]
async fn test_invalid_toml_is_parse_error() {
    let mut temp_file = NamedTempFile::new().unwrap();
    writeln!(temp_file, "[general\nbranch = ").unwrap();
    let err = Config::load_from_file(temp_file.path()).await.unwrap_err();
    assert!(matches!(
        err,
        modsync_errors::Error::Config(modsync_errors::ConfigError::ParseError { .. })
    ));
}

#[tokio::test]
async fn test_explicit_missing_file_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.toml");
    let err = Config::load_or_default(Some(&missing)).await.unwrap_err();
    assert!(matches!(
        err,
        modsync_errors::Error::Config(modsync_errors::ConfigError::NotFound { .. })
    ));
}
