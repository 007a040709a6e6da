#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Core data types for modsync
//!
//! Value types shared by every crate: release channels, target
//! architectures, module manifests, downloadable files and per-module
//! verification status.

pub mod manifest;
pub mod status;

pub use manifest::{
    manifest_file_name, module_from_manifest_file, resolve_in_root, File, FileKind, Manifest,
    MANIFEST_SUFFIX, REMOTE_MANIFEST_NAME,
};
pub use status::{Freshness, ManifestSource, ModuleStatus, ModuleStatusResult, Validity};

use modsync_errors::{ConfigError, Error};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Name of an independently distributed module (`server`, `data-files`, ...)
pub type ModuleName = String;

/// Release channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Branch {
    #[default]
    Release,
    Rc,
    Dev,
}

impl Branch {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Release => "release",
            Self::Rc => "rc",
            Self::Dev => "dev",
        }
    }
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Branch {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "release" => Ok(Self::Release),
            "rc" => Ok(Self::Rc),
            "dev" => Ok(Self::Dev),
            _ => Err(ConfigError::InvalidValue {
                field: "branch".to_string(),
                value: s.to_string(),
            }
            .into()),
        }
    }
}

impl clap::ValueEnum for Branch {
    fn value_variants<'a>() -> &'a [Self] {
        &[Self::Release, Self::Rc, Self::Dev]
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        Some(clap::builder::PossibleValue::new(self.as_str()))
    }
}

/// Target platform of the installed server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Arch {
    #[serde(rename = "x64_linux")]
    X64Linux,
    #[serde(rename = "x64_win32")]
    X64Win32,
}

impl Arch {
    /// Detect the architecture of the running host, if supported
    #[must_use]
    pub fn current() -> Option<Self> {
        if cfg!(all(target_arch = "x86_64", target_os = "windows")) {
            Some(Self::X64Win32)
        } else if cfg!(all(target_arch = "x86_64", target_os = "linux")) {
            Some(Self::X64Linux)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::X64Linux => "x64_linux",
            Self::X64Win32 => "x64_win32",
        }
    }

    #[must_use]
    pub fn os(self) -> &'static str {
        match self {
            Self::X64Linux => "linux",
            Self::X64Win32 => "windows",
        }
    }

    /// File name of the server executable on this platform
    #[must_use]
    pub fn server_binary_name(self) -> &'static str {
        match self {
            Self::X64Linux => "altv-server",
            Self::X64Win32 => "altv-server.exe",
        }
    }

    /// Shared library extension without the leading dot
    #[must_use]
    pub fn shared_lib_ext(self) -> &'static str {
        match self {
            Self::X64Linux => "so",
            Self::X64Win32 => "dll",
        }
    }
}

impl Default for Arch {
    fn default() -> Self {
        Self::current().unwrap_or(Self::X64Linux)
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Arch {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "x64_linux" => Ok(Self::X64Linux),
            "x64_win32" => Ok(Self::X64Win32),
            _ => Err(ConfigError::InvalidValue {
                field: "arch".to_string(),
                value: s.to_string(),
            }
            .into()),
        }
    }
}

impl clap::ValueEnum for Arch {
    fn value_variants<'a>() -> &'a [Self] {
        &[Self::X64Linux, Self::X64Win32]
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        Some(clap::builder::PossibleValue::new(self.as_str()))
    }
}

/// Color output choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ColorChoice {
    Always,
    #[default]
    Auto,
    Never,
}

impl clap::ValueEnum for ColorChoice {
    fn value_variants<'a>() -> &'a [Self] {
        &[Self::Always, Self::Auto, Self::Never]
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        Some(match self {
            Self::Always => clap::builder::PossibleValue::new("always"),
            Self::Auto => clap::builder::PossibleValue::new("auto"),
            Self::Never => clap::builder::PossibleValue::new("never"),
        })
    }
}
