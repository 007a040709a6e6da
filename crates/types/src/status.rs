//! Per-module verification status
//!
//! A status carries two independent facets. Validity says whether the files
//! on disk match the manifest they were checked against; freshness says
//! whether they match the latest remote manifest. A facet that was never
//! evaluated stays `None`: absence means "unknown", not "false".

use serde::ser::SerializeSeq;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// Which manifest a verification pass was run against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ManifestSource {
    Local,
    Remote,
}

impl fmt::Display for ManifestSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Local => "local",
            Self::Remote => "remote",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Validity {
    Valid,
    Invalid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Freshness {
    UpToDate,
    Upgradable,
}

/// Outcome of verifying one module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ModuleStatus {
    pub validity: Option<Validity>,
    pub freshness: Option<Freshness>,
}

impl ModuleStatus {
    pub const UNKNOWN: Self = Self {
        validity: None,
        freshness: None,
    };
    pub const VALID: Self = Self {
        validity: Some(Validity::Valid),
        freshness: None,
    };
    pub const INVALID: Self = Self {
        validity: Some(Validity::Invalid),
        freshness: None,
    };
    pub const UP_TO_DATE: Self = Self {
        validity: None,
        freshness: Some(Freshness::UpToDate),
    };
    pub const UPGRADABLE: Self = Self {
        validity: None,
        freshness: Some(Freshness::Upgradable),
    };

    /// True when every facet set in `flags` is set the same way here
    #[must_use]
    pub fn contains(self, flags: Self) -> bool {
        flags.validity.is_none_or(|v| self.validity == Some(v))
            && flags.freshness.is_none_or(|f| self.freshness == Some(f))
    }

    #[must_use]
    pub fn is_valid(self) -> bool {
        self.validity == Some(Validity::Valid)
    }

    /// Valid and confirmed against the latest remote manifest
    #[must_use]
    pub fn is_current(self) -> bool {
        self == (Self::VALID | Self::UP_TO_DATE)
    }

    #[must_use]
    pub fn is_unknown(self) -> bool {
        self == Self::UNKNOWN
    }

    /// Names of the facets that are set, in display order
    #[must_use]
    pub fn flag_names(self) -> Vec<&'static str> {
        let mut names = Vec::with_capacity(2);
        match self.validity {
            Some(Validity::Valid) => names.push("valid"),
            Some(Validity::Invalid) => names.push("invalid"),
            None => {}
        }
        match self.freshness {
            Some(Freshness::UpToDate) => names.push("up_to_date"),
            Some(Freshness::Upgradable) => names.push("upgradable"),
            None => {}
        }
        names
    }
}

/// Facets set on the right-hand side replace those on the left
impl BitOr for ModuleStatus {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self {
            validity: rhs.validity.or(self.validity),
            freshness: rhs.freshness.or(self.freshness),
        }
    }
}

impl BitOrAssign for ModuleStatus {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = *self | rhs;
    }
}

impl fmt::Display for ModuleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unknown() {
            return f.write_str("unknown");
        }
        f.write_str(&self.flag_names().join("|"))
    }
}

impl Serialize for ModuleStatus {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let names = self.flag_names();
        let mut seq = serializer.serialize_seq(Some(names.len()))?;
        for name in names {
            seq.serialize_element(name)?;
        }
        seq.end()
    }
}

/// Module name -> status for one verification run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ModuleStatusResult {
    statuses: BTreeMap<String, ModuleStatus>,
}

impl ModuleStatusResult {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, module: impl Into<String>, status: ModuleStatus) {
        self.statuses.insert(module.into(), status);
    }

    #[must_use]
    pub fn get(&self, module: &str) -> Option<ModuleStatus> {
        self.statuses.get(module).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, ModuleStatus)> {
        self.statuses.iter().map(|(m, s)| (m.as_str(), *s))
    }

    pub fn modules(&self) -> impl Iterator<Item = &str> {
        self.statuses.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.statuses.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
    }
}

impl FromIterator<(String, ModuleStatus)> for ModuleStatusResult {
    fn from_iter<I: IntoIterator<Item = (String, ModuleStatus)>>(iter: I) -> Self {
        Self {
            statuses: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for ModuleStatusResult {
    type Item = (String, ModuleStatus);
    type IntoIter = std::collections::btree_map::IntoIter<String, ModuleStatus>;

    fn into_iter(self) -> Self::IntoIter {
        self.statuses.into_iter()
    }
}
