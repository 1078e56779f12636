//! Version constraints: exact pins and trailing-wildcard series.
//!
//! The bundle manifest only uses `==` pins, either against a full version
//! (`pyserial==3.5`) or a release series (`jedi==0.18.*`). Matching follows
//! the installer's semantics: release segments are compared numerically when
//! both sides are numeric, and a shorter version is padded with zeros
//! (`1.0` matches `1.0.0`).

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// A malformed version constraint
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid version spec '{0}'")]
pub struct InvalidVersion(pub String);

/// Constraint on an installed package version
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VersionSpec {
    /// `name==1.2.3` - the installed version must equal the pin
    Exact(Arc<str>),
    /// `name==1.2.*` - the installed version must be in the 1.2 series
    Series(Arc<str>),
}

impl VersionSpec {
    /// Whether `installed` satisfies this constraint
    pub fn matches(&self, installed: &str) -> bool {
        let got: Vec<&str> = installed.trim().split('.').collect();
        match self {
            VersionSpec::Exact(pin) => {
                let want: Vec<&str> = pin.split('.').collect();
                let len = want.len().max(got.len());
                (0..len).all(|i| {
                    segment_eq(
                        want.get(i).copied().unwrap_or("0"),
                        got.get(i).copied().unwrap_or("0"),
                    )
                })
            }
            VersionSpec::Series(prefix) => {
                let want: Vec<&str> = prefix.split('.').collect();
                (0..want.len()).all(|i| segment_eq(want[i], got.get(i).copied().unwrap_or("0")))
            }
        }
    }
}

/// Compare one release segment, numerically when possible
fn segment_eq(a: &str, b: &str) -> bool {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x == y,
        _ => a == b,
    }
}

impl FromStr for VersionSpec {
    type Err = InvalidVersion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(InvalidVersion(s.to_string()));
        }

        if let Some(prefix) = s.strip_suffix(".*") {
            if prefix.is_empty() || !valid_version(prefix) {
                return Err(InvalidVersion(s.to_string()));
            }
            return Ok(VersionSpec::Series(Arc::from(prefix)));
        }

        if !valid_version(s) {
            return Err(InvalidVersion(s.to_string()));
        }
        Ok(VersionSpec::Exact(Arc::from(s)))
    }
}

/// Dot-separated, non-empty alphanumeric segments, no wildcards
fn valid_version(s: &str) -> bool {
    !s.contains('*')
        && s.split('.')
            .all(|seg| !seg.is_empty() && seg.chars().all(|c| c.is_ascii_alphanumeric()))
}

impl fmt::Display for VersionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionSpec::Exact(v) => write!(f, "{v}"),
            VersionSpec::Series(prefix) => write!(f, "{prefix}.*"),
        }
    }
}

impl Serialize for VersionSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for VersionSpec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_series_matches_patch_releases() {
        let spec: Result<VersionSpec, _> = "0.18.*".parse();
        assert!(spec.is_ok());
        let Ok(spec) = spec else { return };
        assert!(spec.matches("0.18.0"));
        assert!(spec.matches("0.18.2"));
        assert!(spec.matches("0.18"));
        assert!(!spec.matches("0.19.0"));
        assert!(!spec.matches("0.180.0"));
        assert!(!spec.matches("1.18.0"));
    }

    #[test]
    fn test_exact_zero_padding() {
        let spec: Result<VersionSpec, _> = "3.5".parse();
        assert!(spec.is_ok_and(|s| s.matches("3.5") && s.matches("3.5.0") && !s.matches("3.5.1")));
    }

    #[test]
    fn test_exact_with_letter_suffix() {
        let spec: Result<VersionSpec, _> = "4.0.0b1".parse();
        assert!(spec.is_ok_and(|s| s.matches("4.0.0b1") && !s.matches("4.0.0")));
    }

    #[test]
    fn test_rejects_malformed_specs() {
        for bad in ["", "*", ".*", "1..2", "1.*.2", "1.0-beta"] {
            assert!(bad.parse::<VersionSpec>().is_err(), "'{bad}' should be rejected");
        }
    }

    #[test]
    fn test_display_round_trip() {
        for raw in ["0.18.*", "3.5", "2.14.*", "10.3"] {
            let spec: Result<VersionSpec, _> = raw.parse();
            assert!(spec.is_ok_and(|s| s.to_string() == raw));
        }
    }

    #[test]
    fn test_serde_round_trip() {
        let spec: Result<VersionSpec, _> = serde_json::from_str("\"0.18.*\"");
        assert!(spec.is_ok_and(|s| s == VersionSpec::Series(Arc::from("0.18"))));

        let encoded = serde_json::to_string(&VersionSpec::Exact(Arc::from("3.5")));
        assert!(encoded.is_ok_and(|json| json == "\"3.5\""));

        let bad: Result<VersionSpec, _> = serde_json::from_str("\"1.*.2\"");
        assert!(bad.is_err());
    }
}
