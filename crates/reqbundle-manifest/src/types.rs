//! Core manifest types.
//!
//! A [`Manifest`] is an ordered list of [`Requirement`] entries plus a
//! runtime-only index from normalized package name to entry positions,
//! rebuilt on load and never serialized. Names are interned as `Arc<str>`.

use std::fmt;
use std::sync::Arc;

use ahash::AHashMap;
use serde::Serialize;
use smallvec::SmallVec;

use crate::marker::MarkerExpr;
use crate::platform::Platform;
use crate::version::VersionSpec;

/// Normalized form of a package name: lowercase, runs of `-`, `_` and `.`
/// collapsed to a single `-`. Two names with the same normalized form refer
/// to the same package.
pub fn normalize_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut last_was_sep = false;
    for c in name.chars() {
        if c == '-' || c == '_' || c == '.' {
            if !last_was_sep {
                out.push('-');
            }
            last_was_sep = true;
        } else {
            out.extend(c.to_lowercase());
            last_was_sep = false;
        }
    }
    out
}

/// A single requirement line from the bundle manifest
#[derive(Debug, Clone, Serialize)]
pub struct Requirement {
    pub name: Arc<str>,
    pub version: VersionSpec,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<MarkerExpr>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<Arc<str>>,

    /// 1-based line number in the source file, 0 for programmatic entries
    #[serde(skip)]
    pub line: usize,

    /// Runtime only - normalized name, interned once at construction
    #[serde(skip)]
    normalized: Arc<str>,
}

impl Requirement {
    pub fn new(name: &str, version: VersionSpec) -> Self {
        Requirement {
            name: Arc::from(name),
            version,
            marker: None,
            comment: None,
            line: 0,
            normalized: Arc::from(normalize_name(name).as_str()),
        }
    }

    pub fn with_marker(mut self, marker: MarkerExpr) -> Self {
        self.marker = Some(marker);
        self
    }

    pub fn with_comment(mut self, comment: &str) -> Self {
        self.comment = Some(Arc::from(comment));
        self
    }

    pub(crate) fn at_line(mut self, line: usize) -> Self {
        self.line = line;
        self
    }

    /// Normalized package name used for identity comparisons
    pub fn normalized_name(&self) -> &Arc<str> {
        &self.normalized
    }

    /// Whether this entry applies on the given target platform
    pub fn applies_to(&self, platform: &Platform) -> bool {
        self.marker.as_ref().map_or(true, |m| m.eval(platform))
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}=={}", self.name, self.version)?;
        if let Some(marker) = &self.marker {
            write!(f, "; {marker}")?;
        }
        if let Some(comment) = &self.comment {
            write!(f, "  # {comment}")?;
        }
        Ok(())
    }
}

/// Ordered requirements list with an O(1) name index
#[derive(Debug, Clone, Default, Serialize)]
pub struct Manifest {
    pub entries: Vec<Requirement>,

    /// Runtime only - normalized name to entry indices. A name can appear
    /// more than once when entries carry mutually exclusive markers.
    #[serde(skip)]
    index: AHashMap<Arc<str>, SmallVec<[usize; 2]>>,
}

impl Manifest {
    /// Rebuild the name index after bulk edits to `entries`
    pub fn rebuild_index(&mut self) {
        self.index.clear();
        for (idx, entry) in self.entries.iter().enumerate() {
            self.index
                .entry(entry.normalized.clone())
                .or_default()
                .push(idx);
        }
    }

    /// Append an entry, keeping the index current
    pub fn push(&mut self, entry: Requirement) {
        let idx = self.entries.len();
        self.index
            .entry(entry.normalized.clone())
            .or_default()
            .push(idx);
        self.entries.push(entry);
    }

    /// All entries for a package, regardless of platform
    pub fn entries_named<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a Requirement> {
        let indices = self
            .index
            .get(normalize_name(name).as_str())
            .cloned()
            .unwrap_or_default();
        indices.into_iter().map(|idx| &self.entries[idx])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(normalize_name(name).as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for Manifest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            writeln!(f, "{entry}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("Send2Trash"), "send2trash");
        assert_eq!(normalize_name("adafruit_board_toolkit"), "adafruit-board-toolkit");
        assert_eq!(normalize_name("dbus-next"), "dbus-next");
        assert_eq!(normalize_name("zope.interface"), "zope-interface");
        assert_eq!(normalize_name("weird__-..name"), "weird-name");
    }

    #[test]
    fn test_push_and_lookup() {
        let mut manifest = Manifest::default();
        manifest.push(Requirement::new("Send2Trash", VersionSpec::Exact(Arc::from("1.8.0"))));

        assert!(manifest.contains("send2trash"));
        assert!(manifest.contains("send2_trash"));
        assert!(!manifest.contains("sendtotrash"));
        assert_eq!(manifest.entries_named("SEND2TRASH").count(), 1);
    }

    #[test]
    fn test_index_allows_repeated_names() {
        let mut manifest = Manifest::default();
        manifest.push(Requirement::new("pyserial", VersionSpec::Exact(Arc::from("3.5"))));
        manifest.push(Requirement::new("pyserial", VersionSpec::Exact(Arc::from("3.4"))));
        assert_eq!(manifest.entries_named("pyserial").count(), 2);
        assert_eq!(manifest.len(), 2);
    }

    #[test]
    fn test_display_entry() {
        let entry = Requirement::new("jedi", VersionSpec::Series(Arc::from("0.18")))
            .with_comment("code completion");
        assert_eq!(entry.to_string(), "jedi==0.18.*  # code completion");
    }

    #[test]
    fn test_applies_without_marker() {
        let entry = Requirement::new("jedi", VersionSpec::Series(Arc::from("0.18")));
        assert!(entry.applies_to(&Platform::linux()));
        assert!(entry.applies_to(&Platform::windows()));
    }
}
