//! Manifest operations - parsing, persistence, and platform filtering.
//!
//! The on-disk format is one requirement per line: `name==version`, an
//! optional `; marker` guard and an optional trailing `# comment`. Blank
//! lines and comment-only lines are ignored. Parsing reports the first
//! malformed line with its 1-based line number.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use ahash::AHashMap;

use tracing::{debug, info};

use crate::errors::ManifestError;
use crate::marker::MarkerExpr;
use crate::platform::Platform;
use crate::types::{Manifest, Requirement};
use crate::version::VersionSpec;

/// Comparators we recognize only to reject with a pointed message
const UNSUPPORTED_OPS: &[&str] = &["===", ">=", "<=", "~=", ">", "<"];

impl Manifest {
    /// Parse manifest text
    pub fn parse_str(input: &str) -> Result<Self, ManifestError> {
        let mut manifest = Manifest::default();
        for (idx, raw_line) in input.lines().enumerate() {
            if let Some(entry) = parse_line(raw_line, idx + 1)? {
                manifest.push(entry);
            }
        }
        Ok(manifest)
    }

    /// Load a manifest file
    pub fn load_from_path(path: &Path) -> Result<Self, ManifestError> {
        debug!("Loading manifest from {:?}", path);
        let content = std::fs::read_to_string(path)?;
        let manifest = Self::parse_str(&content)?;
        info!("Loaded {} requirement entries", manifest.len());
        Ok(manifest)
    }

    /// Write the canonical serialization with an atomic temp-file rename
    pub fn save_to_path(&self, path: &Path) -> Result<(), ManifestError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let temp_path = path.with_extension("txt.tmp");
        {
            let file = std::fs::File::create(&temp_path)?;
            let mut writer = std::io::BufWriter::new(file);
            writer.write_all(self.to_string().as_bytes())?;
            writer.flush()?;
        }
        std::fs::rename(&temp_path, path)?;

        debug!("Wrote {} entries to {:?}", self.len(), path);
        Ok(())
    }

    /// Entries whose marker holds (or is absent) on the given platform
    pub fn applicable<'a>(&'a self, platform: &Platform) -> Vec<&'a Requirement> {
        self.entries
            .iter()
            .filter(|entry| entry.applies_to(platform))
            .collect()
    }

    /// The parse-and-filter operation: applicable entries as a
    /// name-to-constraint mapping. Duplicate entries with an identical
    /// constraint collapse to one; differing constraints for the same
    /// package on this platform are a conflict.
    pub fn resolve(
        &self,
        platform: &Platform,
    ) -> Result<BTreeMap<Arc<str>, VersionSpec>, ManifestError> {
        let mut by_name: BTreeMap<Arc<str>, &Requirement> = BTreeMap::new();
        for entry in self.applicable(platform) {
            if let Some(existing) = by_name.get(entry.normalized_name()) {
                if existing.version != entry.version {
                    return Err(ManifestError::Conflict {
                        name: entry.name.to_string(),
                        platform: platform.label().to_string(),
                        first: existing.version.to_string(),
                        second: entry.version.to_string(),
                    });
                }
                continue;
            }
            by_name.insert(entry.normalized_name().clone(), entry);
        }

        Ok(by_name
            .into_values()
            .map(|entry| (entry.name.clone(), entry.version.clone()))
            .collect())
    }

    /// Check manifest invariants across a set of target platforms,
    /// returning every violation rather than stopping at the first
    pub fn verify(&self, platforms: &[Platform]) -> Vec<ManifestError> {
        let mut problems = Vec::new();
        for platform in platforms {
            let mut by_name: AHashMap<&str, &Requirement> = AHashMap::new();
            for entry in self.applicable(platform) {
                match by_name.get(entry.normalized_name().as_ref()) {
                    Some(existing) if existing.version != entry.version => {
                        problems.push(ManifestError::Conflict {
                            name: entry.name.to_string(),
                            platform: platform.label().to_string(),
                            first: existing.version.to_string(),
                            second: entry.version.to_string(),
                        });
                    }
                    Some(_) => {}
                    None => {
                        by_name.insert(entry.normalized_name().as_ref(), entry);
                    }
                }
            }
        }
        problems
    }
}

/// Parse one manifest line; `Ok(None)` for blank and comment-only lines
fn parse_line(raw: &str, line: usize) -> Result<Option<Requirement>, ManifestError> {
    let (body, comment) = split_comment(raw);
    let body = body.trim();
    if body.is_empty() {
        return Ok(None);
    }

    let syntax = |reason: String| ManifestError::Syntax { line, reason };

    let (spec_part, marker_part) = match split_outside_quotes(body, ';') {
        Some((left, right)) => (left.trim(), Some(right.trim())),
        None => (body, None),
    };

    if UNSUPPORTED_OPS.iter().any(|op| spec_part.contains(op)) {
        return Err(syntax(format!(
            "only '==' pins are supported, got '{spec_part}'"
        )));
    }

    let (name, version_str) = spec_part
        .split_once("==")
        .ok_or_else(|| syntax(format!("expected 'name==version', got '{spec_part}'")))?;
    let name = name.trim();
    let version_str = version_str.trim();
    if !valid_name(name) {
        return Err(syntax(format!("invalid package name '{name}'")));
    }

    let version: VersionSpec = version_str
        .parse()
        .map_err(|e| syntax(format!("{e}")))?;

    let marker = match marker_part {
        Some(text) => Some(
            text.parse::<MarkerExpr>()
                .map_err(|e| syntax(format!("{e}")))?,
        ),
        None => None,
    };

    let mut entry = Requirement::new(name, version).at_line(line);
    entry.marker = marker;
    entry.comment = comment.map(Arc::from);
    Ok(Some(entry))
}

/// Strip a trailing comment. A `#` starts a comment only at the start of the
/// line or after whitespace, and never inside a quoted marker string.
fn split_comment(line: &str) -> (&str, Option<&str>) {
    let mut quote: Option<char> = None;
    let mut prev: Option<char> = None;
    for (pos, ch) in line.char_indices() {
        match quote {
            Some(q) => {
                if ch == q {
                    quote = None;
                }
            }
            None => match ch {
                '"' | '\'' => quote = Some(ch),
                '#' if prev.map_or(true, char::is_whitespace) => {
                    let comment = line[pos + 1..].trim();
                    let comment = (!comment.is_empty()).then_some(comment);
                    return (&line[..pos], comment);
                }
                _ => {}
            },
        }
        prev = Some(ch);
    }
    (line, None)
}

/// Split at the first `sep` that is not inside a quoted string
fn split_outside_quotes(text: &str, sep: char) -> Option<(&str, &str)> {
    let mut quote: Option<char> = None;
    for (pos, ch) in text.char_indices() {
        match quote {
            Some(q) => {
                if ch == q {
                    quote = None;
                }
            }
            None => {
                if ch == '"' || ch == '\'' {
                    quote = Some(ch);
                } else if ch == sep {
                    return Some((&text[..pos], &text[pos + ch.len_utf8()..]));
                }
            }
        }
    }
    None
}

/// Package names: alphanumeric with inner `-`, `_` and `.` runs
fn valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !first.is_ascii_alphanumeric() {
        return false;
    }
    let Some(last) = name.chars().next_back() else {
        return false;
    };
    if !last.is_ascii_alphanumeric() {
        return false;
    }
    name.chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
}
