//! Bundle requirements manifest management.
//!
//! This crate parses the pinned third-party requirements list shipped with
//! the application's regular distribution bundle and answers the one question
//! its consumers have: which entries apply on a given target platform, and at
//! which version constraint.
//!
//! The format is one requirement per line (`name==version`, optional
//! `; marker` platform guard, optional trailing `# comment`). See
//! [`Manifest::parse_str`] for parsing and [`Manifest::resolve`] for the
//! platform filter.

pub mod errors;
pub mod manifest;
pub mod marker;
pub mod platform;
pub mod types;
pub mod version;

pub use errors::ManifestError;
pub use marker::{CompareOp, MarkerError, MarkerExpr};
pub use platform::Platform;
pub use types::{normalize_name, Manifest, Requirement};
pub use version::VersionSpec;
