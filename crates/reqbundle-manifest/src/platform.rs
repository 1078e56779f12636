//! Target platform descriptors used for marker evaluation.
//!
//! A `Platform` carries the environment attributes a requirement marker may
//! test. Constructors are provided for the three targets the distribution
//! bundle is built for, plus host detection for local use.

use std::sync::Arc;

/// Environment keys a marker expression may reference
pub const KEYS: &[&str] = &[
    "sys_platform",
    "os_name",
    "platform_system",
    "platform_machine",
];

/// Concrete target environment a manifest is resolved against
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Platform {
    pub sys_platform: Arc<str>,
    pub os_name: Arc<str>,
    pub platform_system: Arc<str>,
    pub platform_machine: Arc<str>,
}

impl Platform {
    pub fn linux() -> Self {
        Platform {
            sys_platform: Arc::from("linux"),
            os_name: Arc::from("posix"),
            platform_system: Arc::from("Linux"),
            platform_machine: Arc::from("x86_64"),
        }
    }

    pub fn macos() -> Self {
        Platform {
            sys_platform: Arc::from("darwin"),
            os_name: Arc::from("posix"),
            platform_system: Arc::from("Darwin"),
            platform_machine: Arc::from("arm64"),
        }
    }

    pub fn windows() -> Self {
        Platform {
            sys_platform: Arc::from("win32"),
            os_name: Arc::from("nt"),
            platform_system: Arc::from("Windows"),
            platform_machine: Arc::from("AMD64"),
        }
    }

    /// Look up a platform by its `sys_platform` value
    pub fn from_sys_platform(name: &str) -> Option<Self> {
        match name {
            "linux" => Some(Self::linux()),
            "darwin" => Some(Self::macos()),
            "win32" => Some(Self::windows()),
            _ => None,
        }
    }

    /// Detect the host platform
    pub fn current() -> Self {
        let base = match std::env::consts::OS {
            "macos" => Self::macos(),
            "windows" => Self::windows(),
            _ => Self::linux(),
        };
        Platform {
            platform_machine: Arc::from(host_machine()),
            ..base
        }
    }

    /// Override the machine attribute (e.g. `"aarch64"`)
    pub fn with_machine(mut self, machine: &str) -> Self {
        self.platform_machine = Arc::from(machine);
        self
    }

    /// Value of a recognized environment key, `None` for unknown keys
    pub fn get(&self, key: &str) -> Option<&str> {
        match key {
            "sys_platform" => Some(&self.sys_platform),
            "os_name" => Some(&self.os_name),
            "platform_system" => Some(&self.platform_system),
            "platform_machine" => Some(&self.platform_machine),
            _ => None,
        }
    }

    /// Short label for diagnostics (the `sys_platform` value)
    pub fn label(&self) -> &str {
        &self.sys_platform
    }
}

/// Map Rust's arch names to what Python's `platform.machine()` reports
fn host_machine() -> &'static str {
    match (std::env::consts::OS, std::env::consts::ARCH) {
        ("windows", "x86_64") => "AMD64",
        ("macos", "aarch64") => "arm64",
        (_, "x86_64") => "x86_64",
        (_, "aarch64") => "aarch64",
        (_, arch) => arch,
    }
}
