//! Host introspection, computed once when agents are built.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

const CPUINFO_PATH: &str = "/proc/cpuinfo";
const DEVICE_TREE_MODEL_PATH: &str = "/proc/device-tree/model";

/// Which family of host commands to use for process and port lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HostPlatform {
    Windows,
    Posix,
}

impl HostPlatform {
    pub fn current() -> Self {
        if cfg!(windows) {
            HostPlatform::Windows
        } else {
            HostPlatform::Posix
        }
    }

    pub fn is_windows(&self) -> bool {
        matches!(self, HostPlatform::Windows)
    }
}

impl fmt::Display for HostPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostPlatform::Windows => write!(f, "windows"),
            HostPlatform::Posix => write!(f, "posix"),
        }
    }
}

/// Facts about the host that agents consult.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostInfo {
    pub platform: HostPlatform,
    /// Operating system name (`linux`, `windows`, `macos`, ...)
    pub os: String,
    /// CPU architecture (`x86_64`, `aarch64`, ...)
    pub arch: String,
    pub is_raspberry_pi: bool,
    /// Board model from the device tree, when available
    pub model: Option<String>,
}

impl HostInfo {
    /// Inspect the running host.
    pub fn detect() -> Self {
        let cpuinfo = std::fs::read_to_string(CPUINFO_PATH).unwrap_or_default();
        let is_raspberry_pi = is_raspberry_pi(&cpuinfo);
        let model = if is_raspberry_pi {
            Some(
                std::fs::read_to_string(DEVICE_TREE_MODEL_PATH)
                    .map(|m| m.trim_matches(char::from(0)).trim().to_string())
                    .unwrap_or_else(|_| "Unknown".to_string()),
            )
        } else {
            None
        };

        let info = Self {
            platform: HostPlatform::current(),
            os: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
            is_raspberry_pi,
            model,
        };
        debug!(?info, "Detected host");
        info
    }

    /// A plain, non-Pi host of the given platform.
    pub fn generic(platform: HostPlatform) -> Self {
        Self {
            platform,
            os: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
            is_raspberry_pi: false,
            model: None,
        }
    }

    /// A Raspberry Pi host.
    pub fn raspberry_pi(model: impl Into<String>) -> Self {
        Self {
            platform: HostPlatform::Posix,
            os: "linux".to_string(),
            arch: "aarch64".to_string(),
            is_raspberry_pi: true,
            model: Some(model.into()),
        }
    }
}

/// Whether `/proc/cpuinfo` contents describe a Raspberry Pi.
pub fn is_raspberry_pi(cpuinfo: &str) -> bool {
    cpuinfo.contains("Raspberry Pi") || cpuinfo.contains("BCM")
}
