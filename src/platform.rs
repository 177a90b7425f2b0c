//! Where each operating system keeps its hosts file.

use crate::error::{HostsError, Result};
use std::path::PathBuf;

const UNIX_HOSTS: &str = "/etc/hosts";
const WINDOWS_HOSTS: &str = r"C:\Windows\System32\drivers\etc\hosts";

/// Operating systems with a known hosts file location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// Linux.
    Linux,
    /// macOS.
    MacOs,
    /// Windows.
    Windows,
}

impl Platform {
    /// Identifies a platform from an OS name such as
    /// [`std::env::consts::OS`] (`"linux"`, `"macos"`, `"windows"`).
    /// `"darwin"` is accepted for macOS; matching ignores case.
    ///
    /// # Errors
    ///
    /// Returns [`HostsError::PlatformNotSupported`] for any other name.
    pub fn from_os(os: &str) -> Result<Self> {
        match os.to_ascii_lowercase().as_str() {
            "linux" => Ok(Self::Linux),
            "macos" | "darwin" => Ok(Self::MacOs),
            "windows" => Ok(Self::Windows),
            _ => Err(HostsError::PlatformNotSupported { os: os.to_string() }),
        }
    }

    /// The platform this binary was built for.
    ///
    /// # Errors
    ///
    /// Returns [`HostsError::PlatformNotSupported`] on other targets.
    pub fn current() -> Result<Self> {
        Self::from_os(std::env::consts::OS)
    }

    /// The hosts file path on this platform.
    #[must_use]
    pub fn hosts_path(self) -> PathBuf {
        match self {
            Self::Linux | Self::MacOs => PathBuf::from(UNIX_HOSTS),
            Self::Windows => PathBuf::from(WINDOWS_HOSTS),
        }
    }
}

/// Resolves the hosts file path for an OS name.
///
/// # Errors
///
/// Returns [`HostsError::PlatformNotSupported`] for unknown OS names.
pub fn resolve_hosts_path(os: &str) -> Result<PathBuf> {
    let path = Platform::from_os(os)?.hosts_path();
    tracing::debug!(os = %os, path = %path.display(), "Resolved hosts file path");
    Ok(path)
}
