//! Error types.

use std::net::IpAddr;
use std::path::PathBuf;
use thiserror::Error;

/// Result alias for hosts file operations.
pub type Result<T> = std::result::Result<T, HostsError>;

/// Why a single line could not be turned into an entry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The first field is not an IPv4 or IPv6 address.
    #[error("invalid address: {token:?}")]
    InvalidAddress {
        /// The offending field.
        token: String,
    },

    /// An address with no hostname after it.
    #[error("missing hostname after {address}")]
    MissingHostname {
        /// The address that was parsed.
        address: IpAddr,
    },

    /// The line is blank or a comment.
    #[error("line is blank or a comment")]
    NotAnEntry,
}

/// Errors returned by hosts file operations.
#[derive(Debug, Error)]
pub enum HostsError {
    /// Filesystem I/O failed for a reason other than the ones below.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The hosts file does not exist.
    #[error("hosts file not found: {}", path.display())]
    NotFound {
        /// The path that was read.
        path: PathBuf,
    },

    /// The OS refused access (typically writing `/etc/hosts` without root).
    #[error("permission denied: {}", path.display())]
    PermissionDenied {
        /// The path that was accessed.
        path: PathBuf,
    },

    /// The backup copy could not be written; the hosts file was not touched.
    #[error("failed to back up to {}: {source}", path.display())]
    BackupFailed {
        /// The backup destination.
        path: PathBuf,
        /// The underlying failure.
        source: std::io::Error,
    },

    /// `add` found an entry sharing the address or a name.
    #[error("entry conflicts with existing entry: {existing}")]
    DuplicateEntry {
        /// The conflicting entry, formatted as a hosts line.
        existing: String,
    },

    /// No hosts file location is known for this OS.
    #[error("platform {os:?} is not supported (supported: linux, macos, windows)")]
    PlatformNotSupported {
        /// The OS identity that was looked up.
        os: String,
    },

    /// Positional access past the end of the collection.
    #[error("index {index} out of range for {len} entries")]
    IndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Current number of entries.
        len: usize,
    },

    /// Range access outside the collection or with `start > end`.
    #[error("range {start}..{end} out of range for {len} entries")]
    InvalidRange {
        /// Range start.
        start: usize,
        /// Range end (exclusive).
        end: usize,
        /// Current number of entries.
        len: usize,
    },

    /// Name lookup found nothing.
    #[error("no entry named {name:?}")]
    NoSuchEntry {
        /// The name that was looked up.
        name: String,
    },

    /// An entry that cannot be written as a single hosts line.
    #[error("invalid entry: {0}")]
    InvalidEntry(String),

    /// A line failed to parse.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
}

impl HostsError {
    /// Returns `true` if the failure was an OS permission refusal.
    #[must_use]
    pub fn is_permission_denied(&self) -> bool {
        match self {
            Self::PermissionDenied { .. } => true,
            Self::Io(e) | Self::BackupFailed { source: e, .. } => {
                e.kind() == std::io::ErrorKind::PermissionDenied
            }
            _ => false,
        }
    }

    /// Maps an I/O error on `path` to the matching typed variant.
    pub(crate) fn from_io(path: &std::path::Path, err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound {
                path: path.to_path_buf(),
            },
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied {
                path: path.to_path_buf(),
            },
            _ => Self::Io(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error, ErrorKind};
    use std::path::Path;

    #[test]
    fn from_io_maps_kinds() {
        let p = Path::new("/etc/hosts");
        assert!(matches!(
            HostsError::from_io(p, Error::from(ErrorKind::NotFound)),
            HostsError::NotFound { .. }
        ));
        assert!(HostsError::from_io(p, Error::from(ErrorKind::PermissionDenied))
            .is_permission_denied());
        assert!(matches!(
            HostsError::from_io(p, Error::other("boom")),
            HostsError::Io(_)
        ));
    }

    #[test]
    fn backup_failure_reports_permission() {
        let err = HostsError::BackupFailed {
            path: "/etc/hosts.bak".into(),
            source: Error::from(ErrorKind::PermissionDenied),
        };
        assert!(err.is_permission_denied());
        assert!(err.to_string().contains("/etc/hosts.bak"));
    }
}
