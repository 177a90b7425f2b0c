//! # etc-hosts
//!
//! Read, query, edit, and save the system hosts file (`/etc/hosts`, or
//! `C:\Windows\System32\drivers\etc\hosts` on Windows).
//!
//! [`HostsFile`] is an ordered list of [`HostEntry`] values bound to one
//! file. It reads the file on first use, supports index and range edits
//! alongside lookups by hostname, alias, or address, and writes back only
//! when asked, through an atomic replace with an optional backup.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use etc_hosts::{HostEntry, HostsFile, SaveOptions};
//! use std::net::Ipv4Addr;
//!
//! let mut hosts = HostsFile::new()?;
//!
//! // Query.
//! if let Some(entry) = hosts.find_one("localhost")? {
//!     println!("{entry}");
//! }
//!
//! // Edit.
//! hosts.add(
//!     HostEntry::new(Ipv4Addr::new(10, 0, 0, 5).into(), "db.internal").with_alias("db"),
//!     false,
//! )?;
//! hosts.remove("old.internal")?;
//!
//! // Save (requires root), keeping a timestamped copy of the old file.
//! hosts.save_with(SaveOptions::default().with_backup(true))?;
//! ```
//!
//! ## File format
//!
//! ```text
//! <address> <hostname> [<alias> ...] [# <comment>]
//! ```
//!
//! Blank lines, comment lines, and malformed lines are dropped on load
//! (malformed ones are reported through [`HostsFile::skipped`]). A save
//! writes one entry per line, preceded by a short "managed" comment block
//! unless [`SaveOptions::write_header`] is off.
//!
//! ## Permissions
//!
//! Writing the system hosts file requires root (Administrator on Windows).
//! The caller is responsible for privilege elevation; refusals surface as
//! [`HostsError::PermissionDenied`].

#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod codec;
pub mod config;
pub mod entry;
pub mod error;
pub mod hosts;
pub mod platform;
pub mod store;

pub use codec::{Line, format_entry, parse_line};
pub use config::SaveOptions;
pub use entry::HostEntry;
pub use error::{HostsError, ParseError, Result};
pub use hosts::{HostsFile, Member, SkippedLine};
pub use platform::{Platform, resolve_hosts_path};
