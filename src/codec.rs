//! Conversion between hosts file lines and [`HostEntry`] values.
//!
//! ```text
//! <address> <hostname> [<alias> ...] [# <comment>]
//! ```
//!
//! Fields are separated by runs of spaces or tabs. Everything after the first
//! `#` is the comment; there is no escape for a literal `#`.

use crate::entry::HostEntry;
use crate::error::ParseError;
use std::fmt::Write;
use std::net::IpAddr;

/// Comment delimiter.
pub const COMMENT: char = '#';

/// A classified line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    /// A record.
    Entry(HostEntry),
    /// A blank or comment-only line, as read (minus the line terminator).
    PassThrough(String),
}

/// Parses one line.
///
/// Blank lines and lines whose first non-space character is `#` become
/// [`Line::PassThrough`].
///
/// # Errors
///
/// Returns [`ParseError::InvalidAddress`] if the first field is not an IP
/// address, or [`ParseError::MissingHostname`] if nothing follows it.
pub fn parse_line(line: &str) -> Result<Line, ParseError> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with(COMMENT) {
        return Ok(Line::PassThrough(
            line.trim_end_matches(['\r', '\n']).to_string(),
        ));
    }

    let (body, comment) = match trimmed.split_once(COMMENT) {
        Some((body, comment)) => (body, Some(comment)),
        None => (trimmed, None),
    };

    let mut fields = body.split_whitespace();
    let token = fields.next().unwrap_or_default();
    let address: IpAddr = token.parse().map_err(|_| ParseError::InvalidAddress {
        token: token.to_string(),
    })?;
    let hostname = fields
        .next()
        .ok_or(ParseError::MissingHostname { address })?;

    let mut entry = HostEntry::new(address, hostname).with_aliases(fields);
    if let Some(comment) = comment {
        entry = entry.with_comment(comment);
    }
    Ok(Line::Entry(entry))
}

/// Formats an entry as a single line without a terminator.
///
/// Fields are joined by one space, the address in its canonical form
/// (compressed for IPv6), and the comment, if any, follows `" # "`.
#[must_use]
pub fn format_entry(entry: &HostEntry) -> String {
    let mut line = format!("{} {}", entry.address(), entry.hostname());
    for alias in entry.aliases() {
        line.push(' ');
        line.push_str(alias);
    }
    if let Some(comment) = entry.comment() {
        let _ = write!(line, " {COMMENT} {comment}");
    }
    line
}
