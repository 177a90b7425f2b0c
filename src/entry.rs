//! A single hosts file record.

use crate::codec::{self, Line};
use crate::error::{HostsError, ParseError, Result};
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

/// One `<address> <hostname> [<alias> ...] [# <comment>]` line.
///
/// Entries are values: once built they are never modified in place. A
/// collection "edits" an entry by replacing it at its position.
///
/// # Example
///
/// ```
/// use etc_hosts::HostEntry;
/// use std::net::Ipv4Addr;
///
/// let entry = HostEntry::new(Ipv4Addr::LOCALHOST.into(), "localhost")
///     .with_alias("localhost.localdomain")
///     .with_comment("loopback");
///
/// assert_eq!(entry.hostname(), "localhost");
/// assert!(entry.matches("LOCALHOST.localdomain"));
/// assert_eq!(
///     entry.to_string(),
///     "127.0.0.1 localhost localhost.localdomain # loopback"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HostEntry {
    address: IpAddr,
    hostname: String,
    aliases: Vec<String>,
    comment: Option<String>,
}

impl HostEntry {
    /// Creates an entry with no aliases and no comment.
    #[must_use]
    pub fn new(address: IpAddr, hostname: impl Into<String>) -> Self {
        Self {
            address,
            hostname: hostname.into(),
            aliases: Vec::new(),
            comment: None,
        }
    }

    /// Appends one alias.
    #[must_use]
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// Appends several aliases, keeping their order.
    #[must_use]
    pub fn with_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases.extend(aliases.into_iter().map(Into::into));
        self
    }

    /// Sets the trailing comment. Surrounding whitespace is trimmed and an
    /// empty comment is treated as none, matching what parsing produces.
    #[must_use]
    pub fn with_comment(mut self, comment: impl AsRef<str>) -> Self {
        let comment = comment.as_ref().trim();
        self.comment = (!comment.is_empty()).then(|| comment.to_string());
        self
    }

    /// The address, IPv4 or IPv6.
    #[must_use]
    pub const fn address(&self) -> IpAddr {
        self.address
    }

    /// The canonical hostname.
    #[must_use]
    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    /// Secondary names, in file order.
    #[must_use]
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// Text after `#` on the same line, if any.
    #[must_use]
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// The hostname followed by every alias.
    pub fn all_names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.hostname.as_str()).chain(self.aliases.iter().map(String::as_str))
    }

    /// Returns `true` if `query` names this entry.
    ///
    /// A query matches when it equals the hostname or an alias ignoring ASCII
    /// case, or the address in its canonical form (compressed for IPv6).
    #[must_use]
    pub fn matches(&self, query: &str) -> bool {
        query.eq_ignore_ascii_case(&self.address.to_string())
            || self.all_names().any(|name| name.eq_ignore_ascii_case(query))
    }

    /// Returns `true` if `other` has the same address or shares any name.
    #[must_use]
    pub fn conflicts_with(&self, other: &Self) -> bool {
        self.address == other.address
            || self
                .all_names()
                .any(|a| other.all_names().any(|b| a.eq_ignore_ascii_case(b)))
    }

    /// Checks that the entry can be written as one hosts line and read back
    /// unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`HostsError::InvalidEntry`] if a name is empty or contains
    /// whitespace or `#`, or if the comment spans several lines.
    pub fn validate(&self) -> Result<()> {
        for name in self.all_names() {
            if name.is_empty() {
                return Err(HostsError::InvalidEntry("empty hostname or alias".into()));
            }
            if name.contains(|c: char| c.is_whitespace() || c == codec::COMMENT) {
                return Err(HostsError::InvalidEntry(format!(
                    "name {name:?} contains whitespace or '#'"
                )));
            }
        }
        if let Some(comment) = &self.comment {
            if comment.contains(['\n', '\r']) {
                return Err(HostsError::InvalidEntry(
                    "comment must fit on one line".into(),
                ));
            }
        }
        Ok(())
    }
}

impl fmt::Display for HostEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&codec::format_entry(self))
    }
}

impl FromStr for HostEntry {
    type Err = ParseError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match codec::parse_line(s)? {
            Line::Entry(entry) => Ok(entry),
            Line::PassThrough(_) => Err(ParseError::NotAnEntry),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{Ipv4Addr, Ipv6Addr};

    fn server() -> HostEntry {
        HostEntry::new(Ipv4Addr::new(10, 0, 0, 1).into(), "myhost").with_aliases(["mh", "host1"])
    }

    #[test]
    fn new_sets_defaults() {
        let e = HostEntry::new(Ipv4Addr::LOCALHOST.into(), "localhost");
        assert_eq!(e.hostname(), "localhost");
        assert!(e.aliases().is_empty());
        assert_eq!(e.comment(), None);
    }

    #[test]
    fn all_names_lists_hostname_first() {
        assert_eq!(server().all_names().collect::<Vec<_>>(), ["myhost", "mh", "host1"]);
    }

    #[test]
    fn matches_names_and_address() {
        let e = server();
        assert!(e.matches("10.0.0.1"));
        assert!(e.matches("myhost"));
        assert!(e.matches("MH"));
        assert!(e.matches("host1"));
        assert!(!e.matches("notfound"));
        assert!(!e.matches("myhost.example"));
    }

    #[test]
    fn matches_only_canonical_address() {
        let e = HostEntry::new(Ipv6Addr::LOCALHOST.into(), "localhost6");
        assert!(e.matches("::1"));
        assert!(!e.matches("0:0:0:0:0:0:0:1"));
        assert!(!e.matches("0000:0000:0000:0000:0000:0000:0000:0001"));

        let link = HostEntry::new("fe80::1".parse().unwrap(), "link");
        assert!(link.matches("FE80::1"));
    }

    #[test]
    fn empty_comment_is_none() {
        assert_eq!(server().with_comment("   ").comment(), None);
        assert_eq!(server().with_comment(" prod ").comment(), Some("prod"));
    }

    #[test]
    fn conflicts_by_address_or_name() {
        let e = server();
        assert!(e.conflicts_with(&HostEntry::new(Ipv4Addr::new(10, 0, 0, 1).into(), "other")));
        assert!(e.conflicts_with(&HostEntry::new(Ipv4Addr::new(10, 0, 0, 2).into(), "HOST1")));
        assert!(!e.conflicts_with(&HostEntry::new(Ipv4Addr::new(10, 0, 0, 2).into(), "other")));
    }

    #[test]
    fn validate_rejects_unwritable_names() {
        assert!(server().validate().is_ok());
        let ip: IpAddr = Ipv4Addr::LOCALHOST.into();
        assert!(HostEntry::new(ip, "").validate().is_err());
        assert!(HostEntry::new(ip, "two words").validate().is_err());
        assert!(HostEntry::new(ip, "a").with_alias("b#c").validate().is_err());
        assert!(HostEntry::new(ip, "a").with_comment("x\ny").validate().is_err());
    }

    #[test]
    fn parses_from_str() {
        let e: HostEntry = "192.168.1.1 server1 srv1 # my server".parse().unwrap();
        assert_eq!(e.address(), IpAddr::from([192, 168, 1, 1]));
        assert_eq!(e.aliases(), ["srv1"]);
        assert_eq!(e.comment(), Some("my server"));
        assert_eq!("# only".parse::<HostEntry>(), Err(ParseError::NotAnEntry));
    }
}
