//! The in-memory view of a hosts file.
//!
//! [`HostsFile`] reads the file lazily on first use, offers list-style and
//! name-based access to its entries, and writes them back only when asked.

use crate::codec::{self, Line};
use crate::config::SaveOptions;
use crate::entry::HostEntry;
use crate::error::{HostsError, ParseError, Result};
use crate::platform::Platform;
use crate::store;
use std::fmt;
use std::ops::{Bound, Range, RangeBounds};
use std::path::{Path, PathBuf};

/// Comment block written at the top of saved files.
const MANAGED_HEADER: &str = "# Managed by etc-hosts.\n# Manual edits may be lost on the next save.\n\n";

/// A line that looked like an entry but failed to parse during the last load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLine {
    /// 1-based line number.
    pub line_number: usize,
    /// The line as read.
    pub text: String,
    /// Why it was rejected.
    pub error: ParseError,
}

/// Something to test membership for: a query or a whole entry.
#[derive(Debug, Clone, Copy)]
pub enum Member<'a> {
    /// Matched like [`HostsFile::find`].
    Query(&'a str),
    /// Compared for equality.
    Entry(&'a HostEntry),
}

impl<'a> From<&'a str> for Member<'a> {
    fn from(query: &'a str) -> Self {
        Self::Query(query)
    }
}

impl<'a> From<&'a String> for Member<'a> {
    fn from(query: &'a String) -> Self {
        Self::Query(query)
    }
}

impl<'a> From<&'a HostEntry> for Member<'a> {
    fn from(entry: &'a HostEntry) -> Self {
        Self::Entry(entry)
    }
}

/// An ordered, editable list of hosts entries bound to one file.
///
/// # Loading
///
/// Nothing is read at construction. The first operation that needs the
/// entries loads the file; [`load`](Self::load) re-reads it explicitly and
/// discards unsaved changes. Because any access may trigger that first read,
/// accessors take `&mut self` and return [`Result`].
///
/// Blank lines, comment lines, and malformed lines are not kept. Malformed
/// lines are logged and listed by [`skipped`](Self::skipped).
///
/// # Saving
///
/// [`save`](Self::save) writes the entries in their current order, one per
/// line, through an atomic replace. It never re-reads the file first.
///
/// # Example
///
/// ```rust,ignore
/// use etc_hosts::{HostEntry, HostsFile};
/// use std::net::Ipv4Addr;
///
/// let mut hosts = HostsFile::new()?;
/// hosts.add(HostEntry::new(Ipv4Addr::new(10, 0, 0, 5).into(), "db.internal"), false)?;
/// assert!(hosts.contains("db.internal")?);
/// hosts.save()?; // requires root
/// ```
pub struct HostsFile {
    path: PathBuf,
    entries: Vec<HostEntry>,
    skipped: Vec<SkippedLine>,
    loaded: bool,
    create_if_missing: bool,
}

impl HostsFile {
    /// Binds to this platform's system hosts file.
    ///
    /// # Errors
    ///
    /// Returns [`HostsError::PlatformNotSupported`] if the OS has no known
    /// hosts file location.
    pub fn new() -> Result<Self> {
        Ok(Self::at(Platform::current()?.hosts_path()))
    }

    /// Binds to a custom path (useful for testing).
    #[must_use]
    pub fn at(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        tracing::debug!(path = %path.display(), "Opened hosts file");
        Self {
            path,
            entries: Vec::new(),
            skipped: Vec::new(),
            loaded: false,
            create_if_missing: false,
        }
    }

    /// Treats a missing file as empty instead of failing with
    /// [`HostsError::NotFound`]. The file is created on the next save.
    #[must_use]
    pub const fn create_if_missing(mut self, create: bool) -> Self {
        self.create_if_missing = create;
        self
    }

    /// Returns the bound file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns `true` once the file has been read.
    #[must_use]
    pub const fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Malformed lines seen by the last load.
    #[must_use]
    pub fn skipped(&self) -> &[SkippedLine] {
        &self.skipped
    }

    /// Reads the file, replacing the in-memory entries.
    ///
    /// On failure the previous entries and load state are kept.
    ///
    /// # Errors
    ///
    /// Returns [`HostsError::NotFound`] (unless
    /// [`create_if_missing`](Self::create_if_missing) is set),
    /// [`HostsError::PermissionDenied`], or [`HostsError::Io`].
    pub fn load(&mut self) -> Result<()> {
        let content = match store::read_raw(&self.path) {
            Ok(content) => content,
            Err(HostsError::NotFound { .. }) if self.create_if_missing => {
                tracing::warn!(path = %self.path.display(), "Hosts file not found, starting empty");
                String::new()
            }
            Err(e) => return Err(e),
        };

        let (entries, skipped) = parse_content(&content);
        tracing::info!(
            path = %self.path.display(),
            entries = entries.len(),
            skipped = skipped.len(),
            "Loaded hosts file"
        );
        self.entries = entries;
        self.skipped = skipped;
        self.loaded = true;
        Ok(())
    }

    fn ensure_loaded(&mut self) -> Result<()> {
        if self.loaded {
            return Ok(());
        }
        self.load()
    }

    /// Writes the entries back with the default [`SaveOptions`]: managed
    /// header, no backup.
    ///
    /// # Errors
    ///
    /// See [`save_with`](Self::save_with).
    pub fn save(&mut self) -> Result<Option<PathBuf>> {
        self.save_with(SaveOptions::default())
    }

    /// Writes the entries back to the bound path.
    ///
    /// If nothing has been loaded yet the file is loaded first, so an
    /// untouched collection never truncates the file. Returns the backup
    /// path when one was written.
    ///
    /// # Errors
    ///
    /// Returns [`HostsError::BackupFailed`] if the backup copy fails (the
    /// file is left untouched), or the I/O error from writing or replacing
    /// the file.
    pub fn save_with(&mut self, options: SaveOptions) -> Result<Option<PathBuf>> {
        let path = self.path.clone();
        self.save_as(&path, options)
    }

    /// Writes the entries to another path. The collection stays bound to
    /// its own path.
    ///
    /// # Errors
    ///
    /// Same as [`save_with`](Self::save_with).
    pub fn save_as(&mut self, path: &Path, options: SaveOptions) -> Result<Option<PathBuf>> {
        self.ensure_loaded()?;
        let content = render(&self.entries, options.write_header);
        let backup = store::write_atomic(path, &content, options.backup)?;
        tracing::info!(
            path = %path.display(),
            entries = self.entries.len(),
            backup = backup.is_some(),
            "Saved hosts file"
        );
        Ok(backup)
    }

    /// Returns every entry matching `query`, in file order.
    ///
    /// A query matches an entry's hostname or any alias ignoring ASCII case,
    /// or its address. No match is an empty vec, not an error.
    ///
    /// # Errors
    ///
    /// Returns the load error if the file had to be read and could not be.
    pub fn find(&mut self, query: &str) -> Result<Vec<&HostEntry>> {
        self.ensure_loaded()?;
        Ok(self.entries.iter().filter(|e| e.matches(query)).collect())
    }

    /// Returns the first entry matching `query`.
    ///
    /// # Errors
    ///
    /// Returns the load error if the file had to be read and could not be.
    pub fn find_one(&mut self, query: &str) -> Result<Option<&HostEntry>> {
        self.ensure_loaded()?;
        Ok(self.entries.iter().find(|e| e.matches(query)))
    }

    /// Looks up an entry by hostname, alias, or address. Same as
    /// [`find_one`](Self::find_one), but absence is an error.
    ///
    /// # Errors
    ///
    /// Returns [`HostsError::NoSuchEntry`] if nothing matches.
    pub fn get_by_name(&mut self, name: &str) -> Result<&HostEntry> {
        self.find_one(name)?.ok_or_else(|| HostsError::NoSuchEntry {
            name: name.to_string(),
        })
    }

    /// Appends an entry.
    ///
    /// Unless `allow_duplicates` is set, an entry conflicts with any
    /// existing one that has the same address or shares a name (ignoring
    /// case).
    ///
    /// # Errors
    ///
    /// Returns [`HostsError::InvalidEntry`] if the entry cannot be written
    /// back, or [`HostsError::DuplicateEntry`] on conflict. The collection
    /// is unchanged on error.
    pub fn add(&mut self, entry: HostEntry, allow_duplicates: bool) -> Result<()> {
        entry.validate()?;
        self.ensure_loaded()?;

        if !allow_duplicates {
            if let Some(existing) = self.entries.iter().find(|e| e.conflicts_with(&entry)) {
                tracing::debug!(%entry, %existing, "Rejected duplicate hosts entry");
                return Err(HostsError::DuplicateEntry {
                    existing: existing.to_string(),
                });
            }
        }

        tracing::debug!(%entry, "Added hosts entry");
        self.entries.push(entry);
        Ok(())
    }

    /// Removes every entry matching `query` and returns how many went.
    ///
    /// # Errors
    ///
    /// Returns the load error if the file had to be read and could not be.
    pub fn remove(&mut self, query: &str) -> Result<usize> {
        self.ensure_loaded()?;
        let before = self.entries.len();
        self.entries.retain(|e| !e.matches(query));
        let removed = before - self.entries.len();
        tracing::info!(query = %query, removed = removed, "Removed hosts entries");
        Ok(removed)
    }

    /// Number of entries.
    ///
    /// # Errors
    ///
    /// Returns the load error if the file had to be read and could not be.
    pub fn len(&mut self) -> Result<usize> {
        self.ensure_loaded()?;
        Ok(self.entries.len())
    }

    /// Returns `true` if there are no entries.
    ///
    /// # Errors
    ///
    /// Returns the load error if the file had to be read and could not be.
    pub fn is_empty(&mut self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// All entries in order.
    ///
    /// # Errors
    ///
    /// Returns the load error if the file had to be read and could not be.
    pub fn entries(&mut self) -> Result<&[HostEntry]> {
        self.ensure_loaded()?;
        Ok(&self.entries)
    }

    /// Iterates over the entries present now. The borrow keeps the
    /// collection from changing until the iterator is dropped.
    ///
    /// # Errors
    ///
    /// Returns the load error if the file had to be read and could not be.
    pub fn iter(&mut self) -> Result<std::slice::Iter<'_, HostEntry>> {
        Ok(self.entries()?.iter())
    }

    /// Entry at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`HostsError::IndexOutOfRange`] past the end.
    pub fn get(&mut self, index: usize) -> Result<&HostEntry> {
        self.ensure_loaded()?;
        let len = self.entries.len();
        self.entries
            .get(index)
            .ok_or(HostsError::IndexOutOfRange { index, len })
    }

    /// Entries in `range`.
    ///
    /// # Errors
    ///
    /// Returns [`HostsError::InvalidRange`] if the range reaches past the end
    /// or starts after it ends.
    pub fn get_range(&mut self, range: impl RangeBounds<usize>) -> Result<&[HostEntry]> {
        self.ensure_loaded()?;
        let range = checked_range(&range, self.entries.len())?;
        Ok(&self.entries[range])
    }

    /// Replaces the entry at `index`, returning the old one.
    ///
    /// # Errors
    ///
    /// Returns [`HostsError::InvalidEntry`] or
    /// [`HostsError::IndexOutOfRange`].
    pub fn set(&mut self, index: usize, entry: HostEntry) -> Result<HostEntry> {
        entry.validate()?;
        self.ensure_loaded()?;
        let len = self.entries.len();
        let slot = self
            .entries
            .get_mut(index)
            .ok_or(HostsError::IndexOutOfRange { index, len })?;
        Ok(std::mem::replace(slot, entry))
    }

    /// Inserts `entry` before `index`; `index == len` appends. No duplicate
    /// check is made.
    ///
    /// # Errors
    ///
    /// Returns [`HostsError::InvalidEntry`] or
    /// [`HostsError::IndexOutOfRange`] if `index > len`.
    pub fn insert(&mut self, index: usize, entry: HostEntry) -> Result<()> {
        entry.validate()?;
        self.ensure_loaded()?;
        let len = self.entries.len();
        if index > len {
            return Err(HostsError::IndexOutOfRange { index, len });
        }
        self.entries.insert(index, entry);
        Ok(())
    }

    /// Removes and returns the entry at `index`; later entries shift down.
    ///
    /// # Errors
    ///
    /// Returns [`HostsError::IndexOutOfRange`] past the end.
    pub fn delete(&mut self, index: usize) -> Result<HostEntry> {
        self.ensure_loaded()?;
        let len = self.entries.len();
        if index >= len {
            return Err(HostsError::IndexOutOfRange { index, len });
        }
        Ok(self.entries.remove(index))
    }

    /// Removes and returns the entries in `range`.
    ///
    /// # Errors
    ///
    /// Returns [`HostsError::InvalidRange`] for an out-of-bounds range.
    pub fn delete_range(&mut self, range: impl RangeBounds<usize>) -> Result<Vec<HostEntry>> {
        self.splice(range, std::iter::empty())
    }

    /// Replaces the entries in `range` with `replacement` and returns the
    /// removed ones. The replacement may be longer or shorter than the range.
    ///
    /// # Errors
    ///
    /// Returns [`HostsError::InvalidRange`] or [`HostsError::InvalidEntry`];
    /// nothing changes on error.
    pub fn splice<I>(&mut self, range: impl RangeBounds<usize>, replacement: I) -> Result<Vec<HostEntry>>
    where
        I: IntoIterator<Item = HostEntry>,
    {
        let replacement: Vec<HostEntry> = replacement.into_iter().collect();
        for entry in &replacement {
            entry.validate()?;
        }
        self.ensure_loaded()?;
        let range = checked_range(&range, self.entries.len())?;
        Ok(self.entries.splice(range, replacement).collect())
    }

    /// Returns `true` if a query matches any entry, or an entry is present.
    ///
    /// ```rust,ignore
    /// hosts.contains("localhost")?;
    /// hosts.contains(&entry)?;
    /// ```
    ///
    /// # Errors
    ///
    /// Returns the load error if the file had to be read and could not be.
    pub fn contains<'a>(&mut self, item: impl Into<Member<'a>>) -> Result<bool> {
        self.ensure_loaded()?;
        Ok(match item.into() {
            Member::Query(query) => self.entries.iter().any(|e| e.matches(query)),
            Member::Entry(entry) => self.entries.contains(entry),
        })
    }
}

impl fmt::Debug for HostsFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_struct("HostsFile");
        d.field("path", &self.path);
        if self.loaded {
            d.field("entries", &self.entries.len());
        } else {
            d.field("loaded", &false);
        }
        d.finish()
    }
}

impl fmt::Display for HostsFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "hosts file: {}", self.path.display())
    }
}

// ---------------------------------------------------------------------------
// Content helpers
// ---------------------------------------------------------------------------

/// Splits file content into entries and rejected lines.
fn parse_content(content: &str) -> (Vec<HostEntry>, Vec<SkippedLine>) {
    let mut entries = Vec::new();
    let mut skipped = Vec::new();
    for (i, text) in content.lines().enumerate() {
        match codec::parse_line(text) {
            Ok(Line::Entry(entry)) => entries.push(entry),
            Ok(Line::PassThrough(_)) => {}
            Err(error) => {
                tracing::warn!(line = i + 1, error = %error, "Skipping malformed hosts line");
                skipped.push(SkippedLine {
                    line_number: i + 1,
                    text: text.to_string(),
                    error,
                });
            }
        }
    }
    (entries, skipped)
}

/// Generates file content.
///
/// ```text
/// # Managed by etc-hosts.
/// # Manual edits may be lost on the next save.
///
/// 127.0.0.1 localhost
/// ::1 localhost6 ip6-localhost
/// ```
fn render(entries: &[HostEntry], write_header: bool) -> String {
    let mut out = String::new();
    if write_header {
        out.push_str(MANAGED_HEADER);
    }
    for entry in entries {
        out.push_str(&codec::format_entry(entry));
        out.push('\n');
    }
    out
}

/// Resolves `range` against `len`, rejecting anything out of bounds.
fn checked_range(range: &impl RangeBounds<usize>, len: usize) -> Result<Range<usize>> {
    let start = match range.start_bound() {
        Bound::Included(&s) => s,
        Bound::Excluded(&s) => s.saturating_add(1),
        Bound::Unbounded => 0,
    };
    let end = match range.end_bound() {
        Bound::Included(&e) => e.saturating_add(1),
        Bound::Excluded(&e) => e,
        Bound::Unbounded => len,
    };
    if start > end || end > len {
        return Err(HostsError::InvalidRange { start, end, len });
    }
    Ok(start..end)
}
