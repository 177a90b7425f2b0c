//! Save configuration.

/// Options for [`HostsFile::save_with`](crate::HostsFile::save_with).
///
/// # Example
///
/// ```
/// use etc_hosts::SaveOptions;
///
/// let opts = SaveOptions::default().with_backup(true);
///
/// assert!(opts.backup);
/// assert!(opts.write_header);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveOptions {
    /// Copy the current file to a timestamped sibling before replacing it.
    pub backup: bool,

    /// Start the file with a comment block marking it as managed.
    pub write_header: bool,
}

impl SaveOptions {
    /// Overrides the backup flag.
    #[must_use]
    pub const fn with_backup(mut self, backup: bool) -> Self {
        self.backup = backup;
        self
    }

    /// Overrides the header flag.
    #[must_use]
    pub const fn with_header(mut self, write_header: bool) -> Self {
        self.write_header = write_header;
        self
    }
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self {
            backup: false,
            write_header: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_writes_header_without_backup() {
        let o = SaveOptions::default();
        assert!(!o.backup);
        assert!(o.write_header);
    }

    #[test]
    fn builders_override() {
        let o = SaveOptions::default().with_backup(true).with_header(false);
        assert!(o.backup);
        assert!(!o.write_header);
    }
}
