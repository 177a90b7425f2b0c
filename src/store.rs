//! Raw file access: whole-file reads and crash-safe replacement.
//!
//! Nothing here knows about entries; callers hand over finished text.

use crate::error::{HostsError, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Prefix for the temporary file written next to the target.
const TEMP_PREFIX: &str = ".etc-hosts-";

/// Timestamp format appended to backup file names.
const BACKUP_STAMP: &str = "%Y%m%dT%H%M%S%6f";

/// Permission bits for files that have no usable original to copy from.
#[cfg(unix)]
const DEFAULT_MODE: u32 = 0o644;

/// Reads the whole file, with `\r\n` line endings normalized to `\n`.
///
/// Bytes that are not valid UTF-8 are replaced with U+FFFD rather than
/// failing the read, so one badly encoded comment cannot hide every entry.
///
/// # Errors
///
/// Returns [`HostsError::NotFound`], [`HostsError::PermissionDenied`], or
/// [`HostsError::Io`] for any other failure.
pub fn read_raw(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).map_err(|e| HostsError::from_io(path, e))?;
    tracing::debug!(path = %path.display(), bytes = bytes.len(), "Read hosts file");
    let content = match String::from_utf8(bytes) {
        Ok(content) => content,
        Err(e) => {
            tracing::warn!(path = %path.display(), "Hosts file is not valid UTF-8, decoding lossily");
            String::from_utf8_lossy(e.as_bytes()).into_owned()
        }
    };
    if content.contains('\r') {
        Ok(content.replace("\r\n", "\n"))
    } else {
        Ok(content)
    }
}

/// Replaces the contents of `path` with `content`.
///
/// The text goes to a temporary file in the same directory, which is flushed
/// to disk and then renamed over `path`, so readers see either the old or the
/// new file and never a partial one. With `backup` set, an existing file is
/// first copied to a timestamped sibling (see [`backup_path`]); if that copy
/// fails nothing is written.
///
/// If `path` is a symlink, the file it points to is backed up and replaced
/// and the link itself is left in place.
///
/// Returns the backup path when one was written.
///
/// # Errors
///
/// Returns [`HostsError::BackupFailed`] if the backup copy fails, and
/// [`HostsError::PermissionDenied`] or [`HostsError::Io`] if the temporary
/// file cannot be written or moved into place.
pub fn write_atomic(path: &Path, content: &str, backup: bool) -> Result<Option<PathBuf>> {
    let target = resolve_target(path)?;
    let backup = (backup && target.exists()).then(|| backup_path(&target, chrono::Local::now()));
    write_atomic_with_backup(&target, content, backup.as_deref())?;
    Ok(backup)
}

/// Follows symlinks so the rename replaces the real file, not the link.
/// A path that does not exist yet is used as given.
fn resolve_target(path: &Path) -> Result<PathBuf> {
    match std::fs::symlink_metadata(path) {
        Ok(meta) if meta.file_type().is_symlink() => {
            let target = std::fs::canonicalize(path).map_err(|e| HostsError::from_io(path, e))?;
            tracing::debug!(path = %path.display(), target = %target.display(), "Following symlink");
            Ok(target)
        }
        _ => Ok(path.to_path_buf()),
    }
}

/// Builds `<file name>.<timestamp>.bak` next to `path`.
#[must_use]
pub fn backup_path<Tz>(path: &Path, at: chrono::DateTime<Tz>) -> PathBuf
where
    Tz: chrono::TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let name = path
        .file_name()
        .map_or(std::borrow::Cow::Borrowed("hosts"), |n| n.to_string_lossy());
    path.with_file_name(format!("{name}.{}.bak", at.format(BACKUP_STAMP)))
}

fn write_atomic_with_backup(path: &Path, content: &str, backup: Option<&Path>) -> Result<()> {
    if let Some(backup) = backup {
        std::fs::copy(path, backup).map_err(|source| HostsError::BackupFailed {
            path: backup.to_path_buf(),
            source,
        })?;
        tracing::info!(path = %path.display(), backup = %backup.display(), "Backed up hosts file");
    }

    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::Builder::new()
        .prefix(TEMP_PREFIX)
        .tempfile_in(dir)
        .map_err(|e| HostsError::from_io(path, e))?;

    tmp.write_all(content.as_bytes())
        .and_then(|()| tmp.as_file().sync_all())
        .and_then(|()| copy_permissions(path, &tmp))
        .map_err(|e| HostsError::from_io(path, e))?;

    // Dropping the returned file on failure removes the temporary.
    tmp.persist(path)
        .map_err(|e| HostsError::from_io(path, e.error))?;
    tracing::debug!(path = %path.display(), bytes = content.len(), "Replaced hosts file");
    Ok(())
}

/// Gives the temporary file the target's permissions, or a readable default.
#[cfg(unix)]
fn copy_permissions(path: &Path, tmp: &NamedTempFile) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mode = match std::fs::metadata(path) {
        Ok(meta) if meta.permissions().mode() & 0o002 != 0 => {
            tracing::warn!(
                path = %path.display(),
                "Hosts file is world-writable, saving with 0644 instead"
            );
            DEFAULT_MODE
        }
        Ok(meta) => meta.permissions().mode() & 0o7777,
        Err(_) => DEFAULT_MODE,
    };
    tmp.as_file()
        .set_permissions(std::fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn copy_permissions(path: &Path, tmp: &NamedTempFile) -> std::io::Result<()> {
    if let Ok(meta) = std::fs::metadata(path) {
        tmp.as_file().set_permissions(meta.permissions())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn leftovers(dir: &Path) -> Vec<String> {
        std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|n| n.starts_with(TEMP_PREFIX))
            .collect()
    }

    #[test]
    fn read_missing_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_raw(&dir.path().join("hosts")).unwrap_err();
        assert!(matches!(err, HostsError::NotFound { .. }));
    }

    #[test]
    fn read_normalizes_crlf() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hosts");
        std::fs::write(&path, "127.0.0.1 localhost\r\n::1 localhost6\r\n").unwrap();
        assert_eq!(read_raw(&path).unwrap(), "127.0.0.1 localhost\n::1 localhost6\n");
    }

    #[test]
    fn read_tolerates_invalid_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hosts");
        std::fs::write(&path, b"# caf\xe9\n127.0.0.1 localhost\n").unwrap();
        let content = read_raw(&path).unwrap();
        assert_eq!(content, "# caf\u{fffd}\n127.0.0.1 localhost\n");
    }

    #[test]
    fn write_creates_and_replaces() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hosts");

        assert_eq!(write_atomic(&path, "first\n", true).unwrap(), None);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "first\n");

        write_atomic(&path, "second\n", false).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "second\n");
        assert!(leftovers(dir.path()).is_empty());
    }

    #[test]
    fn backup_holds_previous_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hosts");
        std::fs::write(&path, "old\n").unwrap();

        let backup = write_atomic(&path, "new\n", true).unwrap().unwrap();
        assert_eq!(backup.parent(), Some(dir.path()));
        assert_eq!(std::fs::read_to_string(&backup).unwrap(), "old\n");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new\n");
    }

    #[test]
    fn backup_failure_leaves_original() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hosts");
        std::fs::write(&path, "old\n").unwrap();

        let unreachable = dir.path().join("missing-dir").join("hosts.bak");
        let err = write_atomic_with_backup(&path, "new\n", Some(&unreachable)).unwrap_err();
        assert!(matches!(err, HostsError::BackupFailed { .. }));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "old\n");
        assert!(leftovers(dir.path()).is_empty());
    }

    #[test]
    fn failed_replace_leaves_target_and_no_temp() {
        let dir = tempfile::tempdir().unwrap();
        // A non-empty directory cannot be replaced by a file.
        let target = dir.path().join("hosts");
        std::fs::create_dir(&target).unwrap();
        std::fs::write(target.join("keep"), "data").unwrap();

        assert!(write_atomic(&target, "new\n", false).is_err());
        assert_eq!(std::fs::read_to_string(target.join("keep")).unwrap(), "data");
        assert!(leftovers(dir.path()).is_empty());
    }

    #[test]
    fn write_failures_are_typed() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing").join("hosts");
        assert!(matches!(
            write_atomic(&missing, "new\n", false),
            Err(HostsError::NotFound { ref path }) if *path == missing
        ));
    }

    #[test]
    fn backup_name_carries_timestamp() {
        let at = chrono::Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        assert_eq!(
            backup_path(Path::new("/etc/hosts"), at),
            PathBuf::from("/etc/hosts.20240309T140507000000.bak")
        );
    }

    #[cfg(unix)]
    #[test]
    fn symlink_target_is_replaced_and_link_kept() {
        let dir = tempfile::tempdir().unwrap();
        let real_dir = dir.path().join("static");
        std::fs::create_dir(&real_dir).unwrap();
        let real = real_dir.join("hosts");
        std::fs::write(&real, "old\n").unwrap();
        let link = dir.path().join("hosts");
        std::os::unix::fs::symlink(&real, &link).unwrap();

        let backup = write_atomic(&link, "new\n", true).unwrap().unwrap();
        assert!(std::fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
        assert_eq!(std::fs::read_to_string(&real).unwrap(), "new\n");
        assert_eq!(std::fs::read_to_string(&backup).unwrap(), "old\n");
        assert_eq!(backup.parent(), Some(std::fs::canonicalize(&real_dir).unwrap().as_path()));
        assert!(leftovers(dir.path()).is_empty());
        assert!(leftovers(&real_dir).is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn keeps_original_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hosts");
        std::fs::write(&path, "old\n").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o640)).unwrap();

        write_atomic(&path, "new\n", false).unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o640);
    }

    #[cfg(unix)]
    #[test]
    fn new_file_is_world_readable() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hosts");
        write_atomic(&path, "new\n", false).unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o644);
    }
}
