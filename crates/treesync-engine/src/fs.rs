//! Filesystem abstraction used by the reconciliation phases
//!
//! The engine only touches the filesystem through [`FileSystem`]. Every call
//! opens what it needs and releases it before returning, and every failure
//! comes back as a [`treesync_types::Error`] already classified by kind.

use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::Path;
use std::time::SystemTime;

use filetime::FileTime;
use treesync_types::{Error, FileStat, Result};

use crate::digest::ContentDigest;
use crate::walker::TreeWalker;

const COPY_BUFFER_SIZE: usize = 64 * 1024;

/// Operations the engine needs from a filesystem
pub trait FileSystem {
    /// Walk the tree rooted at `root`
    fn walk(&self, root: &Path) -> TreeWalker;

    /// Metadata of `path`, following symlinks; `Ok(None)` if it does not exist
    fn stat(&self, path: &Path) -> Result<Option<FileStat>>;

    /// Digest of the full content of `path`
    fn digest(&self, path: &Path) -> Result<ContentDigest>;

    /// Create `path` and all missing parents
    fn create_dir_all(&self, path: &Path) -> Result<()>;

    /// Copy `source` over `destination`, flush it to storage, then stamp it
    /// with `modified`. Returns the number of bytes written.
    fn copy_file(&self, source: &Path, destination: &Path, modified: SystemTime) -> Result<u64>;

    /// Remove a single file
    fn remove_file(&self, path: &Path) -> Result<()>;
}

impl<F: FileSystem + ?Sized> FileSystem for &F {
    fn walk(&self, root: &Path) -> TreeWalker {
        (**self).walk(root)
    }

    fn stat(&self, path: &Path) -> Result<Option<FileStat>> {
        (**self).stat(path)
    }

    fn digest(&self, path: &Path) -> Result<ContentDigest> {
        (**self).digest(path)
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        (**self).create_dir_all(path)
    }

    fn copy_file(&self, source: &Path, destination: &Path, modified: SystemTime) -> Result<u64> {
        (**self).copy_file(source, destination, modified)
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        (**self).remove_file(path)
    }
}

/// The local filesystem
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalFs;

impl LocalFs {
    /// Create a handle to the local filesystem
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for LocalFs {
    fn walk(&self, root: &Path) -> TreeWalker {
        TreeWalker::new(root)
    }

    fn stat(&self, path: &Path) -> Result<Option<FileStat>> {
        let metadata = match fs::metadata(path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            // A file where a directory is expected: nothing can exist below it
            Err(e) if e.kind() != io::ErrorKind::PermissionDenied && under_non_directory(path) => {
                return Ok(None)
            }
            Err(e) => return Err(Error::io(path, &e)),
        };
        let modified = metadata.modified().map_err(|e| Error::io(path, &e))?;

        Ok(Some(FileStat {
            size: metadata.len(),
            modified,
            is_file: metadata.is_file(),
        }))
    }

    fn digest(&self, path: &Path) -> Result<ContentDigest> {
        ContentDigest::from_file(path).map_err(|e| Error::io(path, &e))
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path).map_err(|e| Error::io(path, &e))
    }

    fn copy_file(&self, source: &Path, destination: &Path, modified: SystemTime) -> Result<u64> {
        let mut reader = File::open(source).map_err(|e| Error::io(source, &e))?;
        let mut writer = File::create(destination).map_err(|e| Error::io(destination, &e))?;

        let mut buffer = vec![0u8; COPY_BUFFER_SIZE];
        let mut bytes_copied = 0u64;
        loop {
            let bytes_read = match reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(Error::io(source, &e)),
            };
            writer
                .write_all(&buffer[..bytes_read])
                .map_err(|e| Error::io(destination, &e))?;
            bytes_copied += bytes_read as u64;
        }

        // Data must be durable before the timestamp is adjusted
        writer.sync_all().map_err(|e| Error::io(destination, &e))?;

        let mtime = FileTime::from_system_time(modified);
        filetime::set_file_handle_times(&writer, Some(mtime), Some(mtime))
            .map_err(|e| Error::io(destination, &e))?;

        Ok(bytes_copied)
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        fs::remove_file(path).map_err(|e| Error::io(path, &e))
    }
}

/// Whether the nearest existing ancestor of `path` is something other than
/// a directory
fn under_non_directory(path: &Path) -> bool {
    path.ancestors()
        .skip(1)
        .find_map(|ancestor| fs::metadata(ancestor).ok())
        .is_some_and(|metadata| !metadata.is_dir())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;
    use treesync_types::ErrorKind;

    #[test]
    fn test_stat_missing_is_none() {
        let temp_dir = TempDir::new().unwrap();
        assert_eq!(LocalFs.stat(&temp_dir.path().join("missing")).unwrap(), None);
    }

    #[test]
    fn test_stat_below_regular_file_is_none() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("a");
        fs::write(&file, b"a file, not a directory").unwrap();

        assert_eq!(LocalFs.stat(&file.join("b.txt")).unwrap(), None);
        assert_eq!(LocalFs.stat(&file.join("b/c.txt")).unwrap(), None);
    }

    #[test]
    fn test_stat_directory_is_not_file() {
        let temp_dir = TempDir::new().unwrap();
        let stat = LocalFs.stat(temp_dir.path()).unwrap().unwrap();
        assert!(!stat.is_file);
    }

    #[test]
    fn test_copy_file_preserves_content_and_mtime() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("source.txt");
        let destination = temp_dir.path().join("destination.txt");
        fs::write(&source, b"hello treesync").unwrap();
        let modified = SystemTime::UNIX_EPOCH + Duration::from_secs(1_600_000_000);

        let bytes = LocalFs.copy_file(&source, &destination, modified).unwrap();

        assert_eq!(bytes, 14);
        assert_eq!(fs::read(&destination).unwrap(), b"hello treesync");
        let stat = LocalFs.stat(&destination).unwrap().unwrap();
        assert_eq!(stat.modified, modified);
        assert_eq!(stat.size, 14);
    }

    #[test]
    fn test_copy_file_truncates_existing_destination() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("short.txt");
        let destination = temp_dir.path().join("long.txt");
        fs::write(&source, b"abc").unwrap();
        fs::write(&destination, b"a much longer previous content").unwrap();

        LocalFs
            .copy_file(&source, &destination, SystemTime::now())
            .unwrap();
        assert_eq!(fs::read(&destination).unwrap(), b"abc");
    }

    #[test]
    fn test_copy_missing_source_is_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let err = LocalFs
            .copy_file(
                &temp_dir.path().join("missing"),
                &temp_dir.path().join("out"),
                SystemTime::now(),
            )
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(!temp_dir.path().join("out").exists());
    }

    #[test]
    fn test_remove_file() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("unused.txt");
        fs::write(&file, b"bye").unwrap();

        LocalFs.remove_file(&file).unwrap();
        assert!(!file.exists());
        assert_eq!(
            LocalFs.remove_file(&file).unwrap_err().kind(),
            ErrorKind::NotFound
        );
    }

    #[test]
    fn test_digest_compares_content() {
        let temp_dir = TempDir::new().unwrap();
        let a = temp_dir.path().join("a.txt");
        let b = temp_dir.path().join("b.txt");
        let c = temp_dir.path().join("c.txt");
        fs::write(&a, b"abc").unwrap();
        fs::write(&b, b"abc").unwrap();
        fs::write(&c, b"xyz").unwrap();

        assert_eq!(LocalFs.digest(&a).unwrap(), LocalFs.digest(&b).unwrap());
        assert_ne!(LocalFs.digest(&a).unwrap(), LocalFs.digest(&c).unwrap());
        assert_eq!(
            LocalFs.digest(&temp_dir.path().join("missing")).unwrap_err().kind(),
            ErrorKind::NotFound
        );
    }
}
