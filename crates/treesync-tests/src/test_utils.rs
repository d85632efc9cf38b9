//! Unified test utilities for treesync tests and benchmarks

use std::cell::Cell;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use filetime::FileTime;
use tempfile::TempDir;
use treesync_engine::{ContentDigest, FileSystem, TreeWalker};
use treesync_types::{Error, FileStat, Result};

/// Modification time given to files written by [`write_file`]
pub const BASE_MTIME_SECS: u64 = 1_600_000_000;

/// Deterministic file content of `size` bytes; different seeds give different bytes
pub fn generate_test_data(size: usize, seed: u8) -> Vec<u8> {
    (0..size)
        .map(|i| ((i * 7 + 13) % 251) as u8 ^ seed)
        .collect()
}

/// Convert whole seconds since the epoch to a `SystemTime`
pub fn epoch(secs: u64) -> SystemTime {
    SystemTime::UNIX_EPOCH + Duration::from_secs(secs)
}

/// Set both access and modification time of `path` to `secs` since the epoch
pub fn set_mtime(path: &Path, secs: u64) {
    let time = FileTime::from_unix_time(secs as i64, 0);
    filetime::set_file_times(path, time, time).expect("Failed to set file times");
}

/// Modification time of `path`
pub fn mtime(path: &Path) -> SystemTime {
    fs::metadata(path)
        .and_then(|metadata| metadata.modified())
        .expect("Failed to read modification time")
}

/// Write `contents` to `root/relative`, creating parents, with mtime
/// [`BASE_MTIME_SECS`]
pub fn write_file(root: &Path, relative: &str, contents: &[u8]) -> PathBuf {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create parent directories");
    }
    fs::write(&path, contents).expect("Failed to write test file");
    set_mtime(&path, BASE_MTIME_SECS);
    path
}

/// A source and a destination directory inside one temporary directory
pub struct TestTrees {
    /// Owner of both trees; removed on drop
    pub temp_dir: TempDir,
    /// Source root
    pub source: PathBuf,
    /// Destination root
    pub destination: PathBuf,
}

impl TestTrees {
    /// Create empty source and destination roots
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let source = temp_dir.path().join("source");
        let destination = temp_dir.path().join("destination");
        fs::create_dir_all(&source).expect("Failed to create source");
        fs::create_dir_all(&destination).expect("Failed to create destination");
        Self {
            temp_dir,
            source,
            destination,
        }
    }

    /// Write a file under the source root
    pub fn source_file(&self, relative: &str, contents: &[u8]) -> PathBuf {
        write_file(&self.source, relative, contents)
    }

    /// Write a file under the destination root
    pub fn destination_file(&self, relative: &str, contents: &[u8]) -> PathBuf {
        write_file(&self.destination, relative, contents)
    }

    /// Populate the source with `count` files of `size` bytes spread over a
    /// few nested directories
    pub fn populate_source(&self, count: usize, size: usize) -> Vec<PathBuf> {
        (0..count)
            .map(|i| {
                let relative = format!("dir{}/sub{}/file{:04}.dat", i % 4, i % 3, i);
                self.source_file(&relative, &generate_test_data(size, i as u8))
            })
            .collect()
    }
}

impl Default for TestTrees {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether the current process is denied reading a file with no permissions.
/// Privileged users bypass permission bits, so permission tests check this first.
#[cfg(unix)]
pub fn permissions_enforced(dir: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    let probe = dir.join(".permission-probe");
    fs::write(&probe, b"probe").expect("Failed to write probe");
    fs::set_permissions(&probe, fs::Permissions::from_mode(0o000)).expect("Failed to chmod probe");
    let enforced = fs::read(&probe).is_err();
    fs::set_permissions(&probe, fs::Permissions::from_mode(0o644)).expect("Failed to chmod probe");
    fs::remove_file(&probe).expect("Failed to remove probe");
    enforced
}

/// Filesystem wrapper counting the operations the engine performs
pub struct CountingFs<F> {
    inner: F,
    stats: Cell<u64>,
    digests: Cell<u64>,
    copies: Cell<u64>,
    removals: Cell<u64>,
}

impl<F: FileSystem> CountingFs<F> {
    /// Wrap `inner`
    pub fn new(inner: F) -> Self {
        Self {
            inner,
            stats: Cell::new(0),
            digests: Cell::new(0),
            copies: Cell::new(0),
            removals: Cell::new(0),
        }
    }

    /// Number of stat calls
    pub fn stats(&self) -> u64 {
        self.stats.get()
    }

    /// Number of digest calls
    pub fn digests(&self) -> u64 {
        self.digests.get()
    }

    /// Number of file copies
    pub fn copies(&self) -> u64 {
        self.copies.get()
    }

    /// Number of file removals
    pub fn removals(&self) -> u64 {
        self.removals.get()
    }

    /// Reset all counters to zero
    pub fn reset(&self) {
        self.stats.set(0);
        self.digests.set(0);
        self.copies.set(0);
        self.removals.set(0);
    }
}

fn bump(counter: &Cell<u64>) {
    counter.set(counter.get() + 1);
}

impl<F: FileSystem> FileSystem for CountingFs<F> {
    fn walk(&self, root: &Path) -> TreeWalker {
        self.inner.walk(root)
    }

    fn stat(&self, path: &Path) -> Result<Option<FileStat>> {
        bump(&self.stats);
        self.inner.stat(path)
    }

    fn digest(&self, path: &Path) -> Result<ContentDigest> {
        bump(&self.digests);
        self.inner.digest(path)
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        self.inner.create_dir_all(path)
    }

    fn copy_file(&self, source: &Path, destination: &Path, modified: SystemTime) -> Result<u64> {
        bump(&self.copies);
        self.inner.copy_file(source, destination, modified)
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        bump(&self.removals);
        self.inner.remove_file(path)
    }
}

/// Operation a [`FaultyFs`] can be told to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultOp {
    /// `stat` of the path
    Stat,
    /// `digest` of the path
    Digest,
    /// `copy_file` reading from the path
    CopyFrom,
    /// `remove_file` of the path
    Remove,
}

/// Filesystem wrapper failing chosen operations on chosen paths
pub struct FaultyFs<F> {
    inner: F,
    faults: Vec<(FaultOp, PathBuf, io::ErrorKind)>,
}

impl<F: FileSystem> FaultyFs<F> {
    /// Wrap `inner` with no faults
    pub fn new(inner: F) -> Self {
        Self {
            inner,
            faults: Vec::new(),
        }
    }

    /// Fail `op` on exactly `path` with an I/O error of `kind`
    pub fn fail(mut self, op: FaultOp, path: impl Into<PathBuf>, kind: io::ErrorKind) -> Self {
        self.faults.push((op, path.into(), kind));
        self
    }

    fn check(&self, op: FaultOp, path: &Path) -> Result<()> {
        match self
            .faults
            .iter()
            .find(|(fault_op, fault_path, _)| *fault_op == op && fault_path == path)
        {
            Some((_, _, kind)) => Err(Error::io(path, &io::Error::from(*kind))),
            None => Ok(()),
        }
    }
}

impl<F: FileSystem> FileSystem for FaultyFs<F> {
    fn walk(&self, root: &Path) -> TreeWalker {
        self.inner.walk(root)
    }

    fn stat(&self, path: &Path) -> Result<Option<FileStat>> {
        self.check(FaultOp::Stat, path)?;
        self.inner.stat(path)
    }

    fn digest(&self, path: &Path) -> Result<ContentDigest> {
        self.check(FaultOp::Digest, path)?;
        self.inner.digest(path)
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        self.inner.create_dir_all(path)
    }

    fn copy_file(&self, source: &Path, destination: &Path, modified: SystemTime) -> Result<u64> {
        self.check(FaultOp::CopyFrom, source)?;
        self.inner.copy_file(source, destination, modified)
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        self.check(FaultOp::Remove, path)?;
        self.inner.remove_file(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use treesync_engine::LocalFs;
    use treesync_types::ErrorKind;

    #[test]
    fn test_generate_test_data() {
        let a = generate_test_data(1024, 0);
        let b = generate_test_data(1024, 1);
        assert_eq!(a.len(), 1024);
        assert_eq!(a, generate_test_data(1024, 0));
        assert_ne!(a, b);
    }

    #[test]
    fn test_write_file_sets_base_mtime() {
        let trees = TestTrees::new();
        let path = trees.source_file("a/b/c.txt", b"abc");
        assert_eq!(fs::read(&path).unwrap(), b"abc");
        assert_eq!(mtime(&path), epoch(BASE_MTIME_SECS));
    }

    #[test]
    fn test_faulty_fs_fails_only_chosen_path() {
        let trees = TestTrees::new();
        let bad = trees.source_file("bad.txt", b"bad");
        let good = trees.source_file("good.txt", b"good");
        let fs = FaultyFs::new(LocalFs).fail(FaultOp::Stat, &bad, io::ErrorKind::PermissionDenied);

        assert_eq!(fs.stat(&bad).unwrap_err().kind(), ErrorKind::AccessDenied);
        assert!(fs.stat(&good).unwrap().is_some());
    }

    #[test]
    fn test_counting_fs_counts() {
        let trees = TestTrees::new();
        let path = trees.source_file("x.txt", b"x");
        let fs = CountingFs::new(LocalFs);

        fs.digest(&path).unwrap();
        fs.stat(&path).unwrap();
        assert_eq!(fs.digests(), 1);
        assert_eq!(fs.stats(), 1);

        fs.reset();
        assert_eq!(fs.digests(), 0);
    }
}
