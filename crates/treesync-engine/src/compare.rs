//! Source/destination comparison

use std::path::Path;

use tracing::debug;
use treesync_types::{CompareMode, Error, FileEntry, FileStat, Result, SyncDecision};

use crate::fs::FileSystem;

/// Decides whether a destination file needs to be written
#[derive(Debug, Clone)]
pub struct Comparator {
    mode: CompareMode,
    digests_computed: u64,
}

impl Comparator {
    /// Create a comparator using `mode`
    pub fn new(mode: CompareMode) -> Self {
        Self {
            mode,
            digests_computed: 0,
        }
    }

    /// Number of content digests computed so far
    pub fn digests_computed(&self) -> u64 {
        self.digests_computed
    }

    /// Decide what to do with `source` given the current state of `destination`.
    ///
    /// `existing` is the destination's metadata, `None` if nothing is there.
    /// Content is only read when both size and modification time agree and
    /// the mode is [`CompareMode::Verify`].
    pub fn decide<F: FileSystem + ?Sized>(
        &mut self,
        fs: &F,
        source: &FileEntry,
        destination: &Path,
        existing: Option<&FileStat>,
    ) -> Result<SyncDecision> {
        let Some(existing) = existing else {
            return Ok(SyncDecision::CreateNew);
        };

        if !existing.is_file {
            return Err(Error::other(format!(
                "Destination exists and is not a regular file: {}",
                destination.display()
            )));
        }

        if !existing.matches(source) {
            return Ok(SyncDecision::Overwrite);
        }

        match self.mode {
            CompareMode::Fast => Ok(SyncDecision::Skip),
            CompareMode::Verify => {
                let source_digest = fs.digest(&source.path)?;
                self.digests_computed += 1;
                let destination_digest = fs.digest(destination)?;
                self.digests_computed += 1;

                if source_digest == destination_digest {
                    Ok(SyncDecision::Skip)
                } else {
                    debug!(
                        "Content differs despite equal metadata: {}",
                        source.relative_path.display()
                    );
                    Ok(SyncDecision::Overwrite)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::LocalFs;
    use proptest::prelude::*;
    use rstest::rstest;
    use std::fs;
    use std::path::PathBuf;
    use std::time::{Duration, SystemTime};
    use tempfile::TempDir;

    fn entry(path: PathBuf, size: u64, modified: SystemTime) -> FileEntry {
        FileEntry {
            relative_path: PathBuf::from(path.file_name().unwrap()),
            path,
            size,
            modified,
        }
    }

    fn stat(size: u64, modified: SystemTime) -> FileStat {
        FileStat {
            size,
            modified,
            is_file: true,
        }
    }

    fn epoch(secs: u64) -> SystemTime {
        SystemTime::UNIX_EPOCH + Duration::from_secs(secs)
    }

    #[test]
    fn test_missing_destination_is_create_new() {
        let mut comparator = Comparator::new(CompareMode::Verify);
        let source = entry(PathBuf::from("/nowhere/a.txt"), 3, epoch(10));

        let decision = comparator
            .decide(&LocalFs, &source, Path::new("/nowhere/b.txt"), None)
            .unwrap();
        assert_eq!(decision, SyncDecision::CreateNew);
        assert_eq!(comparator.digests_computed(), 0);
    }

    #[test]
    fn test_non_file_destination_is_an_error() {
        let mut comparator = Comparator::new(CompareMode::Fast);
        let source = entry(PathBuf::from("/nowhere/a.txt"), 3, epoch(10));
        let existing = FileStat {
            is_file: false,
            ..stat(3, epoch(10))
        };

        let result = comparator.decide(&LocalFs, &source, Path::new("/dst/a.txt"), Some(&existing));
        assert!(result.is_err());
    }

    #[rstest]
    #[case::fast_match(CompareMode::Fast, 3, 10, SyncDecision::Skip)]
    #[case::fast_size_differs(CompareMode::Fast, 4, 10, SyncDecision::Overwrite)]
    #[case::fast_mtime_differs(CompareMode::Fast, 3, 11, SyncDecision::Overwrite)]
    #[case::verify_size_differs(CompareMode::Verify, 4, 10, SyncDecision::Overwrite)]
    #[case::verify_mtime_differs(CompareMode::Verify, 3, 11, SyncDecision::Overwrite)]
    fn test_decision_without_reading_content(
        #[case] mode: CompareMode,
        #[case] destination_size: u64,
        #[case] destination_secs: u64,
        #[case] expected: SyncDecision,
    ) {
        let mut comparator = Comparator::new(mode);
        // Paths do not exist, so any attempt to read content would fail
        let source = entry(PathBuf::from("/nowhere/a.txt"), 3, epoch(10));
        let existing = stat(destination_size, epoch(destination_secs));

        let decision = comparator
            .decide(&LocalFs, &source, Path::new("/nowhere/b.txt"), Some(&existing))
            .unwrap();
        assert_eq!(decision, expected);
        assert_eq!(comparator.digests_computed(), 0);
    }

    #[test]
    fn test_verify_mode_detects_same_metadata_different_content() {
        let temp_dir = TempDir::new().unwrap();
        let source_path = temp_dir.path().join("a.txt");
        let destination_path = temp_dir.path().join("b.txt");
        fs::write(&source_path, b"abc").unwrap();
        fs::write(&destination_path, b"xyz").unwrap();

        let mut comparator = Comparator::new(CompareMode::Verify);
        let source = entry(source_path, 3, epoch(10));
        let decision = comparator
            .decide(&LocalFs, &source, &destination_path, Some(&stat(3, epoch(10))))
            .unwrap();

        assert_eq!(decision, SyncDecision::Overwrite);
        assert_eq!(comparator.digests_computed(), 2);
    }

    #[test]
    fn test_verify_mode_skips_identical_content() {
        let temp_dir = TempDir::new().unwrap();
        let source_path = temp_dir.path().join("a.txt");
        let destination_path = temp_dir.path().join("b.txt");
        fs::write(&source_path, b"same").unwrap();
        fs::write(&destination_path, b"same").unwrap();

        let mut comparator = Comparator::new(CompareMode::Verify);
        let source = entry(source_path, 4, epoch(10));
        let decision = comparator
            .decide(&LocalFs, &source, &destination_path, Some(&stat(4, epoch(10))))
            .unwrap();

        assert_eq!(decision, SyncDecision::Skip);
    }

    #[test]
    fn test_verify_mode_digest_failure_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let source = entry(temp_dir.path().join("gone.txt"), 4, epoch(10));

        let mut comparator = Comparator::new(CompareMode::Verify);
        let result = comparator.decide(
            &LocalFs,
            &source,
            &temp_dir.path().join("also-gone.txt"),
            Some(&stat(4, epoch(10))),
        );
        assert!(result.unwrap_err().is_not_found());
    }

    proptest! {
        #[test]
        fn test_metadata_mismatch_never_reads_content(
            src_size in 0u64..1000,
            dst_size in 0u64..1000,
            src_secs in 0u64..1_000_000,
            dst_secs in 0u64..1_000_000,
        ) {
            prop_assume!(src_size != dst_size || src_secs != dst_secs);

            let mut comparator = Comparator::new(CompareMode::Verify);
            let source = entry(PathBuf::from("/nowhere/a.txt"), src_size, epoch(src_secs));
            let existing = stat(dst_size, epoch(dst_secs));

            let decision = comparator
                .decide(&LocalFs, &source, Path::new("/nowhere/b.txt"), Some(&existing))
                .unwrap();
            prop_assert_eq!(decision, SyncDecision::Overwrite);
            prop_assert_eq!(comparator.digests_computed(), 0);
        }
    }
}
