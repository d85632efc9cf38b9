//! Directory tree traversal
//!
//! [`TreeWalker`] is a lazy, finite iterator over a tree. Entries come out in
//! descent order with siblings sorted by file name, so two walks of the same
//! tree produce the same sequence. A failure on one entry is yielded as
//! [`WalkEntry::Error`] and the walk carries on with the next sibling.

use std::path::{Path, PathBuf};

use tracing::debug;
use treesync_types::{Error, FileEntry};
use walkdir::WalkDir;

/// One item produced by a tree walk
#[derive(Debug)]
pub enum WalkEntry {
    /// A regular file
    File(FileEntry),
    /// A directory, given relative to the root
    Directory(PathBuf),
    /// An entry that could not be read
    Error {
        /// Path of the failing entry, relative to the root when possible
        path: PathBuf,
        /// What went wrong
        error: Error,
    },
}

/// Lazy recursive walk of a directory tree
pub struct TreeWalker {
    root: PathBuf,
    inner: walkdir::IntoIter,
}

impl TreeWalker {
    /// Start walking `root`; nothing is read until the first `next()`
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        let root = root.as_ref().to_path_buf();
        let inner = WalkDir::new(&root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter();
        Self { root, inner }
    }

    fn convert(&self, entry: walkdir::DirEntry) -> Option<WalkEntry> {
        let file_type = entry.file_type();
        let relative = relative_to(&self.root, entry.path());

        if file_type.is_dir() {
            return Some(WalkEntry::Directory(relative));
        }

        if entry.depth() == 0 {
            return Some(WalkEntry::Error {
                path: relative,
                error: Error::other(format!("Not a directory: {}", entry.path().display())),
            });
        }

        if !file_type.is_file() {
            debug!("Skipping non-regular file: {}", entry.path().display());
            return None;
        }

        let metadata = match entry.metadata() {
            Ok(metadata) => metadata,
            Err(e) => {
                return Some(WalkEntry::Error {
                    path: relative,
                    error: convert_walk_error(entry.path(), &e),
                })
            }
        };

        let modified = match metadata.modified() {
            Ok(modified) => modified,
            Err(e) => {
                return Some(WalkEntry::Error {
                    path: relative,
                    error: Error::io(entry.path(), &e),
                })
            }
        };

        Some(WalkEntry::File(FileEntry {
            relative_path: relative,
            path: entry.path().to_path_buf(),
            size: metadata.len(),
            modified,
        }))
    }
}

impl Iterator for TreeWalker {
    type Item = WalkEntry;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.inner.next()? {
                Ok(entry) => {
                    if let Some(item) = self.convert(entry) {
                        return Some(item);
                    }
                }
                Err(e) => {
                    let failing = e.path().unwrap_or(&self.root).to_path_buf();
                    return Some(WalkEntry::Error {
                        path: relative_to(&self.root, &failing),
                        error: convert_walk_error(&failing, &e),
                    });
                }
            }
        }
    }
}

/// Path of `path` relative to `root`; the root itself is reported in full
pub fn relative_to(root: &Path, path: &Path) -> PathBuf {
    match path.strip_prefix(root) {
        Ok(relative) if !relative.as_os_str().is_empty() => relative.to_path_buf(),
        _ => path.to_path_buf(),
    }
}

fn convert_walk_error(path: &Path, error: &walkdir::Error) -> Error {
    match error.io_error() {
        Some(io_error) => Error::io(path, io_error),
        None => Error::Io {
            path: path.to_path_buf(),
            message: error.to_string(),
        },
    }
}
