//! One-way directory reconciliation engine for treesync
//!
//! A run walks the source tree and brings every regular file into the
//! destination, copying only what is missing or stale. With
//! `delete_missing` set it then walks the destination and removes files the
//! source no longer has. Each processed file produces one
//! [`OutcomeEvent`](treesync_types::OutcomeEvent); a failure on one file is
//! reported and the run moves on.
//!
//! # Equivalence
//!
//! A destination file is considered current when its size and modification
//! time equal the source's. In [`CompareMode::Verify`](treesync_types::CompareMode)
//! that verdict is confirmed with a BLAKE3 digest of both files. A metadata
//! mismatch always leads to an overwrite without reading content.
//!
//! # Examples
//!
//! ```rust,no_run
//! use treesync_engine::{SyncEngine, SyncOptions, SyncRequest};
//! use treesync_types::OutcomeEvent;
//!
//! let request = SyncRequest::new("photos", "/mnt/backup/photos")
//!     .with_options(SyncOptions::mirror());
//!
//! let mut events: Vec<OutcomeEvent> = Vec::new();
//! let report = SyncEngine::new().run(request, &mut events);
//! println!(
//!     "{} copied, {} deleted, {} errors",
//!     report.stats.files_copied(),
//!     report.stats.files_deleted,
//!     report.stats.errors
//! );
//! ```

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod compare;
pub mod digest;
pub mod engine;
pub mod forward;
pub mod fs;
pub mod prune;
pub mod report;
pub mod request;
pub mod walker;

pub use compare::Comparator;
pub use digest::ContentDigest;
pub use engine::SyncEngine;
pub use forward::ForwardReconciler;
pub use fs::{FileSystem, LocalFs};
pub use prune::OrphanPruner;
pub use report::Reporter;
pub use request::{SyncOptions, SyncReport, SyncRequest};
pub use walker::{TreeWalker, WalkEntry};
