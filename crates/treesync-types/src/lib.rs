//! Core type system and error handling for treesync
//!
//! This crate provides the foundational types shared by the treesync engine,
//! its configuration layer and its command line front end:
//!
//! - **Error handling**: [`Error`] with an OS independent [`ErrorKind`]
//! - **Core types**: file entries, sync decisions, outcome events and statistics
//! - **Traits**: [`EventSink`] for consuming the engine's event stream
//!
//! # Features
//!
//! - `serde`: Enable serialization support
//!
//! # Examples
//!
//! ```rust
//! use treesync_types::{OutcomeEvent, SyncAction, SyncPhase, SyncStats};
//!
//! let mut stats = SyncStats::new();
//! stats.record(&OutcomeEvent::new(SyncPhase::Reconcile, "a.txt", SyncAction::CopiedNew).with_bytes(12));
//! assert_eq!(stats.files_copied(), 1);
//! assert_eq!(stats.bytes_copied, 12);
//! ```

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod result;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use error::{Error, ErrorKind};
pub use result::Result;
pub use traits::*;
pub use types::*;
