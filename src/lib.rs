//! Pswp - a terminal photo triage library
//!
//! The review session lives in [`domain`] and is free of I/O; [`driver`]
//! connects it to a photo [`source`] and a deletion [`backend`], and [`tui`]
//! draws it.

pub mod async_preview;
pub mod backend;
pub mod cli;
pub mod config;
pub mod domain;
pub mod driver;
pub mod error;
pub mod file_opener;
pub mod logging;
pub mod preview;
pub mod source;
pub mod tui;

// Re-export primary types for convenience
pub use backend::{ApprovalToken, DeleteOutcome, DeletionBackend, TrashBackend};
pub use config::{InteractionMode, UserConfig};
pub use domain::{
    sort_items, Action, DeleteMode, Item, ItemId, SessionController, SessionState, SortOrder,
};
pub use driver::SessionDriver;
pub use error::{Result, TriageError};
pub use file_opener::open_file;
pub use source::{DirectorySource, DiscoveryOptions, ItemSource};
