//! Core data model for a photo review session

pub mod controller;
pub mod session;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::path::PathBuf;

pub use controller::{Completion, Effect, SessionController, Ticket};
pub use session::{ApprovalScope, PendingApproval, SessionState};

/// Stable identifier of a reviewable item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ItemId(pub u64);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single photo under review. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub id: ItemId,
    /// Where the backend and the UI find the underlying file
    pub locator: PathBuf,
    /// Capture timestamp, if known
    pub sort_key: Option<DateTime<Utc>>,
    pub size: u64,
}

impl Item {
    pub fn new(id: u64, locator: impl Into<PathBuf>, sort_key: Option<DateTime<Utc>>) -> Self {
        Self {
            id: ItemId(id),
            locator: locator.into(),
            sort_key,
            size: 0,
        }
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size = size;
        self
    }

    /// File name used for display
    pub fn name(&self) -> String {
        self.locator
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string()
    }
}

/// Review order for the library
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    #[default]
    NewestFirst,
    OldestFirst,
}

impl SortOrder {
    pub fn toggled(self) -> Self {
        match self {
            SortOrder::NewestFirst => SortOrder::OldestFirst,
            SortOrder::OldestFirst => SortOrder::NewestFirst,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortOrder::NewestFirst => "Newest first",
            SortOrder::OldestFirst => "Oldest first",
        }
    }
}

/// How delete decisions reach the backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeleteMode {
    /// Each delete is submitted as soon as the user decides
    #[default]
    Immediate,
    /// Deletes accumulate locally and are submitted as one batch
    Queued,
}

impl DeleteMode {
    pub fn toggled(self) -> Self {
        match self {
            DeleteMode::Immediate => DeleteMode::Queued,
            DeleteMode::Queued => DeleteMode::Immediate,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DeleteMode::Immediate => "Immediate",
            DeleteMode::Queued => "Queued",
        }
    }
}

/// A reversible review step, recorded for undo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Kept { item: Item, index_before: usize },
    Deleted { item: Item, index_before: usize },
}

impl Action {
    pub fn item(&self) -> &Item {
        match self {
            Action::Kept { item, .. } | Action::Deleted { item, .. } => item,
        }
    }

    pub fn index_before(&self) -> usize {
        match self {
            Action::Kept { index_before, .. } | Action::Deleted { index_before, .. } => {
                *index_before
            }
        }
    }
}

/// Compares two items in review order.
///
/// Items without a sort key come after every item that has one, in both
/// directions. Ties are broken by id (descending for newest-first, ascending
/// for oldest-first) so the order is total for a fixed input.
pub fn compare_items(a: &Item, b: &Item, order: SortOrder) -> Ordering {
    let by_key = match (a.sort_key, b.sort_key) {
        (Some(ka), Some(kb)) => match order {
            SortOrder::NewestFirst => kb.cmp(&ka),
            SortOrder::OldestFirst => ka.cmp(&kb),
        },
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };

    by_key.then_with(|| match order {
        SortOrder::NewestFirst => b.id.cmp(&a.id),
        SortOrder::OldestFirst => a.id.cmp(&b.id),
    })
}

/// Sorts items in place into review order
pub fn sort_items(items: &mut [Item], order: SortOrder) {
    items.sort_by(|a, b| compare_items(a, b, order));
}
