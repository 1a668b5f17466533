//! Item sources: where the photos under review come from

use crate::domain::{sort_items, Item, ItemId, SortOrder};
use crate::error::Result;
use chrono::{DateTime, Utc};
use std::collections::hash_map::DefaultHasher;
use std::fs;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Supplies the ordered set of photos for a session.
///
/// Implementations may block; the driver calls them off the UI thread.
pub trait ItemSource: Send + Sync {
    fn list_items(&self, order: SortOrder) -> Result<Vec<Item>>;
}

/// Returns true for file extensions treated as photos
pub fn is_photo_extension(ext: &str) -> bool {
    matches!(
        ext.to_lowercase().as_str(),
        "png" | "jpg" | "jpeg" | "gif" | "bmp" | "webp" | "tif" | "tiff" | "heic" | "heif" | "avif"
    )
}

/// Options for directory scanning
#[derive(Debug, Clone, Default)]
pub struct DiscoveryOptions {
    /// Include files whose names start with '.'
    pub show_hidden: bool,
}

/// Photos found directly inside one directory.
///
/// Subdirectories are not scanned. The sort key is the file's modification
/// time; files whose timestamp cannot be read (or is the epoch) have none.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
    options: DiscoveryOptions,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>, options: DiscoveryOptions) -> Self {
        Self {
            root: root.into(),
            options,
        }
    }

    fn item_from_path(path: &Path) -> Option<Item> {
        let metadata = fs::metadata(path).ok()?;
        if !metadata.is_file() {
            return None;
        }

        let sort_key = metadata
            .modified()
            .ok()
            .map(DateTime::<Utc>::from)
            .filter(|modified| modified.timestamp() != 0);

        Some(Item {
            id: item_id_for(path),
            locator: path.to_path_buf(),
            sort_key,
            size: metadata.len(),
        })
    }
}

/// Derives a stable id from the photo's path
fn item_id_for(path: &Path) -> ItemId {
    let mut hasher = DefaultHasher::new();
    path.hash(&mut hasher);
    ItemId(hasher.finish())
}

impl ItemSource for DirectorySource {
    fn list_items(&self, order: SortOrder) -> Result<Vec<Item>> {
        let mut items = Vec::new();

        for entry_result in fs::read_dir(&self.root)? {
            // Skip entries that cannot be read
            let Ok(entry) = entry_result else {
                continue;
            };
            let path = entry.path();

            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if !self.options.show_hidden && file_name.starts_with('.') {
                continue;
            }

            let is_photo = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(is_photo_extension);
            if !is_photo {
                trace!(path = %path.display(), "skipping non-photo");
                continue;
            }

            if let Some(item) = Self::item_from_path(&path) {
                items.push(item);
            }
        }

        sort_items(&mut items, order);
        debug!(root = %self.root.display(), count = items.len(), ?order, "listed photos");
        Ok(items)
    }
}
