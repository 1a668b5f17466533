// Background photo preview loading with caching

use crate::domain::{Item, ItemId};
use crate::error::{Result, TriageError};
use crate::preview::{generate_photo_preview, PhotoPreview, MAX_IMAGE_HEIGHT, MAX_IMAGE_WIDTH};
use std::collections::HashMap;
use tokio::sync::oneshot;
use tracing::debug;

/// Maximum number of cached previews
const CACHE_SIZE: usize = 10;

/// Preview loading state for the photo on screen
#[derive(Debug, Clone, PartialEq)]
pub enum PreviewState {
    Loading,
    Ready(PhotoPreview),
    Error(String),
}

/// LRU cache of rendered previews
#[derive(Debug)]
struct PreviewCache {
    cache: HashMap<ItemId, PhotoPreview>,
    /// Most recently used at the end
    access_order: Vec<ItemId>,
    max_size: usize,
}

impl PreviewCache {
    fn new(max_size: usize) -> Self {
        Self {
            cache: HashMap::new(),
            access_order: Vec::new(),
            max_size,
        }
    }

    fn get(&mut self, id: ItemId) -> Option<PhotoPreview> {
        let preview = self.cache.get(&id)?.clone();
        self.access_order.retain(|cached| *cached != id);
        self.access_order.push(id);
        Some(preview)
    }

    fn insert(&mut self, id: ItemId, preview: PhotoPreview) {
        if self.cache.contains_key(&id) {
            self.access_order.retain(|cached| *cached != id);
        } else if self.cache.len() >= self.max_size && !self.access_order.is_empty() {
            let oldest = self.access_order.remove(0);
            self.cache.remove(&oldest);
        }

        self.cache.insert(id, preview);
        self.access_order.push(id);
    }

    fn contains(&self, id: ItemId) -> bool {
        self.cache.contains_key(&id)
    }

    fn len(&self) -> usize {
        self.cache.len()
    }

    fn clear(&mut self) {
        self.cache.clear();
        self.access_order.clear();
    }
}

/// Loads previews off the UI thread for a polling render loop.
///
/// Only the photo most recently requested is tracked; switching photos
/// drops the pending result of the previous one.
pub struct PreviewManager {
    runtime: tokio::runtime::Runtime,
    cache: PreviewCache,
    current_id: Option<ItemId>,
    current_state: PreviewState,
    receiver: Option<oneshot::Receiver<PreviewState>>,
}

impl PreviewManager {
    pub fn new() -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .map_err(|e| TriageError::RuntimeError(format!("Failed to start preview runtime: {}", e)))?;

        Ok(Self {
            runtime,
            cache: PreviewCache::new(CACHE_SIZE),
            current_id: None,
            current_state: PreviewState::Loading,
            receiver: None,
        })
    }

    /// Returns the preview state for `item`, starting a load if needed (non-blocking)
    pub fn request_preview(&mut self, item: &Item) -> &PreviewState {
        if self.current_id != Some(item.id) {
            self.current_id = Some(item.id);
            self.receiver = None;

            if let Some(cached) = self.cache.get(item.id) {
                self.current_state = PreviewState::Ready(cached);
                return &self.current_state;
            }

            self.current_state = PreviewState::Loading;
            self.receiver = Some(self.spawn_load(item.clone()));
        }

        self.poll_pending(item.id);
        &self.current_state
    }

    fn spawn_load(&self, item: Item) -> oneshot::Receiver<PreviewState> {
        let (tx, rx) = oneshot::channel();
        debug!(id = %item.id, "loading preview");

        self.runtime.spawn(async move {
            let result = tokio::task::spawn_blocking(move || {
                generate_photo_preview(&item, MAX_IMAGE_WIDTH, MAX_IMAGE_HEIGHT)
            })
            .await;

            let state = match result {
                Ok(Ok(preview)) => PreviewState::Ready(preview),
                Ok(Err(e)) => PreviewState::Error(e.to_string()),
                Err(e) => PreviewState::Error(format!("Preview task panicked: {}", e)),
            };
            // The receiver is gone if the user already moved on
            let _ = tx.send(state);
        });

        rx
    }

    fn poll_pending(&mut self, id: ItemId) {
        let Some(rx) = self.receiver.as_mut() else {
            return;
        };

        match rx.try_recv() {
            Ok(state) => {
                if let PreviewState::Ready(preview) = &state {
                    self.cache.insert(id, preview.clone());
                }
                self.current_state = state;
                self.receiver = None;
            }
            Err(oneshot::error::TryRecvError::Empty) => {}
            Err(oneshot::error::TryRecvError::Closed) => {
                self.current_state = PreviewState::Error("Preview channel closed".to_string());
                self.receiver = None;
            }
        }
    }

    pub fn current_state(&self) -> &PreviewState {
        &self.current_state
    }

    pub fn is_cached(&self, id: ItemId) -> bool {
        self.cache.contains(id)
    }

    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }

    /// Forgets the current photo and every cached preview
    pub fn reset(&mut self) {
        self.current_id = None;
        self.current_state = PreviewState::Loading;
        self.receiver = None;
        self.cache.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::text::Line;
    use std::time::{Duration, Instant};
    use tempfile::TempDir;

    fn preview(tag: &str) -> PhotoPreview {
        PhotoPreview {
            dimensions: (1, 1),
            lines: vec![Line::from(tag.to_string())],
        }
    }

    fn wait_for_preview(manager: &mut PreviewManager, item: &Item) -> PreviewState {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            let state = manager.request_preview(item).clone();
            if state != PreviewState::Loading || Instant::now() > deadline {
                return state;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
    }

    mod cache_tests {
        use super::*;

        #[test]
        fn test_cache_insert_and_get() {
            let mut cache = PreviewCache::new(5);
            cache.insert(ItemId(1), preview("one"));

            assert_eq!(cache.len(), 1);
            assert!(cache.contains(ItemId(1)));
            assert_eq!(cache.get(ItemId(1)), Some(preview("one")));
            assert_eq!(cache.get(ItemId(2)), None);
        }

        #[test]
        fn test_cache_lru_eviction() {
            let mut cache = PreviewCache::new(3);
            for i in 0..4 {
                cache.insert(ItemId(i), preview(&i.to_string()));
            }

            assert_eq!(cache.len(), 3);
            assert!(!cache.contains(ItemId(0)));
            assert!(cache.contains(ItemId(3)));
        }

        #[test]
        fn test_cache_access_updates_order() {
            let mut cache = PreviewCache::new(3);
            for i in 0..3 {
                cache.insert(ItemId(i), preview(&i.to_string()));
            }

            let _ = cache.get(ItemId(0));
            cache.insert(ItemId(3), preview("3"));

            assert!(cache.contains(ItemId(0)));
            assert!(!cache.contains(ItemId(1)));
        }

        #[test]
        fn test_cache_update_existing_does_not_evict() {
            let mut cache = PreviewCache::new(2);
            cache.insert(ItemId(1), preview("a"));
            cache.insert(ItemId(2), preview("b"));
            cache.insert(ItemId(1), preview("c"));

            assert_eq!(cache.len(), 2);
            assert_eq!(cache.get(ItemId(1)), Some(preview("c")));
        }

        #[test]
        fn test_cache_clear() {
            let mut cache = PreviewCache::new(5);
            cache.insert(ItemId(1), preview("a"));
            cache.clear();
            assert_eq!(cache.len(), 0);
        }
    }

    mod manager_tests {
        use super::*;

        #[test]
        fn test_loads_and_caches_photo() {
            let temp_dir = TempDir::new().unwrap();
            let path = temp_dir.path().join("photo.png");
            image::RgbImage::from_fn(8, 8, |_, _| image::Rgb([10, 20, 30]))
                .save(&path)
                .unwrap();
            let item = Item::new(7, path, None);

            let mut manager = PreviewManager::new().unwrap();
            assert_eq!(*manager.request_preview(&item), PreviewState::Loading);

            let state = wait_for_preview(&mut manager, &item);
            assert!(matches!(state, PreviewState::Ready(ref p) if p.dimensions == (8, 8)));
            assert!(manager.is_cached(item.id));
        }

        #[test]
        fn test_unreadable_photo_reports_error() {
            let item = Item::new(1, "/nonexistent/photo.jpg", None);
            let mut manager = PreviewManager::new().unwrap();

            let state = wait_for_preview(&mut manager, &item);
            assert!(matches!(state, PreviewState::Error(_)));
            assert_eq!(manager.cache_size(), 0);
        }

        #[test]
        fn test_reset_clears_state() {
            let mut manager = PreviewManager::new().unwrap();
            manager.cache.insert(ItemId(1), preview("a"));
            manager.reset();

            assert_eq!(manager.cache_size(), 0);
            assert_eq!(*manager.current_state(), PreviewState::Loading);
        }
    }
}
