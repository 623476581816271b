//! In-memory stand-ins for the storage traits, used by tests.

use super::{parse_position, PositionMemory, Track, TrackStore};
use crate::error::{PlaylistError, Result};
use async_trait::async_trait;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

#[derive(Debug, Default)]
struct MemoryTracks {
    initialized: bool,
    next_id: u64,
    records: Vec<Track>,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryTrackStore {
    inner: Rc<RefCell<MemoryTracks>>,
    fail_open: Rc<Cell<bool>>,
    fail_writes: Rc<Cell<bool>>,
}

impl MemoryTrackStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store whose `initialize` always fails.
    pub fn failing_open() -> Self {
        let store = Self::default();
        store.fail_open.set(true);
        store
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().records.len()
    }
}

#[async_trait(?Send)]
impl TrackStore for MemoryTrackStore {
    async fn initialize(&self) -> Result<()> {
        if self.fail_open.get() {
            return Err(PlaylistError::StorageOpen("blocked".to_string()));
        }
        self.inner.borrow_mut().initialized = true;
        Ok(())
    }

    async fn load_all(&self) -> Result<Vec<Track>> {
        let inner = self.inner.borrow();
        if !inner.initialized {
            return Ok(Vec::new());
        }
        Ok(inner.records.clone())
    }

    async fn add(&self, url: String) -> Result<Track> {
        if self.fail_writes.get() {
            return Err(PlaylistError::StorageWrite("quota exceeded".to_string()));
        }
        if !self.inner.borrow().initialized {
            self.initialize().await?;
        }
        let mut inner = self.inner.borrow_mut();
        inner.next_id += 1;
        let track = Track::new(inner.next_id, url);
        inner.records.push(track.clone());
        Ok(track)
    }
}

/// Holds the raw stored text so unparsable values can be exercised.
#[derive(Debug, Clone, Default)]
pub struct MemoryPosition {
    raw: Rc<RefCell<Option<String>>>,
}

impl MemoryPosition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_raw(raw: &str) -> Self {
        let position = Self::default();
        *position.raw.borrow_mut() = Some(raw.to_string());
        position
    }

    pub fn raw(&self) -> Option<String> {
        self.raw.borrow().clone()
    }
}

#[async_trait(?Send)]
impl PositionMemory for MemoryPosition {
    async fn get(&self) -> Option<usize> {
        self.raw.borrow().as_deref().and_then(parse_position)
    }

    async fn set(&self, index: usize) -> Result<()> {
        *self.raw.borrow_mut() = Some(index.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn keys_strictly_increase_in_insertion_order() {
        let store = MemoryTrackStore::new();
        store.initialize().await.expect("initialize");
        for n in 0..5 {
            store.add(format!("data:audio/mpeg;base64,{n}")).await.expect("add");
        }

        let loaded = store.load_all().await.expect("load");
        let ids: Vec<u64> = loaded.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
        assert_eq!(&*loaded[4].url, "data:audio/mpeg;base64,4");
    }

    #[tokio::test]
    async fn add_before_initialize_opens_the_store() {
        let store = MemoryTrackStore::new();
        let track = store.add("data:audio/mpeg;base64,AA==".to_string()).await.expect("add");
        assert_eq!(track.id, 1);
        assert_eq!(store.load_all().await.expect("load"), vec![track]);
    }

    #[tokio::test]
    async fn add_to_unopenable_store_is_an_open_error() {
        let store = MemoryTrackStore::failing_open();
        assert!(matches!(
            store.add("data:,".to_string()).await,
            Err(PlaylistError::StorageOpen(_))
        ));
        assert_eq!(store.len(), 0);
    }

    #[tokio::test]
    async fn position_round_trip() {
        let position = MemoryPosition::new();
        assert_eq!(position.get().await, None);
        position.set(7).await.expect("set");
        assert_eq!(position.get().await, Some(7));
        assert_eq!(position.raw().as_deref(), Some("7"));
    }

    #[tokio::test]
    async fn garbage_position_is_absent() {
        assert_eq!(MemoryPosition::with_raw("twelve").get().await, None);
    }
}
