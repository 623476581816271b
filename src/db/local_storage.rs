use super::{parse_position, PositionMemory};
use crate::error::{PlaylistError, Result};
use async_trait::async_trait;
use gloo_storage::{LocalStorage, Storage};
use web_sys::window;

/// Position scalar kept as a raw decimal string in `localStorage`.
#[derive(Debug, Clone)]
pub struct LocalStoragePosition {
    key: String,
}

impl LocalStoragePosition {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    fn raw_value(&self) -> Option<String> {
        window()?.local_storage().ok()??.get_item(&self.key).ok().flatten()
    }
}

#[async_trait(?Send)]
impl PositionMemory for LocalStoragePosition {
    async fn get(&self) -> Option<usize> {
        self.raw_value().and_then(|raw| parse_position(&raw))
    }

    async fn set(&self, index: usize) -> Result<()> {
        // An integer serializes to its bare decimal text.
        LocalStorage::set(&self.key, index).map_err(|e| PlaylistError::StorageWrite(e.to_string()))
    }
}
