//! Persistence for uploaded tracks and the last selected position.
//!
//! Two capability sets are exposed as traits so the playlist logic never
//! touches a concrete storage engine:
//!
//! * [`TrackStore`] - auto-keyed collection of encoded audio.
//! * [`PositionMemory`] - one persisted integer.
//!
//! The browser build backs them with IndexedDB and LocalStorage, the desktop
//! build with a single SQLite file.

use crate::error::Result;
use async_trait::async_trait;
use std::rc::Rc;

#[cfg(target_arch = "wasm32")]
mod indexed_db;
#[cfg(target_arch = "wasm32")]
mod local_storage;
#[cfg(test)]
pub(crate) mod memory;
#[cfg(not(target_arch = "wasm32"))]
pub(crate) mod sqlite;

#[cfg(target_arch = "wasm32")]
pub use indexed_db::IndexedDbTrackStore;
#[cfg(target_arch = "wasm32")]
pub use local_storage::LocalStoragePosition;
#[cfg(not(target_arch = "wasm32"))]
pub use sqlite::{SqlitePosition, SqliteTrackStore};

/// One uploaded audio item
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    /// Key assigned by the store on insert
    pub id: u64,
    /// `data:<mime>;base64,...` URI of the audio
    pub url: Rc<str>,
}

impl Track {
    pub fn new(id: u64, url: impl Into<Rc<str>>) -> Self {
        Self {
            id,
            url: url.into(),
        }
    }
}

/// Durable, auto-keyed collection of tracks.
#[async_trait(?Send)]
pub trait TrackStore {
    /// Open the collection, creating it with an auto-incrementing key on first use.
    async fn initialize(&self) -> Result<()>;

    /// All tracks in ascending key order. Empty when never initialized.
    async fn load_all(&self) -> Result<Vec<Track>>;

    /// Persist `url` under the next key and return the stored record.
    ///
    /// Opens the collection first if `initialize` has not completed yet.
    async fn add(&self, url: String) -> Result<Track>;
}

/// Single persisted scalar holding the last manually selected index.
#[async_trait(?Send)]
pub trait PositionMemory {
    async fn get(&self) -> Option<usize>;
    async fn set(&self, index: usize) -> Result<()>;
}

/// Parse the stored text of a position. Anything but a non-negative integer is absent.
pub(crate) fn parse_position(raw: &str) -> Option<usize> {
    raw.trim().parse::<usize>().ok()
}
