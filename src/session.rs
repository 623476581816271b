//! Playlist services: the storage and playback handles one widget works with.

use crate::components::PlaybackElement;
use crate::config::AppConfig;
use crate::db::{PositionMemory, Track, TrackStore};
use crate::playlist::Effect;
use dioxus::logger::tracing::{debug, error, info, warn};
use std::cell::Cell;
use std::rc::Rc;

/// Cloneable bundle of a track store, a position memory and a playback element.
#[derive(Clone)]
pub struct PlaylistServices<S, P, E> {
    store: S,
    position: P,
    element: E,
    presented: Rc<Cell<Option<u64>>>,
}

impl<S, P, E> PlaylistServices<S, P, E>
where
    S: TrackStore,
    P: PositionMemory,
    E: PlaybackElement,
{
    pub fn new(store: S, position: P, element: E) -> Self {
        Self {
            store,
            position,
            element,
            presented: Rc::new(Cell::new(None)),
        }
    }

    /// Open the store and read back everything a fresh mount needs.
    ///
    /// Failures are logged and degrade to an empty playlist.
    pub async fn mount(&self) -> (Vec<Track>, Option<usize>) {
        if let Err(err) = self.store.initialize().await {
            error!("{err}");
        }

        let tracks = match self.store.load_all().await {
            Ok(tracks) => tracks,
            Err(err) => {
                warn!("{err}");
                Vec::new()
            }
        };
        let restored = self.position.get().await;
        info!(tracks = tracks.len(), restored = ?restored, "playlist loaded");
        (tracks, restored)
    }

    /// Persist an encoded upload. `None` when the store rejected it.
    pub async fn upload(&self, url: String) -> Option<Track> {
        match self.store.add(url).await {
            Ok(track) => {
                info!(id = track.id, "track stored");
                Some(track)
            }
            Err(err) => {
                warn!("upload dropped: {err}");
                None
            }
        }
    }

    /// Execute controller effects in order.
    pub async fn apply(&self, effects: &[Effect]) {
        for effect in effects {
            match effect {
                Effect::RememberPosition(index) => {
                    if let Err(err) = self.position.set(*index).await {
                        warn!("{err}");
                    }
                }
                Effect::Present {
                    track,
                    playing,
                    reload,
                } => {
                    // Without `reload` the same track again only changes transport state.
                    if *reload || self.presented.get() != Some(track.id) {
                        debug!(id = track.id, bytes = track.url.len(), "presenting track");
                        self.element.set_source(&track.url);
                        self.presented.set(Some(track.id));
                    }
                    if *playing {
                        self.element.play();
                    } else {
                        self.element.pause();
                    }
                }
            }
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub type PlatformServices = PlaylistServices<
    crate::db::IndexedDbTrackStore,
    crate::db::LocalStoragePosition,
    crate::components::WebAudioElement,
>;

#[cfg(not(target_arch = "wasm32"))]
pub type PlatformServices = PlaylistServices<
    crate::db::SqliteTrackStore,
    crate::db::SqlitePosition,
    crate::components::WebviewAudioElement,
>;

#[cfg(target_arch = "wasm32")]
pub fn platform_services(config: &AppConfig) -> PlatformServices {
    PlaylistServices::new(
        crate::db::IndexedDbTrackStore::new(
            &config.database_name,
            config.database_version,
            &config.store_name,
        ),
        crate::db::LocalStoragePosition::new(config.position_key.clone()),
        crate::components::WebAudioElement,
    )
}

#[cfg(not(target_arch = "wasm32"))]
pub fn platform_services(config: &AppConfig) -> PlatformServices {
    let path = crate::db::sqlite::database_path(&config.database_name);
    PlaylistServices::new(
        crate::db::SqliteTrackStore::new(&path, &config.store_name),
        crate::db::SqlitePosition::new(path, config.position_key.clone()),
        crate::components::WebviewAudioElement,
    )
}
