//! IndexedDB track store for the browser build.
//!
//! The database holds one object store created with `autoIncrement: true`;
//! each record is `{ url: string }` and its key is the track identifier.

use super::{Track, TrackStore};
use crate::error::{js_error_message, PlaylistError, Result};
use async_trait::async_trait;
use dioxus::logger::tracing::{debug, error, warn};
use js_sys::{Array, Object, Promise, Reflect};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    window, Event, IdbDatabase, IdbObjectStoreParameters, IdbOpenDbRequest, IdbRequest,
    IdbTransactionMode, IdbVersionChangeEvent,
};

/// Attach success/error handlers now and resolve with the request's result.
///
/// Handlers are attached before the caller yields so a request that
/// completes while another one is awaited is not missed.
fn request_future(request: &IdbRequest) -> JsFuture {
    let promise = Promise::new(&mut |resolve, reject| {
        let success_request = request.clone();
        let on_success = Closure::once_into_js(move |_event: Event| {
            let value = success_request.result().unwrap_or(JsValue::UNDEFINED);
            let _ = resolve.call1(&JsValue::NULL, &value);
        });
        let error_request = request.clone();
        let on_error = Closure::once_into_js(move |_event: Event| {
            let reason = error_request
                .error()
                .ok()
                .flatten()
                .map(JsValue::from)
                .unwrap_or(JsValue::UNDEFINED);
            let _ = reject.call1(&JsValue::NULL, &reason);
        });
        request.set_onsuccess(Some(on_success.unchecked_ref()));
        request.set_onerror(Some(on_error.unchecked_ref()));
    });
    JsFuture::from(promise)
}

fn record_url(value: &JsValue) -> Option<String> {
    Reflect::get(value, &JsValue::from_str("url"))
        .ok()
        .and_then(|url| url.as_string())
}

#[derive(Debug, Clone)]
pub struct IndexedDbTrackStore {
    database_name: String,
    version: u32,
    store_name: String,
    db: Rc<RefCell<Option<IdbDatabase>>>,
}

impl IndexedDbTrackStore {
    pub fn new(database_name: &str, version: u32, store_name: &str) -> Self {
        Self {
            database_name: database_name.to_string(),
            version,
            store_name: store_name.to_string(),
            db: Rc::new(RefCell::new(None)),
        }
    }

    fn database(&self) -> Option<IdbDatabase> {
        self.db.borrow().clone()
    }
}

#[async_trait(?Send)]
impl TrackStore for IndexedDbTrackStore {
    async fn initialize(&self) -> Result<()> {
        let open = |e: JsValue| PlaylistError::StorageOpen(js_error_message(&e));
        let factory = window()
            .ok_or_else(|| PlaylistError::StorageOpen("no window".to_string()))?
            .indexed_db()
            .map_err(open)?
            .ok_or_else(|| PlaylistError::StorageOpen("IndexedDB unavailable".to_string()))?;
        let request = factory
            .open_with_u32(&self.database_name, self.version)
            .map_err(open)?;

        let store_name = self.store_name.clone();
        let on_upgrade = Closure::once_into_js(move |event: IdbVersionChangeEvent| {
            let db = event
                .target()
                .and_then(|target| target.dyn_into::<IdbOpenDbRequest>().ok())
                .and_then(|request| request.result().ok())
                .and_then(|result| result.dyn_into::<IdbDatabase>().ok());
            let Some(db) = db else {
                error!("upgrade fired without a database handle");
                return;
            };
            if db.object_store_names().contains(&store_name) {
                return;
            }
            let params = IdbObjectStoreParameters::new();
            params.set_auto_increment(true);
            if let Err(err) = db.create_object_store_with_optional_parameters(&store_name, &params)
            {
                error!(store = %store_name, "failed to create object store: {}", js_error_message(&err));
            }
        });
        request.set_onupgradeneeded(Some(on_upgrade.unchecked_ref()));

        let result = request_future(&request).await.map_err(open)?;
        let db = result
            .dyn_into::<IdbDatabase>()
            .map_err(|_| PlaylistError::StorageOpen("open returned no database".to_string()))?;
        if !db.object_store_names().contains(&self.store_name) {
            return Err(PlaylistError::StorageOpen(format!(
                "object store {} missing from {} v{}",
                self.store_name, self.database_name, self.version
            )));
        }

        debug!(database = %self.database_name, store = %self.store_name, "track store ready");
        *self.db.borrow_mut() = Some(db);
        Ok(())
    }

    async fn load_all(&self) -> Result<Vec<Track>> {
        let Some(db) = self.database() else {
            return Ok(Vec::new());
        };

        let read = |e: JsValue| PlaylistError::StorageRead(js_error_message(&e));
        let transaction = db
            .transaction_with_str_and_mode(&self.store_name, IdbTransactionMode::Readonly)
            .map_err(read)?;
        let store = transaction.object_store(&self.store_name).map_err(read)?;

        // Both requests run in one transaction and both list in ascending key order.
        let keys_future = request_future(&store.get_all_keys().map_err(read)?);
        let values_future = request_future(&store.get_all().map_err(read)?);
        let keys = Array::from(&keys_future.await.map_err(read)?);
        let values = Array::from(&values_future.await.map_err(read)?);

        let mut tracks = Vec::with_capacity(values.length() as usize);
        for (key, value) in keys.iter().zip(values.iter()) {
            match (key.as_f64(), record_url(&value)) {
                (Some(id), Some(url)) => tracks.push(Track::new(id as u64, url)),
                _ => warn!("skipping malformed record {:?}", key),
            }
        }
        Ok(tracks)
    }

    async fn add(&self, url: String) -> Result<Track> {
        let db = match self.database() {
            Some(db) => db,
            None => {
                // Mount may still be opening the same database; a second open is harmless.
                self.initialize().await?;
                self.database()
                    .ok_or_else(|| PlaylistError::StorageOpen("database closed".to_string()))?
            }
        };

        let write = |e: JsValue| PlaylistError::StorageWrite(js_error_message(&e));
        let transaction = db
            .transaction_with_str_and_mode(&self.store_name, IdbTransactionMode::Readwrite)
            .map_err(write)?;
        let store = transaction.object_store(&self.store_name).map_err(write)?;

        let record = Object::new();
        Reflect::set(&record, &JsValue::from_str("url"), &JsValue::from_str(&url))
            .map_err(write)?;
        let key = request_future(&store.add(&record).map_err(write)?)
            .await
            .map_err(write)?;
        let id = key
            .as_f64()
            .ok_or_else(|| PlaylistError::StorageWrite("store returned a non-numeric key".to_string()))?;

        Ok(Track::new(id as u64, url))
    }
}
