//! SQLite backing for the desktop build.
//!
//! Tracks live in one table keyed by `INTEGER PRIMARY KEY AUTOINCREMENT`, the
//! persisted position and the saved config live in a `settings(key, value)`
//! table of the same file.

use super::{parse_position, PositionMemory, Track, TrackStore};
use crate::error::{PlaylistError, Result};
use async_trait::async_trait;
use dioxus::logger::tracing::debug;
use rusqlite::{params, Connection, OptionalExtension};
use std::cell::Cell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Location of `<name>.db` under the platform data directory.
pub fn database_path(database_name: &str) -> PathBuf {
    let data_dir = dirs::data_dir()
        .map(|dir| dir.join("audio-playlist"))
        .and_then(|dir| std::fs::create_dir_all(&dir).ok().map(|_| dir))
        .unwrap_or_else(|| PathBuf::from("."));
    data_dir.join(format!("{database_name}.db"))
}

fn open_connection(path: &Path) -> Result<Connection> {
    Connection::open(path).map_err(|e| {
        PlaylistError::StorageOpen(format!("{}: {e}", path.display()))
    })
}

fn ensure_settings_table(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS settings (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        )",
        [],
    )?;
    Ok(())
}

/// Table names come from config; anything outside `[A-Za-z0-9_]` is dropped.
fn table_identifier(store_name: &str) -> String {
    let cleaned: String = store_name
        .chars()
        .filter(|ch| ch.is_ascii_alphanumeric() || *ch == '_')
        .collect();
    if cleaned.is_empty() {
        "audios".to_string()
    } else {
        cleaned
    }
}

pub fn read_setting(path: &Path, key: &str) -> Result<Option<String>> {
    let conn = open_connection(path)?;
    ensure_settings_table(&conn).map_err(|e| PlaylistError::StorageOpen(e.to_string()))?;
    conn.query_row(
        "SELECT value FROM settings WHERE key = ?1",
        [key],
        |row| row.get::<_, String>(0),
    )
    .optional()
    .map_err(|e| PlaylistError::StorageRead(e.to_string()))
}

pub fn write_setting(path: &Path, key: &str, value: &str) -> Result<()> {
    let conn = open_connection(path)?;
    ensure_settings_table(&conn).map_err(|e| PlaylistError::StorageOpen(e.to_string()))?;
    conn.execute(
        "INSERT OR REPLACE INTO settings (key, value) VALUES (?1, ?2)",
        [key, value],
    )
    .map_err(|e| PlaylistError::StorageWrite(e.to_string()))?;
    Ok(())
}

/// Run blocking SQLite work off the UI thread.
async fn run_blocking<T, F>(work: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| PlaylistError::StorageRead(format!("storage task failed: {e}")))?
}

#[derive(Debug, Clone)]
pub struct SqliteTrackStore {
    path: PathBuf,
    table: String,
    initialized: Rc<Cell<bool>>,
}

impl SqliteTrackStore {
    pub fn new(path: impl Into<PathBuf>, store_name: &str) -> Self {
        Self {
            path: path.into(),
            table: table_identifier(store_name),
            initialized: Rc::new(Cell::new(false)),
        }
    }
}

#[async_trait(?Send)]
impl TrackStore for SqliteTrackStore {
    async fn initialize(&self) -> Result<()> {
        let path = self.path.clone();
        let table = self.table.clone();
        run_blocking(move || {
            let conn = open_connection(&path)?;
            conn.execute_batch(&format!(
                "CREATE TABLE IF NOT EXISTS {table} (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    url TEXT NOT NULL
                );"
            ))
            .map_err(|e| PlaylistError::StorageOpen(e.to_string()))?;
            ensure_settings_table(&conn).map_err(|e| PlaylistError::StorageOpen(e.to_string()))
        })
        .await?;

        debug!(path = %self.path.display(), table = %self.table, "track store ready");
        self.initialized.set(true);
        Ok(())
    }

    async fn load_all(&self) -> Result<Vec<Track>> {
        if !self.initialized.get() {
            return Ok(Vec::new());
        }

        let path = self.path.clone();
        let table = self.table.clone();
        let rows = run_blocking(move || {
            let conn = open_connection(&path)?;
            let mut stmt = conn
                .prepare(&format!("SELECT id, url FROM {table} ORDER BY id ASC"))
                .map_err(|e| PlaylistError::StorageRead(e.to_string()))?;
            let rows = stmt
                .query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)))
                .map_err(|e| PlaylistError::StorageRead(e.to_string()))?
                .collect::<rusqlite::Result<Vec<_>>>()
                .map_err(|e| PlaylistError::StorageRead(e.to_string()))?;
            Ok(rows)
        })
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, url)| Track::new(id as u64, url))
            .collect())
    }

    async fn add(&self, url: String) -> Result<Track> {
        if !self.initialized.get() {
            self.initialize().await?;
        }

        let path = self.path.clone();
        let table = self.table.clone();
        run_blocking(move || {
            let conn = open_connection(&path)?;
            conn.execute(&format!("INSERT INTO {table} (url) VALUES (?1)"), params![url])
                .map_err(|e| PlaylistError::StorageWrite(e.to_string()))?;
            let id = conn.last_insert_rowid() as u64;
            Ok((id, url))
        })
        .await
        .map(|(id, url)| Track::new(id, url))
    }
}

#[derive(Debug, Clone)]
pub struct SqlitePosition {
    path: PathBuf,
    key: String,
}

impl SqlitePosition {
    pub fn new(path: impl Into<PathBuf>, key: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            key: key.into(),
        }
    }
}

#[async_trait(?Send)]
impl PositionMemory for SqlitePosition {
    async fn get(&self) -> Option<usize> {
        let path = self.path.clone();
        let key = self.key.clone();
        run_blocking(move || read_setting(&path, &key))
            .await
            .ok()
            .flatten()
            .and_then(|raw| parse_position(&raw))
    }

    async fn set(&self, index: usize) -> Result<()> {
        let path = self.path.clone();
        let key = self.key.clone();
        run_blocking(move || write_setting(&path, &key, &index.to_string())).await
    }
}
