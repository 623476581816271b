//! Error types shared by the storage backends and the upload handler.

use thiserror::Error;

/// Result type alias using `PlaylistError`
pub type Result<T> = std::result::Result<T, PlaylistError>;

/// Failures of the playlist's storage and file plumbing.
///
/// None of these reach the user: the services log them and the widget keeps
/// its previous state.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlaylistError {
    /// The track store could not be opened or created
    #[error("failed to open track store: {0}")]
    StorageOpen(String),

    /// Reading records back from the track store failed
    #[error("failed to read track store: {0}")]
    StorageRead(String),

    /// A record or the position scalar could not be written
    #[error("failed to write to storage: {0}")]
    StorageWrite(String),

    /// The selected file could not be read
    #[error("failed to read selected file: {0}")]
    FileRead(String),
}

#[cfg(target_arch = "wasm32")]
pub(crate) fn js_error_message(value: &wasm_bindgen::JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}
