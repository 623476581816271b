//! Upload handler: turns the picked file into a base64 data URI.

use crate::error::{PlaylistError, Result};
use dioxus::prelude::*;

#[cfg(not(target_arch = "wasm32"))]
use base64::{engine::general_purpose, Engine as _};

#[cfg(target_arch = "wasm32")]
use crate::error::js_error_message;
#[cfg(target_arch = "wasm32")]
use js_sys::Promise;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
#[cfg(target_arch = "wasm32")]
use wasm_bindgen_futures::JsFuture;
#[cfg(target_arch = "wasm32")]
use web_sys::{window, Event, FileReader, HtmlInputElement};

/// Id of the hidden file input
pub const UPLOAD_INPUT_ID: &str = "audio-upload";

/// Read the first selected file as `data:<mime>;base64,...`.
#[cfg(target_arch = "wasm32")]
pub async fn read_selected_file(_event: FormEvent) -> Result<String> {
    let unreadable = |e: JsValue| PlaylistError::FileRead(js_error_message(&e));
    let file = window()
        .and_then(|w| w.document())
        .and_then(|d| d.get_element_by_id(UPLOAD_INPUT_ID))
        .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
        .and_then(|input| input.files())
        .and_then(|files| files.get(0))
        .ok_or_else(|| PlaylistError::FileRead("no file selected".to_string()))?;

    let reader = FileReader::new().map_err(unreadable)?;
    let loaded = Promise::new(&mut |resolve, reject| {
        let done = reader.clone();
        let on_load = Closure::once_into_js(move |_event: Event| {
            let result = done.result().unwrap_or(JsValue::UNDEFINED);
            let _ = resolve.call1(&JsValue::NULL, &result);
        });
        let failed = reader.clone();
        let on_error = Closure::once_into_js(move |_event: Event| {
            let reason = failed.error().map(JsValue::from).unwrap_or(JsValue::UNDEFINED);
            let _ = reject.call1(&JsValue::NULL, &reason);
        });
        reader.set_onload(Some(on_load.unchecked_ref()));
        reader.set_onerror(Some(on_error.unchecked_ref()));
    });

    reader.read_as_data_url(&file).map_err(unreadable)?;
    JsFuture::from(loaded)
        .await
        .map_err(unreadable)?
        .as_string()
        .ok_or_else(|| PlaylistError::FileRead("reader produced no data URI".to_string()))
}

/// Read the first selected file as `data:<mime>;base64,...`.
#[cfg(not(target_arch = "wasm32"))]
pub async fn read_selected_file(event: FormEvent) -> Result<String> {
    let file = event
        .files()
        .into_iter()
        .next()
        .ok_or_else(|| PlaylistError::FileRead("no file selected".to_string()))?;
    let name = file.name();
    let bytes = file
        .read_bytes()
        .await
        .map_err(|e| PlaylistError::FileRead(format!("{name}: {e}")))?;
    let mime = audio_mime_type(file.content_type().as_deref(), &name);
    Ok(encode_data_uri(mime, &bytes))
}

#[cfg(not(target_arch = "wasm32"))]
pub fn encode_data_uri(mime: &str, bytes: &[u8]) -> String {
    let encoded = general_purpose::STANDARD.encode(bytes);
    format!("data:{mime};base64,{encoded}")
}

/// Best MIME type for an upload: the reported content type, else the file extension.
#[cfg(not(target_arch = "wasm32"))]
pub fn audio_mime_type(content_type: Option<&str>, file_name: &str) -> &'static str {
    if let Some(content_type) = content_type {
        let normalized = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        if normalized.starts_with("audio/") {
            return match normalized.as_str() {
                "audio/flac" | "audio/x-flac" => "audio/flac",
                "audio/ogg" => "audio/ogg",
                "audio/mp4" | "audio/x-m4a" => "audio/mp4",
                "audio/aac" => "audio/aac",
                "audio/wav" | "audio/x-wav" | "audio/wave" => "audio/wav",
                "audio/webm" => "audio/webm",
                "audio/opus" => "audio/opus",
                _ => "audio/mpeg",
            };
        }
    }

    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "flac" => "audio/flac",
        "ogg" | "oga" => "audio/ogg",
        "opus" => "audio/opus",
        "m4a" | "mp4" => "audio/mp4",
        "aac" => "audio/aac",
        "wav" => "audio/wav",
        "webm" => "audio/webm",
        _ => "audio/mpeg",
    }
}
