//! Audio Manager - drives the media element from controller effects.
//! The `play`/`ended` listeners are declared on the rendered `<audio>` element,
//! so they are bound once per mount and dropped with the component.

#[cfg(not(target_arch = "wasm32"))]
use dioxus::prelude::*;

#[cfg(target_arch = "wasm32")]
use dioxus::logger::tracing::debug;
#[cfg(target_arch = "wasm32")]
use dioxus::prelude::spawn;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::JsCast;
#[cfg(target_arch = "wasm32")]
use web_sys::{window, HtmlAudioElement};

/// Id of the `<audio>` element rendered by the player
pub const AUDIO_ELEMENT_ID: &str = "audio-playlist-audio";

/// Imperative half of the playback element.
pub trait PlaybackElement {
    fn set_source(&self, url: &str);
    fn play(&self);
    fn pause(&self);
}

/// Browser `<audio>` element looked up by id.
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone, Default)]
pub struct WebAudioElement;

#[cfg(target_arch = "wasm32")]
impl WebAudioElement {
    fn element(&self) -> Option<HtmlAudioElement> {
        let document = window()?.document()?;
        document
            .get_element_by_id(AUDIO_ELEMENT_ID)?
            .dyn_into::<HtmlAudioElement>()
            .ok()
    }
}

#[cfg(target_arch = "wasm32")]
impl PlaybackElement for WebAudioElement {
    fn set_source(&self, url: &str) {
        if let Some(audio) = self.element() {
            audio.set_src(url);
        }
    }

    fn play(&self) {
        let Some(audio) = self.element() else {
            return;
        };
        // Autoplay policy may reject the promise; the element stays paused.
        if let Ok(promise) = audio.play() {
            spawn(async move {
                if let Err(err) = wasm_bindgen_futures::JsFuture::from(promise).await {
                    debug!("play() rejected: {err:?}");
                }
            });
        }
    }

    fn pause(&self) {
        if let Some(audio) = self.element() {
            let _ = audio.pause();
        }
    }
}

/// The `<audio>` element inside the desktop webview, driven through `eval`.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone, Default)]
pub struct WebviewAudioElement;

#[cfg(not(target_arch = "wasm32"))]
impl WebviewAudioElement {
    fn run(&self, body: &str) {
        let script = format!(
            r#"(function () {{
                const audio = document.getElementById("{AUDIO_ELEMENT_ID}");
                if (!audio) return false;
                {body}
                return true;
            }})();"#
        );
        let _ = document::eval(&script);
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl PlaybackElement for WebviewAudioElement {
    fn set_source(&self, url: &str) {
        let url = serde_json::to_string(url).unwrap_or_else(|_| "\"\"".to_string());
        self.run(&format!("audio.src = {url};"));
    }

    fn play(&self) {
        self.run("audio.play().catch(function () {});");
    }

    fn pause(&self) {
        self.run("audio.pause();");
    }
}
