use crate::components::{read_selected_file, AUDIO_ELEMENT_ID, UPLOAD_INPUT_ID};
use crate::config::AppConfig;
use crate::playlist::{Effect, PlaylistController};
use crate::session::platform_services;
use dioxus::logger::tracing::warn;
use dioxus::prelude::*;
use futures_util::StreamExt;

#[component]
pub fn AudioPlayer() -> Element {
    let config = use_context::<AppConfig>();
    let services = use_hook(|| platform_services(&config));
    let mut controller = use_signal(|| PlaylistController::new(config.remember_auto_advance));

    // Effects run one batch at a time so element updates and position writes
    // keep the order the controller emitted them in.
    let effect_queue = {
        let services = services.clone();
        use_coroutine(move |mut rx: UnboundedReceiver<Vec<Effect>>| {
            let services = services.clone();
            async move {
                while let Some(effects) = rx.next().await {
                    services.apply(&effects).await;
                }
            }
        })
    };

    // Load stored tracks and the remembered position once on mount.
    {
        let services = services.clone();
        use_effect(move || {
            let services = services.clone();
            spawn(async move {
                let (tracks, restored) = services.mount().await;
                let effects = controller.write().load(tracks, restored);
                effect_queue.send(effects);
            });
        });
    }

    let on_play = move |_| {
        let effects = controller.write().playback_started();
        effect_queue.send(effects);
    };

    let on_ended = move |_| {
        let effects = controller.write().track_ended();
        effect_queue.send(effects);
    };

    let on_upload = {
        let services = services.clone();
        move |evt: FormEvent| {
            let services = services.clone();
            let mut controller = controller.clone();
            spawn(async move {
                let url = match read_selected_file(evt).await {
                    Ok(url) => url,
                    Err(err) => {
                        warn!("{err}");
                        return;
                    }
                };
                if let Some(track) = services.upload(url).await {
                    let effects = controller.write().upload_completed(track);
                    effect_queue.send(effects);
                }
            });
        }
    };

    let (track_ids, current_index) = {
        let snapshot = controller.read();
        let ids: Vec<u64> = snapshot.tracks().iter().map(|track| track.id).collect();
        (ids, snapshot.current_index())
    };

    rsx! {
        div { class: "player-page",
            div { class: "player-card",
                div { class: "now-playing",
                    h2 { class: "now-playing__title", "Now Playing" }
                    div { class: "now-playing__body",
                        audio {
                            id: AUDIO_ELEMENT_ID,
                            controls: true,
                            onplay: on_play,
                            onended: on_ended,
                        }
                        if let Some(index) = current_index {
                            p { class: "now-playing__caption", "mp3...... {index + 1}" }
                        }
                    }
                }

                div { class: "playlist",
                    h2 { class: "playlist__title", "Playlist" }
                    ul {
                        for (idx, track_id) in track_ids.into_iter().enumerate() {
                            {
                                let is_current = Some(idx) == current_index;
                                rsx! {
                                    li {
                                        key: "{track_id}",
                                        class: if is_current { "playlist__row playlist__row--current" } else { "playlist__row" },
                                        onclick: move |_| {
                                            let effects = controller.write().select(idx);
                                            effect_queue.send(effects);
                                        },
                                        "{idx + 1}. mp3"
                                    }
                                }
                            }
                        }
                    }

                    div { class: "upload",
                        input {
                            r#type: "file",
                            accept: "audio/*",
                            id: UPLOAD_INPUT_ID,
                            class: "upload__input",
                            onchange: on_upload,
                        }
                        label { r#for: UPLOAD_INPUT_ID, class: "upload__button", "Upload Audio" }
                    }
                }
            }
        }
    }
}
