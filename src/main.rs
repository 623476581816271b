use dioxus::prelude::*;

mod components;
mod config;
mod db;
mod error;
mod playlist;
mod session;

use components::AudioPlayer;

const APP_CSS: Asset = asset!("/assets/styling/app.css");

fn main() {
    let config = config::load_config();
    if let Err(err) = dioxus::logger::init(config.log_level()) {
        eprintln!("Failed to initialize logger: {err}");
    }

    dioxus::LaunchBuilder::new().with_context(config).launch(App);
}

#[component]
fn App() -> Element {
    rsx! {
        document::Meta { name: "theme-color", content: "#000000" }
        document::Title { "Audio Playlist" }
        document::Stylesheet { href: APP_CSS }

        AudioPlayer {}
    }
}
