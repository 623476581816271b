//! The components module contains the player widget and its playback/upload plumbing.

mod audio_manager;
mod audio_player;
mod upload;

pub use audio_manager::*;
pub use audio_player::*;
pub use upload::*;

#[cfg(test)]
pub(crate) use audio_manager::recording;
