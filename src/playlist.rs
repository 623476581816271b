//! Playlist controller: selection state as an explicit state machine.
//!
//! Transitions never touch storage or the media element directly. Each one
//! returns the [`Effect`]s it requires and the caller applies them, so the
//! controller is plain data and can be driven from tests.

use crate::db::Track;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaylistState {
    #[default]
    Empty,
    Loaded { index: usize, playing: bool },
}

/// Side effect declared by a transition
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Show `track` in the playback element, playing or paused.
    /// `reload` reassigns the source even when `track` is already shown.
    Present {
        track: Track,
        playing: bool,
        reload: bool,
    },
    /// Persist `index` as the last selected position
    RememberPosition(usize),
}

#[derive(Debug, Clone, Default)]
pub struct PlaylistController {
    tracks: Vec<Track>,
    state: PlaylistState,
    remember_auto_advance: bool,
}

impl PlaylistController {
    pub fn new(remember_auto_advance: bool) -> Self {
        Self {
            remember_auto_advance,
            ..Self::default()
        }
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    #[cfg(test)]
    pub fn state(&self) -> PlaylistState {
        self.state
    }

    pub fn current_index(&self) -> Option<usize> {
        match self.state {
            PlaylistState::Empty => None,
            PlaylistState::Loaded { index, .. } => Some(index),
        }
    }

    #[cfg(test)]
    pub fn is_playing(&self) -> bool {
        matches!(self.state, PlaylistState::Loaded { playing: true, .. })
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.current_index().and_then(|index| self.tracks.get(index))
    }

    /// Mount: adopt the stored tracks and the restored position.
    ///
    /// A restored index past the end falls back to the first track.
    pub fn load(&mut self, tracks: Vec<Track>, restored: Option<usize>) -> Vec<Effect> {
        self.tracks = tracks;
        if self.tracks.is_empty() {
            self.state = PlaylistState::Empty;
            return Vec::new();
        }

        let index = restored.filter(|&i| i < self.tracks.len()).unwrap_or(0);
        self.state = PlaylistState::Loaded {
            index,
            playing: false,
        };
        self.present()
    }

    /// Manual selection. Always pauses and records the position.
    pub fn select(&mut self, index: usize) -> Vec<Effect> {
        if self.state == PlaylistState::Empty || index >= self.tracks.len() {
            return Vec::new();
        }

        self.state = PlaylistState::Loaded {
            index,
            playing: false,
        };
        let mut effects = self.present_with(true);
        effects.push(Effect::RememberPosition(index));
        effects
    }

    /// The element finished the current track: advance, wrapping to the start.
    pub fn track_ended(&mut self) -> Vec<Effect> {
        let PlaylistState::Loaded { index, playing } = self.state else {
            return Vec::new();
        };

        let next = if index + 1 < self.tracks.len() { index + 1 } else { 0 };
        self.state = PlaylistState::Loaded {
            index: next,
            playing,
        };

        let mut effects = self.present();
        if self.remember_auto_advance {
            effects.push(Effect::RememberPosition(next));
        }
        effects
    }

    /// A stored upload came back from the track store.
    pub fn upload_completed(&mut self, track: Track) -> Vec<Effect> {
        // Concurrent uploads may complete out of key order.
        let slot = self.tracks.partition_point(|existing| existing.id < track.id);
        self.tracks.insert(slot, track);

        self.state = match self.state {
            PlaylistState::Empty => PlaylistState::Loaded {
                index: 0,
                playing: false,
            },
            PlaylistState::Loaded { index, playing } if slot <= index => PlaylistState::Loaded {
                index: index + 1,
                playing,
            },
            loaded => loaded,
        };
        self.present()
    }

    /// The element reported that playback started.
    pub fn playback_started(&mut self) -> Vec<Effect> {
        match self.state {
            PlaylistState::Loaded {
                index,
                playing: false,
            } => {
                self.state = PlaylistState::Loaded {
                    index,
                    playing: true,
                };
                self.present()
            }
            _ => Vec::new(),
        }
    }

    fn present(&self) -> Vec<Effect> {
        self.present_with(false)
    }

    fn present_with(&self, reload: bool) -> Vec<Effect> {
        match (self.current_track(), self.state) {
            (Some(track), PlaylistState::Loaded { playing, .. }) => vec![Effect::Present {
                track: track.clone(),
                playing,
                reload,
            }],
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracks(count: u64) -> Vec<Track> {
        (1..=count)
            .map(|id| Track::new(id, format!("data:audio/mpeg;base64,{id}")))
            .collect()
    }

    fn loaded(count: u64, restored: Option<usize>) -> PlaylistController {
        let mut controller = PlaylistController::new(false);
        controller.load(tracks(count), restored);
        controller
    }

    #[test]
    fn load_of_empty_store_stays_empty() {
        let mut controller = PlaylistController::new(false);
        assert!(controller.load(Vec::new(), Some(2)).is_empty());
        assert_eq!(controller.state(), PlaylistState::Empty);
        assert!(controller.current_track().is_none());
    }

    #[test]
    fn load_restores_position_paused() {
        let mut controller = PlaylistController::new(false);
        let effects = controller.load(tracks(3), Some(1));
        assert_eq!(
            controller.state(),
            PlaylistState::Loaded {
                index: 1,
                playing: false
            }
        );
        assert_eq!(
            effects,
            vec![Effect::Present {
                track: controller.tracks()[1].clone(),
                playing: false,
                reload: false
            }]
        );
    }

    #[test]
    fn load_without_position_starts_at_zero() {
        assert_eq!(loaded(2, None).current_index(), Some(0));
    }

    #[test]
    fn load_with_stale_position_starts_at_zero() {
        assert_eq!(loaded(2, Some(5)).current_index(), Some(0));
    }

    #[test]
    fn select_always_pauses() {
        for was_playing in [false, true] {
            let mut controller = loaded(3, Some(0));
            if was_playing {
                controller.playback_started();
            }
            controller.select(2);
            assert!(!controller.is_playing());
            assert_eq!(controller.current_index(), Some(2));
        }
    }

    #[test]
    fn select_while_playing_remembers_position() {
        let mut controller = loaded(3, None);
        controller.playback_started();
        let effects = controller.select(1);
        assert_eq!(
            controller.state(),
            PlaylistState::Loaded {
                index: 1,
                playing: false
            }
        );
        assert!(matches!(
            &effects[0],
            Effect::Present { track, playing: false, reload: true } if track.id == 2
        ));
        assert_eq!(effects[1], Effect::RememberPosition(1));
    }

    #[test]
    fn select_out_of_range_is_ignored() {
        let mut controller = loaded(2, Some(1));
        assert!(controller.select(2).is_empty());
        assert_eq!(controller.current_index(), Some(1));

        let mut empty = PlaylistController::new(false);
        assert!(empty.select(0).is_empty());
    }

    #[test]
    fn track_ended_advances() {
        let mut controller = loaded(3, Some(0));
        controller.playback_started();
        let effects = controller.track_ended();
        assert_eq!(
            controller.state(),
            PlaylistState::Loaded {
                index: 1,
                playing: true
            }
        );
        assert!(matches!(&effects[..], [Effect::Present { playing: true, .. }]));
    }

    #[test]
    fn track_ended_on_last_wraps_to_first() {
        let mut controller = loaded(3, Some(2));
        controller.track_ended();
        assert_eq!(controller.current_index(), Some(0));
    }

    #[test]
    fn track_ended_keeps_paused_flag() {
        let mut controller = loaded(2, Some(0));
        controller.track_ended();
        assert!(!controller.is_playing());
    }

    #[test]
    fn track_ended_does_not_remember_by_default() {
        let mut controller = loaded(3, Some(0));
        let effects = controller.track_ended();
        assert!(!effects
            .iter()
            .any(|effect| matches!(effect, Effect::RememberPosition(_))));
    }

    #[test]
    fn track_ended_remembers_when_configured() {
        let mut controller = PlaylistController::new(true);
        controller.load(tracks(2), Some(1));
        let effects = controller.track_ended();
        assert_eq!(effects.last(), Some(&Effect::RememberPosition(0)));
    }

    #[test]
    fn reselecting_current_track_forces_reload() {
        let mut controller = loaded(2, Some(0));
        controller.playback_started();
        let effects = controller.select(0);
        assert!(matches!(
            &effects[0],
            Effect::Present { track, playing: false, reload: true } if track.id == 1
        ));
    }

    #[test]
    fn automatic_transitions_do_not_force_reload() {
        let mut controller = loaded(2, Some(0));
        let started = controller.playback_started();
        let ended = controller.track_ended();
        assert!(started
            .iter()
            .chain(ended.iter())
            .all(|effect| matches!(effect, Effect::Present { reload: false, .. })));
    }

    #[test]
    fn single_track_wraps_onto_itself() {
        let mut controller = loaded(1, None);
        controller.track_ended();
        assert_eq!(controller.current_index(), Some(0));
    }

    #[test]
    fn first_upload_becomes_current() {
        let mut controller = PlaylistController::new(false);
        let track = Track::new(1, "data:audio/mpeg;base64,AA==");
        let effects = controller.upload_completed(track.clone());
        assert_eq!(controller.len(), 1);
        assert_eq!(
            controller.state(),
            PlaylistState::Loaded {
                index: 0,
                playing: false
            }
        );
        assert_eq!(
            effects,
            vec![Effect::Present {
                track,
                playing: false,
                reload: false
            }]
        );
    }

    #[test]
    fn upload_appends_without_moving_selection() {
        let mut controller = loaded(2, Some(1));
        controller.playback_started();
        controller.upload_completed(Track::new(3, "data:audio/ogg;base64,AA=="));
        assert_eq!(controller.len(), 3);
        assert_eq!(controller.current_track().map(|t| t.id), Some(2));
        assert!(controller.is_playing());
    }

    #[test]
    fn late_upload_keeps_key_order_and_current_track() {
        let mut controller = PlaylistController::new(false);
        controller.load(vec![Track::new(1, "a"), Track::new(3, "c")], Some(1));
        controller.upload_completed(Track::new(2, "b"));

        let ids: Vec<u64> = controller.tracks().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(controller.current_track().map(|t| t.id), Some(3));
    }

    #[test]
    fn playback_started_sets_playing_once() {
        let mut controller = loaded(2, None);
        assert_eq!(controller.playback_started().len(), 1);
        assert!(controller.is_playing());
        assert!(controller.playback_started().is_empty());
    }

    #[test]
    fn playback_started_while_empty_is_ignored() {
        let mut controller = PlaylistController::new(false);
        assert!(controller.playback_started().is_empty());
        assert_eq!(controller.state(), PlaylistState::Empty);
    }
}
