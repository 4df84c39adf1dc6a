//! Playback session state
//!
//! One cohesive value holding everything a transport command can change:
//! playlist, current index, repeat mode, shuffle state and the play flag.
//! The sequencer mutates it through the crate-private setters below; the
//! controller owns exactly one.

use crate::shuffle::ShuffleOrder;
use crate::types::{RepeatMode, Track};

/// Mutable state of one playback instance
///
/// A session with an empty playlist is idle. It still carries repeat and
/// shuffle so that those survive until the next playlist is loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaybackSession {
    playlist: Vec<Track>,
    index: usize,
    repeat: RepeatMode,
    shuffle: bool,
    shuffle_order: Option<ShuffleOrder>,
    playing: bool,
}

impl PlaybackSession {
    /// Idle session with the given modes
    pub fn new(repeat: RepeatMode, shuffle: bool) -> Self {
        Self {
            repeat,
            shuffle,
            ..Self::default()
        }
    }

    /// Whether a playlist is loaded
    pub fn is_active(&self) -> bool {
        !self.playlist.is_empty()
    }

    pub fn playlist(&self) -> &[Track] {
        &self.playlist
    }

    pub fn len(&self) -> usize {
        self.playlist.len()
    }

    pub fn is_empty(&self) -> bool {
        self.playlist.is_empty()
    }

    /// Current index (0 for an idle session)
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.playlist.get(self.index)
    }

    pub fn track_names(&self) -> Vec<String> {
        self.playlist.iter().map(|t| t.name.clone()).collect()
    }

    pub fn repeat(&self) -> RepeatMode {
        self.repeat
    }

    pub fn shuffle(&self) -> bool {
        self.shuffle
    }

    /// Random traversal order, present only while shuffled with a playlist loaded
    pub fn shuffle_order(&self) -> Option<&ShuffleOrder> {
        self.shuffle_order.as_ref()
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub(crate) fn set_playlist(&mut self, playlist: Vec<Track>, index: usize) {
        debug_assert!(index < playlist.len());
        self.playlist = playlist;
        self.index = index;
    }

    pub(crate) fn set_index(&mut self, index: usize) {
        debug_assert!(index < self.playlist.len());
        self.index = index;
    }

    pub(crate) fn set_repeat(&mut self, repeat: RepeatMode) {
        self.repeat = repeat;
    }

    pub(crate) fn set_shuffle(&mut self, shuffle: bool) {
        self.shuffle = shuffle;
    }

    pub(crate) fn shuffle_order_mut(&mut self) -> Option<&mut ShuffleOrder> {
        self.shuffle_order.as_mut()
    }

    pub(crate) fn set_shuffle_order(&mut self, order: Option<ShuffleOrder>) {
        self.shuffle_order = order;
    }

    pub(crate) fn set_playing(&mut self, playing: bool) {
        self.playing = playing;
    }

    /// Drop the playlist, keeping repeat and shuffle
    pub(crate) fn clear(&mut self) {
        self.playlist.clear();
        self.index = 0;
        self.shuffle_order = None;
        self.playing = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_is_idle() {
        let session = PlaybackSession::new(RepeatMode::All, true);
        assert!(!session.is_active());
        assert_eq!(session.index(), 0);
        assert!(session.current_track().is_none());
        assert_eq!(session.repeat(), RepeatMode::All);
        assert!(session.shuffle());
        assert!(!session.is_playing());
    }

    #[test]
    fn clear_keeps_modes() {
        let mut session = PlaybackSession::new(RepeatMode::One, true);
        session.set_playlist(
            vec![Track::new("/a.mp3", "a.mp3"), Track::new("/b.mp3", "b.mp3")],
            1,
        );
        session.set_playing(true);

        session.clear();

        assert!(!session.is_active());
        assert!(!session.is_playing());
        assert_eq!(session.repeat(), RepeatMode::One);
        assert!(session.shuffle());
    }

    #[test]
    fn track_names_follow_playlist_order() {
        let mut session = PlaybackSession::default();
        session.set_playlist(
            vec![Track::new("/x/1.mp3", "1.mp3"), Track::new("/x/2.mp3", "2.mp3")],
            0,
        );
        assert_eq!(session.track_names(), vec!["1.mp3", "2.mp3"]);
        assert_eq!(session.current_track().unwrap().name, "1.mp3");
    }
}
