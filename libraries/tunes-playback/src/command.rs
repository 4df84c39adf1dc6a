//! Transport commands
//!
//! The host talks to the controller in terms of these values, either by
//! calling [`PlaybackController::execute`](crate::PlaybackController::execute)
//! directly or by queueing them on a [`PlaybackService`](crate::PlaybackService).

use crate::sequencer::Step;
use crate::types::{RepeatMode, Track};

/// A transport command issued by the host or by the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportCommand {
    /// Play a single track
    PlayTrack(Track),

    /// Play a folder listing (ordered by the controller)
    PlayFolder(Vec<Track>),

    /// Jump to an index in the current playlist
    PlayAt(usize),

    /// Toggle between playing and paused
    PauseOrResume,

    /// Skip forward
    Next,

    /// Skip back
    Previous,

    /// Off -> All -> One -> Off
    CycleRepeat,

    /// Flip shuffle
    ToggleShuffle,

    /// Stop and drop the playlist
    Stop,

    /// The engine finished (or failed) the track loaded under this generation
    TrackFinished(u64),
}

/// What a command produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    /// Command applied, nothing to report
    Done,

    /// New playing state
    Playing(bool),

    /// Navigation result
    Step(Step),

    /// New repeat mode
    Repeat(RepeatMode),

    /// New shuffle state
    Shuffle(bool),

    /// Stale engine report for a track that is no longer loaded
    Ignored,
}

impl CommandOutcome {
    pub fn playing(self) -> Option<bool> {
        match self {
            Self::Playing(playing) => Some(playing),
            _ => None,
        }
    }

    pub fn step(self) -> Option<Step> {
        match self {
            Self::Step(step) => Some(step),
            _ => None,
        }
    }

    pub fn repeat(self) -> Option<RepeatMode> {
        match self {
            Self::Repeat(mode) => Some(mode),
            _ => None,
        }
    }

    pub fn shuffle(self) -> Option<bool> {
        match self {
            Self::Shuffle(enabled) => Some(enabled),
            _ => None,
        }
    }
}
