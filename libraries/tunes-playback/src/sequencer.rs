//! Playlist sequencing
//!
//! Decides which track plays for every transport intent. These functions
//! never touch the media engine; they only read and commit session state.
//!
//! Resolution rules:
//! - `next`: sequential or shuffled advance; past the end, `Off` stops and
//!   any other repeat mode wraps (a shuffled session gets a new permutation).
//! - `previous`: steps back; at the start, wraps to the end unless repeat is
//!   `Off`, in which case the index stays put and `AtStart` is returned.
//! - track finished: `One` replays the same index, `All` advances with
//!   wraparound, `Off` stops after the last track.

use crate::error::{PlaybackError, Result};
use crate::session::PlaybackSession;
use crate::shuffle::ShuffleOrder;
use crate::types::{RepeatMode, Track};
use rand::thread_rng;
use tracing::debug;

/// Outcome of a navigation request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Play the track at this index (already committed to the session)
    Play(usize),

    /// Nothing left to play; index unchanged
    Stop,

    /// Already at the first track; index unchanged
    AtStart,
}

impl Step {
    pub fn index(self) -> Option<usize> {
        match self {
            Self::Play(index) => Some(index),
            Self::Stop | Self::AtStart => None,
        }
    }
}

/// Replace the playlist and start at `start_index`
///
/// Repeat and shuffle are preserved. A shuffled session gets a fresh
/// permutation beginning at `start_index`. On error the session is untouched.
pub fn load_playlist(
    session: &mut PlaybackSession,
    tracks: Vec<Track>,
    start_index: usize,
) -> Result<()> {
    if tracks.is_empty() {
        return Err(PlaybackError::InvalidPlaylist);
    }
    if start_index >= tracks.len() {
        return Err(PlaybackError::IndexOutOfRange {
            index: start_index,
            len: tracks.len(),
        });
    }

    let len = tracks.len();
    session.set_playlist(tracks, start_index);
    let order = session
        .shuffle()
        .then(|| ShuffleOrder::starting_at(len, start_index, &mut thread_rng()));
    session.set_shuffle_order(order);

    debug!(len, start_index, shuffle = session.shuffle(), "Playlist loaded");
    Ok(())
}

/// Make `index` current
///
/// Under shuffle the jumped-to track takes the current slot and every track
/// not yet played stays ahead of it.
pub fn jump_to(session: &mut PlaybackSession, index: usize) -> Result<()> {
    if index >= session.len() {
        return Err(PlaybackError::IndexOutOfRange {
            index,
            len: session.len(),
        });
    }

    session.set_index(index);
    if let Some(order) = session.shuffle_order_mut() {
        order.reanchor(index);
    }
    Ok(())
}

/// Resolve an explicit "next"
///
/// `One` does not pin an explicit skip; it wraps at the end like `All`.
pub fn resolve_next(session: &mut PlaybackSession) -> Step {
    let wrap = session.repeat() != RepeatMode::Off;
    let step = advance(session, wrap);
    debug!(?step, repeat = %session.repeat(), "Resolved next");
    step
}

/// Resolve an explicit "previous"
pub fn resolve_previous(session: &mut PlaybackSession) -> Step {
    if !session.is_active() {
        return Step::AtStart;
    }

    let wrap = session.repeat() != RepeatMode::Off;
    let index = session.index();
    let len = session.len();

    let step = if let Some(order) = session.shuffle_order_mut() {
        match order.retreat() {
            Some(prev) => Step::Play(prev),
            None if wrap => order.jump_to_last().map_or(Step::AtStart, Step::Play),
            None => Step::AtStart,
        }
    } else if index > 0 {
        Step::Play(index - 1)
    } else if wrap {
        Step::Play(len - 1)
    } else {
        Step::AtStart
    };

    if let Step::Play(prev) = step {
        session.set_index(prev);
    }
    debug!(?step, repeat = %session.repeat(), "Resolved previous");
    step
}

/// Resolve the natural end of the current track
pub fn resolve_on_track_finished(session: &mut PlaybackSession) -> Step {
    if !session.is_active() {
        return Step::Stop;
    }

    let step = match session.repeat() {
        RepeatMode::One => Step::Play(session.index()),
        RepeatMode::All => advance(session, true),
        RepeatMode::Off => advance(session, false),
    };
    debug!(?step, repeat = %session.repeat(), "Resolved track finished");
    step
}

/// Off -> All -> One -> Off
pub fn cycle_repeat(session: &mut PlaybackSession) -> RepeatMode {
    let mode = session.repeat().cycled();
    session.set_repeat(mode);
    mode
}

/// Flip shuffle, keeping the current track current
pub fn toggle_shuffle(session: &mut PlaybackSession) -> bool {
    let enabled = !session.shuffle();
    session.set_shuffle(enabled);

    let order = (enabled && session.is_active())
        .then(|| ShuffleOrder::starting_at(session.len(), session.index(), &mut thread_rng()));
    session.set_shuffle_order(order);

    enabled
}

fn advance(session: &mut PlaybackSession, wrap: bool) -> Step {
    if !session.is_active() {
        return Step::Stop;
    }

    let index = session.index();
    let len = session.len();

    let step = if let Some(order) = session.shuffle_order_mut() {
        match order.advance() {
            Some(next) => Step::Play(next),
            None if wrap => {
                *order = ShuffleOrder::avoiding_first(len, index, &mut thread_rng());
                order.current().map_or(Step::Stop, Step::Play)
            }
            None => Step::Stop,
        }
    } else if index + 1 < len {
        Step::Play(index + 1)
    } else if wrap {
        Step::Play(0)
    } else {
        Step::Stop
    };

    if let Step::Play(next) = step {
        session.set_index(next);
    }
    step
}
