//! Shuffle order bookkeeping
//!
//! A shuffled session walks a random permutation of playlist indices
//! instead of the playlist itself. The permutation is generated with
//! Fisher-Yates (`SliceRandom::shuffle`), then adjusted so that the track
//! that is already playing is never skipped or immediately repeated.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Random traversal order over `[0, len)`
///
/// Slots `0..=cursor` have been played; the slot at `cursor` is the current track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShuffleOrder {
    order: Vec<usize>,
    cursor: usize,
}

impl ShuffleOrder {
    /// Fresh permutation whose first slot is `first`
    ///
    /// Used when shuffle is switched on mid-playback so the current track stays current.
    pub fn starting_at<R: Rng + ?Sized>(len: usize, first: usize, rng: &mut R) -> Self {
        let mut order: Vec<usize> = (0..len).collect();
        order.shuffle(rng);
        if let Some(pos) = order.iter().position(|&i| i == first) {
            order.swap(0, pos);
        }
        Self { order, cursor: 0 }
    }

    /// Fresh permutation that does not start with `last_played`
    ///
    /// Used when a repeating shuffle runs out of unplayed tracks.
    pub fn avoiding_first<R: Rng + ?Sized>(len: usize, last_played: usize, rng: &mut R) -> Self {
        let mut order: Vec<usize> = (0..len).collect();
        order.shuffle(rng);
        if len > 1 && order[0] == last_played {
            let swap_with = rng.gen_range(1..len);
            order.swap(0, swap_with);
        }
        Self { order, cursor: 0 }
    }

    /// Playlist index in the current slot
    pub fn current(&self) -> Option<usize> {
        self.order.get(self.cursor).copied()
    }

    /// Step to the next unplayed slot, `None` once every index has been played
    pub fn advance(&mut self) -> Option<usize> {
        let next = self.order.get(self.cursor + 1).copied()?;
        self.cursor += 1;
        Some(next)
    }

    /// Step back one slot, `None` at the first slot
    pub fn retreat(&mut self) -> Option<usize> {
        let prev = self.cursor.checked_sub(1)?;
        self.cursor = prev;
        self.order.get(prev).copied()
    }

    /// Move to the final slot (wrapping backwards past the start)
    pub fn jump_to_last(&mut self) -> Option<usize> {
        let last = self.order.len().checked_sub(1)?;
        self.cursor = last;
        self.order.get(last).copied()
    }

    /// Make `index` the current slot without disturbing the unplayed remainder
    pub fn reanchor(&mut self, index: usize) {
        let Some(pos) = self.order.iter().position(|&i| i == index) else {
            return;
        };
        if pos > self.cursor {
            let value = self.order.remove(pos);
            self.cursor += 1;
            self.order.insert(self.cursor, value);
        } else if pos < self.cursor {
            let value = self.order.remove(pos);
            self.order.insert(self.cursor, value);
        }
    }

    /// Number of slots not yet played
    pub fn remaining(&self) -> usize {
        self.order.len().saturating_sub(self.cursor + 1)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Full traversal order
    pub fn as_slice(&self) -> &[usize] {
        &self.order
    }
}
