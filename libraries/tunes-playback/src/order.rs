//! Folder ordering
//!
//! Comparators used to order a folder listing before it becomes a playlist.
//! The sequencer never sorts; whoever loads a folder picks one of these.

use crate::types::Track;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::iter::Peekable;
use std::str::Chars;

/// How tracks from a folder are ordered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FolderOrder {
    /// Plain string order on the display name ("10.mp3" < "2.mp3")
    Lexicographic,

    /// Digit runs compared by value, letters case-insensitively ("2.mp3" < "10.mp3")
    #[default]
    Natural,
}

impl FolderOrder {
    pub fn compare(self, a: &Track, b: &Track) -> Ordering {
        match self {
            Self::Lexicographic => a.name.cmp(&b.name),
            Self::Natural => natural_cmp(&a.name, &b.name),
        }
    }

    /// Sort tracks in place (stable)
    pub fn sort(self, tracks: &mut [Track]) {
        tracks.sort_by(|a, b| self.compare(a, b));
    }
}

/// Natural ordering of two names
///
/// Ties on the natural key fall back to plain string order so the result is total.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut left = a.chars().peekable();
    let mut right = b.chars().peekable();

    loop {
        match (left.peek().copied(), right.peek().copied()) {
            (None, None) => return a.cmp(b),
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(l), Some(r)) if l.is_ascii_digit() && r.is_ascii_digit() => {
                let l_run = take_digits(&mut left);
                let r_run = take_digits(&mut right);
                let ord = compare_digit_runs(&l_run, &r_run);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            (Some(l), Some(r)) => {
                let ord = l.to_lowercase().cmp(r.to_lowercase());
                if ord != Ordering::Equal {
                    return ord;
                }
                left.next();
                right.next();
            }
        }
    }
}

fn take_digits(chars: &mut Peekable<Chars<'_>>) -> String {
    let mut run = String::new();
    while let Some(c) = chars.next_if(char::is_ascii_digit) {
        run.push(c);
    }
    run
}

fn compare_digit_runs(a: &str, b: &str) -> Ordering {
    let a_trimmed = a.trim_start_matches('0');
    let b_trimmed = b.trim_start_matches('0');
    a_trimmed
        .len()
        .cmp(&b_trimmed.len())
        .then_with(|| a_trimmed.cmp(b_trimmed))
}
