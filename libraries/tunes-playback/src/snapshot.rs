//! Session snapshot for process-restart recovery
//!
//! The host stores the snapshot as an opaque key/value bag and hands it back
//! after a restart. Missing keys fall back to defaults, so a bag written by an
//! older build still restores.

use crate::error::Result;
use crate::session::PlaybackSession;
use crate::types::RepeatMode;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Scalar session state plus the visible track list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSnapshot {
    pub repeat_mode: RepeatMode,
    pub shuffle: bool,
    pub playing: bool,
    pub track_names: Vec<String>,
    pub current_index: usize,
}

impl SessionSnapshot {
    pub fn capture(session: &PlaybackSession) -> Self {
        Self {
            repeat_mode: session.repeat(),
            shuffle: session.shuffle(),
            playing: session.is_playing(),
            track_names: session.track_names(),
            current_index: session.index(),
        }
    }

    /// Flatten into a key/value bag
    pub fn to_bag(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }

    pub fn from_bag(bag: &Map<String, Value>) -> Result<Self> {
        Ok(serde_json::from_value(Value::Object(bag.clone()))?)
    }
}
