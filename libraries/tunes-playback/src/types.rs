//! Core types for playback management

use crate::order::FolderOrder;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A playable audio resource
///
/// The locator is opaque to the playback core: a filesystem path, a
/// `file://` URI or a content URI are all handed to the engine unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Track {
    /// Locator handed to the media engine
    pub locator: String,

    /// Name shown to the user
    pub name: String,
}

impl Track {
    pub fn new(locator: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            locator: locator.into(),
            name: name.into(),
        }
    }

    /// Build a track whose display name is the last path segment of the locator
    pub fn from_locator(locator: impl Into<String>) -> Self {
        let locator = locator.into();
        let name = locator
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_string();
        Self { locator, name }
    }

    /// Whether the engine has anything to load
    pub fn is_playable(&self) -> bool {
        !self.locator.trim().is_empty()
    }
}

/// Repeat mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatMode {
    /// Stop when the playlist ends
    #[default]
    Off,

    /// Loop the entire playlist
    All,

    /// Loop the current track when it finishes
    One,
}

impl RepeatMode {
    /// Next mode in the Off -> All -> One -> Off cycle
    #[must_use]
    pub fn cycled(self) -> Self {
        match self {
            Self::Off => Self::All,
            Self::All => Self::One,
            Self::One => Self::Off,
        }
    }

    /// Numeric code (0 = off, 1 = all, 2 = one)
    pub fn as_code(self) -> u8 {
        match self {
            Self::Off => 0,
            Self::All => 1,
            Self::One => 2,
        }
    }

    /// Parse a numeric code; unknown codes fall back to `Off`
    pub fn from_code(code: u8) -> Self {
        match code {
            1 => Self::All,
            2 => Self::One,
            _ => Self::Off,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::All => "all",
            Self::One => "one",
        }
    }
}

impl fmt::Display for RepeatMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RepeatMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "off" => Ok(Self::Off),
            "all" => Ok(Self::All),
            "one" => Ok(Self::One),
            other => Err(format!("unknown repeat mode: {other}")),
        }
    }
}

/// Configuration for the playback controller
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Initial repeat mode (default: Off)
    pub repeat: RepeatMode,

    /// Initial shuffle state (default: false)
    pub shuffle: bool,

    /// Ordering applied to folder listings (default: Natural)
    pub folder_order: FolderOrder,

    /// File extensions eligible for folder playback, lowercase without dot
    pub extensions: Vec<String>,

    /// Capacity of the playback service command queue (default: 32)
    pub command_capacity: usize,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            repeat: RepeatMode::Off,
            shuffle: false,
            folder_order: FolderOrder::Natural,
            extensions: ["mp3", "flac", "ogg", "opus", "m4a", "aac", "wav"]
                .iter()
                .map(|ext| (*ext).to_string())
                .collect(),
            command_capacity: 32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = PlaybackConfig::default();
        assert_eq!(config.repeat, RepeatMode::Off);
        assert!(!config.shuffle);
        assert_eq!(config.folder_order, FolderOrder::Natural);
        assert!(config.extensions.iter().any(|ext| ext == "mp3"));
        assert_eq!(config.command_capacity, 32);
    }

    #[test]
    fn track_name_from_locator() {
        let track = Track::from_locator("/storage/music/Intro.mp3");
        assert_eq!(track.name, "Intro.mp3");
        assert_eq!(track.locator, "/storage/music/Intro.mp3");

        let bare = Track::from_locator("song.flac");
        assert_eq!(bare.name, "song.flac");
    }

    #[test]
    fn blank_locator_is_not_playable() {
        assert!(!Track::new("  ", "nothing").is_playable());
        assert!(Track::new("a.mp3", "a").is_playable());
    }

    #[test]
    fn repeat_cycles_through_all_modes() {
        assert_eq!(RepeatMode::Off.cycled(), RepeatMode::All);
        assert_eq!(RepeatMode::All.cycled(), RepeatMode::One);
        assert_eq!(RepeatMode::One.cycled(), RepeatMode::Off);
    }

    #[test]
    fn repeat_codes_and_names() {
        for mode in [RepeatMode::Off, RepeatMode::All, RepeatMode::One] {
            assert_eq!(RepeatMode::from_code(mode.as_code()), mode);
            assert_eq!(mode.as_str().parse::<RepeatMode>().unwrap(), mode);
        }
        assert_eq!(RepeatMode::from_code(9), RepeatMode::Off);
        assert!("twice".parse::<RepeatMode>().is_err());
    }

    #[test]
    fn config_deserializes_with_defaults() {
        let config: PlaybackConfig =
            serde_json::from_str(r#"{"repeat":"all","folder_order":"lexicographic"}"#).unwrap();
        assert_eq!(config.repeat, RepeatMode::All);
        assert_eq!(config.folder_order, FolderOrder::Lexicographic);
        assert_eq!(config.command_capacity, 32);
    }
}
