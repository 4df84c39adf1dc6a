//! Error types for playback management

use thiserror::Error;

/// Playback errors
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// Playlist handed to the sequencer was empty
    #[error("Playlist is empty")]
    InvalidPlaylist,

    /// Folder contained no playable tracks
    #[error("Folder contains no playable tracks")]
    EmptyFolder,

    /// Index outside the current playlist
    #[error("Index {index} out of range for playlist of {len} tracks")]
    IndexOutOfRange { index: usize, len: usize },

    /// Command sent after the playback service shut down
    #[error("Playback service is closed")]
    ServiceClosed,

    /// Session snapshot could not be decoded
    #[error("Invalid session snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
