//! Tunes - Playback Core
//!
//! Playlist sequencing and playback control, independent of any UI or
//! audio backend.
//!
//! This crate provides:
//! - Playlist sequencing (next, previous, end-of-track resolution)
//! - Repeat modes (Off, All, One) cycled in that order
//! - Shuffle that never skips or re-plays the current track
//! - Folder playback with lexicographic or natural ordering
//! - A controller driving a pluggable media engine
//! - Observer-based track change notifications
//! - A command-queue service that serializes host and engine events
//! - Session snapshots for process-restart recovery
//!
//! # Architecture
//!
//! The [`sequencer`] is pure decision logic over a [`PlaybackSession`]. The
//! [`PlaybackController`] owns the session, asks the sequencer what to play
//! and drives a [`MediaEngine`] supplied by the platform. The
//! [`PlaybackService`] runs a controller on its own thread so that engine
//! callbacks and host commands never race.
//!
//! # Example: Folder Playback
//!
//! ```rust
//! use tunes_playback::{FolderOrder, PlaybackConfig, PlaybackController, Step, Track};
//! # use tunes_playback::MediaEngine;
//! # #[derive(Default)]
//! # struct SilentEngine { playing: bool }
//! # impl MediaEngine for SilentEngine {
//! #     fn load(&mut self, _track: &Track) {}
//! #     fn play(&mut self) { self.playing = true; }
//! #     fn pause(&mut self) { self.playing = false; }
//! #     fn resume(&mut self) { self.playing = true; }
//! #     fn stop(&mut self) { self.playing = false; }
//! #     fn is_playing(&self) -> bool { self.playing }
//! # }
//!
//! let config = PlaybackConfig {
//!     folder_order: FolderOrder::Lexicographic,
//!     ..PlaybackConfig::default()
//! };
//! let mut controller =
//!     PlaybackController::with_engine(&config, Box::new(SilentEngine::default()));
//!
//! controller
//!     .play_folder(vec![
//!         Track::from_locator("/music/C.mp3"),
//!         Track::from_locator("/music/A.mp3"),
//!         Track::from_locator("/music/B.mp3"),
//!     ])
//!     .unwrap();
//!
//! assert_eq!(controller.track_names(), vec!["A.mp3", "B.mp3", "C.mp3"]);
//! assert_eq!(controller.next(), Step::Play(1));
//! ```
//!
//! # Example: Platform Integration
//!
//! ```rust,no_run
//! use tunes_playback::{MediaEngine, FinishedNotifier, PlaybackController, PlaybackService, Track};
//!
//! struct PlatformEngine {
//!     on_finished: Option<FinishedNotifier>,
//!     playing: bool,
//! }
//!
//! impl MediaEngine for PlatformEngine {
//!     fn load(&mut self, track: &Track) {
//!         // hand track.locator to the platform player
//!     }
//!     fn play(&mut self) { self.playing = true; }
//!     fn pause(&mut self) { self.playing = false; }
//!     fn resume(&mut self) { self.playing = true; }
//!     fn stop(&mut self) { self.playing = false; }
//!     fn is_playing(&self) -> bool { self.playing }
//!     fn set_finished_notifier(&mut self, notifier: FinishedNotifier) {
//!         // call notifier.notify() from the platform's completion callback
//!         self.on_finished = Some(notifier);
//!     }
//! }
//!
//! let service = PlaybackService::spawn(PlaybackController::default(), 32).unwrap();
//! service
//!     .attach_engine(Box::new(PlatformEngine { on_finished: None, playing: false }))
//!     .unwrap();
//! let (_id, events) = service.subscribe().unwrap();
//! service.play_track(Track::from_locator("/music/song.mp3")).unwrap();
//! println!("{:?}", events.recv().unwrap());
//! ```

mod command;
mod controller;
mod engine;
mod error;
mod events;
pub mod folder;
pub mod order;
pub mod sequencer;
mod service;
mod session;
mod shuffle;
mod snapshot;
pub mod types;

// Public exports
pub use command::{CommandOutcome, TransportCommand};
pub use controller::{PlaybackController, PlaybackStatus};
pub use engine::{FinishedNotifier, MediaEngine};
pub use error::{PlaybackError, Result};
pub use events::{FnObserver, ObserverId, Observers, PlaybackEvent, PlaybackObserver};
pub use order::FolderOrder;
pub use sequencer::Step;
pub use service::PlaybackService;
pub use session::PlaybackSession;
pub use shuffle::ShuffleOrder;
pub use snapshot::SessionSnapshot;
pub use types::{PlaybackConfig, RepeatMode, Track};
