//! Media engine abstraction
//!
//! The playback core never decodes audio. It drives whatever engine the
//! platform provides (a system media player, a rodio sink, a simulated
//! clock in tests) through this trait.

use crate::types::Track;
use std::fmt;
use std::sync::Arc;

/// Platform media engine
///
/// All commands are fire-and-forget: completion and failures are reported
/// only through the [`FinishedNotifier`] handed to the engine, never through
/// return values. Engines that decode on their own thread call the notifier
/// from that thread.
pub trait MediaEngine: Send {
    /// Prepare a track for playback, replacing whatever was loaded
    fn load(&mut self, track: &Track);

    /// Start the loaded track from the beginning
    fn play(&mut self);

    /// Pause at the current position
    fn pause(&mut self);

    /// Continue from the paused position
    fn resume(&mut self);

    /// Stop and release the loaded track
    fn stop(&mut self);

    /// Whether audio is currently being rendered
    fn is_playing(&self) -> bool;

    /// Receive the callback to fire when the next loaded track ends or fails
    ///
    /// Called before every `load` with a freshly stamped notifier. Engines
    /// that never finish on their own may ignore it.
    fn set_finished_notifier(&mut self, _notifier: FinishedNotifier) {}

    /// Load then play
    fn load_and_play(&mut self, track: &Track) {
        self.load(track);
        self.play();
    }
}

/// Cloneable "track finished" callback handed to engines
///
/// Each notifier is stamped with the load generation it was issued for, so a
/// completion that arrives after the engine moved on to another track can be
/// recognised and dropped. An engine error is reported the same way as a
/// natural end of track.
#[derive(Clone)]
pub struct FinishedNotifier {
    callback: Arc<dyn Fn(u64) + Send + Sync>,
    generation: u64,
}

impl FinishedNotifier {
    /// Notifier for generation 0; `callback` receives the stamped generation
    pub fn new(callback: impl Fn(u64) + Send + Sync + 'static) -> Self {
        Self {
            callback: Arc::new(callback),
            generation: 0,
        }
    }

    /// Same callback, stamped with another generation
    #[must_use]
    pub fn for_generation(&self, generation: u64) -> Self {
        Self {
            callback: Arc::clone(&self.callback),
            generation,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Report that the track this notifier was issued for finished (or failed)
    pub fn notify(&self) {
        (self.callback)(self.generation);
    }
}

impl fmt::Debug for FinishedNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FinishedNotifier")
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

/// Engine commands recorded by [`RecordingEngine`]
#[cfg(test)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCall {
    Load(String),
    Play,
    Pause,
    Resume,
    Stop,
}

/// Engine that records every command for assertions
#[cfg(test)]
#[derive(Clone, Default)]
pub struct RecordingEngine {
    calls: Arc<std::sync::Mutex<Vec<EngineCall>>>,
    playing: Arc<std::sync::atomic::AtomicBool>,
    notifier: Arc<std::sync::Mutex<Option<FinishedNotifier>>>,
}

#[cfg(test)]
impl RecordingEngine {
    pub fn calls(&self) -> Vec<EngineCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Notifier issued for the most recent load
    pub fn notifier(&self) -> Option<FinishedNotifier> {
        self.notifier.lock().unwrap().clone()
    }

    fn record(&self, call: EngineCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn set_playing(&self, playing: bool) {
        self.playing
            .store(playing, std::sync::atomic::Ordering::SeqCst);
    }
}

#[cfg(test)]
impl MediaEngine for RecordingEngine {
    fn load(&mut self, track: &Track) {
        self.record(EngineCall::Load(track.locator.clone()));
    }

    fn play(&mut self) {
        self.record(EngineCall::Play);
        self.set_playing(true);
    }

    fn pause(&mut self) {
        self.record(EngineCall::Pause);
        self.set_playing(false);
    }

    fn resume(&mut self) {
        self.record(EngineCall::Resume);
        self.set_playing(true);
    }

    fn stop(&mut self) {
        self.record(EngineCall::Stop);
        self.set_playing(false);
    }

    fn is_playing(&self) -> bool {
        self.playing.load(std::sync::atomic::Ordering::SeqCst)
    }

    fn set_finished_notifier(&mut self, notifier: FinishedNotifier) {
        *self.notifier.lock().unwrap() = Some(notifier);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn notifier_invokes_callback_from_clones() {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&count);
        let notifier = FinishedNotifier::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let clone = notifier.clone();
        std::thread::spawn(move || clone.notify()).join().unwrap();
        notifier.notify();

        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn stamped_notifier_reports_its_generation() {
        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        let log = Arc::clone(&seen);
        let base = FinishedNotifier::new(move |generation| {
            log.lock().unwrap().push(generation);
        });

        let stale = base.for_generation(3);
        let current = base.for_generation(4);
        current.notify();
        stale.notify();

        assert_eq!(base.generation(), 0);
        assert_eq!(*seen.lock().unwrap(), vec![4, 3]);
    }

    #[test]
    fn load_and_play_issues_both_commands() {
        let mut engine = RecordingEngine::default();
        engine.load_and_play(&Track::from_locator("/music/a.mp3"));

        assert_eq!(
            engine.calls(),
            vec![EngineCall::Load("/music/a.mp3".to_string()), EngineCall::Play]
        );
        assert!(engine.is_playing());
    }
}
