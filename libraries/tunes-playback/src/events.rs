//! Playback Events
//!
//! Observer registry owned by the controller. Every index change produces a
//! [`PlaybackEvent`] delivered to all bound observers in the order they were
//! bound. Unbinding is immediate: an observer removed between two commands
//! never sees the second one.

use crossbeam_channel::Sender;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Events emitted by the playback controller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlaybackEvent {
    /// A different track (or the same track again) started playing
    TrackChanged {
        /// Index of the now-current track
        index: usize,
        /// Full list of track names, present only when the playlist itself changed
        tracks: Option<Vec<String>>,
    },

    /// Playback stopped because nothing was left to play
    Stopped {
        /// Index of the last track that played
        index: usize,
    },
}

impl PlaybackEvent {
    pub fn index(&self) -> usize {
        match self {
            Self::TrackChanged { index, .. } | Self::Stopped { index } => *index,
        }
    }
}

/// Receiver of playback events
pub trait PlaybackObserver: Send {
    fn on_event(&mut self, event: &PlaybackEvent);
}

/// Forward events into a channel; a dropped receiver is ignored
impl PlaybackObserver for Sender<PlaybackEvent> {
    fn on_event(&mut self, event: &PlaybackEvent) {
        self.send(event.clone()).ok();
    }
}

/// Adapter turning a closure into an observer
pub struct FnObserver<F>(pub F);

impl<F> PlaybackObserver for FnObserver<F>
where
    F: FnMut(&PlaybackEvent) + Send,
{
    fn on_event(&mut self, event: &PlaybackEvent) {
        (self.0)(event);
    }
}

/// Handle returned by `bind`, needed to unbind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObserverId(u64);

/// Ordered list of bound observers
#[derive(Default)]
pub struct Observers {
    next_id: u64,
    entries: Vec<(ObserverId, Box<dyn PlaybackObserver>)>,
}

impl Observers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&mut self, observer: Box<dyn PlaybackObserver>) -> ObserverId {
        let id = ObserverId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, observer));
        debug!(?id, observers = self.entries.len(), "Observer bound");
        id
    }

    /// Returns false if the id was not bound
    pub fn unbind(&mut self, id: ObserverId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(bound, _)| *bound != id);
        let removed = self.entries.len() != before;
        if removed {
            debug!(?id, observers = self.entries.len(), "Observer unbound");
        }
        removed
    }

    pub fn emit(&mut self, event: &PlaybackEvent) {
        for (_, observer) in &mut self.entries {
            observer.on_event(event);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn recorder(log: &Arc<Mutex<Vec<String>>>, name: &'static str) -> Box<dyn PlaybackObserver> {
        let log = Arc::clone(log);
        Box::new(FnObserver(move |event: &PlaybackEvent| {
            log.lock()
                .unwrap()
                .push(format!("{}:{}", name, event.index()));
        }))
    }

    #[test]
    fn delivers_in_bind_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut observers = Observers::new();
        observers.bind(recorder(&log, "first"));
        observers.bind(recorder(&log, "second"));

        observers.emit(&PlaybackEvent::TrackChanged {
            index: 3,
            tracks: None,
        });

        assert_eq!(*log.lock().unwrap(), vec!["first:3", "second:3"]);
    }

    #[test]
    fn unbound_observer_gets_nothing() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut observers = Observers::new();
        let first = observers.bind(recorder(&log, "first"));
        observers.bind(recorder(&log, "second"));

        assert!(observers.unbind(first));
        assert!(!observers.unbind(first));
        observers.emit(&PlaybackEvent::Stopped { index: 1 });

        assert_eq!(*log.lock().unwrap(), vec!["second:1"]);
        assert_eq!(observers.len(), 1);
    }

    #[test]
    fn channel_observer_survives_dropped_receiver() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let mut observers = Observers::new();
        observers.bind(Box::new(tx));

        observers.emit(&PlaybackEvent::Stopped { index: 0 });
        assert_eq!(rx.recv().unwrap(), PlaybackEvent::Stopped { index: 0 });

        drop(rx);
        observers.emit(&PlaybackEvent::Stopped { index: 0 });
    }

    #[test]
    fn events_serialize_with_type_tag() {
        let event = PlaybackEvent::TrackChanged {
            index: 0,
            tracks: Some(vec!["A.mp3".to_string()]),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(
            json,
            r#"{"type":"track_changed","index":0,"tracks":["A.mp3"]}"#
        );
    }
}
