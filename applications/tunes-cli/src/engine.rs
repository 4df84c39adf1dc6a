//! Simulated media engine
//!
//! Stands in for a real decoder/output pair. Every track "plays" for a fixed
//! length on a timer thread, then the engine reports completion through the
//! [`FinishedNotifier`] it was given. Pausing keeps the time already played.

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tunes_playback::{FinishedNotifier, MediaEngine, Track};

/// Commands sent to the timer thread
#[derive(Debug)]
enum EngineCommand {
    Load(String),
    Play,
    Pause,
    Resume,
    Stop,
    SetNotifier(FinishedNotifier),
}

/// Engine that plays every track for `track_length`
pub struct SimulatedEngine {
    command_tx: Sender<EngineCommand>,
    playing: Arc<AtomicBool>,
}

impl SimulatedEngine {
    pub fn new(track_length: Duration) -> std::io::Result<Self> {
        let (command_tx, command_rx) = unbounded();
        let playing = Arc::new(AtomicBool::new(false));

        let thread_playing = Arc::clone(&playing);
        thread::Builder::new()
            .name("tunes-engine".to_string())
            .spawn(move || run_timer(&command_rx, &thread_playing, track_length))?;

        Ok(Self {
            command_tx,
            playing,
        })
    }

    fn send(&self, command: EngineCommand) {
        if self.command_tx.send(command).is_err() {
            tracing::warn!("Simulated engine thread is gone");
        }
    }
}

impl MediaEngine for SimulatedEngine {
    fn load(&mut self, track: &Track) {
        self.playing.store(false, Ordering::SeqCst);
        self.send(EngineCommand::Load(track.name.clone()));
    }

    fn play(&mut self) {
        self.playing.store(true, Ordering::SeqCst);
        self.send(EngineCommand::Play);
    }

    fn pause(&mut self) {
        self.playing.store(false, Ordering::SeqCst);
        self.send(EngineCommand::Pause);
    }

    fn resume(&mut self) {
        self.playing.store(true, Ordering::SeqCst);
        self.send(EngineCommand::Resume);
    }

    fn stop(&mut self) {
        self.playing.store(false, Ordering::SeqCst);
        self.send(EngineCommand::Stop);
    }

    fn is_playing(&self) -> bool {
        self.playing.load(Ordering::SeqCst)
    }

    fn set_finished_notifier(&mut self, notifier: FinishedNotifier) {
        self.send(EngineCommand::SetNotifier(notifier));
    }
}

/// Timer loop; exits when the engine handle is dropped
fn run_timer(command_rx: &Receiver<EngineCommand>, playing: &AtomicBool, track_length: Duration) {
    let mut notifier: Option<FinishedNotifier> = None;
    let mut current: Option<String> = None;
    // Time left on the loaded track, and when it last started running
    let mut remaining = Duration::ZERO;
    let mut running_since: Option<Instant> = None;

    loop {
        let received = match running_since {
            Some(since) => command_rx.recv_timeout(remaining.saturating_sub(since.elapsed())),
            None => command_rx
                .recv()
                .map_err(|_| RecvTimeoutError::Disconnected),
        };

        let command = match received {
            Ok(command) => command,
            Err(RecvTimeoutError::Timeout) => {
                running_since = None;
                playing.store(false, Ordering::SeqCst);
                if let Some(name) = current.take() {
                    tracing::info!("Finished {}", name);
                }
                if let Some(notifier) = &notifier {
                    notifier.notify();
                }
                continue;
            }
            Err(RecvTimeoutError::Disconnected) => break,
        };

        match command {
            EngineCommand::Load(name) => {
                tracing::debug!("Loaded {}", name);
                current = Some(name);
                remaining = track_length;
                running_since = None;
            }
            EngineCommand::Play | EngineCommand::Resume => {
                if current.is_some() && running_since.is_none() {
                    running_since = Some(Instant::now());
                }
            }
            EngineCommand::Pause => {
                if let Some(since) = running_since.take() {
                    remaining = remaining.saturating_sub(since.elapsed());
                }
            }
            EngineCommand::Stop => {
                current = None;
                running_since = None;
            }
            EngineCommand::SetNotifier(new_notifier) => notifier = Some(new_notifier),
        }
    }

    tracing::debug!("Simulated engine stopped");
}
