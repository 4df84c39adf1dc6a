//! Playback service
//!
//! Moves a [`PlaybackController`] onto its own worker thread. Host commands
//! arrive on a bounded queue and are applied strictly in order. Engine
//! completions arrive on a separate unbounded lane so that an engine calling
//! its notifier from inside a command never blocks the worker on its own
//! queue. Each completion carries the load generation it was issued for and
//! stale ones are dropped by the controller.

use crate::{
    command::{CommandOutcome, TransportCommand},
    controller::{PlaybackController, PlaybackStatus},
    engine::{FinishedNotifier, MediaEngine},
    error::{PlaybackError, Result},
    events::{ObserverId, PlaybackEvent, PlaybackObserver},
    sequencer::Step,
    snapshot::SessionSnapshot,
    types::{RepeatMode, Track},
};
use crossbeam_channel::{bounded, select, unbounded, Receiver, Sender};
use std::thread::{self, JoinHandle};
use tracing::{debug, info, warn};

/// Messages handled by the worker thread
enum Message {
    Transport(TransportCommand, Sender<Result<CommandOutcome>>),
    Bind(Box<dyn PlaybackObserver>, Sender<ObserverId>),
    Unbind(ObserverId, Sender<bool>),
    AttachEngine(Box<dyn MediaEngine>),
    DetachEngine(Sender<bool>),
    Status(Sender<PlaybackStatus>),
    Snapshot(Sender<SessionSnapshot>),
    Restore(SessionSnapshot),
    Shutdown,
}

/// Handle to a controller running on a dedicated thread
pub struct PlaybackService {
    command_tx: Sender<Message>,
    worker: Option<JoinHandle<()>>,
}

impl PlaybackService {
    /// Start the worker thread
    ///
    /// `capacity` bounds the command queue; senders block while it is full.
    pub fn spawn(mut controller: PlaybackController, capacity: usize) -> Result<Self> {
        let (command_tx, command_rx) = bounded(capacity.max(1));
        let (finished_tx, finished_rx) = unbounded();
        controller.set_finished_notifier(Self::finished_notifier(finished_tx));

        let worker = thread::Builder::new()
            .name("tunes-playback".to_string())
            .spawn(move || Self::run(controller, &command_rx, &finished_rx))?;

        info!(capacity, "Playback service started");
        Ok(Self {
            command_tx,
            worker: Some(worker),
        })
    }

    fn run(
        mut controller: PlaybackController,
        command_rx: &Receiver<Message>,
        finished_rx: &Receiver<u64>,
    ) {
        loop {
            select! {
                recv(command_rx) -> message => match message {
                    Ok(Message::Shutdown) | Err(_) => break,
                    Ok(message) => Self::handle(&mut controller, message),
                },
                recv(finished_rx) -> generation => {
                    if let Ok(generation) = generation {
                        debug!(generation, "Track finished");
                        controller.execute(TransportCommand::TrackFinished(generation)).ok();
                    }
                }
            }
        }
        info!("Playback service stopped");
    }

    fn handle(controller: &mut PlaybackController, message: Message) {
        match message {
            Message::Transport(command, reply) => {
                debug!(?command, "Processing command");
                let result = controller.execute(command);
                if let Err(e) = &result {
                    warn!("Command failed: {}", e);
                }
                reply.send(result).ok();
            }
            Message::Bind(observer, reply) => {
                reply.send(controller.bind(observer)).ok();
            }
            Message::Unbind(id, reply) => {
                reply.send(controller.unbind(id)).ok();
            }
            Message::AttachEngine(engine) => controller.attach_engine(engine),
            Message::DetachEngine(reply) => {
                reply.send(controller.detach_engine().is_some()).ok();
            }
            Message::Status(reply) => {
                reply.send(controller.status()).ok();
            }
            Message::Snapshot(reply) => {
                reply.send(controller.snapshot()).ok();
            }
            Message::Restore(snapshot) => controller.restore(&snapshot),
            Message::Shutdown => {}
        }
    }

    /// Callback engines use to report the end of a track from any thread
    fn finished_notifier(finished_tx: Sender<u64>) -> FinishedNotifier {
        FinishedNotifier::new(move |generation| {
            if finished_tx.send(generation).is_err() {
                debug!(generation, "Track finished after service shutdown");
            }
        })
    }

    // ===== Engine =====

    /// Hand an engine to the worker
    ///
    /// The worker gives the engine a stamped notifier before every load.
    pub fn attach_engine(&self, engine: Box<dyn MediaEngine>) -> Result<()> {
        self.send(Message::AttachEngine(engine))
    }

    /// Returns whether an engine was bound
    pub fn detach_engine(&self) -> Result<bool> {
        self.request(Message::DetachEngine)
    }

    // ===== Observers =====

    pub fn bind(&self, observer: Box<dyn PlaybackObserver>) -> Result<ObserverId> {
        self.request(|reply| Message::Bind(observer, reply))
    }

    /// Bind a channel observer and return its receiving end
    pub fn subscribe(&self) -> Result<(ObserverId, Receiver<PlaybackEvent>)> {
        let (event_tx, event_rx) = unbounded();
        let id = self.bind(Box::new(event_tx))?;
        Ok((id, event_rx))
    }

    pub fn unbind(&self, id: ObserverId) -> Result<bool> {
        self.request(|reply| Message::Unbind(id, reply))
    }

    // ===== Transport =====

    /// Queue a command and wait for its outcome
    pub fn execute(&self, command: TransportCommand) -> Result<CommandOutcome> {
        self.request(|reply| Message::Transport(command, reply))?
    }

    pub fn play_track(&self, track: Track) -> Result<()> {
        self.execute(TransportCommand::PlayTrack(track)).map(drop)
    }

    pub fn play_folder(&self, tracks: Vec<Track>) -> Result<()> {
        self.execute(TransportCommand::PlayFolder(tracks)).map(drop)
    }

    pub fn play_at(&self, index: usize) -> Result<()> {
        self.execute(TransportCommand::PlayAt(index)).map(drop)
    }

    pub fn pause_or_resume(&self) -> Result<bool> {
        let outcome = self.execute(TransportCommand::PauseOrResume)?;
        Ok(outcome.playing().unwrap_or(false))
    }

    pub fn next(&self) -> Result<Step> {
        let outcome = self.execute(TransportCommand::Next)?;
        Ok(outcome.step().unwrap_or(Step::Stop))
    }

    pub fn previous(&self) -> Result<Step> {
        let outcome = self.execute(TransportCommand::Previous)?;
        Ok(outcome.step().unwrap_or(Step::AtStart))
    }

    pub fn cycle_repeat(&self) -> Result<RepeatMode> {
        let outcome = self.execute(TransportCommand::CycleRepeat)?;
        Ok(outcome.repeat().unwrap_or_default())
    }

    pub fn toggle_shuffle(&self) -> Result<bool> {
        let outcome = self.execute(TransportCommand::ToggleShuffle)?;
        Ok(outcome.shuffle().unwrap_or(false))
    }

    pub fn stop(&self) -> Result<()> {
        self.execute(TransportCommand::Stop).map(drop)
    }

    // ===== Queries =====

    pub fn status(&self) -> Result<PlaybackStatus> {
        self.request(Message::Status)
    }

    pub fn is_playing(&self) -> Result<bool> {
        Ok(self.status()?.playing)
    }

    pub fn repeat_mode(&self) -> Result<RepeatMode> {
        Ok(self.status()?.repeat)
    }

    pub fn shuffle_enabled(&self) -> Result<bool> {
        Ok(self.status()?.shuffle)
    }

    pub fn snapshot(&self) -> Result<SessionSnapshot> {
        self.request(Message::Snapshot)
    }

    pub fn restore(&self, snapshot: SessionSnapshot) -> Result<()> {
        self.send(Message::Restore(snapshot))
    }

    // ===== Lifecycle =====

    /// Stop the worker after it drains commands queued before this call
    pub fn shutdown(mut self) {
        self.stop_worker();
    }

    fn stop_worker(&mut self) {
        if let Some(worker) = self.worker.take() {
            self.command_tx.send(Message::Shutdown).ok();
            if worker.join().is_err() {
                warn!("Playback worker panicked");
            }
        }
    }

    fn send(&self, message: Message) -> Result<()> {
        self.command_tx
            .send(message)
            .map_err(|_| PlaybackError::ServiceClosed)
    }

    fn request<T>(&self, build: impl FnOnce(Sender<T>) -> Message) -> Result<T> {
        let (reply_tx, reply_rx) = bounded(1);
        self.send(build(reply_tx))?;
        reply_rx.recv().map_err(|_| PlaybackError::ServiceClosed)
    }
}

impl Drop for PlaybackService {
    fn drop(&mut self) {
        self.stop_worker();
    }
}
