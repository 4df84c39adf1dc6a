//! Playback controller - transport orchestration
//!
//! Owns the session, the media engine and the observer list. Every
//! transport command goes through here: the sequencer resolves what should
//! play, the controller drives the engine accordingly and tells observers.
//!
//! Without an engine attached the controller is in a degraded mode where
//! every transport command is a no-op returning a default value.

use crate::{
    command::{CommandOutcome, TransportCommand},
    engine::{FinishedNotifier, MediaEngine},
    error::{PlaybackError, Result},
    events::{ObserverId, Observers, PlaybackEvent, PlaybackObserver},
    order::FolderOrder,
    sequencer::{self, Step},
    session::PlaybackSession,
    snapshot::SessionSnapshot,
    types::{PlaybackConfig, RepeatMode, Track},
};
use serde::Serialize;
use std::cmp::Ordering;
use tracing::{debug, info, warn};

/// Point-in-time view of the controller for hosts that poll
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlaybackStatus {
    pub engine_bound: bool,
    pub playing: bool,
    pub repeat: RepeatMode,
    pub shuffle: bool,
    pub index: usize,
    pub tracks: Vec<String>,
}

/// Single point of interaction between the host and the media engine
pub struct PlaybackController {
    session: PlaybackSession,
    engine: Option<Box<dyn MediaEngine>>,
    observers: Observers,
    folder_order: FolderOrder,
    notifier: Option<FinishedNotifier>,

    /// Bumped on every engine load; completions for older loads are stale
    generation: u64,

    /// The engine holds no track (fresh, or stopped by a stop resolution)
    engine_idle: bool,
}

impl PlaybackController {
    /// Controller with no engine attached
    pub fn new(config: &PlaybackConfig) -> Self {
        Self {
            session: PlaybackSession::new(config.repeat, config.shuffle),
            engine: None,
            observers: Observers::new(),
            folder_order: config.folder_order,
            notifier: None,
            generation: 0,
            engine_idle: true,
        }
    }

    pub fn with_engine(config: &PlaybackConfig, engine: Box<dyn MediaEngine>) -> Self {
        let mut controller = Self::new(config);
        controller.attach_engine(engine);
        controller
    }

    // ===== Engine binding =====

    /// Bind a media engine, replacing any previous one
    ///
    /// The new engine has nothing loaded, so the next resume loads the
    /// current track.
    pub fn attach_engine(&mut self, engine: Box<dyn MediaEngine>) {
        debug!("Media engine attached");
        self.engine = Some(engine);
        self.engine_idle = true;
        self.session.set_playing(false);
    }

    /// Unbind the media engine; the controller degrades to no-ops
    pub fn detach_engine(&mut self) -> Option<Box<dyn MediaEngine>> {
        let engine = self.engine.take();
        if engine.is_some() {
            debug!("Media engine detached");
            self.engine_idle = true;
            self.session.set_playing(false);
        }
        engine
    }

    /// Callback stamped and handed to the engine before every load
    pub fn set_finished_notifier(&mut self, notifier: FinishedNotifier) {
        self.notifier = Some(notifier);
    }

    /// Generation of the most recent engine load
    pub fn load_generation(&self) -> u64 {
        self.generation
    }

    pub fn has_engine(&self) -> bool {
        self.engine.is_some()
    }

    // ===== Observers =====

    pub fn bind(&mut self, observer: Box<dyn PlaybackObserver>) -> ObserverId {
        self.observers.bind(observer)
    }

    pub fn unbind(&mut self, id: ObserverId) -> bool {
        self.observers.unbind(id)
    }

    // ===== Transport commands =====

    /// Apply one transport command
    pub fn execute(&mut self, command: TransportCommand) -> Result<CommandOutcome> {
        let outcome = match command {
            TransportCommand::PlayTrack(track) => {
                self.play_track(track)?;
                CommandOutcome::Done
            }
            TransportCommand::PlayFolder(tracks) => {
                self.play_folder(tracks)?;
                CommandOutcome::Done
            }
            TransportCommand::PlayAt(index) => {
                self.play_at(index)?;
                CommandOutcome::Done
            }
            TransportCommand::PauseOrResume => CommandOutcome::Playing(self.pause_or_resume()),
            TransportCommand::Next => CommandOutcome::Step(self.next()),
            TransportCommand::Previous => CommandOutcome::Step(self.previous()),
            TransportCommand::CycleRepeat => CommandOutcome::Repeat(self.cycle_repeat()),
            TransportCommand::ToggleShuffle => CommandOutcome::Shuffle(self.toggle_shuffle()),
            TransportCommand::Stop => {
                self.stop();
                CommandOutcome::Done
            }
            TransportCommand::TrackFinished(generation) => {
                match self.on_track_finished(generation) {
                    Some(step) => CommandOutcome::Step(step),
                    None => CommandOutcome::Ignored,
                }
            }
        };
        Ok(outcome)
    }

    /// Start a one-track session
    pub fn play_track(&mut self, track: Track) -> Result<()> {
        if !self.has_engine() {
            debug!("play_track ignored: no engine");
            return Ok(());
        }
        if !track.is_playable() {
            warn!("Rejected track with empty locator");
            return Err(PlaybackError::InvalidPlaylist);
        }

        info!(track = %track.name, "Playing single track");
        sequencer::load_playlist(&mut self.session, vec![track], 0)?;
        self.start_current(true);
        Ok(())
    }

    /// Start a folder session ordered by the configured folder order
    pub fn play_folder(&mut self, tracks: Vec<Track>) -> Result<()> {
        let order = self.folder_order;
        self.play_folder_by(tracks, |a, b| order.compare(a, b))
    }

    /// Start a folder session ordered by `compare`
    pub fn play_folder_by<F>(&mut self, tracks: Vec<Track>, compare: F) -> Result<()>
    where
        F: FnMut(&Track, &Track) -> Ordering,
    {
        if !self.has_engine() {
            debug!("play_folder ignored: no engine");
            return Ok(());
        }

        let mut tracks: Vec<Track> = tracks.into_iter().filter(Track::is_playable).collect();
        if tracks.is_empty() {
            warn!("Rejected folder without playable tracks");
            return Err(PlaybackError::EmptyFolder);
        }
        tracks.sort_by(compare);

        info!(count = tracks.len(), "Playing folder");
        sequencer::load_playlist(&mut self.session, tracks, 0)?;
        self.start_current(true);
        Ok(())
    }

    /// Jump to `index` in the current playlist
    pub fn play_at(&mut self, index: usize) -> Result<()> {
        if !self.has_engine() {
            debug!("play_at ignored: no engine");
            return Ok(());
        }

        if let Err(err) = sequencer::jump_to(&mut self.session, index) {
            warn!(index, "Rejected jump: {}", err);
            return Err(err);
        }
        self.start_current(false);
        Ok(())
    }

    /// Pause if playing, otherwise resume
    ///
    /// Returns the playing state reported by the engine afterwards. An idle
    /// engine has nothing to resume, so the current track is loaded instead.
    pub fn pause_or_resume(&mut self) -> bool {
        if !self.session.is_active() || !self.has_engine() {
            return false;
        }

        let engine_playing = self.engine.as_ref().is_some_and(|engine| engine.is_playing());
        if !engine_playing && self.engine_idle {
            self.load_current();
        } else if let Some(engine) = self.engine.as_mut() {
            if engine_playing {
                debug!("Engine pause");
                engine.pause();
            } else {
                debug!("Engine resume");
                engine.resume();
            }
        }

        let playing = self.engine.as_ref().is_some_and(|engine| engine.is_playing());
        self.session.set_playing(playing);
        playing
    }

    pub fn next(&mut self) -> Step {
        if !self.has_engine() {
            return Step::Stop;
        }
        let step = sequencer::resolve_next(&mut self.session);
        self.apply(step);
        step
    }

    pub fn previous(&mut self) -> Step {
        if !self.has_engine() {
            return Step::AtStart;
        }
        let step = sequencer::resolve_previous(&mut self.session);
        self.apply(step);
        step
    }

    /// Engine completion reported through a stamped [`FinishedNotifier`]
    ///
    /// Returns `None` when `generation` belongs to an earlier load: the
    /// engine has moved on and the report is dropped.
    pub fn on_track_finished(&mut self, generation: u64) -> Option<Step> {
        if generation != self.generation {
            debug!(
                generation,
                current = self.generation,
                "Ignoring stale track finish"
            );
            return None;
        }
        Some(self.on_engine_track_finished())
    }

    /// Engine completion (or failure) of the current track, already on the command thread
    pub fn on_engine_track_finished(&mut self) -> Step {
        if !self.has_engine() {
            return Step::Stop;
        }
        let step = sequencer::resolve_on_track_finished(&mut self.session);
        self.apply(step);
        step
    }

    /// Off -> All -> One -> Off
    ///
    /// Without an engine this is a no-op that returns `RepeatMode::Off`, a
    /// fixed default that is not the session's mode: `repeat_mode()` keeps
    /// reporting the configured value.
    pub fn cycle_repeat(&mut self) -> RepeatMode {
        if !self.has_engine() {
            return RepeatMode::Off;
        }
        let mode = sequencer::cycle_repeat(&mut self.session);
        debug!(%mode, "Repeat mode changed");
        mode
    }

    /// Flip shuffle; without an engine a no-op returning `false`
    pub fn toggle_shuffle(&mut self) -> bool {
        if !self.has_engine() {
            return false;
        }
        let enabled = sequencer::toggle_shuffle(&mut self.session);
        debug!(enabled, "Shuffle toggled");
        enabled
    }

    /// Stop the engine and drop the playlist, keeping repeat and shuffle
    pub fn stop(&mut self) {
        let Some(engine) = self.engine.as_mut() else {
            return;
        };
        if !self.session.is_active() {
            return;
        }

        let index = self.session.index();
        engine.stop();
        self.session.clear();
        self.engine_idle = true;
        info!("Session closed");
        self.observers.emit(&PlaybackEvent::Stopped { index });
    }

    // ===== Queries =====

    pub fn is_playing(&self) -> bool {
        self.has_engine() && self.session.is_playing()
    }

    pub fn repeat_mode(&self) -> RepeatMode {
        self.session.repeat()
    }

    pub fn shuffle_enabled(&self) -> bool {
        self.session.shuffle()
    }

    pub fn current_index(&self) -> usize {
        self.session.index()
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.session.current_track()
    }

    pub fn track_names(&self) -> Vec<String> {
        self.session.track_names()
    }

    pub fn session(&self) -> &PlaybackSession {
        &self.session
    }

    pub fn status(&self) -> PlaybackStatus {
        PlaybackStatus {
            engine_bound: self.has_engine(),
            playing: self.is_playing(),
            repeat: self.session.repeat(),
            shuffle: self.session.shuffle(),
            index: self.session.index(),
            tracks: self.session.track_names(),
        }
    }

    // ===== Snapshot =====

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot::capture(&self.session)
    }

    /// Reapply saved repeat and shuffle
    ///
    /// The playlist and play state stay with the engine: a snapshot carries
    /// only track names, which cannot be played.
    pub fn restore(&mut self, snapshot: &SessionSnapshot) {
        self.session.set_repeat(snapshot.repeat_mode);
        if self.session.shuffle() != snapshot.shuffle {
            sequencer::toggle_shuffle(&mut self.session);
        }
        debug!(
            repeat = %snapshot.repeat_mode,
            shuffle = snapshot.shuffle,
            "Session modes restored"
        );
    }

    // ===== Internals =====

    fn apply(&mut self, step: Step) {
        match step {
            Step::Play(_) => self.start_current(false),
            Step::Stop => self.stop_engine(),
            Step::AtStart => debug!("Already at first track"),
        }
    }

    fn start_current(&mut self, list_changed: bool) {
        if !self.load_current() {
            return;
        }
        self.session.set_playing(true);

        let event = PlaybackEvent::TrackChanged {
            index: self.session.index(),
            tracks: list_changed.then(|| self.session.track_names()),
        };
        self.observers.emit(&event);
    }

    /// Load and play the current track under a new generation
    fn load_current(&mut self) -> bool {
        let Some(engine) = self.engine.as_mut() else {
            return false;
        };
        let Some(track) = self.session.current_track() else {
            return false;
        };

        self.generation += 1;
        if let Some(notifier) = &self.notifier {
            engine.set_finished_notifier(notifier.for_generation(self.generation));
        }
        debug!(
            track = %track.name,
            index = self.session.index(),
            generation = self.generation,
            "Engine load+play"
        );
        engine.load_and_play(track);
        self.engine_idle = false;
        true
    }

    fn stop_engine(&mut self) {
        let Some(engine) = self.engine.as_mut() else {
            return;
        };
        if !self.session.is_active() {
            return;
        }

        debug!("Engine stop");
        engine.stop();
        self.engine_idle = true;
        self.session.set_playing(false);
        info!(index = self.session.index(), "Playback stopped at end of playlist");
        self.observers.emit(&PlaybackEvent::Stopped {
            index: self.session.index(),
        });
    }
}

impl Default for PlaybackController {
    fn default() -> Self {
        Self::new(&PlaybackConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{EngineCall, RecordingEngine};
    use std::sync::{Arc, Mutex};

    fn tracks(names: &[&str]) -> Vec<Track> {
        names
            .iter()
            .map(|name| Track::new(format!("/music/{}", name), *name))
            .collect()
    }

    fn controller_with_engine(config: &PlaybackConfig) -> (PlaybackController, RecordingEngine) {
        let engine = RecordingEngine::default();
        let controller = PlaybackController::with_engine(config, Box::new(engine.clone()));
        (controller, engine)
    }

    fn event_log(controller: &mut PlaybackController) -> Arc<Mutex<Vec<PlaybackEvent>>> {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        controller.bind(Box::new(crate::events::FnObserver(
            move |event: &PlaybackEvent| sink.lock().unwrap().push(event.clone()),
        )));
        log
    }

    #[test]
    fn play_track_loads_and_notifies() {
        let (mut controller, engine) = controller_with_engine(&PlaybackConfig::default());
        let log = event_log(&mut controller);

        controller
            .play_track(Track::from_locator("/music/song.mp3"))
            .unwrap();

        assert!(controller.is_playing());
        assert_eq!(
            engine.calls(),
            vec![EngineCall::Load("/music/song.mp3".to_string()), EngineCall::Play]
        );
        assert_eq!(
            *log.lock().unwrap(),
            vec![PlaybackEvent::TrackChanged {
                index: 0,
                tracks: Some(vec!["song.mp3".to_string()]),
            }]
        );
    }

    #[test]
    fn play_folder_sorts_with_configured_order() {
        let config = PlaybackConfig {
            folder_order: FolderOrder::Lexicographic,
            ..PlaybackConfig::default()
        };
        let (mut controller, _engine) = controller_with_engine(&config);

        controller
            .play_folder(tracks(&["C.mp3", "A.mp3", "B.mp3"]))
            .unwrap();

        assert_eq!(controller.track_names(), vec!["A.mp3", "B.mp3", "C.mp3"]);
        assert_eq!(controller.current_index(), 0);
    }

    #[test]
    fn play_folder_rejects_when_nothing_playable() {
        let (mut controller, engine) = controller_with_engine(&PlaybackConfig::default());
        let result = controller.play_folder(vec![Track::new("", "ghost")]);

        assert!(matches!(result, Err(PlaybackError::EmptyFolder)));
        assert!(engine.calls().is_empty());
        assert!(!controller.session().is_active());
    }

    #[test]
    fn play_at_out_of_range_is_rejected() {
        let (mut controller, engine) = controller_with_engine(&PlaybackConfig::default());
        controller.play_folder(tracks(&["a", "b"])).unwrap();
        let calls_before = engine.calls().len();

        let result = controller.play_at(2);

        assert!(matches!(
            result,
            Err(PlaybackError::IndexOutOfRange { index: 2, len: 2 })
        ));
        assert_eq!(engine.calls().len(), calls_before);
    }

    #[test]
    fn pause_then_resume() {
        let (mut controller, engine) = controller_with_engine(&PlaybackConfig::default());
        controller.play_track(Track::from_locator("/a.mp3")).unwrap();

        assert!(!controller.pause_or_resume());
        assert!(controller.pause_or_resume());
        assert_eq!(
            &engine.calls()[2..],
            &[EngineCall::Pause, EngineCall::Resume]
        );
    }

    #[test]
    fn resume_after_stop_reloads_current_track() {
        let (mut controller, engine) = controller_with_engine(&PlaybackConfig::default());
        controller.play_folder(tracks(&["a", "b"])).unwrap();
        controller.next();
        assert_eq!(controller.next(), Step::Stop);

        assert!(controller.pause_or_resume());
        let calls = engine.calls();
        assert_eq!(
            &calls[calls.len() - 2..],
            &[EngineCall::Load("/music/b".to_string()), EngineCall::Play]
        );
    }

    #[test]
    fn next_at_end_stops_engine() {
        let (mut controller, engine) = controller_with_engine(&PlaybackConfig::default());
        controller.play_folder(tracks(&["a", "b"])).unwrap();
        let log = event_log(&mut controller);

        assert_eq!(controller.next(), Step::Play(1));
        assert_eq!(controller.next(), Step::Stop);

        assert!(!controller.is_playing());
        assert_eq!(controller.current_index(), 1);
        assert_eq!(engine.calls().last(), Some(&EngineCall::Stop));
        assert_eq!(
            *log.lock().unwrap(),
            vec![
                PlaybackEvent::TrackChanged {
                    index: 1,
                    tracks: None
                },
                PlaybackEvent::Stopped { index: 1 },
            ]
        );
    }

    #[test]
    fn previous_at_start_does_nothing() {
        let (mut controller, engine) = controller_with_engine(&PlaybackConfig::default());
        controller.play_track(Track::from_locator("/a.mp3")).unwrap();
        let calls_before = engine.calls().len();

        assert_eq!(controller.previous(), Step::AtStart);
        assert_eq!(controller.current_index(), 0);
        assert_eq!(engine.calls().len(), calls_before);
        assert!(controller.is_playing());
    }

    #[test]
    fn track_finished_with_repeat_one_replays() {
        let config = PlaybackConfig {
            repeat: RepeatMode::One,
            ..PlaybackConfig::default()
        };
        let (mut controller, engine) = controller_with_engine(&config);
        controller.play_folder(tracks(&["a", "b", "c"])).unwrap();

        assert_eq!(controller.on_engine_track_finished(), Step::Play(0));
        assert_eq!(
            engine.calls().last(),
            Some(&EngineCall::Play),
            "replayed track must be started again"
        );
    }

    #[test]
    fn modes_need_an_engine() {
        let mut controller = PlaybackController::default();
        assert_eq!(controller.cycle_repeat(), RepeatMode::Off);
        assert!(!controller.toggle_shuffle());
        assert!(!controller.pause_or_resume());
        assert_eq!(controller.next(), Step::Stop);
        assert_eq!(controller.previous(), Step::AtStart);
        assert!(controller.play_track(Track::from_locator("/a.mp3")).is_ok());
        assert!(!controller.session().is_active());
    }

    #[test]
    fn detach_degrades_to_no_ops() {
        let (mut controller, _engine) = controller_with_engine(&PlaybackConfig::default());
        controller.play_track(Track::from_locator("/a.mp3")).unwrap();

        assert!(controller.detach_engine().is_some());
        assert!(!controller.is_playing());
        assert!(!controller.pause_or_resume());
        assert!(controller.detach_engine().is_none());
    }

    #[test]
    fn stop_closes_session_and_keeps_modes() {
        let (mut controller, engine) = controller_with_engine(&PlaybackConfig::default());
        controller.cycle_repeat();
        controller.play_folder(tracks(&["a", "b"])).unwrap();

        controller.stop();

        assert!(!controller.session().is_active());
        assert_eq!(controller.repeat_mode(), RepeatMode::All);
        assert_eq!(engine.calls().last(), Some(&EngineCall::Stop));
    }

    #[test]
    fn execute_routes_commands() {
        let (mut controller, _engine) = controller_with_engine(&PlaybackConfig::default());

        let outcome = controller
            .execute(TransportCommand::PlayFolder(tracks(&["a", "b", "c"])))
            .unwrap();
        assert_eq!(outcome, CommandOutcome::Done);
        assert_eq!(
            controller.execute(TransportCommand::Next).unwrap(),
            CommandOutcome::Step(Step::Play(1))
        );
        assert_eq!(
            controller.execute(TransportCommand::CycleRepeat).unwrap(),
            CommandOutcome::Repeat(RepeatMode::All)
        );
        assert_eq!(
            controller.execute(TransportCommand::PauseOrResume).unwrap(),
            CommandOutcome::Playing(false)
        );
        assert!(matches!(
            controller.execute(TransportCommand::PlayAt(9)),
            Err(PlaybackError::IndexOutOfRange { .. })
        ));

        let status = controller.status();
        assert!(status.engine_bound);
        assert!(!status.playing);
        assert_eq!(status.index, 1);
        assert_eq!(status.tracks, vec!["a", "b", "c"]);
    }

    #[test]
    fn restore_reapplies_modes() {
        let (mut controller, _engine) = controller_with_engine(&PlaybackConfig::default());
        controller.play_folder(tracks(&["a", "b", "c"])).unwrap();

        controller.restore(&SessionSnapshot {
            repeat_mode: RepeatMode::One,
            shuffle: true,
            ..SessionSnapshot::default()
        });

        assert_eq!(controller.repeat_mode(), RepeatMode::One);
        assert!(controller.shuffle_enabled());
        assert_eq!(
            controller.session().shuffle_order().unwrap().current(),
            Some(0)
        );
    }

    #[test]
    fn resume_on_reattached_engine_loads_current_track() {
        let (mut controller, _old) = controller_with_engine(&PlaybackConfig::default());
        controller.play_folder(tracks(&["a", "b"])).unwrap();
        controller.detach_engine();

        let fresh = RecordingEngine::default();
        controller.attach_engine(Box::new(fresh.clone()));
        assert!(!controller.is_playing());

        assert!(controller.pause_or_resume());
        assert!(controller.is_playing());
        assert_eq!(
            fresh.calls(),
            vec![EngineCall::Load("/music/a".to_string()), EngineCall::Play]
        );
    }

    #[test]
    fn stale_finish_after_next_is_ignored() {
        let (mut controller, engine) = controller_with_engine(&PlaybackConfig::default());
        controller.play_folder(tracks(&["a", "b", "c"])).unwrap();
        let first_load = controller.load_generation();

        assert_eq!(controller.next(), Step::Play(1));
        let calls_before = engine.calls().len();

        assert_eq!(
            controller
                .execute(TransportCommand::TrackFinished(first_load))
                .unwrap(),
            CommandOutcome::Ignored
        );
        assert_eq!(controller.current_index(), 1);
        assert_eq!(engine.calls().len(), calls_before);

        let current = controller.load_generation();
        assert_eq!(
            controller
                .execute(TransportCommand::TrackFinished(current))
                .unwrap(),
            CommandOutcome::Step(Step::Play(2))
        );
    }

    #[test]
    fn every_load_gets_a_freshly_stamped_notifier() {
        let (mut controller, engine) = controller_with_engine(&PlaybackConfig::default());
        controller.set_finished_notifier(FinishedNotifier::new(|_| {}));

        controller.play_folder(tracks(&["a", "b"])).unwrap();
        assert_eq!(engine.notifier().unwrap().generation(), 1);

        controller.next();
        assert_eq!(engine.notifier().unwrap().generation(), 2);
        assert_eq!(controller.load_generation(), 2);
    }

    #[test]
    fn cycle_repeat_without_engine_leaves_session_mode() {
        let mut controller = PlaybackController::new(&PlaybackConfig {
            repeat: RepeatMode::All,
            ..PlaybackConfig::default()
        });

        assert_eq!(controller.cycle_repeat(), RepeatMode::Off);
        assert_eq!(controller.repeat_mode(), RepeatMode::All);
    }
}
