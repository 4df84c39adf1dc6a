/// Tunes - command-line music player
use anyhow::Context;
use clap::{Parser, Subcommand};
use crossbeam_channel::Receiver;
use serde_json::{Map, Value};
use std::{
    fs,
    io::{self, BufRead, Write},
    path::{Path, PathBuf},
    thread,
    time::Duration,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tunes_cli::{check_access, CliConfig, HostCommand, SimulatedEngine};
use tunes_playback::{
    folder, PlaybackController, PlaybackEvent, PlaybackService, RepeatMode, SessionSnapshot, Step,
    Track,
};

#[derive(Parser)]
#[command(name = "tunes")]
#[command(about = "Tunes command-line music player", long_about = None)]
struct Cli {
    /// Configuration file path (default: ./tunes.toml if present)
    #[arg(short, long, global = true, env = "TUNES_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a single file or every track in a folder
    Play {
        /// File or folder to play
        path: PathBuf,
        /// Repeat mode: off, all or one
        #[arg(short, long)]
        repeat: Option<RepeatMode>,
        /// Start with shuffle enabled
        #[arg(short, long)]
        shuffle: bool,
        /// Apply repeat/shuffle from a saved session snapshot
        #[arg(long)]
        restore: Option<PathBuf>,
    },
    /// List the tracks a folder would play, in play order
    List {
        /// Folder to list
        path: PathBuf,
    },
    /// Print the effective configuration
    Config,
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tunes_cli=info,tunes_playback=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();

    let mut config = CliConfig::load(cli.config.as_deref())?;
    config.validate()?;

    match cli.command {
        Commands::Play {
            path,
            repeat,
            shuffle,
            restore,
        } => {
            if let Some(repeat) = repeat {
                config.playback.repeat = repeat;
            }
            if shuffle {
                config.playback.shuffle = true;
            }
            play(&config, &path, restore.as_deref())?;
        }
        Commands::List { path } => {
            list(&config, &path)?;
        }
        Commands::Config => {
            print!("{}", toml::to_string_pretty(&config)?);
        }
    }

    Ok(())
}

/// Resolve `path` into tracks, or `None` when the gate refuses it
fn open(config: &CliConfig, path: &Path) -> anyhow::Result<Option<Vec<Track>>> {
    if let Err(e) = check_access(path) {
        tracing::warn!("Not opening {}: {}", path.display(), e);
        return Ok(None);
    }

    if path.is_dir() {
        let tracks = folder::list_tracks(path, &config.playback.extensions)
            .with_context(|| format!("listing {}", path.display()))?;
        Ok(Some(tracks))
    } else {
        let track = Track::from_locator(path.to_string_lossy());
        if !track.is_playable() {
            anyhow::bail!("{} is not a playable file", path.display());
        }
        Ok(Some(vec![track]))
    }
}

fn list(config: &CliConfig, path: &Path) -> anyhow::Result<()> {
    let Some(mut tracks) = open(config, path)? else {
        return Ok(());
    };
    config.playback.folder_order.sort(&mut tracks);

    for (number, track) in tracks.iter().enumerate() {
        println!("{:>3}  {}", number + 1, track.name);
    }
    Ok(())
}

fn play(config: &CliConfig, path: &Path, restore: Option<&Path>) -> anyhow::Result<()> {
    let Some(tracks) = open(config, path)? else {
        return Ok(());
    };

    let controller = PlaybackController::new(&config.playback);
    let service = PlaybackService::spawn(controller, config.playback.command_capacity)?;
    let engine = SimulatedEngine::new(Duration::from_millis(config.engine.track_length_ms))?;
    service.attach_engine(Box::new(engine))?;

    let (_, events) = service.subscribe()?;
    let printer = thread::Builder::new()
        .name("tunes-events".to_string())
        .spawn(move || print_events(&events))?;

    if let Some(snapshot_path) = restore {
        service.restore(read_snapshot(snapshot_path)?)?;
    }

    if path.is_dir() {
        service
            .play_folder(tracks)
            .with_context(|| format!("playing {}", path.display()))?;
    } else if let Some(track) = tracks.into_iter().next() {
        service.play_track(track)?;
    }

    println!("{}", HostCommand::HELP);
    let result = run_prompt(&service);

    service.shutdown();
    if printer.join().is_err() {
        tracing::warn!("Event printer panicked");
    }
    result
}

/// Read commands from stdin until `quit` or end of input
fn run_prompt(service: &PlaybackService) -> anyhow::Result<()> {
    let stdin = io::stdin();
    prompt()?;

    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            prompt()?;
            continue;
        }

        match line.parse::<HostCommand>() {
            Ok(HostCommand::Quit) => break,
            Ok(command) => {
                if let Err(e) = apply(service, command) {
                    println!("error: {:#}", e);
                }
            }
            Err(e) => println!("{} (type `help`)", e),
        }
        prompt()?;
    }

    Ok(())
}

fn prompt() -> io::Result<()> {
    print!("> ");
    io::stdout().flush()
}

fn apply(service: &PlaybackService, command: HostCommand) -> anyhow::Result<()> {
    match command {
        HostCommand::Next => report_step(service.next()?),
        HostCommand::Previous => report_step(service.previous()?),
        HostCommand::PauseOrResume => {
            let playing = service.pause_or_resume()?;
            println!("{}", if playing { "playing" } else { "paused" });
        }
        HostCommand::CycleRepeat => println!("repeat {}", service.cycle_repeat()?),
        HostCommand::ToggleShuffle => {
            let enabled = service.toggle_shuffle()?;
            println!("shuffle {}", if enabled { "on" } else { "off" });
        }
        HostCommand::PlayAt(index) => service.play_at(index)?,
        HostCommand::Status => {
            let status = service.status()?;
            println!(
                "{} | repeat {} | shuffle {}",
                if status.playing { "playing" } else { "stopped" },
                status.repeat,
                if status.shuffle { "on" } else { "off" }
            );
            for (index, name) in status.tracks.iter().enumerate() {
                let marker = if index == status.index { '*' } else { ' ' };
                println!("{} {:>3}  {}", marker, index + 1, name);
            }
        }
        HostCommand::Save(path) => {
            let bag = service.snapshot()?.to_bag();
            let json = serde_json::to_string_pretty(&Value::Object(bag))?;
            fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
            println!("saved {}", path.display());
        }
        HostCommand::Restore(path) => service.restore(read_snapshot(&path)?)?,
        HostCommand::Stop => service.stop()?,
        HostCommand::Help => println!("{}", HostCommand::HELP),
        HostCommand::Quit => {}
    }
    Ok(())
}

fn report_step(step: Step) {
    match step {
        Step::Play(_) => {}
        Step::Stop => println!("end of playlist"),
        Step::AtStart => println!("already at the first track"),
    }
}

fn read_snapshot(path: &Path) -> anyhow::Result<SessionSnapshot> {
    let json = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let bag: Map<String, Value> = serde_json::from_str(&json)?;
    Ok(SessionSnapshot::from_bag(&bag)?)
}

/// Print playback events until the service shuts down
fn print_events(events: &Receiver<PlaybackEvent>) {
    let mut names: Vec<String> = Vec::new();

    for event in events {
        match event {
            PlaybackEvent::TrackChanged { index, tracks } => {
                if let Some(tracks) = tracks {
                    names = tracks;
                }
                let name = names.get(index).map_or("?", String::as_str);
                println!("\n>> [{}/{}] {}", index + 1, names.len(), name);
            }
            PlaybackEvent::Stopped { .. } => println!("\n>> stopped"),
        }
    }
}
