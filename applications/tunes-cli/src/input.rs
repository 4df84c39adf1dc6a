//! Host input: the permission gate and the interactive command reader

use crate::error::{CliError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Check that `path` can be opened before listing or playing it
///
/// Folders must be listable, files must be readable.
pub fn check_access(path: &Path) -> Result<()> {
    let metadata = fs::metadata(path)
        .map_err(|e| CliError::Permission(format!("{}: {}", path.display(), e)))?;

    let opened = if metadata.is_dir() {
        fs::read_dir(path).map(drop)
    } else {
        fs::File::open(path).map(drop)
    };

    opened.map_err(|e| CliError::Permission(format!("{}: {}", path.display(), e)))
}

/// A line typed at the prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCommand {
    Next,
    Previous,
    PauseOrResume,
    CycleRepeat,
    ToggleShuffle,
    /// Zero-based playlist index (typed one-based)
    PlayAt(usize),
    Status,
    /// Write the session snapshot as JSON
    Save(PathBuf),
    /// Restore repeat/shuffle from a saved snapshot
    Restore(PathBuf),
    Stop,
    Help,
    Quit,
}

impl HostCommand {
    pub const HELP: &'static str = "\
commands:
  n, next          skip forward
  b, prev          skip back
  p, pause         pause or resume
  r, repeat        cycle repeat (off, all, one)
  s, shuffle       toggle shuffle
  play <number>    jump to a track in the list
  status           show the playlist and modes
  save <file>      write a session snapshot
  restore <file>   apply repeat/shuffle from a snapshot
  stop             stop and clear the playlist
  q, quit          exit";
}

impl FromStr for HostCommand {
    type Err = CliError;

    fn from_str(line: &str) -> Result<Self> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Err(CliError::Command("empty line".to_string()));
        };
        let argument = words.next();

        let command = match (verb.to_ascii_lowercase().as_str(), argument) {
            ("n" | "next", None) => Self::Next,
            ("b" | "prev" | "previous", None) => Self::Previous,
            ("p" | "pause", None) => Self::PauseOrResume,
            ("r" | "repeat", None) => Self::CycleRepeat,
            ("s" | "shuffle", None) => Self::ToggleShuffle,
            ("status" | "ls", None) => Self::Status,
            ("stop", None) => Self::Stop,
            ("h" | "help" | "?", None) => Self::Help,
            ("q" | "quit" | "exit", None) => Self::Quit,
            ("play", Some(number)) => {
                let number: usize = number
                    .parse()
                    .map_err(|_| CliError::Command(format!("not a track number: {}", number)))?;
                if number == 0 {
                    return Err(CliError::Command("track numbers start at 1".to_string()));
                }
                Self::PlayAt(number - 1)
            }
            ("save", Some(file)) => Self::Save(PathBuf::from(file)),
            ("restore", Some(file)) => Self::Restore(PathBuf::from(file)),
            _ => return Err(CliError::Command(line.trim().to_string())),
        };

        if words.next().is_some() {
            return Err(CliError::Command(format!("too many arguments: {}", line.trim())));
        }
        Ok(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_short_and_long_forms() {
        assert_eq!("n".parse::<HostCommand>().unwrap(), HostCommand::Next);
        assert_eq!("  PREV ".parse::<HostCommand>().unwrap(), HostCommand::Previous);
        assert_eq!("shuffle".parse::<HostCommand>().unwrap(), HostCommand::ToggleShuffle);
        assert_eq!("q".parse::<HostCommand>().unwrap(), HostCommand::Quit);
    }

    #[test]
    fn play_takes_one_based_number() {
        assert_eq!("play 3".parse::<HostCommand>().unwrap(), HostCommand::PlayAt(2));
        assert!("play 0".parse::<HostCommand>().is_err());
        assert!("play x".parse::<HostCommand>().is_err());
        assert!("play".parse::<HostCommand>().is_err());
    }

    #[test]
    fn rejects_unknown_and_extra_words() {
        assert!("".parse::<HostCommand>().is_err());
        assert!("dance".parse::<HostCommand>().is_err());
        assert!("next now".parse::<HostCommand>().is_err());
        assert!("save a b".parse::<HostCommand>().is_err());
    }

    #[test]
    fn snapshot_commands_keep_path() {
        assert_eq!(
            "save session.json".parse::<HostCommand>().unwrap(),
            HostCommand::Save(PathBuf::from("session.json"))
        );
    }

    #[test]
    fn access_gate_accepts_readable_paths() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.mp3");
        fs::write(&file, b"").unwrap();

        check_access(dir.path()).unwrap();
        check_access(&file).unwrap();
    }

    #[test]
    fn access_gate_rejects_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let result = check_access(&dir.path().join("missing"));
        assert!(matches!(result, Err(CliError::Permission(_))));
    }
}
