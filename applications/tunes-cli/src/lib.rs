//! Tunes command-line player
//!
//! Host layer around `tunes-playback`: configuration, the path permission
//! gate, a simulated media engine and the interactive command reader.

pub mod config;
pub mod engine;
pub mod error;
pub mod input;

pub use config::{CliConfig, EngineSettings};
pub use engine::SimulatedEngine;
pub use error::{CliError, Result};
pub use input::{check_access, HostCommand};
