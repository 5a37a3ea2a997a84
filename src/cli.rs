//! Command-line argument parsing.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::error::ConfigError;
use crate::keymap;
use crate::params::EngineConfig;
use crate::pitch::{NoteName, Pitch};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "balafon")]
#[command(about = "Virtual balafon: percussive tone synthesis and analysis", long_about = None)]
#[command(version)]
pub struct Args {
    /// TOML configuration file (missing keys take defaults)
    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Recording metadata file
    #[arg(long, value_name = "FILE", default_value = "data/recordings.json", global = true)]
    pub store: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the pitches laid out on the bars
    Scale {
        /// Scale: pentatonic, major, chromatic
        #[arg(long, default_value = "pentatonic")]
        name: String,

        /// Number of bars (defaults to the configured count)
        #[arg(long)]
        count: Option<usize>,
    },

    /// Render one note to a WAV file
    Render {
        /// Note symbol (C, C#, Db, ...)
        #[arg(long, default_value = "A")]
        note: String,

        #[arg(long, default_value_t = 4, allow_negative_numbers = true)]
        octave: i32,

        /// Note length in seconds (defaults to the configured length)
        #[arg(long, value_name = "SECONDS")]
        duration: Option<f64>,

        /// Fundamental only
        #[arg(long)]
        no_harmonics: bool,

        #[arg(long, default_value = "tone.wav")]
        output: PathBuf,
    },

    /// Print the strongest spectrum bins of a note
    Spectrum {
        #[arg(long, default_value = "A")]
        note: String,

        #[arg(long, default_value_t = 4, allow_negative_numbers = true)]
        octave: i32,

        /// Highest frequency shown (Hz)
        #[arg(long, value_name = "HZ")]
        ceiling: Option<f64>,

        /// How many bins to print
        #[arg(long, default_value_t = 10)]
        top: usize,
    },

    /// Strike bars by key (AZERTY layout: A Z E R ... W X)
    Play {
        /// Keys to strike, in order; other characters are rests
        keys: String,

        #[arg(long)]
        scale: Option<String>,

        /// Time between strikes (milliseconds)
        #[arg(long, value_name = "MS", default_value_t = 250)]
        interval_ms: u64,

        /// Save the performance as a take
        #[arg(long)]
        record: bool,

        /// Owner of the saved take
        #[arg(long, default_value = "guest")]
        user: String,
    },

    /// List saved takes, newest first
    Recordings {
        #[arg(long, default_value = "guest")]
        user: String,
    },
}

impl Args {
    /// Load the configuration file if given, defaults otherwise
    pub fn engine_config(&self) -> Result<EngineConfig, ConfigError> {
        match &self.config {
            Some(path) => EngineConfig::load(path),
            None => Ok(EngineConfig::default()),
        }
    }
}

/// Parse a note symbol, falling back to A for anything unknown
pub fn parse_pitch(note: &str, octave: i32) -> Pitch {
    let name = NoteName::from_symbol(note).unwrap_or_else(|| {
        log::warn!("Unknown note '{}', using A", note);
        NoteName::A
    });
    Pitch::new(name, octave)
}

/// Bar indices for a key sequence; `None` marks a rest
pub fn parse_keys(keys: &str) -> Vec<Option<usize>> {
    keys.chars()
        .filter(|c| !c.is_whitespace())
        .map(keymap::key_index)
        .collect()
}
