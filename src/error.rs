//! Error types for configuration, recording, playback and metadata storage.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Error, Debug)]
pub enum RecordingError {
    #[error("Audio file support is unavailable")]
    Unavailable,

    #[error("Nothing recorded")]
    EmptyTake,

    #[error("File not found: {0}")]
    NotFound(PathBuf),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("WAV error: {0}")]
    Wav(String),
}

pub type RecordingResult<T> = Result<T, RecordingError>;

#[cfg(feature = "wav")]
impl From<hound::Error> for RecordingError {
    fn from(err: hound::Error) -> Self {
        match err {
            hound::Error::IoError(io) => RecordingError::Io(io),
            hound::Error::Unsupported => {
                RecordingError::UnsupportedFormat("unsupported WAV layout".to_string())
            }
            hound::Error::FormatError(msg) => RecordingError::UnsupportedFormat(msg.to_string()),
            other => RecordingError::Wav(other.to_string()),
        }
    }
}

#[derive(Error, Debug)]
pub enum PlaybackError {
    #[error("No audio output device found")]
    NoDevice,

    #[error("Output stream error: {0}")]
    Stream(String),

    #[error("Output device stalled after {0:.2}s")]
    Stalled(f64),
}

#[cfg(feature = "playback")]
impl From<cpal::SupportedStreamConfigsError> for PlaybackError {
    fn from(err: cpal::SupportedStreamConfigsError) -> Self {
        PlaybackError::Stream(format!("failed to list output configs: {}", err))
    }
}

#[cfg(feature = "playback")]
impl From<cpal::DefaultStreamConfigError> for PlaybackError {
    fn from(err: cpal::DefaultStreamConfigError) -> Self {
        PlaybackError::Stream(format!("failed to get output config: {}", err))
    }
}

#[cfg(feature = "playback")]
impl From<cpal::BuildStreamError> for PlaybackError {
    fn from(err: cpal::BuildStreamError) -> Self {
        PlaybackError::Stream(format!("failed to build output stream: {}", err))
    }
}

#[cfg(feature = "playback")]
impl From<cpal::PlayStreamError> for PlaybackError {
    fn from(err: cpal::PlayStreamError) -> Self {
        PlaybackError::Stream(format!("failed to start output stream: {}", err))
    }
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
