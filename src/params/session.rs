//! Playback and recording configuration.

use std::path::PathBuf;

use serde::Deserialize;

use crate::error::ConfigError;

/// Playback worker pool configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Worker threads streaming tones to the output device
    pub workers: usize,

    /// Pending tones allowed before new strikes are dropped
    pub queue_capacity: usize,

    /// Extra wait after a tone's nominal length before the device is
    /// considered stalled (milliseconds)
    pub drain_grace_ms: u64,

    /// Unread failure reports kept before newer ones are discarded
    pub event_capacity: usize,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            workers: 2,
            queue_capacity: 16,
            drain_grace_ms: 250,
            event_capacity: 64,
        }
    }
}

impl PlaybackConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workers == 0 {
            return Err(ConfigError::Invalid(
                "playback needs at least one worker".to_string(),
            ));
        }
        if self.queue_capacity == 0 {
            return Err(ConfigError::Invalid(
                "playback queue capacity must be > 0".to_string(),
            ));
        }
        if self.event_capacity == 0 {
            return Err(ConfigError::Invalid(
                "playback event capacity must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Recording mode configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RecordingConfig {
    /// Output directory for saved takes
    pub output_dir: PathBuf,
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("recordings"),
        }
    }
}

impl RecordingConfig {
    /// File path for `user`'s take finished at `unix_millis`.
    /// `attempt` > 0 adds a suffix for names already taken.
    pub fn take_path(&self, user: &str, unix_millis: i64, attempt: u32) -> PathBuf {
        let user: String = user
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        let name = match attempt {
            0 => format!("rec_{}_{}.wav", user, unix_millis),
            n => format!("rec_{}_{}_{}.wav", user, unix_millis, n),
        };
        self.output_dir.join(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_path() {
        let config = RecordingConfig::default();
        assert_eq!(
            config.take_path("awa", 1700000000123, 0),
            PathBuf::from("recordings").join("rec_awa_1700000000123.wav")
        );
        assert_eq!(
            config.take_path("awa", 1700000000123, 2),
            PathBuf::from("recordings").join("rec_awa_1700000000123_2.wav")
        );
    }

    #[test]
    fn test_take_path_separates_users() {
        let config = RecordingConfig::default();
        assert_ne!(config.take_path("awa", 1, 0), config.take_path("kofi", 1, 0));
        // Path separators never leave the output directory
        assert_eq!(
            config.take_path("../x y", 1, 0),
            PathBuf::from("recordings").join("rec____x_y_1.wav")
        );
    }

    #[test]
    fn test_playback_validate() {
        assert!(PlaybackConfig::default().validate().is_ok());

        let config = PlaybackConfig {
            workers: 0,
            ..PlaybackConfig::default()
        };
        assert!(config.validate().is_err());

        let config = PlaybackConfig {
            event_capacity: 0,
            ..PlaybackConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
