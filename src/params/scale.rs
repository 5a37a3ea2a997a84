//! Scale layout and cache keying parameters.

use serde::Deserialize;

use crate::error::ConfigError;

/// Scale generation parameters
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScaleConfig {
    /// Number of bars on the instrument (pitches per scale)
    pub pitch_count: usize,

    /// Octave of the first bar (C4 = middle C)
    pub base_octave: i32,

    /// Scale selected at startup: pentatonic, major, chromatic
    pub default_scale: String,
}

impl Default for ScaleConfig {
    fn default() -> Self {
        Self {
            pitch_count: 22,
            base_octave: 4,
            default_scale: "pentatonic".to_string(),
        }
    }
}

impl ScaleConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pitch_count == 0 {
            return Err(ConfigError::Invalid("pitch count must be > 0".to_string()));
        }
        // Keeps the highest chromatic bar well below f64 overflow
        if !(-8..=12).contains(&self.base_octave) {
            return Err(ConfigError::Invalid(format!(
                "base octave must be within [-8, 12], got {}",
                self.base_octave
            )));
        }
        Ok(())
    }
}

/// Tone cache parameters
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Decimal places kept when quantizing a frequency into a cache key
    /// 2 = 440.004 and 440.001 share one entry
    pub key_precision: u32,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { key_precision: 2 }
    }
}

impl CacheConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.key_precision > 6 {
            return Err(ConfigError::Invalid(format!(
                "cache key precision must be <= 6 decimals, got {}",
                self.key_precision
            )));
        }
        Ok(())
    }
}
