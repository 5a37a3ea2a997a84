//! Parameter definitions with physical units and documented semantics.
//!
//! All tuning constants of the instrument live here with:
//! - Physical units (seconds, Hz, etc.)
//! - Documented ranges and meanings
//! - A `validate` pass run once when the engine is built

mod audio;
mod scale;
mod session;

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;

// Re-export all types
pub use audio::{Harmonic, SpectrumConfig, SynthConfig};
pub use scale::{CacheConfig, ScaleConfig};
pub use session::{PlaybackConfig, RecordingConfig};

/// Complete engine configuration, one section per concern.
///
/// Every section is optional in a TOML file; missing keys take their
/// defaults:
///
/// ```toml
/// [synth]
/// master_volume = 0.5
///
/// [scale]
/// default_scale = "major"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub synth: SynthConfig,
    pub scale: ScaleConfig,
    pub spectrum: SpectrumConfig,
    pub cache: CacheConfig,
    pub playback: PlaybackConfig,
    pub recording: RecordingConfig,
}

impl EngineConfig {
    /// Load and validate a configuration file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: EngineConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.synth.validate()?;
        self.scale.validate()?;
        self.spectrum.validate()?;
        self.cache.validate()?;
        self.playback.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_validate() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: EngineConfig = toml::from_str(
            r#"
            [synth]
            master_volume = 0.5

            [scale]
            default_scale = "major"
            "#,
        )
        .unwrap();

        assert_eq!(config.synth.master_volume, 0.5);
        assert_eq!(config.synth.sample_rate_hz, 44100);
        assert_eq!(config.scale.default_scale, "major");
        assert_eq!(config.scale.pitch_count, 22);
        assert_eq!(config.spectrum.ceiling_hz, 2000.0);
    }

    #[test]
    fn test_toml_harmonics() {
        let config: EngineConfig = toml::from_str(
            r#"
            [synth]
            harmonics = [{ multiplier = 2.0, amplitude = 0.5 }]
            "#,
        )
        .unwrap();

        assert_eq!(config.synth.harmonics, vec![Harmonic::new(2.0, 0.5)]);
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[synth]\nmaster_volume = 3.0").unwrap();

        let err = EngineConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let err = EngineConfig::load(Path::new("/nonexistent/balafon.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
