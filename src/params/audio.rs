//! Synthesis and analysis configuration.

use serde::Deserialize;

use crate::error::ConfigError;

/// One overtone of the tone recipe
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Harmonic {
    /// Frequency multiple of the fundamental (2.0 = octave above)
    pub multiplier: f64,

    /// Amplitude relative to the fundamental (fundamental = 1.0)
    pub amplitude: f64,
}

impl Harmonic {
    pub const fn new(multiplier: f64, amplitude: f64) -> Self {
        Self {
            multiplier,
            amplitude,
        }
    }
}

/// Tone synthesis parameters
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SynthConfig {
    /// Output sample rate (Hz)
    pub sample_rate_hz: u32,

    /// Master gain applied after the envelope (0.0..=1.0)
    pub master_volume: f64,

    /// Note length used when the caller does not pick one (seconds)
    pub default_duration_s: f64,

    /// Linear attack ramp length (seconds)
    /// 5 ms keeps the strike click-free without softening it
    pub attack_s: f64,

    /// Whether cached tones carry the overtones below
    pub harmonics_enabled: bool,

    /// Overtone recipe (wood resonance of the bars)
    pub harmonics: Vec<Harmonic>,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: 44100,
            master_volume: 0.7,
            default_duration_s: 0.45,
            attack_s: 0.005,
            harmonics_enabled: true,
            harmonics: vec![Harmonic::new(2.0, 0.30), Harmonic::new(3.0, 0.15)],
        }
    }
}

impl SynthConfig {
    /// Number of samples in a tone of `duration_s` seconds
    pub fn sample_count(&self, duration_s: f64) -> usize {
        (self.sample_rate_hz as f64 * duration_s).round() as usize
    }

    /// Validate configuration (positive rate, volume within unit range, etc.)
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sample_rate_hz == 0 {
            return Err(ConfigError::Invalid("sample rate must be > 0".to_string()));
        }
        if !(0.0..=1.0).contains(&self.master_volume) {
            return Err(ConfigError::Invalid(format!(
                "master volume must be within [0, 1], got {}",
                self.master_volume
            )));
        }
        if !(self.default_duration_s.is_finite() && self.default_duration_s > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "default duration must be > 0, got {}",
                self.default_duration_s
            )));
        }
        if !(self.attack_s.is_finite() && self.attack_s >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "attack time must be >= 0, got {}",
                self.attack_s
            )));
        }
        if let Some(h) = self
            .harmonics
            .iter()
            .find(|h| !(h.multiplier > 0.0) || !h.amplitude.is_finite())
        {
            return Err(ConfigError::Invalid(format!(
                "harmonic multiplier must be > 0, got {:?}",
                h
            )));
        }
        Ok(())
    }
}

/// Spectrum view configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SpectrumConfig {
    /// Highest displayed frequency (Hz)
    pub ceiling_hz: f64,
}

impl Default for SpectrumConfig {
    fn default() -> Self {
        Self { ceiling_hz: 2000.0 }
    }
}

impl SpectrumConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.ceiling_hz > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "spectrum ceiling must be > 0, got {}",
                self.ceiling_hz
            )));
        }
        Ok(())
    }
}
