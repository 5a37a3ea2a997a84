//! Percussive tone synthesis: fundamental, overtones and a strike envelope.

use std::f64::consts::PI;
use std::ops::Deref;
use std::sync::Arc;

use crate::params::SynthConfig;
use crate::pitch::Pitch;

/// Envelope level left at the very end of a tone (1% of peak)
pub const DECAY_FLOOR: f64 = 0.01;

/// An immutable rendered tone.
///
/// Clones share the same sample storage; use [`ToneBuffer::ptr_eq`] to tell
/// whether two handles point at the same render.
#[derive(Debug, Clone, PartialEq)]
pub struct ToneBuffer {
    samples: Arc<[f32]>,
    sample_rate: u32,
}

impl ToneBuffer {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples: samples.into(),
            sample_rate,
        }
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Sample rate (Hz)
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// True when both handles share one underlying render
    pub fn ptr_eq(a: &ToneBuffer, b: &ToneBuffer) -> bool {
        Arc::ptr_eq(&a.samples, &b.samples)
    }
}

impl Deref for ToneBuffer {
    type Target = [f32];

    fn deref(&self) -> &[f32] {
        &self.samples
    }
}

/// Decay constant reaching [`DECAY_FLOOR`] exactly at `duration_s`
pub fn decay_rate(duration_s: f64) -> f64 {
    -DECAY_FLOOR.ln() / duration_s
}

/// Attack/decay envelope sampled at `n` points over `[0, duration_s)`.
///
/// A linear 0→1 ramp covers the first `max(1, sample_rate * attack_s)`
/// samples; the rest follows `exp(-k·t)` measured from the start of the tone.
pub fn envelope(n: usize, duration_s: f64, sample_rate: u32, attack_s: f64) -> Vec<f64> {
    let attack_samples = ((sample_rate as f64 * attack_s) as usize).max(1).min(n);
    let step = duration_s / n as f64;
    let k = decay_rate(duration_s);

    (0..n)
        .map(|i| {
            if i < attack_samples {
                if attack_samples == 1 {
                    0.0
                } else {
                    i as f64 / (attack_samples - 1) as f64
                }
            } else {
                (-k * i as f64 * step).exp()
            }
        })
        .collect()
}

/// Renders tones from a fixed configuration. Pure and thread-safe.
#[derive(Debug, Clone)]
pub struct ToneSynthesizer {
    config: SynthConfig,
}

impl ToneSynthesizer {
    pub fn new(config: SynthConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SynthConfig {
        &self.config
    }

    pub fn sample_rate(&self) -> u32 {
        self.config.sample_rate_hz
    }

    /// Render `frequency` Hz for `duration_s` seconds.
    ///
    /// # Panics
    ///
    /// Panics if the frequency or duration is not a positive finite number.
    pub fn render(&self, frequency: f64, duration_s: f64, harmonics: bool) -> ToneBuffer {
        assert!(
            frequency.is_finite() && frequency > 0.0,
            "frequency must be positive, got {}",
            frequency
        );
        assert!(
            duration_s.is_finite() && duration_s > 0.0,
            "duration must be positive, got {}",
            duration_s
        );

        let sample_rate = self.config.sample_rate_hz;
        let n = self.config.sample_count(duration_s);
        let step = duration_s / n as f64;
        let env = envelope(n, duration_s, sample_rate, self.config.attack_s);
        let volume = self.config.master_volume;

        let samples = env
            .iter()
            .enumerate()
            .map(|(i, &level)| {
                let t = i as f64 * step;
                let phase = 2.0 * PI * frequency * t;
                let mut wave = phase.sin();
                if harmonics {
                    for h in &self.config.harmonics {
                        wave += h.amplitude * (phase * h.multiplier).sin();
                    }
                }
                (wave * level * volume) as f32
            })
            .collect();

        ToneBuffer::new(samples, sample_rate)
    }

    /// Render with the configured default length and overtone switch
    pub fn render_default(&self, frequency: f64) -> ToneBuffer {
        self.render(
            frequency,
            self.config.default_duration_s,
            self.config.harmonics_enabled,
        )
    }

    pub fn render_pitch(&self, pitch: &Pitch, duration_s: f64) -> ToneBuffer {
        self.render(pitch.frequency(), duration_s, self.config.harmonics_enabled)
    }
}

impl Default for ToneSynthesizer {
    fn default() -> Self {
        Self::new(SynthConfig::default())
    }
}
