//! Normalized magnitude spectrum of a rendered tone, for display.

use rustfft::{num_complex::Complex, FftPlanner};

/// Frequency bins and their magnitudes scaled into `[0, 1]`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpectrumView {
    /// Bin centre frequencies (Hz), ascending
    pub frequencies: Vec<f32>,
    /// Magnitudes relative to the strongest bin in view
    pub magnitudes: Vec<f32>,
}

impl SpectrumView {
    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }

    /// Strongest bin as (frequency, magnitude)
    pub fn peak(&self) -> Option<(f32, f32)> {
        self.bins().max_by(|a, b| a.1.total_cmp(&b.1))
    }

    /// The `count` strongest bins, strongest first
    pub fn strongest(&self, count: usize) -> Vec<(f32, f32)> {
        let mut bins: Vec<(f32, f32)> = self.bins().collect();
        bins.sort_by(|a, b| b.1.total_cmp(&a.1));
        bins.truncate(count);
        bins
    }

    fn bins(&self) -> impl Iterator<Item = (f32, f32)> + '_ {
        self.frequencies
            .iter()
            .copied()
            .zip(self.magnitudes.iter().copied())
    }
}

/// FFT bin spacing (Hz) for a buffer of `len` samples
pub fn bin_width_hz(sample_rate: u32, len: usize) -> f64 {
    sample_rate as f64 / len as f64
}

/// Magnitude spectrum of `samples` from DC to `ceiling_hz` (inclusive).
///
/// Only the non-negative half of the transform (`0..=n/2`) is kept, as for a
/// real-input DFT. Magnitudes are divided by the largest one in range; a
/// silent buffer stays all zero.
pub fn analyze(samples: &[f32], sample_rate: u32, ceiling_hz: f64) -> SpectrumView {
    let n = samples.len();
    if n == 0 {
        return SpectrumView::default();
    }

    let mut planner = FftPlanner::<f32>::new();
    let fft = planner.plan_fft_forward(n);
    let mut buffer: Vec<Complex<f32>> = samples.iter().map(|&s| Complex::new(s, 0.0)).collect();
    fft.process(&mut buffer);

    let spacing = bin_width_hz(sample_rate, n);
    let (frequencies, mut magnitudes): (Vec<f32>, Vec<f32>) = buffer[..=n / 2]
        .iter()
        .enumerate()
        .map(|(k, c)| (k as f64 * spacing, c.norm()))
        .take_while(|&(freq, _)| freq <= ceiling_hz)
        .map(|(freq, mag)| (freq as f32, mag))
        .unzip();

    let max = magnitudes.iter().copied().fold(0.0_f32, f32::max);
    if max > 0.0 {
        for m in &mut magnitudes {
            *m /= max;
        }
    }

    SpectrumView {
        frequencies,
        magnitudes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::synthesis::ToneSynthesizer;
    use approx::assert_relative_eq;

    #[test]
    fn test_bin_width() {
        // 44100 Hz over 1024 samples ≈ 43.07 Hz per bin
        assert_relative_eq!(bin_width_hz(44100, 1024), 43.066, epsilon = 1e-3);
    }

    #[test]
    fn test_normalized_peak_is_one() {
        let tone = ToneSynthesizer::default().render(440.0, 0.45, true);
        let view = analyze(&tone, 44100, 2000.0);

        let max = view.magnitudes.iter().copied().fold(0.0_f32, f32::max);
        assert_relative_eq!(max, 1.0, epsilon = 1e-6);
        assert!(view.magnitudes.iter().all(|&m| (0.0..=1.0).contains(&m)));
    }

    #[test]
    fn test_respects_ceiling() {
        let tone = ToneSynthesizer::default().render(440.0, 0.45, true);
        let view = analyze(&tone, 44100, 2000.0);

        assert!(!view.is_empty());
        assert_eq!(view.frequencies.len(), view.magnitudes.len());
        assert_eq!(view.frequencies[0], 0.0);
        assert!(view.frequencies.iter().all(|&f| f <= 2000.0));
        // Next bin past the last one kept would exceed the ceiling
        let spacing = bin_width_hz(44100, tone.len()) as f32;
        assert!(view.frequencies[view.len() - 1] + spacing > 2000.0);
    }

    #[test]
    fn test_peak_at_fundamental() {
        let tone = ToneSynthesizer::default().render(440.0, 0.45, true);
        let view = analyze(&tone, 44100, 2000.0);

        let (freq, mag) = view.peak().unwrap();
        assert!((freq - 440.0).abs() < 5.0, "peak at {} Hz", freq);
        assert_eq!(mag, 1.0);

        // The second harmonic shows up among the strongest regions
        let top = view.strongest(40);
        assert!(top.iter().any(|&(f, _)| (f - 880.0).abs() < 5.0));
    }

    #[test]
    fn test_silent_buffer_stays_zero() {
        let view = analyze(&[0.0; 512], 44100, 2000.0);

        assert!(!view.is_empty());
        assert!(view.magnitudes.iter().all(|&m| m == 0.0));
    }

    #[test]
    fn test_empty_buffer() {
        let view = analyze(&[], 44100, 2000.0);
        assert!(view.is_empty());
        assert_eq!(view.peak(), None);
    }

    #[test]
    fn test_ceiling_above_nyquist_keeps_half_spectrum() {
        let view = analyze(&[1.0; 8], 8, 100.0);
        // Bins 0..=4 of an 8-point transform
        assert_eq!(view.len(), 5);
        assert_eq!(view.magnitudes[0], 1.0);
    }
}
