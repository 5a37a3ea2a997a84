//! Memoized tone renders keyed by quantized frequency.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use super::synthesis::{ToneBuffer, ToneSynthesizer};
use crate::pitch::Pitch;

/// Frequency scaled by `10^precision` and rounded to a whole number
pub fn quantize(frequency: f64, precision: u32) -> f64 {
    (frequency * 10f64.powi(precision as i32)).round()
}

/// Thread-safe tone cache.
///
/// One lock covers lookup, render and insert, so two callers asking for the
/// same unseen key never both render it.
pub struct ToneCache {
    synth: ToneSynthesizer,
    key_precision: u32,
    entries: Mutex<HashMap<u64, ToneBuffer>>,
    renders: AtomicU64,
}

impl ToneCache {
    pub fn new(synth: ToneSynthesizer, key_precision: u32) -> Self {
        Self {
            synth,
            key_precision,
            entries: Mutex::new(HashMap::new()),
            renders: AtomicU64::new(0),
        }
    }

    pub fn synthesizer(&self) -> &ToneSynthesizer {
        &self.synth
    }

    /// Cache key: bit pattern of the quantized frequency. Distinct at any
    /// magnitude, unlike an integer cast.
    pub fn key(&self, frequency: f64) -> u64 {
        quantize(frequency, self.key_precision).to_bits()
    }

    /// Cached default-length tone for `frequency`, rendered on first use
    pub fn get_or_render(&self, frequency: f64) -> ToneBuffer {
        self.get_or_insert_with(frequency, |synth| synth.render_default(frequency))
    }

    /// Cached entry for `frequency`, built by `render` on a miss.
    ///
    /// `render` runs with the cache locked.
    pub fn get_or_insert_with<F>(&self, frequency: f64, render: F) -> ToneBuffer
    where
        F: FnOnce(&ToneSynthesizer) -> ToneBuffer,
    {
        let key = self.key(frequency);
        let mut entries = self.entries.lock();

        entries
            .entry(key)
            .or_insert_with(|| {
                let count = self.renders.fetch_add(1, Ordering::Relaxed) + 1;
                log::debug!("Rendering {:.2} Hz (render #{})", frequency, count);
                render(&self.synth)
            })
            .clone()
    }

    /// Pre-render every pitch so the first strike is instant
    pub fn warm(&self, pitches: &[Pitch]) {
        for pitch in pitches {
            self.get_or_render(pitch.frequency());
        }
        log::debug!("Cache warmed with {} pitches", pitches.len());
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Total renders performed since construction (clears do not reset it)
    pub fn render_count(&self) -> u64 {
        self.renders.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::SynthConfig;
    use crate::scale::{Scale, ScaleKind};
    use std::sync::atomic::AtomicUsize;
    use std::sync::{Arc, Barrier};
    use std::thread;

    fn cache() -> ToneCache {
        let synth = ToneSynthesizer::new(SynthConfig {
            default_duration_s: 0.05,
            ..SynthConfig::default()
        });
        ToneCache::new(synth, 2)
    }

    #[test]
    fn test_quantize() {
        assert_eq!(quantize(440.0, 2), 44000.0);
        assert_eq!(quantize(440.004, 2), 44000.0);
        assert_eq!(quantize(440.006, 2), 44001.0);
        assert_eq!(quantize(261.6255653, 2), 26163.0);
        assert_eq!(quantize(261.6255653, 0), 262.0);
    }

    #[test]
    fn test_huge_frequencies_keep_distinct_keys() {
        let cache = cache();

        assert_ne!(cache.key(1.0e17), cache.key(2.0e17));
        assert_ne!(cache.key(1.0e300), cache.key(2.0e300));
        assert_eq!(cache.key(440.001), cache.key(439.999));
    }

    #[test]
    fn test_repeated_lookup_returns_same_buffer() {
        let cache = cache();

        let first = cache.get_or_render(440.0);
        let second = cache.get_or_render(440.0);

        assert!(ToneBuffer::ptr_eq(&first, &second));
        assert_eq!(first, second);
        assert_eq!(cache.render_count(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_near_duplicate_frequencies_share_entry() {
        let cache = cache();

        let a = cache.get_or_render(440.001);
        let b = cache.get_or_render(439.999);

        assert!(ToneBuffer::ptr_eq(&a, &b));
        assert_eq!(cache.render_count(), 1);
    }

    #[test]
    fn test_clear_forces_rerender() {
        let cache = cache();

        let before = cache.get_or_render(440.0);
        cache.clear();
        assert!(cache.is_empty());

        let after = cache.get_or_render(440.0);
        assert!(!ToneBuffer::ptr_eq(&before, &after));
        assert_eq!(before, after);
        assert_eq!(cache.render_count(), 2);
    }

    #[test]
    fn test_warm_renders_each_pitch_once() {
        let cache = cache();
        let scale = Scale::build(ScaleKind::Pentatonic, 22, 4);

        cache.warm(scale.pitches());
        cache.warm(scale.pitches());

        assert_eq!(cache.len(), 22);
        assert_eq!(cache.render_count(), 22);
    }

    #[test]
    fn test_concurrent_requests_render_once() {
        const CALLERS: usize = 16;

        let cache = Arc::new(cache());
        let calls = Arc::new(AtomicUsize::new(0));
        let barrier = Arc::new(Barrier::new(CALLERS));

        let handles: Vec<_> = (0..CALLERS)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let calls = Arc::clone(&calls);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    cache.get_or_insert_with(523.25, |synth| {
                        calls.fetch_add(1, Ordering::SeqCst);
                        synth.render_default(523.25)
                    })
                })
            })
            .collect();

        let buffers: Vec<ToneBuffer> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.render_count(), 1);
        assert!(buffers.windows(2).all(|w| w[0] == w[1]));
        assert!(buffers.windows(2).all(|w| ToneBuffer::ptr_eq(&w[0], &w[1])));
    }
}
