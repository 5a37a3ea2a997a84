//! End-to-end checks across scale, synthesis, cache, analysis and takes.

use std::sync::{Arc, Barrier};
use std::thread;

use balafon::audio::{analyze, ToneBuffer, ToneCache, ToneSynthesizer};
use balafon::params::{EngineConfig, SynthConfig};
use balafon::scale::build_scale;
use balafon::Engine;

#[test]
fn test_pentatonic_first_bar_renders_clean() {
    let pitches = build_scale("pentatonic", 22, 4);
    assert_eq!(pitches.len(), 22);

    let synth = ToneSynthesizer::default();
    let tone = synth.render_pitch(&pitches[0], 0.1);

    assert_eq!(tone.len(), (0.1_f64 * 44100.0).round() as usize);
    assert_eq!(tone.sample_rate(), 44100);
    assert!(tone.iter().all(|s| s.is_finite()));
}

#[test]
fn test_cached_tone_spectrum_is_normalized() {
    let cache = ToneCache::new(ToneSynthesizer::default(), 2);
    let tone = cache.get_or_render(440.0);

    let view = analyze(&tone, tone.sample_rate(), 2000.0);
    let max = view.magnitudes.iter().copied().fold(0.0_f32, f32::max);
    assert!((max - 1.0).abs() < 1e-6);
    assert!(view.magnitudes.iter().all(|&m| (0.0..=1.0).contains(&m)));
}

#[test]
fn test_engine_shared_across_threads() {
    let config = EngineConfig {
        synth: SynthConfig {
            default_duration_s: 0.05,
            ..SynthConfig::default()
        },
        ..EngineConfig::default()
    };
    let engine = Arc::new(Engine::new(config).unwrap());
    engine.cache().clear();
    let renders = engine.cache().render_count();
    let barrier = Arc::new(Barrier::new(8));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let engine = Arc::clone(&engine);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                engine.strike_frequency(880.0)
            })
        })
        .collect();
    let tones: Vec<ToneBuffer> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert_eq!(engine.cache().render_count(), renders + 1);
    assert!(tones.windows(2).all(|w| w[0] == w[1]));
}

#[cfg(feature = "wav")]
#[test]
fn test_take_round_trips_through_wav() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("take.wav");
    let engine = Engine::new(EngineConfig::default()).unwrap();

    engine.start_recording();
    for index in [0, 1, 2, 1, 0] {
        engine.strike(index).unwrap();
    }
    let take = engine.stop_recording().unwrap();
    engine.save_take(&take, &path).unwrap();

    let loaded = engine.load_recording(&path).unwrap();
    assert_eq!(loaded.sample_rate, engine.sample_rate());
    assert_eq!(loaded.samples.len(), take.samples().len());
    assert!(loaded
        .samples
        .iter()
        .zip(take.samples())
        .all(|(a, b)| (a - b).abs() <= f32::EPSILON));
}
