//! The instrument: one explicitly built engine owning config, cache, scale,
//! take and the optional playback and file capabilities.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crossbeam_channel::Receiver;
use parking_lot::{Mutex, RwLock};

use crate::audio::{
    analyze, FileSupport, LoadedRecording, OutputDevice, PlaybackEvent, PlaybackPool, Recorder,
    RecordingStore, SpectrumView, Take, ToneBuffer, ToneCache, ToneSynthesizer,
};
use crate::error::{ConfigError, RecordingError, RecordingResult};
use crate::params::EngineConfig;
use crate::pitch::Pitch;
use crate::scale::{Scale, ScaleKind};

/// A take written to disk
#[derive(Debug, Clone, PartialEq)]
pub struct SavedTake {
    pub path: PathBuf,
    pub duration_secs: f64,
    pub notes: usize,
}

/// Shareable by reference across the input thread and anything else that
/// strikes notes.
pub struct Engine {
    config: EngineConfig,
    cache: ToneCache,
    scale: RwLock<Scale>,
    recorder: Recorder,
    store: RecordingStore,
    /// Held while a take's file name is picked and written
    naming: Mutex<()>,
    playback: Option<PlaybackPool>,
}

impl Engine {
    /// Build an engine without playback and with the compiled-in file support.
    /// The default scale is laid out and its tones pre-rendered.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let synth = ToneSynthesizer::new(config.synth.clone());
        let cache = ToneCache::new(synth, config.cache.key_precision);
        let scale = Scale::build(
            ScaleKind::from_name(&config.scale.default_scale),
            config.scale.pitch_count,
            config.scale.base_octave,
        );
        cache.warm(scale.pitches());
        let store = RecordingStore::new(FileSupport::detect(), config.synth.sample_rate_hz);

        Ok(Self {
            config,
            cache,
            scale: RwLock::new(scale),
            recorder: Recorder::new(),
            store,
            naming: Mutex::new(()),
            playback: None,
        })
    }

    /// Build an engine and probe the host output device once
    pub fn detect(config: EngineConfig) -> Result<Self, ConfigError> {
        let engine = Self::new(config)?;

        #[cfg(feature = "playback")]
        {
            let grace = std::time::Duration::from_millis(engine.config.playback.drain_grace_ms);
            if let Some(output) = crate::audio::CpalOutput::detect(grace) {
                return Ok(engine.with_playback(Arc::new(output)));
            }
        }

        Ok(engine)
    }

    /// Route strikes to `device` through a worker pool
    pub fn with_playback(mut self, device: Arc<dyn OutputDevice>) -> Self {
        self.playback = Some(PlaybackPool::new(device, &self.config.playback));
        self
    }

    /// Replace the file capability (e.g. to disable saving)
    pub fn with_file_support(mut self, support: FileSupport) -> Self {
        self.store = RecordingStore::new(support, self.config.synth.sample_rate_hz);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn cache(&self) -> &ToneCache {
        &self.cache
    }

    pub fn sample_rate(&self) -> u32 {
        self.config.synth.sample_rate_hz
    }

    pub fn has_playback(&self) -> bool {
        self.playback.is_some()
    }

    pub fn has_file_support(&self) -> bool {
        self.store.is_available()
    }

    // === Scale ===

    /// Switch to the scale called `name` (unknown names fall back to
    /// pentatonic) and pre-render its tones. Returns the scale in use.
    pub fn set_scale(&self, name: &str) -> ScaleKind {
        let kind = ScaleKind::from_name(name);
        let scale = Scale::build(
            kind,
            self.config.scale.pitch_count,
            self.config.scale.base_octave,
        );

        self.cache.clear();
        self.cache.warm(scale.pitches());
        *self.scale.write() = scale;

        log::debug!("Scale set to {}", kind);
        kind
    }

    pub fn scale_kind(&self) -> ScaleKind {
        self.scale.read().kind()
    }

    pub fn pitches(&self) -> Vec<Pitch> {
        self.scale.read().pitches().to_vec()
    }

    pub fn pitch(&self, index: usize) -> Option<Pitch> {
        self.scale.read().get(index).copied()
    }

    // === Strikes ===

    /// Strike bar `index` of the current scale
    pub fn strike(&self, index: usize) -> Option<ToneBuffer> {
        let pitch = self.pitch(index)?;
        Some(self.strike_frequency(pitch.frequency()))
    }

    /// Sound `frequency`: cached tone, appended to the take when recording,
    /// handed to playback when available. Never blocks on the device.
    pub fn strike_frequency(&self, frequency: f64) -> ToneBuffer {
        let tone = self.cache.get_or_render(frequency);

        self.recorder.append(&tone);
        if let Some(pool) = &self.playback {
            pool.submit(tone.clone());
        }

        tone
    }

    /// Spectrum of the cached tone for `frequency`
    pub fn spectrum(&self, frequency: f64) -> SpectrumView {
        let tone = self.cache.get_or_render(frequency);
        analyze(&tone, tone.sample_rate(), self.config.spectrum.ceiling_hz)
    }

    /// Playback failure reports, if playback is enabled
    pub fn playback_events(&self) -> Option<&Receiver<PlaybackEvent>> {
        self.playback.as_ref().map(|pool| pool.events())
    }

    // === Recording ===

    pub fn start_recording(&self) {
        self.recorder.start();
    }

    pub fn stop_recording(&self) -> Option<Take> {
        self.recorder.stop()
    }

    pub fn is_recording(&self) -> bool {
        self.recorder.is_recording()
    }

    pub fn save_take(&self, take: &Take, path: &Path) -> RecordingResult<()> {
        self.store.save(take, path)
    }

    /// Stop recording and save `user`'s take as
    /// `rec_<user>_<unix-millis>.wav` in the configured recordings directory.
    ///
    /// On any error the take stays in the recorder, so saving can be retried
    /// or the take fetched with [`Engine::stop_recording`].
    pub fn finish_recording(&self, user: &str) -> RecordingResult<SavedTake> {
        if !self.store.is_available() {
            return Err(RecordingError::Unavailable);
        }
        let Some(take) = self.stop_recording() else {
            return Err(RecordingError::EmptyTake);
        };
        if take.is_empty() {
            self.recorder.restore(take);
            return Err(RecordingError::EmptyTake);
        }

        match self.write_take(&take, user) {
            Ok(path) => Ok(SavedTake {
                path,
                duration_secs: take.duration_secs(self.sample_rate()),
                notes: take.notes(),
            }),
            Err(e) => {
                self.recorder.restore(take);
                Err(e)
            }
        }
    }

    /// Save under the first free name; never overwrites an earlier take
    fn write_take(&self, take: &Take, user: &str) -> RecordingResult<PathBuf> {
        let _naming = self.naming.lock();
        let recording = &self.config.recording;
        fs::create_dir_all(&recording.output_dir)?;

        let stamp = chrono::Utc::now().timestamp_millis();
        let mut attempt = 0;
        let mut path = recording.take_path(user, stamp, attempt);
        while path.exists() {
            attempt += 1;
            path = recording.take_path(user, stamp, attempt);
        }

        self.store.save(take, &path)?;
        Ok(path)
    }

    pub fn load_recording(&self, path: &Path) -> RecordingResult<LoadedRecording> {
        self.store.load(path)
    }
}
