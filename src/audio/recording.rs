//! Takes (concatenated strikes) and their persistence as WAV files.

use std::path::Path;

use parking_lot::Mutex;

use super::synthesis::ToneBuffer;
use crate::error::{RecordingError, RecordingResult};

/// Samples of an in-progress recording, in strike order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Take {
    samples: Vec<f32>,
    notes: usize,
}

impl Take {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a strike after everything recorded so far
    pub fn append(&mut self, buffer: &ToneBuffer) {
        self.samples.extend_from_slice(buffer.samples());
        self.notes += 1;
    }

    /// Append every strike of `later` after this take's own
    pub fn extend(&mut self, later: &Take) {
        self.samples.extend_from_slice(&later.samples);
        self.notes += later.notes;
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Number of strikes appended
    pub fn notes(&self) -> usize {
        self.notes
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn duration_secs(&self, sample_rate: u32) -> f64 {
        self.samples.len() as f64 / sample_rate as f64
    }
}

/// Thread-safe holder of the active take.
///
/// Appends from any thread are serialized so the take keeps strike order.
#[derive(Debug, Default)]
pub struct Recorder {
    active: Mutex<Option<Take>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a fresh take, discarding any unfinished one
    pub fn start(&self) {
        let mut active = self.active.lock();
        if let Some(old) = active.replace(Take::new()) {
            if !old.is_empty() {
                log::warn!("Discarding unfinished take of {} notes", old.notes());
            }
        }
    }

    /// Append to the active take; no-op when not recording.
    /// Returns whether the buffer was recorded.
    pub fn append(&self, buffer: &ToneBuffer) -> bool {
        match self.active.lock().as_mut() {
            Some(take) => {
                take.append(buffer);
                true
            }
            None => false,
        }
    }

    /// End recording and hand over the finished take
    pub fn stop(&self) -> Option<Take> {
        self.active.lock().take()
    }

    /// Hand a stopped take back, e.g. after a failed save. Strikes recorded
    /// since it was stopped stay after it.
    pub fn restore(&self, mut take: Take) {
        let mut active = self.active.lock();
        if let Some(newer) = active.take() {
            take.extend(&newer);
        }
        *active = Some(take);
    }

    pub fn is_recording(&self) -> bool {
        self.active.lock().is_some()
    }
}

/// A recording read back from disk
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedRecording {
    /// Mono samples at the file's native rate
    pub samples: Vec<f32>,
    /// Sample rate (Hz)
    pub sample_rate: u32,
}

impl LoadedRecording {
    pub fn into_buffer(self) -> ToneBuffer {
        ToneBuffer::new(self.samples, self.sample_rate)
    }
}

/// Backend that moves sample data to and from files
pub trait SampleFile: Send + Sync {
    fn write(&self, path: &Path, samples: &[f32], sample_rate: u32) -> RecordingResult<()>;

    fn read(&self, path: &Path) -> RecordingResult<LoadedRecording>;
}

/// 32-bit float mono WAV files via hound
#[cfg(feature = "wav")]
#[derive(Debug, Clone, Copy, Default)]
pub struct WavFile;

#[cfg(feature = "wav")]
impl SampleFile for WavFile {
    fn write(&self, path: &Path, samples: &[f32], sample_rate: u32) -> RecordingResult<()> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        };
        let mut writer = hound::WavWriter::create(path, spec)?;
        for &sample in samples {
            writer.write_sample(sample)?;
        }
        writer.finalize()?;
        Ok(())
    }

    fn read(&self, path: &Path) -> RecordingResult<LoadedRecording> {
        if !path.exists() {
            return Err(RecordingError::NotFound(path.to_path_buf()));
        }

        let reader = hound::WavReader::open(path)?;
        let spec = reader.spec();
        let channels = spec.channels.max(1) as usize;

        let interleaved: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => reader
                .into_samples::<f32>()
                .collect::<Result<_, _>>()?,
            hound::SampleFormat::Int => {
                let max_value = (1_i64 << (spec.bits_per_sample - 1)) as f32;
                reader
                    .into_samples::<i32>()
                    .map(|s| s.map(|v| v as f32 / max_value))
                    .collect::<Result<_, _>>()?
            }
        };

        // Downmix to mono
        let samples = interleaved
            .chunks(channels)
            .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
            .collect();

        Ok(LoadedRecording {
            samples,
            sample_rate: spec.sample_rate,
        })
    }
}

/// Whether audio files can be written and read in this build
pub enum FileSupport {
    Available(Box<dyn SampleFile>),
    Unavailable,
}

impl FileSupport {
    /// The backend compiled into this build, decided once
    pub fn detect() -> Self {
        #[cfg(feature = "wav")]
        {
            FileSupport::Available(Box::new(WavFile))
        }
        #[cfg(not(feature = "wav"))]
        {
            log::warn!("Built without WAV support; saving and loading are disabled");
            FileSupport::Unavailable
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, FileSupport::Available(_))
    }
}

/// Saves and loads takes through the detected file capability
pub struct RecordingStore {
    support: FileSupport,
    sample_rate: u32,
}

impl RecordingStore {
    pub fn new(support: FileSupport, sample_rate: u32) -> Self {
        Self {
            support,
            sample_rate,
        }
    }

    pub fn is_available(&self) -> bool {
        self.support.is_available()
    }

    /// Append a strike to a take (strike order is kept)
    pub fn append(take: &mut Take, buffer: &ToneBuffer) {
        take.append(buffer);
    }

    /// Write the take at the engine sample rate
    pub fn save(&self, take: &Take, path: &Path) -> RecordingResult<()> {
        let FileSupport::Available(file) = &self.support else {
            return Err(RecordingError::Unavailable);
        };
        if take.is_empty() {
            return Err(RecordingError::EmptyTake);
        }

        file.write(path, take.samples(), self.sample_rate)
            .inspect_err(|e| log::warn!("Saving {} failed: {}", path.display(), e))?;
        log::info!(
            "Saved {} notes ({:.2}s) to {}",
            take.notes(),
            take.duration_secs(self.sample_rate),
            path.display()
        );
        Ok(())
    }

    /// Read a recording at its native sample rate
    pub fn load(&self, path: &Path) -> RecordingResult<LoadedRecording> {
        let FileSupport::Available(file) = &self.support else {
            return Err(RecordingError::Unavailable);
        };

        file.read(path)
            .inspect_err(|e| log::warn!("Loading {} failed: {}", path.display(), e))
    }
}
