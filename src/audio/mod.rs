//! Tone synthesis, caching, spectrum analysis, playback and recording.
//!
//! Tones are rendered once per quantized frequency and shared from the
//! cache; playback and recording only ever see finished buffers.

mod cache;
mod playback;
mod recording;
mod spectrum;
mod synthesis;

// Re-export public types
pub use cache::{quantize, ToneCache};
#[cfg(feature = "playback")]
pub use playback::CpalOutput;
pub use playback::{OutputDevice, PlaybackEvent, PlaybackPool};
#[cfg(feature = "wav")]
pub use recording::WavFile;
pub use recording::{FileSupport, LoadedRecording, Recorder, RecordingStore, SampleFile, Take};
pub use spectrum::{analyze, bin_width_hz, SpectrumView};
pub use synthesis::{decay_rate, envelope, ToneBuffer, ToneSynthesizer, DECAY_FLOOR};
