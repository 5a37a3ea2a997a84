//! Fire-and-forget playback through a bounded worker pool.

use std::sync::Arc;
use std::thread;

use crossbeam_channel::{Receiver, Sender, TrySendError};

use super::synthesis::ToneBuffer;
use crate::error::PlaybackError;
use crate::params::PlaybackConfig;

/// Something that can sound a finished buffer. `play` may block until the
/// buffer has been heard; it runs on a pool worker, never on the caller.
pub trait OutputDevice: Send + Sync {
    fn play(&self, samples: &[f32], sample_rate: u32) -> Result<(), PlaybackError>;
}

/// Outcome reports from the pool (only problems are reported). Reports
/// beyond the configured capacity are discarded until the receiver catches up.
#[derive(Debug)]
pub enum PlaybackEvent {
    /// The device failed while playing a tone
    Failed { duration_secs: f64, error: PlaybackError },
    /// The queue was full, so the strike was not played
    Dropped { duration_secs: f64 },
}

/// Worker threads pulling tones from a bounded queue
pub struct PlaybackPool {
    jobs: Option<Sender<ToneBuffer>>,
    events_tx: Sender<PlaybackEvent>,
    events: Receiver<PlaybackEvent>,
    workers: Vec<thread::JoinHandle<()>>,
}

impl PlaybackPool {
    pub fn new(device: Arc<dyn OutputDevice>, config: &PlaybackConfig) -> Self {
        let (jobs_tx, jobs_rx) = crossbeam_channel::bounded::<ToneBuffer>(config.queue_capacity);
        let (events_tx, events) = crossbeam_channel::bounded(config.event_capacity.max(1));

        let workers = (0..config.workers.max(1))
            .map(|id| {
                let jobs = jobs_rx.clone();
                let events = events_tx.clone();
                let device = Arc::clone(&device);
                thread::Builder::new()
                    .name(format!("playback-{}", id))
                    .spawn(move || worker_loop(device, jobs, events))
            })
            .filter_map(|spawned| {
                spawned
                    .inspect_err(|e| log::warn!("Failed to spawn playback worker: {}", e))
                    .ok()
            })
            .collect();

        Self {
            jobs: Some(jobs_tx),
            events_tx,
            events,
            workers,
        }
    }

    /// Queue a tone without waiting. Returns false if it was dropped.
    pub fn submit(&self, buffer: ToneBuffer) -> bool {
        let Some(jobs) = &self.jobs else {
            return false;
        };
        match jobs.try_send(buffer) {
            Ok(()) => true,
            Err(TrySendError::Full(buffer)) | Err(TrySendError::Disconnected(buffer)) => {
                log::warn!("Playback queue full, dropping {:.2}s tone", buffer.duration_secs());
                let _ = self.events_tx.try_send(PlaybackEvent::Dropped {
                    duration_secs: buffer.duration_secs(),
                });
                false
            }
        }
    }

    /// Failure reports, in the order they happened
    pub fn events(&self) -> &Receiver<PlaybackEvent> {
        &self.events
    }

    /// Stop accepting tones, let queued ones finish, then join the workers
    pub fn shutdown(&mut self) {
        self.jobs.take();
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
    }
}

impl Drop for PlaybackPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn worker_loop(
    device: Arc<dyn OutputDevice>,
    jobs: Receiver<ToneBuffer>,
    events: Sender<PlaybackEvent>,
) {
    for buffer in jobs.iter() {
        if let Err(error) = device.play(buffer.samples(), buffer.sample_rate()) {
            log::warn!("Playback error: {}", error);
            let _ = events.try_send(PlaybackEvent::Failed {
                duration_secs: buffer.duration_secs(),
                error,
            });
        }
    }
}

#[cfg(feature = "playback")]
pub use self::cpal_output::CpalOutput;

#[cfg(feature = "playback")]
mod cpal_output {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

    use super::OutputDevice;
    use crate::error::PlaybackError;

    /// The default cpal output device, probed once
    pub struct CpalOutput {
        device: cpal::Device,
        name: String,
        drain_grace: Duration,
        rate_warned: AtomicBool,
    }

    impl CpalOutput {
        /// Open the default output device, or `None` if the host has none
        pub fn detect(drain_grace: Duration) -> Option<Self> {
            let host = cpal::default_host();
            let Some(device) = host.default_output_device() else {
                log::warn!("No audio output device found; playback disabled");
                return None;
            };
            let name = device.name().unwrap_or_else(|_| "Unknown".to_string());
            log::info!("Audio output: {}", name);
            Some(Self {
                device,
                name,
                drain_grace,
                rate_warned: AtomicBool::new(false),
            })
        }

        pub fn name(&self) -> &str {
            &self.name
        }

        /// Stream config at `sample_rate` when the device supports it,
        /// the device default otherwise
        fn stream_config(&self, sample_rate: u32) -> Result<cpal::StreamConfig, PlaybackError> {
            let wanted = cpal::SampleRate(sample_rate);
            let matching = self.device.supported_output_configs()?.find(|range| {
                range.sample_format() == cpal::SampleFormat::F32
                    && range.min_sample_rate() <= wanted
                    && wanted <= range.max_sample_rate()
            });
            if let Some(range) = matching {
                return Ok(range.with_sample_rate(wanted).config());
            }

            let fallback = self.device.default_output_config()?;
            if !self.rate_warned.swap(true, Ordering::Relaxed) {
                log::warn!(
                    "{} cannot play {} Hz; resampling to {} Hz",
                    self.name,
                    sample_rate,
                    fallback.sample_rate().0
                );
            }
            Ok(fallback.into())
        }
    }

    impl OutputDevice for CpalOutput {
        fn play(&self, samples: &[f32], sample_rate: u32) -> Result<(), PlaybackError> {
            let config = self.stream_config(sample_rate)?;
            let channels = config.channels.max(1) as usize;
            let device_rate = config.sample_rate.0;

            let data: Arc<[f32]> = resample(samples, sample_rate, device_rate).into();
            let total = data.len();
            let (done_tx, done_rx) = crossbeam_channel::bounded::<()>(1);
            let mut position = 0usize;

            let stream = self.device.build_output_stream(
                &config,
                move |out: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    // Mono tone copied into every channel of each frame
                    for frame in out.chunks_mut(channels) {
                        frame.fill(data.get(position).copied().unwrap_or(0.0));
                        position = position.saturating_add(1);
                    }
                    if position >= total {
                        let _ = done_tx.try_send(());
                    }
                },
                |err| log::warn!("Audio stream error: {}", err),
                None,
            )?;
            stream.play()?;

            let nominal = Duration::from_secs_f64(total as f64 / device_rate.max(1) as f64);
            done_rx
                .recv_timeout(nominal + self.drain_grace)
                .map_err(|_| PlaybackError::Stalled(nominal.as_secs_f64()))
        }
    }

    /// Linear-interpolated copy of `samples` taken at `from` Hz, at `to` Hz
    pub(super) fn resample(samples: &[f32], from: u32, to: u32) -> Vec<f32> {
        if samples.is_empty() || from == to || from == 0 || to == 0 {
            return samples.to_vec();
        }

        let last = samples.len() - 1;
        let len = (samples.len() as u64 * to as u64 / from as u64).max(1) as usize;
        let step = from as f64 / to as f64;

        (0..len)
            .map(|i| {
                let pos = i as f64 * step;
                let index = (pos as usize).min(last);
                let frac = (pos - index as f64) as f32;
                let a = samples[index];
                let b = samples[(index + 1).min(last)];
                a + (b - a) * frac
            })
            .collect()
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::synthesis::ToneSynthesizer;
    use parking_lot::Mutex;
    use std::time::Duration;

    /// Records what it was asked to play
    #[derive(Default)]
    struct CaptureDevice {
        played: Mutex<Vec<usize>>,
    }

    impl OutputDevice for CaptureDevice {
        fn play(&self, samples: &[f32], _sample_rate: u32) -> Result<(), PlaybackError> {
            self.played.lock().push(samples.len());
            Ok(())
        }
    }

    struct BrokenDevice;

    impl OutputDevice for BrokenDevice {
        fn play(&self, _samples: &[f32], _sample_rate: u32) -> Result<(), PlaybackError> {
            Err(PlaybackError::NoDevice)
        }
    }

    /// Blocks every play until released
    struct GatedDevice {
        gate: crossbeam_channel::Receiver<()>,
    }

    impl OutputDevice for GatedDevice {
        fn play(&self, _samples: &[f32], _sample_rate: u32) -> Result<(), PlaybackError> {
            let _ = self.gate.recv();
            Ok(())
        }
    }

    fn tone() -> ToneBuffer {
        ToneSynthesizer::default().render(440.0, 0.01, true)
    }

    #[test]
    fn test_submitted_tones_are_played() {
        let device = Arc::new(CaptureDevice::default());
        let mut pool = PlaybackPool::new(device.clone(), &PlaybackConfig::default());

        for _ in 0..5 {
            assert!(pool.submit(tone()));
        }
        pool.shutdown();

        assert_eq!(device.played.lock().len(), 5);
        assert!(pool.events().try_recv().is_err());
    }

    #[test]
    fn test_failures_are_reported_not_raised() {
        let mut pool = PlaybackPool::new(Arc::new(BrokenDevice), &PlaybackConfig::default());

        assert!(pool.submit(tone()));
        let event = pool
            .events()
            .recv_timeout(Duration::from_secs(5))
            .unwrap();
        assert!(matches!(
            event,
            PlaybackEvent::Failed {
                error: PlaybackError::NoDevice,
                ..
            }
        ));
        pool.shutdown();
    }

    #[test]
    fn test_unread_failures_stay_bounded() {
        let config = PlaybackConfig {
            event_capacity: 3,
            ..PlaybackConfig::default()
        };
        let mut pool = PlaybackPool::new(Arc::new(BrokenDevice), &config);

        for _ in 0..12 {
            assert!(pool.submit(tone()));
        }
        pool.shutdown();

        assert_eq!(pool.events().len(), 3);
        assert!(pool
            .events()
            .try_iter()
            .all(|e| matches!(e, PlaybackEvent::Failed { .. })));
    }

    #[test]
    fn test_full_queue_drops_without_blocking() {
        let (release, gate) = crossbeam_channel::unbounded();
        let config = PlaybackConfig {
            workers: 1,
            queue_capacity: 1,
            ..PlaybackConfig::default()
        };
        let mut pool = PlaybackPool::new(Arc::new(GatedDevice { gate }), &config);

        // One tone in the worker, one in the queue; the rest must be dropped
        let accepted = (0..10).filter(|_| pool.submit(tone())).count();
        assert!(accepted <= 2);

        let dropped = pool
            .events()
            .try_iter()
            .filter(|e| matches!(e, PlaybackEvent::Dropped { .. }))
            .count();
        assert_eq!(accepted + dropped, 10);

        for _ in 0..accepted {
            release.send(()).unwrap();
        }
        pool.shutdown();
    }

    #[test]
    fn test_submit_after_shutdown_is_rejected() {
        let mut pool = PlaybackPool::new(
            Arc::new(CaptureDevice::default()),
            &PlaybackConfig::default(),
        );
        pool.shutdown();
        assert!(!pool.submit(tone()));
    }
}
