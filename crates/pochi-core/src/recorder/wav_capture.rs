use crate::{CoreResult, PochiError, recorder::CaptureBackend};

use std::{
    fs::File,
    io::BufWriter,
    panic::Location,
    path::{Path, PathBuf},
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicU32, Ordering},
        mpsc,
    },
    thread::{self, JoinHandle},
};

use cpal::{
    Device, Stream, StreamConfig,
    traits::{DeviceTrait, HostTrait, StreamTrait},
};
use error_location::ErrorLocation;
use hound::{SampleFormat, WavSpec, WavWriter};
use tracing::{debug, error, info, instrument};

/// Records the default input device to 32-bit float WAV files.
///
/// The audio callback only copies samples into a channel and updates the
/// level; a dedicated writer thread owns the file.
pub struct WavCapture {
    device: Device,
    config: StreamConfig,
    stream: Option<Stream>,
    writer: Option<WriterThread>,
    /// Set before the stream is dropped so no in-flight callback sends after
    /// the writer has been told to finish.
    shutdown: Arc<AtomicBool>,
    /// Peak level as `f32` bits. Non-negative floats order like their bits.
    level: Arc<AtomicU32>,
    failed: Arc<AtomicBool>,
}

struct WriterThread {
    samples_tx: mpsc::Sender<Vec<f32>>,
    handle: JoinHandle<CoreResult<()>>,
    path: PathBuf,
}

impl WavCapture {
    /// Open the default input device.
    #[track_caller]
    #[instrument]
    pub fn new() -> CoreResult<Self> {
        let host = cpal::default_host();

        let device = host
            .default_input_device()
            .ok_or_else(|| PochiError::Capture {
                reason: "No microphone found".to_string(),
                location: ErrorLocation::from(Location::caller()),
            })?;

        let config = device
            .default_input_config()
            .map_err(|e| PochiError::Capture {
                reason: format!("Failed to get config: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        info!(
            device_id = ?device.id(),
            sample_rate = config.sample_rate(),
            channels = config.channels(),
            "WavCapture initialized"
        );

        Ok(Self {
            device,
            config: config.into(),
            stream: None,
            writer: None,
            shutdown: Arc::new(AtomicBool::new(false)),
            level: Arc::new(AtomicU32::new(0)),
            failed: Arc::new(AtomicBool::new(false)),
        })
    }

    #[track_caller]
    fn spawn_writer(&self, path: &Path) -> CoreResult<WriterThread> {
        let spec = WavSpec {
            channels: self.config.channels,
            sample_rate: self.config.sample_rate,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        };

        let mut wav = WavWriter::create(path, spec).map_err(|e| PochiError::Capture {
            reason: format!("Failed to create {}: {}", path.display(), e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let (samples_tx, samples_rx) = mpsc::channel::<Vec<f32>>();
        let failed = Arc::clone(&self.failed);
        let file_path = path.to_path_buf();

        let handle = thread::Builder::new()
            .name("pochi-wav-writer".to_string())
            .spawn(move || {
                write_samples(&mut wav, &samples_rx, &failed, &file_path)?;
                finalize(wav, &file_path)
            })
            .map_err(PochiError::from)?;

        Ok(WriterThread {
            samples_tx,
            handle,
            path: path.to_path_buf(),
        })
    }
}

impl CaptureBackend for WavCapture {
    fn extension(&self) -> &'static str {
        "wav"
    }

    #[track_caller]
    #[instrument(skip(self))]
    fn start(&mut self, path: &Path) -> CoreResult<()> {
        if self.stream.is_some() {
            return Err(PochiError::Capture {
                reason: "Capture already running".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        self.shutdown.store(false, Ordering::Release);
        self.failed.store(false, Ordering::Release);
        self.level.store(0, Ordering::Release);

        let writer = self.spawn_writer(path)?;
        let samples_tx = writer.samples_tx.clone();
        let shutdown = Arc::clone(&self.shutdown);
        let level = Arc::clone(&self.level);
        let failed = Arc::clone(&self.failed);

        let stream = self
            .device
            .build_input_stream(
                &self.config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    if shutdown.load(Ordering::Acquire) {
                        return;
                    }
                    let peak = data
                        .iter()
                        .fold(0.0f32, |acc, s| acc.max(s.abs()))
                        .min(1.0);
                    level.fetch_max(peak.to_bits(), Ordering::AcqRel);

                    let _ = samples_tx.send(data.to_vec());
                },
                move |err| {
                    error!("Audio stream error: {}", err);
                    failed.store(true, Ordering::Release);
                },
                None,
            )
            .map_err(|e| PochiError::Capture {
                reason: format!("Failed to build stream: {}", e),
                location: ErrorLocation::from(Location::caller()),
            });

        let stream = match stream {
            Ok(stream) => stream,
            Err(e) => {
                discard_writer(writer);
                return Err(e);
            }
        };

        if let Err(e) = stream.play() {
            drop(stream);
            discard_writer(writer);
            return Err(PochiError::Capture {
                reason: format!("Failed to start stream: {}", e),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        self.stream = Some(stream);
        self.writer = Some(writer);
        info!(path = ?path, "Audio capture started");

        Ok(())
    }

    #[track_caller]
    #[instrument(skip(self))]
    fn stop(&mut self) -> CoreResult<()> {
        self.shutdown.store(true, Ordering::Release);

        if let Some(stream) = self.stream.take() {
            drop(stream);
            info!("Audio capture stopped");
        }

        let Some(writer) = self.writer.take() else {
            return Ok(());
        };

        // Closing the channel ends the writer loop.
        drop(writer.samples_tx);
        match writer.handle.join() {
            Ok(result) => result,
            Err(_) => Err(PochiError::Capture {
                reason: format!("WAV writer for {} panicked", writer.path.display()),
                location: ErrorLocation::from(Location::caller()),
            }),
        }
    }

    fn take_level(&self) -> f32 {
        f32::from_bits(self.level.swap(0, Ordering::AcqRel))
    }

    fn has_failed(&self) -> bool {
        self.failed.load(Ordering::Acquire)
    }
}

impl Drop for WavCapture {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            error!(error = %e, "Failed to finalize recording on drop");
        }
    }
}

fn write_samples(
    wav: &mut WavWriter<BufWriter<File>>,
    samples_rx: &mpsc::Receiver<Vec<f32>>,
    failed: &AtomicBool,
    path: &Path,
) -> CoreResult<()> {
    let mut written: u64 = 0;
    while let Ok(chunk) = samples_rx.recv() {
        for sample in chunk {
            if let Err(e) = wav.write_sample(sample) {
                failed.store(true, Ordering::Release);
                return Err(PochiError::Capture {
                    reason: format!("Failed to write {}: {}", path.display(), e),
                    location: ErrorLocation::from(Location::caller()),
                });
            }
        }
        written += 1;
    }
    debug!(chunks = written, "WAV writer drained");
    Ok(())
}

fn finalize(wav: WavWriter<BufWriter<File>>, path: &Path) -> CoreResult<()> {
    wav.finalize().map_err(|e| PochiError::Capture {
        reason: format!("Failed to finalize {}: {}", path.display(), e),
        location: ErrorLocation::from(Location::caller()),
    })
}

/// Abandon a writer whose stream never started, removing the empty file.
fn discard_writer(writer: WriterThread) {
    drop(writer.samples_tx);
    let _ = writer.handle.join();
    let _ = std::fs::remove_file(&writer.path);
}
