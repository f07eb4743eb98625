// Audio engine - CPAL device acquisition and the realtime callback
//
// The engine is a UI-side handle. Nothing touches the sound card until the
// first `start()`: that call acquires the default output device, builds the
// stream whose callback owns the composer, and leaves the stream open for the
// life of the process. Later `start()`/`stop()` calls only travel the command
// ring. A failed acquisition retains nothing, so the next `start()` retries
// from scratch.
//
// Sample formats: processing is f32 throughout; the device's preferred format
// (F32, I16 or U16) is detected via `sample_format()` and conversion happens
// at the moment each frame is written, through CPAL's `FromSample` trait.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, FromSample, Sample, SampleFormat, SizedSample, Stream, StreamConfig};
use ringbuf::traits::Producer;
use std::sync::{Arc, Mutex};
use thiserror::Error;

use crate::audio::parameters::AtomicF32;
use crate::composer::AmbientComposer;
use crate::messaging::channels::{CommandConsumer, CommandProducer, NotificationProducer};
use crate::messaging::command::Command;
use crate::messaging::notification::{Notification, NotificationCategory};

/// Master volume default, in dB
pub const DEFAULT_VOLUME_DB: f32 = -6.0;

/// Mono scratch size; callbacks larger than this render in chunks
const SCRATCH_FRAMES: usize = 4096;

/// Everything that can go wrong while bringing the output stream up
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("no audio output device available")]
    NoOutputDevice,

    #[error("could not query the output configuration: {0}")]
    ConfigQuery(#[from] cpal::DefaultStreamConfigError),

    #[error("unsupported sample format {0:?} (supported: F32, I16, U16)")]
    UnsupportedFormat(SampleFormat),

    #[error("could not build the output stream: {0}")]
    StreamBuild(#[from] cpal::BuildStreamError),

    #[error("could not start the output stream: {0}")]
    StreamPlay(#[from] cpal::PlayStreamError),
}

/// The live side of the engine, retained only after a successful start
struct StreamRuntime {
    _device: Device,
    _stream: Stream,
    sample_rate: f32,
}

/// UI-side handle over the audio thread
pub struct AudioEngine {
    command_tx: CommandProducer,
    command_rx: Arc<Mutex<CommandConsumer>>,
    notification_tx: Arc<Mutex<NotificationProducer>>,
    volume_db: AtomicF32,
    runtime: Option<StreamRuntime>,
}

impl AudioEngine {
    /// Wrap the channel ends; the device itself is acquired lazily
    pub fn new(
        command_tx: CommandProducer,
        command_rx: CommandConsumer,
        notification_tx: Arc<Mutex<NotificationProducer>>,
    ) -> Self {
        Self {
            command_tx,
            command_rx: Arc::new(Mutex::new(command_rx)),
            notification_tx,
            volume_db: AtomicF32::new(DEFAULT_VOLUME_DB),
            runtime: None,
        }
    }

    /// Bring the stream up if needed, then ask the callback to start
    pub fn start(&mut self) -> Result<(), AudioError> {
        self.ensure_runtime()?;
        if self.command_tx.try_push(Command::Start).is_err() {
            eprintln!("Command ring full, dropping Start");
        }
        Ok(())
    }

    /// Ask the callback to stop the clock. No-op before the first start.
    pub fn stop(&mut self) {
        if self.runtime.is_some() && self.command_tx.try_push(Command::Stop).is_err() {
            eprintln!("Command ring full, dropping Stop");
        }
    }

    /// Master volume in dB, latched immediately even while offline
    pub fn set_volume_db(&self, db: f32) {
        self.volume_db.set(db);
    }

    pub fn volume_db(&self) -> f32 {
        self.volume_db.get()
    }

    /// Check if the output stream is up
    pub fn is_online(&self) -> bool {
        self.runtime.is_some()
    }

    /// Sample rate of the open stream, if any
    pub fn sample_rate(&self) -> Option<f32> {
        self.runtime.as_ref().map(|r| r.sample_rate)
    }

    fn ensure_runtime(&mut self) -> Result<(), AudioError> {
        if self.runtime.is_some() {
            return Ok(());
        }

        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(AudioError::NoOutputDevice)?;
        println!(
            "Audio device: {}",
            device.name().unwrap_or("Unknown".to_string())
        );

        let supported_config = device.default_output_config()?;
        let sample_format = supported_config.sample_format();
        let sample_rate = supported_config.sample_rate().0 as f32;
        let channels = supported_config.channels() as usize;
        println!("Audio config: {:?}", supported_config);

        let config: StreamConfig = supported_config.into();

        // The composer is rebuilt on every attempt; only a running stream
        // keeps one alive
        let composer = AmbientComposer::new(sample_rate, self.volume_db.clone());
        let command_rx = Arc::clone(&self.command_rx);
        let notification_tx = Arc::clone(&self.notification_tx);

        let stream = match sample_format {
            SampleFormat::F32 => Self::build_stream::<f32>(
                &device,
                &config,
                channels,
                composer,
                command_rx,
                notification_tx,
            ),
            SampleFormat::I16 => Self::build_stream::<i16>(
                &device,
                &config,
                channels,
                composer,
                command_rx,
                notification_tx,
            ),
            SampleFormat::U16 => Self::build_stream::<u16>(
                &device,
                &config,
                channels,
                composer,
                command_rx,
                notification_tx,
            ),
            other => return Err(AudioError::UnsupportedFormat(other)),
        }?;

        stream.play()?;
        println!("Audio engine started: {} Hz, {} channels", sample_rate, channels);

        if let Ok(mut tx) = self.notification_tx.try_lock() {
            let notif = Notification::info(
                NotificationCategory::Audio,
                format!("Audio online: {} Hz", sample_rate),
            );
            let _ = ringbuf::traits::Producer::try_push(&mut *tx, notif);
        }

        self.runtime = Some(StreamRuntime {
            _device: device,
            _stream: stream,
            sample_rate,
        });
        Ok(())
    }

    /// Build an output stream for one concrete sample type
    /// The callback owns the composer; f32 is rendered into a fixed scratch
    /// and converted per frame on the way out.
    fn build_stream<T>(
        device: &Device,
        config: &StreamConfig,
        channels: usize,
        mut composer: AmbientComposer,
        command_rx: Arc<Mutex<CommandConsumer>>,
        notification_tx: Arc<Mutex<NotificationProducer>>,
    ) -> Result<Stream, AudioError>
    where
        T: SizedSample + FromSample<f32> + Send + 'static,
    {
        let mut scratch = vec![0.0_f32; SCRATCH_FRAMES];
        let frame_width = channels.max(1);

        let stream = device.build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                // ========== SACRED ZONE ==========
                // No allocations, no I/O, no blocking locks

                if let Ok(mut rx) = command_rx.try_lock() {
                    while let Some(cmd) = ringbuf::traits::Consumer::try_pop(&mut *rx) {
                        match cmd {
                            Command::Start => composer.start(),
                            Command::Stop => composer.stop(),
                        }
                    }
                }

                for block in data.chunks_mut(frame_width * SCRATCH_FRAMES) {
                    let frames = block.len() / frame_width;
                    composer.render(&mut scratch[..frames]);

                    for (frame, &sample) in
                        block.chunks_mut(frame_width).zip(scratch[..frames].iter())
                    {
                        write_mono_to_interleaved_frame(sample, frame);
                    }
                }
                // ========== SACRED ZONE END ==========
            },
            move |err| {
                // Runs outside the realtime callback, I/O is fine here
                eprintln!("Audio stream error: {}", err);
                if let Ok(mut tx) = notification_tx.try_lock() {
                    let notif = Notification::error(
                        NotificationCategory::Audio,
                        format!("Audio stream error: {}", err),
                    );
                    let _ = ringbuf::traits::Producer::try_push(&mut *tx, notif);
                }
            },
            None,
        )?;

        Ok(stream)
    }
}

/// Write one mono sample across every channel of an interleaved frame
#[inline]
fn write_mono_to_interleaved_frame<T>(sample: f32, frame: &mut [T])
where
    T: Sample + FromSample<f32>,
{
    for channel_sample in frame.iter_mut() {
        *channel_sample = Sample::from_sample::<f32>(sample);
    }
}
