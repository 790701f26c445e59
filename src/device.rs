//! System audio output through cpal

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, StreamConfig, SupportedStreamConfig};
use futures::future::{self, FutureExt, LocalBoxFuture};
use rtrb::{Consumer, RingBuffer};
use tracing::{debug, error, warn};

use crate::context::Backend;
use crate::engine::Engine;
use crate::error::EngineError;
use crate::nodes::Destination;

/// Plays the engine's output ring buffer on a cpal device.
///
/// The stream is built on the first resume and paused on suspend.
pub struct CpalBackend {
    device: cpal::Device,
    config: SupportedStreamConfig,
    consumer: Option<Consumer<f32>>,
    stream: Option<cpal::Stream>,
}

impl CpalBackend {
    pub fn new(device: cpal::Device, config: SupportedStreamConfig, consumer: Consumer<f32>) -> Self {
        Self {
            device,
            config,
            consumer: Some(consumer),
            stream: None,
        }
    }

    fn play(&mut self) -> Result<(), EngineError> {
        if self.stream.is_none() {
            let consumer = self
                .consumer
                .take()
                .ok_or_else(|| EngineError::Resume("output buffer already consumed".into()))?;
            let stream = build_stream(&self.device, self.config.sample_format(), &self.config.config(), consumer)
                .map_err(|e| EngineError::Resume(e.to_string()))?;
            self.stream = Some(stream);
        }

        match &self.stream {
            Some(stream) => stream.play().map_err(|e| EngineError::Resume(e.to_string())),
            None => Ok(()),
        }
    }
}

impl Backend for CpalBackend {
    fn resume(&mut self) -> LocalBoxFuture<'static, Result<(), EngineError>> {
        future::ready(self.play()).boxed_local()
    }

    fn suspend(&mut self) {
        if let Some(stream) = &self.stream {
            if let Err(e) = stream.pause() {
                warn!(error = %e, "failed to pause output stream");
            }
        }
    }
}

impl Engine {
    /// Create an engine that plays on the default output device
    pub fn default_output() -> Option<Self> {
        let host = cpal::default_host();
        let device = host.default_output_device()?;
        let config = device.default_output_config().ok()?;

        let sample_rate = config.sample_rate().0;
        let channels = config.channels() as usize;
        debug!(
            device = %device.name().unwrap_or_else(|_| "Unknown".into()),
            sample_rate,
            channels,
            "opening default output"
        );

        // Ring buffer sized for ~100ms of audio to handle scheduling jitter
        let buffer_samples = ((sample_rate as f32 * 0.1) as usize) * channels;
        let buffer_size = buffer_samples.next_power_of_two().max(8192);
        let (producer, consumer) = RingBuffer::<f32>::new(buffer_size);

        let backend = CpalBackend::new(device, config, consumer);
        Some(Self::new(sample_rate, Destination::new(producer, channels)).with_backend(backend))
    }
}

fn build_stream(
    device: &cpal::Device,
    sample_format: SampleFormat,
    stream_config: &StreamConfig,
    mut consumer: Consumer<f32>,
) -> Result<cpal::Stream, cpal::BuildStreamError> {
    let on_error = |err: cpal::StreamError| error!(error = %err, "output stream error");

    match sample_format {
        SampleFormat::F32 => device.build_output_stream(
            stream_config,
            move |data: &mut [f32], _| {
                for sample in data.iter_mut() {
                    *sample = consumer.pop().unwrap_or(0.0);
                }
            },
            on_error,
            None,
        ),
        SampleFormat::I16 => device.build_output_stream(
            stream_config,
            move |data: &mut [i16], _| {
                for sample in data.iter_mut() {
                    let s = consumer.pop().unwrap_or(0.0);
                    *sample = (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
                }
            },
            on_error,
            None,
        ),
        SampleFormat::U16 => device.build_output_stream(
            stream_config,
            move |data: &mut [u16], _| {
                for sample in data.iter_mut() {
                    let s = consumer.pop().unwrap_or(0.0);
                    *sample = ((s.clamp(-1.0, 1.0) + 1.0) * 0.5 * u16::MAX as f32) as u16;
                }
            },
            on_error,
            None,
        ),
        _ => Err(cpal::BuildStreamError::StreamConfigNotSupported),
    }
}
