use std::sync::{Arc, Mutex, PoisonError};

use cpal::{
    traits::{DeviceTrait, HostTrait, StreamTrait},
    FromSample, SampleFormat, SampleRate, SizedSample, StreamConfig, StreamError,
    SupportedStreamConfigRange,
};
use tracing::{debug, instrument, warn};

use super::{push_newest, Fetcher};
use crate::DEFAULT_SAMPLE_RATE;

/// The mono samples which the stream produced since the last fetch.
struct SampleBuffer {
    samples: Vec<f32>,
    capacity: usize,
    channels: usize,
}

impl SampleBuffer {
    /// Keeps at most one second of samples.
    pub fn new(sample_rate: SampleRate, channels: u16) -> Self {
        let capacity = sample_rate.0 as usize;

        Self {
            samples: Vec::with_capacity(capacity),
            capacity,
            channels: usize::from(channels.max(1)),
        }
    }

    /// Down-mixes the interleaved `data` to mono and appends it.
    pub fn push<T>(&mut self, data: &[T])
    where
        T: SizedSample,
        f32: FromSample<T>,
    {
        for frame in data.chunks_exact(self.channels) {
            let sum = frame.iter().map(|&s| <f32 as FromSample<T>>::from_sample_(s)).sum::<f32>();
            self.samples.push(sum / self.channels as f32);
        }

        // drop the oldest samples if nobody fetched them in time
        if self.samples.len() > self.capacity {
            let overflow = self.samples.len() - self.capacity;
            self.samples.drain(..overflow);
        }
    }

    pub fn drain_into(&mut self, buf: &mut [f32]) {
        push_newest(buf, &self.samples);
        self.samples.clear();
    }
}

/// Errors which can occur while creating [crate::fetcher::SystemAudioFetcher].
#[derive(thiserror::Error, Debug)]
pub enum SystemAudioError {
    /// No default audio device could be found to fetch from.
    #[error("Couldn't retrieve the default device")]
    NoDefaultDevice,

    /// The device doesn't list any stream configuration.
    #[error("Couldn't retrieve any config of the stream of the device.")]
    NoAvailableConfigs,

    #[error("The samples of the device have an unsupported format: {0}")]
    UnsupportedSampleFormat(SampleFormat),

    #[error(transparent)]
    SupportedConfigs(#[from] cpal::SupportedStreamConfigsError),

    #[error(transparent)]
    BuildStream(#[from] cpal::BuildStreamError),

    #[error(transparent)]
    PlayStream(#[from] cpal::PlayStreamError),
}

/// Fetcher for the audio of a [cpal::Device].
///
/// It's recommended to use [SystemAudio::default_input] or [SystemAudio::default_output] to create a new instance of this struct.
pub struct SystemAudio {
    sample_buffer: Arc<Mutex<SampleBuffer>>,
    sample_rate: SampleRate,

    _stream: cpal::Stream,
}

impl SystemAudio {
    /// This exposes the API of [cpal] which you can use to use your own [cpal::Device] and [cpal::SupportedStreamConfigRange]
    /// if you want.
    ///
    /// The device can be an input device (microphone) or an output device (its loopback gets recorded).
    ///
    /// # Args
    /// - `error_callback` will be passed to the
    ///   `error_callback` of [`cpal::traits::DeviceTrait::build_input_stream`].
    #[instrument(name = "SystemAudio::new", skip_all)]
    pub fn new<E>(
        device: &cpal::Device,
        stream_config_range: &SupportedStreamConfigRange,
        error_callback: E,
    ) -> Result<Box<Self>, SystemAudioError>
    where
        E: FnMut(StreamError) + Send + 'static,
    {
        let supported_stream_config = stream_config_range
            .try_with_sample_rate(DEFAULT_SAMPLE_RATE)
            .unwrap_or(stream_config_range.with_max_sample_rate());
        let sample_format = supported_stream_config.sample_format();
        let stream_config = supported_stream_config.config();
        let sample_rate = stream_config.sample_rate;

        debug!("Stream config: {:?} ({})", stream_config, sample_format);

        let sample_buffer = {
            let buffer = SampleBuffer::new(sample_rate, stream_config.channels);
            Arc::new(Mutex::new(buffer))
        };

        let stream = match sample_format {
            SampleFormat::F32 => {
                build_stream::<f32, E>(device, &stream_config, &sample_buffer, error_callback)
            }
            SampleFormat::I16 => {
                build_stream::<i16, E>(device, &stream_config, &sample_buffer, error_callback)
            }
            SampleFormat::U16 => {
                build_stream::<u16, E>(device, &stream_config, &sample_buffer, error_callback)
            }
            SampleFormat::I32 => {
                build_stream::<i32, E>(device, &stream_config, &sample_buffer, error_callback)
            }
            other => return Err(SystemAudioError::UnsupportedSampleFormat(other)),
        }?;
        stream.play()?;

        Ok(Box::new(Self {
            _stream: stream,
            sample_buffer,
            sample_rate,
        }))
    }

    /// Records the default input device (usually the microphone).
    pub fn default_input<E>(error_callback: E) -> Result<Box<Self>, SystemAudioError>
    where
        E: FnMut(StreamError) + Send + 'static,
    {
        let Some(device) = cpal::default_host().default_input_device() else {
            return Err(SystemAudioError::NoDefaultDevice);
        };

        let config = best_config(device.supported_input_configs()?)?;
        Self::new(&device, &config, error_callback)
    }

    /// Records what the default output device is playing.
    ///
    /// This only works with hosts which expose the loopback of an output device as input stream.
    pub fn default_output<E>(error_callback: E) -> Result<Box<Self>, SystemAudioError>
    where
        E: FnMut(StreamError) + Send + 'static,
    {
        let Some(device) = cpal::default_host().default_output_device() else {
            return Err(SystemAudioError::NoDefaultDevice);
        };

        let config = best_config(device.supported_output_configs()?)?;
        Self::new(&device, &config, error_callback)
    }
}

impl Drop for SystemAudio {
    /// Closes the audio stream before it gets dropped.
    fn drop(&mut self) {
        if let Err(err) = self._stream.pause() {
            warn!("Couldn't stop the audio stream: {}", err);
        }
    }
}

impl Fetcher for SystemAudio {
    fn fetch_samples(&mut self, buf: &mut [f32]) {
        self.sample_buffer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain_into(buf);
    }

    fn sample_rate(&self) -> SampleRate {
        self.sample_rate
    }
}

fn build_stream<T, E>(
    device: &cpal::Device,
    stream_config: &StreamConfig,
    sample_buffer: &Arc<Mutex<SampleBuffer>>,
    error_callback: E,
) -> Result<cpal::Stream, SystemAudioError>
where
    T: SizedSample,
    f32: FromSample<T>,
    E: FnMut(StreamError) + Send + 'static,
{
    let buffer = sample_buffer.clone();

    let stream = device.build_input_stream(
        stream_config,
        move |data: &[T], _: &cpal::InputCallbackInfo| {
            buffer
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(data);
        },
        error_callback,
        None,
    )?;

    Ok(stream)
}

#[instrument(skip_all)]
fn best_config(
    configs: impl Iterator<Item = SupportedStreamConfigRange>,
) -> Result<SupportedStreamConfigRange, SystemAudioError> {
    let mut matching_configs: Vec<_> = configs.collect();

    matching_configs.sort_by(|a, b| a.cmp_default_heuristics(b));
    matching_configs
        .into_iter()
        .next()
        .ok_or(SystemAudioError::NoAvailableConfigs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn downmix_to_mono() {
        let mut buffer = SampleBuffer::new(SampleRate(10), 2);
        buffer.push(&[1f32, 0., 0.5, 0.5, -1., 0.]);

        let mut buf = [0.; 3];
        buffer.drain_into(&mut buf);
        assert_eq!(buf, [0.5, 0.5, -0.5]);
    }

    #[test]
    fn integer_samples_are_normalized() {
        let mut buffer = SampleBuffer::new(SampleRate(10), 1);
        buffer.push(&[i16::MIN, 0]);

        let mut buf = [1.; 2];
        buffer.drain_into(&mut buf);
        assert_eq!(buf, [-1., 0.]);
    }

    #[test]
    fn keeps_at_most_one_second() {
        let mut buffer = SampleBuffer::new(SampleRate(4), 1);
        buffer.push(&[1f32, 2., 3., 4., 5., 6.]);

        let mut buf = [0.; 6];
        buffer.drain_into(&mut buf);
        assert_eq!(buf, [0., 0., 3., 4., 5., 6.]);
    }

    #[test]
    fn fetched_samples_are_consumed() {
        let mut buffer = SampleBuffer::new(SampleRate(10), 1);
        buffer.push(&[1f32, 2.]);

        let mut buf = [0.; 3];
        buffer.drain_into(&mut buf);
        assert_eq!(buf, [0., 1., 2.]);

        buffer.drain_into(&mut buf);
        assert_eq!(buf, [0., 1., 2.]);

        buffer.push(&[3f32]);
        buffer.drain_into(&mut buf);
        assert_eq!(buf, [1., 2., 3.]);
    }
}
