use std::path::Path;
use std::sync::Arc;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use thiserror::Error;

use crate::analyser::{AnalyserSource, SpectrumAnalyser};
use crate::wav::FileFeed;

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("microphone permission denied")]
    PermissionDenied,
    #[error("no audio input device available")]
    DeviceUnavailable,
    #[error("audio stream error: {0}")]
    Stream(String),
    #[error("failed to read `{path}`: {source}")]
    File {
        path: String,
        source: hound::Error,
    },
}

enum SourceHandle {
    // The stream is the resource; dropping it closes the device.
    Microphone(cpal::Stream),
    File(FileFeed),
}

/// Exclusive owner of the audio graph: one analyser, at most one connected
/// source. Connecting a new source always releases the previous one first,
/// and disconnect/teardown are idempotent on every exit path.
pub struct AudioSession {
    analyser: Arc<SpectrumAnalyser>,
    source: Option<SourceHandle>,
}

impl AudioSession {
    pub fn new() -> Self {
        Self {
            analyser: Arc::new(SpectrumAnalyser::new()),
            source: None,
        }
    }

    /// Sampler handle for the render loop. Valid across reconnects.
    pub fn sampler(&self) -> AnalyserSource {
        AnalyserSource::new(Arc::clone(&self.analyser))
    }

    pub fn is_connected(&self) -> bool {
        self.source.is_some()
    }

    /// Opens the default input device and feeds it into the analyser.
    pub fn connect_microphone(&mut self) -> Result<(), AudioError> {
        self.disconnect();

        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or(AudioError::DeviceUnavailable)?;
        let config = device.default_input_config().map_err(|e| match e {
            cpal::DefaultStreamConfigError::DeviceNotAvailable => AudioError::DeviceUnavailable,
            other => stream_error(other.to_string()),
        })?;
        let channels = config.channels() as usize;
        let sample_format = config.sample_format();
        log::info!(
            "microphone: {} ({} ch, {} Hz, {:?})",
            device.name().unwrap_or_else(|_| "unknown".into()),
            channels,
            config.sample_rate().0,
            sample_format
        );

        let analyser = Arc::clone(&self.analyser);
        let err_fn = |e| log::warn!("input stream error: {e}");
        let stream = match sample_format {
            cpal::SampleFormat::F32 => device.build_input_stream(
                &config.into(),
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    push_downmixed(&analyser, data.iter().copied(), channels);
                },
                err_fn,
                None,
            ),
            cpal::SampleFormat::I16 => device.build_input_stream(
                &config.into(),
                move |data: &[i16], _: &cpal::InputCallbackInfo| {
                    let scaled = data.iter().map(|&s| s as f32 / i16::MAX as f32);
                    push_downmixed(&analyser, scaled, channels);
                },
                err_fn,
                None,
            ),
            cpal::SampleFormat::U16 => device.build_input_stream(
                &config.into(),
                move |data: &[u16], _: &cpal::InputCallbackInfo| {
                    let scaled = data.iter().map(|&s| s as f32 / u16::MAX as f32 * 2.0 - 1.0);
                    push_downmixed(&analyser, scaled, channels);
                },
                err_fn,
                None,
            ),
            other => return Err(stream_error(format!("unsupported sample format {other}"))),
        }
        .map_err(map_build_error)?;

        stream
            .play()
            .map_err(|e| stream_error(e.to_string()))?;
        self.source = Some(SourceHandle::Microphone(stream));
        Ok(())
    }

    /// Starts feeding a WAV file into the analyser at real-time rate.
    /// Playback itself is someone else's job.
    pub fn connect_file(&mut self, path: &Path) -> Result<(), AudioError> {
        self.disconnect();
        let feed = FileFeed::spawn(path, Arc::clone(&self.analyser))?;
        self.source = Some(SourceHandle::File(feed));
        Ok(())
    }

    /// Releases the connected source, if any. Safe to call repeatedly.
    pub fn disconnect(&mut self) {
        match self.source.take() {
            Some(SourceHandle::Microphone(stream)) => {
                drop(stream);
                log::debug!("microphone disconnected");
            }
            Some(SourceHandle::File(mut feed)) => {
                feed.stop();
                log::debug!("file feed disconnected");
            }
            None => {}
        }
    }
}

impl Default for AudioSession {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for AudioSession {
    fn drop(&mut self) {
        self.disconnect();
    }
}

/// Averages interleaved channels down to mono and hands the chunk to the
/// analyser in one push.
fn push_downmixed<I: Iterator<Item = f32>>(
    analyser: &SpectrumAnalyser,
    samples: I,
    channels: usize,
) {
    let channels = channels.max(1);
    let mut mono = Vec::new();
    let mut acc = 0.0f32;
    let mut n = 0usize;
    for s in samples {
        acc += s;
        n += 1;
        if n == channels {
            mono.push(acc / channels as f32);
            acc = 0.0;
            n = 0;
        }
    }
    analyser.push_samples(&mono);
}

fn map_build_error(e: cpal::BuildStreamError) -> AudioError {
    match e {
        cpal::BuildStreamError::DeviceNotAvailable => AudioError::DeviceUnavailable,
        other => {
            let msg = other.to_string();
            if msg.to_ascii_lowercase().contains("permission") {
                AudioError::PermissionDenied
            } else {
                stream_error(msg)
            }
        }
    }
}

fn stream_error(msg: String) -> AudioError {
    AudioError::Stream(msg)
}
