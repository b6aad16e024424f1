use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::analyser::SpectrumAnalyser;
use crate::session::AudioError;

// Mono frames pushed per pacing step.
const CHUNK_FRAMES: usize = 1024;

/// Background feeder that pushes a decoded WAV file into the analyser at
/// real-time rate. The file is decoded up front; the thread only paces.
pub struct FileFeed {
    stop: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
}

impl FileFeed {
    pub fn spawn(path: &Path, analyser: Arc<SpectrumAnalyser>) -> Result<Self, AudioError> {
        let (samples, sample_rate) = decode_mono(path)?;
        log::info!(
            "file feed: {} ({} samples @ {} Hz)",
            path.display(),
            samples.len(),
            sample_rate
        );

        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);
        let chunk_period = Duration::from_secs_f64(CHUNK_FRAMES as f64 / sample_rate as f64);

        let handle = thread::spawn(move || {
            for chunk in samples.chunks(CHUNK_FRAMES) {
                if stop_flag.load(Ordering::Relaxed) {
                    return;
                }
                analyser.push_samples(chunk);
                thread::sleep(chunk_period);
            }
            // End of file: the analyser keeps its last spectrum; the session
            // treats this as the normal idle state.
            log::debug!("file feed finished");
        });

        Ok(Self {
            stop,
            handle: Some(handle),
        })
    }

    /// Stops the feeder and waits for the thread to exit. Idempotent.
    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for FileFeed {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Decodes a WAV file to mono f32 samples in [-1, 1].
fn decode_mono(path: &Path) -> Result<(Vec<f32>, u32), AudioError> {
    let file_err = |source| AudioError::File {
        path: path.display().to_string(),
        source,
    };
    let mut reader = hound::WavReader::open(path).map_err(file_err)?;
    let spec = reader.spec();
    let channels = spec.channels.max(1) as usize;

    let interleaved: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<_, _>>()
            .map_err(file_err)?,
        hound::SampleFormat::Int => {
            let scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<Result<_, _>>()
                .map_err(file_err)?
        }
    };

    let mono = interleaved
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect();
    Ok((mono, spec.sample_rate))
}
