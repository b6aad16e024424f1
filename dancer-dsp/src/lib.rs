//! Audio acquisition for the visualizer: a byte-magnitude spectrum analyser
//! fed by either a cpal microphone stream or a WAV file feed, behind an
//! `AudioSession` that owns the connected source exclusively.

pub mod analyser;
pub mod session;
mod wav;

pub use analyser::{AnalyserSource, SpectrumAnalyser, BIN_COUNT, FFT_SIZE};
pub use session::{AudioError, AudioSession};
