use std::sync::{Arc, Mutex};

use dancer_viz::{FrequencySample, SpectrumSource};
use rustfft::{num_complex::Complex, Fft, FftPlanner};

/// Analysis window size. Half of it is the fixed bin count every
/// `FrequencySample` carries.
pub const FFT_SIZE: usize = 2048;
pub const BIN_COUNT: usize = FFT_SIZE / 2;

// dB window mapped onto the 0..=255 byte range.
const MIN_DB: f32 = -100.0;
const MAX_DB: f32 = -30.0;

// Exponential smoothing on linear magnitudes between snapshots.
const SMOOTHING: f32 = 0.8;

const EPS: f32 = 1e-12;

struct AnalyserState {
    ring: Vec<f32>,
    smoothed: Vec<f32>,
    primed: bool,
}

/// Hann-windowed FFT analyser over the most recent `FFT_SIZE` input samples.
///
/// Sources push mono samples from their own threads; the render loop asks
/// for the latest byte spectrum once per frame. The snapshot is computed on
/// demand, so a stalled source simply keeps yielding its last spectrum.
pub struct SpectrumAnalyser {
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    window_scale: f32,
    state: Mutex<AnalyserState>,
}

impl SpectrumAnalyser {
    pub fn new() -> Self {
        let fft = FftPlanner::new().plan_fft_forward(FFT_SIZE);
        let window: Vec<f32> = (0..FFT_SIZE)
            .map(|i| {
                let phase = 2.0 * std::f32::consts::PI * i as f32 / FFT_SIZE as f32;
                0.5 * (1.0 - phase.cos())
            })
            .collect();
        // Single-sided amplitude normalization for the Hann window.
        let window_sum: f32 = window.iter().copied().sum();
        let window_scale = 2.0 / window_sum;

        Self {
            fft,
            window,
            window_scale,
            state: Mutex::new(AnalyserState {
                ring: Vec::with_capacity(FFT_SIZE),
                smoothed: vec![0.0; BIN_COUNT],
                primed: false,
            }),
        }
    }

    /// Appends mono samples, keeping only the latest `FFT_SIZE` of them.
    pub fn push_samples(&self, samples: &[f32]) {
        let mut state = match self.state.lock() {
            Ok(state) => state,
            Err(poisoned) => poisoned.into_inner(),
        };
        state.ring.extend_from_slice(samples);
        let len = state.ring.len();
        if len > FFT_SIZE {
            state.ring.drain(..len - FFT_SIZE);
        }
        if state.ring.len() == FFT_SIZE {
            state.primed = true;
        }
    }

    /// Latest spectrum as bytes, one per bin, or `None` until the first full
    /// analysis window has arrived.
    pub fn byte_frequency_data(&self) -> Option<FrequencySample> {
        let mut state = match self.state.lock() {
            Ok(state) => state,
            Err(poisoned) => poisoned.into_inner(),
        };
        if !state.primed {
            return None;
        }

        let mut buf: Vec<Complex<f32>> = state
            .ring
            .iter()
            .zip(&self.window)
            .map(|(&s, &w)| Complex::new(s * w, 0.0))
            .collect();
        buf.resize(FFT_SIZE, Complex::new(0.0, 0.0));
        self.fft.process(&mut buf);

        let mut bytes = Vec::with_capacity(BIN_COUNT);
        for (i, c) in buf.iter().take(BIN_COUNT).enumerate() {
            let magnitude = c.norm() * self.window_scale;
            let smoothed = SMOOTHING * state.smoothed[i] + (1.0 - SMOOTHING) * magnitude;
            state.smoothed[i] = smoothed;
            bytes.push(magnitude_to_byte(smoothed));
        }
        Some(FrequencySample::new(bytes))
    }
}

impl Default for SpectrumAnalyser {
    fn default() -> Self {
        Self::new()
    }
}

/// Maps a linear amplitude onto the [`MIN_DB`, `MAX_DB`] window, then onto
/// 0..=255. Silence lands on 0, anything at or above the ceiling on 255.
fn magnitude_to_byte(magnitude: f32) -> u8 {
    let db = 20.0 * magnitude.max(EPS).log10();
    let x = ((db - MIN_DB) / (MAX_DB - MIN_DB)).clamp(0.0, 1.0);
    (x * 255.0).round() as u8
}

/// The sampler handle the render loop consumes. Cheap to clone; all clones
/// read the same analyser.
#[derive(Clone)]
pub struct AnalyserSource(Arc<SpectrumAnalyser>);

impl AnalyserSource {
    pub fn new(analyser: Arc<SpectrumAnalyser>) -> Self {
        Self(analyser)
    }
}

impl SpectrumSource for AnalyserSource {
    fn frequency_sample(&mut self) -> Option<FrequencySample> {
        self.0.byte_frequency_data()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_ready_before_first_full_window() {
        let analyser = SpectrumAnalyser::new();
        assert!(analyser.byte_frequency_data().is_none());
        analyser.push_samples(&vec![0.0; FFT_SIZE / 2]);
        assert!(analyser.byte_frequency_data().is_none());
    }

    #[test]
    fn silence_maps_to_zero_bytes() {
        let analyser = SpectrumAnalyser::new();
        analyser.push_samples(&vec![0.0; FFT_SIZE]);
        let sample = analyser.byte_frequency_data().unwrap();
        assert_eq!(sample.len(), BIN_COUNT);
        assert!(sample.bins().iter().all(|&b| b == 0));
    }

    #[test]
    fn byte_mapping_endpoints() {
        assert_eq!(magnitude_to_byte(0.0), 0);
        // -30 dB amplitude and louder saturate the byte range.
        assert_eq!(magnitude_to_byte(0.0317), 255);
        assert_eq!(magnitude_to_byte(1.0), 255);
    }

    #[test]
    fn sine_concentrates_energy_in_its_bin() {
        let analyser = SpectrumAnalyser::new();
        let bin = 100usize;
        // Bin-aligned frequency: exactly `bin` cycles per window. Quiet
        // enough (-40 dB) that neighbouring bins stay below the byte ceiling.
        let samples: Vec<f32> = (0..FFT_SIZE)
            .map(|i| {
                (2.0 * std::f32::consts::PI * bin as f32 * i as f32 / FFT_SIZE as f32).sin() * 0.01
            })
            .collect();
        // Push repeatedly so the smoothing converges toward the live value.
        let mut sample = analyser.byte_frequency_data();
        for _ in 0..32 {
            analyser.push_samples(&samples);
            sample = analyser.byte_frequency_data();
        }
        let sample = sample.unwrap();
        let loudest = sample
            .bins()
            .iter()
            .enumerate()
            .max_by_key(|(_, &b)| b)
            .map(|(i, _)| i)
            .unwrap();
        assert_eq!(loudest, bin);
        assert!(sample.bins()[bin] > 200);
    }
}
