use alloc::boxed::Box;
use alloc::vec::Vec;

/// Largest magnitude the sampler produces per bin.
pub const MAGNITUDE_MAX: u8 = 255;

/// One analyser snapshot: ordered magnitudes, one byte per frequency bin.
///
/// Produced once per frame and replaced wholesale on the next tick; nothing
/// mutates a sample after it has been handed to the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencySample {
    bins: Vec<u8>,
}

impl FrequencySample {
    pub fn new(bins: Vec<u8>) -> Self {
        Self { bins }
    }

    pub fn len(&self) -> usize {
        self.bins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    pub fn bins(&self) -> &[u8] {
        &self.bins
    }

    /// Magnitude at `index`, clamped to the last valid bin so slots past the
    /// end of a short sample repeat the final value instead of panicking.
    pub fn magnitude_clamped(&self, index: usize) -> u8 {
        match self.bins.get(index) {
            Some(&m) => m,
            None => self.bins.last().copied().unwrap_or(0),
        }
    }
}

/// One of the N visual units drawn each frame, derived from one bin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisualSlot {
    pub index: usize,
    pub magnitude: u8,
    pub color_index: usize,
}

/// Sampler contract: holds the latest available frequency data and must be
/// callable every frame without blocking.
pub trait SpectrumSource {
    /// `None` means the source is not ready yet; the frame is skipped.
    fn frequency_sample(&mut self) -> Option<FrequencySample>;
}

impl<S: SpectrumSource + ?Sized> SpectrumSource for Box<S> {
    fn frequency_sample(&mut self) -> Option<FrequencySample> {
        (**self).frequency_sample()
    }
}
