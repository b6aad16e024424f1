use core::f32::consts::PI;

use dancer_viz::{FrequencySample, SpectrumSource};
#[allow(unused_imports)]
use micromath::F32Ext;

const DEMO_BINS: usize = 1024;

/// Deterministic synthetic spectrum for running without any audio hardware:
/// a slow-phased sine sweep per bin under a decaying envelope, advanced a
/// little every frame.
pub struct DemoSource {
    time: f32,
}

impl DemoSource {
    pub fn new() -> Self {
        Self { time: 0.0 }
    }
}

impl SpectrumSource for DemoSource {
    fn frequency_sample(&mut self) -> Option<FrequencySample> {
        let mut bins = Vec::with_capacity(DEMO_BINS);
        for i in 0..DEMO_BINS {
            let x = i as f32 / DEMO_BINS as f32;
            let phase = self.time + x * 4.0 * PI;
            let wave = phase.sin() * 0.5 + 0.5;
            // Louder lows, like a typical music spectrum.
            let envelope = 1.0 - x * 0.7;
            bins.push((wave * envelope * 255.0) as u8);
        }
        self.time += 0.05;
        Some(FrequencySample::new(bins))
    }
}
