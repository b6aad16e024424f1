use alloc::vec::Vec;

use embedded_graphics::{draw_target::DrawTarget, pixelcolor::Rgb888, prelude::*};

use crate::color_map::color_index;
use crate::downsample::slot_bin_indices;
use crate::layout::LayoutEngine;
use crate::sample::{FrequencySample, VisualSlot};
use crate::settings::VisualizerSettings;

/// Maps one sample to the frame's slot sequence: downsample to `bar_count`
/// representative bins, then attach a palette index to each magnitude.
pub fn build_slots(sample: &FrequencySample, settings: &VisualizerSettings) -> Vec<VisualSlot> {
    let palette_len = settings.palette().len();
    slot_bin_indices(sample.len(), settings.bar_count())
        .into_iter()
        .enumerate()
        .map(|(index, bin)| {
            let magnitude = sample.magnitude_clamped(bin);
            VisualSlot {
                index,
                magnitude,
                color_index: color_index(magnitude, palette_len),
            }
        })
        .collect()
}

/// Clears the whole target, then renders the slot sequence in the active
/// style. Every frame is a full redraw; nothing survives from the previous
/// style or sample.
pub fn draw_frame<D: DrawTarget<Color = Rgb888>>(
    target: &mut D,
    slots: &[VisualSlot],
    peaks: &[f32],
    settings: &VisualizerSettings,
) -> Result<(), D::Error> {
    target.clear(Rgb888::BLACK)?;
    LayoutEngine::render(settings.dancing_style(), target, slots, peaks, settings)
}

/// One stateless sample-to-pixels pass, without the peak overlay.
pub fn render_frame<D: DrawTarget<Color = Rgb888>>(
    target: &mut D,
    sample: &FrequencySample,
    settings: &VisualizerSettings,
) -> Result<(), D::Error> {
    let slots = build_slots(sample, settings);
    draw_frame(target, &slots, &[], settings)
}
