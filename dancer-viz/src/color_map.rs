#[allow(unused_imports)]
use micromath::F32Ext;

use crate::sample::MAGNITUDE_MAX;

/// Maps a magnitude onto a palette entry:
/// `floor(magnitude / 255 * (len - 1))`, clamped to the valid range.
///
/// Magnitude 0 always lands on index 0 and magnitude 255 on the last index.
pub fn color_index(magnitude: u8, palette_len: usize) -> usize {
    if palette_len == 0 {
        return 0;
    }
    let span = (palette_len - 1) as f32;
    let idx = (magnitude as f32 / MAGNITUDE_MAX as f32 * span).floor() as usize;
    idx.min(palette_len - 1)
}

/// Secondary color for ring and spiral outer strokes. Deliberately cyclic:
/// the last palette entry wraps back to the first.
pub fn highlight_index(color_index: usize, palette_len: usize) -> usize {
    if palette_len == 0 {
        return 0;
    }
    (color_index + 1) % palette_len
}
