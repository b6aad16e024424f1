use alloc::vec::Vec;

use crate::sample::FrequencySample;

/// Stride-based decimation: picks `count` representative bin indices out of a
/// sample of length `len`.
///
/// `stride = floor(len / count)`, slot `i` samples `min(i * stride, len - 1)`.
/// No averaging or interpolation; aliasing for small `len` or large `count`
/// is expected. When `count > len` the stride degenerates to zero and every
/// slot repeats bin 0.
pub fn slot_bin_indices(len: usize, count: usize) -> Vec<usize> {
    if count == 0 {
        return Vec::new();
    }
    let stride = len / count;
    let last = len.saturating_sub(1);
    (0..count).map(|i| (i * stride).min(last)).collect()
}

/// Reduces a full sample to `count` representative magnitudes.
pub fn downsample(sample: &FrequencySample, count: usize) -> Vec<u8> {
    slot_bin_indices(sample.len(), count)
        .into_iter()
        .map(|bin| sample.magnitude_clamped(bin))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn returns_exactly_count_indices_in_range() {
        for &(len, count) in &[(1024usize, 64usize), (100, 7), (16, 16), (5, 3)] {
            let indices = slot_bin_indices(len, count);
            assert_eq!(indices.len(), count);
            assert!(indices.iter().all(|&i| i < len));
        }
    }

    #[test]
    fn stride_matches_reference_scenario() {
        // 1024 bins, 4 slots: stride 256 -> indices 0, 256, 512, 768.
        assert_eq!(slot_bin_indices(1024, 4), vec![0, 256, 512, 768]);
    }

    #[test]
    fn degenerate_count_exceeding_length() {
        let indices = slot_bin_indices(3, 8);
        assert_eq!(indices.len(), 8);
        assert!(indices.iter().all(|&i| i == 0));
    }

    #[test]
    fn empty_sample_does_not_panic() {
        let sample = FrequencySample::new(vec![]);
        let values = downsample(&sample, 4);
        assert_eq!(values, vec![0, 0, 0, 0]);
    }

    #[test]
    fn downsample_picks_strided_values() {
        let mut bins = vec![0u8; 1024];
        bins[0] = 0;
        bins[256] = 128;
        bins[512] = 255;
        bins[768] = 64;
        let sample = FrequencySample::new(bins);
        assert_eq!(downsample(&sample, 4), vec![0, 128, 255, 64]);
    }
}
