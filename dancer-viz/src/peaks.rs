use alloc::{vec, vec::Vec};

use crate::sample::VisualSlot;

/// Per-slot peak indicator state for the bars overlay.
///
/// A peak jumps up to any magnitude that exceeds it, holds for
/// `hold_frames`, then falls by `fall_speed` magnitude units per frame until
/// the live value catches it again. Slot count changes (bar count or style
/// edits) reset the state so no stale caps linger.
#[derive(Debug, Default)]
pub struct PeakTracker {
    peaks: Vec<f32>,
    hold_left: Vec<f32>,
}

impl PeakTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn peaks(&self) -> &[f32] {
        &self.peaks
    }

    pub fn update(&mut self, slots: &[VisualSlot], hold_frames: f32, fall_speed: f32) {
        if self.peaks.len() != slots.len() {
            self.peaks = vec![0.0; slots.len()];
            self.hold_left = vec![0.0; slots.len()];
        }
        for slot in slots {
            let magnitude = slot.magnitude as f32;
            let i = slot.index;
            if magnitude >= self.peaks[i] {
                self.peaks[i] = magnitude;
                self.hold_left[i] = hold_frames;
            } else if self.hold_left[i] > 0.0 {
                self.hold_left[i] -= 1.0;
            } else {
                self.peaks[i] = (self.peaks[i] - fall_speed).max(magnitude).max(0.0);
            }
        }
    }

    pub fn reset(&mut self) {
        self.peaks.clear();
        self.hold_left.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(index: usize, magnitude: u8) -> VisualSlot {
        VisualSlot {
            index,
            magnitude,
            color_index: 0,
        }
    }

    #[test]
    fn peak_rises_instantly() {
        let mut tracker = PeakTracker::new();
        tracker.update(&[slot(0, 200)], 3.0, 5.0);
        assert_eq!(tracker.peaks(), &[200.0]);
    }

    #[test]
    fn peak_holds_then_falls() {
        let mut tracker = PeakTracker::new();
        tracker.update(&[slot(0, 200)], 2.0, 10.0);

        // Two hold frames at the peak.
        tracker.update(&[slot(0, 0)], 2.0, 10.0);
        assert_eq!(tracker.peaks(), &[200.0]);
        tracker.update(&[slot(0, 0)], 2.0, 10.0);
        assert_eq!(tracker.peaks(), &[200.0]);

        // Then the fall starts.
        tracker.update(&[slot(0, 0)], 2.0, 10.0);
        assert_eq!(tracker.peaks(), &[190.0]);
        tracker.update(&[slot(0, 0)], 2.0, 10.0);
        assert_eq!(tracker.peaks(), &[180.0]);
    }

    #[test]
    fn fall_stops_at_live_magnitude() {
        let mut tracker = PeakTracker::new();
        tracker.update(&[slot(0, 100)], 0.0, 255.0);
        tracker.update(&[slot(0, 90)], 0.0, 255.0);
        assert_eq!(tracker.peaks(), &[90.0]);
    }

    #[test]
    fn slot_count_change_resets_state() {
        let mut tracker = PeakTracker::new();
        tracker.update(&[slot(0, 255), slot(1, 255)], 10.0, 1.0);
        tracker.update(&[slot(0, 10)], 10.0, 1.0);
        assert_eq!(tracker.peaks(), &[10.0]);
    }
}
