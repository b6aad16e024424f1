use embedded_graphics::{draw_target::DrawTarget, pixelcolor::Rgb888, prelude::*};

use crate::frame::{build_slots, draw_frame};
use crate::peaks::PeakTracker;
use crate::sample::SpectrumSource;
use crate::settings::{DancingStyle, VisualizerSettings};

/// The two scheduling operations the loop needs from its host: arm the next
/// display-refresh tick and drop the pending one.
pub trait TickScheduler {
    fn schedule_next(&mut self);
    fn cancel_pending(&mut self);
    fn has_pending(&self) -> bool;
}

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Loop not running or no source connected; nothing drawn.
    Idle,
    /// Source had no data yet; frame skipped, next tick still scheduled.
    Skipped,
    /// A full sample-map-draw cycle completed.
    Drawn,
}

/// Drives the per-frame cycle: pull one sample, map it to slots, draw, then
/// reschedule. The loop only runs once a source is connected via `start`,
/// and `stop` both halts it and invalidates the pending tick. Stopping twice
/// is fine.
pub struct RenderLoop<S: SpectrumSource, T: TickScheduler> {
    source: Option<S>,
    scheduler: T,
    peaks: PeakTracker,
    running: bool,
    frames_drawn: u64,
}

impl<S: SpectrumSource, T: TickScheduler> RenderLoop<S, T> {
    pub fn new(scheduler: T) -> Self {
        Self {
            source: None,
            scheduler,
            peaks: PeakTracker::new(),
            running: false,
            frames_drawn: 0,
        }
    }

    /// Connects a source and starts the loop. Any previously connected
    /// source is dropped first; there is never more than one.
    pub fn start(&mut self, source: S) {
        self.source = Some(source);
        self.peaks.reset();
        self.running = true;
        self.scheduler.schedule_next();
        log::debug!("render loop started");
    }

    /// Idempotent: cancels the pending tick and halts. Safe to call when the
    /// loop never ran.
    pub fn stop(&mut self) {
        self.scheduler.cancel_pending();
        if self.running {
            log::debug!("render loop stopped after {} frames", self.frames_drawn);
        }
        self.running = false;
    }

    /// Stops the loop and hands the source back to the caller.
    pub fn disconnect_source(&mut self) -> Option<S> {
        self.stop();
        self.source.take()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn frames_drawn(&self) -> u64 {
        self.frames_drawn
    }

    pub fn scheduler_mut(&mut self) -> &mut T {
        &mut self.scheduler
    }

    /// One tick: pull the latest sample, map, draw, schedule the next tick.
    /// A source that is not ready skips the frame silently.
    pub fn tick<D: DrawTarget<Color = Rgb888>>(
        &mut self,
        settings: &VisualizerSettings,
        target: &mut D,
    ) -> Result<FrameOutcome, D::Error> {
        if !self.running {
            return Ok(FrameOutcome::Idle);
        }
        let Some(source) = self.source.as_mut() else {
            return Ok(FrameOutcome::Idle);
        };
        let Some(sample) = source.frequency_sample() else {
            self.scheduler.schedule_next();
            return Ok(FrameOutcome::Skipped);
        };

        let slots = build_slots(&sample, settings);
        self.peaks.update(
            &slots,
            settings.peak_hold_time(),
            settings.peak_fall_speed(),
        );
        let peaks = if settings.dancing_style() == DancingStyle::Bars {
            self.peaks.peaks()
        } else {
            &[]
        };
        draw_frame(target, &slots, peaks, settings)?;

        self.frames_drawn += 1;
        self.scheduler.schedule_next();
        Ok(FrameOutcome::Drawn)
    }
}

impl<S: SpectrumSource, T: TickScheduler> Drop for RenderLoop<S, T> {
    fn drop(&mut self) {
        // Teardown must not leave a dangling scheduled tick, started or not.
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::FrequencySample;
    use alloc::vec;
    use embedded_graphics::mock_display::MockDisplay;

    /// Counts the two scheduler operations instead of keeping real time.
    #[derive(Default)]
    struct CountingScheduler {
        scheduled: u32,
        cancelled: u32,
        pending: bool,
    }

    impl TickScheduler for CountingScheduler {
        fn schedule_next(&mut self) {
            self.scheduled += 1;
            self.pending = true;
        }

        fn cancel_pending(&mut self) {
            self.cancelled += 1;
            self.pending = false;
        }

        fn has_pending(&self) -> bool {
            self.pending
        }
    }

    struct FakeSource {
        samples: vec::Vec<Option<FrequencySample>>,
    }

    impl SpectrumSource for FakeSource {
        fn frequency_sample(&mut self) -> Option<FrequencySample> {
            if self.samples.is_empty() {
                None
            } else {
                self.samples.remove(0)
            }
        }
    }

    fn display() -> MockDisplay<Rgb888> {
        let mut d = MockDisplay::new();
        d.set_allow_overdraw(true);
        d.set_allow_out_of_bounds_drawing(true);
        d
    }

    fn small_settings() -> VisualizerSettings {
        let mut settings = VisualizerSettings::default();
        settings.set_bar_count(4).unwrap();
        settings.set_bar_width(2.0).unwrap();
        settings.set_bar_spacing(2.0).unwrap();
        settings
    }

    #[test]
    fn idle_until_started() {
        let mut rl: RenderLoop<FakeSource, _> = RenderLoop::new(CountingScheduler::default());
        let outcome = rl.tick(&small_settings(), &mut display()).unwrap();
        assert_eq!(outcome, FrameOutcome::Idle);
        assert_eq!(rl.scheduler_mut().scheduled, 0);
    }

    #[test]
    fn draws_and_reschedules_each_frame() {
        let source = FakeSource {
            samples: vec![
                Some(FrequencySample::new(vec![100; 64])),
                Some(FrequencySample::new(vec![200; 64])),
            ],
        };
        let mut rl = RenderLoop::new(CountingScheduler::default());
        rl.start(source);
        assert_eq!(rl.scheduler_mut().scheduled, 1);

        assert_eq!(
            rl.tick(&small_settings(), &mut display()).unwrap(),
            FrameOutcome::Drawn
        );
        assert_eq!(
            rl.tick(&small_settings(), &mut display()).unwrap(),
            FrameOutcome::Drawn
        );
        assert_eq!(rl.frames_drawn(), 2);
        assert_eq!(rl.scheduler_mut().scheduled, 3);
    }

    #[test]
    fn not_ready_source_skips_frame_but_keeps_ticking() {
        let source = FakeSource { samples: vec![None] };
        let mut rl = RenderLoop::new(CountingScheduler::default());
        rl.start(source);
        assert_eq!(
            rl.tick(&small_settings(), &mut display()).unwrap(),
            FrameOutcome::Skipped
        );
        assert_eq!(rl.frames_drawn(), 0);
        assert!(rl.scheduler_mut().has_pending());
    }

    #[test]
    fn stop_is_idempotent_and_cancels_pending() {
        let source = FakeSource { samples: vec![] };
        let mut rl = RenderLoop::new(CountingScheduler::default());
        rl.start(source);
        assert!(rl.scheduler_mut().has_pending());

        rl.stop();
        assert!(!rl.is_running());
        assert!(!rl.scheduler_mut().has_pending());
        rl.stop();
        rl.stop();
        assert!(!rl.is_running());

        let outcome = rl.tick(&small_settings(), &mut display()).unwrap();
        assert_eq!(outcome, FrameOutcome::Idle);
    }

    #[test]
    fn stop_without_start_is_safe() {
        let mut rl: RenderLoop<FakeSource, _> = RenderLoop::new(CountingScheduler::default());
        rl.stop();
        rl.stop();
        assert!(!rl.is_running());
    }

    #[test]
    fn disconnect_returns_source_and_halts() {
        let source = FakeSource {
            samples: vec![Some(FrequencySample::new(vec![1; 8]))],
        };
        let mut rl = RenderLoop::new(CountingScheduler::default());
        rl.start(source);
        assert!(rl.disconnect_source().is_some());
        assert!(!rl.is_running());
        assert!(rl.disconnect_source().is_none());
    }

    #[test]
    fn style_switch_between_ticks_draws_cleanly() {
        let source = FakeSource {
            samples: vec![
                Some(FrequencySample::new(vec![255; 64])),
                Some(FrequencySample::new(vec![255; 64])),
                Some(FrequencySample::new(vec![255; 64])),
            ],
        };
        let mut settings = small_settings();
        let mut rl = RenderLoop::new(CountingScheduler::default());
        rl.start(source);

        let mut d = display();
        rl.tick(&settings, &mut d).unwrap();
        settings.set_dancing_style(DancingStyle::Circle);
        rl.tick(&settings, &mut d).unwrap();
        settings.set_dancing_style(DancingStyle::Spiral);
        rl.tick(&settings, &mut d).unwrap();
        assert_eq!(rl.frames_drawn(), 3);
    }
}
