use std::thread;
use std::time::{Duration, Instant};

use dancer_viz::TickScheduler;

/// Wall-clock scheduler pinned to the display refresh period. `schedule_next`
/// arms a deadline one period after the previous one (or after now, if the
/// frame overran); `cancel_pending` drops it.
pub struct FixedRateScheduler {
    period: Duration,
    deadline: Option<Instant>,
}

impl FixedRateScheduler {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            deadline: None,
        }
    }

    /// Sleeps until the armed deadline. With nothing pending (loop idle or
    /// stopped) it still paces the caller by one period so the UI loop does
    /// not spin.
    pub fn wait_for_tick(&mut self) {
        match self.deadline {
            Some(deadline) => {
                let now = Instant::now();
                if let Some(remaining) = deadline.checked_duration_since(now) {
                    thread::sleep(remaining);
                }
                // An overrunning frame just delays the next tick; nothing is
                // dropped on purpose.
            }
            None => thread::sleep(self.period),
        }
    }
}

impl TickScheduler for FixedRateScheduler {
    fn schedule_next(&mut self) {
        let now = Instant::now();
        let next = match self.deadline {
            Some(previous) if previous + self.period > now => previous + self.period,
            _ => now + self.period,
        };
        self.deadline = Some(next);
    }

    fn cancel_pending(&mut self) {
        self.deadline = None;
    }

    fn has_pending(&self) -> bool {
        self.deadline.is_some()
    }
}
