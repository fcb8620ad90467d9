use anyhow::bail;
use std::{
    thread,
    time::{Duration, Instant},
};

/// Holds frames back to a fixed rate, deadline-based so sleep jitter doesn't
/// accumulate. The schedule starts at the first frame, not at construction.
pub struct Pacer {
    period: Duration,
    deadline: Option<Instant>,
}

impl Pacer {
    pub fn new(framerate: f32) -> anyhow::Result<Self> {
        if !framerate.is_finite() || framerate <= 0.0 {
            bail!("framerate must be a positive number, got {framerate}");
        }

        Ok(Self {
            period: Duration::from_secs_f64(1.0 / f64::from(framerate)),
            deadline: None,
        })
    }

    /// Blocks until the next frame is due.
    ///
    /// Returns how many whole frame periods the caller was behind schedule.
    /// Those slots are dropped instead of being caught up in a burst.
    pub fn wait(&mut self) -> u32 {
        let (sleep, behind) = self.schedule(Instant::now());
        if !sleep.is_zero() {
            thread::sleep(sleep);
        }
        behind
    }

    fn schedule(&mut self, now: Instant) -> (Duration, u32) {
        let deadline = *self.deadline.get_or_insert(now);

        let (sleep, behind) = match deadline.checked_duration_since(now) {
            Some(remaining) => (remaining, 0),
            None => {
                let late_by = now - deadline;
                let behind = late_by.as_nanos() / self.period.as_nanos().max(1);
                (Duration::ZERO, u32::try_from(behind).unwrap_or(u32::MAX))
            }
        };

        self.deadline = Some(deadline + self.period.saturating_mul(behind.saturating_add(1)));
        (sleep, behind)
    }
}
