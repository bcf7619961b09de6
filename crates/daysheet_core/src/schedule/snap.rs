//! Step quantization for user-supplied times.

use crate::model::time::{TimeOfDay, MINUTES_PER_DAY};

/// Rounds times to the schedule step and clamps them to one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snapper {
    step_minutes: u32,
}

impl Snapper {
    /// Creates a snapper for a non-zero step.
    ///
    /// A zero step is treated as one minute so snapping stays total.
    pub fn new(step_minutes: u32) -> Self {
        Self {
            step_minutes: step_minutes.max(1),
        }
    }

    pub fn step_minutes(&self) -> u32 {
        self.step_minutes
    }

    /// Rounds `time` to the nearest step multiple and clamps to `[00:00, 24:00]`.
    ///
    /// Ties go to the even multiple, so with a 30 minute step 00:15 snaps
    /// down to 00:00 while 00:45 snaps up to 01:00.
    pub fn snap(&self, time: TimeOfDay) -> TimeOfDay {
        let step = self.step_minutes;
        let minutes = time.minutes();
        let quotient = minutes / step;
        let remainder = minutes % step;

        let rounded = match remainder.cmp(&(step - remainder)) {
            std::cmp::Ordering::Less => quotient,
            std::cmp::Ordering::Greater => quotient + 1,
            std::cmp::Ordering::Equal => quotient + (quotient % 2),
        };

        let snapped = rounded.saturating_mul(step).min(MINUTES_PER_DAY);
        TimeOfDay::from_minutes(snapped)
    }

    /// Step-aligned candidate times over `[00:00, 24:00)` for pickers.
    pub fn time_options(&self) -> Vec<TimeOfDay> {
        (0..MINUTES_PER_DAY)
            .step_by(self.step_minutes as usize)
            .map(TimeOfDay::from_minutes)
            .collect()
    }
}
