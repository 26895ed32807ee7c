//! Tick timestamps and rate control.
//!
//! Every animation tick carries a monotonic timestamp in milliseconds.
//! Layers sharing one tick source use that timestamp to recognise a tick
//! they have already processed, so it must never go backwards.

/// Default interval between animation ticks.
pub const DEFAULT_FRAME_DURATION_MS: u64 = 30;

/// Tick-rate controller driven by externally supplied timestamps.
#[derive(Debug)]
pub struct RateController {
    interval_ms: u64,
    last_tick_ms: Option<u64>,
}

impl RateController {
    /// Create a controller that fires at most once per `interval_ms`.
    pub fn new(interval_ms: u64) -> Self {
        Self {
            interval_ms: interval_ms.max(1),
            last_tick_ms: None,
        }
    }

    /// Check if enough time has passed for the next tick.
    /// Returns true and updates internal state if ready.
    /// The first call always returns true.
    pub fn should_tick(&mut self, current_ms: u64) -> bool {
        match self.last_tick_ms {
            None => {
                self.last_tick_ms = Some(current_ms);
                true
            }
            Some(last) if current_ms >= last.saturating_add(self.interval_ms) => {
                self.last_tick_ms = Some(current_ms);
                true
            }
            _ => false,
        }
    }

    /// The next tick due strictly before `until_ms`, if any, advancing
    /// internal state past it. Call repeatedly to fill the gap between
    /// sparse events.
    pub fn next_tick_before(&mut self, until_ms: u64) -> Option<u64> {
        let next = self.last_tick_ms?.checked_add(self.interval_ms)?;
        if next < until_ms {
            self.last_tick_ms = Some(next);
            Some(next)
        } else {
            None
        }
    }
}
