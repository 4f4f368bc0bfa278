//! Rate limiting for human-readable diagnostics.

/// Allows one event per interval.
///
/// Time is supplied by the caller as monotonic milliseconds, so the throttle
/// works on any clock (embassy `Instant`, host `Instant`, test counters).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LogThrottle {
    interval_ms: u64,
    last_ms: Option<u64>,
}

impl LogThrottle {
    #[must_use]
    pub const fn new(interval_ms: u64) -> Self {
        Self {
            interval_ms,
            last_ms: None,
        }
    }

    /// Returns true if an event may be emitted at `now_ms`, and records it.
    ///
    /// The first call always passes. A clock that goes backwards is treated
    /// as no time elapsed.
    pub fn ready(&mut self, now_ms: u64) -> bool {
        let due = match self.last_ms {
            None => true,
            Some(last) => now_ms.saturating_sub(last) >= self.interval_ms,
        };
        if due {
            self.last_ms = Some(now_ms);
        }
        due
    }

    #[must_use]
    pub const fn interval_ms(&self) -> u64 {
        self.interval_ms
    }
}
