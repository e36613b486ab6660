//! Monotonic millisecond timestamps.
//!
//! Uptime is carried as a `u64`, which does not wrap within any realistic
//! device lifetime. Comparisons still go through wrapping subtraction, so a
//! platform that feeds a narrower counter keeps correct interval checks
//! across a single overflow.

/// Milliseconds since boot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Millis(pub u64);

impl Millis {
    pub const ZERO: Millis = Millis(0);

    /// Milliseconds from `earlier` to `self`.
    #[inline]
    pub const fn elapsed_since(self, earlier: Millis) -> u64 {
        self.0.wrapping_sub(earlier.0)
    }

    /// True once strictly more than `interval_ms` has passed since `earlier`.
    #[inline]
    pub const fn has_elapsed(self, earlier: Millis, interval_ms: u32) -> bool {
        self.elapsed_since(earlier) > interval_ms as u64
    }

    pub const fn wrapping_add(self, ms: u64) -> Self {
        Millis(self.0.wrapping_add(ms))
    }
}

/// Fixed-rate trigger for periodic work inside a polling loop.
#[derive(Debug, Clone, Copy)]
pub struct Cadence {
    interval_ms: u32,
    last: Millis,
}

impl Cadence {
    pub const fn new(interval_ms: u32, start: Millis) -> Self {
        Self {
            interval_ms,
            last: start,
        }
    }

    /// Returns true, and re-arms, when more than the interval has passed
    /// since the last firing.
    pub fn due(&mut self, now: Millis) -> bool {
        if now.has_elapsed(self.last, self.interval_ms) {
            self.last = now;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_is_plain_difference() {
        assert_eq!(Millis(3000).elapsed_since(Millis(1000)), 2000);
        assert_eq!(Millis(5).elapsed_since(Millis(5)), 0);
    }

    #[test]
    fn elapsed_survives_wraparound() {
        let before = Millis(u64::MAX - 999);
        let after = before.wrapping_add(3000);
        assert_eq!(after, Millis(2000));
        assert_eq!(after.elapsed_since(before), 3000);
        assert!(after.has_elapsed(before, 2999));
        assert!(!after.has_elapsed(before, 3000));
    }

    #[test]
    fn no_aliasing_past_32_bit_uptime() {
        // 2^32 ms (~49.7 days) later is a long time, not "no time at all"
        let last = Millis(1000);
        let later = last.wrapping_add((1u64 << 32) + 2000);
        assert_eq!(later.elapsed_since(last), (1u64 << 32) + 2000);
        assert!(later.has_elapsed(last, 5000));
    }

    #[test]
    fn has_elapsed_is_strict() {
        assert!(!Millis(5000).has_elapsed(Millis::ZERO, 5000));
        assert!(Millis(5001).has_elapsed(Millis::ZERO, 5000));
    }

    #[test]
    fn cadence_fires_then_rearms() {
        let mut c = Cadence::new(2000, Millis::ZERO);
        assert!(!c.due(Millis(1000)));
        assert!(!c.due(Millis(2000)));
        assert!(c.due(Millis(2001)));
        assert!(!c.due(Millis(3000)));
        assert!(!c.due(Millis(4001)));
        assert!(c.due(Millis(4002)));
    }
}
