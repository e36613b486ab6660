/// Debounced, rate-limited alert state machine.
///
/// Each cycle the monitor compares one reading against the smoke threshold
/// and the time since the last alert, and reports what happened:
///
/// ```text
///            reading > threshold && interval elapsed
///   Normal ─────────────────────────────────────────> Alerting
///     ^  (Raised: send alert, stamp time)               │  reading > threshold,
///     │                                                 │  interval not elapsed
///     └────────────── reading <= threshold ─────────────┘  (Suppressed)
///                       (Cleared, once)
/// ```
///
/// The monitor never does I/O. The caller acts on the returned
/// [`Transition`] (build and broadcast the payload, log the clear notice).
use crate::clock::Millis;
use crate::sensor::Reading;

/// Whether the last evaluated condition was above threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Normal,
    Alerting,
}

/// What one evaluation decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// At or below threshold while already normal. Nothing to do.
    Idle,
    /// Above threshold and the rate limit allows it: emit one alert.
    Raised,
    /// Above threshold but an alert went out within the interval.
    Suppressed,
    /// Back at or below threshold after an alert: emit the clear notice.
    Cleared,
}

impl Transition {
    pub fn is_alert(self) -> bool {
        matches!(self, Transition::Raised)
    }
}

/// Process-wide alert bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AlertState {
    /// Set when an alert is sent, cleared on recovery
    pub alert_active: bool,
    /// Time of the most recent alert. `None` until the first one, so the
    /// first excursion is never rate limited.
    pub last_alert: Option<Millis>,
}

impl AlertState {
    pub const fn new() -> Self {
        Self {
            alert_active: false,
            last_alert: None,
        }
    }

    pub fn phase(&self) -> Phase {
        if self.alert_active {
            Phase::Alerting
        } else {
            Phase::Normal
        }
    }
}

/// Threshold comparison plus debounce timing.
#[derive(Debug, Clone)]
pub struct AlertMonitor {
    threshold: u16,
    interval_ms: u32,
    state: AlertState,
}

impl AlertMonitor {
    pub const fn new(threshold: u16, interval_ms: u32) -> Self {
        Self {
            threshold,
            interval_ms,
            state: AlertState::new(),
        }
    }

    pub fn threshold(&self) -> u16 {
        self.threshold
    }

    pub fn interval_ms(&self) -> u32 {
        self.interval_ms
    }

    pub fn state(&self) -> &AlertState {
        &self.state
    }

    /// Forget any previous alert and return to the boot state.
    pub fn reset(&mut self) {
        self.state = AlertState::new();
    }

    /// Evaluate one reading taken at `now`.
    pub fn evaluate(&mut self, reading: Reading, now: Millis) -> Transition {
        if reading.exceeds(self.threshold) {
            let allowed = match self.state.last_alert {
                None => true,
                Some(last) => now.has_elapsed(last, self.interval_ms),
            };
            if allowed {
                self.state.last_alert = Some(now);
                self.state.alert_active = true;
                Transition::Raised
            } else {
                Transition::Suppressed
            }
        } else if self.state.alert_active {
            self.state.alert_active = false;
            Transition::Cleared
        } else {
            Transition::Idle
        }
    }
}
