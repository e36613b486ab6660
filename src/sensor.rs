/// Smoke sensor sampling contract.
///
/// The MQ-2 module exposes an analog voltage that rises with gas/smoke
/// concentration. Platforms read it through their ADC driver and hand the
/// raw count to the alert logic once per loop iteration.
use core::fmt;

use crate::board;

/// One raw ADC sample, `0..=board::ADC_MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Reading(pub u16);

impl Reading {
    /// Bound a raw driver value to the board's ADC range.
    pub fn clamped(raw: u16) -> Self {
        Reading(raw.min(board::ADC_MAX))
    }

    /// Reading as a whole percentage of the ADC full scale.
    pub fn percent_of_full_scale(self) -> u8 {
        let pct = u32::from(self.0.min(board::ADC_MAX)) * 100 / u32::from(board::ADC_MAX);
        pct as u8
    }

    pub fn exceeds(self, threshold: u16) -> bool {
        self.0 > threshold
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Source of smoke readings. Called once per cycle, unconditionally.
///
/// There is no failure path: implementations that hit a driver error log it
/// and return their last good reading.
pub trait SmokeSensor {
    fn sample(&mut self) -> Reading;
}

impl<S: SmokeSensor + ?Sized> SmokeSensor for &mut S {
    fn sample(&mut self) -> Reading {
        (**self).sample()
    }
}

/// Holds the last good reading for drivers whose reads can fail.
#[derive(Debug, Default)]
pub struct LastGood {
    last: Reading,
}

impl LastGood {
    pub const fn new() -> Self {
        Self { last: Reading(0) }
    }

    /// Accept a driver result, falling back to the previous value on error.
    pub fn update<E: fmt::Debug>(&mut self, result: Result<u16, E>) -> Reading {
        match result {
            Ok(raw) => {
                self.last = Reading::clamped(raw);
            }
            Err(e) => {
                log::warn!("Smoke sensor read failed: {:?}; reusing {}", e, self.last);
            }
        }
        self.last
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exceeds_is_strict() {
        assert!(!Reading(400).exceeds(400));
        assert!(Reading(401).exceeds(400));
        assert!(!Reading(0).exceeds(400));
    }

    #[test]
    fn clamped_bounds_to_adc_max() {
        assert_eq!(Reading::clamped(u16::MAX), Reading(board::ADC_MAX));
        assert_eq!(Reading::clamped(12), Reading(12));
    }

    #[test]
    fn percent_of_full_scale_endpoints() {
        assert_eq!(Reading(0).percent_of_full_scale(), 0);
        assert_eq!(Reading(board::ADC_MAX).percent_of_full_scale(), 100);
        assert_eq!(Reading(u16::MAX).percent_of_full_scale(), 100);
    }

    #[test]
    fn last_good_keeps_previous_on_error() {
        let mut lg = LastGood::new();
        assert_eq!(lg.update::<()>(Err(())), Reading(0));
        assert_eq!(lg.update::<()>(Ok(512)), Reading(512u16.min(board::ADC_MAX)));
        let before = lg.update::<()>(Ok(300));
        assert_eq!(lg.update(Err("adc timeout")), before);
    }

    struct Fixed(u16);

    impl SmokeSensor for Fixed {
        fn sample(&mut self) -> Reading {
            Reading(self.0)
        }
    }

    #[test]
    fn mutable_reference_is_a_sensor() {
        fn sample_once<S: SmokeSensor>(mut sensor: S) -> Reading {
            sensor.sample()
        }

        let mut s = Fixed(42);
        assert_eq!(sample_once(&mut s), Reading(42));
    }
}
