/// Hardware abstraction for supported boards.
///
/// Each board module defines the MQ-2 sensor wiring and ADC resolution,
/// selected at compile time via feature flags.

#[cfg(feature = "board-devkitc")]
mod hw {
    pub const SENSOR_PIN: u8 = 34; // ADC1_CH6, input-only
    pub const ADC_BITS: u8 = 12;
    pub const BOARD_NAME: &str = "esp32_devkitc";
}

#[cfg(all(feature = "board-xiao", not(feature = "board-devkitc")))]
mod hw {
    pub const SENSOR_PIN: u8 = 1; // A0 / ADC1_CH0
    pub const ADC_BITS: u8 = 12;
    pub const BOARD_NAME: &str = "xiao_esp32s3";
}

#[cfg(not(any(feature = "board-devkitc", feature = "board-xiao")))]
mod hw {
    pub const SENSOR_PIN: u8 = 0;
    pub const ADC_BITS: u8 = 10;
    pub const BOARD_NAME: &str = "unknown";
}

pub use hw::*;

/// Largest raw value the board's ADC can report.
pub const ADC_MAX: u16 = (1u16 << ADC_BITS) - 1;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adc_max_matches_resolution() {
        assert_eq!(u32::from(ADC_MAX) + 1, 1u32 << ADC_BITS);
        assert!(!BOARD_NAME.is_empty());
    }
}
