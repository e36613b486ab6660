//! MQ-2 analog input via the ESP-IDF oneshot ADC driver.

use esp_idf_svc::hal::adc::attenuation::DB_11;
use esp_idf_svc::hal::adc::oneshot::config::AdcChannelConfig;
use esp_idf_svc::hal::adc::oneshot::{AdcChannelDriver, AdcDriver};
use esp_idf_svc::hal::gpio::ADCPin;
use esp_idf_svc::hal::peripheral::Peripheral;
use esp_idf_svc::sys::EspError;

use firenode::board;
use firenode::sensor::{LastGood, Reading, SmokeSensor};

pub struct Mq2Sensor<'d, T: ADCPin> {
    channel: AdcChannelDriver<'d, T, AdcDriver<'d, T::Adc>>,
    last: LastGood,
}

impl<'d, T: ADCPin> Mq2Sensor<'d, T> {
    pub fn new(
        adc: impl Peripheral<P = T::Adc> + 'd,
        pin: impl Peripheral<P = T> + 'd,
    ) -> Result<Self, EspError> {
        let driver = AdcDriver::new(adc)?;
        // 11 dB: full 0..~3.1 V range of the MQ-2 module's divider
        let config = AdcChannelConfig {
            attenuation: DB_11,
            ..Default::default()
        };
        let channel = AdcChannelDriver::new(driver, pin, &config)?;
        log::info!("MQ-2 sensor on GPIO{} ({}-bit ADC)", board::SENSOR_PIN, board::ADC_BITS);
        Ok(Self {
            channel,
            last: LastGood::new(),
        })
    }
}

impl<T: ADCPin> SmokeSensor for Mq2Sensor<'_, T> {
    fn sample(&mut self) -> Reading {
        let raw = self.channel.read_raw();
        self.last.update(raw)
    }
}
