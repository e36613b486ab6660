//! FireNode — ESP-IDF std firmware
//!
//! Single-threaded polling loop on the main task: sample the MQ-2, run the
//! alert state machine, broadcast a UDP alert when smoke is detected, sleep
//! for the sample period, repeat.

mod sensor;
mod transport;
mod wifi;

use std::thread;
use std::time::{Duration, Instant};

use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::{eventloop::EspSystemEventLoop, nvs::EspDefaultNvsPartition};

use firenode::board;
use firenode::clock::Millis;
use firenode::config::NodeConfig;
use firenode::network::AlertTransport;
use firenode::node::FireNode;
use firenode::protocol::ALERT_KIND;

use sensor::Mq2Sensor;
use transport::UdpTransport;

#[cfg(not(any(feature = "devkitc", feature = "xiao")))]
compile_error!("select a board feature: `devkitc` or `xiao`");

fn main() -> anyhow::Result<()> {
    // Bind the ESP-IDF logger to the `log` facade
    esp_idf_svc::log::EspLogger::initialize_default();

    let boot = Instant::now();
    let uptime = || Millis(boot.elapsed().as_millis() as u64);

    log::info!(
        "=== FireNode v{} on {} ===",
        env!("CARGO_PKG_VERSION"),
        board::BOARD_NAME
    );

    let cfg = NodeConfig::new();
    cfg.validate()?;
    log::info!(
        "Threshold {} / {}, alert interval {} ms, sensor id {}",
        cfg.threshold,
        board::ADC_MAX,
        cfg.alert_interval_ms,
        cfg.sensor_id
    );

    // ── Peripherals ──────────────────────────────────────────────────

    let peripherals = Peripherals::take()?;
    let sys_loop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;

    #[cfg(feature = "devkitc")]
    let sensor = Mq2Sensor::new(peripherals.adc1, peripherals.pins.gpio34)?;
    #[cfg(all(feature = "xiao", not(feature = "devkitc")))]
    let sensor = Mq2Sensor::new(peripherals.adc1, peripherals.pins.gpio1)?;

    // ── Network ──────────────────────────────────────────────────────

    let wifi = wifi::connect(peripherals.modem, sys_loop, nvs, &cfg.join)?;
    let transport = UdpTransport::new(wifi)?;
    log::info!("IP address: {}", transport.ip_info().ip);

    // ── Main loop ────────────────────────────────────────────────────

    let mut node = FireNode::new(sensor, transport, cfg, uptime())?;
    log::info!(
        "System armed - broadcasting {} on port {}",
        ALERT_KIND,
        cfg.udp_port
    );

    let period = Duration::from_millis(u64::from(cfg.sample_period_ms));
    loop {
        node.poll(uptime());
        thread::sleep(period);
    }
}
