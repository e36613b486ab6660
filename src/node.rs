/// One sensor node: sample, report, evaluate, broadcast.
///
/// [`FireNode::poll`] is the whole loop body. The platform calls it once per
/// iteration with the current uptime and sleeps for the sample period in
/// between. Nothing here blocks except the transport's send.
use crate::alert::{AlertMonitor, Transition};
use crate::clock::{Cadence, Millis};
use crate::config::{ConfigError, NodeConfig};
use crate::network::AlertTransport;
use crate::protocol::AlertPayload;
use crate::sensor::{Reading, SmokeSensor};

/// Outcome of one [`FireNode::poll`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
    pub reading: Reading,
    pub transition: Transition,
    /// An alert datagram was handed to the transport without error
    pub sent: bool,
}

pub struct FireNode<S, T> {
    sensor: S,
    transport: T,
    config: NodeConfig,
    monitor: AlertMonitor,
    report: Cadence,
}

impl<S: SmokeSensor, T: AlertTransport> FireNode<S, T> {
    pub fn new(sensor: S, transport: T, config: NodeConfig, boot: Millis) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            sensor,
            transport,
            monitor: AlertMonitor::new(config.threshold, config.alert_interval_ms),
            report: Cadence::new(config.report_interval_ms, boot),
            config,
        })
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    pub fn monitor(&self) -> &AlertMonitor {
        &self.monitor
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn sensor(&self) -> &S {
        &self.sensor
    }

    /// Run one sampling cycle at `now`.
    pub fn poll(&mut self, now: Millis) -> CycleReport {
        let reading = self.sensor.sample();

        if self.report.due(now) {
            let status = if reading.exceeds(self.config.threshold) {
                "DANGER!"
            } else {
                "Normal"
            };
            log::info!(
                "Smoke level: {} ({}%) [{}]",
                reading,
                reading.percent_of_full_scale(),
                status
            );
        }

        let transition = self.monitor.evaluate(reading, now);
        let sent = match transition {
            Transition::Raised => self.send_alert(reading),
            Transition::Cleared => {
                log::info!("Smoke cleared - system normal");
                false
            }
            Transition::Suppressed | Transition::Idle => false,
        };

        CycleReport {
            reading,
            transition,
            sent,
        }
    }

    /// Build, encode and broadcast one alert. Failures are logged and
    /// otherwise ignored; the alert is not retried.
    fn send_alert(&mut self, reading: Reading) -> bool {
        let info = self.transport.ip_info();

        let payload = match AlertPayload::new(reading, self.config.threshold, self.config.sensor_id, info.ip) {
            Ok(p) => p,
            Err(e) => {
                log::error!("Alert not sent, payload rejected: {}", e);
                return false;
            }
        };
        let msg = match payload.encode_to_vec() {
            Ok(m) => m,
            Err(e) => {
                log::error!("Alert not sent, encoding failed: {}", e);
                return false;
            }
        };

        let dest = self.config.broadcast.socket_addr(&info, self.config.udp_port);
        match self.transport.broadcast(dest, &msg) {
            Ok(()) => {
                if let Ok(s) = core::str::from_utf8(&msg) {
                    log::warn!("FIRE ALERT broadcast to {}: {}", dest, s);
                }
                true
            }
            Err(e) => {
                log::warn!("FIRE ALERT broadcast to {} failed: {:?}", dest, e);
                false
            }
        }
    }
}
