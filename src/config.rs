/// Build-time node configuration.
///
/// Everything here is fixed when the firmware is compiled. Credentials and
/// the sensor identifier can be overridden through environment variables at
/// build time (`FIRENODE_WIFI_SSID`, `FIRENODE_WIFI_PASSWORD`,
/// `FIRENODE_SENSOR_ID`); the rest are constants.
use core::net::Ipv4Addr;

use crate::board;
use crate::network::{AddressMode, BroadcastTarget, JoinPolicy, StaticIp};
use crate::protocol::{self, ProtocolError};

/// WiFi network the node joins
pub const WIFI_SSID: &str = match option_env!("FIRENODE_WIFI_SSID") {
    Some(ssid) => ssid,
    None => "FireEmergency_LAN",
};

/// WPA2 passphrase for [`WIFI_SSID`]
pub const WIFI_PASSWORD: &str = match option_env!("FIRENODE_WIFI_PASSWORD") {
    Some(pw) => pw,
    None => "emergency123",
};

/// Fixed identifier carried in every alert
pub const SENSOR_ID: &str = match option_env!("FIRENODE_SENSOR_ID") {
    Some(id) => id,
    None => "ROOM_301_SENSOR",
};

/// Static address settings, unique per node on the LAN
pub const STATIC_IP: StaticIp = StaticIp {
    ip: Ipv4Addr::new(192, 168, 1, 101),
    gateway: Ipv4Addr::new(192, 168, 1, 1),
    mask: Ipv4Addr::new(255, 255, 255, 0),
};

/// Address assignment requested at boot. Static falls back to DHCP on failure.
pub const ADDRESS_MODE: AddressMode = if cfg!(feature = "dhcp") {
    AddressMode::Dhcp
} else {
    AddressMode::Static(STATIC_IP)
};

/// Raw ADC value above which the air is treated as smoky.
/// Calibrate per sensor; readings equal to the threshold are normal.
pub const SMOKE_THRESHOLD: u16 = 400;

/// Minimum time between two alert datagrams
pub const ALERT_INTERVAL_MS: u32 = 5_000;

/// Console reading report cadence
pub const REPORT_INTERVAL_MS: u32 = 2_000;

/// Delay between loop iterations
pub const SAMPLE_PERIOD_MS: u32 = 100;

/// UDP port alerts are broadcast to
pub const UDP_PORT: u16 = 5005;

/// Give up joining the network after this long. `None` blocks forever.
pub const JOIN_TIMEOUT_MS: Option<u32> = Some(30_000);

/// Poll interval while waiting for the WiFi association
pub const JOIN_RETRY_MS: u32 = 500;

/// Re-request association if an accepted attempt shows no link after this long
pub const JOIN_ATTEMPT_MS: u32 = 10_000;

/// Runtime view of the configuration, passed to [`crate::node::FireNode`].
///
/// Built from the constants above by [`NodeConfig::new`]; tests override
/// individual fields with struct update syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeConfig {
    pub threshold: u16,
    pub alert_interval_ms: u32,
    pub report_interval_ms: u32,
    pub sample_period_ms: u32,
    pub udp_port: u16,
    pub sensor_id: &'static str,
    pub broadcast: BroadcastTarget,
    pub join: JoinPolicy,
}

impl NodeConfig {
    pub const fn new() -> Self {
        Self {
            threshold: SMOKE_THRESHOLD,
            alert_interval_ms: ALERT_INTERVAL_MS,
            report_interval_ms: REPORT_INTERVAL_MS,
            sample_period_ms: SAMPLE_PERIOD_MS,
            udp_port: UDP_PORT,
            sensor_id: SENSOR_ID,
            broadcast: if cfg!(feature = "limited-broadcast") {
                BroadcastTarget::Limited
            } else {
                BroadcastTarget::Subnet
            },
            join: JoinPolicy {
                retry_interval_ms: JOIN_RETRY_MS,
                attempt_window_ms: JOIN_ATTEMPT_MS,
                timeout_ms: JOIN_TIMEOUT_MS,
            },
        }
    }

    /// Reject combinations the node cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.threshold == 0 {
            return Err(ConfigError::ZeroThreshold);
        }
        if self.threshold >= board::ADC_MAX {
            return Err(ConfigError::ThresholdOutOfRange {
                threshold: self.threshold,
                max: board::ADC_MAX,
            });
        }
        if self.sample_period_ms == 0 {
            return Err(ConfigError::ZeroSamplePeriod);
        }
        if self.join.retry_interval_ms == 0 {
            return Err(ConfigError::ZeroRetryInterval);
        }
        if self.join.attempt_window_ms < self.join.retry_interval_ms {
            return Err(ConfigError::AttemptWindowTooShort {
                window_ms: self.join.attempt_window_ms,
                retry_ms: self.join.retry_interval_ms,
            });
        }
        protocol::validate_sensor_id(self.sensor_id)?;
        Ok(())
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("smoke threshold must be non-zero")]
    ZeroThreshold,

    #[error("smoke threshold {threshold} is unreachable (ADC max {max})")]
    ThresholdOutOfRange { threshold: u16, max: u16 },

    #[error("sample period must be non-zero")]
    ZeroSamplePeriod,

    #[error("join retry interval must be non-zero")]
    ZeroRetryInterval,

    #[error("join attempt window {window_ms} ms is shorter than the {retry_ms} ms poll interval")]
    AttemptWindowTooShort { window_ms: u32, retry_ms: u32 },

    #[error("invalid sensor id: {0}")]
    SensorId(#[from] ProtocolError),
}
