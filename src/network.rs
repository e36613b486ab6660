/// Network bring-up policy and alert transport contract.
///
/// The platform owns the radio and sockets; this module decides how the
/// node joins the LAN, which address it uses, and where alert datagrams go.
use core::fmt::Debug;
use core::net::{Ipv4Addr, SocketAddrV4};

/// Fixed address settings used instead of a DHCP lease.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticIp {
    pub ip: Ipv4Addr,
    pub gateway: Ipv4Addr,
    pub mask: Ipv4Addr,
}

/// How the station interface gets its address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressMode {
    Static(StaticIp),
    Dhcp,
}

/// Current interface address, as reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IpInfo {
    pub ip: Ipv4Addr,
    pub mask: Ipv4Addr,
}

/// Where alert datagrams are sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BroadcastTarget {
    /// 255.255.255.255
    Limited,
    /// Directed broadcast of the node's own subnet, e.g. 192.168.1.255
    Subnet,
}

impl BroadcastTarget {
    pub fn resolve(self, info: &IpInfo) -> Ipv4Addr {
        match self {
            BroadcastTarget::Limited => Ipv4Addr::BROADCAST,
            BroadcastTarget::Subnet => subnet_broadcast(info.ip, info.mask),
        }
    }

    pub fn socket_addr(self, info: &IpInfo, port: u16) -> SocketAddrV4 {
        SocketAddrV4::new(self.resolve(info), port)
    }
}

/// Sends encoded alerts. Delivery is best effort: errors are reported to
/// the caller for logging but never retried.
pub trait AlertTransport {
    type Error: Debug;

    /// The interface address right now (may change across DHCP renewals).
    fn ip_info(&self) -> IpInfo;

    fn broadcast(&mut self, dest: SocketAddrV4, payload: &[u8]) -> Result<(), Self::Error>;
}

/// Host part all ones: `ip | !mask`.
pub fn subnet_broadcast(ip: Ipv4Addr, mask: Ipv4Addr) -> Ipv4Addr {
    Ipv4Addr::from(u32::from(ip) | !u32::from(mask))
}

/// Netmask with the top `prefix` bits set. Prefixes above 32 saturate.
pub fn mask_from_prefix(prefix: u8) -> Ipv4Addr {
    let bits = match prefix {
        0 => 0,
        p if p >= 32 => u32::MAX,
        p => u32::MAX << (32 - u32::from(p)),
    };
    Ipv4Addr::from(bits)
}

/// CIDR prefix length of a contiguous netmask, `None` if the mask has holes.
pub fn prefix_len(mask: Ipv4Addr) -> Option<u8> {
    let bits = u32::from(mask);
    let ones = bits.leading_ones();
    if bits.checked_shl(ones).unwrap_or(0) == 0 {
        Some(ones as u8)
    } else {
        None
    }
}

/// Try the requested address mode, falling back to DHCP if the static
/// configuration cannot be applied. Returns the mode actually in effect.
pub fn apply_address_mode<E, F>(mode: AddressMode, apply_static: F) -> AddressMode
where
    E: Debug,
    F: FnOnce(&StaticIp) -> Result<(), E>,
{
    match mode {
        AddressMode::Dhcp => {
            log::info!("Address assignment: DHCP");
            AddressMode::Dhcp
        }
        AddressMode::Static(cfg) => match apply_static(&cfg) {
            Ok(()) => {
                log::info!("Address assignment: static {} via {}", cfg.ip, cfg.gateway);
                mode
            }
            Err(e) => {
                log::warn!("Static IP configuration failed ({:?}), using DHCP", e);
                AddressMode::Dhcp
            }
        },
    }
}

/// WiFi association retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JoinPolicy {
    /// Wait between link checks
    pub retry_interval_ms: u32,
    /// Re-request association when an accepted attempt has not brought the
    /// link up within this long
    pub attempt_window_ms: u32,
    /// Give up after this long; `None` keeps trying forever
    pub timeout_ms: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum JoinError {
    #[error("network join timed out after {waited_ms} ms ({attempts} association attempts)")]
    TimedOut { waited_ms: u32, attempts: u32 },
}

/// Start association and poll until the link is up.
///
/// `try_join` kicks off an association. It is re-issued when the previous
/// call failed, or when an accepted request has not produced a link within
/// `attempt_window_ms` (the AP dropped it, or the driver gave up silently).
/// `sleep` is the platform delay. Returns the time spent waiting.
pub fn join_with_retry<E, J, C, S>(
    policy: &JoinPolicy,
    mut try_join: J,
    mut is_connected: C,
    mut sleep: S,
) -> Result<u32, JoinError>
where
    E: Debug,
    J: FnMut() -> Result<(), E>,
    C: FnMut() -> bool,
    S: FnMut(u32),
{
    let mut waited_ms: u32 = 0;
    let mut attempts: u32 = 0;
    let mut pending = false;
    let mut attempt_started: u32 = 0;

    loop {
        if !pending {
            attempts += 1;
            match try_join() {
                Ok(()) => {
                    pending = true;
                    attempt_started = waited_ms;
                }
                Err(e) => log::warn!("Association attempt {} failed: {:?}", attempts, e),
            }
        }

        if is_connected() {
            log::info!("Network joined after {} ms", waited_ms);
            return Ok(waited_ms);
        }

        if let Some(timeout) = policy.timeout_ms {
            if waited_ms >= timeout {
                return Err(JoinError::TimedOut {
                    waited_ms,
                    attempts,
                });
            }
        }

        log::debug!("Waiting for association ({} ms)", waited_ms);
        sleep(policy.retry_interval_ms);
        waited_ms = waited_ms.saturating_add(policy.retry_interval_ms);

        if pending && waited_ms - attempt_started >= policy.attempt_window_ms {
            log::warn!(
                "No link {} ms after association attempt {}, retrying",
                waited_ms - attempt_started,
                attempts
            );
            pending = false;
        }
    }
}
