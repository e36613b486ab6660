//! UDP broadcast transport over the station interface.

use std::net::{Ipv4Addr, SocketAddrV4, UdpSocket};

use esp_idf_svc::wifi::{BlockingWifi, EspWifi};

use firenode::network::{mask_from_prefix, AlertTransport, IpInfo};

pub struct UdpTransport {
    socket: UdpSocket,
    wifi: BlockingWifi<EspWifi<'static>>,
    /// Address at bring-up, used if the netif cannot be queried later
    fallback: IpInfo,
}

impl UdpTransport {
    /// Open a send-only broadcast socket on an ephemeral port; nothing is
    /// ever read from it. Keeps the WiFi driver alive for the life of the
    /// transport.
    pub fn new(wifi: BlockingWifi<EspWifi<'static>>) -> anyhow::Result<Self> {
        let socket = UdpSocket::bind(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 0))?;
        socket.set_broadcast(true)?;
        let fallback = current_ip_info(&wifi)?;
        log::info!("UDP broadcast socket bound to {}", socket.local_addr()?);
        Ok(Self {
            socket,
            wifi,
            fallback,
        })
    }
}

impl AlertTransport for UdpTransport {
    type Error = std::io::Error;

    fn ip_info(&self) -> IpInfo {
        match current_ip_info(&self.wifi) {
            Ok(info) => info,
            Err(e) => {
                log::warn!("Reading interface address failed: {:?}", e);
                self.fallback
            }
        }
    }

    fn broadcast(&mut self, dest: SocketAddrV4, payload: &[u8]) -> Result<(), Self::Error> {
        self.socket.send_to(payload, dest).map(|_| ())
    }
}

pub fn current_ip_info(wifi: &BlockingWifi<EspWifi<'static>>) -> anyhow::Result<IpInfo> {
    let info = wifi.wifi().sta_netif().get_ip_info()?;
    Ok(IpInfo {
        ip: info.ip,
        mask: mask_from_prefix(info.subnet.mask.0),
    })
}
