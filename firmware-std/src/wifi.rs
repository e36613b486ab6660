//! WiFi station bring-up: address assignment, association, netif up.

use std::cell::RefCell;
use std::thread;
use std::time::Duration;

use anyhow::anyhow;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::hal::modem::Modem;
use esp_idf_svc::ipv4::{self, ClientSettings, Mask, Subnet};
use esp_idf_svc::netif::{EspNetif, NetifConfiguration, NetifStack};
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::wifi::{AuthMethod, BlockingWifi, ClientConfiguration, Configuration, EspWifi, WifiDriver};

use firenode::config;
use firenode::network::{self, apply_address_mode, join_with_retry, AddressMode, JoinPolicy, StaticIp};

/// Bring the station interface up on [`config::WIFI_SSID`].
///
/// Static addressing is tried first when configured; if the netif rejects
/// it the interface falls back to DHCP. Association is retried according
/// to `policy`.
pub fn connect(
    modem: Modem,
    sys_loop: EspSystemEventLoop,
    nvs: EspDefaultNvsPartition,
    policy: &JoinPolicy,
) -> anyhow::Result<BlockingWifi<EspWifi<'static>>> {
    let driver = WifiDriver::new(modem, sys_loop.clone(), Some(nvs))?;

    let mut static_netif = None;
    let mode = apply_address_mode(config::ADDRESS_MODE, |cfg| {
        static_netif = Some(static_sta_netif(cfg)?);
        Ok::<(), anyhow::Error>(())
    });
    let sta_netif = match (mode, static_netif) {
        (AddressMode::Static(_), Some(netif)) => netif,
        _ => EspNetif::new(NetifStack::Sta)?,
    };

    let wifi = EspWifi::wrap_all(driver, sta_netif, EspNetif::new(NetifStack::Ap)?)?;
    let mut wifi = BlockingWifi::wrap(wifi, sys_loop)?;

    let auth_method = if config::WIFI_PASSWORD.is_empty() {
        AuthMethod::None
    } else {
        AuthMethod::WPA2Personal
    };
    wifi.set_configuration(&Configuration::Client(ClientConfiguration {
        ssid: config::WIFI_SSID
            .try_into()
            .map_err(|_| anyhow!("SSID '{}' is too long", config::WIFI_SSID))?,
        password: config::WIFI_PASSWORD
            .try_into()
            .map_err(|_| anyhow!("WiFi password is too long"))?,
        auth_method,
        ..Default::default()
    }))?;
    wifi.start()?;
    log::info!("Connecting to '{}'", config::WIFI_SSID);

    let wifi = RefCell::new(wifi);
    join_with_retry(
        policy,
        || wifi.borrow_mut().wifi_mut().connect(),
        || wifi.borrow().is_connected().unwrap_or(false),
        |ms| thread::sleep(Duration::from_millis(u64::from(ms))),
    )?;
    let mut wifi = wifi.into_inner();

    wifi.wait_netif_up()?;
    Ok(wifi)
}

fn static_sta_netif(cfg: &StaticIp) -> anyhow::Result<EspNetif> {
    let prefix = network::prefix_len(cfg.mask)
        .ok_or_else(|| anyhow!("netmask {} is not contiguous", cfg.mask))?;

    let conf = NetifConfiguration {
        ip_configuration: Some(ipv4::Configuration::Client(ipv4::ClientConfiguration::Fixed(
            ClientSettings {
                ip: cfg.ip,
                subnet: Subnet {
                    gateway: cfg.gateway,
                    mask: Mask(prefix),
                },
                dns: None,
                secondary_dns: None,
            },
        ))),
        ..NetifConfiguration::wifi_default_client()
    };
    Ok(EspNetif::new_with_conf(&conf)?)
}
