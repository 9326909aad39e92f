//! WiFi access-point adapter.
//!
//! The vehicle hosts its own network: WPA2 access point at
//! `192.168.N.1/24` with DHCP for clients.  Started once during boot and
//! never torn down.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: real ESP-IDF WiFi driver via `esp_idf_svc::wifi`.
//! - **all other targets**: simulation stub for host-side tests.

use core::fmt;
use log::{error, info};

use crate::config::SystemConfig;
use crate::error::PlatformError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApError {
    InvalidSsid,
    InvalidPassword,
}

impl fmt::Display for ApError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSsid => write!(f, "SSID invalid (must be 1-32 printable ASCII bytes)"),
            Self::InvalidPassword => write!(f, "passphrase invalid (must be 8-63 bytes for WPA2)"),
        }
    }
}

impl From<ApError> for PlatformError {
    fn from(e: ApError) -> Self {
        match e {
            ApError::InvalidSsid => PlatformError::InvalidArgument("ap_ssid"),
            ApError::InvalidPassword => PlatformError::InvalidArgument("ap_psk"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApState {
    Stopped,
    Running,
    Failed,
}

// ───────────────────────────────────────────────────────────────
// Validation
// ───────────────────────────────────────────────────────────────

fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

fn validate_ssid(ssid: &str) -> Result<(), ApError> {
    if ssid.is_empty() || ssid.len() > 32 || !is_printable_ascii(ssid) {
        return Err(ApError::InvalidSsid);
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), ApError> {
    if password.len() < 8 || password.len() > 63 {
        return Err(ApError::InvalidPassword);
    }
    Ok(())
}

// ───────────────────────────────────────────────────────────────
// Access point
// ───────────────────────────────────────────────────────────────

/// Radio resources the access point takes ownership of.
#[cfg(target_os = "espidf")]
pub struct Radio {
    pub modem: esp_idf_svc::hal::modem::Modem,
    pub sysloop: esp_idf_svc::eventloop::EspSystemEventLoop,
    pub nvs: Option<esp_idf_svc::nvs::EspDefaultNvsPartition>,
}

pub struct AccessPoint {
    state: ApState,
    ssid: heapless::String<32>,
    password: heapless::String<64>,
    address: [u8; 4],
    #[cfg(target_os = "espidf")]
    radio: Option<Radio>,
    #[cfg(target_os = "espidf")]
    wifi: Option<esp_idf_svc::wifi::EspWifi<'static>>,
}

impl AccessPoint {
    #[cfg(target_os = "espidf")]
    pub fn new(config: &SystemConfig, radio: Radio) -> Self {
        Self {
            state: ApState::Stopped,
            ssid: config.ap_ssid.clone(),
            password: config.ap_psk.clone(),
            address: config.ap_address(),
            radio: Some(radio),
            wifi: None,
        }
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            state: ApState::Stopped,
            ssid: config.ap_ssid.clone(),
            password: config.ap_psk.clone(),
            address: config.ap_address(),
        }
    }

    pub fn state(&self) -> ApState {
        self.state
    }

    pub fn address(&self) -> [u8; 4] {
        self.address
    }

    /// Bring the access point up.  Repeated calls after success are no-ops.
    pub fn start(&mut self) -> Result<(), PlatformError> {
        if self.state == ApState::Running {
            return Ok(());
        }
        validate_ssid(&self.ssid)?;
        validate_password(&self.password)?;

        let [a, b, c, d] = self.address;
        info!("WiFi: starting AP '{}' at {a}.{b}.{c}.{d}", self.ssid);
        match self.platform_start() {
            Ok(()) => {
                self.state = ApState::Running;
                info!("WiFi: AP up");
                Ok(())
            }
            Err(e) => {
                error!("WiFi: AP start failed: {e}");
                self.state = ApState::Failed;
                Err(e)
            }
        }
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_start(&mut self) -> Result<(), PlatformError> {
        use core::net::Ipv4Addr;
        use esp_idf_svc::ipv4::{
            Configuration as IpConfiguration, Mask, RouterConfiguration, Subnet,
        };
        use esp_idf_svc::netif::{EspNetif, NetifConfiguration};
        use esp_idf_svc::wifi::{
            AccessPointConfiguration, AuthMethod, BlockingWifi, Configuration, EspWifi,
        };

        let status = |e: esp_idf_svc::sys::EspError| PlatformError::Status(e.code());

        let Radio {
            modem,
            sysloop,
            nvs,
        } = self.radio.take().ok_or(PlatformError::Unsupported)?;

        let [a, b, c, d] = self.address;
        let gateway = Ipv4Addr::new(a, b, c, d);

        let mut esp_wifi = EspWifi::new(modem, sysloop.clone(), nvs).map_err(status)?;

        let netif = EspNetif::new_with_conf(&NetifConfiguration {
            ip_configuration: Some(IpConfiguration::Router(RouterConfiguration {
                subnet: Subnet {
                    gateway,
                    mask: Mask(24),
                },
                dhcp_enabled: true,
                dns: Some(gateway),
                secondary_dns: None,
            })),
            ..NetifConfiguration::wifi_default_router()
        })
        .map_err(status)?;
        esp_wifi.swap_netif_ap(netif).map_err(status)?;

        {
            let mut wifi = BlockingWifi::wrap(&mut esp_wifi, sysloop).map_err(status)?;
            wifi.set_configuration(&Configuration::AccessPoint(AccessPointConfiguration {
                ssid: self.ssid.as_str().try_into().map_err(|_| ApError::InvalidSsid)?,
                password: self
                    .password
                    .as_str()
                    .try_into()
                    .map_err(|_| ApError::InvalidPassword)?,
                auth_method: AuthMethod::WPA2Personal,
                channel: 1,
                ..Default::default()
            }))
            .map_err(status)?;
            wifi.start().map_err(status)?;
            wifi.wait_netif_up().map_err(status)?;
        }

        self.wifi = Some(esp_wifi);
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_start(&mut self) -> Result<(), PlatformError> {
        info!("WiFi(sim): AP '{}' up", self.ssid);
        Ok(())
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
