//! mDNS name service adapter.
//!
//! Answers `<dns_name>.local` with the access point address and
//! advertises `_http._tcp` on the command server port.  Uses the ESP-IDF
//! mDNS component on device and is a no-op on simulation targets.

use core::ffi::CStr;

use log::info;

use crate::error::PlatformError;

const MDNS_SERVICE_TYPE: &CStr = c"_http";
const MDNS_SERVICE_PROTO: &CStr = c"_tcp";

/// mDNS advertisement adapter.
pub struct MdnsAdapter {
    hostname: heapless::String<32>,
    port: u16,
    active: bool,
}

impl MdnsAdapter {
    pub fn new(hostname: heapless::String<32>, port: u16) -> Self {
        Self {
            hostname,
            port,
            active: false,
        }
    }

    /// Whether mDNS is currently advertising.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Start hostname and service advertisement.  Needs the access point up.
    pub fn start(&mut self) -> Result<(), PlatformError> {
        if self.active {
            return Ok(());
        }
        self.platform_start()?;
        self.active = true;
        info!(
            "mDNS: advertising {}.local, {}.{} on port {}",
            self.hostname,
            MDNS_SERVICE_TYPE.to_string_lossy(),
            MDNS_SERVICE_PROTO.to_string_lossy(),
            self.port
        );
        Ok(())
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_start(&self) -> Result<(), PlatformError> {
        use esp_idf_svc::sys::*;

        let check = |ret: esp_err_t| {
            if ret == ESP_OK as esp_err_t {
                Ok(())
            } else {
                Err(PlatformError::Status(ret))
            }
        };

        let mut hostname_buf = [0u8; 33];
        let hb = self.hostname.as_bytes();
        hostname_buf[..hb.len()].copy_from_slice(hb);

        // SAFETY: every pointer is to a NUL-terminated buffer that outlives
        // the call; the component copies what it keeps.
        unsafe {
            check(mdns_init())?;
            check(mdns_hostname_set(hostname_buf.as_ptr().cast()))?;
            check(mdns_instance_name_set(hostname_buf.as_ptr().cast()))?;
            check(mdns_service_add(
                core::ptr::null(),
                MDNS_SERVICE_TYPE.as_ptr(),
                MDNS_SERVICE_PROTO.as_ptr(),
                self.port,
                core::ptr::null_mut(),
                0,
            ))?;
        }
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_start(&self) -> Result<(), PlatformError> {
        info!("mDNS(sim): registered {}.local", self.hostname);
        Ok(())
    }
}
