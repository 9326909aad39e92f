//! System configuration parameters
//!
//! All tunable parameters for the RC device.  Values are compiled in;
//! the binary validates them once at start before anything is brought up.

use serde::{Deserialize, Serialize};

use crate::app::ports::ConfigError;

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Network ---
    /// Access point SSID
    pub ap_ssid: heapless::String<32>,
    /// Access point passphrase (8-63 characters)
    pub ap_psk: heapless::String<64>,
    /// Host name answered by the name service (a-z, 0-9 and '-')
    pub dns_name: heapless::String<32>,
    /// Third octet of the access point address (192.168.N.1)
    pub network_octet: u8,
    /// Command/telemetry server port
    pub http_port: u16,

    // --- Watchdog ---
    /// Time without an accepted command before the vehicle stops (ms)
    pub command_timeout_ms: u32,

    // --- Battery ---
    /// Upper resistor of the battery divider (kOhm)
    pub battery_divider_kohm: f32,
    /// Voltage below which the device trips into LOW_BATTERY (V)
    pub battery_limit_volts: f32,
    /// Battery sampling interval (ms)
    pub battery_sample_interval_ms: u32,

    // --- Reporting ---
    /// Telemetry publish / blink cadence (ms)
    pub publish_interval_ms: u32,
    /// Half period of one blink pulse (ms)
    pub blink_half_period_ms: u32,

    // --- Control ---
    /// Control loop interval (ms)
    pub control_loop_interval_ms: u32,
    /// Drive motor duty while moving (0-100%)
    pub drive_duty_percent: u8,
    /// Steering motor duty while turning (0-100%)
    pub steer_duty_percent: u8,
    /// Motor shield PWM frequency (Hz)
    pub motor_pwm_frequency_hz: u32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Network
            ap_ssid: fixed("RC Device 1"),
            ap_psk: fixed("rcdevice1"),
            dns_name: fixed("rcdevice1"),
            network_octet: 84,
            http_port: 80,

            // Watchdog
            command_timeout_ms: 1000,

            // Battery
            battery_divider_kohm: 470.0,
            battery_limit_volts: 4.0,
            battery_sample_interval_ms: 1000, // 1 Hz

            // Reporting
            publish_interval_ms: 3000,
            blink_half_period_ms: 150,

            // Control
            control_loop_interval_ms: 10, // 100 Hz
            drive_duty_percent: 50,
            steer_duty_percent: 100,
            motor_pwm_frequency_hz: 1000,
        }
    }
}

impl SystemConfig {
    /// Range-check every field.  Rejects rather than clamps.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ap_ssid.is_empty() {
            return Err(ConfigError::ValidationFailed("ap_ssid must not be empty"));
        }
        if !(8..=63).contains(&self.ap_psk.len()) {
            return Err(ConfigError::ValidationFailed(
                "ap_psk must be 8-63 characters",
            ));
        }
        if self.dns_name.is_empty()
            || !self
                .dns_name
                .bytes()
                .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
        {
            return Err(ConfigError::ValidationFailed(
                "dns_name may only contain a-z, 0-9 and '-'",
            ));
        }
        if self.command_timeout_ms == 0 {
            return Err(ConfigError::ValidationFailed("command_timeout_ms must be > 0"));
        }
        if !self.battery_divider_kohm.is_finite() || self.battery_divider_kohm <= 0.0 {
            return Err(ConfigError::ValidationFailed(
                "battery_divider_kohm must be positive",
            ));
        }
        if !self.battery_limit_volts.is_finite() || self.battery_limit_volts <= 0.0 {
            return Err(ConfigError::ValidationFailed(
                "battery_limit_volts must be positive",
            ));
        }
        if self.battery_sample_interval_ms == 0
            || self.publish_interval_ms == 0
            || self.blink_half_period_ms == 0
            || self.control_loop_interval_ms == 0
        {
            return Err(ConfigError::ValidationFailed("intervals must be > 0"));
        }
        if self.drive_duty_percent > 100 || self.steer_duty_percent > 100 {
            return Err(ConfigError::ValidationFailed("motor duty must be 0-100"));
        }
        if self.motor_pwm_frequency_hz == 0 {
            return Err(ConfigError::ValidationFailed("motor_pwm_frequency_hz must be > 0"));
        }
        Ok(())
    }

    /// Access point address (`192.168.N.1`).
    pub fn ap_address(&self) -> [u8; 4] {
        [192, 168, self.network_octet, 1]
    }
}

/// Build a fixed-capacity string from a literal that is known to fit.
fn fixed<const N: usize>(s: &str) -> heapless::String<N> {
    let mut out = heapless::String::new();
    for c in s.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}
