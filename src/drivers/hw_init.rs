//! One-shot hardware peripheral initialization.
//!
//! Configures the battery ADC channel using raw ESP-IDF sys calls.  Called
//! once from `main()` before the control loop starts.  GPIO and I²C are
//! owned by `esp-idf-hal` drivers and are not touched here.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

use crate::error::PlatformError;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    AdcInitFailed(i32),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::AdcInitFailed(rc) => write!(f, "ADC1 init failed (rc={})", rc),
        }
    }
}

#[cfg(target_os = "espidf")]
use log::info;

#[cfg(target_os = "espidf")]
pub fn init_peripherals() -> Result<(), HwInitError> {
    // SAFETY: Called once from main() before the control loop; single-threaded.
    unsafe {
        init_adc()?;
    }
    info!("hw_init: all peripherals configured");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_peripherals() -> Result<(), HwInitError> {
    log::info!("hw_init(sim): peripheral init skipped");
    Ok(())
}

// ── ADC (oneshot) ─────────────────────────────────────────────

/// ADC1 channel wired to the battery divider.
pub const ADC1_CH_BATTERY: u32 = crate::pins::BATTERY_ADC_CHANNEL;

/// The ADC samples 12 bits; the divider calibration is expressed in
/// 10-bit counts.
const ADC_SHIFT_TO_10_BIT: u32 = 2;

#[cfg(target_os = "espidf")]
static mut ADC1_HANDLE: adc_oneshot_unit_handle_t = core::ptr::null_mut();

/// SAFETY: Must be called only from the single-threaded init path or the
/// control-loop ADC read path.  `init_adc()` completes before the loop
/// starts, and battery sampling runs on the loop thread only.
#[cfg(target_os = "espidf")]
unsafe fn adc1_handle() -> adc_oneshot_unit_handle_t {
    unsafe { ADC1_HANDLE }
}

#[cfg(target_os = "espidf")]
unsafe fn init_adc() -> Result<(), HwInitError> {
    let init_cfg = adc_oneshot_unit_init_cfg_t {
        unit_id: adc_unit_t_ADC_UNIT_1,
        ulp_mode: adc_ulp_mode_t_ADC_ULP_MODE_DISABLE,
        ..Default::default()
    };
    // SAFETY: ADC1_HANDLE is only written here, once at boot.
    let ret = unsafe { adc_oneshot_new_unit(&init_cfg, &raw mut ADC1_HANDLE) };
    if ret != ESP_OK as i32 { return Err(HwInitError::AdcInitFailed(ret)); }

    let chan_cfg = adc_oneshot_chan_cfg_t {
        // 0 dB: full scale about 0.95 V, see sensors::battery.
        atten: adc_atten_t_ADC_ATTEN_DB_0,
        bitwidth: adc_bitwidth_t_ADC_BITWIDTH_12,
    };

    let ret = unsafe { adc_oneshot_config_channel(adc1_handle(), ADC1_CH_BATTERY, &chan_cfg) };
    if ret != ESP_OK as i32 { return Err(HwInitError::AdcInitFailed(ret)); }

    info!("hw_init: ADC1 configured (CH{}=battery)", ADC1_CH_BATTERY);
    Ok(())
}

/// Read one sample, scaled to 10 bits.
#[cfg(target_os = "espidf")]
pub fn adc1_read(channel: u32) -> Result<u16, PlatformError> {
    let mut raw: i32 = 0;
    // SAFETY: adc1_handle() contract, loop-thread access only.
    let ret = unsafe { adc_oneshot_read(adc1_handle(), channel, &mut raw) };
    if ret != ESP_OK as i32 {
        return Err(PlatformError::Status(ret));
    }
    Ok(scale_to_10_bit(raw))
}

#[cfg(not(target_os = "espidf"))]
pub fn adc1_read(_channel: u32) -> Result<u16, PlatformError> {
    Err(PlatformError::Unsupported)
}

#[cfg_attr(not(target_os = "espidf"), allow(dead_code))]
fn scale_to_10_bit(raw: i32) -> u16 {
    (raw.clamp(0, 4095) as u16) >> ADC_SHIFT_TO_10_BIT
}
