//! Battery voltage monitor.
//!
//! Reads the raw ADC value of the battery divider, applies a fixed linear
//! calibration and reports a [`BatteryLevel`].
//!
//! The board carries the same network as a D1 mini A0 input: the top
//! resistor, a 220k series resistor and 100k to ground at the ADC pin.
//! GPIO34 has no divider of its own, so these parts sit on the board.
//! ADC1 runs at 0 dB attenuation, where full scale is about 0.95 V:
//!
//! ```text
//! volts = raw * V_fs * (R_top + 220k + 100k) / (100k * 1024)
//! ```
//!
//! With `V_fs = 1.0` this is the D1 mini scale `(R_top + 320) / 102400`.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: reads the battery ADC channel via the oneshot API
//! (initialised by hw_init).
//! On host/test: reads from a static `AtomicU16` for injection.

use core::sync::atomic::{AtomicU16, Ordering};

use crate::error::PlatformError;

static SIM_BATTERY_ADC: AtomicU16 = AtomicU16::new(0);

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_battery_adc(raw: u16) {
    SIM_BATTERY_ADC.store(raw, Ordering::Relaxed);
}

/// Series resistor between the top resistor and the tap (kOhm).
const SERIES_KOHM: f32 = 220.0;
/// Tap-to-ground resistor (kOhm).
const BOTTOM_KOHM: f32 = 100.0;
/// Counts per full scale after scaling to 10 bits.
const FULL_SCALE_COUNTS: f32 = 1024.0;
/// Input voltage at full scale: ESP32 ADC1 at 0 dB attenuation.
pub const ADC_FULL_SCALE_VOLTS: f32 = 0.95;

/// Latest calibrated battery reading.
///
/// `Unknown` until the first sample so the low-battery check cannot trip
/// on a zero-initialised value.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum BatteryLevel {
    #[default]
    Unknown,
    Volts(f32),
}

impl BatteryLevel {
    /// True only for a real sample below `limit`.
    pub fn is_below(self, limit: f32) -> bool {
        match self {
            Self::Unknown => false,
            Self::Volts(v) => v < limit,
        }
    }

    pub fn volts(self) -> Option<f32> {
        match self {
            Self::Unknown => None,
            Self::Volts(v) => Some(v),
        }
    }

    /// Wire representation: `-1.0` stands for "not yet sampled".
    pub fn as_reported(self) -> f32 {
        self.volts().unwrap_or(-1.0)
    }
}

/// Fixed linear calibration of the battery divider.
#[derive(Debug, Clone, Copy)]
pub struct Calibration {
    /// Volts per ADC count.
    pub volts_per_count: f32,
}

impl Calibration {
    /// Scale for the board's ADC input with the given top resistor.
    pub fn from_divider(top_kohm: f32) -> Self {
        Self::for_input(top_kohm, ADC_FULL_SCALE_VOLTS)
    }

    /// Scale for an ADC input whose full scale is `full_scale_volts`.
    pub fn for_input(top_kohm: f32, full_scale_volts: f32) -> Self {
        let ratio = (top_kohm + SERIES_KOHM + BOTTOM_KOHM) / BOTTOM_KOHM;
        Self {
            volts_per_count: full_scale_volts * ratio / FULL_SCALE_COUNTS,
        }
    }
}

pub struct BatteryMonitor {
    cal: Calibration,
    last: BatteryLevel,
    total_reads: u32,
}

impl BatteryMonitor {
    pub fn new(cal: Calibration) -> Self {
        Self {
            cal,
            last: BatteryLevel::Unknown,
            total_reads: 0,
        }
    }

    /// Calibrate a raw sample and remember it.
    pub fn ingest(&mut self, raw: u16) -> BatteryLevel {
        self.total_reads = self.total_reads.saturating_add(1);
        self.last = BatteryLevel::Volts(f32::from(raw) * self.cal.volts_per_count);
        self.last
    }

    pub fn level(&self) -> BatteryLevel {
        self.last
    }

    pub fn total_reads(&self) -> u32 {
        self.total_reads
    }
}

/// Raw sample of the battery divider.
#[cfg(target_os = "espidf")]
pub fn read_raw() -> Result<u16, PlatformError> {
    crate::drivers::hw_init::adc1_read(crate::drivers::hw_init::ADC1_CH_BATTERY)
}

/// Raw sample of the battery divider.
#[cfg(not(target_os = "espidf"))]
pub fn read_raw() -> Result<u16, PlatformError> {
    Ok(SIM_BATTERY_ADC.load(Ordering::Relaxed))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monitor() -> BatteryMonitor {
        BatteryMonitor::new(Calibration::from_divider(470.0))
    }

    #[test]
    fn one_volt_input_matches_d1_mini_scale() {
        let cal = Calibration::for_input(470.0, 1.0);
        assert!((cal.volts_per_count - 790.0 / 102_400.0).abs() < 1e-9);
    }

    #[test]
    fn board_scale_uses_esp32_full_scale() {
        let cal = Calibration::from_divider(470.0);
        assert!((cal.volts_per_count - 0.95 * 790.0 / 102_400.0).abs() < 1e-9);
    }

    #[test]
    fn full_scale_reads_about_seven_and_a_half_volts() {
        let mut m = monitor();
        let v = m.ingest(1023).volts().unwrap();
        assert!((v - 7.497).abs() < 0.01, "got {v}");
    }

    #[test]
    fn threshold_tap_stays_inside_the_input_range() {
        // 4 V at the battery puts about 0.5 V on the pin.
        let raw = (4.0 / Calibration::from_divider(470.0).volts_per_count) as u16;
        assert!((500..600).contains(&raw), "raw {raw}");
    }

    #[test]
    fn unknown_until_first_sample() {
        let m = monitor();
        assert_eq!(m.level(), BatteryLevel::Unknown);
        assert!(!m.level().is_below(100.0));
        assert_eq!(m.level().as_reported(), -1.0);
    }

    #[test]
    fn zero_sample_is_a_real_low_reading() {
        let mut m = monitor();
        let level = m.ingest(0);
        assert_eq!(level, BatteryLevel::Volts(0.0));
        assert!(level.is_below(4.0));
    }

    #[test]
    fn read_raw_uses_injected_adc_value() {
        sim_set_battery_adc(600);
        let mut m = monitor();
        let v = m.ingest(read_raw().unwrap()).volts().unwrap();
        assert!((v - 600.0 * Calibration::from_divider(470.0).volts_per_count).abs() < 1e-4);
        assert_eq!(m.total_reads(), 1);
    }
}
