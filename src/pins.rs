//! GPIO / peripheral pin assignments for the RC vehicle board
//! (ESP32 DevKit + I²C motor shield).
//!
//! Single source of truth.  Every driver references this module rather
//! than hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Status lamp
// ---------------------------------------------------------------------------

/// On-board LED.  Wired active-low.
pub const STATUS_LED_GPIO: i32 = 2;

// ---------------------------------------------------------------------------
// I²C bus (motor shield at 0x30)
// ---------------------------------------------------------------------------

pub const I2C_SDA_GPIO: i32 = 21;
pub const I2C_SCL_GPIO: i32 = 22;
/// Bus clock.  The shield firmware is happy at standard mode.
pub const I2C_BAUDRATE_HZ: u32 = 100_000;

// ---------------------------------------------------------------------------
// Battery sense (ADC1)
// ---------------------------------------------------------------------------

/// Battery divider tap.  GPIO 34 is ADC1 channel 6 on the ESP32.  The pin
/// has no divider of its own; the board carries the 220k/100k network
/// described in `sensors::battery`.
pub const BATTERY_ADC_GPIO: i32 = 34;
pub const BATTERY_ADC_CHANNEL: u32 = 6;
