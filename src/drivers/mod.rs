//! Actuator drivers, hardware initialisation, and the blink encoder.

pub mod blinker;
pub mod hw_init;
pub mod motor_shield;
pub mod status_led;
