//! Hardware adapter: bridges real peripherals to domain port traits.
//!
//! Owns the motor shield and the status lamp and exposes them through
//! [`ActuatorPort`]; reads the battery divider for [`BatteryPort`].  This
//! is the only module in the system that touches actual hardware.
//!
//! Port calls are fire-and-forget: bus and GPIO errors are logged by the
//! drivers and counted here, never propagated into the state machine.  The
//! next tick re-issues the same command, which doubles as the retry.

use embedded_hal::digital::OutputPin;
use embedded_hal::i2c::I2c;

use crate::app::ports::{ActuatorPort, BatteryPort};
use crate::control::policy::{DriveCommand, SteerCommand};
use crate::drivers::motor_shield::MotorShield;
use crate::drivers::status_led::StatusLamp;
use crate::error::{ActuatorError, PlatformError};
use crate::sensors::battery;

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter<I: I2c, P: OutputPin> {
    shield: MotorShield<I>,
    lamp: StatusLamp<P>,
    faults: u32,
}

impl<I: I2c, P: OutputPin> HardwareAdapter<I, P> {
    pub fn new(shield: MotorShield<I>, lamp: StatusLamp<P>) -> Self {
        Self {
            shield,
            lamp,
            faults: 0,
        }
    }

    /// Actuator writes that failed since startup.
    pub fn fault_count(&self) -> u32 {
        self.faults
    }

    pub fn lamp_is_on(&self) -> bool {
        self.lamp.is_on()
    }

    fn absorb(&mut self, res: Result<(), ActuatorError>) {
        if res.is_err() {
            self.faults = self.faults.wrapping_add(1);
        }
    }
}

// ── ActuatorPort implementation ───────────────────────────────

impl<I: I2c, P: OutputPin> ActuatorPort for HardwareAdapter<I, P> {
    fn set_drive(&mut self, cmd: DriveCommand) {
        let res = self.shield.set_drive(cmd);
        self.absorb(res);
    }

    fn set_steering(&mut self, cmd: SteerCommand) {
        let res = self.shield.set_steering(cmd);
        self.absorb(res);
    }

    fn set_indicator(&mut self, on: bool) {
        let res = self.lamp.set(on);
        self.absorb(res);
    }
}

// ── BatteryPort implementation ────────────────────────────────

impl<I: I2c, P: OutputPin> BatteryPort for HardwareAdapter<I, P> {
    fn read_battery_raw(&mut self) -> Result<u16, PlatformError> {
        battery::read_raw()
    }
}
