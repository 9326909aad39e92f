//! Single-colour status lamp.
//!
//! One GPIO, generic over [`embedded_hal::digital::OutputPin`].  The
//! on-board LED is wired active-low, so "on" drives the pin low unless the
//! lamp is built with [`Polarity::ActiveHigh`].
//!
//! The lamp remembers its logical level so the service can skip redundant
//! writes and tests can inspect it.

use embedded_hal::digital::OutputPin;
use log::error;

use crate::error::ActuatorError;

/// Electrical level that lights the lamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    ActiveLow,
    ActiveHigh,
}

pub struct StatusLamp<P: OutputPin> {
    pin: P,
    polarity: Polarity,
    lit: Option<bool>,
}

impl<P: OutputPin> StatusLamp<P> {
    /// Wrap `pin` and switch the lamp off.
    pub fn new(pin: P, polarity: Polarity) -> Result<Self, ActuatorError> {
        let mut lamp = Self {
            pin,
            polarity,
            lit: None,
        };
        lamp.set(false)?;
        Ok(lamp)
    }

    /// Set the logical level.  Repeated calls with the same level do not
    /// touch the pin.
    pub fn set(&mut self, on: bool) -> Result<(), ActuatorError> {
        if self.lit == Some(on) {
            return Ok(());
        }

        let drive_high = match self.polarity {
            Polarity::ActiveLow => !on,
            Polarity::ActiveHigh => on,
        };
        let res = if drive_high {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        res.map_err(|e| {
            error!("status lamp: GPIO write failed: {e:?}");
            ActuatorError::GpioWriteFailed
        })?;

        self.lit = Some(on);
        Ok(())
    }

    pub fn is_on(&self) -> bool {
        self.lit.unwrap_or(false)
    }
}
