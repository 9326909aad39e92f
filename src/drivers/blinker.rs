//! Diagnostic blink encoder.
//!
//! Encodes a small positive code as a count of visible pulses on the
//! status lamp.  A code `c` produces `2c - 1` toggles spaced one
//! half-period apart, starting with the lamp on and ending with it off:
//!
//! ```text
//! code 3:   on ┐  ┌──┐  ┌──┐
//!              └──┘  └──┘  └── idle
//!           t0  +1  +2  +3  +4  +5   (half-periods)
//! ```
//!
//! The encoder owns no thread and no timer.  [`BlinkEncoder::request`] and
//! [`BlinkEncoder::on_timer_fire`] return a [`BlinkStep`] telling the caller
//! what to write to the lamp and whether to arm another one-shot toggle.

use log::debug;

/// What the caller must do after a request or a toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlinkStep {
    /// Logical lamp level to write.
    pub lamp_on: bool,
    /// Arm another half-period one-shot.
    pub reschedule: bool,
}

#[derive(Debug, Default)]
pub struct BlinkEncoder {
    /// Toggles still to run.  Zero means idle.
    remaining: u16,
    lamp_on: bool,
}

impl BlinkEncoder {
    pub const fn new() -> Self {
        Self {
            remaining: 0,
            lamp_on: false,
        }
    }

    /// Start a sequence for `code`.
    ///
    /// Returns `None` (and changes nothing) if a sequence is already
    /// running or `code` is zero.
    pub fn request(&mut self, code: u8) -> Option<BlinkStep> {
        if code == 0 || self.is_active() {
            return None;
        }

        self.remaining = u16::from(code) * 2 - 1;
        self.lamp_on = true;
        debug!("blink: code {code}, {} toggles", self.remaining);

        Some(BlinkStep {
            lamp_on: true,
            reschedule: true,
        })
    }

    /// Advance one toggle.  Called from the deferred timer dispatch.
    ///
    /// A stray fire while idle leaves the lamp off and asks for nothing.
    pub fn on_timer_fire(&mut self) -> BlinkStep {
        if self.remaining == 0 {
            self.lamp_on = false;
            return BlinkStep {
                lamp_on: false,
                reschedule: false,
            };
        }

        self.remaining -= 1;
        // Odd remaining count means the lamp is in an "on" half-period.
        self.lamp_on = self.remaining & 1 == 1;

        BlinkStep {
            lamp_on: self.lamp_on,
            reschedule: self.remaining > 0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.remaining > 0
    }

    pub fn remaining_toggles(&self) -> u16 {
        self.remaining
    }

    /// Lamp level owned by the encoder, `None` while idle.
    ///
    /// A running sequence overrides every other use of the lamp.
    pub fn level(&self) -> Option<bool> {
        self.is_active().then_some(self.lamp_on)
    }
}
