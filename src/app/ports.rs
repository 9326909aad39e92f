//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ VehicleService (domain)
//! ```
//!
//! Driven adapters (clock, battery ADC, motors, lamp, platform bring-up,
//! event sinks) implement these traits.  The
//! [`VehicleService`](super::service::VehicleService) consumes them via
//! generics, so the domain core never touches hardware directly.

use crate::control::policy::{DriveCommand, SteerCommand};
use crate::error::PlatformError;

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Monotonic millisecond clock.
pub trait ClockPort {
    fn now_ms(&self) -> u64;
}

// ───────────────────────────────────────────────────────────────
// Battery port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port for the battery divider.
pub trait BatteryPort {
    /// One raw 10-bit ADC sample.  A failed conversion is an error, never a
    /// zero reading.
    fn read_battery_raw(&mut self) -> Result<u16, PlatformError>;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port.  Every call is idempotent and may be repeated every
/// tick; implementations absorb and log their own bus errors.
pub trait ActuatorPort {
    fn set_drive(&mut self, cmd: DriveCommand);

    fn set_steering(&mut self, cmd: SteerCommand);

    /// Logical level of the shared status lamp.
    fn set_indicator(&mut self, on: bool);
}

// ───────────────────────────────────────────────────────────────
// Boot port (driven adapter: domain → platform bring-up)
// ───────────────────────────────────────────────────────────────

/// Platform subsystems started once, in order, during boot.
///
/// The boot sequence stops at the first error; later methods are then
/// never called.
pub trait BootPort {
    /// Mount the static-asset filesystem.
    fn mount_filesystem(&mut self) -> Result<(), PlatformError>;

    /// Bring up the Wi-Fi access point with its fixed address.
    fn start_access_point(&mut self) -> Result<(), PlatformError>;

    /// Make the device reachable under its configured name.
    fn start_name_service(&mut self) -> Result<(), PlatformError>;

    /// Start serving the command and telemetry endpoints.
    fn start_command_server(&mut self) -> Result<(), PlatformError>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Configuration problems.
///
/// Invalid ranges are rejected with [`ConfigError::ValidationFailed`],
/// never silently clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
        }
    }
}
