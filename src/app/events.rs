//! Outbound application events.
//!
//! The [`VehicleService`](super::service::VehicleService) emits these
//! through the [`EventSink`](super::ports::EventSink) port.  Adapters on
//! the other side decide what to do with them: print to the serial
//! console, refresh the HTTP telemetry snapshot, record them in a test.

use crate::error::{BootFault, CommandError};
use crate::fsm::DeviceState;
use crate::sensors::battery::BatteryLevel;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppEvent {
    /// Periodic state report.
    Telemetry(TelemetryData),

    /// The device state changed at runtime.
    StateChanged { from: DeviceState, to: DeviceState },

    /// Boot finished; carries the resulting state (`READY` or a fault).
    Booted(DeviceState),

    /// A boot stage failed and the device is parked.
    BootFailed(BootFault),

    /// An inbound command was rejected at the boundary.
    CommandRejected(CommandError),
}

/// A point-in-time report suitable for logging or transmission.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TelemetryData {
    pub state: DeviceState,
    pub battery: BatteryLevel,
    pub throttle: f32,
    pub steering: f32,
}
