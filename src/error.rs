//! Error types for the RC device firmware.
//!
//! One small enum per subsystem.  All are `Copy` so they pass through the
//! service without allocation.
//!
//! None of these ever leave the core as a secondary failure channel: boot
//! faults become a terminal [`DeviceState`](crate::fsm::DeviceState),
//! rejected commands leave state untouched, and actuator bus errors are
//! logged and retried on the next tick.

use core::fmt;

use crate::fsm::DeviceState;

// ---------------------------------------------------------------------------
// Boot faults
// ---------------------------------------------------------------------------

/// The first boot stage that failed.  Each maps onto exactly one terminal
/// fault state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootFault {
    Filesystem,
    Wifi,
    Dns,
}

impl BootFault {
    /// The terminal device state this fault parks the machine in.
    pub const fn state(self) -> DeviceState {
        match self {
            Self::Filesystem => DeviceState::FilesystemFailed,
            Self::Wifi => DeviceState::WifiFailed,
            Self::Dns => DeviceState::DnsFailed,
        }
    }
}

impl fmt::Display for BootFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Filesystem => write!(f, "filesystem mount failed"),
            Self::Wifi => write!(f, "WiFi access point failed"),
            Self::Dns => write!(f, "name service failed"),
        }
    }
}

/// Raw failure reported by a platform bring-up step.  The boot sequence
/// decides which [`BootFault`] it becomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformError {
    /// Vendor call returned a non-OK status code.
    Status(i32),
    /// A required argument could not be represented by the vendor API.
    InvalidArgument(&'static str),
    /// The subsystem is not available on this target.
    Unsupported,
}

impl fmt::Display for PlatformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status(rc) => write!(f, "vendor call failed (rc={rc})"),
            Self::InvalidArgument(what) => write!(f, "invalid argument: {what}"),
            Self::Unsupported => write!(f, "unsupported on this target"),
        }
    }
}

// ---------------------------------------------------------------------------
// Command errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandError {
    /// Throttle or steering outside `[-1.0, 1.0]` (NaN included).
    OutOfRange,
    /// Payload is not JSON.
    Malformed,
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfRange => write!(f, "value(s) out of range"),
            Self::Malformed => write!(f, "malformed command"),
        }
    }
}

// ---------------------------------------------------------------------------
// Actuator errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorError {
    /// I2C write to the motor shield failed.
    BusWriteFailed,
    /// GPIO set on the status lamp failed.
    GpioWriteFailed,
}

impl fmt::Display for ActuatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BusWriteFailed => write!(f, "I2C write failed"),
            Self::GpioWriteFailed => write!(f, "GPIO write failed"),
        }
    }
}

// ---------------------------------------------------------------------------
// Scheduler / inbox errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerError {
    QueueFull,
}

impl fmt::Display for SchedulerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::QueueFull => write!(f, "timer queue full"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InboxError {
    Full,
}

impl fmt::Display for InboxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full => write!(f, "command inbox full"),
        }
    }
}
