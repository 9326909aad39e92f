//! Shared mutable context threaded through the state machine and the
//! actuator policy.
//!
//! `ControlContext` is the one struct holding everything the control loop
//! reads and writes: the device state, the last accepted command, the
//! command watchdog, the latest battery level, the current time and the
//! configuration.  It is owned by the loop driver and never shared across
//! threads, so none of it needs a lock.

use crate::config::SystemConfig;
use crate::error::CommandError;
use crate::fsm::DeviceState;
use crate::safety::CommandWatchdog;
use crate::sensors::battery::BatteryLevel;

// ---------------------------------------------------------------------------
// Command target (written by command ingestion; read by actuator policy)
// ---------------------------------------------------------------------------

/// The most recently accepted throttle/steering pair.
///
/// `-1` / `+1` are the directional extremes, `0` is neutral.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CommandTarget {
    /// -1: backward, 0: stop, 1: forward
    pub throttle: f32,
    /// -1: left, 0: straight, 1: right
    pub steering: f32,
}

impl CommandTarget {
    /// Both axes at rest.
    pub const NEUTRAL: Self = Self {
        throttle: 0.0,
        steering: 0.0,
    };

    /// Build a target, rejecting anything outside `[-1.0, 1.0]`.
    ///
    /// NaN fails both comparisons and is therefore rejected too.
    pub fn new(throttle: f32, steering: f32) -> Result<Self, CommandError> {
        if !(-1.0..=1.0).contains(&throttle) || !(-1.0..=1.0).contains(&steering) {
            return Err(CommandError::OutOfRange);
        }
        Ok(Self { throttle, steering })
    }

    /// True if either axis asks for motion.
    pub fn is_moving(&self) -> bool {
        self.throttle != 0.0 || self.steering != 0.0
    }
}

// ---------------------------------------------------------------------------
// ControlContext
// ---------------------------------------------------------------------------

/// The shared context passed to every transition guard and to the
/// actuator policy.
pub struct ControlContext {
    // -- Mode --
    /// Current operational mode.  Only the boot sequence and the state
    /// machine write it.
    pub state: DeviceState,

    // -- Command --
    /// Last accepted command.
    pub target: CommandTarget,
    /// Tracks time since the last accepted command.
    pub watchdog: CommandWatchdog,

    // -- Sensor data --
    /// Latest calibrated battery level.
    pub battery: BatteryLevel,

    // -- Timing --
    /// Monotonic time of the current loop iteration (ms).
    pub now_ms: u64,

    // -- Configuration --
    pub config: SystemConfig,
}

impl ControlContext {
    /// Fresh context: `INITIALIZING`, at rest, battery unknown.
    pub fn new(config: SystemConfig) -> Self {
        Self {
            state: DeviceState::Initializing,
            target: CommandTarget::NEUTRAL,
            watchdog: CommandWatchdog::new(config.command_timeout_ms),
            battery: BatteryLevel::Unknown,
            now_ms: 0,
            config,
        }
    }

    /// Milliseconds since the last accepted command.
    pub fn ms_since_command(&self) -> u64 {
        self.watchdog.elapsed_ms(self.now_ms)
    }

    /// True once the watchdog threshold has been reached.
    pub fn command_is_stale(&self) -> bool {
        self.watchdog.is_stale(self.now_ms)
    }

    /// True if a battery sample exists and is below the configured limit.
    pub fn battery_is_low(&self) -> bool {
        self.battery.is_below(self.config.battery_limit_volts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_accepts_closed_range() {
        assert!(CommandTarget::new(-1.0, 1.0).is_ok());
        assert!(CommandTarget::new(0.0, 0.0).is_ok());
    }

    #[test]
    fn target_rejects_out_of_range_and_nan() {
        assert_eq!(CommandTarget::new(1.01, 0.0), Err(CommandError::OutOfRange));
        assert_eq!(CommandTarget::new(0.0, -1.5), Err(CommandError::OutOfRange));
        assert_eq!(CommandTarget::new(f32::NAN, 0.0), Err(CommandError::OutOfRange));
        assert_eq!(
            CommandTarget::new(0.0, f32::INFINITY),
            Err(CommandError::OutOfRange)
        );
    }

    #[test]
    fn moving_iff_any_axis_nonzero() {
        assert!(!CommandTarget::NEUTRAL.is_moving());
        assert!(CommandTarget::new(0.0, -0.2).unwrap().is_moving());
        assert!(CommandTarget::new(0.3, 0.0).unwrap().is_moving());
    }

    #[test]
    fn unknown_battery_is_never_low() {
        let ctx = ControlContext::new(SystemConfig::default());
        assert!(!ctx.battery_is_low());
    }
}
