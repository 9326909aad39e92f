//! Actuator policy.
//!
//! Maps `(DeviceState, CommandTarget)` to one drive command, one steering
//! command and the local activity indicator.  Recomputed from scratch on
//! every tick; nothing is sticky except the command target itself.
//!
//! | State      | Drive                 | Steering               | Activity     |
//! |------------|-----------------------|------------------------|--------------|
//! | READY      | sign(throttle)        | sign(steering)         | any axis ≠ 0 |
//! | any other  | Brake                 | Brake                  | off          |
//!
//! Outside `READY` the command target is also reset to neutral so that a
//! later return to `READY` starts from rest instead of replaying a stale
//! command.

use log::debug;

use crate::fsm::DeviceState;
use crate::fsm::context::{CommandTarget, ControlContext};

/// Drive motor command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriveCommand {
    Forward,
    Reverse,
    /// Coast, outputs off.
    Neutral,
    /// Short-circuit brake.
    Brake,
}

/// Steering motor command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SteerCommand {
    Right,
    Left,
    Centered,
    /// Short-circuit brake.
    Brake,
}

/// Everything the policy decides for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActuatorCommands {
    pub drive: DriveCommand,
    pub steer: SteerCommand,
    /// Requested level of the activity indicator (lamp on while moving).
    pub activity: bool,
}

impl ActuatorCommands {
    /// Both motors braking, lamp off.
    pub const FAIL_SAFE: Self = Self {
        drive: DriveCommand::Brake,
        steer: SteerCommand::Brake,
        activity: false,
    };
}

/// Pure mapping from state and target to actuator commands.
///
/// Exact zero is neutral; there is no dead-band.
pub fn derive_commands(state: DeviceState, target: CommandTarget) -> ActuatorCommands {
    if !state.is_nominal() {
        return ActuatorCommands::FAIL_SAFE;
    }

    let drive = if target.throttle > 0.0 {
        DriveCommand::Forward
    } else if target.throttle < 0.0 {
        DriveCommand::Reverse
    } else {
        DriveCommand::Neutral
    };

    let steer = if target.steering > 0.0 {
        SteerCommand::Right
    } else if target.steering < 0.0 {
        SteerCommand::Left
    } else {
        SteerCommand::Centered
    };

    ActuatorCommands {
        drive,
        steer,
        activity: target.is_moving(),
    }
}

/// Per-tick actuator update.  Applies the fail-safe side effect on the
/// context and returns the commands to drive.
pub fn update_actuators(ctx: &mut ControlContext) -> ActuatorCommands {
    let commands = derive_commands(ctx.state, ctx.target);

    if !ctx.state.is_nominal() && ctx.target != CommandTarget::NEUTRAL {
        debug!("policy: {}, discarding command {:?}", ctx.state, ctx.target);
        ctx.target = CommandTarget::NEUTRAL;
    }

    commands
}
