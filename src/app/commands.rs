//! Inbound commands to the application service.
//!
//! The only thing the outside world can ask of the vehicle is a new
//! throttle/steering pair.  Transports deserialize into [`RemoteCommand`]
//! and hand it to [`VehicleService::accept_command`](super::service::VehicleService::accept_command),
//! usually through the [`inbox`](crate::inbox).

use serde::{Deserialize, Serialize};

use crate::error::CommandError;
use crate::fsm::context::CommandTarget;

/// Remote drive command as carried on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RemoteCommand {
    /// -1: backward, 0: stop, 1: forward
    #[serde(rename = "Throttle")]
    pub throttle: f32,
    /// -1: left, 0: straight, 1: right
    #[serde(rename = "Steering")]
    pub steering: f32,
}

impl RemoteCommand {
    pub const fn new(throttle: f32, steering: f32) -> Self {
        Self { throttle, steering }
    }

    /// Range-check both axes.  Pure; safe to call from a transport thread
    /// to answer the client before the loop sees the command.
    pub fn validate(&self) -> Result<CommandTarget, CommandError> {
        CommandTarget::new(self.throttle, self.steering)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_maps_to_target() {
        let t = RemoteCommand::new(0.5, -1.0).validate().unwrap();
        assert_eq!(t.throttle, 0.5);
        assert_eq!(t.steering, -1.0);
    }

    #[test]
    fn validate_rejects_out_of_range() {
        assert_eq!(
            RemoteCommand::new(-1.5, 0.0).validate(),
            Err(CommandError::OutOfRange)
        );
    }
}
