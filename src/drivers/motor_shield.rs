//! I²C motor shield driver (WEMOS protocol, TB6612 H-bridges).
//!
//! Two channels on one bus address: A steers, B drives.  Every command is a
//! four-byte write:
//!
//! | Frame      | Byte 0                 | Byte 1    | Byte 2     | Byte 3     |
//! |------------|------------------------|-----------|------------|------------|
//! | frequency  | `(f >> 24) & 0x0F`     | `f >> 16` | `f >> 8`   | `f`        |
//! | motor      | `0x10 \| channel`      | direction | duty hi    | duty lo    |
//!
//! Duty is a percentage times 100 (0..=10000), big-endian.  Stop and short
//! brake frames carry full duty: a low PWM line on the TB6612 brakes the
//! bridge, so a zero-duty stop would not coast.
//!
//! The driver caches the last frame per channel so that re-issuing the same
//! command every control tick costs nothing on the bus.

use embedded_hal::i2c::I2c;
use log::{debug, error, info};

use crate::control::policy::{DriveCommand, SteerCommand};
use crate::error::ActuatorError;

/// Default bus address of the shield.
pub const SHIELD_ADDRESS: u8 = 0x30;

const MOTOR_FRAME_BASE: u8 = 0x10;
const MAX_DUTY_PERCENT: u8 = 100;

/// Bridge channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Channel {
    A = 0,
    B = 1,
}

/// Bridge direction code as understood by the shield firmware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Direction {
    ShortBrake = 0,
    Ccw = 1,
    Cw = 2,
    Stop = 3,
    Standby = 4,
}

/// Frequency frame for the shared PWM timer.
pub fn frequency_frame(hz: u32) -> [u8; 4] {
    let b = hz.to_be_bytes();
    [b[0] & 0x0F, b[1], b[2], b[3]]
}

/// Motor frame.  Duty is clamped to 100 %.
pub fn motor_frame(channel: Channel, direction: Direction, duty_percent: u8) -> [u8; 4] {
    let duty = u16::from(duty_percent.min(MAX_DUTY_PERCENT)) * 100;
    let [hi, lo] = duty.to_be_bytes();
    [MOTOR_FRAME_BASE | channel as u8, direction as u8, hi, lo]
}

/// Duty settings applied to each actuator.
#[derive(Debug, Clone, Copy)]
pub struct DutyProfile {
    pub drive_percent: u8,
    pub steer_percent: u8,
}

pub struct MotorShield<I: I2c> {
    bus: I,
    address: u8,
    profile: DutyProfile,
    last: [Option<[u8; 4]>; 2],
    bus_errors: u32,
}

impl<I: I2c> MotorShield<I> {
    /// Take the bus and program the PWM frequency.
    pub fn new(
        bus: I,
        address: u8,
        pwm_frequency_hz: u32,
        profile: DutyProfile,
    ) -> Result<Self, ActuatorError> {
        let mut shield = Self {
            bus,
            address,
            profile,
            last: [None, None],
            bus_errors: 0,
        };
        shield.write(frequency_frame(pwm_frequency_hz))?;
        info!(
            "motor shield @0x{address:02X}: {pwm_frequency_hz} Hz, drive {}%, steer {}%",
            profile.drive_percent, profile.steer_percent
        );
        Ok(shield)
    }

    /// Apply a drive command on channel B.
    pub fn set_drive(&mut self, cmd: DriveCommand) -> Result<(), ActuatorError> {
        let duty = self.profile.drive_percent;
        let (dir, duty) = match cmd {
            DriveCommand::Forward => (Direction::Ccw, duty),
            DriveCommand::Reverse => (Direction::Cw, duty),
            DriveCommand::Neutral => (Direction::Stop, MAX_DUTY_PERCENT),
            DriveCommand::Brake => (Direction::ShortBrake, MAX_DUTY_PERCENT),
        };
        self.set_motor(Channel::B, dir, duty)
    }

    /// Apply a steering command on channel A.
    pub fn set_steering(&mut self, cmd: SteerCommand) -> Result<(), ActuatorError> {
        let duty = self.profile.steer_percent;
        let (dir, duty) = match cmd {
            SteerCommand::Right => (Direction::Cw, duty),
            SteerCommand::Left => (Direction::Ccw, duty),
            SteerCommand::Centered => (Direction::Stop, MAX_DUTY_PERCENT),
            SteerCommand::Brake => (Direction::ShortBrake, MAX_DUTY_PERCENT),
        };
        self.set_motor(Channel::A, dir, duty)
    }

    /// Write a motor frame unless it equals the cached one.
    pub fn set_motor(
        &mut self,
        channel: Channel,
        direction: Direction,
        duty_percent: u8,
    ) -> Result<(), ActuatorError> {
        let frame = motor_frame(channel, direction, duty_percent);
        let slot = channel as usize;
        if self.last[slot] == Some(frame) {
            return Ok(());
        }

        match self.write(frame) {
            Ok(()) => {
                debug!("motor {channel:?}: {direction:?} {duty_percent}%");
                self.last[slot] = Some(frame);
                Ok(())
            }
            Err(e) => {
                // Forget the cache so the next tick retries.
                self.last[slot] = None;
                Err(e)
            }
        }
    }

    /// Put both bridges into standby.
    pub fn standby(&mut self) -> Result<(), ActuatorError> {
        self.set_motor(Channel::A, Direction::Standby, 0)?;
        self.set_motor(Channel::B, Direction::Standby, 0)
    }

    pub fn bus_errors(&self) -> u32 {
        self.bus_errors
    }

    pub fn bus_mut(&mut self) -> &mut I {
        &mut self.bus
    }

    /// Release the bus.
    pub fn release(self) -> I {
        self.bus
    }

    fn write(&mut self, frame: [u8; 4]) -> Result<(), ActuatorError> {
        self.bus.write(self.address, &frame).map_err(|e| {
            self.bus_errors = self.bus_errors.wrapping_add(1);
            error!("motor shield: I2C write {frame:02X?} failed: {e:?}");
            ActuatorError::BusWriteFailed
        })
    }
}
