//! Mock adapters for integration tests.
//!
//! Records every actuator call and every lamp edge so tests can assert on
//! the full history without touching real I²C or GPIO.

use rcdevice::app::events::AppEvent;
use rcdevice::app::ports::{ActuatorPort, BatteryPort, BootPort, EventSink};
use rcdevice::boot::BootStep;
use rcdevice::control::policy::{DriveCommand, SteerCommand};
use rcdevice::error::PlatformError;

// ── Actuator call record ──────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ActuatorCall {
    Drive(DriveCommand),
    Steer(SteerCommand),
}

// ── MockVehicle ───────────────────────────────────────────────

/// Motors, lamp and battery divider.
pub struct MockVehicle {
    pub calls: Vec<ActuatorCall>,
    /// Lamp level after every change, with the time it happened.
    pub lamp_edges: Vec<(u64, bool)>,
    pub lamp: bool,
    pub battery_raw: u16,
    pub battery_reads: u32,
    /// Upcoming reads that fail before the divider answers again.
    pub failing_reads: u32,
    /// Stamped onto lamp edges; tests keep it in step with `tick`.
    pub now_ms: u64,
}

#[allow(dead_code)]
impl MockVehicle {
    /// Full charge: raw 1023 reads as about 7.5 V.
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            lamp_edges: Vec::new(),
            lamp: false,
            battery_raw: 1023,
            battery_reads: 0,
            failing_reads: 0,
            now_ms: 0,
        }
    }

    pub fn last_drive(&self) -> Option<DriveCommand> {
        self.calls.iter().rev().find_map(|c| match c {
            ActuatorCall::Drive(d) => Some(*d),
            ActuatorCall::Steer(_) => None,
        })
    }

    pub fn last_steer(&self) -> Option<SteerCommand> {
        self.calls.iter().rev().find_map(|c| match c {
            ActuatorCall::Steer(s) => Some(*s),
            ActuatorCall::Drive(_) => None,
        })
    }

    /// Number of off-to-on lamp edges at or after `since_ms`.
    pub fn pulses_since(&self, since_ms: u64) -> usize {
        self.lamp_edges
            .iter()
            .filter(|(t, on)| *t >= since_ms && *on)
            .count()
    }
}

impl Default for MockVehicle {
    fn default() -> Self {
        Self::new()
    }
}

impl ActuatorPort for MockVehicle {
    fn set_drive(&mut self, cmd: DriveCommand) {
        self.calls.push(ActuatorCall::Drive(cmd));
    }

    fn set_steering(&mut self, cmd: SteerCommand) {
        self.calls.push(ActuatorCall::Steer(cmd));
    }

    fn set_indicator(&mut self, on: bool) {
        if on != self.lamp {
            self.lamp = on;
            self.lamp_edges.push((self.now_ms, on));
        }
    }
}

impl BatteryPort for MockVehicle {
    fn read_battery_raw(&mut self) -> Result<u16, PlatformError> {
        self.battery_reads += 1;
        if self.failing_reads > 0 {
            self.failing_reads -= 1;
            return Err(PlatformError::Status(-1));
        }
        Ok(self.battery_raw)
    }
}

// ── MockPlatform ──────────────────────────────────────────────

/// Boot port that can be told to fail one step.
pub struct MockPlatform {
    pub fail_at: Option<BootStep>,
    pub started: Vec<BootStep>,
}

#[allow(dead_code)]
impl MockPlatform {
    pub fn healthy() -> Self {
        Self {
            fail_at: None,
            started: Vec::new(),
        }
    }

    pub fn failing(step: BootStep) -> Self {
        Self {
            fail_at: Some(step),
            started: Vec::new(),
        }
    }

    fn run(&mut self, step: BootStep) -> Result<(), PlatformError> {
        self.started.push(step);
        if self.fail_at == Some(step) {
            Err(PlatformError::Status(-1))
        } else {
            Ok(())
        }
    }
}

impl BootPort for MockPlatform {
    fn mount_filesystem(&mut self) -> Result<(), PlatformError> {
        self.run(BootStep::MountFilesystem)
    }

    fn start_access_point(&mut self) -> Result<(), PlatformError> {
        self.run(BootStep::StartAccessPoint)
    }

    fn start_name_service(&mut self) -> Result<(), PlatformError> {
        self.run(BootStep::StartNameService)
    }

    fn start_command_server(&mut self) -> Result<(), PlatformError> {
        self.run(BootStep::StartCommandServer)
    }
}

// ── Event sink ────────────────────────────────────────────────

/// Event sink that records everything emitted.
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn telemetry_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, AppEvent::Telemetry(_)))
            .count()
    }

    pub fn last_telemetry(&self) -> Option<rcdevice::app::events::TelemetryData> {
        self.events.iter().rev().find_map(|e| match e {
            AppEvent::Telemetry(t) => Some(*t),
            _ => None,
        })
    }
}

impl Default for RecordingSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(*event);
    }
}
