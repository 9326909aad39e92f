//! Integration tests for the VehicleService → FSM → actuators pipeline.
//!
//! Time is simulated: the loop is stepped every 10 ms exactly as the
//! firmware does, with the default configuration (1 s command timeout,
//! 1 s battery sampling, 3 s state reports, 150 ms blink half period).

use super::mock_hw::{MockPlatform, MockVehicle, RecordingSink};

use rcdevice::app::commands::RemoteCommand;
use rcdevice::app::events::AppEvent;
use rcdevice::app::service::VehicleService;
use rcdevice::boot::BootStep;
use rcdevice::config::SystemConfig;
use rcdevice::control::policy::{DriveCommand, SteerCommand};
use rcdevice::error::CommandError;
use rcdevice::fsm::DeviceState;
use rcdevice::fsm::context::CommandTarget;
use rcdevice::sensors::battery::BatteryLevel;

const STEP_MS: u64 = 10;

fn booted(platform: &mut MockPlatform) -> (VehicleService, MockVehicle, RecordingSink) {
    let mut app = VehicleService::new(SystemConfig::default());
    let hw = MockVehicle::new();
    let mut sink = RecordingSink::new();
    app.boot(platform, 0, &mut sink);
    (app, hw, sink)
}

fn ready() -> (VehicleService, MockVehicle, RecordingSink) {
    booted(&mut MockPlatform::healthy())
}

/// Step the loop from `from` to `to` inclusive.
fn run(app: &mut VehicleService, hw: &mut MockVehicle, sink: &mut RecordingSink, from: u64, to: u64) {
    let mut t = from;
    while t <= to {
        hw.now_ms = t;
        app.tick(t, hw, sink);
        t += STEP_MS;
    }
}

/// Step the loop, feeding `cmd` every 100 ms.
fn run_with_commands(
    app: &mut VehicleService,
    hw: &mut MockVehicle,
    sink: &mut RecordingSink,
    from: u64,
    to: u64,
    cmd: RemoteCommand,
) {
    let mut t = from;
    while t <= to {
        if t % 100 == 0 {
            app.accept_command(cmd, t, sink).unwrap();
        }
        hw.now_ms = t;
        app.tick(t, hw, sink);
        t += STEP_MS;
    }
}

// ── Watchdog ──────────────────────────────────────────────────

#[test]
fn silence_times_out_and_a_command_recovers() {
    let (mut app, mut hw, mut sink) = ready();
    assert_eq!(app.current_state(), DeviceState::Ready);

    app.accept_command(RemoteCommand::new(0.5, -0.5), 0, &mut sink).unwrap();
    run(&mut app, &mut hw, &mut sink, 0, 990);
    assert_eq!(app.current_state(), DeviceState::Ready);
    assert_eq!(hw.last_drive(), Some(DriveCommand::Forward));
    assert_eq!(hw.last_steer(), Some(SteerCommand::Left));

    run(&mut app, &mut hw, &mut sink, 1000, 1000);
    assert_eq!(app.current_state(), DeviceState::CommandTimeout);
    assert_eq!(hw.last_drive(), Some(DriveCommand::Brake));
    assert_eq!(hw.last_steer(), Some(SteerCommand::Brake));
    assert_eq!(app.command_target(), CommandTarget::NEUTRAL);
    assert!(sink.events.contains(&AppEvent::StateChanged {
        from: DeviceState::Ready,
        to: DeviceState::CommandTimeout,
    }));

    app.accept_command(RemoteCommand::new(-1.0, 0.0), 1100, &mut sink).unwrap();
    run(&mut app, &mut hw, &mut sink, 1100, 1100);
    assert_eq!(app.current_state(), DeviceState::Ready);
    assert_eq!(hw.last_drive(), Some(DriveCommand::Reverse));
    assert_eq!(hw.last_steer(), Some(SteerCommand::Centered));
}

#[test]
fn steady_commands_keep_the_vehicle_ready() {
    let (mut app, mut hw, mut sink) = ready();
    run_with_commands(
        &mut app,
        &mut hw,
        &mut sink,
        0,
        5000,
        RemoteCommand::new(1.0, 1.0),
    );
    assert_eq!(app.current_state(), DeviceState::Ready);
    assert_eq!(app.transition_count(), 0);
    assert_eq!(hw.last_drive(), Some(DriveCommand::Forward));
    assert!(hw.lamp, "activity lamp lit while moving");
}

#[test]
fn rejected_command_changes_nothing() {
    let (mut app, mut hw, mut sink) = ready();
    app.accept_command(RemoteCommand::new(0.25, 0.0), 0, &mut sink).unwrap();

    assert_eq!(
        app.accept_command(RemoteCommand::new(1.5, 0.0), 900, &mut sink),
        Err(CommandError::OutOfRange)
    );
    assert_eq!(
        app.accept_command(RemoteCommand::new(f32::NAN, 0.0), 900, &mut sink),
        Err(CommandError::OutOfRange)
    );
    assert_eq!(app.command_target().throttle, 0.25);
    assert!(sink.events.contains(&AppEvent::CommandRejected(CommandError::OutOfRange)));

    // The rejected commands did not refresh the watchdog.
    run(&mut app, &mut hw, &mut sink, 0, 1000);
    assert_eq!(app.current_state(), DeviceState::CommandTimeout);
}

// ── Battery ───────────────────────────────────────────────────

#[test]
fn low_battery_is_terminal() {
    let (mut app, mut hw, mut sink) = ready();
    hw.battery_raw = 400; // about 2.9 V

    let cmd = RemoteCommand::new(1.0, 0.0);
    run_with_commands(&mut app, &mut hw, &mut sink, 0, 990, cmd);
    assert_eq!(app.current_state(), DeviceState::Ready);
    assert_eq!(app.current_battery(), BatteryLevel::Unknown);

    // First sample lands at 1000 ms; the trip happens on the next pass.
    run_with_commands(&mut app, &mut hw, &mut sink, 1000, 1010, cmd);
    assert_eq!(app.current_state(), DeviceState::LowBattery);
    assert!(app.current_battery().is_below(4.0));
    assert_eq!(hw.last_drive(), Some(DriveCommand::Brake));

    // Fresh commands and a recovered battery change nothing.
    hw.battery_raw = 1023;
    run_with_commands(&mut app, &mut hw, &mut sink, 1020, 4000, cmd);
    assert_eq!(app.current_state(), DeviceState::LowBattery);
    assert_eq!(hw.last_drive(), Some(DriveCommand::Brake));
    assert_eq!(app.command_target(), CommandTarget::NEUTRAL);
}

#[test]
fn battery_is_sampled_once_per_interval() {
    let (mut app, mut hw, mut sink) = ready();
    run_with_commands(
        &mut app,
        &mut hw,
        &mut sink,
        0,
        4990,
        RemoteCommand::new(0.0, 0.0),
    );
    assert_eq!(hw.battery_reads, 4);
    assert!(app.current_battery().volts().is_some());
}

#[test]
fn recovery_into_low_battery_settles_in_one_pass() {
    let (mut app, mut hw, mut sink) = ready();
    hw.battery_raw = 400;
    // No commands: the watchdog trips at 1000 ms, the same pass samples a
    // low battery.  Low battery is only checked from READY.
    run(&mut app, &mut hw, &mut sink, 0, 1490);
    assert_eq!(app.current_state(), DeviceState::CommandTimeout);

    app.accept_command(RemoteCommand::new(1.0, 0.0), 1500, &mut sink).unwrap();
    run(&mut app, &mut hw, &mut sink, 1500, 1500);
    assert_eq!(app.current_state(), DeviceState::LowBattery);
    assert_eq!(hw.last_drive(), Some(DriveCommand::Brake));
    assert!(sink.events.contains(&AppEvent::StateChanged {
        from: DeviceState::CommandTimeout,
        to: DeviceState::LowBattery,
    }));
}

#[test]
fn failed_battery_read_does_not_park_the_vehicle() {
    let (mut app, mut hw, mut sink) = ready();
    hw.battery_raw = 900; // about 6.6 V
    hw.failing_reads = 1;

    let cmd = RemoteCommand::new(0.5, 0.0);
    run_with_commands(&mut app, &mut hw, &mut sink, 0, 1990, cmd);
    assert_eq!(hw.battery_reads, 1);
    assert_eq!(app.current_battery(), BatteryLevel::Unknown);
    assert_eq!(app.current_state(), DeviceState::Ready);

    run_with_commands(&mut app, &mut hw, &mut sink, 2000, 10_000, cmd);
    assert_eq!(hw.battery_reads, 10);
    assert_eq!(app.current_state(), DeviceState::Ready);
    assert!(!app.current_battery().is_below(4.0));
    assert_eq!(hw.last_drive(), Some(DriveCommand::Forward));
}

// ── Reporting and blink codes ─────────────────────────────────

#[test]
fn ready_reports_without_blinking() {
    let (mut app, mut hw, mut sink) = ready();
    run_with_commands(
        &mut app,
        &mut hw,
        &mut sink,
        0,
        6000,
        RemoteCommand::new(0.0, 0.0),
    );
    assert_eq!(sink.telemetry_count(), 2);
    let t = sink.last_telemetry().unwrap();
    assert_eq!(t.state, DeviceState::Ready);
    assert!(t.battery.volts().is_some());
    assert!(!app.is_blinking());
    assert_eq!(hw.pulses_since(0), 0);
}

#[test]
fn fault_code_three_blinks_three_pulses() {
    let (mut app, mut hw, mut sink) = booted(&mut MockPlatform::failing(BootStep::MountFilesystem));
    assert_eq!(app.current_state(), DeviceState::FilesystemFailed);

    run(&mut app, &mut hw, &mut sink, 0, 2990);
    assert_eq!(hw.pulses_since(0), 0);

    run(&mut app, &mut hw, &mut sink, 3000, 3000);
    assert!(app.is_blinking());
    assert!(hw.lamp);

    run(&mut app, &mut hw, &mut sink, 3010, 4000);
    assert!(!app.is_blinking());
    assert!(!hw.lamp);
    assert_eq!(hw.pulses_since(3000), 3);

    // Five toggles, 150 ms apart, after the initial edge.
    let times: Vec<u64> = hw.lamp_edges.iter().map(|(t, _)| *t).collect();
    assert_eq!(times, vec![3000, 3150, 3300, 3450, 3600, 3750]);
}

#[test]
fn request_during_sequence_is_dropped() {
    let (mut app, mut hw, mut sink) = booted(&mut MockPlatform::failing(BootStep::MountFilesystem));
    run(&mut app, &mut hw, &mut sink, 0, 3200);
    assert!(app.is_blinking());

    assert!(!app.request_blink(5, 3200, &mut hw));

    run(&mut app, &mut hw, &mut sink, 3210, 4500);
    assert_eq!(hw.pulses_since(3000), 3);
}

#[test]
fn code_zero_is_silent() {
    let (mut app, mut hw, _sink) = ready();
    assert!(!app.request_blink(0, 0, &mut hw));
    assert!(!app.is_blinking());
    assert!(hw.lamp_edges.is_empty());
}

#[test]
fn command_timeout_blinks_once_per_report() {
    let (mut app, mut hw, mut sink) = ready();
    run(&mut app, &mut hw, &mut sink, 0, 6500);
    assert_eq!(app.current_state(), DeviceState::CommandTimeout);
    assert_eq!(hw.pulses_since(0), 2);
    let t = sink.last_telemetry().unwrap();
    assert_eq!(t.state, DeviceState::CommandTimeout);
}

#[test]
fn explicit_blink_overrides_activity_lamp() {
    let (mut app, mut hw, mut sink) = ready();
    app.accept_command(RemoteCommand::new(1.0, 0.0), 0, &mut sink).unwrap();
    run(&mut app, &mut hw, &mut sink, 0, 0);
    assert!(hw.lamp, "activity lamp lit while moving");

    assert!(app.request_blink(2, 10, &mut hw));
    run(&mut app, &mut hw, &mut sink, 10, 150);
    assert!(hw.lamp);

    // Code 2 toggles at 160, 310 and 460 ms.
    run(&mut app, &mut hw, &mut sink, 160, 160);
    assert!(!hw.lamp, "sequence owns the lamp while moving");
    run(&mut app, &mut hw, &mut sink, 170, 310);
    assert!(hw.lamp);
    run(&mut app, &mut hw, &mut sink, 320, 460);
    assert!(!app.is_blinking());
    assert!(hw.lamp, "activity takes the lamp back");
}
