//! Boot sequence through the service: step ordering, short-circuit on the
//! first failure, and what a parked device keeps doing afterwards.

use super::mock_hw::{MockPlatform, MockVehicle, RecordingSink};

use rcdevice::app::events::AppEvent;
use rcdevice::app::service::VehicleService;
use rcdevice::boot::BootStep;
use rcdevice::config::SystemConfig;
use rcdevice::error::BootFault;
use rcdevice::fsm::DeviceState;
use rcdevice::sensors::battery::BatteryLevel;

fn boot_with(platform: &mut MockPlatform) -> (VehicleService, RecordingSink, DeviceState) {
    let mut app = VehicleService::new(SystemConfig::default());
    let mut sink = RecordingSink::new();
    let state = app.boot(platform, 0, &mut sink);
    (app, sink, state)
}

#[test]
fn healthy_platform_boots_ready_in_order() {
    let mut platform = MockPlatform::healthy();
    let (_app, sink, state) = boot_with(&mut platform);
    assert_eq!(state, DeviceState::Ready);
    assert_eq!(platform.started, BootStep::ORDER.to_vec());
    assert_eq!(sink.events, vec![AppEvent::Booted(DeviceState::Ready)]);
}

#[test]
fn each_failure_parks_in_its_fault_state() {
    let cases = [
        (BootStep::MountFilesystem, DeviceState::FilesystemFailed, 1),
        (BootStep::StartAccessPoint, DeviceState::WifiFailed, 2),
        (BootStep::StartNameService, DeviceState::DnsFailed, 3),
        (BootStep::StartCommandServer, DeviceState::WifiFailed, 4),
    ];
    for (step, expected, attempted) in cases {
        let mut platform = MockPlatform::failing(step);
        let (_app, sink, state) = boot_with(&mut platform);
        assert_eq!(state, expected, "{step:?}");
        assert_eq!(platform.started.len(), attempted, "{step:?} must short-circuit");
        assert_eq!(platform.started.last(), Some(&step));
        assert!(sink.events.contains(&AppEvent::BootFailed(step.fault())));
        assert_eq!(sink.events.last(), Some(&AppEvent::Booted(expected)));
    }
}

#[test]
fn second_boot_changes_nothing() {
    let mut platform = MockPlatform::failing(BootStep::StartNameService);
    let (mut app, mut sink, _) = boot_with(&mut platform);

    let mut healthy = MockPlatform::healthy();
    assert_eq!(app.boot(&mut healthy, 50, &mut sink), DeviceState::DnsFailed);
    assert!(healthy.started.is_empty());
}

#[test]
fn parked_device_reports_and_blinks_its_code() {
    let mut platform = MockPlatform::failing(BootStep::StartNameService);
    let (mut app, mut sink, _) = boot_with(&mut platform);
    let mut hw = MockVehicle::new();

    let mut t = 0;
    while t <= 5000 {
        hw.now_ms = t;
        app.tick(t, &mut hw, &mut sink);
        t += 10;
    }

    // DNS_FAILED is code 5: nine toggles from 3000 ms, done by 4350 ms.
    assert_eq!(hw.pulses_since(3000), 5);
    assert!(!app.is_blinking());

    // Sampling never started, so the battery stays unknown.
    assert_eq!(hw.battery_reads, 0);
    let report = sink.last_telemetry().unwrap();
    assert_eq!(report.state, DeviceState::DnsFailed);
    assert_eq!(report.battery, BatteryLevel::Unknown);
    assert_eq!(report.battery.as_reported(), -1.0);
}

#[test]
fn parked_device_never_moves() {
    let mut platform = MockPlatform::failing(BootStep::StartAccessPoint);
    let (mut app, mut sink, _) = boot_with(&mut platform);
    let mut hw = MockVehicle::new();

    let cmd = rcdevice::app::commands::RemoteCommand::new(1.0, 1.0);
    for t in (0..2000).step_by(10) {
        app.accept_command(cmd, t, &mut sink).unwrap();
        app.tick(t, &mut hw, &mut sink);
    }

    assert_eq!(app.current_state(), DeviceState::WifiFailed);
    assert!(hw.calls.iter().all(|c| matches!(
        c,
        super::mock_hw::ActuatorCall::Drive(rcdevice::control::policy::DriveCommand::Brake)
            | super::mock_hw::ActuatorCall::Steer(rcdevice::control::policy::SteerCommand::Brake)
    )));
    assert_eq!(BootFault::Wifi.state(), DeviceState::WifiFailed);
}
