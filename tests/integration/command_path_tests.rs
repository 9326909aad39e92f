//! HTTP body → inbox → control loop, end to end on the host.

use super::mock_hw::{MockPlatform, MockVehicle, RecordingSink};

use rcdevice::adapters::http::{TelemetrySnapshot, handle_command_body, render_telemetry};
use rcdevice::app::service::VehicleService;
use rcdevice::config::SystemConfig;
use rcdevice::control::policy::{DriveCommand, SteerCommand};
use rcdevice::fsm::DeviceState;
use rcdevice::inbox::CommandInbox;

#[test]
fn posted_command_drives_the_motors() {
    let mut inbox = CommandInbox::new();
    let (mut tx, mut rx) = inbox.split();

    let mut app = VehicleService::new(SystemConfig::default());
    let mut hw = MockVehicle::new();
    let mut sink = RecordingSink::new();
    app.boot(&mut MockPlatform::healthy(), 0, &mut sink);

    let reply = handle_command_body(br#"{"Throttle": -1, "Steering": 0.5}"#, &mut tx);
    assert_eq!(reply.status, 200);

    let now = 100;
    let taken = rx.drain(|cmd| {
        app.accept_command(cmd, now, &mut sink).unwrap();
    });
    assert_eq!(taken, 1);
    app.tick(now, &mut hw, &mut sink);

    assert_eq!(hw.last_drive(), Some(DriveCommand::Reverse));
    assert_eq!(hw.last_steer(), Some(SteerCommand::Right));
}

#[test]
fn rejected_bodies_never_reach_the_loop() {
    let mut inbox = CommandInbox::new();
    let (mut tx, mut rx) = inbox.split();

    for body in [
        &b""[..],
        br#"{"Throttle": 1}"#,
        br#"{"Throttle": 1, "Steering": -1.01}"#,
        b"[1, 2]",
    ] {
        assert_eq!(handle_command_body(body, &mut tx).status, 400);
    }
    assert_eq!(rx.pending(), 0);
}

#[test]
fn telemetry_snapshot_follows_the_loop() {
    let snapshot = TelemetrySnapshot::new();
    let mut app = VehicleService::new(SystemConfig::default());
    let mut hw = MockVehicle::new();
    let mut sink = RecordingSink::new();
    app.boot(&mut MockPlatform::healthy(), 0, &mut sink);

    for t in (0..=1000).step_by(10) {
        app.tick(t, &mut hw, &mut sink);
        snapshot.publish(app.build_telemetry());
    }

    let latest = snapshot.latest();
    assert_eq!(latest.state, DeviceState::CommandTimeout);
    let body = render_telemetry(&latest).unwrap();
    assert!(body.contains(r#""State":"COMMAND_TIMEOUT""#), "{body}");
    assert!(!body.contains("-1.0"), "battery sampled at 1000 ms: {body}");
}
