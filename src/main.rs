//! RC vehicle firmware: main entry point.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    Adapters (outer ring)                     │
//! │                                                              │
//! │  HardwareAdapter       Platform            LogEventSink      │
//! │  (Actuator+Battery)    (Boot: fs, AP,      (EventSink)       │
//! │                         mDNS, HTTP)        UptimeClock       │
//! │                                                              │
//! │  ──────────────── Port Trait Boundary ───────────────────    │
//! │                                                              │
//! │  ┌────────────────────────────────────────────────────────┐  │
//! │  │            VehicleService (pure logic)                 │  │
//! │  │  FSM · Watchdog · Battery · Policy · Blink · Timers    │  │
//! │  └────────────────────────────────────────────────────────┘  │
//! │                                                              │
//! │  HTTP task ──▶ CommandInbox ──▶ control loop                 │
//! └──────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::time::Duration;

use anyhow::Result;
use log::{error, info};

use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::hal::gpio::PinDriver;
use esp_idf_svc::hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::hal::units::Hertz;
use esp_idf_svc::nvs::EspDefaultNvsPartition;

use rcdevice::adapters::filesystem::MOUNT_POINT;
use rcdevice::adapters::hardware::HardwareAdapter;
use rcdevice::adapters::http::{CommandServer, TelemetrySnapshot};
use rcdevice::adapters::log_sink::LogEventSink;
use rcdevice::adapters::platform::Platform;
use rcdevice::adapters::time::UptimeClock;
use rcdevice::adapters::wifi::{AccessPoint, Radio};
use rcdevice::app::ports::ClockPort;
use rcdevice::app::service::VehicleService;
use rcdevice::config::SystemConfig;
use rcdevice::drivers::hw_init;
use rcdevice::drivers::motor_shield::{DutyProfile, MotorShield, SHIELD_ADDRESS};
use rcdevice::drivers::status_led::{Polarity, StatusLamp};
use rcdevice::inbox::CommandInbox;
use rcdevice::pins;

// The HAL hands out pins as distinct types; keep them in step with pins.rs.
const _: () = assert!(pins::I2C_SDA_GPIO == 21 && pins::I2C_SCL_GPIO == 22);
const _: () = assert!(pins::STATUS_LED_GPIO == 2);

/// Park forever after an unrecoverable start-up error.
fn halt(what: &str) -> ! {
    error!("{what}; halting");
    loop {
        std::thread::sleep(Duration::from_secs(1));
    }
}

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("rcdevice v{}", env!("CARGO_PKG_VERSION"));

    // ── 2. Configuration ──────────────────────────────────────
    let config = SystemConfig::default();
    if let Err(e) = config.validate() {
        halt(&format!("config {e}"));
    }

    // ── 3. Hardware ───────────────────────────────────────────
    if let Err(e) = hw_init::init_peripherals() {
        halt(&format!("HAL init failed: {e}"));
    }

    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;

    info!(
        "pins: lamp GPIO{}, I2C SDA GPIO{} SCL GPIO{}, battery GPIO{}",
        pins::STATUS_LED_GPIO,
        pins::I2C_SDA_GPIO,
        pins::I2C_SCL_GPIO,
        pins::BATTERY_ADC_GPIO
    );

    // gpio21 = pins::I2C_SDA_GPIO, gpio22 = pins::I2C_SCL_GPIO
    let i2c = I2cDriver::new(
        peripherals.i2c0,
        peripherals.pins.gpio21,
        peripherals.pins.gpio22,
        &I2cConfig::new().baudrate(Hertz(pins::I2C_BAUDRATE_HZ)),
    )?;
    let shield = MotorShield::new(
        i2c,
        SHIELD_ADDRESS,
        config.motor_pwm_frequency_hz,
        DutyProfile {
            drive_percent: config.drive_duty_percent,
            steer_percent: config.steer_duty_percent,
        },
    )
    .map_err(anyhow::Error::msg)?;
    // gpio2 = pins::STATUS_LED_GPIO
    let lamp = StatusLamp::new(PinDriver::output(peripherals.pins.gpio2)?, Polarity::ActiveLow)
        .map_err(anyhow::Error::msg)?;
    let mut hw = HardwareAdapter::new(shield, lamp);

    // ── 4. Command path ───────────────────────────────────────
    let inbox: &'static mut CommandInbox = Box::leak(Box::new(CommandInbox::new()));
    let (tx, mut rx) = inbox.split();
    let snapshot = TelemetrySnapshot::new();

    let ap = AccessPoint::new(
        &config,
        Radio {
            modem: peripherals.modem,
            sysloop,
            nvs: Some(nvs),
        },
    );
    let http = CommandServer::new(config.http_port, MOUNT_POINT, tx, snapshot.clone());
    let mut platform = Platform::new(&config, ap, http);

    // ── 5. Boot ───────────────────────────────────────────────
    let clock = UptimeClock::new();
    let mut sink = LogEventSink::new();
    let mut app = VehicleService::new(config.clone());
    app.boot(&mut platform, clock.now_ms(), &mut sink);
    snapshot.publish(app.build_telemetry());

    // ── 6. Control loop ───────────────────────────────────────
    info!("System ready. Entering control loop.");
    let interval = Duration::from_millis(u64::from(config.control_loop_interval_ms));

    loop {
        let now = clock.now_ms();

        // Rejections are logged and emitted by the service.
        rx.drain(|cmd| {
            let _ = app.accept_command(cmd, now, &mut sink);
        });

        app.tick(now, &mut hw, &mut sink);
        snapshot.publish(app.build_telemetry());

        std::thread::sleep(interval);
    }
}
