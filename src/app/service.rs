//! Application service: the hexagonal core.
//!
//! [`VehicleService`] owns the state machine, the control context, the
//! battery monitor, the blink encoder and the deferred timer queue.  It
//! exposes a hardware-agnostic API.  All I/O flows through port traits
//! injected at call sites, making the whole service testable with mock
//! adapters.
//!
//! ```text
//!   BootPort ──▶ ┌──────────────────────────────┐ ──▶ EventSink
//! BatteryPort ──▶│        VehicleService         │
//! ActuatorPort ◀─│ FSM · Policy · Blink · Timers │
//!                └──────────────────────────────┘
//! ```
//!
//! ## One loop iteration ([`VehicleService::tick`])
//!
//! 1. `reevaluate()`: the transition table runs against the current time.
//! 2. `update_actuators()`: motors and lamp follow state and target.
//! 3. Due timers are dispatched in deadline order: battery sample, state
//!    report (plus blink code outside `READY`), blink toggle.
//!
//! Timer work therefore always runs between iterations on the loop's own
//! thread, which is what lets the context live without locks.

use log::{error, info, warn};

use crate::config::SystemConfig;
use crate::control::policy::update_actuators;
use crate::drivers::blinker::BlinkEncoder;
use crate::error::{CommandError, SchedulerError};
use crate::fsm::context::{CommandTarget, ControlContext};
use crate::fsm::{DeviceState, StateMachine};
use crate::scheduler::{TimerId, TimerQueue};
use crate::sensors::battery::{BatteryLevel, BatteryMonitor, Calibration};

use super::commands::RemoteCommand;
use super::events::{AppEvent, TelemetryData};
use super::ports::{ActuatorPort, BatteryPort, BootPort, EventSink};

// ───────────────────────────────────────────────────────────────
// VehicleService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct VehicleService {
    fsm: StateMachine,
    ctx: ControlContext,
    battery: BatteryMonitor,
    blinker: BlinkEncoder,
    timers: TimerQueue,
    /// Activity indicator level from the last policy run.
    activity: bool,
    booted: bool,
    tick_count: u64,
}

impl VehicleService {
    /// Construct the service from configuration.
    ///
    /// Does **not** boot the platform: call [`boot`](Self::boot) next.
    pub fn new(config: SystemConfig) -> Self {
        let battery = BatteryMonitor::new(Calibration::from_divider(config.battery_divider_kohm));
        Self {
            fsm: StateMachine::default(),
            ctx: ControlContext::new(config),
            battery,
            blinker: BlinkEncoder::new(),
            timers: TimerQueue::new(),
            activity: false,
            booted: false,
            tick_count: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Run the boot sequence once.
    ///
    /// The state report timer is armed first so that a parked device still
    /// reports and blinks its fault.  Battery sampling starts only after a
    /// successful boot.  Later calls return the current state untouched.
    pub fn boot(
        &mut self,
        platform: &mut impl BootPort,
        now_ms: u64,
        sink: &mut impl EventSink,
    ) -> DeviceState {
        if self.booted {
            warn!("boot requested again in {}; ignored", self.ctx.state);
            return self.ctx.state;
        }
        self.booted = true;
        self.ctx.now_ms = now_ms;

        let publish = u64::from(self.ctx.config.publish_interval_ms);
        self.arm_or_log(|t| t.schedule_periodic(TimerId::PublishState, now_ms, publish));

        match crate::boot::boot(&mut self.ctx, platform) {
            Ok(()) => {
                let sample = u64::from(self.ctx.config.battery_sample_interval_ms);
                self.arm_or_log(|t| t.schedule_periodic(TimerId::BatterySample, now_ms, sample));
            }
            Err(fault) => sink.emit(&AppEvent::BootFailed(fault)),
        }

        sink.emit(&AppEvent::Booted(self.ctx.state));
        info!("VehicleService booted in {}", self.ctx.state);
        self.ctx.state
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one loop iteration: state → actuators → deferred timers.
    ///
    /// The `hw` parameter satisfies **both** [`ActuatorPort`] and
    /// [`BatteryPort`], which avoids a double mutable borrow while keeping
    /// the port boundary explicit.
    pub fn tick(
        &mut self,
        now_ms: u64,
        hw: &mut (impl ActuatorPort + BatteryPort),
        sink: &mut impl EventSink,
    ) {
        self.tick_count += 1;
        self.ctx.now_ms = now_ms;

        // 1. State machine
        let prev = self.ctx.state;
        if let Some(to) = self.fsm.reevaluate(&mut self.ctx) {
            sink.emit(&AppEvent::StateChanged { from: prev, to });
        }

        // 2. Actuators
        let commands = update_actuators(&mut self.ctx);
        hw.set_drive(commands.drive);
        hw.set_steering(commands.steer);
        self.activity = commands.activity;
        self.refresh_indicator(hw);

        // 3. Deferred timers
        while let Some(id) = self.timers.pop_due(now_ms) {
            self.dispatch(id, now_ms, hw, sink);
        }
    }

    // ── Command handling ──────────────────────────────────────

    /// Validate and take a remote command.
    ///
    /// A rejected command changes nothing: the target and the watchdog
    /// stamp keep their previous values.
    pub fn accept_command(
        &mut self,
        cmd: RemoteCommand,
        now_ms: u64,
        sink: &mut impl EventSink,
    ) -> Result<(), CommandError> {
        match cmd.validate() {
            Ok(target) => {
                self.ctx.target = target;
                self.ctx.watchdog.record_command(now_ms);
                Ok(())
            }
            Err(e) => {
                warn!("command rejected: {e} ({:?})", cmd);
                sink.emit(&AppEvent::CommandRejected(e));
                Err(e)
            }
        }
    }

    /// Start a blink sequence for `code`.
    ///
    /// Returns `false` (and touches nothing) if a sequence is already
    /// running or `code` is zero.
    pub fn request_blink(&mut self, code: u8, now_ms: u64, hw: &mut impl ActuatorPort) -> bool {
        if self.blinker.request(code).is_none() {
            return false;
        }

        let half = u64::from(self.ctx.config.blink_half_period_ms);
        if let Err(e) = self.timers.schedule_once(TimerId::BlinkToggle, now_ms, half) {
            error!("blink: cannot arm toggle timer: {e}");
            self.blinker = BlinkEncoder::new();
            return false;
        }

        self.refresh_indicator(hw);
        true
    }

    // ── Queries ───────────────────────────────────────────────

    /// Build a telemetry snapshot from the current context.
    pub fn build_telemetry(&self) -> TelemetryData {
        TelemetryData {
            state: self.ctx.state,
            battery: self.ctx.battery,
            throttle: self.ctx.target.throttle,
            steering: self.ctx.target.steering,
        }
    }

    pub fn current_state(&self) -> DeviceState {
        self.ctx.state
    }

    pub fn current_battery(&self) -> BatteryLevel {
        self.ctx.battery
    }

    pub fn command_target(&self) -> CommandTarget {
        self.ctx.target
    }

    /// Total loop iterations executed since startup.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Earliest pending timer deadline, for sizing the loop's sleep.
    pub fn next_deadline(&mut self) -> Option<u64> {
        self.timers.next_deadline()
    }

    pub fn is_blinking(&self) -> bool {
        self.blinker.is_active()
    }

    /// Number of runtime state transitions taken so far.
    pub fn transition_count(&self) -> u32 {
        self.fsm.transition_count()
    }

    pub fn config(&self) -> &SystemConfig {
        &self.ctx.config
    }

    // ── Internal ──────────────────────────────────────────────

    fn dispatch(
        &mut self,
        id: TimerId,
        now_ms: u64,
        hw: &mut (impl ActuatorPort + BatteryPort),
        sink: &mut impl EventSink,
    ) {
        match id {
            TimerId::BatterySample => match hw.read_battery_raw() {
                Ok(raw) => self.ctx.battery = self.battery.ingest(raw),
                // The last good reading stays in force.
                Err(e) => warn!("battery: sample skipped: {e}"),
            },
            TimerId::PublishState => {
                sink.emit(&AppEvent::Telemetry(self.build_telemetry()));
                if !self.ctx.state.is_nominal() {
                    self.request_blink(self.ctx.state.blink_code(), now_ms, hw);
                }
            }
            TimerId::BlinkToggle => {
                let step = self.blinker.on_timer_fire();
                if step.reschedule {
                    let half = u64::from(self.ctx.config.blink_half_period_ms);
                    if let Err(e) = self.timers.schedule_once(TimerId::BlinkToggle, now_ms, half) {
                        error!("blink: cannot re-arm toggle timer: {e}");
                        self.blinker = BlinkEncoder::new();
                    }
                }
                self.refresh_indicator(hw);
            }
        }
    }

    /// A running blink sequence owns the lamp; otherwise it shows activity.
    fn refresh_indicator(&self, hw: &mut impl ActuatorPort) {
        hw.set_indicator(self.blinker.level().unwrap_or(self.activity));
    }

    fn arm_or_log(&mut self, f: impl FnOnce(&mut TimerQueue) -> Result<(), SchedulerError>) {
        if let Err(e) = f(&mut self.timers) {
            error!("timer arm failed: {e}");
        }
    }
}
