//! Device state machine.
//!
//! The runtime transition set is tiny and deliberately asymmetric, so it
//! is kept as an ordered guard table rather than nested conditionals:
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │  TransitionTable (evaluated top to bottom, every tick)        │
//! │  ┌─────────────────┬─────────────────┬──────────────────────┐ │
//! │  │ from            │ to              │ guard                │ │
//! │  ├─────────────────┼─────────────────┼──────────────────────┤ │
//! │  │ READY           │ LOW_BATTERY     │ battery < limit      │ │
//! │  │ READY           │ COMMAND_TIMEOUT │ elapsed >= timeout   │ │
//! │  │ COMMAND_TIMEOUT │ READY           │ elapsed <  timeout   │ │
//! │  └─────────────────┴─────────────────┴──────────────────────┘ │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each rule guards on the state *as left by the rules above it*.  The
//! table is re-run until it settles, which takes at most two passes since
//! only `COMMAND_TIMEOUT` has a return edge.  Boot-time transitions out of
//! `INITIALIZING` are not in the table; they happen exactly once through
//! [`crate::boot`].

pub mod context;
pub mod states;

use core::fmt;

use context::ControlContext;
use log::{info, warn};

// ---------------------------------------------------------------------------
// State identity
// ---------------------------------------------------------------------------

/// Operational mode of the device.
///
/// The discriminants are part of the external contract: the ordinal of a
/// non-nominal state is the blink code shown on the status lamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum DeviceState {
    Initializing = 0,
    CommandTimeout = 1,
    LowBattery = 2,
    FilesystemFailed = 3,
    WifiFailed = 4,
    DnsFailed = 5,
    Ready = 6,
}

impl DeviceState {
    /// Total number of states.
    pub const COUNT: usize = 7;

    pub const ALL: [Self; Self::COUNT] = [
        Self::Initializing,
        Self::CommandTimeout,
        Self::LowBattery,
        Self::FilesystemFailed,
        Self::WifiFailed,
        Self::DnsFailed,
        Self::Ready,
    ];

    /// Convert an ordinal back to a state.
    pub fn from_ordinal(ordinal: u8) -> Option<Self> {
        Self::ALL.get(ordinal as usize).copied()
    }

    pub const fn ordinal(self) -> u8 {
        self as u8
    }

    /// Upper-case name used on the serial console and in telemetry.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Initializing => "INITIALIZING",
            Self::CommandTimeout => "COMMAND_TIMEOUT",
            Self::LowBattery => "LOW_BATTERY",
            Self::FilesystemFailed => "FILESYSTEM_FAILED",
            Self::WifiFailed => "WIFI_FAILED",
            Self::DnsFailed => "DNS_FAILED",
            Self::Ready => "READY",
        }
    }

    /// `READY` is the only state in which the actuators may move.
    pub const fn is_nominal(self) -> bool {
        matches!(self, Self::Ready)
    }

    /// No runtime rule ever leaves these states.
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Ready | Self::CommandTimeout)
    }

    /// Blink code for the status lamp.
    ///
    /// Equal to the ordinal, so `INITIALIZING` (ordinal 0) is silent.
    pub const fn blink_code(self) -> u8 {
        self.ordinal()
    }
}

impl fmt::Display for DeviceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Transition table
// ---------------------------------------------------------------------------

/// Guard evaluated against the context for one table row.
pub type GuardFn = fn(&ControlContext) -> bool;

/// One row of the runtime transition table.
pub struct TransitionRule {
    pub from: DeviceState,
    pub to: DeviceState,
    /// Short human-readable reason, logged when the rule fires.
    pub reason: &'static str,
    pub guard: GuardFn,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// The state machine engine.  Owns the ordered transition table; the state
/// itself lives in [`ControlContext`].
pub struct StateMachine {
    table: [TransitionRule; states::RULE_COUNT],
    transitions: u32,
}

impl StateMachine {
    pub fn new(table: [TransitionRule; states::RULE_COUNT]) -> Self {
        Self {
            table,
            transitions: 0,
        }
    }

    /// Re-evaluate the mode.  Returns the new state if it changed.
    ///
    /// Rules run in table order against the state left by earlier rules.
    /// Passes repeat until one makes no change, so a second call without
    /// new time or input is always a no-op (e.g. `COMMAND_TIMEOUT -> READY`
    /// followed by a pending low-battery trip settles in a single call).
    /// `ctx.now_ms` must already be set for this iteration.
    pub fn reevaluate(&mut self, ctx: &mut ControlContext) -> Option<DeviceState> {
        let before = ctx.state;

        for _ in 0..DeviceState::COUNT {
            if !self.run_pass(ctx) {
                break;
            }
        }

        (ctx.state != before).then_some(ctx.state)
    }

    /// Number of runtime transitions taken so far.
    pub fn transition_count(&self) -> u32 {
        self.transitions
    }

    /// The rows in evaluation order.
    pub fn rules(&self) -> &[TransitionRule] {
        &self.table
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    /// One top-to-bottom pass.  Returns whether any rule fired.
    fn run_pass(&mut self, ctx: &mut ControlContext) -> bool {
        let mut fired = false;

        for rule in &self.table {
            if ctx.state == rule.from && (rule.guard)(ctx) {
                if rule.to.is_nominal() {
                    info!("FSM transition: {} -> {} ({})", rule.from, rule.to, rule.reason);
                } else {
                    warn!("FSM transition: {} -> {} ({})", rule.from, rule.to, rule.reason);
                }
                ctx.state = rule.to;
                self.transitions = self.transitions.wrapping_add(1);
                fired = true;
            }
        }

        fired
    }
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new(states::build_transition_table())
    }
}
