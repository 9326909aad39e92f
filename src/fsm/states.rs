//! Runtime transition guards and the table builder.
//!
//! ```text
//!                 [battery < limit]
//!   READY ──────────────────────────────▶ LOW_BATTERY   (terminal)
//!    │  ▲
//!    │  │ [elapsed < timeout]
//!    │  │
//!    ▼  │ [elapsed >= timeout]
//!   COMMAND_TIMEOUT
//!
//!   INITIALIZING, FILESYSTEM_FAILED, WIFI_FAILED, DNS_FAILED: no rows
//! ```
//!
//! Row order is the priority order.  The battery row sits above the
//! watchdog row so a vehicle that is both stale and flat reports the
//! terminal condition.

use super::context::ControlContext;
use super::{DeviceState, TransitionRule};

/// Number of rows in the runtime table.
pub const RULE_COUNT: usize = 3;

/// Build the ordered transition table.  Called once at startup.
pub fn build_transition_table() -> [TransitionRule; RULE_COUNT] {
    [
        TransitionRule {
            from: DeviceState::Ready,
            to: DeviceState::LowBattery,
            reason: "battery below limit",
            guard: battery_low,
        },
        TransitionRule {
            from: DeviceState::Ready,
            to: DeviceState::CommandTimeout,
            reason: "no command within timeout",
            guard: command_stale,
        },
        TransitionRule {
            from: DeviceState::CommandTimeout,
            to: DeviceState::Ready,
            reason: "command received",
            guard: command_fresh,
        },
    ]
}

fn battery_low(ctx: &ControlContext) -> bool {
    ctx.battery_is_low()
}

fn command_stale(ctx: &ControlContext) -> bool {
    ctx.command_is_stale()
}

fn command_fresh(ctx: &ControlContext) -> bool {
    !ctx.command_is_stale()
}
