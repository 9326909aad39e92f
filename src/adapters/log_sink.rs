//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing application events to the logger
//! (UART on the device).  State reports keep the serial format existing
//! tooling already scrapes:
//!
//! ```text
//! State:READY Battery:7.42 Throttle:0.50 Steering:-1.00
//! ```

use log::{error, info, warn};

use crate::app::events::{AppEvent, TelemetryData};
use crate::app::ports::EventSink;

/// Render a state report line.  Values use two decimals; an unsampled
/// battery prints as `-1.00`.
pub fn state_line(t: &TelemetryData) -> String {
    format!(
        "State:{} Battery:{:.2} Throttle:{:.2} Steering:{:.2}",
        t.state.name(),
        t.battery.as_reported(),
        t.throttle,
        t.steering,
    )
}

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Debug, Default)]
pub struct LogEventSink {
    reports: u32,
}

impl LogEventSink {
    pub fn new() -> Self {
        Self { reports: 0 }
    }

    /// State reports written so far.
    pub fn reports(&self) -> u32 {
        self.reports
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Telemetry(t) => {
                self.reports = self.reports.wrapping_add(1);
                info!("{}", state_line(t));
            }
            AppEvent::StateChanged { from, to } => {
                info!("STATE | {} -> {}", from, to);
            }
            AppEvent::Booted(state) => {
                info!("BOOT  | {}", state);
            }
            AppEvent::BootFailed(fault) => {
                error!("BOOT  | {} (blink code {})", fault, fault.state().blink_code());
            }
            AppEvent::CommandRejected(e) => {
                warn!("CMD   | rejected: {}", e);
            }
        }
    }
}
