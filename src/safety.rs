//! Command watchdog.
//!
//! Detects the absence of fresh commands.  The watchdog stores one
//! timestamp and a fixed threshold; staleness is a pure function of the
//! elapsed time, queried by the state machine every tick.
//!
//! ## Arming
//!
//! 1. The boot sequence calls [`CommandWatchdog::arm`] at the instant the
//!    device becomes `READY`, so a vehicle that never receives a command
//!    still times out one threshold later.
//! 2. Command ingestion calls [`CommandWatchdog::record_command`] only
//!    after range validation.  A rejected command never reaches it and
//!    cannot mask staleness.

use log::debug;

/// Elapsed-time watchdog for inbound commands.
#[derive(Debug, Clone, Copy)]
pub struct CommandWatchdog {
    /// Monotonic instant of the last accepted command (ms).
    last_command_ms: u64,
    timeout_ms: u64,
}

impl CommandWatchdog {
    pub fn new(timeout_ms: u32) -> Self {
        Self {
            last_command_ms: 0,
            timeout_ms: u64::from(timeout_ms),
        }
    }

    /// Start the countdown without a command (end of boot).
    pub fn arm(&mut self, now_ms: u64) {
        self.last_command_ms = now_ms;
        debug!("watchdog armed at {now_ms} ms ({} ms timeout)", self.timeout_ms);
    }

    /// Stamp a validated command.
    pub fn record_command(&mut self, now_ms: u64) {
        self.last_command_ms = now_ms;
    }

    /// Milliseconds since the last accepted command.  A clock reading
    /// older than the stamp counts as zero.
    pub fn elapsed_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.last_command_ms)
    }

    /// True once the elapsed time has reached the threshold.
    pub fn is_stale(&self, now_ms: u64) -> bool {
        self.elapsed_ms(now_ms) >= self.timeout_ms
    }

    pub fn last_command_ms(&self) -> u64 {
        self.last_command_ms
    }

    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stale_exactly_at_threshold() {
        let mut wd = CommandWatchdog::new(1000);
        wd.arm(10_000);
        assert!(!wd.is_stale(10_999));
        assert!(wd.is_stale(11_000));
    }

    #[test]
    fn record_resets_elapsed() {
        let mut wd = CommandWatchdog::new(1000);
        wd.arm(0);
        assert!(wd.is_stale(5_000));
        wd.record_command(5_000);
        assert_eq!(wd.elapsed_ms(5_000), 0);
        assert!(!wd.is_stale(5_500));
    }

    #[test]
    fn clock_behind_stamp_is_not_stale() {
        let mut wd = CommandWatchdog::new(1000);
        wd.arm(2_000);
        assert_eq!(wd.elapsed_ms(1_000), 0);
        assert!(!wd.is_stale(1_000));
    }
}
