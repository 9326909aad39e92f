//! Fuzz target: `TimerQueue`
//!
//! Interprets the input as a script of schedule/cancel/advance operations
//! and asserts that due timers never come out early and that the clock
//! never sees a deadline in the past after a full drain.
//!
//! cargo fuzz run fuzz_timer_queue

#![no_main]

use libfuzzer_sys::fuzz_target;
use rcdevice::scheduler::{TimerId, TimerQueue};

const IDS: [TimerId; TimerId::COUNT] = [
    TimerId::BatterySample,
    TimerId::PublishState,
    TimerId::BlinkToggle,
];

fuzz_target!(|data: &[u8]| {
    let mut q = TimerQueue::new();
    let mut now: u64 = 0;

    for chunk in data.chunks(3) {
        let [op, which, arg] = match *chunk {
            [a, b, c] => [a, b, c],
            _ => break,
        };
        let id = IDS[usize::from(which) % IDS.len()];
        let delay = u64::from(arg) + 1;

        match op % 4 {
            0 => {
                let _ = q.schedule_once(id, now, delay);
            }
            1 => {
                let _ = q.schedule_periodic(id, now, delay);
            }
            2 => q.cancel(id),
            _ => {
                now += u64::from(arg);
                while q.pop_due(now).is_some() {}
                if let Some(next) = q.next_deadline() {
                    assert!(next > now, "deadline {next} left behind at {now}");
                }
            }
        }
    }
});
