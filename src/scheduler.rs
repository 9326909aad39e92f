//! Deferred timer queue.
//!
//! Every timed action of the firmware (battery sampling, the periodic
//! state report, blink toggles) is a deadline in one fixed-capacity
//! min-heap.  The queue never runs anything itself: the control loop pops
//! due [`TimerId`]s between iterations and dispatches them on its own
//! thread, so timer work can touch loop state without locks.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                       Control loop                           │
//! │                                                              │
//! │   reevaluate() ──▶ update_actuators() ──▶ pop_due(now)       │
//! │                                              │               │
//! │        ┌─────────────────┬───────────────────┼───────┐       │
//! │        ▼                 ▼                   ▼       │       │
//! │  BatterySample     PublishState         BlinkToggle  │       │
//! │  (periodic)        (periodic)           (one-shot)   │       │
//! │        └─────────────────┴───────────────────┘       │       │
//! │                    re-armed by the queue ◀───────────┘       │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Cancellation bumps a per-timer generation; heap entries carrying an old
//! generation are dropped when they surface.

use heapless::binary_heap::{BinaryHeap, Min};
use log::{debug, warn};

use crate::error::SchedulerError;

// ═══════════════════════════════════════════════════════════════
//  Timer identity
// ═══════════════════════════════════════════════════════════════

/// The deferred actions the loop knows how to dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TimerId {
    /// Read and calibrate one battery sample.
    BatterySample,
    /// Publish telemetry and, outside `READY`, request a blink code.
    PublishState,
    /// Advance the blink encoder by one toggle.
    BlinkToggle,
}

impl TimerId {
    pub const COUNT: usize = 3;

    const fn slot(self) -> usize {
        self as usize
    }
}

/// Heap capacity.  One live entry per timer plus room for stale ones.
const QUEUE_CAPACITY: usize = 8;

// ═══════════════════════════════════════════════════════════════
//  Queue engine
// ═══════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Entry {
    due_ms: u64,
    /// Insertion order, breaks ties between equal deadlines.
    seq: u32,
    id: TimerId,
    generation: u32,
}

#[derive(Debug, Clone, Copy, Default)]
struct Slot {
    generation: u32,
    period_ms: Option<u64>,
    armed: bool,
}

pub struct TimerQueue {
    heap: BinaryHeap<Entry, Min, QUEUE_CAPACITY>,
    slots: [Slot; TimerId::COUNT],
    seq: u32,
}

impl TimerQueue {
    pub const fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            slots: [Slot {
                generation: 0,
                period_ms: None,
                armed: false,
            }; TimerId::COUNT],
            seq: 0,
        }
    }

    /// Fire `id` once, `delay_ms` from `now_ms`.  Replaces any pending
    /// arming of the same timer.
    pub fn schedule_once(
        &mut self,
        id: TimerId,
        now_ms: u64,
        delay_ms: u64,
    ) -> Result<(), SchedulerError> {
        self.arm(id, now_ms.saturating_add(delay_ms), None)
    }

    /// Fire `id` every `period_ms`, first at `now_ms + period_ms`.
    pub fn schedule_periodic(
        &mut self,
        id: TimerId,
        now_ms: u64,
        period_ms: u64,
    ) -> Result<(), SchedulerError> {
        let period = period_ms.max(1);
        self.arm(id, now_ms.saturating_add(period), Some(period))
    }

    /// Disarm `id`.  A no-op if it is not armed.
    pub fn cancel(&mut self, id: TimerId) {
        let slot = &mut self.slots[id.slot()];
        if slot.armed {
            debug!("timer {id:?}: cancelled");
        }
        slot.generation = slot.generation.wrapping_add(1);
        slot.armed = false;
        slot.period_ms = None;
    }

    pub fn is_armed(&self, id: TimerId) -> bool {
        self.slots[id.slot()].armed
    }

    /// Pop the earliest timer whose deadline is at or before `now_ms`.
    ///
    /// Periodic timers are re-armed before returning.  The next deadline
    /// keeps the planned cadence (`due + period`) unless the loop fell at
    /// least a full period behind, in which case it restarts from `now_ms`.
    pub fn pop_due(&mut self, now_ms: u64) -> Option<TimerId> {
        loop {
            let head = *self.heap.peek()?;
            if head.due_ms > now_ms {
                return None;
            }
            self.heap.pop();

            let slot = self.slots[head.id.slot()];
            if !slot.armed || slot.generation != head.generation {
                continue;
            }

            match slot.period_ms {
                Some(period) => {
                    let mut next = head.due_ms.saturating_add(period);
                    if next <= now_ms {
                        warn!(
                            "timer {:?}: {} ms late, re-anchoring",
                            head.id,
                            now_ms - head.due_ms
                        );
                        next = now_ms.saturating_add(period);
                    }
                    if self.push(head.id, next, slot.generation).is_err() {
                        // Cannot happen: the entry just popped freed a slot.
                        self.slots[head.id.slot()].armed = false;
                    }
                }
                None => self.slots[head.id.slot()].armed = false,
            }

            return Some(head.id);
        }
    }

    /// Earliest live deadline, if any.
    pub fn next_deadline(&mut self) -> Option<u64> {
        self.drop_stale_head();
        self.heap.peek().map(|e| e.due_ms)
    }

    /// Number of heap entries, stale ones included.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    // ── Internal ──────────────────────────────────────────────

    fn arm(&mut self, id: TimerId, due_ms: u64, period_ms: Option<u64>) -> Result<(), SchedulerError> {
        let slot = &mut self.slots[id.slot()];
        slot.generation = slot.generation.wrapping_add(1);
        let generation = slot.generation;

        if let Err(e) = self.push(id, due_ms, generation) {
            self.slots[id.slot()].armed = false;
            return Err(e);
        }

        let slot = &mut self.slots[id.slot()];
        slot.armed = true;
        slot.period_ms = period_ms;
        debug!("timer {id:?}: due at {due_ms} ms (period {period_ms:?})");
        Ok(())
    }

    fn push(&mut self, id: TimerId, due_ms: u64, generation: u32) -> Result<(), SchedulerError> {
        if self.heap.len() == self.heap.capacity() {
            self.compact();
        }

        let entry = Entry {
            due_ms,
            seq: self.seq,
            id,
            generation,
        };
        self.seq = self.seq.wrapping_add(1);
        self.heap.push(entry).map_err(|_| SchedulerError::QueueFull)
    }

    fn is_live(&self, e: &Entry) -> bool {
        let slot = &self.slots[e.id.slot()];
        slot.armed && slot.generation == e.generation
    }

    fn drop_stale_head(&mut self) {
        while let Some(head) = self.heap.peek() {
            if self.is_live(head) {
                break;
            }
            self.heap.pop();
        }
    }

    /// Rebuild the heap without stale entries.
    fn compact(&mut self) {
        let mut live: heapless::Vec<Entry, QUEUE_CAPACITY> = heapless::Vec::new();
        while let Some(e) = self.heap.pop() {
            if self.is_live(&e) {
                // Capacity matches the heap, so this never fails.
                let _ = live.push(e);
            }
        }
        for e in live {
            let _ = self.heap.push(e);
        }
    }
}

impl Default for TimerQueue {
    fn default() -> Self {
        Self::new()
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
