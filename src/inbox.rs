//! Command inbox.
//!
//! Transport threads never touch loop state.  They post [`RemoteCommand`]s
//! into a lock-free single-producer single-consumer ring; the control loop
//! drains it at the top of every iteration and feeds each entry through
//! command ingestion.
//!
//! ```text
//!  HTTP task ──post()──▶ [ spsc ring, INBOX_DEPTH ] ──drain()──▶ control loop
//! ```
//!
//! A full ring rejects the newest command.  The producer sees
//! [`InboxError::Full`] and can answer the client accordingly.

use heapless::spsc::{Consumer, Producer, Queue};
use log::warn;

use crate::app::commands::RemoteCommand;
use crate::error::InboxError;

/// Ring depth.  One slot of a heapless spsc queue is always kept free.
pub const INBOX_DEPTH: usize = 8;

/// Backing storage.  Create once, then [`CommandInbox::split`] it.
pub struct CommandInbox {
    queue: Queue<RemoteCommand, INBOX_DEPTH>,
}

impl CommandInbox {
    pub const fn new() -> Self {
        Self {
            queue: Queue::new(),
        }
    }

    /// Hand out the two ends.  The borrow ties both to the storage.
    pub fn split(&mut self) -> (InboxSender<'_>, InboxReceiver<'_>) {
        let (tx, rx) = self.queue.split();
        (InboxSender { tx }, InboxReceiver { rx })
    }
}

impl Default for CommandInbox {
    fn default() -> Self {
        Self::new()
    }
}

/// Producer end, owned by one transport.
pub struct InboxSender<'a> {
    tx: Producer<'a, RemoteCommand, INBOX_DEPTH>,
}

impl InboxSender<'_> {
    pub fn post(&mut self, cmd: RemoteCommand) -> Result<(), InboxError> {
        self.tx.enqueue(cmd).map_err(|_| {
            warn!("inbox: full, dropping command");
            InboxError::Full
        })
    }
}

/// Consumer end, owned by the control loop.
pub struct InboxReceiver<'a> {
    rx: Consumer<'a, RemoteCommand, INBOX_DEPTH>,
}

impl InboxReceiver<'_> {
    pub fn next(&mut self) -> Option<RemoteCommand> {
        self.rx.dequeue()
    }

    /// Hand every pending command to `f`, oldest first.
    pub fn drain(&mut self, mut f: impl FnMut(RemoteCommand)) -> usize {
        let mut n = 0;
        while let Some(cmd) = self.rx.dequeue() {
            f(cmd);
            n += 1;
        }
        n
    }

    pub fn pending(&self) -> usize {
        self.rx.len()
    }
}
