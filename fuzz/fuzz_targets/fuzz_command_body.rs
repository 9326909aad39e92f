//! Fuzz target: `PUT /command` body handling
//!
//! Drives arbitrary bytes through the request handler and asserts that it
//! never panics, only answers 200/400/503, and only queues commands that
//! pass range validation.
//!
//! cargo fuzz run fuzz_command_body

#![no_main]

use libfuzzer_sys::fuzz_target;
use rcdevice::adapters::http::handle_command_body;
use rcdevice::inbox::CommandInbox;

fuzz_target!(|data: &[u8]| {
    let mut inbox = CommandInbox::new();
    let (mut tx, mut rx) = inbox.split();

    let reply = handle_command_body(data, &mut tx);
    assert!(matches!(reply.status, 200 | 400 | 503), "unexpected status {}", reply.status);

    match rx.next() {
        Some(cmd) => {
            assert_eq!(reply.status, 200);
            assert!(cmd.validate().is_ok(), "queued an out-of-range command");
        }
        None => assert_ne!(reply.status, 200),
    }
});
