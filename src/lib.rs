//! RC vehicle control library.
//!
//! Exposes the pure-logic modules for integration testing and the device
//! binary. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod boot;
pub mod config;
pub mod error;
pub mod fsm;
pub mod inbox;
pub mod safety;
pub mod scheduler;

pub mod pins;

// Hardware-facing modules.  The real implementations are guarded by cfg
// attributes inside; host builds get simulation stubs.
pub mod adapters;
pub mod control;
pub mod drivers;
pub mod sensors;
