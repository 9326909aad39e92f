//! Sensor subsystem.
//!
//! The vehicle has a single analog input: the battery divider.  Sampling
//! is driven by the deferred battery timer, so the latest level is only
//! ever written on the control loop's thread.

pub mod battery;
