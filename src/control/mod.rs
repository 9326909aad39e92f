//! Control laws: how the device state and the last command turn into
//! motor commands.

pub mod policy;
