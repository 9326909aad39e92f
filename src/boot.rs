//! Boot sequence.
//!
//! Brings the platform up in a fixed order and leaves the device either
//! `READY` or parked in exactly one fault state:
//!
//! ```text
//!  INITIALIZING
//!      │ mount filesystem ───────✗──▶ FILESYSTEM_FAILED
//!      │ start access point ─────✗──▶ WIFI_FAILED
//!      │ start name service ─────✗──▶ DNS_FAILED
//!      │ start command server ───✗──▶ WIFI_FAILED
//!      ▼
//!    READY  (watchdog armed at this instant)
//! ```
//!
//! The first failure aborts the sequence; later subsystems are never
//! started.  Nothing here retries.

use log::{error, info};

use crate::app::ports::BootPort;
use crate::error::BootFault;
use crate::fsm::DeviceState;
use crate::fsm::context::ControlContext;

/// One platform bring-up stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootStep {
    MountFilesystem,
    StartAccessPoint,
    StartNameService,
    StartCommandServer,
}

impl BootStep {
    /// Execution order.
    pub const ORDER: [Self; 4] = [
        Self::MountFilesystem,
        Self::StartAccessPoint,
        Self::StartNameService,
        Self::StartCommandServer,
    ];

    /// Fault recorded when this stage fails.  The command server belongs
    /// to network bring-up and shares the Wi-Fi fault.
    pub const fn fault(self) -> BootFault {
        match self {
            Self::MountFilesystem => BootFault::Filesystem,
            Self::StartAccessPoint | Self::StartCommandServer => BootFault::Wifi,
            Self::StartNameService => BootFault::Dns,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::MountFilesystem => "mount filesystem",
            Self::StartAccessPoint => "start access point",
            Self::StartNameService => "start name service",
            Self::StartCommandServer => "start command server",
        }
    }

    fn run(self, platform: &mut impl BootPort) -> Result<(), crate::error::PlatformError> {
        match self {
            Self::MountFilesystem => platform.mount_filesystem(),
            Self::StartAccessPoint => platform.start_access_point(),
            Self::StartNameService => platform.start_name_service(),
            Self::StartCommandServer => platform.start_command_server(),
        }
    }
}

/// Run every stage in order, stopping at the first failure.
pub fn run_boot_sequence(platform: &mut impl BootPort) -> Result<(), BootFault> {
    for step in BootStep::ORDER {
        info!("boot: {}", step.name());
        if let Err(e) = step.run(platform) {
            let fault = step.fault();
            error!("boot: {} failed ({e}); parking in {}", step.name(), fault.state());
            return Err(fault);
        }
    }
    Ok(())
}

/// Boot and record the outcome in `ctx`.
///
/// Success leaves `READY` with the watchdog armed at `ctx.now_ms`; a failure
/// leaves the matching fault state.  The caller guarantees this runs at most
/// once, from `INITIALIZING`.
pub fn boot(ctx: &mut ControlContext, platform: &mut impl BootPort) -> Result<(), BootFault> {
    debug_assert_eq!(ctx.state, DeviceState::Initializing);

    match run_boot_sequence(platform) {
        Ok(()) => {
            ctx.state = DeviceState::Ready;
            ctx.watchdog.arm(ctx.now_ms);
            info!("boot: complete, {}", ctx.state);
            Ok(())
        }
        Err(fault) => {
            ctx.state = fault.state();
            Err(fault)
        }
    }
}
