//! Platform adapter: the [`BootPort`] implementation.
//!
//! Composes the filesystem, access point, name service and command
//! server and starts each one when the boot sequence asks for it.

use crate::adapters::filesystem::Filesystem;
use crate::adapters::http::CommandServer;
use crate::adapters::mdns::MdnsAdapter;
use crate::adapters::wifi::AccessPoint;
use crate::app::ports::BootPort;
use crate::config::SystemConfig;
use crate::error::PlatformError;

pub struct Platform {
    fs: Filesystem,
    ap: AccessPoint,
    names: MdnsAdapter,
    http: CommandServer,
}

impl Platform {
    pub fn new(config: &SystemConfig, ap: AccessPoint, http: CommandServer) -> Self {
        Self {
            fs: Filesystem::new(),
            ap,
            names: MdnsAdapter::new(config.dns_name.clone(), config.http_port),
            http,
        }
    }

    pub fn command_server(&self) -> &CommandServer {
        &self.http
    }
}

impl BootPort for Platform {
    fn mount_filesystem(&mut self) -> Result<(), PlatformError> {
        self.fs.mount()
    }

    fn start_access_point(&mut self) -> Result<(), PlatformError> {
        self.ap.start()
    }

    fn start_name_service(&mut self) -> Result<(), PlatformError> {
        self.names.start()
    }

    fn start_command_server(&mut self) -> Result<(), PlatformError> {
        self.http.start()
    }
}
