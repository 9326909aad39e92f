//! Static-asset filesystem.
//!
//! Registers the SPIFFS data partition with the VFS at [`MOUNT_POINT`] so
//! the HTTP server can read files through `std::fs`.  The partition is
//! never formatted on failure; a missing or corrupt image is a boot fault.

use log::info;

use crate::error::PlatformError;

pub const MOUNT_POINT: &str = "/spiffs";

const MAX_OPEN_FILES: usize = 5;

pub struct Filesystem {
    mounted: bool,
}

impl Default for Filesystem {
    fn default() -> Self {
        Self::new()
    }
}

impl Filesystem {
    pub const fn new() -> Self {
        Self { mounted: false }
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn mount(&mut self) -> Result<(), PlatformError> {
        if self.mounted {
            return Ok(());
        }
        self.platform_mount()?;
        self.mounted = true;
        info!("fs: mounted at {MOUNT_POINT}");
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn platform_mount(&mut self) -> Result<(), PlatformError> {
        use esp_idf_svc::sys::{ESP_OK, esp_vfs_spiffs_conf_t, esp_vfs_spiffs_register};

        let conf = esp_vfs_spiffs_conf_t {
            base_path: c"/spiffs".as_ptr(),
            partition_label: core::ptr::null(),
            max_files: MAX_OPEN_FILES,
            format_if_mount_failed: false,
        };
        // SAFETY: conf and its strings are valid for the call; the VFS copies
        // the base path.
        let ret = unsafe { esp_vfs_spiffs_register(&conf) };
        if ret != ESP_OK as i32 {
            log::error!("fs: esp_vfs_spiffs_register failed ({ret})");
            return Err(PlatformError::Status(ret));
        }
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_mount(&mut self) -> Result<(), PlatformError> {
        info!("fs(sim): {MAX_OPEN_FILES} handles at {MOUNT_POINT}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mount_once() {
        let mut fs = Filesystem::new();
        assert!(!fs.is_mounted());
        fs.mount().unwrap();
        fs.mount().unwrap();
        assert!(fs.is_mounted());
    }
}
