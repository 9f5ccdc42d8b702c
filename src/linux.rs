//! I2C buses of a Linux host, reached through `/dev/i2c-N`.

use std::path::PathBuf;

use linux_embedded_hal::I2cdev;

use crate::{I2cPlatform, TransportError};

/// Opens `/dev/i2c-<bus id>` character devices.
#[derive(Debug, Clone)]
pub struct LinuxI2c {
    dev_dir: PathBuf,
}

impl LinuxI2c {
    pub fn new() -> Self {
        Self::with_dev_dir("/dev")
    }

    /// Look for bus nodes below `dev_dir` instead of `/dev`.
    pub fn with_dev_dir(dev_dir: impl Into<PathBuf>) -> Self {
        Self {
            dev_dir: dev_dir.into(),
        }
    }

    pub fn bus_path(&self, bus_id: u8) -> PathBuf {
        self.dev_dir.join(format!("i2c-{}", bus_id))
    }
}

impl Default for LinuxI2c {
    fn default() -> Self {
        Self::new()
    }
}

impl I2cPlatform for LinuxI2c {
    type Bus = I2cdev;

    fn open(&mut self, bus_id: u8) -> Result<I2cdev, TransportError> {
        let path = self.bus_path(bus_id);
        if !path.exists() {
            return Err(TransportError::NoSuchBus(bus_id));
        }
        I2cdev::new(&path).map_err(|e| {
            let e = std::io::Error::from(e);
            TransportError::PlatformFault(e.raw_os_error().unwrap_or(-1))
        })
    }
}
