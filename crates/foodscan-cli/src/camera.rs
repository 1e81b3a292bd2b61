//! Camera backed by a V4L2 device node.
//!
//! The device is opened read-only to check access and held for the lifetime
//! of the stream; `zbarcam` opens it again for capture.

use std::fs::{File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use foodscan_acquisition::{AcquisitionError, Camera, MediaStream, Result};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct V4l2Camera {
    device: PathBuf,
}

impl V4l2Camera {
    pub fn new(device: impl Into<PathBuf>) -> Self {
        Self {
            device: device.into(),
        }
    }

    #[must_use]
    pub fn device(&self) -> &Path {
        &self.device
    }
}

impl Camera for V4l2Camera {
    fn is_supported(&self) -> bool {
        self.device.exists()
    }

    fn open(&self) -> Result<Box<dyn MediaStream>> {
        let handle = OpenOptions::new()
            .read(true)
            .open(&self.device)
            .map_err(|err| match err.kind() {
                ErrorKind::PermissionDenied => AcquisitionError::CameraPermissionDenied,
                ErrorKind::NotFound => AcquisitionError::CameraUnsupported,
                _ => AcquisitionError::Camera(format!("{}: {err}", self.device.display())),
            })?;
        debug!(device = %self.device.display(), "camera opened");
        Ok(Box::new(DeviceStream {
            source: self.device.display().to_string(),
            handle: Some(handle),
        }))
    }
}

struct DeviceStream {
    source: String,
    handle: Option<File>,
}

impl MediaStream for DeviceStream {
    fn source(&self) -> &str {
        &self.source
    }

    fn stop(&mut self) -> Result<()> {
        if self.handle.take().is_some() {
            debug!(device = %self.source, "camera closed");
        }
        Ok(())
    }
}
