//! Platforms enumerate devices of one kind.

use crate::dev::{DevCpu, Device};
use crate::error::{AccError, Result};

/// Enumerates and opens the devices of one kind.
pub trait Platform: Send + Sync + 'static {
    /// Device type this platform hands out.
    type Dev: Device;

    /// Platform name used in diagnostics.
    const NAME: &'static str;

    /// Number of devices currently available.
    fn dev_count() -> Result<usize>;

    /// Opens device `idx`. A non-existent index is a resource-acquisition error.
    fn dev_by_idx(idx: usize) -> Result<Self::Dev>;
}

/// The host processor, exposed as exactly one device.
#[derive(Debug, Clone, Copy, Default)]
pub struct PltfCpu;

impl Platform for PltfCpu {
    type Dev = DevCpu;
    const NAME: &'static str = "CPU";

    fn dev_count() -> Result<usize> {
        Ok(1)
    }

    fn dev_by_idx(idx: usize) -> Result<DevCpu> {
        if idx != 0 {
            return Err(AccError::resource(
                format!("CPU device {idx}"),
                "the host platform has a single device",
            ));
        }
        Ok(DevCpu::host())
    }
}

/// CUDA devices visible to the driver.
#[cfg(feature = "cuda")]
#[derive(Debug, Clone, Copy, Default)]
pub struct PltfCuda;

#[cfg(feature = "cuda")]
impl Platform for PltfCuda {
    type Dev = crate::dev::DevCuda;
    const NAME: &'static str = "CUDA";

    fn dev_count() -> Result<usize> {
        crate::dev::DevCuda::count()
    }

    fn dev_by_idx(idx: usize) -> Result<Self::Dev> {
        let count = Self::dev_count()?;
        if idx >= count {
            return Err(AccError::resource(
                format!("CUDA device {idx}"),
                format!("{count} device(s) available"),
            ));
        }
        crate::dev::DevCuda::new(idx)
    }
}
