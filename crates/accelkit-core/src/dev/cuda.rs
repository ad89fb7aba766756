//! CUDA devices through cudarc.

use super::{AccDevProps, Device};
use crate::error::{AccError, Result};
use cudarc::driver::sys::CUdevice_attribute;
use cudarc::driver::CudaDevice;
use std::fmt;
use std::sync::Arc;

/// A CUDA device and its primary context.
#[derive(Clone)]
pub struct DevCuda {
    inner: Arc<CudaDevice>,
}

impl DevCuda {
    /// Opens device `ordinal`.
    pub fn new(ordinal: usize) -> Result<Self> {
        let inner = CudaDevice::new(ordinal)
            .map_err(|e| AccError::resource(format!("CUDA device {ordinal}"), e))?;
        tracing::debug!(ordinal, "opened CUDA device");
        Ok(Self { inner })
    }

    /// Number of CUDA devices visible to the driver.
    pub fn count() -> Result<usize> {
        let n = CudaDevice::count().map_err(|e| AccError::resource("CUDA driver", e))?;
        Ok(usize::try_from(n).unwrap_or(0))
    }

    /// Driver ordinal of this device.
    pub fn ordinal(&self) -> usize {
        self.inner.ordinal()
    }

    /// The underlying cudarc handle.
    pub fn cuda(&self) -> &Arc<CudaDevice> {
        &self.inner
    }

    fn attribute(&self, attr: CUdevice_attribute) -> Result<usize> {
        let v = self
            .inner
            .attribute(attr)
            .map_err(|e| AccError::resource(format!("CUDA attribute {attr:?}"), e))?;
        usize::try_from(v).map_err(|_| AccError::index_overflow(v))
    }
}

impl fmt::Debug for DevCuda {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DevCuda")
            .field("ordinal", &self.ordinal())
            .finish()
    }
}

impl Device for DevCuda {
    fn name(&self) -> String {
        self.inner
            .name()
            .unwrap_or_else(|_| format!("CUDA device {}", self.ordinal()))
    }

    fn props(&self) -> Result<AccDevProps> {
        Ok(AccDevProps {
            multi_processor_count: self
                .attribute(CUdevice_attribute::CU_DEVICE_ATTRIBUTE_MULTIPROCESSOR_COUNT)?,
            grid_block_extent_max: self
                .attribute(CUdevice_attribute::CU_DEVICE_ATTRIBUTE_MAX_GRID_DIM_X)?,
            block_thread_extent_max: self
                .attribute(CUdevice_attribute::CU_DEVICE_ATTRIBUTE_MAX_THREADS_PER_BLOCK)?,
            thread_elem_extent_max: usize::MAX,
            shared_mem_bytes: self
                .attribute(CUdevice_attribute::CU_DEVICE_ATTRIBUTE_MAX_SHARED_MEMORY_PER_BLOCK)?,
        })
    }
}
