//! Devices: the things that issue or execute work.

#[cfg(feature = "cuda")]
pub mod cuda;

use crate::config::cpu_info;
use crate::error::{AccError, Result};
use std::fmt::Debug;

#[cfg(feature = "cuda")]
pub use cuda::DevCuda;

/// Limits and capabilities of a device as seen by one accelerator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccDevProps {
    /// Independent execution units (CPU cores or GPU multiprocessors)
    pub multi_processor_count: usize,
    /// Maximum blocks per grid along one axis
    pub grid_block_extent_max: usize,
    /// Maximum threads per block
    pub block_thread_extent_max: usize,
    /// Maximum elements per thread
    pub thread_elem_extent_max: usize,
    /// Shared memory available to one block
    pub shared_mem_bytes: usize,
}

/// A handle to a device.
pub trait Device: Debug + Clone + Send + Sync + 'static {
    /// Human-readable device name.
    fn name(&self) -> String;

    /// Raw device limits, before an accelerator narrows them.
    fn props(&self) -> Result<AccDevProps>;
}

/// The host CPU as a device.
///
/// `concurrency` is the number of worker threads a multi-threaded accelerator
/// may use on this device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DevCpu {
    concurrency: usize,
}

impl DevCpu {
    /// The host CPU with the default concurrency.
    pub fn host() -> Self {
        Self {
            concurrency: cpu_info().default_threads,
        }
    }

    /// The same device limited to `threads` workers.
    pub fn with_concurrency(self, threads: usize) -> Result<Self> {
        if threads == 0 {
            return Err(AccError::invalid_configuration(
                "num_threads",
                threads,
                "must be at least 1",
            ));
        }
        Ok(Self {
            concurrency: threads,
        })
    }

    /// Worker threads available on this device.
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }
}

impl Default for DevCpu {
    fn default() -> Self {
        Self::host()
    }
}

impl Device for DevCpu {
    fn name(&self) -> String {
        let info = cpu_info();
        format!(
            "Host CPU ({} logical / {} physical cores)",
            info.logical_cores, info.physical_cores
        )
    }

    fn props(&self) -> Result<AccDevProps> {
        Ok(AccDevProps {
            multi_processor_count: self.concurrency,
            grid_block_extent_max: usize::MAX,
            block_thread_extent_max: 1,
            thread_elem_extent_max: usize::MAX,
            shared_mem_bytes: 0,
        })
    }
}
