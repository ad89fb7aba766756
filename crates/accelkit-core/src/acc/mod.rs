//! Accelerators: the execution model a kernel runs under.
//!
//! An accelerator fixes the dimensionality and index type of its index space,
//! the device it runs on, and how blocks of a work division are scheduled.

mod cpu;
#[cfg(feature = "cuda")]
mod cuda;

pub use cpu::{AccCpuSerial, AccCpuThreads};
#[cfg(feature = "cuda")]
pub use cuda::AccGpuCudaRt;

use crate::dev::{AccDevProps, DevCpu, Device};
use crate::error::Result;
use crate::types::{Dimension, Index};
use std::fmt::{self, Debug};

/// Family an accelerator belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccKind {
    /// One host thread, blocks run in order.
    CpuSerial,
    /// Blocks spread over a host thread pool.
    CpuThreads,
    /// CUDA runtime on a GPU.
    GpuCuda,
}

impl AccKind {
    /// Whether kernels of this accelerator run on the host.
    pub fn is_cpu(self) -> bool {
        matches!(self, Self::CpuSerial | Self::CpuThreads)
    }
}

impl fmt::Display for AccKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::CpuSerial => "cpu-serial",
            Self::CpuThreads => "cpu-threads",
            Self::GpuCuda => "gpu-cuda",
        };
        f.write_str(s)
    }
}

/// An accelerator type, parameterized by dimensionality and index type.
pub trait Accelerator: Debug + Send + Sync + 'static {
    /// Dimensionality of the index space.
    type Dim: Dimension;
    /// Index and extent type.
    type Idx: Index;
    /// Device the accelerator executes on.
    type Dev: Device;

    /// Accelerator name used in diagnostics.
    const NAME: &'static str;
    /// Accelerator family.
    const KIND: AccKind;

    /// Limits of `dev` as seen by this accelerator.
    fn dev_props(dev: &Self::Dev) -> Result<AccDevProps>;
}

/// An accelerator whose kernels are host closures.
pub trait CpuAccelerator: Accelerator<Dev = DevCpu> {
    /// Runs `f` once per work item. Items are independent blocks.
    fn run_blocks<W, F>(work: Vec<W>, f: F)
    where
        W: Send,
        F: Fn(W) + Send + Sync;

    /// Splits `out` into chunks of `chunk_len` and runs `f(chunk_index, chunk)`
    /// for each of them as one block.
    fn exec_chunks<T, F>(out: &mut [T], chunk_len: usize, f: F)
    where
        T: Send,
        F: Fn(usize, &mut [T]) + Send + Sync,
    {
        let blocks: Vec<(usize, &mut [T])> = out.chunks_mut(chunk_len.max(1)).enumerate().collect();
        Self::run_blocks(blocks, |(i, chunk)| f(i, chunk));
    }

    /// Stable sort of `items` by `key`, scheduled like the accelerator's blocks.
    fn sort_by_key<T, K, F>(items: &mut [T], key: F)
    where
        T: Send,
        K: Ord,
        F: Fn(&T) -> K + Sync,
    {
        items.sort_by_key(key);
    }
}
