//! Per-backend implementations of the pipeline stages.

#[cfg(any(feature = "serial", feature = "threads"))]
pub(crate) mod cpu;

#[cfg(feature = "cuda")]
mod cuda;
#[cfg(feature = "cuda")]
mod cuda_kernels;
