//! Runtime configuration for the host side.

pub mod features;

pub use features::{cpu_info, CpuInfo, CPU_INFO};
