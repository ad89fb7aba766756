//! Accelerator profiles for running one algorithm on several parallel backends.
//!
//! This crate provides the building blocks a backend is described with and
//! the run-time pieces it needs to execute work.
//!
//! # Key Concepts
//!
//! - **Index space**: a [`Dimension`](types::Dimension) and an
//!   [`Index`](types::Index) type, with [`Vector`](types::Vector) extents
//! - **Work division**: grid blocks, block threads and thread elements
//!   ([`WorkDivMembers`](types::WorkDivMembers))
//! - **Devices and platforms**: [`DevCpu`](dev::DevCpu) and, with the `cuda`
//!   feature, `DevCuda`, enumerated by [`Platform`](pltf::Platform)s
//! - **Queues**: blocking and non-blocking submission ([`queue`])
//! - **Accelerators**: the execution model kernels run under ([`acc`])
//! - **Profiles**: the compile-time bundle of all of the above ([`Profile`])
//!
//! # Modules
//!
//! - [`acc`]: accelerator traits and types
//! - [`config`]: host CPU detection
//! - [`dev`]: devices and their limits
//! - [`error`]: error types
//! - [`pltf`]: device enumeration
//! - [`profile`]: the `Profile` trait and the `accel_profile!` macro
//! - [`queue`]: execution queues
//! - [`types`]: dimensions, indices, vectors and work divisions

pub mod acc;
pub mod config;
pub mod dev;
pub mod error;
pub mod pltf;
pub mod profile;
pub mod queue;
pub mod types;

pub use error::{AccError, Result};
pub use profile::{describe, Profile, ProfileInfo, VecOf, WorkDivOf};

/// Prelude module for convenient imports.
///
/// # Example
/// ```
/// use accelkit_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::acc::{AccCpuSerial, AccCpuThreads, AccKind, Accelerator, CpuAccelerator};
    pub use crate::dev::{AccDevProps, DevCpu, Device};
    pub use crate::error::{AccError, Result};
    pub use crate::pltf::{Platform, PltfCpu};
    pub use crate::profile::{describe, Profile, ProfileInfo, VecOf, WorkDivOf};
    pub use crate::queue::{Queue, QueueCpuBlocking, QueueCpuNonBlocking, QueueKind, TaskQueue};
    pub use crate::types::{
        is_valid_work_div, valid_work_div, Dim1, Dim2, Dim3, DimInt, Dimension, Index, Vector,
        WorkDivMembers,
    };

    #[cfg(feature = "cuda")]
    pub use crate::{acc::AccGpuCudaRt, dev::DevCuda, pltf::PltfCuda, queue::QueueCudaRtNonBlocking};
}
