//! Accelerator profiles: the compile-time bundle a backend is made of.
//!
//! A profile names, for one backend, every type an algorithm needs: the
//! index space, the accelerator, host and accelerator devices and platforms,
//! and the queue. The associated-type bounds tie all of them to one `Dim`,
//! one `Idx` and one accelerator device, so pieces of different profiles
//! cannot be combined.

use crate::acc::{AccKind, Accelerator};
use crate::dev::Device;
use crate::pltf::Platform;
use crate::queue::{Queue, QueueKind};
use crate::types::{Dimension, Index, Vector, WorkDivMembers};
use std::fmt;

/// A backend's bundle of types.
pub trait Profile: Send + Sync + 'static {
    /// Profile name.
    const NAME: &'static str;

    /// Index-space dimensionality.
    type Dim: Dimension;
    /// Index type.
    type Idx: Index;
    /// Extent type.
    type Extent: Index;
    /// Accelerator executing the kernels.
    type Acc: Accelerator<Dim = Self::Dim, Idx = Self::Idx, Dev = Self::DevAcc>;
    /// Device issuing work.
    type DevHost: Device;
    /// Device executing work.
    type DevAcc: Device;
    /// Platform enumerating host devices.
    type PltfHost: Platform<Dev = Self::DevHost>;
    /// Platform enumerating accelerator devices.
    type PltfAcc: Platform<Dev = Self::DevAcc>;
    /// Queue discipline.
    type Queue: Queue<Dev = Self::DevAcc>;
}

/// Work division type of profile `P`.
pub type WorkDivOf<P> = WorkDivMembers<<P as Profile>::Dim, <P as Profile>::Idx>;

/// Vector type of profile `P`.
pub type VecOf<P> = Vector<<P as Profile>::Dim, <P as Profile>::Idx>;

/// Run-time summary of a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProfileInfo {
    /// Profile name
    pub name: &'static str,
    /// Accelerator name
    pub acc: &'static str,
    /// Accelerator family
    pub kind: AccKind,
    /// Number of index-space axes
    pub dim: usize,
    /// Width of the index type in bits
    pub idx_bits: u32,
    /// Queue discipline
    pub queue: QueueKind,
    /// Host platform name
    pub host_platform: &'static str,
    /// Accelerator platform name
    pub acc_platform: &'static str,
}

impl fmt::Display for ProfileInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}, {}D u{}, {:?} queue on {})",
            self.name, self.acc, self.dim, self.idx_bits, self.queue, self.acc_platform
        )
    }
}

/// Describes profile `P`.
pub fn describe<P: Profile>() -> ProfileInfo {
    ProfileInfo {
        name: P::NAME,
        acc: <P::Acc as Accelerator>::NAME,
        kind: <P::Acc as Accelerator>::KIND,
        dim: <P::Dim as Dimension>::VALUE,
        idx_bits: <P::Idx as Index>::bits(),
        queue: <P::Queue as Queue>::KIND,
        host_platform: <P::PltfHost as Platform>::NAME,
        acc_platform: <P::PltfAcc as Platform>::NAME,
    }
}

/// Declares a backend namespace.
///
/// Expands, inside the invoking module, to the fixed alias names `Dim`, `Idx`,
/// `Extent`, `Acc`, `DevHost`, `DevAcc`, `PltfHost`, `PltfAcc`, `Queue`,
/// `WorkDiv` and `Vec`, a `NAME` constant, and a `Backend` marker type
/// implementing [`Profile`]. Every profile uses a one-dimensional `u64`
/// index space with the host CPU as issuing device.
///
/// ```
/// mod serial {
///     accelkit_core::accel_profile! {
///         name: "serial",
///         acc: AccCpuSerial,
///         dev_acc: accelkit_core::dev::DevCpu,
///         pltf_acc: accelkit_core::pltf::PltfCpu,
///         queue: accelkit_core::queue::QueueCpuBlocking,
///     }
/// }
///
/// use accelkit_core::types::Dimension;
/// assert_eq!(<serial::Dim as Dimension>::VALUE, 1);
/// assert_eq!(accelkit_core::describe::<serial::Backend>().name, "serial");
/// ```
#[macro_export]
macro_rules! accel_profile {
    (
        name: $name:literal,
        acc: $acc:ident,
        dev_acc: $dev_acc:ty,
        pltf_acc: $pltf_acc:ty,
        queue: $queue:ty $(,)?
    ) => {
        /// Name of this backend.
        pub const NAME: &str = $name;

        /// Index-space dimensionality.
        pub type Dim = $crate::types::DimInt<1>;
        /// Index type.
        pub type Idx = u64;
        /// Extent type.
        pub type Extent = u64;
        /// Accelerator.
        pub type Acc = $crate::acc::$acc<Dim, Idx>;
        /// Device issuing work.
        pub type DevHost = $crate::dev::DevCpu;
        /// Device executing work.
        pub type DevAcc = $dev_acc;
        /// Host platform.
        pub type PltfHost = $crate::pltf::PltfCpu;
        /// Accelerator platform.
        pub type PltfAcc = $pltf_acc;
        /// Execution queue.
        pub type Queue = $queue;
        /// Work division.
        pub type WorkDiv = $crate::types::WorkDivMembers<Dim, Idx>;
        /// Index vector.
        pub type Vec = $crate::types::Vector<Dim, Idx>;

        /// Marker type carrying this backend's profile.
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
        pub struct Backend;

        impl $crate::profile::Profile for Backend {
            const NAME: &'static str = $name;
            type Dim = Dim;
            type Idx = Idx;
            type Extent = Extent;
            type Acc = Acc;
            type DevHost = DevHost;
            type DevAcc = DevAcc;
            type PltfHost = PltfHost;
            type PltfAcc = PltfAcc;
            type Queue = Queue;
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acc::AccCpuSerial;
    use crate::dev::DevCpu;
    use crate::pltf::PltfCpu;
    use crate::queue::QueueCpuBlocking;
    use crate::types::Dim1;

    struct Manual;

    impl Profile for Manual {
        const NAME: &'static str = "manual";
        type Dim = Dim1;
        type Idx = u32;
        type Extent = u32;
        type Acc = AccCpuSerial<Dim1, u32>;
        type DevHost = DevCpu;
        type DevAcc = DevCpu;
        type PltfHost = PltfCpu;
        type PltfAcc = PltfCpu;
        type Queue = QueueCpuBlocking;
    }

    mod generated {
        crate::accel_profile! {
            name: "generated",
            acc: AccCpuThreads,
            dev_acc: crate::dev::DevCpu,
            pltf_acc: crate::pltf::PltfCpu,
            queue: crate::queue::QueueCpuNonBlocking,
        }
    }

    #[test]
    fn test_describe_manual() {
        let info = describe::<Manual>();
        assert_eq!(info.name, "manual");
        assert_eq!(info.acc, "AccCpuSerial");
        assert_eq!(info.kind, AccKind::CpuSerial);
        assert_eq!(info.dim, 1);
        assert_eq!(info.idx_bits, 32);
        assert_eq!(info.queue, QueueKind::Blocking);
    }

    #[test]
    fn test_generated_aliases() {
        assert_eq!(generated::NAME, "generated");
        assert_eq!(std::mem::size_of::<generated::Idx>(), 8);
        assert_eq!(<generated::Queue as Queue>::KIND, QueueKind::NonBlocking);

        let v: VecOf<generated::Backend> = generated::Vec::splat(3);
        assert_eq!(v.prod().unwrap(), 3);

        let info = describe::<generated::Backend>();
        assert_eq!(info.kind, AccKind::CpuThreads);
        assert!(info.to_string().starts_with("generated (AccCpuThreads, 1D u64"));
    }
}
