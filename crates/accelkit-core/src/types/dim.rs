//! Index-space dimensionality.

use super::idx::Index;
use std::fmt::Debug;
use std::hash::Hash;

/// Compile-time dimensionality of an index space.
///
/// The associated `Array` type is the storage used by [`Vector`](super::vec::Vector)
/// so that a vector's length is fixed by its dimension, not by a runtime value.
pub trait Dimension: Copy + Debug + Default + PartialEq + Eq + Hash + Send + Sync + 'static {
    /// Number of axes.
    const VALUE: usize;

    /// Fixed-size storage for one index per axis.
    type Array<I: Index>: Copy
        + Debug
        + PartialEq
        + Eq
        + Hash
        + Send
        + Sync
        + AsRef<[I]>
        + AsMut<[I]>;

    /// Storage with every axis set to `value`.
    fn splat<I: Index>(value: I) -> Self::Array<I>;
}

/// Dimension given by a const parameter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct DimInt<const N: usize>;

impl<const N: usize> Dimension for DimInt<N> {
    const VALUE: usize = N;

    type Array<I: Index> = [I; N];

    fn splat<I: Index>(value: I) -> [I; N] {
        [value; N]
    }
}

/// One-dimensional index space.
pub type Dim1 = DimInt<1>;

/// Two-dimensional index space.
pub type Dim2 = DimInt<2>;

/// Three-dimensional index space.
pub type Dim3 = DimInt<3>;
