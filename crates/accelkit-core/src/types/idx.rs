//! Numeric types usable as indices and extents.

use crate::error::{AccError, Result};
use num_traits::{NumCast, PrimInt, ToPrimitive, Unsigned};
use std::fmt::{Debug, Display};
use std::hash::Hash;

/// Unsigned integer type used for indices and extents.
///
/// Conversions to and from `usize` are checked: an extent that does not fit
/// is an [`AccError::IndexOverflow`], never a silent truncation.
pub trait Index:
    PrimInt + Unsigned + Debug + Display + Hash + Default + Send + Sync + 'static
{
    /// Converts a host-side size into this index type.
    fn from_usize(value: usize) -> Result<Self>;

    /// Converts this index into a host-side size.
    fn into_usize(self) -> Result<usize>;

    /// Size of the type in bits.
    fn bits() -> u32 {
        Self::zero().count_zeros()
    }
}

impl<T> Index for T
where
    T: PrimInt + Unsigned + Debug + Display + Hash + Default + Send + Sync + 'static,
{
    fn from_usize(value: usize) -> Result<Self> {
        <T as NumCast>::from(value).ok_or_else(|| AccError::index_overflow(value))
    }

    fn into_usize(self) -> Result<usize> {
        ToPrimitive::to_usize(&self).ok_or_else(|| AccError::index_overflow(self))
    }
}
