//! Coordinate and extent tuples.

use super::dim::Dimension;
use super::idx::Index;
use crate::error::{AccError, Result};
use std::fmt;
use std::ops::{Index as IndexOp, IndexMut};

/// A tuple of `D::VALUE` indices, used for positions and extents.
///
/// The storage type is chosen by the dimension, so a `Vector<Dim1, u64>`
/// can never be mixed with a `Vector<Dim3, u64>` or a `Vector<Dim1, u32>`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Vector<D: Dimension, I: Index> {
    data: D::Array<I>,
}

impl<D: Dimension, I: Index> Vector<D, I> {
    /// Number of components.
    pub const DIM: usize = D::VALUE;

    /// Creates a vector from its components.
    pub fn from_array(data: D::Array<I>) -> Self {
        Self { data }
    }

    /// Creates a vector with every component set to `value`.
    pub fn splat(value: I) -> Self {
        Self {
            data: D::splat(value),
        }
    }

    /// All components zero.
    pub fn zeros() -> Self {
        Self::splat(I::zero())
    }

    /// All components one.
    pub fn ones() -> Self {
        Self::splat(I::one())
    }

    /// Vector of ones except for the last axis, which carries `value`.
    ///
    /// This is how a linear extent is laid out over a multi-dimensional index
    /// space: the fastest-varying axis is the last one.
    pub fn last_axis(value: I) -> Self {
        let mut v = Self::ones();
        if let Some(last) = v.data.as_mut().last_mut() {
            *last = value;
        }
        v
    }

    /// Components as a slice.
    pub fn as_slice(&self) -> &[I] {
        self.data.as_ref()
    }

    /// Component at `axis`, if it exists.
    pub fn get(&self, axis: usize) -> Option<I> {
        self.as_slice().get(axis).copied()
    }

    /// Product of all components, checked for overflow.
    pub fn prod(&self) -> Result<I> {
        self.as_slice().iter().try_fold(I::one(), |acc, &x| {
            acc.checked_mul(&x)
                .ok_or_else(|| AccError::index_overflow(format!("{self:?} product")))
        })
    }

    /// Product of all components as a host-side size.
    pub fn prod_usize(&self) -> Result<usize> {
        self.prod()?.into_usize()
    }

    /// Applies `f` to every component.
    pub fn map<F: Fn(I) -> I>(&self, f: F) -> Self {
        let mut out = *self;
        for x in out.data.as_mut() {
            *x = f(*x);
        }
        out
    }

    /// Combines two vectors component-wise, failing on the first error.
    pub fn try_zip_with<F>(&self, other: &Self, f: F) -> Result<Self>
    where
        F: Fn(I, I) -> Result<I>,
    {
        let mut out = *self;
        for (x, &y) in out.data.as_mut().iter_mut().zip(other.as_slice()) {
            *x = f(*x, y)?;
        }
        Ok(out)
    }

    /// Component-wise checked product.
    pub fn checked_mul(&self, other: &Self) -> Result<Self> {
        self.try_zip_with(other, |a, b| {
            a.checked_mul(&b)
                .ok_or_else(|| AccError::index_overflow(format!("{a} * {b}")))
        })
    }

    /// Component-wise ceiling division. A zero divisor is rejected.
    pub fn ceil_div(&self, divisor: &Self) -> Result<Self> {
        self.try_zip_with(divisor, |a, b| {
            if b.is_zero() {
                return Err(AccError::invalid_work_div("division by a zero extent"));
            }
            let q = a / b;
            Ok(if (a % b).is_zero() { q } else { q + I::one() })
        })
    }

    /// Whether every component of `self` is at most the matching one in `other`.
    pub fn all_le(&self, other: &Self) -> bool {
        self.as_slice()
            .iter()
            .zip(other.as_slice())
            .all(|(a, b)| a <= b)
    }
}

impl<D: Dimension, I: Index> Default for Vector<D, I> {
    fn default() -> Self {
        Self::zeros()
    }
}

impl<D: Dimension, I: Index> fmt::Debug for Vector<D, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Vec{}", D::VALUE)?;
        f.debug_list().entries(self.as_slice()).finish()
    }
}

impl<D: Dimension, I: Index> IndexOp<usize> for Vector<D, I> {
    type Output = I;

    fn index(&self, axis: usize) -> &I {
        &self.data.as_ref()[axis]
    }
}

impl<D: Dimension, I: Index> IndexMut<usize> for Vector<D, I> {
    fn index_mut(&mut self, axis: usize) -> &mut I {
        &mut self.data.as_mut()[axis]
    }
}

impl<I: Index> From<I> for Vector<super::dim::DimInt<1>, I> {
    fn from(value: I) -> Self {
        Self::from_array([value])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::dim::{Dim1, Dim3};

    #[test]
    fn test_construction() {
        let v = Vector::<Dim3, u64>::from_array([1, 2, 3]);
        assert_eq!(v[0], 1);
        assert_eq!(v.get(2), Some(3));
        assert_eq!(v.get(3), None);
        assert_eq!(Vector::<Dim3, u64>::DIM, 3);

        let v: Vector<Dim1, u64> = 9u64.into();
        assert_eq!(v.as_slice(), &[9]);
    }

    #[test]
    fn test_last_axis() {
        let v = Vector::<Dim3, u32>::last_axis(5);
        assert_eq!(v.as_slice(), &[1, 1, 5]);
        assert_eq!(v.prod().unwrap(), 5);
    }

    #[test]
    fn test_prod_overflow() {
        let v = Vector::<Dim3, u8>::from_array([16, 16, 2]);
        assert!(matches!(v.prod(), Err(AccError::IndexOverflow { .. })));
    }

    #[test]
    fn test_ceil_div() {
        let a = Vector::<Dim1, u64>::from(10u64);
        let b = Vector::<Dim1, u64>::from(4u64);
        assert_eq!(a.ceil_div(&b).unwrap()[0], 3);

        let exact = Vector::<Dim1, u64>::from(8u64);
        assert_eq!(exact.ceil_div(&b).unwrap()[0], 2);

        let zero = Vector::<Dim1, u64>::zeros();
        assert!(a.ceil_div(&zero).is_err());
    }

    #[test]
    fn test_debug_format() {
        let v = Vector::<Dim3, u64>::from_array([4, 5, 6]);
        assert_eq!(format!("{v:?}"), "Vec3[4, 5, 6]");
    }
}
