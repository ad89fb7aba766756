//! Work division: how an index space is split into blocks, threads and elements.

use super::dim::Dimension;
use super::idx::Index;
use super::vec::Vector;
use crate::dev::AccDevProps;
use crate::error::{AccError, Result};
use std::ops::Range;

/// Partition of an index space into grid blocks, block threads and thread elements.
///
/// Ranges handed out by [`block_elem_range`](Self::block_elem_range) and
/// [`thread_elem_range`](Self::thread_elem_range) are over the linearized
/// index space, last axis fastest.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct WorkDivMembers<D: Dimension, I: Index> {
    grid_block_extent: Vector<D, I>,
    block_thread_extent: Vector<D, I>,
    thread_elem_extent: Vector<D, I>,
}

impl<D: Dimension, I: Index> WorkDivMembers<D, I> {
    /// Creates a work division from its three extents.
    pub fn new(
        grid_block_extent: Vector<D, I>,
        block_thread_extent: Vector<D, I>,
        thread_elem_extent: Vector<D, I>,
    ) -> Self {
        Self {
            grid_block_extent,
            block_thread_extent,
            thread_elem_extent,
        }
    }

    /// Blocks per grid.
    pub fn grid_block_extent(&self) -> Vector<D, I> {
        self.grid_block_extent
    }

    /// Threads per block.
    pub fn block_thread_extent(&self) -> Vector<D, I> {
        self.block_thread_extent
    }

    /// Elements per thread.
    pub fn thread_elem_extent(&self) -> Vector<D, I> {
        self.thread_elem_extent
    }

    /// Threads per grid.
    pub fn grid_thread_extent(&self) -> Result<Vector<D, I>> {
        self.grid_block_extent.checked_mul(&self.block_thread_extent)
    }

    /// Elements per block.
    pub fn block_elem_extent(&self) -> Result<Vector<D, I>> {
        self.block_thread_extent.checked_mul(&self.thread_elem_extent)
    }

    /// Elements per grid.
    pub fn grid_elem_extent(&self) -> Result<Vector<D, I>> {
        self.grid_thread_extent()?
            .checked_mul(&self.thread_elem_extent)
    }

    /// Total number of blocks.
    pub fn num_blocks(&self) -> Result<usize> {
        self.grid_block_extent.prod_usize()
    }

    /// Threads in one block.
    pub fn block_threads(&self) -> Result<usize> {
        self.block_thread_extent.prod_usize()
    }

    /// Total number of threads in the grid.
    pub fn num_threads(&self) -> Result<usize> {
        self.grid_thread_extent()?.prod_usize()
    }

    /// Elements handled by one thread.
    pub fn thread_elems(&self) -> Result<usize> {
        self.thread_elem_extent.prod_usize()
    }

    /// Linear range of elements owned by `block`, clipped to `extent`.
    pub fn block_elem_range(&self, block: usize, extent: usize) -> Result<Range<usize>> {
        let per_block = self.block_elem_extent()?.prod_usize()?;
        Ok(clipped_range(block, per_block, 0, extent))
    }

    /// Linear range of elements owned by `thread` of `block`, clipped to `extent`.
    pub fn thread_elem_range(
        &self,
        block: usize,
        thread: usize,
        extent: usize,
    ) -> Result<Range<usize>> {
        let per_thread = self.thread_elems()?;
        let per_block = self.block_elem_extent()?.prod_usize()?;
        let base = block.saturating_mul(per_block);
        Ok(clipped_range(thread, per_thread, base, extent))
    }
}

fn clipped_range(slot: usize, width: usize, base: usize, extent: usize) -> Range<usize> {
    let start = base
        .saturating_add(slot.saturating_mul(width))
        .min(extent);
    let end = start.saturating_add(width).min(extent);
    start..end
}

impl<D: Dimension, I: Index> std::fmt::Debug for WorkDivMembers<D, I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkDiv")
            .field("grid_blocks", &self.grid_block_extent)
            .field("block_threads", &self.block_thread_extent)
            .field("thread_elems", &self.thread_elem_extent)
            .finish()
    }
}

/// Builds a work division covering `extent` that fits the device limits.
///
/// `block_threads` and `thread_elems` are preferences for the last axis; the
/// other axes get one thread with one element each. Preferences are clamped to
/// the device maxima, block threads are reduced for extents smaller than one
/// block, and thread elements are raised when the grid would otherwise exceed
/// its maximum. A zero extent yields a division with zero blocks.
pub fn valid_work_div<D: Dimension, I: Index>(
    props: &AccDevProps,
    extent: Vector<D, I>,
    block_threads: I,
    thread_elems: I,
) -> Result<WorkDivMembers<D, I>> {
    if block_threads.is_zero() || thread_elems.is_zero() {
        return Err(AccError::invalid_work_div(format!(
            "preferred block threads ({block_threads}) and thread elements ({thread_elems}) must be positive"
        )));
    }

    let block_max = limit::<I>(props.block_thread_extent_max);
    let elem_max = limit::<I>(props.thread_elem_extent_max);
    let grid_max = limit::<I>(props.grid_block_extent_max);
    let last = D::VALUE.saturating_sub(1);

    let mut grid = Vector::<D, I>::ones();
    let mut block = Vector::<D, I>::ones();
    let mut elems = Vector::<D, I>::ones();

    for axis in 0..D::VALUE {
        let e = extent[axis];
        if e.is_zero() {
            grid[axis] = I::zero();
            continue;
        }
        if axis != last {
            if e > grid_max {
                return Err(AccError::invalid_work_div(format!(
                    "extent {e} on axis {axis} exceeds the grid limit {grid_max}"
                )));
            }
            grid[axis] = e;
            continue;
        }

        let mut te = thread_elems.min(elem_max);
        let mut bt = block_threads.min(block_max).min(ceil_div(e, te));
        if bt.is_zero() {
            bt = I::one();
        }
        let mut gb = ceil_div(e, checked_mul(bt, te)?);
        if gb > grid_max {
            te = ceil_div(e, checked_mul(grid_max, bt)?);
            if te > elem_max {
                return Err(AccError::invalid_work_div(format!(
                    "extent {e} needs {te} elements per thread, device allows {elem_max}"
                )));
            }
            gb = ceil_div(e, checked_mul(bt, te)?);
        }
        grid[axis] = gb;
        block[axis] = bt;
        elems[axis] = te;
    }

    let wd = WorkDivMembers::new(grid, block, elems);
    tracing::debug!(?extent, work_div = ?wd, "derived work division");
    Ok(wd)
}

/// Whether every component of `wd` is within the device limits.
pub fn is_valid_work_div<D: Dimension, I: Index>(
    props: &AccDevProps,
    wd: &WorkDivMembers<D, I>,
) -> bool {
    let within = |v: &Vector<D, I>, max: usize| {
        v.as_slice()
            .iter()
            .all(|x| x.into_usize().map_or(false, |x| x <= max))
    };
    let block_total_ok = wd
        .block_threads()
        .map_or(false, |n| n <= props.block_thread_extent_max);

    within(&wd.grid_block_extent, props.grid_block_extent_max)
        && within(&wd.block_thread_extent, props.block_thread_extent_max)
        && within(&wd.thread_elem_extent, props.thread_elem_extent_max)
        && block_total_ok
}

/// Device limit in the index type; limits beyond its range saturate.
fn limit<I: Index>(max: usize) -> I {
    I::from_usize(max.max(1)).unwrap_or_else(|_| I::max_value())
}

fn checked_mul<I: Index>(a: I, b: I) -> Result<I> {
    a.checked_mul(&b)
        .ok_or_else(|| AccError::index_overflow(format!("{a} * {b}")))
}

fn ceil_div<I: Index>(a: I, b: I) -> I {
    let q = a / b;
    if (a % b).is_zero() {
        q
    } else {
        q + I::one()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::dim::{Dim1, Dim2};

    fn gpu_like() -> AccDevProps {
        AccDevProps {
            multi_processor_count: 8,
            grid_block_extent_max: 16,
            block_thread_extent_max: 256,
            thread_elem_extent_max: usize::MAX,
            shared_mem_bytes: 48 * 1024,
        }
    }

    fn cpu_like() -> AccDevProps {
        AccDevProps {
            multi_processor_count: 4,
            grid_block_extent_max: usize::MAX,
            block_thread_extent_max: 1,
            thread_elem_extent_max: usize::MAX,
            shared_mem_bytes: 0,
        }
    }

    #[test]
    fn test_block_threads_clamped_to_device() {
        let wd = valid_work_div::<Dim1, u64>(&gpu_like(), 1000u64.into(), 1024, 1).unwrap();
        assert_eq!(wd.block_thread_extent()[0], 256);
        assert!(is_valid_work_div(&gpu_like(), &wd));
        assert!(wd.grid_elem_extent().unwrap()[0] >= 1000);
    }

    #[test]
    fn test_small_extent_shrinks_block() {
        let wd = valid_work_div::<Dim1, u64>(&gpu_like(), 10u64.into(), 256, 1).unwrap();
        assert_eq!(wd.grid_block_extent()[0], 1);
        assert_eq!(wd.block_thread_extent()[0], 10);
    }

    #[test]
    fn test_grid_limit_raises_thread_elems() {
        let wd = valid_work_div::<Dim1, u64>(&gpu_like(), 100_000u64.into(), 256, 1).unwrap();
        assert!(wd.grid_block_extent()[0] <= 16);
        assert!(wd.thread_elem_extent()[0] > 1);
        assert!(wd.grid_elem_extent().unwrap()[0] >= 100_000);
    }

    #[test]
    fn test_cpu_division() {
        let wd = valid_work_div::<Dim1, u64>(&cpu_like(), 10u64.into(), 64, 4).unwrap();
        assert_eq!(wd.block_thread_extent()[0], 1);
        assert_eq!(wd.thread_elem_extent()[0], 4);
        assert_eq!(wd.num_blocks().unwrap(), 3);
        assert_eq!(wd.block_elem_range(2, 10).unwrap(), 8..10);
        assert_eq!(wd.thread_elem_range(1, 0, 10).unwrap(), 4..8);
    }

    #[test]
    fn test_empty_extent() {
        let wd = valid_work_div::<Dim1, u64>(&cpu_like(), 0u64.into(), 1, 4).unwrap();
        assert_eq!(wd.num_blocks().unwrap(), 0);
        assert_eq!(wd.num_threads().unwrap(), 0);
    }

    #[test]
    fn test_zero_preferences_rejected() {
        let err = valid_work_div::<Dim1, u64>(&cpu_like(), 5u64.into(), 1, 0).unwrap_err();
        assert!(matches!(err, AccError::InvalidWorkDiv { .. }));
    }

    #[test]
    fn test_multi_dim_outer_axes() {
        let extent = Vector::<Dim2, u32>::from_array([3, 40]);
        let wd = valid_work_div(&gpu_like(), extent, 16, 1).unwrap();
        assert_eq!(wd.grid_block_extent().as_slice(), &[3, 3]);
        assert_eq!(wd.block_thread_extent().as_slice(), &[1, 16]);
        assert_eq!(wd.num_blocks().unwrap(), 9);
    }

    #[test]
    fn test_invalid_division_detected() {
        let wd = WorkDivMembers::<Dim1, u64>::new(1u64.into(), 512u64.into(), 1u64.into());
        assert!(!is_valid_work_div(&gpu_like(), &wd));
    }
}
