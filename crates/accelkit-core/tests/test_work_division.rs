//! Property tests for work division coverage.
//!
//! A division produced for an extent must hand every element to exactly one
//! thread, with thread ranges in increasing order.

use accelkit_core::{
    dev::AccDevProps,
    types::{is_valid_work_div, valid_work_div, Dim1, Vector},
};
use proptest::prelude::*;

fn arb_props() -> impl Strategy<Value = AccDevProps> {
    (1usize..64, 1usize..512, 1usize..8).prop_map(|(grid, block, mp)| AccDevProps {
        multi_processor_count: mp,
        grid_block_extent_max: grid,
        block_thread_extent_max: block,
        thread_elem_extent_max: usize::MAX,
        shared_mem_bytes: 0,
    })
}

proptest! {
    #[test]
    fn prop_threads_cover_extent_once(
        props in arb_props(),
        extent in 0usize..5_000,
        block_threads in 1u64..1024,
        thread_elems in 1u64..64,
    ) {
        let wd = valid_work_div::<Dim1, u64>(
            &props,
            Vector::from(extent as u64),
            block_threads,
            thread_elems,
        ).unwrap();
        prop_assert!(is_valid_work_div(&props, &wd));

        let mut next = 0usize;
        for block in 0..wd.num_blocks().unwrap() {
            let block_range = wd.block_elem_range(block, extent).unwrap();
            prop_assert_eq!(block_range.start, next);
            for thread in 0..wd.block_threads().unwrap() {
                let r = wd.thread_elem_range(block, thread, extent).unwrap();
                prop_assert_eq!(r.start, next);
                prop_assert!(r.end <= block_range.end);
                next = r.end;
            }
            prop_assert_eq!(next, block_range.end);
        }
        prop_assert_eq!(next, extent);
    }

    #[test]
    fn prop_grid_covers_extent(
        props in arb_props(),
        extent in 1u64..100_000,
        thread_elems in 1u64..16,
    ) {
        let wd = valid_work_div::<Dim1, u64>(&props, extent.into(), 256, thread_elems).unwrap();
        let covered = wd.grid_elem_extent().unwrap()[0];
        let per_block = wd.block_elem_extent().unwrap()[0];
        prop_assert!(covered >= extent);
        prop_assert!(covered - extent < per_block);
    }
}

#[test]
fn test_empty_extent_has_no_blocks() {
    let props = AccDevProps {
        multi_processor_count: 1,
        grid_block_extent_max: 8,
        block_thread_extent_max: 32,
        thread_elem_extent_max: 1,
        shared_mem_bytes: 0,
    };
    let wd = valid_work_div::<Dim1, u64>(&props, 0u64.into(), 32, 1).unwrap();
    assert_eq!(wd.num_blocks().unwrap(), 0);
}

#[test]
fn test_extent_beyond_limits_rejected() {
    let props = AccDevProps {
        multi_processor_count: 1,
        grid_block_extent_max: 2,
        block_thread_extent_max: 4,
        thread_elem_extent_max: 2,
        shared_mem_bytes: 0,
    };
    // At most 2 * 4 * 2 elements fit.
    assert!(valid_work_div::<Dim1, u64>(&props, 16u64.into(), 4, 1).is_ok());
    assert!(valid_work_div::<Dim1, u64>(&props, 17u64.into(), 4, 1).is_err());
}
