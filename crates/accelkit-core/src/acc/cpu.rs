use super::{AccKind, Accelerator, CpuAccelerator};
use crate::dev::{AccDevProps, DevCpu, Device};
use crate::error::Result;
use crate::types::{Dimension, Index};
use rayon::prelude::*;
use std::marker::PhantomData;

/// Single-threaded CPU accelerator: one thread per block, blocks run in order.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccCpuSerial<D, I>(PhantomData<(D, I)>);

impl<D: Dimension, I: Index> Accelerator for AccCpuSerial<D, I> {
    type Dim = D;
    type Idx = I;
    type Dev = DevCpu;

    const NAME: &'static str = "AccCpuSerial";
    const KIND: AccKind = AccKind::CpuSerial;

    fn dev_props(dev: &DevCpu) -> Result<AccDevProps> {
        Ok(AccDevProps {
            multi_processor_count: 1,
            ..dev.props()?
        })
    }
}

impl<D: Dimension, I: Index> CpuAccelerator for AccCpuSerial<D, I> {
    fn run_blocks<W, F>(work: Vec<W>, f: F)
    where
        W: Send,
        F: Fn(W) + Send + Sync,
    {
        work.into_iter().for_each(f);
    }
}

/// Thread-pool CPU accelerator: one thread per block, blocks spread over the
/// rayon pool the calling task runs in.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccCpuThreads<D, I>(PhantomData<(D, I)>);

impl<D: Dimension, I: Index> Accelerator for AccCpuThreads<D, I> {
    type Dim = D;
    type Idx = I;
    type Dev = DevCpu;

    const NAME: &'static str = "AccCpuThreads";
    const KIND: AccKind = AccKind::CpuThreads;

    fn dev_props(dev: &DevCpu) -> Result<AccDevProps> {
        dev.props()
    }
}

impl<D: Dimension, I: Index> CpuAccelerator for AccCpuThreads<D, I> {
    fn run_blocks<W, F>(work: Vec<W>, f: F)
    where
        W: Send,
        F: Fn(W) + Send + Sync,
    {
        work.into_par_iter().for_each(f);
    }

    fn sort_by_key<T, K, F>(items: &mut [T], key: F)
    where
        T: Send,
        K: Ord,
        F: Fn(&T) -> K + Sync,
    {
        items.par_sort_by_key(key);
    }
}
