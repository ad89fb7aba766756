use super::{AccKind, Accelerator};
use crate::dev::{AccDevProps, DevCuda, Device};
use crate::error::Result;
use crate::types::{Dimension, Index};
use std::marker::PhantomData;

/// CUDA runtime accelerator: kernels launched on a GPU stream.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccGpuCudaRt<D, I>(PhantomData<(D, I)>);

impl<D: Dimension, I: Index> Accelerator for AccGpuCudaRt<D, I> {
    type Dim = D;
    type Idx = I;
    type Dev = DevCuda;

    const NAME: &'static str = "AccGpuCudaRt";
    const KIND: AccKind = AccKind::GpuCuda;

    fn dev_props(dev: &DevCuda) -> Result<AccDevProps> {
        dev.props()
    }
}
