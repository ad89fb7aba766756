//! Stage kernels for the CUDA backend.

use super::cuda_kernels::{FUNCTIONS, MODULE, SOURCE};
use crate::backends::cuda_async::{Backend, Queue as CudaQueue, WorkDiv};
use crate::input::{Calibration, Digi, HostDigis};
use crate::output::Cluster;
use crate::pipeline::{Readback, Stages};
use accelkit_core::error::{AccError, Result};
use accelkit_core::queue::Queue;
use cudarc::driver::{CudaDevice, CudaFunction, CudaSlice, LaunchAsync, LaunchConfig};
use cudarc::nvrtc::{compile_ptx_with_opts, CompileOptions, Ptx};
use std::sync::{Arc, OnceLock};

/// Compiled kernels, shared by every call in the process.
static PTX: OnceLock<Ptx> = OnceLock::new();

fn ptx() -> Result<Ptx> {
    if let Some(ptx) = PTX.get() {
        return Ok(ptx.clone());
    }
    let options = CompileOptions {
        fmad: Some(false),
        ..Default::default()
    };
    let ptx = compile_ptx_with_opts(SOURCE, options)
        .map_err(|e| AccError::resource("NVRTC stage kernels", e))?;
    tracing::debug!("compiled stage kernels");
    Ok(PTX.get_or_init(|| ptx).clone())
}

/// Device buffers of one analysis call.
pub(crate) struct CudaWorkspace {
    dev: Arc<CudaDevice>,
    n: u32,
    pedestal: f32,
    adc: CudaSlice<u16>,
    module: CudaSlice<u32>,
    channel: CudaSlice<u32>,
    gains: CudaSlice<f32>,
    charge: CudaSlice<f32>,
    seed: CudaSlice<u32>,
    starts: CudaSlice<u32>,
    count: CudaSlice<u32>,
    clusters: u32,
    meta: Option<CudaSlice<u32>>,
    values: Option<CudaSlice<f32>>,
    partials: Option<CudaSlice<f64>>,
}

fn kernel(dev: &Arc<CudaDevice>, name: &str) -> Result<CudaFunction> {
    if !dev.has_func(MODULE, name) {
        dev.load_ptx(ptx()?, MODULE, &FUNCTIONS)
            .map_err(|e| AccError::resource("CUDA module", e))?;
    }
    dev.get_func(MODULE, name)
        .ok_or_else(|| AccError::resource(format!("CUDA kernel {name}"), "not found in module"))
}

fn to_u32<T: TryInto<u32> + Copy + std::fmt::Display>(value: T) -> Result<u32> {
    value
        .try_into()
        .map_err(|_| AccError::index_overflow(value))
}

fn launch_config(wd: &WorkDiv) -> Result<LaunchConfig> {
    Ok(LaunchConfig {
        grid_dim: (to_u32(wd.grid_block_extent()[0])?, 1, 1),
        block_dim: (to_u32(wd.block_thread_extent()[0])?, 1, 1),
        shared_mem_bytes: 0,
    })
}

fn alloc<T: cudarc::driver::DeviceRepr + cudarc::driver::ValidAsZeroBits>(
    dev: &Arc<CudaDevice>,
    len: usize,
) -> Result<CudaSlice<T>> {
    dev.alloc_zeros::<T>(len.max(1))
        .map_err(|e| AccError::resource("CUDA device memory", e))
}

fn upload_slice<T: cudarc::driver::DeviceRepr>(
    dev: &Arc<CudaDevice>,
    host: &[T],
) -> Result<CudaSlice<T>> {
    dev.htod_sync_copy(host)
        .map_err(|e| AccError::resource("CUDA device memory", e))
}

impl Stages for Backend {
    type Workspace = CudaWorkspace;

    fn upload(
        queue: &CudaQueue,
        digis: &[Digi],
        calibration: &Calibration,
    ) -> Result<CudaWorkspace> {
        let digis = HostDigis::sorted(digis);
        let dev = Arc::clone(queue.dev().cuda());
        let n = digis.len();
        Ok(CudaWorkspace {
            n: to_u32(n)?,
            pedestal: calibration.pedestal,
            adc: upload_slice(&dev, &digis.adcs)?,
            module: upload_slice(&dev, &digis.modules)?,
            channel: upload_slice(&dev, &digis.channels)?,
            gains: upload_slice(&dev, &calibration.gains)?,
            charge: alloc(&dev, n)?,
            seed: alloc(&dev, n)?,
            starts: alloc(&dev, n)?,
            count: alloc(&dev, 1)?,
            clusters: 0,
            meta: None,
            values: None,
            partials: None,
            dev,
        })
    }

    fn calibrate(queue: &CudaQueue, ws: &mut CudaWorkspace, wd: &WorkDiv) -> Result<()> {
        let f = kernel(&ws.dev, "calibrate")?;
        let elems = to_u32(wd.thread_elems()?)?;
        let params = (
            &ws.adc,
            &ws.module,
            &ws.gains,
            ws.pedestal,
            ws.n,
            elems,
            &mut ws.charge,
        );
        unsafe { f.launch(launch_config(wd)?, params) }
            .map_err(|e| AccError::execution("calibrate", e))?;
        queue.submitted();
        Ok(())
    }

    fn mark_seeds(queue: &CudaQueue, ws: &mut CudaWorkspace, wd: &WorkDiv) -> Result<()> {
        let f = kernel(&ws.dev, "mark_seeds")?;
        let elems = to_u32(wd.thread_elems()?)?;
        let params = (&ws.module, &ws.channel, ws.n, elems, &mut ws.seed);
        unsafe { f.launch(launch_config(wd)?, params) }
            .map_err(|e| AccError::execution("mark_seeds", e))?;
        queue.submitted();
        Ok(())
    }

    fn compact_seeds(queue: &CudaQueue, ws: &mut CudaWorkspace, _wd: &WorkDiv) -> Result<usize> {
        let f = kernel(&ws.dev, "compact_seeds")?;
        let params = (&ws.seed, ws.n, &mut ws.starts, &mut ws.count);
        unsafe { f.launch(LaunchConfig::for_num_elems(1), params) }
            .map_err(|e| AccError::execution("compact_seeds", e))?;
        queue.submitted();
        queue.wait()?;

        let count = ws
            .dev
            .dtoh_sync_copy(&ws.count)
            .map_err(|e| AccError::execution("compact_seeds", e))?;
        ws.clusters = count.first().copied().unwrap_or(0);
        Ok(ws.clusters as usize)
    }

    fn accumulate(queue: &CudaQueue, ws: &mut CudaWorkspace, wd: &WorkDiv) -> Result<()> {
        let f = kernel(&ws.dev, "accumulate")?;
        let elems = to_u32(wd.thread_elems()?)?;
        let clusters = ws.clusters as usize;
        let mut meta = alloc::<u32>(&ws.dev, 3 * clusters)?;
        let mut values = alloc::<f32>(&ws.dev, 2 * clusters)?;
        let params = (
            &ws.starts,
            ws.clusters,
            ws.n,
            &ws.module,
            &ws.channel,
            &ws.charge,
            elems,
            &mut meta,
            &mut values,
        );
        unsafe { f.launch(launch_config(wd)?, params) }
            .map_err(|e| AccError::execution("accumulate", e))?;
        queue.submitted();
        ws.meta = Some(meta);
        ws.values = Some(values);
        Ok(())
    }

    fn partial_charge(queue: &CudaQueue, ws: &mut CudaWorkspace, wd: &WorkDiv) -> Result<()> {
        let f = kernel(&ws.dev, "partial_charge")?;
        let elems = to_u32(wd.thread_elems()?)?;
        let threads = wd.num_threads()?;
        let values = ws
            .values
            .as_ref()
            .ok_or_else(|| AccError::execution("partial_charge", "clusters not accumulated"))?;
        let mut partials = alloc::<f64>(&ws.dev, threads)?;
        let params = (values, ws.clusters, elems, to_u32(threads)?, &mut partials);
        unsafe { f.launch(launch_config(wd)?, params) }
            .map_err(|e| AccError::execution("partial_charge", e))?;
        queue.submitted();
        ws.partials = Some(partials);
        Ok(())
    }

    fn download(queue: &CudaQueue, ws: CudaWorkspace) -> Result<Readback> {
        queue.wait()?;
        let missing = || AccError::execution("download", "cluster buffers were not produced");
        let copy_err = |e| AccError::execution("download", e);

        let meta = ws
            .dev
            .dtoh_sync_copy(ws.meta.as_ref().ok_or_else(missing)?)
            .map_err(copy_err)?;
        let values = ws
            .dev
            .dtoh_sync_copy(ws.values.as_ref().ok_or_else(missing)?)
            .map_err(copy_err)?;
        let partials = ws
            .dev
            .dtoh_sync_copy(ws.partials.as_ref().ok_or_else(missing)?)
            .map_err(copy_err)?;

        let count = ws.clusters as usize;
        let clusters = meta
            .chunks_exact(3)
            .zip(values.chunks_exact(2))
            .take(count)
            .map(|(m, v)| Cluster {
                module: m[0],
                first_channel: m[1],
                size: m[2],
                charge: v[0],
                centroid: v[1],
            })
            .collect();
        Ok(Readback { clusters, partials })
    }
}
