//! Stage kernels for host accelerators.
//!
//! Kernels run as queue tasks and split their output into per-block chunks
//! through [`CpuAccelerator::exec_chunks`], so every block writes a disjoint
//! slice. The serial and thread-pool backends share this code and differ only
//! in how blocks are scheduled and how tasks are queued.

use crate::config::AnalyzerConfig;
use crate::input::{Calibration, Digi, HostDigis};
use crate::output::Cluster;
use crate::pipeline::Readback;
use accelkit_core::acc::CpuAccelerator;
use accelkit_core::dev::DevCpu;
use accelkit_core::error::Result;
use accelkit_core::queue::TaskQueue;
use accelkit_core::types::WorkDivMembers;
use parking_lot::Mutex;
use std::sync::Arc;

/// Host-memory buffers of one analysis call.
#[derive(Debug, Default)]
pub(crate) struct CpuWorkspace {
    modules: Vec<u32>,
    channels: Vec<u32>,
    adcs: Vec<u16>,
    gains: Vec<f32>,
    pedestal: f32,
    charge: Vec<f32>,
    seeds: Vec<bool>,
    starts: Vec<u32>,
    clusters: Vec<Cluster>,
    partials: Vec<f64>,
}

/// Workspace shared between the submitting thread and queued tasks.
pub(crate) type SharedWorkspace = Arc<Mutex<CpuWorkspace>>;

type WorkDiv<A> = WorkDivMembers<
    <A as accelkit_core::acc::Accelerator>::Dim,
    <A as accelkit_core::acc::Accelerator>::Idx,
>;

pub(crate) fn configure(dev: DevCpu, config: &AnalyzerConfig) -> Result<DevCpu> {
    dev.with_concurrency(config.num_threads)
}

/// Allocates the workspace and queues the sort of `digis` into it.
pub(crate) fn upload<A, Q>(
    queue: &Q,
    digis: &[Digi],
    calibration: &Calibration,
) -> Result<SharedWorkspace>
where
    A: CpuAccelerator,
    Q: TaskQueue,
{
    let n = digis.len();
    let ws = Arc::new(Mutex::new(CpuWorkspace {
        gains: calibration.gains.clone(),
        pedestal: calibration.pedestal,
        charge: vec![0.0; n],
        seeds: vec![false; n],
        ..CpuWorkspace::default()
    }));
    let mut hits = digis.to_vec();
    let task_ws = Arc::clone(&ws);
    queue.enqueue(move || {
        A::sort_by_key(&mut hits, HostDigis::key);
        let sorted = HostDigis::from_sorted(&hits);
        let mut guard = task_ws.lock();
        guard.modules = sorted.modules;
        guard.channels = sorted.channels;
        guard.adcs = sorted.adcs;
    })?;
    Ok(ws)
}

pub(crate) fn calibrate<A, Q>(queue: &Q, ws: &SharedWorkspace, wd: &WorkDiv<A>) -> Result<()>
where
    A: CpuAccelerator,
    Q: TaskQueue,
{
    let chunk = wd.block_elem_extent()?.prod_usize()?;
    let ws = Arc::clone(ws);
    queue.enqueue(move || {
        let mut guard = ws.lock();
        let CpuWorkspace {
            modules,
            adcs,
            gains,
            pedestal,
            charge,
            ..
        } = &mut *guard;
        let pedestal = *pedestal;
        A::exec_chunks(charge, chunk, |block, out| {
            let base = block * chunk;
            for (k, q) in out.iter_mut().enumerate() {
                let i = base + k;
                *q = Calibration::charge(adcs[i], pedestal, gains[modules[i] as usize]);
            }
        });
    })
}

pub(crate) fn mark_seeds<A, Q>(queue: &Q, ws: &SharedWorkspace, wd: &WorkDiv<A>) -> Result<()>
where
    A: CpuAccelerator,
    Q: TaskQueue,
{
    let chunk = wd.block_elem_extent()?.prod_usize()?;
    let ws = Arc::clone(ws);
    queue.enqueue(move || {
        let mut guard = ws.lock();
        let CpuWorkspace {
            modules,
            channels,
            seeds,
            ..
        } = &mut *guard;
        A::exec_chunks(seeds, chunk, |block, out| {
            let base = block * chunk;
            for (k, seed) in out.iter_mut().enumerate() {
                let i = base + k;
                *seed = i == 0
                    || modules[i] != modules[i - 1]
                    || channels[i].saturating_sub(channels[i - 1]) > 1;
            }
        });
    })
}

pub(crate) fn compact_seeds<A, Q>(queue: &Q, ws: &SharedWorkspace, wd: &WorkDiv<A>) -> Result<usize>
where
    A: CpuAccelerator,
    Q: TaskQueue,
{
    let chunk = wd.block_elem_extent()?.prod_usize()?;
    let blocks = wd.num_blocks()?;
    let task_ws = Arc::clone(ws);
    queue.enqueue(move || {
        let mut guard = task_ws.lock();
        let CpuWorkspace { seeds, starts, .. } = &mut *guard;
        let n = seeds.len();

        let mut counts = vec![0usize; blocks];
        A::exec_chunks(&mut counts, 1, |block, out| {
            let lo = (block * chunk).min(n);
            let hi = (lo + chunk).min(n);
            out[0] = seeds[lo..hi].iter().filter(|&&s| s).count();
        });

        let total: usize = counts.iter().sum();
        starts.clear();
        starts.resize(total, 0);

        let mut rest: &mut [u32] = starts;
        let mut parts = Vec::with_capacity(blocks);
        for (block, &count) in counts.iter().enumerate() {
            let (head, tail) = std::mem::take(&mut rest).split_at_mut(count);
            parts.push((block, head));
            rest = tail;
        }
        A::run_blocks(parts, |(block, out)| {
            let lo = (block * chunk).min(n);
            let hi = (lo + chunk).min(n);
            let hits = (lo..hi).filter(|&i| seeds[i]);
            for (slot, i) in out.iter_mut().zip(hits) {
                *slot = i as u32;
            }
        });
    })?;
    queue.wait()?;

    let count = ws.lock().starts.len();
    Ok(count)
}

pub(crate) fn accumulate<A, Q>(queue: &Q, ws: &SharedWorkspace, wd: &WorkDiv<A>) -> Result<()>
where
    A: CpuAccelerator,
    Q: TaskQueue,
{
    let chunk = wd.block_elem_extent()?.prod_usize()?;
    let ws = Arc::clone(ws);
    queue.enqueue(move || {
        let mut guard = ws.lock();
        let CpuWorkspace {
            modules,
            channels,
            charge,
            starts,
            clusters,
            ..
        } = &mut *guard;
        let n = charge.len();
        let count = starts.len();
        clusters.clear();
        clusters.resize(count, Cluster::default());

        A::exec_chunks(clusters, chunk, |block, out| {
            let base = block * chunk;
            for (k, cluster) in out.iter_mut().enumerate() {
                let c = base + k;
                let lo = starts[c] as usize;
                let hi = starts.get(c + 1).map_or(n, |&s| s as usize);
                *cluster = build_cluster(&modules[lo..hi], &channels[lo..hi], &charge[lo..hi]);
            }
        });
    })
}

/// Sums one run of hits into a cluster.
fn build_cluster(modules: &[u32], channels: &[u32], charge: &[f32]) -> Cluster {
    let mut q = 0.0f32;
    let mut qx = 0.0f32;
    for (&qi, &ch) in charge.iter().zip(channels) {
        q += qi;
        qx += qi * ch as f32;
    }
    let size = channels.len() as u32;
    let first_channel = channels[0];
    let centroid = if q > 0.0 {
        qx / q
    } else {
        first_channel as f32 + (size - 1) as f32 * 0.5
    };
    Cluster {
        module: modules[0],
        first_channel,
        size,
        charge: q,
        centroid,
    }
}

pub(crate) fn partial_charge<A, Q>(queue: &Q, ws: &SharedWorkspace, wd: &WorkDiv<A>) -> Result<()>
where
    A: CpuAccelerator,
    Q: TaskQueue,
{
    let block_threads = wd.block_threads()?;
    let thread_elems = wd.thread_elems()?;
    let threads = wd.num_threads()?;
    let ws = Arc::clone(ws);
    queue.enqueue(move || {
        let mut guard = ws.lock();
        let CpuWorkspace {
            clusters, partials, ..
        } = &mut *guard;
        let count = clusters.len();
        partials.clear();
        partials.resize(threads, 0.0);

        A::exec_chunks(partials, block_threads, |block, out| {
            for (k, p) in out.iter_mut().enumerate() {
                let thread = block * block_threads + k;
                let lo = (thread * thread_elems).min(count);
                let hi = (lo + thread_elems).min(count);
                *p = clusters[lo..hi]
                    .iter()
                    .fold(0.0, |acc, c| acc + f64::from(c.charge));
            }
        });
    })
}

pub(crate) fn download<Q: TaskQueue>(queue: &Q, ws: SharedWorkspace) -> Result<Readback> {
    queue.wait()?;
    let mut guard = ws.lock();
    Ok(Readback {
        clusters: std::mem::take(&mut guard.clusters),
        partials: std::mem::take(&mut guard.partials),
    })
}

/// Implements the pipeline stages for a host backend.
macro_rules! impl_cpu_stages {
    ($backend:ty) => {
        impl $crate::pipeline::Stages for $backend {
            type Workspace = $crate::stages::cpu::SharedWorkspace;

            fn configure(
                dev: accelkit_core::dev::DevCpu,
                config: &$crate::config::AnalyzerConfig,
            ) -> accelkit_core::Result<accelkit_core::dev::DevCpu> {
                $crate::stages::cpu::configure(dev, config)
            }

            fn upload(
                queue: &Self::Queue,
                digis: &[$crate::input::Digi],
                calibration: &$crate::input::Calibration,
            ) -> accelkit_core::Result<Self::Workspace> {
                $crate::stages::cpu::upload::<<Self as accelkit_core::Profile>::Acc, _>(queue, digis, calibration)
            }

            fn calibrate(
                queue: &Self::Queue,
                ws: &mut Self::Workspace,
                wd: &accelkit_core::WorkDivOf<Self>,
            ) -> accelkit_core::Result<()> {
                $crate::stages::cpu::calibrate::<<Self as accelkit_core::Profile>::Acc, _>(queue, ws, wd)
            }

            fn mark_seeds(
                queue: &Self::Queue,
                ws: &mut Self::Workspace,
                wd: &accelkit_core::WorkDivOf<Self>,
            ) -> accelkit_core::Result<()> {
                $crate::stages::cpu::mark_seeds::<<Self as accelkit_core::Profile>::Acc, _>(queue, ws, wd)
            }

            fn compact_seeds(
                queue: &Self::Queue,
                ws: &mut Self::Workspace,
                wd: &accelkit_core::WorkDivOf<Self>,
            ) -> accelkit_core::Result<usize> {
                $crate::stages::cpu::compact_seeds::<<Self as accelkit_core::Profile>::Acc, _>(queue, ws, wd)
            }

            fn accumulate(
                queue: &Self::Queue,
                ws: &mut Self::Workspace,
                wd: &accelkit_core::WorkDivOf<Self>,
            ) -> accelkit_core::Result<()> {
                $crate::stages::cpu::accumulate::<<Self as accelkit_core::Profile>::Acc, _>(queue, ws, wd)
            }

            fn partial_charge(
                queue: &Self::Queue,
                ws: &mut Self::Workspace,
                wd: &accelkit_core::WorkDivOf<Self>,
            ) -> accelkit_core::Result<()> {
                $crate::stages::cpu::partial_charge::<<Self as accelkit_core::Profile>::Acc, _>(queue, ws, wd)
            }

            fn download(
                queue: &Self::Queue,
                ws: Self::Workspace,
            ) -> accelkit_core::Result<$crate::pipeline::Readback> {
                $crate::stages::cpu::download(queue, ws)
            }
        }
    };
}

pub(crate) use impl_cpu_stages;

#[cfg(test)]
mod tests {
    use super::*;
    use accelkit_core::acc::{AccCpuSerial, AccCpuThreads};
    use accelkit_core::dev::Device;
    use accelkit_core::queue::{Queue, QueueCpuBlocking, QueueCpuNonBlocking};
    use accelkit_core::types::{valid_work_div, Dim1, Vector};
    use approx::assert_relative_eq;

    fn workspace<A: CpuAccelerator, Q: TaskQueue>(queue: &Q) -> SharedWorkspace {
        let digis = [
            Digi::new(1, 4, 8),
            Digi::new(0, 3, 30),
            Digi::new(0, 1, 10),
            Digi::new(1, 3, 0),
            Digi::new(0, 7, 5),
            Digi::new(0, 2, 20),
        ];
        upload::<A, _>(queue, &digis, &Calibration::uniform(2, 1.0, 0.0)).unwrap()
    }

    fn div(extent: usize, elems: u64) -> WorkDivMembers<Dim1, u64> {
        let props = DevCpu::host().props().unwrap();
        valid_work_div(&props, Vector::from(extent as u64), 1, elems).unwrap()
    }

    fn run_all<A: CpuAccelerator<Dim = Dim1, Idx = u64>, Q: TaskQueue>(
        queue: &Q,
        elems: u64,
    ) -> Readback {
        let ws = workspace::<A, _>(queue);
        let wd = div(6, elems);
        calibrate::<A, _>(queue, &ws, &wd).unwrap();
        mark_seeds::<A, _>(queue, &ws, &wd).unwrap();
        let count = compact_seeds::<A, _>(queue, &ws, &wd).unwrap();
        let cwd = div(count, elems);
        accumulate::<A, _>(queue, &ws, &cwd).unwrap();
        partial_charge::<A, _>(queue, &ws, &cwd).unwrap();
        download(queue, ws).unwrap()
    }

    #[test]
    fn test_stages_serial() {
        let queue = QueueCpuBlocking::new(&DevCpu::host()).unwrap();
        let out = run_all::<AccCpuSerial<Dim1, u64>, _>(&queue, 2);

        assert_eq!(out.clusters.len(), 3);
        let first = out.clusters[0];
        assert_eq!((first.module, first.first_channel, first.size), (0, 1, 3));
        assert_relative_eq!(first.charge, 60.0);
        assert_relative_eq!(first.centroid, 140.0 / 60.0);

        let second = out.clusters[1];
        assert_eq!((second.first_channel, second.size), (7, 1));
        assert_relative_eq!(second.centroid, 7.0);

        let third = out.clusters[2];
        assert_eq!((third.module, third.first_channel, third.size), (1, 3, 2));
        assert_relative_eq!(third.centroid, 4.0);

        assert_eq!(out.partials.len(), 2);
        assert_relative_eq!(out.partials.iter().sum::<f64>(), 73.0);
    }

    #[test]
    fn test_stages_threads_match_serial() {
        let blocking = QueueCpuBlocking::new(&DevCpu::host()).unwrap();
        let pooled = QueueCpuNonBlocking::new(&DevCpu::host()).unwrap();
        for elems in [1, 2, 5, 64] {
            let a = run_all::<AccCpuSerial<Dim1, u64>, _>(&blocking, elems);
            let b = run_all::<AccCpuThreads<Dim1, u64>, _>(&pooled, elems);
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_zero_charge_centroid() {
        let c = build_cluster(&[2, 2, 2], &[10, 11, 12], &[0.0, 0.0, 0.0]);
        assert_eq!(c.size, 3);
        assert_eq!(c.centroid, 11.0);
        assert_eq!(c.charge, 0.0);
    }
}
