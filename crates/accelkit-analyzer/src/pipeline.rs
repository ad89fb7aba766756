//! The analysis pipeline, written once for every backend.
//!
//! A backend provides the stage primitives through [`Stages`]; the order of
//! stages, device acquisition, timing and output assembly live here.

use crate::config::AnalyzerConfig;
use crate::input::{Calibration, Digi, Input};
use crate::output::{Cluster, Output};
use accelkit_core::acc::Accelerator;
use accelkit_core::dev::{AccDevProps, Device};
use accelkit_core::error::Result;
use accelkit_core::pltf::Platform;
use accelkit_core::queue::Queue;
use accelkit_core::types::{valid_work_div, Index, Vector};
use accelkit_core::{Profile, WorkDivOf};
use std::time::Instant;
use tracing::{debug, debug_span};

/// Results copied back from the accelerator.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Readback {
    pub(crate) clusters: Vec<Cluster>,
    pub(crate) partials: Vec<f64>,
}

/// Stage primitives a backend implements.
///
/// Stages are submitted to one queue and run in submission order. Only
/// [`compact_seeds`](Self::compact_seeds) and [`download`](Self::download)
/// may block on the queue.
pub(crate) trait Stages: Profile {
    /// Accelerator-side buffers of one call.
    type Workspace: Send;

    /// Adjusts the acquired device to the configuration.
    fn configure(dev: Self::DevAcc, _config: &AnalyzerConfig) -> Result<Self::DevAcc> {
        Ok(dev)
    }

    /// Work division for `extent` items.
    fn work_div(
        props: &AccDevProps,
        extent: usize,
        config: &AnalyzerConfig,
    ) -> Result<WorkDivOf<Self>> {
        let (block_threads, thread_elems) = if <Self::Acc as Accelerator>::KIND.is_cpu() {
            (1, config.cpu_thread_elems)
        } else {
            (config.gpu_block_threads, 1)
        };
        valid_work_div(
            props,
            Vector::last_axis(<Self::Idx as Index>::from_usize(extent)?),
            <Self::Idx as Index>::from_usize(block_threads)?,
            <Self::Idx as Index>::from_usize(thread_elems)?,
        )
    }

    /// Sorts hits by `(module, channel)` and moves them with the calibration
    /// into accelerator memory. Host-side sorting runs under the backend's
    /// own concurrency.
    fn upload(
        queue: &Self::Queue,
        digis: &[Digi],
        calibration: &Calibration,
    ) -> Result<Self::Workspace>;

    /// Per hit: calibrated, non-negative charge.
    fn calibrate(
        queue: &Self::Queue,
        ws: &mut Self::Workspace,
        wd: &WorkDivOf<Self>,
    ) -> Result<()>;

    /// Per hit: whether it starts a new cluster.
    fn mark_seeds(
        queue: &Self::Queue,
        ws: &mut Self::Workspace,
        wd: &WorkDivOf<Self>,
    ) -> Result<()>;

    /// Collects cluster start indices in hit order and returns their count.
    fn compact_seeds(
        queue: &Self::Queue,
        ws: &mut Self::Workspace,
        wd: &WorkDivOf<Self>,
    ) -> Result<usize>;

    /// Per cluster: module, first channel, size, charge and centroid.
    fn accumulate(
        queue: &Self::Queue,
        ws: &mut Self::Workspace,
        wd: &WorkDivOf<Self>,
    ) -> Result<()>;

    /// Per work-division thread: charge of the clusters it owns.
    fn partial_charge(
        queue: &Self::Queue,
        ws: &mut Self::Workspace,
        wd: &WorkDivOf<Self>,
    ) -> Result<()>;

    /// Copies clusters and partials back to the host.
    fn download(queue: &Self::Queue, ws: Self::Workspace) -> Result<Readback>;
}

/// Runs the analysis on backend `B`.
///
/// `output` and `elapsed` are written only on success.
pub(crate) fn run<B: Stages>(
    input: &Input,
    output: &mut Output,
    elapsed: &mut f64,
    config: &AnalyzerConfig,
) -> Result<()> {
    let span = debug_span!("analyze", backend = B::NAME, digis = input.len());
    let _enter = span.enter();

    config.validate()?;
    input.validate()?;
    let n = input.len();

    let dev = <B::PltfAcc as Platform>::dev_by_idx(config.device)?;
    let dev = B::configure(dev, config)?;
    let props = <B::Acc as Accelerator>::dev_props(&dev)?;
    debug!(device = %dev.name(), acc = <B::Acc as Accelerator>::NAME, "acquired device");

    let start = Instant::now();
    let queue = <B::Queue as Queue>::new(&dev)?;

    if n == 0 {
        queue.wait()?;
        *elapsed = start.elapsed().as_secs_f64();
        *output = Output::default();
        return Ok(());
    }

    let hit_wd = B::work_div(&props, n, config)?;
    let mut ws = debug_span!("upload").in_scope(|| B::upload(&queue, &input.digis, &input.calibration))?;
    debug_span!("calibrate").in_scope(|| B::calibrate(&queue, &mut ws, &hit_wd))?;
    debug_span!("mark_seeds").in_scope(|| B::mark_seeds(&queue, &mut ws, &hit_wd))?;
    let clusters = debug_span!("compact_seeds").in_scope(|| B::compact_seeds(&queue, &mut ws, &hit_wd))?;
    debug!(clusters, "found cluster seeds");

    let cluster_wd = B::work_div(&props, clusters, config)?;
    debug_span!("accumulate").in_scope(|| B::accumulate(&queue, &mut ws, &cluster_wd))?;
    debug_span!("partial_charge").in_scope(|| B::partial_charge(&queue, &mut ws, &cluster_wd))?;

    queue.wait()?;
    let secs = start.elapsed().as_secs_f64();
    let readback = debug_span!("download").in_scope(|| B::download(&queue, ws))?;
    drop(queue);

    *output = Output::from_parts(readback.clusters, &readback.partials, n);
    *elapsed = secs;
    debug!(elapsed = secs, total_charge = output.total_charge, "analysis finished");
    Ok(())
}
