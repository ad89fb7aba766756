//! Thread-pool CPU backend with a non-blocking queue.
//!
//! Blocks of every kernel are spread over a rayon pool owned by the queue and
//! sized by `AnalyzerConfig::num_threads`.

accelkit_core::accel_profile! {
    name: "threads_async",
    acc: AccCpuThreads,
    dev_acc: accelkit_core::dev::DevCpu,
    pltf_acc: accelkit_core::pltf::PltfCpu,
    queue: accelkit_core::queue::QueueCpuNonBlocking,
}

crate::stages::cpu::impl_cpu_stages!(Backend);

analysis_entry_points!();
