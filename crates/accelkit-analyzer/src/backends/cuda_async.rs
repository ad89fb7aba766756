//! CUDA GPU backend with an asynchronous queue.
//!
//! Kernels are compiled from CUDA C at first use and run on the default stream
//! of device `AnalyzerConfig::device`.

accelkit_core::accel_profile! {
    name: "cuda_async",
    acc: AccGpuCudaRt,
    dev_acc: accelkit_core::dev::DevCuda,
    pltf_acc: accelkit_core::pltf::PltfCuda,
    queue: accelkit_core::queue::QueueCudaRtNonBlocking,
}

analysis_entry_points!();
