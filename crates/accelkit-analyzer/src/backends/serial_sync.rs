//! Single-threaded CPU backend with a blocking queue.

accelkit_core::accel_profile! {
    name: "serial_sync",
    acc: AccCpuSerial,
    dev_acc: accelkit_core::dev::DevCpu,
    pltf_acc: accelkit_core::pltf::PltfCpu,
    queue: accelkit_core::queue::QueueCpuBlocking,
}

crate::stages::cpu::impl_cpu_stages!(Backend);

analysis_entry_points!();
