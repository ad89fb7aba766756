//! Host CPU detection.
//!
//! The host processor is probed once per process; CPU devices derive their
//! default concurrency and reported properties from the result.

use once_cell::sync::Lazy;

/// Properties of the host processor detected at run time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuInfo {
    /// Logical cores, including SMT siblings
    pub logical_cores: usize,
    /// Physical cores
    pub physical_cores: usize,
    /// Default worker count of host thread pools
    pub default_threads: usize,
}

impl CpuInfo {
    /// Detect the host processor.
    ///
    /// Independent of the rayon pool the caller runs in.
    pub fn detect() -> Self {
        let logical_cores = num_cpus::get().max(1);
        let env = std::env::var("RAYON_NUM_THREADS").ok();
        Self {
            logical_cores,
            physical_cores: num_cpus::get_physical().max(1),
            default_threads: default_threads(env.as_deref(), logical_cores),
        }
    }

    /// Whether simultaneous multithreading is active.
    pub fn has_smt(&self) -> bool {
        self.logical_cores > self.physical_cores
    }
}

/// `RAYON_NUM_THREADS` when it is a positive number, else `logical_cores`.
fn default_threads(env: Option<&str>, logical_cores: usize) -> usize {
    env.and_then(|v| v.trim().parse::<usize>().ok())
        .filter(|&n| n > 0)
        .unwrap_or(logical_cores)
}

/// Host processor detected at first use.
pub static CPU_INFO: Lazy<CpuInfo> = Lazy::new(CpuInfo::detect);

/// Get the detected host processor.
pub fn cpu_info() -> &'static CpuInfo {
    &CPU_INFO
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detection_is_stable() {
        let a = cpu_info();
        let b = cpu_info();
        assert_eq!(a, b);
        assert!(a.logical_cores >= 1);
        assert!(a.physical_cores >= 1);
        assert!(a.default_threads >= 1);
    }

    #[test]
    fn test_detection_ignores_calling_pool() {
        let outside = CpuInfo::detect();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(outside.default_threads + 1)
            .build()
            .unwrap();
        let inside = pool.install(CpuInfo::detect);
        assert_eq!(inside, outside);
    }

    #[test]
    fn test_default_threads_from_env() {
        assert_eq!(default_threads(None, 8), 8);
        assert_eq!(default_threads(Some("3"), 8), 3);
        assert_eq!(default_threads(Some(" 5 "), 8), 5);
        assert_eq!(default_threads(Some("0"), 8), 8);
        assert_eq!(default_threads(Some("many"), 8), 8);
    }
}
