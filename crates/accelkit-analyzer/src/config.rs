//! Run-time tuning of the analysis.
//!
//! A process-wide default is used by `analyze`; `analyze_with` takes an
//! explicit configuration instead.

use accelkit_core::config::cpu_info;
use accelkit_core::error::{AccError, Result};
use std::sync::OnceLock;

/// Global default configuration
static GLOBAL_CONFIG: OnceLock<AnalyzerConfig> = OnceLock::new();

/// Tuning parameters for one `analyze` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzerConfig {
    /// Index of the accelerator device to run on
    pub device: usize,

    /// Worker threads for the thread-pool backend
    pub num_threads: usize,

    /// Elements per thread on CPU backends
    pub cpu_thread_elems: usize,

    /// Threads per block on GPU backends
    pub gpu_block_threads: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            device: 0,
            num_threads: cpu_info().default_threads,
            cpu_thread_elems: 4096,
            gpu_block_threads: 256,
        }
    }
}

impl AnalyzerConfig {
    /// Start building a configuration from the defaults.
    pub fn builder() -> AnalyzerConfigBuilder {
        AnalyzerConfigBuilder::new()
    }

    /// Checks that every parameter is in range.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("num_threads", self.num_threads),
            ("cpu_thread_elems", self.cpu_thread_elems),
            ("gpu_block_threads", self.gpu_block_threads),
        ];
        for (name, value) in positive {
            if value == 0 {
                return Err(AccError::invalid_configuration(
                    name,
                    value,
                    "must be at least 1",
                ));
            }
        }
        Ok(())
    }
}

/// Builder for [`AnalyzerConfig`].
#[derive(Debug, Clone, Default)]
pub struct AnalyzerConfigBuilder {
    config: AnalyzerConfig,
}

impl AnalyzerConfigBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the accelerator device index
    pub fn device(mut self, device: usize) -> Self {
        self.config.device = device;
        self
    }

    /// Set the thread-pool size
    pub fn num_threads(mut self, threads: usize) -> Self {
        self.config.num_threads = threads;
        self
    }

    /// Set elements per thread on CPU backends
    pub fn cpu_thread_elems(mut self, elems: usize) -> Self {
        self.config.cpu_thread_elems = elems;
        self
    }

    /// Set threads per block on GPU backends
    pub fn gpu_block_threads(mut self, threads: usize) -> Self {
        self.config.gpu_block_threads = threads;
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<AnalyzerConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Get the global default configuration
pub fn get_config() -> &'static AnalyzerConfig {
    GLOBAL_CONFIG.get_or_init(AnalyzerConfig::default)
}

/// Set the global default configuration.
///
/// Only the first call before any `analyze` takes effect; later calls hand the
/// configuration back.
pub fn set_config(config: AnalyzerConfig) -> std::result::Result<(), AnalyzerConfig> {
    GLOBAL_CONFIG.set(config)
}
