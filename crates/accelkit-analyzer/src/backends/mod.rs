//! Backend namespaces.
//!
//! Each namespace exposes the same alias names (`Dim`, `Idx`, `Extent`, `Acc`,
//! `DevHost`, `DevAcc`, `PltfHost`, `PltfAcc`, `Queue`, `WorkDiv`, `Vec`), a
//! `Backend` profile marker and the `analyze` entry point. Only namespaces of
//! enabled backend features exist.

/// Declares `analyze` and `analyze_with` for the namespace's `Backend`.
macro_rules! analysis_entry_points {
    () => {
        /// Runs the analysis on this backend with the process-wide configuration.
        ///
        /// On success `output` is replaced and `elapsed` receives the wall time in
        /// seconds from queue creation until all work has finished. On failure
        /// neither is written.
        pub fn analyze(
            input: &$crate::input::Input,
            output: &mut $crate::output::Output,
            elapsed: &mut f64,
        ) -> ::std::result::Result<(), accelkit_core::AccError> {
            analyze_with(input, output, elapsed, $crate::config::get_config())
        }

        /// Runs the analysis on this backend with an explicit configuration.
        pub fn analyze_with(
            input: &$crate::input::Input,
            output: &mut $crate::output::Output,
            elapsed: &mut f64,
            config: &$crate::config::AnalyzerConfig,
        ) -> ::std::result::Result<(), accelkit_core::AccError> {
            $crate::pipeline::run::<Backend>(input, output, elapsed, config)
        }
    };
}

#[cfg(feature = "cuda")]
pub mod cuda_async;
#[cfg(feature = "serial")]
pub mod serial_sync;
#[cfg(feature = "threads")]
pub mod threads_async;
