//! One analysis entry point, instantiated for every accelerator backend.
//!
//! Each backend namespace ([`serial_sync`], [`threads_async`] and, with the
//! `cuda` feature, `cuda_async`) exposes the same profile aliases and an
//! `analyze(&Input, &mut Output, &mut f64)` function with identical
//! semantics, so calling code does not depend on the backend it runs on.
//!
//! One backend is chosen at build time as the default through the
//! `select-serial`, `select-threads` or `select-cuda` feature and is
//! re-exported as [`active`]. Selecting none or more than one is a build
//! error.
//!
//! # Example
//!
//! ```
//! use accelkit_analyzer::{active, Calibration, Digi, Input, Output};
//!
//! let input = Input::new(
//!     vec![Digi::new(0, 4, 30), Digi::new(0, 5, 50), Digi::new(1, 9, 20)],
//!     Calibration::uniform(2, 1.0, 10.0),
//! );
//! let mut output = Output::default();
//! let mut elapsed = 0.0;
//! active::analyze(&input, &mut output, &mut elapsed).unwrap();
//!
//! assert_eq!(output.clusters.len(), 2);
//! assert!(elapsed >= 0.0);
//! ```

#[cfg(any(
    all(feature = "select-serial", feature = "select-threads"),
    all(feature = "select-serial", feature = "select-cuda"),
    all(feature = "select-threads", feature = "select-cuda"),
))]
compile_error!(
    "at most one of the features `select-serial`, `select-threads` and `select-cuda` may be enabled"
);

#[cfg(not(any(
    feature = "select-serial",
    feature = "select-threads",
    feature = "select-cuda"
)))]
compile_error!(
    "one of the features `select-serial`, `select-threads` or `select-cuda` must be enabled"
);

pub mod backends;
pub mod config;
pub mod input;
pub mod output;
mod pipeline;
mod stages;

pub use accelkit_core::{AccError, Result};
pub use config::{get_config, set_config, AnalyzerConfig, AnalyzerConfigBuilder};
pub use input::{Calibration, Digi, Input};
pub use output::{Cluster, ModuleSummary, Output};

#[cfg(feature = "cuda")]
pub use backends::cuda_async;
#[cfg(feature = "serial")]
pub use backends::serial_sync;
#[cfg(feature = "threads")]
pub use backends::threads_async;

/// The backend selected at build time.
#[cfg(feature = "select-serial")]
pub use backends::serial_sync as active;

/// The backend selected at build time.
#[cfg(feature = "select-threads")]
pub use backends::threads_async as active;

/// The backend selected at build time.
#[cfg(feature = "select-cuda")]
pub use backends::cuda_async as active;

/// Name of the backend selected at build time.
#[cfg(any(
    feature = "select-serial",
    feature = "select-threads",
    feature = "select-cuda"
))]
pub const ACTIVE_ARCHITECTURE: &str = active::NAME;
