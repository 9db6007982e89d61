//! Core infrastructure for the point masking engine.
//!
//! - [`types`]: point sets, attributes, partitions and sample results
//! - [`constants`]: sentinels and defaults
//! - [`error`]: error type and `Result` alias
//! - [`traits`]: random, cancellation, attribute and transport seams
//! - [`network`]: collective transports (single process and in-process cluster)
//! - [`utils`]: seeded random generator and abort flags

pub mod constants;
pub mod error;
pub mod network;
pub mod traits;
pub mod types;
pub mod utils;

pub use constants::*;
pub use error::{MaskPointsError, Result};
pub use network::{LocalCluster, LocalTransport, SingleProcess};
pub use traits::*;
pub use types::*;
pub use utils::{AbortFlag, NeverAbort, Random};
