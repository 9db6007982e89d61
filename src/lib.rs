//! # mask-points
//!
//! Subsampling of large point clouds down to a bounded sample, with the
//! attributes of every kept point carried along unchanged.
//!
//! ## Sampling modes
//!
//! - **Stride**: every `stride`-th point from `offset`.
//! - **Jittered**: a random walk whose mean step is the stride. Fast, but
//!   order sensitive and not a uniform sample.
//! - **Reservoir**: an exact uniform sample of fixed size in one ordered
//!   pass (Vitter's Algorithm D).
//! - **Stratified**: recursive median splits along x, y and z, taking half
//!   of the samples from each side at every level.
//!
//! When several ranks cooperate, `max_count` can be split across them in
//! proportion to their local populations.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mask_points::{ConfigBuilder, MaskPoints, PointSet, Positions, SamplingMode};
//!
//! # fn main() -> mask_points::Result<()> {
//! let points: Vec<[f64; 3]> = (0..10_000).map(|i| [i as f64, 0.0, 0.0]).collect();
//! let input = PointSet::from_positions(Positions::from_points(&points))?;
//!
//! let config = ConfigBuilder::new()
//!     .mode(SamplingMode::Reservoir)
//!     .max_count(100)
//!     .seed(42)
//!     .build();
//!
//! let output = MaskPoints::new(config).execute(&input)?;
//! assert_eq!(output.points.len(), 100);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`core`]: point sets, error handling, trait seams, transports
//! - [`config`]: configuration, builder and file/environment loading
//! - [`sampling`]: quota planning, the selectors, assembly and the engine

#![warn(missing_docs)]
#![warn(missing_debug_implementations, rust_2018_idioms, non_snake_case)]

// Core infrastructure module - always available
pub mod core;

// Configuration management module
pub mod config;

// Selectors and the sampling engine
pub mod sampling;

// Re-export core functionality for convenience
pub use crate::core::{
    constants::*,
    error::{MaskPointsError, Result},
    network::{LocalCluster, LocalTransport, SingleProcess},
    traits::*,
    types::*,
    utils::{AbortFlag, NeverAbort, Random},
};

// Re-export configuration functionality
pub use config::{ConfigBuilder, SampleConfig};

// Re-export sampling functionality
pub use sampling::{
    AssembledPoints, MaskPoints, QuotaPlanner, ReservoirSampler, SampleAssembler, SampleOutput,
    SampleReport, Selection, StratifiedSampler, StrideSelector,
};

// Version information
pub use crate::core::constants::MASK_POINTS_VERSION as VERSION;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_info() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_error_integration() {
        let err = MaskPointsError::config("test error");
        assert_eq!(err.category(), "config");
    }

    #[test]
    fn test_reexports_compose() {
        let input = PointSet::from_positions(Positions::from_points(&[[0.0; 3]; 5])).unwrap();
        let config = ConfigBuilder::new().stride(1).max_count(3).build();
        let output = MaskPoints::new(config).execute(&input).unwrap();
        assert_eq!(output.report.selected, 3);
    }
}
