//! Configuration for the sampling engine.
//!
//! [`SampleConfig`] can be built programmatically through [`ConfigBuilder`],
//! loaded from JSON or TOML files, or read from `MASK_POINTS_*` environment
//! variables. Out-of-range values are clamped, never rejected.

pub mod core;
pub mod validation;

pub use self::core::{ConfigBuilder, SampleConfig};
pub use self::validation::{normalize, ClampWarning};
