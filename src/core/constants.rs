//! Constants and configuration defaults for the masking engine.

/// Sentinel for "no limit" on the output size. Chosen as `i64::MAX` so the
/// value survives TOML, whose integers are signed 64-bit.
pub const NO_LIMIT: u64 = i64::MAX as u64;

/// Default selection period for stride modes.
pub const DEFAULT_STRIDE: usize = 2;

/// Default starting index for stride modes.
pub const DEFAULT_OFFSET: usize = 0;

/// Number of loop iterations between two polls of the abort flag.
pub const ABORT_CHECK_INTERVAL: usize = 1024;

/// Number of spatial axes the stratified sampler cycles through.
pub const STRATIFIED_AXES: usize = 3;

/// Prefix of environment variables read by `SampleConfig::load_from_environment`.
pub const ENV_PREFIX: &str = "MASK_POINTS_";

/// Crate version.
pub const MASK_POINTS_VERSION: &str = env!("CARGO_PKG_VERSION");
