//! Clamping of out-of-range configuration values.
//!
//! None of the sampling options is fatal: values outside their valid range
//! are replaced by the nearest valid value and reported as warnings.

use crate::config::core::SampleConfig;
use crate::core::constants::NO_LIMIT;
use serde::{Deserialize, Serialize};

/// One clamped parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClampWarning {
    /// Parameter name
    pub parameter: String,
    /// Value before clamping
    pub original: String,
    /// Value after clamping
    pub clamped: String,
}

impl ClampWarning {
    fn new(parameter: &str, original: impl ToString, clamped: impl ToString) -> Self {
        ClampWarning {
            parameter: parameter.to_string(),
            original: original.to_string(),
            clamped: clamped.to_string(),
        }
    }
}

/// Clamp every option into range, returning the adjusted copy and one
/// warning per adjustment.
pub fn normalize(config: &SampleConfig) -> (SampleConfig, Vec<ClampWarning>) {
    let mut out = config.clone();
    let mut warnings = Vec::new();

    if out.stride < 1 {
        warnings.push(ClampWarning::new("stride", out.stride, 1));
        out.stride = 1;
    }

    if out.max_count > NO_LIMIT {
        warnings.push(ClampWarning::new("max_count", out.max_count, NO_LIMIT));
        out.max_count = NO_LIMIT;
    }

    (out, warnings)
}
