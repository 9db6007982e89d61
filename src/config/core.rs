//! Sampling configuration and its fluent builder.

use crate::config::validation::{normalize, ClampWarning};
use crate::core::constants::*;
use crate::core::error::{MaskPointsError, Result};
use crate::core::types::{Precision, SamplingMode};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Options recognized by the sampling engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SampleConfig {
    /// Selection period for stride modes (>= 1)
    pub stride: usize,
    /// Starting index for stride modes
    pub offset: usize,
    /// Upper bound on the output size; [`NO_LIMIT`] for none
    pub max_count: u64,
    /// Selection policy
    pub mode: SamplingMode,
    /// Split `max_count` across ranks in proportion to their populations
    pub proportional_across_ranks: bool,
    /// Output position precision
    pub precision: Precision,
    /// Random seed; entropy seeded when absent
    pub seed: Option<u64>,
    /// Emit vertex cells over the output points
    pub generate_vertices: bool,
    /// One cell per output point instead of a single poly-vertex cell
    pub single_vertex_per_cell: bool,
}

impl Default for SampleConfig {
    fn default() -> Self {
        SampleConfig {
            stride: DEFAULT_STRIDE,
            offset: DEFAULT_OFFSET,
            max_count: NO_LIMIT,
            mode: SamplingMode::default(),
            proportional_across_ranks: false,
            precision: Precision::default(),
            seed: None,
            generate_vertices: false,
            single_vertex_per_cell: false,
        }
    }
}

impl SampleConfig {
    /// Create a default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of this configuration with out-of-range values clamped.
    /// Each clamp is logged as a warning.
    pub fn normalized(&self) -> SampleConfig {
        let (config, warnings) = normalize(self);
        for ClampWarning {
            parameter,
            original,
            clamped,
        } in &warnings
        {
            log::warn!("{} = {} is out of range, clamped to {}", parameter, original, clamped);
        }
        config
    }

    /// `max_count` as a local size bound, saturating on narrow targets
    pub fn max_count_usize(&self) -> usize {
        usize::try_from(self.max_count).unwrap_or(usize::MAX)
    }

    /// Whether `max_count` is the "no limit" sentinel
    pub fn is_unbounded(&self) -> bool {
        self.max_count >= NO_LIMIT
    }

    /// Load configuration from a `.json` or `.toml` file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| MaskPointsError::config(format!("Failed to read config file: {}", e)))?;

        let config: SampleConfig = match path.extension().and_then(|s| s.to_str()) {
            Some("json") => serde_json::from_str(&content)?,
            Some("toml") => toml::from_str(&content)?,
            _ => {
                return Err(MaskPointsError::config(
                    "Unsupported config file format. Use .json or .toml",
                ))
            }
        };

        Ok(config.normalized())
    }

    /// Save configuration to a `.json` or `.toml` file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = match path.extension().and_then(|s| s.to_str()) {
            Some("json") => serde_json::to_string_pretty(self)?,
            Some("toml") => toml::to_string_pretty(self)?,
            _ => {
                return Err(MaskPointsError::config(
                    "Unsupported config file format. Use .json or .toml",
                ))
            }
        };

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load configuration from `MASK_POINTS_*` environment variables
    pub fn load_from_environment() -> Result<Self> {
        let mut config = SampleConfig::default();
        config.apply_variables(std::env::vars())?;
        Ok(config.normalized())
    }

    /// Apply `MASK_POINTS_*` style key/value overrides. Unknown keys are ignored.
    pub fn apply_variables<I, K, V>(&mut self, vars: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, value) in vars {
            let Some(name) = key.as_ref().strip_prefix(ENV_PREFIX) else {
                continue;
            };
            let value = value.as_ref().trim();
            match name {
                "STRIDE" => self.stride = parse_var(name, value)?,
                "OFFSET" => self.offset = parse_var(name, value)?,
                "MAX_COUNT" => self.max_count = parse_var(name, value)?,
                "MODE" => {
                    self.mode = match SamplingMode::from_name(value) {
                        Some(mode) => mode,
                        None => SamplingMode::from_index(parse_var(name, value)?),
                    }
                }
                "PROPORTIONAL" => self.proportional_across_ranks = parse_var(name, value)?,
                "PRECISION" => {
                    self.precision = match value.to_lowercase().as_str() {
                        "default" => Precision::Default,
                        "single" => Precision::Single,
                        "double" => Precision::Double,
                        _ => {
                            return Err(MaskPointsError::invalid_parameter(
                                format!("{}{}", ENV_PREFIX, name),
                                value,
                                "expected default, single or double",
                            ))
                        }
                    }
                }
                "SEED" => self.seed = Some(parse_var(name, value)?),
                "GENERATE_VERTICES" => self.generate_vertices = parse_var(name, value)?,
                "SINGLE_VERTEX_PER_CELL" => self.single_vertex_per_cell = parse_var(name, value)?,
                other => log::debug!("Ignoring unknown variable {}{}", ENV_PREFIX, other),
            }
        }
        Ok(())
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value.parse().map_err(|_| {
        MaskPointsError::invalid_parameter(
            format!("{}{}", ENV_PREFIX, name),
            value,
            "could not be parsed",
        )
    })
}

/// Configuration builder for fluent configuration creation
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    config: SampleConfig,
}

impl ConfigBuilder {
    /// Create a new configuration builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the selection period
    pub fn stride(mut self, stride: usize) -> Self {
        self.config.stride = stride;
        self
    }

    /// Set the starting index
    pub fn offset(mut self, offset: usize) -> Self {
        self.config.offset = offset;
        self
    }

    /// Set the output size bound
    pub fn max_count(mut self, max_count: u64) -> Self {
        self.config.max_count = max_count;
        self
    }

    /// Set the selection policy
    pub fn mode(mut self, mode: SamplingMode) -> Self {
        self.config.mode = mode;
        self
    }

    /// Distribute `max_count` across ranks proportionally
    pub fn proportional_across_ranks(mut self, enabled: bool) -> Self {
        self.config.proportional_across_ranks = enabled;
        self
    }

    /// Set the output position precision
    pub fn precision(mut self, precision: Precision) -> Self {
        self.config.precision = precision;
        self
    }

    /// Seed the random source
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    /// Emit vertex cells, one per point when `single_vertex_per_cell` is set
    pub fn generate_vertices(mut self, enabled: bool, single_vertex_per_cell: bool) -> Self {
        self.config.generate_vertices = enabled;
        self.config.single_vertex_per_cell = single_vertex_per_cell;
        self
    }

    /// Build the configuration, clamping out-of-range values
    pub fn build(self) -> SampleConfig {
        self.config.normalized()
    }
}
