//! # Point Sampling Engine
//!
//! [`MaskPoints`] reduces a [`PointSet`] to a bounded sample. One call to
//! [`MaskPoints::execute`] runs the whole pipeline:
//!
//! 1. **Quota**: when `proportional_across_ranks` is set and the transport
//!    spans several ranks, [`QuotaPlanner`] splits `max_count` across ranks
//!    in proportion to their populations. Otherwise every rank applies
//!    `max_count` locally.
//! 2. **Selection**: exactly one of [`StrideSelector`], [`ReservoirSampler`]
//!    or [`StratifiedSampler`] picks the points.
//! 3. **Assembly**: [`SampleAssembler`] copies positions and attributes.
//! 4. **Summary**: ranks holding points gather their sample sizes on a
//!    sub-group; empty ranks sit that exchange out.
//!
//! Requests larger than the population return the whole population.

pub mod assembler;
pub mod quota;
pub mod reservoir;
pub mod stratified;
pub mod stride;

pub use assembler::{AssembledPoints, SampleAssembler};
pub use quota::QuotaPlanner;
pub use reservoir::ReservoirSampler;
pub use stratified::{quickselect, SplitRecord, StratifiedSampler};
pub use stride::StrideSelector;

use crate::config::SampleConfig;
use crate::core::error::Result;
use crate::core::network::SingleProcess;
use crate::core::traits::{CollectiveTransport, RandomSource};
use crate::core::types::{PointSet, Positions, SampleResult, SamplingMode, Vertices};
use crate::core::utils::{AbortFlag, Random};
use serde::Serialize;

/// Result of a selector together with its cancellation state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// Selected points
    pub result: SampleResult,
    /// Whether the selector stopped early on abort
    pub cancelled: bool,
}

impl Selection {
    /// Wrap a selector result.
    pub fn new(result: SampleResult, cancelled: bool) -> Self {
        Selection { result, cancelled }
    }
}

/// What one sampling run did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SampleReport {
    /// Mode that produced the sample
    pub mode: SamplingMode,
    /// Number of local input points
    pub population: usize,
    /// Local sample size after quota planning and clamping
    pub requested: usize,
    /// Number of points in the output
    pub selected: usize,
    /// Whether an abort cut the run short
    pub cancelled: bool,
    /// Total sample size over all participating ranks; only known on the
    /// coordinator of the participating group
    pub global_selected: Option<u64>,
}

/// Output of [`MaskPoints::execute`].
#[derive(Debug, Clone, PartialEq)]
pub struct SampleOutput {
    /// Selected points with their attributes
    pub points: PointSet,
    /// Vertex cells, when `generate_vertices` is set
    pub vertices: Option<Vertices>,
    /// Run summary
    pub report: SampleReport,
}

/// Point sampling engine.
///
/// Generic over the collective transport and the random source so that
/// runs can be distributed and seeded independently.
#[derive(Debug)]
pub struct MaskPoints<T: CollectiveTransport = SingleProcess, R: RandomSource = Random> {
    config: SampleConfig,
    transport: T,
    rng: R,
    abort: AbortFlag,
}

impl MaskPoints {
    /// Single-process engine, seeded from `config.seed` when present.
    pub fn new(config: SampleConfig) -> Self {
        Self::with_transport(config, SingleProcess)
    }
}

impl<T: CollectiveTransport> MaskPoints<T, Random> {
    /// Engine coordinating with other ranks through `transport`.
    pub fn with_transport(config: SampleConfig, transport: T) -> Self {
        let rng = Random::from_optional_seed(config.seed);
        MaskPoints {
            config: config.normalized(),
            transport,
            rng,
            abort: AbortFlag::new(),
        }
    }
}

impl<T: CollectiveTransport, R: RandomSource> MaskPoints<T, R> {
    /// Replace the random source.
    pub fn with_random<R2: RandomSource>(self, rng: R2) -> MaskPoints<T, R2> {
        MaskPoints {
            config: self.config,
            transport: self.transport,
            rng,
            abort: self.abort,
        }
    }

    /// Share an externally owned abort flag.
    pub fn with_abort_flag(mut self, abort: AbortFlag) -> Self {
        self.abort = abort;
        self
    }

    /// Effective (normalized) configuration.
    pub fn config(&self) -> &SampleConfig {
        &self.config
    }

    /// Handle on the abort flag polled by long-running loops.
    pub fn abort_flag(&self) -> &AbortFlag {
        &self.abort
    }

    /// The transport this engine coordinates through.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Sample `input`.
    ///
    /// In a multi-rank group every rank must call this with the same
    /// configuration, since quota planning and the summary are collective.
    pub fn execute(&mut self, input: &PointSet) -> Result<SampleOutput> {
        let population = input.len();
        let distributed = self.transport.size() > 1;

        let requested = if self.config.proportional_across_ranks && distributed {
            let planner = QuotaPlanner::new(self.config.max_count);
            let quota = planner.plan_local(&self.transport, &mut self.rng, population as u64)?;
            // quotas never exceed the local population
            quota as usize
        } else {
            self.config.max_count_usize().min(population)
        };

        let selection = if population == 0 {
            Selection::new(SampleResult::empty(), false)
        } else {
            self.select(input.positions(), requested)
        };
        if selection.cancelled {
            log::warn!(
                "{} sampling aborted after {} of {} points",
                self.config.mode,
                selection.result.len(),
                requested
            );
        }

        let assembled = SampleAssembler::from_config(&self.config).assemble(
            input,
            &selection.result,
            &self.abort,
        )?;
        let selected = assembled.points.len();
        log::debug!(
            "{} sampling: population={}, requested={}, selected={}",
            self.config.mode,
            population,
            requested,
            selected
        );

        let global_selected = if distributed {
            self.summarize(population, selected)?
        } else {
            Some(selected as u64)
        };

        Ok(SampleOutput {
            points: assembled.points,
            vertices: assembled.vertices,
            report: SampleReport {
                mode: self.config.mode,
                population,
                requested,
                selected,
                cancelled: selection.cancelled || assembled.cancelled,
                global_selected,
            },
        })
    }

    fn select(&mut self, positions: &Positions, requested: usize) -> Selection {
        let n = positions.len();
        match self.config.mode {
            SamplingMode::Stride => {
                StrideSelector::new(self.config.stride, self.config.offset, requested)
                    .select(n, &self.abort)
            }
            SamplingMode::Jittered => {
                StrideSelector::new(self.config.stride, self.config.offset, requested)
                    .select_jittered(n, &mut self.rng, &self.abort)
            }
            SamplingMode::Reservoir => {
                let ids = ReservoirSampler::new(n, requested).sample(&mut self.rng);
                Selection::new(SampleResult::Indices(ids), false)
            }
            SamplingMode::Stratified => {
                let result = StratifiedSampler::new(positions).sample(requested, &mut self.rng);
                Selection::new(result, false)
            }
        }
    }

    /// Gather sample sizes over the ranks that hold points. Empty ranks
    /// are split off first so they never block the exchange; everyone
    /// rejoins the world group afterwards.
    fn summarize(&mut self, population: usize, selected: usize) -> Result<Option<u64>> {
        let participating = population > 0;
        self.transport.split_group(participating)?;

        let members = self.transport.size();
        let gathered = if participating {
            self.transport.gather(selected as u64)
        } else {
            Ok(None)
        };
        self.transport.reset_group();

        let total = gathered?.map(|counts| counts.iter().sum::<u64>());
        if let Some(total) = total {
            log::info!(
                "{} sampling selected {} points over {} participating ranks",
                self.config.mode,
                total,
                members
            );
        }
        self.transport.barrier()?;
        Ok(total)
    }
}
