//! Deterministic and jittered "every Nth point" selection.
//!
//! Both variants are single streaming passes that poll the abort flag every
//! [`ABORT_CHECK_INTERVAL`] selections. Jittered stride is a fast heuristic:
//! its output depends on input order and it is not a uniform sampler.

use crate::core::constants::ABORT_CHECK_INTERVAL;
use crate::core::traits::{CancellationToken, RandomSource};
use crate::core::types::{PointIndex, SampleResult};
use crate::sampling::Selection;

/// Stride based point selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrideSelector {
    stride: usize,
    offset: usize,
    max_count: usize,
}

impl StrideSelector {
    /// Selector taking every `stride`-th index from `offset`, at most
    /// `max_count` of them. A zero stride is treated as one.
    pub fn new(stride: usize, offset: usize, max_count: usize) -> Self {
        StrideSelector {
            stride: stride.max(1),
            offset,
            max_count,
        }
    }

    /// Indices `offset, offset + stride, ...` below `n`, truncated to `max_count`.
    pub fn select<C: CancellationToken + ?Sized>(&self, n: usize, abort: &C) -> Selection {
        let remaining = n.saturating_sub(self.offset);
        let expected = remaining.div_ceil(self.stride).min(self.max_count);
        let mut ids: Vec<PointIndex> = Vec::with_capacity(expected);

        let mut cancelled = false;
        let mut id = self.offset;
        while id < n && ids.len() < self.max_count {
            if ids.len() % ABORT_CHECK_INTERVAL == 0 && abort.poll_abort() {
                cancelled = true;
                break;
            }
            ids.push(id);
            id = match id.checked_add(self.stride) {
                Some(next) => next,
                None => break,
            };
        }

        Selection::new(SampleResult::Indices(ids), cancelled)
    }

    /// Mean-preserving random stride: each step advances by
    /// `1 + floor(u * cap)` with `u` uniform in `[0, 1)`.
    pub fn select_jittered<R, C>(&self, n: usize, rng: &mut R, abort: &C) -> Selection
    where
        R: RandomSource + ?Sized,
        C: CancellationToken + ?Sized,
    {
        let remaining = n.saturating_sub(self.offset);
        if remaining == 0 || self.max_count == 0 {
            return Selection::new(SampleResult::empty(), false);
        }
        let cap = self.jitter_cap(remaining);
        log::debug!("Jittered stride over {} points, cap {:.3}", remaining, cap);

        let mut ids: Vec<PointIndex> =
            Vec::with_capacity(self.max_count.min(remaining.div_ceil(self.stride) + 1));
        let mut cancelled = false;
        let mut id = self.offset;
        while id < n && ids.len() < self.max_count {
            if ids.len() % ABORT_CHECK_INTERVAL == 0 && abort.poll_abort() {
                cancelled = true;
                break;
            }
            ids.push(id);
            let step = 1 + (rng.next_uniform() * cap) as usize;
            id = match id.checked_add(step) {
                Some(next) => next,
                None => break,
            };
        }

        Selection::new(SampleResult::Indices(ids), cancelled)
    }

    /// Largest extra jump of the jittered walk. The mean step is
    /// `(cap + 1) / 2`: the configured stride, unless that would select more
    /// than `max_count` points, in which case the walk spreads `max_count`
    /// selections over the whole remaining range.
    fn jitter_cap(&self, remaining: usize) -> f64 {
        if remaining / self.stride > self.max_count {
            2.0 * remaining as f64 / self.max_count as f64 - 1.0
        } else {
            2.0 * self.stride as f64 - 1.0
        }
    }
}
