//! Distributed negotiation of per-rank sample counts.
//!
//! The coordinator gathers every rank's population, splits the global
//! target in proportion to those populations (rounding down), hands the
//! leftover units to randomly chosen ranks and scatters the result back.

use crate::core::error::Result;
use crate::core::traits::{CollectiveTransport, RandomSource};

/// Splits a global sample cap across ranks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaPlanner {
    global_max: u64,
}

impl QuotaPlanner {
    /// Planner for a global cap of `global_max` samples.
    pub fn new(global_max: u64) -> Self {
        QuotaPlanner { global_max }
    }

    /// The global cap.
    pub fn global_max(&self) -> u64 {
        self.global_max
    }

    /// Quotas for the given per-rank populations.
    ///
    /// The quotas sum to `min(global_max, total)`, each is within one of its
    /// exact proportional share, and ranks with no points always get zero.
    pub fn compute<R: RandomSource + ?Sized>(&self, counts: &[u64], rng: &mut R) -> Vec<u64> {
        let total: u128 = counts.iter().map(|&c| u128::from(c)).sum();
        if total == 0 {
            return vec![0; counts.len()];
        }
        let target = u128::from(self.global_max).min(total);

        let mut quotas: Vec<u64> = counts
            .iter()
            // c * target / total <= c, so the narrowing cannot truncate
            .map(|&c| (u128::from(c) * target / total) as u64)
            .collect();
        let assigned: u128 = quotas.iter().map(|&q| u128::from(q)).sum();
        let remainder = (target - assigned) as usize;

        if remainder > 0 {
            // Every populated rank loses less than one unit to rounding, so
            // there are always more populated ranks than leftover units.
            let populated: Vec<usize> = counts
                .iter()
                .enumerate()
                .filter(|&(_, &c)| c > 0)
                .map(|(i, _)| i)
                .collect();
            let mut eligible = vec![false; populated.len()];
            eligible[..remainder].fill(true);
            shuffle(&mut eligible, rng);
            for (&rank, _) in populated.iter().zip(&eligible).filter(|&(_, &e)| e) {
                quotas[rank] += 1;
            }
        }

        log::debug!(
            "Quotas for {} ranks: target={}, remainder={}",
            counts.len(),
            target,
            remainder
        );
        quotas
    }

    /// Negotiate this rank's quota with the rest of the group.
    ///
    /// Blocks until every member of the transport's current group calls in.
    /// A single-member group degenerates to `min(global_max, local_count)`.
    pub fn plan_local<T, R>(&self, transport: &T, rng: &mut R, local_count: u64) -> Result<u64>
    where
        T: CollectiveTransport + ?Sized,
        R: RandomSource + ?Sized,
    {
        if transport.size() <= 1 {
            return Ok(self.global_max.min(local_count));
        }
        let gathered = transport.gather(local_count)?;
        let quotas = gathered.map(|counts| self.compute(&counts, rng));
        transport.scatter(quotas.as_deref())
    }
}

/// Fisher-Yates shuffle driven by a [`RandomSource`].
fn shuffle<T, R: RandomSource + ?Sized>(values: &mut [T], rng: &mut R) {
    for i in (1..values.len()).rev() {
        let j = rng.next_index(i + 1);
        values.swap(i, j);
    }
}
