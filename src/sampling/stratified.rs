//! Spatially stratified sampling by recursive median splits.
//!
//! The sampler works on a permutation of point indices rather than on a
//! copy of the point data: every "swap" of two points is a swap of two
//! permutation entries, so positions and attributes stay coupled for free
//! and are only materialized once, by the assembler. Each level splits its
//! range at the median along one axis (cycling x, y, z), draws half of its
//! samples from each side and packs the survivors into a contiguous prefix.

use crate::core::constants::STRATIFIED_AXES;
use crate::core::traits::RandomSource;
use crate::core::types::{Partition, PointIndex, Positions, SampleResult};
use std::cmp::Ordering;

/// One split performed by the recursion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitRecord {
    /// Range being split
    pub parent: Partition,
    /// Lower half along the split axis
    pub left: Partition,
    /// Upper half along the split axis
    pub right: Partition,
    /// Samples requested from the parent
    pub size: usize,
    /// Samples drawn from the left half
    pub left_size: usize,
    /// Samples drawn from the right half
    pub right_size: usize,
}

/// Partition `perm[part]` in place so that the entry at `nth` holds the
/// point of that rank along `axis`, with no larger coordinate before it and
/// no smaller coordinate after it.
///
/// Pivots are chosen uniformly at random, so the expected cost is linear in
/// the range length; adversarial inputs can still force the quadratic case.
/// Stops early when a scan finds every coordinate equal to the pivot.
pub fn quickselect<R: RandomSource + ?Sized>(
    perm: &mut [PointIndex],
    positions: &Positions,
    part: Partition,
    nth: usize,
    axis: usize,
    rng: &mut R,
) {
    let (mut lo, mut hi) = (part.start, part.end);
    loop {
        if hi - lo < 2 {
            return;
        }
        let pivot = lo + rng.next_index(hi - lo);
        let pivot_value = positions.coordinate(perm[pivot], axis);
        perm.swap(pivot, hi - 1);

        let mut store = lo;
        let mut all_equal = true;
        for i in lo..hi - 1 {
            let value = positions.coordinate(perm[i], axis);
            if value != pivot_value {
                all_equal = false;
            }
            if value < pivot_value {
                perm.swap(store, i);
                store += 1;
            }
        }
        perm.swap(store, hi - 1);

        if all_equal {
            return;
        }
        match nth.cmp(&store) {
            Ordering::Equal => return,
            Ordering::Less => hi = store,
            Ordering::Greater => lo = store + 1,
        }
    }
}

/// Recursive median-split sampler over a set of positions.
#[derive(Debug, Clone, Copy)]
pub struct StratifiedSampler<'a> {
    positions: &'a Positions,
}

impl<'a> StratifiedSampler<'a> {
    /// Sampler over `positions`; the positions themselves are never reordered.
    pub fn new(positions: &'a Positions) -> Self {
        StratifiedSampler { positions }
    }

    /// Draw `size` points (clamped to the population). The result is the
    /// selected prefix of a permutation of the source indices.
    pub fn sample<R: RandomSource + ?Sized>(&self, size: usize, rng: &mut R) -> SampleResult {
        self.run(size, rng, None)
    }

    /// Like [`sample`](Self::sample), also returning every split performed.
    pub fn sample_with_trace<R: RandomSource + ?Sized>(
        &self,
        size: usize,
        rng: &mut R,
    ) -> (SampleResult, Vec<SplitRecord>) {
        let mut trace = Vec::new();
        let result = self.run(size, rng, Some(&mut trace));
        (result, trace)
    }

    fn run<R: RandomSource + ?Sized>(
        &self,
        size: usize,
        rng: &mut R,
        trace: Option<&mut Vec<SplitRecord>>,
    ) -> SampleResult {
        let n = self.positions.len();
        let size = size.min(n);
        let mut permutation: Vec<PointIndex> = (0..n).collect();
        if size > 0 {
            self.sort_and_sample(&mut permutation, Partition::new(0, n), size, 0, rng, trace);
        }
        SampleResult::Prefix {
            permutation,
            len: size,
        }
    }

    fn sort_and_sample<R: RandomSource + ?Sized>(
        &self,
        perm: &mut [PointIndex],
        part: Partition,
        size: usize,
        depth: usize,
        rng: &mut R,
        mut trace: Option<&mut Vec<SplitRecord>>,
    ) {
        let len = part.len();
        if size >= len {
            return;
        }
        if size < 2 {
            if len > 0 {
                let pick = part.start + rng.next_index(len);
                perm.swap(part.start, pick);
            }
            return;
        }

        let mut half = part.start + len / 2;
        if len % 2 == 1 && rng.next_bool() {
            half += 1;
        }
        quickselect(perm, self.positions, part, half, depth % STRATIFIED_AXES, rng);
        let (left, right) = part.split_at(half);

        let mut left_size = size / 2;
        if size % 2 == 1 && rng.next_bool() {
            left_size += 1;
        }
        // size < len, so this window is never empty
        left_size = left_size
            .min(left.len())
            .max(size.saturating_sub(right.len()));
        let right_size = size - left_size;

        if let Some(trace) = trace.as_deref_mut() {
            trace.push(SplitRecord {
                parent: part,
                left,
                right,
                size,
                left_size,
                right_size,
            });
        }

        self.sort_and_sample(perm, left, left_size, depth + 1, rng, trace.as_deref_mut());
        self.sort_and_sample(perm, right, right_size, depth + 1, rng, trace.as_deref_mut());

        // Pack the right half's samples directly after the left half's.
        for i in 0..right_size {
            perm.swap(left.start + left_size + i, right.start + i);
        }
    }
}
