//! Exact uniform sampling of `k` indices out of `n` in one ordered pass.
//!
//! Vitter's Algorithm D: instead of drawing one random number per
//! candidate, it draws the length of the next skip directly, using a cheap
//! acceptance test and falling back to the exact (costlier) skip
//! distribution only on the rejection branch. When the remaining sample is
//! a large fraction of the remaining population the skip-based method
//! loses its edge and Vitter's sequential Algorithm A finishes the job.
//!
//! Reference: J. S. Vitter, "An efficient algorithm for sequential random
//! sampling", ACM TOMS 13(1), 1987.

use crate::core::traits::RandomSource;
use crate::core::types::PointIndex;

/// Algorithm D hands over to Algorithm A once `n < ALPHA_INV * k`.
const ALPHA_INV: i64 = 13;

/// Uniform sampler over `[0, n)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReservoirSampler {
    population: usize,
    sample_size: usize,
}

impl ReservoirSampler {
    /// Sampler drawing `sample_size` of `population` indices. Requests
    /// larger than the population are clamped to it.
    pub fn new(population: usize, sample_size: usize) -> Self {
        if sample_size > population {
            log::debug!(
                "Reservoir sample size {} clamped to population {}",
                sample_size,
                population
            );
        }
        ReservoirSampler {
            population,
            sample_size: sample_size.min(population),
        }
    }

    /// Effective number of indices drawn.
    pub fn sample_size(&self) -> usize {
        self.sample_size
    }

    /// Strictly increasing indices; every subset of the effective size is
    /// equally likely.
    pub fn sample<R: RandomSource + ?Sized>(&self, rng: &mut R) -> Vec<PointIndex> {
        let (n, k) = (self.population, self.sample_size);
        if k == 0 {
            return Vec::new();
        }
        if k == n {
            return (0..n).collect();
        }
        let mut out = Vec::with_capacity(k);
        method_d(n as i64, k as i64, rng, &mut out);
        out
    }
}

/// Skip-based selection of `samplesize` indices from `size`.
fn method_d<R: RandomSource + ?Sized>(
    mut size: i64,
    mut samplesize: i64,
    rng: &mut R,
    out: &mut Vec<PointIndex>,
) {
    let mut cursor: i64 = -1;
    let mut nreal = samplesize as f64;
    let mut ninv = 1.0 / nreal;
    let mut big_n = size as f64;
    let mut vprime = (rng.next_open_uniform().ln() * ninv).exp();
    let mut qu1 = size - samplesize + 1;
    let mut qu1real = big_n - nreal + 1.0;
    let mut threshold = ALPHA_INV * samplesize;

    while samplesize > 1 && threshold < size {
        let nmin1inv = 1.0 / (nreal - 1.0);
        let skip: i64;
        loop {
            // Draw X from the continuous envelope until its floor is feasible.
            let mut x;
            let mut s;
            loop {
                x = big_n * (1.0 - vprime);
                s = x.floor() as i64;
                if s < qu1 {
                    break;
                }
                vprime = (rng.next_open_uniform().ln() * ninv).exp();
            }
            let u = rng.next_open_uniform();
            let neg_s = -(s as f64);
            let y1 = ((u * big_n / qu1real).ln() * nmin1inv).exp();
            vprime = y1 * (1.0 - x / big_n) * (qu1real / (neg_s + qu1real));
            if vprime <= 1.0 {
                skip = s;
                break;
            }

            // Squeeze failed: evaluate the exact ratio of falling products.
            let mut y2 = 1.0;
            let mut top = big_n - 1.0;
            let (mut bottom, limit) = if samplesize - 1 > s {
                (big_n - nreal, size - s)
            } else {
                (big_n + neg_s - 1.0, qu1)
            };
            let mut t = size - 1;
            while t >= limit {
                y2 = (y2 * top) / bottom;
                top -= 1.0;
                bottom -= 1.0;
                t -= 1;
            }
            if big_n / (big_n - x) >= y1 * (y2.ln() * nmin1inv).exp() {
                vprime = (rng.next_open_uniform().ln() * nmin1inv).exp();
                skip = s;
                break;
            }
            vprime = (rng.next_open_uniform().ln() * ninv).exp();
        }

        cursor += skip + 1;
        out.push(cursor as PointIndex);

        size -= skip + 1;
        big_n -= (skip + 1) as f64;
        samplesize -= 1;
        nreal -= 1.0;
        ninv = nmin1inv;
        qu1 -= skip;
        qu1real -= skip as f64;
        threshold -= ALPHA_INV;
    }

    if samplesize > 1 {
        method_a(size, samplesize, cursor, rng, out);
    } else {
        cursor += rng.next_index(size as usize) as i64 + 1;
        out.push(cursor as PointIndex);
    }
}

/// Sequential selection, one uniform draw per selected index.
fn method_a<R: RandomSource + ?Sized>(
    size: i64,
    mut samplesize: i64,
    mut cursor: i64,
    rng: &mut R,
    out: &mut Vec<PointIndex>,
) {
    let mut top = (size - samplesize) as f64;
    let mut big_n = size as f64;
    while samplesize >= 2 {
        let v = rng.next_uniform();
        let mut skip: i64 = 0;
        let mut quot = top / big_n;
        while quot > v {
            skip += 1;
            top -= 1.0;
            big_n -= 1.0;
            quot = (quot * top) / big_n;
        }
        cursor += skip + 1;
        out.push(cursor as PointIndex);
        big_n -= 1.0;
        samplesize -= 1;
    }
    cursor += rng.next_index(big_n.round() as usize) as i64 + 1;
    out.push(cursor as PointIndex);
}
