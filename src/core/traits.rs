//! Trait seams between the sampling engine and its collaborators.
//!
//! The engine never owns a global random generator, transport or abort
//! flag; callers inject implementations of these traits so that runs can
//! be seeded, cancelled and distributed independently.

use crate::core::error::Result;
use crate::core::types::{AttributeArray, PointData, PointIndex};

/// Source of uniform random numbers.
pub trait RandomSource {
    /// Uniform double in `[0, 1)`.
    fn next_uniform(&mut self) -> f64;

    /// Uniform integer in `[0, bound)`. `bound` must be positive.
    fn next_index(&mut self, bound: usize) -> usize;

    /// Uniform double in the open interval `(0, 1)`, safe to pass to `ln`.
    fn next_open_uniform(&mut self) -> f64 {
        loop {
            let u = self.next_uniform();
            if u > 0.0 {
                return u;
            }
        }
    }

    /// Fair coin flip.
    fn next_bool(&mut self) -> bool {
        self.next_uniform() < 0.5
    }
}

/// Externally owned abort flag, polled by long-running loops.
pub trait CancellationToken {
    /// Whether the caller asked to stop.
    fn poll_abort(&self) -> bool;
}

/// Attribute storage that can be allocated and filled tuple by tuple.
pub trait AttributeStore {
    /// Storage with the same arrays (names, types, component counts)
    /// holding `n` zeroed tuples.
    fn allocate(&self, n: usize) -> Self
    where
        Self: Sized;

    /// Copy every attribute at `src_index` of `source` to `dst_index` of `self`.
    fn copy_value(&mut self, dst_index: PointIndex, source: &Self, src_index: PointIndex)
        -> Result<()>;

    /// Drop every tuple at or past `n`.
    fn truncate(&mut self, n: usize);
}

impl AttributeStore for PointData {
    fn allocate(&self, n: usize) -> Self {
        let mut out = PointData::new();
        for array in self.iter() {
            out.add_array(AttributeArray::new(
                array.name.clone(),
                array.data.zeros_like(n),
            ));
        }
        out
    }

    fn copy_value(
        &mut self,
        dst_index: PointIndex,
        source: &Self,
        src_index: PointIndex,
    ) -> Result<()> {
        for (dst, src) in self.iter_mut().zip(source.iter()) {
            dst.data.copy_tuple(dst_index, &src.data, src_index)?;
        }
        Ok(())
    }

    fn truncate(&mut self, n: usize) {
        for array in self.iter_mut() {
            array.data.truncate(n);
        }
    }
}

/// Collective communication between cooperating ranks.
///
/// Every collective call blocks until all members of the current group
/// reach the matching call. The coordinator of a group is its rank 0.
pub trait CollectiveTransport {
    /// Rank of this process within the current group.
    fn rank(&self) -> usize;

    /// Number of processes in the current group.
    fn size(&self) -> usize;

    /// Gather one value from every member onto the coordinator.
    /// Returns `Some(values)` ordered by rank on the coordinator, `None` elsewhere.
    fn gather(&self, local: u64) -> Result<Option<Vec<u64>>>;

    /// Scatter one value to every member. Only the coordinator's `values`
    /// are read; it must hold exactly `size()` entries.
    fn scatter(&self, values: Option<&[u64]>) -> Result<u64>;

    /// Block until every member arrives.
    fn barrier(&self) -> Result<()>;

    /// Split the current group by `color`; members passing the same
    /// color form the new current group.
    fn split_group(&mut self, color: bool) -> Result<()>;

    /// Return to the group this transport was created with.
    fn reset_group(&mut self);
}
