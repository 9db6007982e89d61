//! Materialization of a selection into an output point set.

use crate::config::SampleConfig;
use crate::core::constants::ABORT_CHECK_INTERVAL;
use crate::core::error::Result;
use crate::core::traits::{AttributeStore, CancellationToken};
use crate::core::types::{PointIndex, PointSet, Positions, Precision, SampleResult, Vertices};
use ndarray::Array2;
use num_traits::AsPrimitive;

/// Output of [`SampleAssembler::assemble`].
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledPoints {
    /// Selected points with their attributes
    pub points: PointSet,
    /// Vertex cells over the output points, when requested
    pub vertices: Option<Vertices>,
    /// Whether the copy loop stopped early on abort
    pub cancelled: bool,
}

/// Copies selected points and their attributes into a fresh point set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SampleAssembler {
    precision: Precision,
    generate_vertices: bool,
    single_vertex_per_cell: bool,
}

impl SampleAssembler {
    /// Assembler writing positions in `precision`, without vertex cells.
    pub fn new(precision: Precision) -> Self {
        SampleAssembler {
            precision,
            ..Default::default()
        }
    }

    /// Assembler configured from the output options of `config`.
    pub fn from_config(config: &SampleConfig) -> Self {
        SampleAssembler {
            precision: config.precision,
            generate_vertices: config.generate_vertices,
            single_vertex_per_cell: config.single_vertex_per_cell,
        }
    }

    /// Also emit vertex cells: one per point when `single_vertex_per_cell`,
    /// otherwise a single cell over every output point.
    pub fn with_vertices(mut self, single_vertex_per_cell: bool) -> Self {
        self.generate_vertices = true;
        self.single_vertex_per_cell = single_vertex_per_cell;
        self
    }

    /// Copy the points named by `result` out of `input`, in selection order.
    ///
    /// On abort the output is cut back to the points already copied in full.
    pub fn assemble<C: CancellationToken + ?Sized>(
        &self,
        input: &PointSet,
        result: &SampleResult,
        abort: &C,
    ) -> Result<AssembledPoints> {
        let ids = result.source_indices();
        let precision = match self.precision {
            Precision::Default => input.positions().precision(),
            p => p,
        };
        let mut positions = Positions::zeros(ids.len(), precision);
        let mut point_data = input.point_data().allocate(ids.len());

        let mut copied = ids.len();
        let mut cancelled = false;
        for (dst, &src) in ids.iter().enumerate() {
            if dst % ABORT_CHECK_INTERVAL == 0 && abort.poll_abort() {
                copied = dst;
                cancelled = true;
                break;
            }
            copy_position(&mut positions, dst, input.positions(), src);
            point_data.copy_value(dst, input.point_data(), src)?;
        }
        if cancelled {
            log::warn!(
                "Assembly aborted after {} of {} points",
                copied,
                ids.len()
            );
            positions.truncate(copied);
            point_data.truncate(copied);
        }

        let vertices = self.generate_vertices.then(|| {
            let ids: Vec<PointIndex> = (0..copied).collect();
            if self.single_vertex_per_cell {
                Vertices::PerPoint(ids)
            } else {
                Vertices::PolyVertex(ids)
            }
        });

        Ok(AssembledPoints {
            points: PointSet::new(positions, point_data)?,
            vertices,
            cancelled,
        })
    }
}

fn copy_position(dst: &mut Positions, dst_index: PointIndex, src: &Positions, src_index: PointIndex) {
    match (dst, src) {
        (Positions::Single(d), Positions::Single(s)) => copy_row(d, dst_index, s, src_index),
        (Positions::Single(d), Positions::Double(s)) => copy_row(d, dst_index, s, src_index),
        (Positions::Double(d), Positions::Single(s)) => copy_row(d, dst_index, s, src_index),
        (Positions::Double(d), Positions::Double(s)) => copy_row(d, dst_index, s, src_index),
    }
}

#[inline]
fn copy_row<S, D>(dst: &mut Array2<D>, dst_index: usize, src: &Array2<S>, src_index: usize)
where
    S: AsPrimitive<D>,
    D: Copy + 'static,
{
    for (d, &s) in dst.row_mut(dst_index).iter_mut().zip(src.row(src_index)) {
        *d = s.as_();
    }
}
