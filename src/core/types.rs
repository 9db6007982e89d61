//! Core data types for the point masking engine.
//!
//! A [`PointSet`] stores positions as an `N x 3` ndarray matrix and keeps
//! every named attribute in a parallel `N x components` matrix. All arrays
//! are index-aligned: row `i` of every attribute belongs to point `i`.

use crate::core::error::{MaskPointsError, Result};
use ndarray::{s, Array2};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of a point inside a [`PointSet`].
pub type PointIndex = usize;

/// Number of spatial dimensions carried by every position.
pub const SPATIAL_DIMENSIONS: usize = 3;

/// Point selection policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase", try_from = "ModeRepr")]
pub enum SamplingMode {
    /// Every `stride`-th point starting at `offset`
    #[default]
    Stride,
    /// Randomly jittered stride; fast but order-sensitive, not a uniform sampler
    Jittered,
    /// Exact uniform sample of fixed size (Vitter's Algorithm D)
    Reservoir,
    /// Recursive spatial median splits
    Stratified,
}

impl SamplingMode {
    /// All modes in enumerator order.
    pub const ALL: [SamplingMode; 4] = [
        SamplingMode::Stride,
        SamplingMode::Jittered,
        SamplingMode::Reservoir,
        SamplingMode::Stratified,
    ];

    /// Map an integer mode code onto a mode, clamping out-of-range codes
    /// to the nearest valid enumerator.
    pub fn from_index(index: i64) -> Self {
        let clamped = index.clamp(0, Self::ALL.len() as i64 - 1);
        if clamped != index {
            log::warn!(
                "Sampling mode {} out of range, clamped to {}",
                index,
                Self::ALL[clamped as usize]
            );
        }
        Self::ALL[clamped as usize]
    }

    /// Parse a mode name (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "stride" => Some(SamplingMode::Stride),
            "jittered" => Some(SamplingMode::Jittered),
            "reservoir" => Some(SamplingMode::Reservoir),
            "stratified" => Some(SamplingMode::Stratified),
            _ => None,
        }
    }
}

/// A mode as written in configuration files: a name or an integer code.
#[derive(Deserialize)]
#[serde(untagged)]
enum ModeRepr {
    Index(i64),
    Name(String),
}

impl TryFrom<ModeRepr> for SamplingMode {
    type Error = String;

    fn try_from(repr: ModeRepr) -> std::result::Result<Self, Self::Error> {
        match repr {
            ModeRepr::Index(index) => Ok(SamplingMode::from_index(index)),
            ModeRepr::Name(name) => {
                SamplingMode::from_name(&name).ok_or_else(|| format!("unknown sampling mode '{}'", name))
            }
        }
    }
}

impl fmt::Display for SamplingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SamplingMode::Stride => write!(f, "stride"),
            SamplingMode::Jittered => write!(f, "jittered"),
            SamplingMode::Reservoir => write!(f, "reservoir"),
            SamplingMode::Stratified => write!(f, "stratified"),
        }
    }
}

/// Storage precision of output positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Precision {
    /// Inherit the precision of the input positions
    #[default]
    Default,
    /// 32-bit floats
    Single,
    /// 64-bit floats
    Double,
}

/// Point positions in single or double precision, shape `N x 3`.
#[derive(Debug, Clone, PartialEq)]
pub enum Positions {
    /// 32-bit coordinates
    Single(Array2<f32>),
    /// 64-bit coordinates
    Double(Array2<f64>),
}

impl Positions {
    /// Build double precision positions from coordinate triples.
    pub fn from_points(points: &[[f64; 3]]) -> Self {
        Positions::Double(Array2::from_shape_fn(
            (points.len(), SPATIAL_DIMENSIONS),
            |(i, j)| points[i][j],
        ))
    }

    /// Build single precision positions from coordinate triples.
    pub fn from_points_f32(points: &[[f32; 3]]) -> Self {
        Positions::Single(Array2::from_shape_fn(
            (points.len(), SPATIAL_DIMENSIONS),
            |(i, j)| points[i][j],
        ))
    }

    /// Zero-filled positions of the given precision.
    pub fn zeros(n: usize, precision: Precision) -> Self {
        match precision {
            Precision::Single => Positions::Single(Array2::zeros((n, SPATIAL_DIMENSIONS))),
            Precision::Default | Precision::Double => {
                Positions::Double(Array2::zeros((n, SPATIAL_DIMENSIONS)))
            }
        }
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        match self {
            Positions::Single(a) => a.nrows(),
            Positions::Double(a) => a.nrows(),
        }
    }

    /// Whether there are no points.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of columns; a well-formed point set has exactly three.
    pub fn dimensions(&self) -> usize {
        match self {
            Positions::Single(a) => a.ncols(),
            Positions::Double(a) => a.ncols(),
        }
    }

    /// Precision of the stored coordinates.
    pub fn precision(&self) -> Precision {
        match self {
            Positions::Single(_) => Precision::Single,
            Positions::Double(_) => Precision::Double,
        }
    }

    /// Coordinate of point `index` along `axis`, widened to f64.
    #[inline]
    pub fn coordinate(&self, index: PointIndex, axis: usize) -> f64 {
        match self {
            Positions::Single(a) => f64::from(a[[index, axis]]),
            Positions::Double(a) => a[[index, axis]],
        }
    }

    /// Full position of point `index`, widened to f64.
    pub fn point(&self, index: PointIndex) -> [f64; 3] {
        [
            self.coordinate(index, 0),
            self.coordinate(index, 1),
            self.coordinate(index, 2),
        ]
    }

    /// Keep only the first `n` points.
    pub fn truncate(&mut self, n: usize) {
        if n >= self.len() {
            return;
        }
        match self {
            Positions::Single(a) => *a = a.slice(s![..n, ..]).to_owned(),
            Positions::Double(a) => *a = a.slice(s![..n, ..]).to_owned(),
        }
    }
}

/// Typed storage of one attribute: `N x components`.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeData {
    /// Unsigned bytes (labels, colors)
    U8(Array2<u8>),
    /// 32-bit signed integers
    I32(Array2<i32>),
    /// 64-bit signed integers (ids)
    I64(Array2<i64>),
    /// 32-bit unsigned integers
    U32(Array2<u32>),
    /// 32-bit floats
    F32(Array2<f32>),
    /// 64-bit floats
    F64(Array2<f64>),
}

/// Apply the same expression to whichever typed matrix an [`AttributeData`] holds.
macro_rules! with_matrix {
    ($data:expr, $m:ident => $body:expr) => {
        match $data {
            AttributeData::U8($m) => $body,
            AttributeData::I32($m) => $body,
            AttributeData::I64($m) => $body,
            AttributeData::U32($m) => $body,
            AttributeData::F32($m) => $body,
            AttributeData::F64($m) => $body,
        }
    };
}

impl AttributeData {
    /// Number of tuples.
    pub fn len(&self) -> usize {
        with_matrix!(self, m => m.nrows())
    }

    /// Whether there are no tuples.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of components per tuple.
    pub fn components(&self) -> usize {
        with_matrix!(self, m => m.ncols())
    }

    /// Short name of the element type.
    pub fn type_name(&self) -> &'static str {
        match self {
            AttributeData::U8(_) => "u8",
            AttributeData::I32(_) => "i32",
            AttributeData::I64(_) => "i64",
            AttributeData::U32(_) => "u32",
            AttributeData::F32(_) => "f32",
            AttributeData::F64(_) => "f64",
        }
    }

    /// Zero-filled storage with the same element type and component count.
    pub fn zeros_like(&self, n: usize) -> Self {
        let components = self.components();
        match self {
            AttributeData::U8(_) => AttributeData::U8(Array2::zeros((n, components))),
            AttributeData::I32(_) => AttributeData::I32(Array2::zeros((n, components))),
            AttributeData::I64(_) => AttributeData::I64(Array2::zeros((n, components))),
            AttributeData::U32(_) => AttributeData::U32(Array2::zeros((n, components))),
            AttributeData::F32(_) => AttributeData::F32(Array2::zeros((n, components))),
            AttributeData::F64(_) => AttributeData::F64(Array2::zeros((n, components))),
        }
    }

    /// Copy tuple `src_index` of `source` into tuple `dst_index` of `self`.
    ///
    /// Both sides must hold the same element type; mismatched storage is
    /// left untouched and reported.
    pub fn copy_tuple(
        &mut self,
        dst_index: PointIndex,
        source: &AttributeData,
        src_index: PointIndex,
    ) -> Result<()> {
        match (self, source) {
            (AttributeData::U8(d), AttributeData::U8(s)) => d.row_mut(dst_index).assign(&s.row(src_index)),
            (AttributeData::I32(d), AttributeData::I32(s)) => d.row_mut(dst_index).assign(&s.row(src_index)),
            (AttributeData::I64(d), AttributeData::I64(s)) => d.row_mut(dst_index).assign(&s.row(src_index)),
            (AttributeData::U32(d), AttributeData::U32(s)) => d.row_mut(dst_index).assign(&s.row(src_index)),
            (AttributeData::F32(d), AttributeData::F32(s)) => d.row_mut(dst_index).assign(&s.row(src_index)),
            (AttributeData::F64(d), AttributeData::F64(s)) => d.row_mut(dst_index).assign(&s.row(src_index)),
            (d, s) => {
                return Err(MaskPointsError::dimension_mismatch(
                    s.type_name(),
                    d.type_name(),
                ))
            }
        }
        Ok(())
    }

    /// Keep only the first `n` tuples.
    pub fn truncate(&mut self, n: usize) {
        if n >= self.len() {
            return;
        }
        with_matrix!(self, m => *m = m.slice(s![..n, ..]).to_owned())
    }
}

/// A named attribute array.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeArray {
    /// Attribute name, unique within a [`PointData`]
    pub name: String,
    /// Tuple storage
    pub data: AttributeData,
}

impl AttributeArray {
    /// Create a named attribute.
    pub fn new<S: Into<String>>(name: S, data: AttributeData) -> Self {
        AttributeArray {
            name: name.into(),
            data,
        }
    }

    /// Number of tuples.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether there are no tuples.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Number of components per tuple.
    pub fn components(&self) -> usize {
        self.data.components()
    }
}

/// The attribute arrays attached to a point set.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PointData {
    arrays: Vec<AttributeArray>,
}

impl PointData {
    /// Empty attribute collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an attribute, replacing any existing array of the same name.
    pub fn add_array(&mut self, array: AttributeArray) {
        match self.arrays.iter_mut().find(|a| a.name == array.name) {
            Some(existing) => *existing = array,
            None => self.arrays.push(array),
        }
    }

    /// Look up an attribute by name.
    pub fn get(&self, name: &str) -> Option<&AttributeArray> {
        self.arrays.iter().find(|a| a.name == name)
    }

    /// Iterate over attributes in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &AttributeArray> {
        self.arrays.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut AttributeArray> {
        self.arrays.iter_mut()
    }

    /// Number of attribute arrays.
    pub fn num_arrays(&self) -> usize {
        self.arrays.len()
    }
}

/// An ordered set of points with index-aligned attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct PointSet {
    positions: Positions,
    point_data: PointData,
}

impl PointSet {
    /// Create a point set, checking that positions are three dimensional
    /// and that every attribute has one tuple per point.
    pub fn new(positions: Positions, point_data: PointData) -> Result<Self> {
        if positions.dimensions() != SPATIAL_DIMENSIONS {
            return Err(MaskPointsError::dimension_mismatch(
                format!("{} position components", SPATIAL_DIMENSIONS),
                format!("{} position components", positions.dimensions()),
            ));
        }
        let n = positions.len();
        for array in point_data.iter() {
            if array.len() != n {
                return Err(MaskPointsError::dimension_mismatch(
                    format!("{} tuples in attribute '{}'", n, array.name),
                    array.len().to_string(),
                ));
            }
        }
        Ok(PointSet {
            positions,
            point_data,
        })
    }

    /// Point set without attributes.
    pub fn from_positions(positions: Positions) -> Result<Self> {
        Self::new(positions, PointData::new())
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Whether the set has no points.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Point positions.
    pub fn positions(&self) -> &Positions {
        &self.positions
    }

    /// Attribute arrays.
    pub fn point_data(&self) -> &PointData {
        &self.point_data
    }

    pub(crate) fn into_parts(self) -> (Positions, PointData) {
        (self.positions, self.point_data)
    }
}

/// Half-open index range `[start, end)` into a working permutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Partition {
    /// First index in the range
    pub start: usize,
    /// One past the last index
    pub end: usize,
}

impl Partition {
    /// Create a range; `start` must not exceed `end`.
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end);
        Partition { start, end }
    }

    /// Number of indices covered.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Whether the range is empty.
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Split into `[start, mid)` and `[mid, end)`.
    pub fn split_at(&self, mid: usize) -> (Partition, Partition) {
        debug_assert!(self.start <= mid && mid <= self.end);
        (
            Partition::new(self.start, mid),
            Partition::new(mid, self.end),
        )
    }
}

/// Outcome of one selector run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SampleResult {
    /// Explicit source indices, in selection order
    Indices(Vec<PointIndex>),
    /// The first `len` entries of a permutation of the source indices
    Prefix {
        /// Permuted source indices
        permutation: Vec<PointIndex>,
        /// Number of selected entries at the front of the permutation
        len: usize,
    },
}

impl SampleResult {
    /// Empty selection.
    pub fn empty() -> Self {
        SampleResult::Indices(Vec::new())
    }

    /// Number of selected points.
    pub fn len(&self) -> usize {
        match self {
            SampleResult::Indices(ids) => ids.len(),
            SampleResult::Prefix { len, .. } => *len,
        }
    }

    /// Whether nothing was selected.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Selected source indices, in output order.
    pub fn source_indices(&self) -> &[PointIndex] {
        match self {
            SampleResult::Indices(ids) => ids,
            SampleResult::Prefix { permutation, len } => &permutation[..*len],
        }
    }
}

/// Vertex topology built over the output points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Vertices {
    /// One cell referencing every output point
    PolyVertex(Vec<PointIndex>),
    /// One single-point cell per output point
    PerPoint(Vec<PointIndex>),
}

impl Vertices {
    /// Number of cells.
    pub fn num_cells(&self) -> usize {
        match self {
            Vertices::PolyVertex(ids) if ids.is_empty() => 0,
            Vertices::PolyVertex(_) => 1,
            Vertices::PerPoint(ids) => ids.len(),
        }
    }

    /// Cells as slices of output point ids.
    pub fn cells(&self) -> Vec<&[PointIndex]> {
        match self {
            Vertices::PolyVertex(ids) if ids.is_empty() => Vec::new(),
            Vertices::PolyVertex(ids) => vec![ids.as_slice()],
            Vertices::PerPoint(ids) => ids.chunks(1).collect(),
        }
    }
}
