//! Common fixtures for mask-points integration tests.

#![allow(dead_code)]

use mask_points::*;
use ndarray::Array2;
use rand::prelude::*;

/// Uniform points in `[-5, 5)^3` carrying one attribute of every storage type.
///
/// Every attribute of point `i` encodes `i`, so an output tuple can be
/// traced back to its source point.
pub fn create_point_cloud(n: usize, seed: u64) -> PointSet {
    let mut rng = StdRng::seed_from_u64(seed);
    let coordinates: Vec<[f64; 3]> = (0..n)
        .map(|_| {
            [
                rng.gen_range(-5.0..5.0),
                rng.gen_range(-5.0..5.0),
                rng.gen_range(-5.0..5.0),
            ]
        })
        .collect();

    let mut data = PointData::new();
    data.add_array(AttributeArray::new(
        "source_id",
        AttributeData::I64(Array2::from_shape_fn((n, 1), |(i, _)| i as i64)),
    ));
    data.add_array(AttributeArray::new(
        "label",
        AttributeData::U8(Array2::from_shape_fn((n, 1), |(i, _)| (i % 251) as u8)),
    ));
    data.add_array(AttributeArray::new(
        "tag",
        AttributeData::U32(Array2::from_shape_fn((n, 2), |(i, c)| (i * 2 + c) as u32)),
    ));
    data.add_array(AttributeArray::new(
        "offset",
        AttributeData::I32(Array2::from_shape_fn((n, 1), |(i, _)| -(i as i32))),
    ));
    data.add_array(AttributeArray::new(
        "normal",
        AttributeData::F32(Array2::from_shape_fn((n, 3), |(i, c)| {
            coordinates[i][c] as f32 * 0.5
        })),
    ));
    data.add_array(AttributeArray::new(
        "scalar",
        AttributeData::F64(Array2::from_shape_fn((n, 1), |(i, _)| {
            (i as f64).sqrt()
        })),
    ));

    PointSet::new(Positions::from_points(&coordinates), data).unwrap()
}

/// Points `(i, i, i)` for `i` in `0..n`, without attributes.
pub fn create_diagonal(n: usize) -> PointSet {
    let coordinates: Vec<[f64; 3]> = (0..n).map(|i| [i as f64; 3]).collect();
    PointSet::from_positions(Positions::from_points(&coordinates)).unwrap()
}

/// Source indices of an output set built from [`create_point_cloud`].
pub fn source_ids(points: &PointSet) -> Vec<usize> {
    match &points.point_data().get("source_id").unwrap().data {
        AttributeData::I64(ids) => ids.column(0).iter().map(|&i| i as usize).collect(),
        other => panic!("unexpected source_id storage: {}", other.type_name()),
    }
}

/// Assert every attribute tuple of `output` equals the input tuple it was copied from.
pub fn assert_attributes_match(input: &PointSet, output: &PointSet) {
    let ids = source_ids(output);
    for array in output.point_data().iter() {
        let source = input.point_data().get(&array.name).unwrap();
        assert_eq!(array.components(), source.components(), "{}", array.name);
        for (dst, &src) in ids.iter().enumerate() {
            let same = match (&array.data, &source.data) {
                (AttributeData::U8(d), AttributeData::U8(s)) => d.row(dst) == s.row(src),
                (AttributeData::I32(d), AttributeData::I32(s)) => d.row(dst) == s.row(src),
                (AttributeData::I64(d), AttributeData::I64(s)) => d.row(dst) == s.row(src),
                (AttributeData::U32(d), AttributeData::U32(s)) => d.row(dst) == s.row(src),
                (AttributeData::F32(d), AttributeData::F32(s)) => d.row(dst) == s.row(src),
                (AttributeData::F64(d), AttributeData::F64(s)) => d.row(dst) == s.row(src),
                _ => false,
            };
            assert!(same, "attribute '{}' differs at output {}", array.name, dst);
        }
    }
    for (dst, &src) in ids.iter().enumerate() {
        assert_eq!(output.positions().point(dst), input.positions().point(src));
    }
}

/// Initialize logging once for tests that want to see engine output.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
