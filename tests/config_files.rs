//! Loading and saving sampling configurations.

mod common;

use mask_points::*;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_json_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sampling.json");
    let config = ConfigBuilder::new()
        .mode(SamplingMode::Stratified)
        .max_count(5000)
        .precision(Precision::Single)
        .seed(31)
        .generate_vertices(true, true)
        .build();

    config.save_to_file(&path).unwrap();
    assert_eq!(SampleConfig::load_from_file(&path).unwrap(), config);
}

#[test]
fn test_toml_round_trip_unbounded() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sampling.toml");
    let config = ConfigBuilder::new().mode(SamplingMode::Jittered).stride(7).build();

    config.save_to_file(&path).unwrap();
    let loaded = SampleConfig::load_from_file(&path).unwrap();
    assert_eq!(loaded, config);
    assert!(loaded.is_unbounded());
}

#[test]
fn test_partial_file_uses_defaults_and_clamps() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("partial.toml");
    fs::write(&path, "stride = 0\nmode = \"reservoir\"\nmax_count = 12\n").unwrap();

    let config = SampleConfig::load_from_file(&path).unwrap();
    assert_eq!(config.stride, 1);
    assert_eq!(config.mode, SamplingMode::Reservoir);
    assert_eq!(config.max_count, 12);
    assert_eq!(config.offset, DEFAULT_OFFSET);
    assert!(!config.proportional_across_ranks);
}

#[test]
fn test_integer_mode_codes_clamp() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("codes.json");

    fs::write(&path, r#"{"mode": 2}"#).unwrap();
    assert_eq!(
        SampleConfig::load_from_file(&path).unwrap().mode,
        SamplingMode::Reservoir
    );

    fs::write(&path, r#"{"mode": -4}"#).unwrap();
    assert_eq!(
        SampleConfig::load_from_file(&path).unwrap().mode,
        SamplingMode::Stride
    );
}

#[test]
fn test_unknown_mode_name_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.json");
    fs::write(&path, r#"{"mode": "octree"}"#).unwrap();
    let err = SampleConfig::load_from_file(&path).unwrap_err();
    assert_eq!(err.category(), "json");
}

#[test]
fn test_unsupported_extension() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sampling.yaml");
    fs::write(&path, "stride: 3").unwrap();
    let err = SampleConfig::load_from_file(&path).unwrap_err();
    assert_eq!(err.category(), "config");
    assert!(ConfigBuilder::new().build().save_to_file(&path).is_err());
}

#[test]
fn test_missing_file() {
    let dir = TempDir::new().unwrap();
    let err = SampleConfig::load_from_file(dir.path().join("absent.toml")).unwrap_err();
    assert_eq!(err.category(), "config");
}

#[test]
fn test_loaded_config_drives_engine() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("engine.toml");
    fs::write(&path, "mode = \"reservoir\"\nmax_count = 25\nseed = 4\n").unwrap();

    let config = SampleConfig::load_from_file(&path).unwrap();
    let input = common::create_point_cloud(500, 2);
    let output = MaskPoints::new(config).execute(&input).unwrap();
    assert_eq!(output.points.len(), 25);
    common::assert_attributes_match(&input, &output.points);
}
