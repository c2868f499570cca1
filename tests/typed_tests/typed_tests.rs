//! Tests for the typed boundary
//!
//! These tests verify:
//! - Values survive a write/read round trip through bincode
//! - Set-returning reads deduplicate
//! - Typed intersection matches the raw engine
//! - Undecodable records surface as codec errors naming the file

use std::collections::HashSet;
use std::path::PathBuf;

use fpset::typed::{
    intersect_values, read_value_set, read_value_set_with, read_values, read_values_with,
    write_values,
};
use fpset::{write_set, Config, FpsetError};
use serde::{Deserialize, Serialize};
use tempfile::TempDir;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
struct Point {
    x: i32,
    y: i32,
}

fn temp_path(dir: &TempDir, name: &str) -> PathBuf {
    dir.path().join(name)
}

#[test]
fn test_values_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = temp_path(&dir, "values.fps");
    let values = vec![3i64, -1, 3, 42];

    assert_eq!(write_values(&values, &path).unwrap(), 4);
    assert_eq!(read_values::<i64, _>(&path).unwrap(), values);
}

#[test]
fn test_read_value_set_deduplicates() {
    let dir = TempDir::new().unwrap();
    let path = temp_path(&dir, "range.fps");
    let values: Vec<u32> = (1..=5).chain(1..=5).collect();
    write_values(&values, &path).unwrap();

    let set: HashSet<u32> = read_value_set(&path).unwrap();

    assert_eq!(set, (1..=5).collect());
}

#[test]
fn test_intersect_values() {
    let dir = TempDir::new().unwrap();
    let a = temp_path(&dir, "a.fps");
    let b = temp_path(&dir, "b.fps");
    write_values(&(1..=5).collect::<Vec<u32>>(), &a).unwrap();
    write_values(&(3..=6).collect::<Vec<u32>>(), &b).unwrap();

    let common: Vec<u32> = intersect_values(&[&a, &b]).unwrap();

    assert_eq!(common, vec![3, 4, 5]);
}

#[test]
fn test_intersect_structs() {
    let dir = TempDir::new().unwrap();
    let a = temp_path(&dir, "a.fps");
    let b = temp_path(&dir, "b.fps");
    let p = |x, y| Point { x, y };
    write_values(&[p(0, 0), p(1, 2), p(3, 4)], &a).unwrap();
    write_values(&[p(3, 4), p(9, 9), p(0, 0)], &b).unwrap();

    let common: Vec<Point> = intersect_values(&[&a, &b]).unwrap();

    assert_eq!(common, vec![p(0, 0), p(3, 4)]);
}

#[test]
fn test_intersect_strings() {
    let dir = TempDir::new().unwrap();
    let a = temp_path(&dir, "a.fps");
    let b = temp_path(&dir, "b.fps");
    write_values(&["one".to_string(), "two".to_string()], &a).unwrap();
    write_values(&["two".to_string(), "three".to_string()], &b).unwrap();

    let common: Vec<String> = intersect_values(&[&a, &b]).unwrap();

    assert_eq!(common, vec!["two".to_string()]);
}

#[test]
fn test_undecodable_record_is_codec_error() {
    let dir = TempDir::new().unwrap();
    let path = temp_path(&dir, "raw.fps");
    write_set([b"x"], &path).unwrap();

    let err = read_values::<u64, _>(&path).unwrap_err();

    assert!(matches!(err, FpsetError::Codec { .. }));
    assert_eq!(err.paths(), vec![path.as_path()]);
}

#[test]
fn test_missing_file_propagates() {
    let dir = TempDir::new().unwrap();
    let a = temp_path(&dir, "a.fps");
    write_values(&[1u8], &a).unwrap();
    let missing = temp_path(&dir, "missing.fps");

    let err = intersect_values::<u8, _>(&[&a, &missing]).unwrap_err();

    assert!(matches!(err, FpsetError::NotFound { .. }));
}

#[test]
fn test_reads_with_explicit_config() {
    let dir = TempDir::new().unwrap();
    let path = temp_path(&dir, "points.fps");
    let points = vec![
        Point { x: 1, y: 2 },
        Point { x: 3, y: 4 },
        Point { x: 1, y: 2 },
    ];
    write_values(&points, &path).unwrap();

    let config = Config::builder()
        .verify_fingerprints(false)
        .read_buffer_size(16)
        .build();

    assert_eq!(read_values_with::<Point, _>(&path, &config).unwrap(), points);
    let set: HashSet<Point> = read_value_set_with(&path, &config).unwrap();
    assert_eq!(set.len(), 2);
    assert!(set.contains(&Point { x: 3, y: 4 }));
}
