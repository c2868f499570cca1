//! Tests for record fingerprints
//!
//! These tests verify:
//! - Known FNV-1a 64 test vectors (stability across builds/machines)
//! - Algorithm id round trip
//! - The pass-through hasher used by fingerprint-keyed maps

use std::collections::HashMap;
use std::hash::{BuildHasher, Hasher};

use fpset::fingerprint::{
    fingerprint, BuildFingerprintHasher, FingerprintAlgorithm, FingerprintHasher,
};

#[test]
fn test_known_vectors() {
    assert_eq!(fingerprint(b""), 0xcbf2_9ce4_8422_2325);
    assert_eq!(fingerprint(b"a"), 0xaf63_dc4c_8601_ec8c);
    assert_eq!(fingerprint(b"foobar"), 0x8594_4171_f739_67e8);
}

#[test]
fn test_deterministic() {
    let payload = b"the same bytes every time".to_vec();
    assert_eq!(fingerprint(&payload), fingerprint(&payload.clone()));
}

#[test]
fn test_distinguishes_similar_payloads() {
    assert_ne!(fingerprint(b"one"), fingerprint(b"one\0"));
    assert_ne!(fingerprint(b"ab"), fingerprint(b"ba"));
}

#[test]
fn test_algorithm_ids() {
    assert_eq!(FingerprintAlgorithm::CURRENT.id(), 1);
    assert_eq!(
        FingerprintAlgorithm::from_id(1),
        Some(FingerprintAlgorithm::Fnv1a64)
    );
    assert_eq!(FingerprintAlgorithm::from_id(0), None);
    assert_eq!(FingerprintAlgorithm::from_id(2), None);
    assert_eq!(
        FingerprintAlgorithm::Fnv1a64.hash(b"foobar"),
        fingerprint(b"foobar")
    );
}

#[test]
fn test_hasher_passes_u64_through() {
    let mut hasher = FingerprintHasher::default();
    hasher.write_u64(0xdead_beef);
    assert_eq!(hasher.finish(), 0xdead_beef);

    let build = BuildFingerprintHasher::default();
    assert_eq!(build.hash_one(42u64), 42);
}

#[test]
fn test_fingerprint_keyed_map() {
    let mut map: HashMap<u64, &str, BuildFingerprintHasher> = HashMap::default();
    map.insert(fingerprint(b"x"), "x");
    map.insert(fingerprint(b"y"), "y");
    assert_eq!(map.get(&fingerprint(b"x")), Some(&"x"));
    assert_eq!(map.get(&fingerprint(b"z")), None);
}
