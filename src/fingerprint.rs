//! Record fingerprints
//!
//! A fingerprint is a 64-bit FNV-1a hash of a record's bytes. It is used to
//! prune obviously-unequal records before a full byte comparison, never as a
//! substitute for one.
//!
//! The hash has a fixed basis (no per-process seeding) so fingerprints stored
//! by one writer stay comparable with those computed anywhere else. The
//! algorithm id is stored in every file header; bump it whenever the hash
//! changes.

use std::hash::{BuildHasherDefault, Hasher};

/// 64-bit record fingerprint
pub type Fingerprint = u64;

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Fingerprint algorithms known to this build (stored as u16 in the header)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum FingerprintAlgorithm {
    /// 64-bit FNV-1a over the raw payload
    Fnv1a64 = 1,
}

impl FingerprintAlgorithm {
    /// Algorithm used by writers in this build
    pub const CURRENT: FingerprintAlgorithm = FingerprintAlgorithm::Fnv1a64;

    pub fn id(self) -> u16 {
        self as u16
    }

    pub fn from_id(id: u16) -> Option<Self> {
        match id {
            1 => Some(FingerprintAlgorithm::Fnv1a64),
            _ => None,
        }
    }

    /// Fingerprint `bytes` with this algorithm
    pub fn hash(self, bytes: &[u8]) -> Fingerprint {
        match self {
            FingerprintAlgorithm::Fnv1a64 => fnv1a_64(bytes),
        }
    }
}

/// Fingerprint a record with the current algorithm
#[inline]
pub fn fingerprint(bytes: &[u8]) -> Fingerprint {
    FingerprintAlgorithm::CURRENT.hash(bytes)
}

fn fnv1a_64(data: &[u8]) -> u64 {
    let mut hash = FNV_OFFSET_BASIS;
    for &byte in data {
        hash ^= byte as u64;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

// =============================================================================
// Pass-through hasher for fingerprint-keyed maps
// =============================================================================

/// Hasher for maps keyed by [`Fingerprint`]: the key is already a hash,
/// so it is used as-is.
#[derive(Default)]
pub struct FingerprintHasher(u64);

impl Hasher for FingerprintHasher {
    fn finish(&self) -> u64 {
        self.0
    }

    fn write(&mut self, bytes: &[u8]) {
        // only reached for non-u64 keys
        for &byte in bytes {
            self.0 = (self.0 ^ byte as u64).wrapping_mul(FNV_PRIME);
        }
    }

    fn write_u64(&mut self, n: u64) {
        self.0 = n;
    }
}

/// `BuildHasher` for `HashMap<Fingerprint, _, BuildFingerprintHasher>`
pub type BuildFingerprintHasher = BuildHasherDefault<FingerprintHasher>;
