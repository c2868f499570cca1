//! Candidate Index
//!
//! Tracks the pivot file's not-yet-eliminated records during one
//! intersection call. Candidates are stored in first-occurrence order;
//! fingerprint buckets point into that list.

use std::collections::HashMap;

use crate::fingerprint::{BuildFingerprintHasher, Fingerprint};
use crate::setfile::Record;

/// One unique pivot-file record
#[derive(Debug)]
struct Candidate {
    /// Position of the first occurrence in the pivot file
    position: u64,
    payload: Record,
    live: bool,
    /// Seen in the file currently being scanned
    seen: bool,
}

/// Transient fingerprint → candidate map owned by a single intersection call
///
/// Records with equal fingerprints but different bytes are distinct
/// candidates in the same bucket; every lookup compares full payloads.
#[derive(Debug, Default)]
pub struct CandidateIndex {
    candidates: Vec<Candidate>,
    /// fingerprint → ids into `candidates`, live candidates only
    buckets: HashMap<Fingerprint, Vec<usize>, BuildFingerprintHasher>,
    live: usize,
}

impl CandidateIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a pivot record unless a byte-equal one is already present.
    ///
    /// Returns `true` if the record became a new candidate.
    pub fn insert(&mut self, fingerprint: Fingerprint, payload: &[u8], position: u64) -> bool {
        if self.lookup(fingerprint, payload).is_some() {
            return false;
        }

        let id = self.candidates.len();
        self.candidates.push(Candidate {
            position,
            payload: payload.to_vec(),
            live: true,
            seen: false,
        });
        self.buckets.entry(fingerprint).or_default().push(id);
        self.live += 1;
        true
    }

    /// Id of the live candidate byte-equal to `payload`, if any
    pub fn lookup(&self, fingerprint: Fingerprint, payload: &[u8]) -> Option<usize> {
        self.buckets
            .get(&fingerprint)?
            .iter()
            .copied()
            .find(|&id| self.candidates[id].payload == payload)
    }

    /// Mark the candidate equal to `payload` as seen in the current file.
    ///
    /// A fingerprint match with different bytes is not a hit.
    pub fn mark_seen(&mut self, fingerprint: Fingerprint, payload: &[u8]) -> bool {
        match self.lookup(fingerprint, payload) {
            Some(id) => {
                self.candidates[id].seen = true;
                true
            }
            None => false,
        }
    }

    /// Clear every seen flag before scanning the next file
    pub fn reset_seen(&mut self) {
        for candidate in &mut self.candidates {
            candidate.seen = false;
        }
    }

    /// Drop every live candidate not seen since the last `reset_seen()`.
    ///
    /// Returns the number of candidates eliminated.
    pub fn prune_unseen(&mut self) -> usize {
        let mut removed = 0;
        for candidate in &mut self.candidates {
            if candidate.live && !candidate.seen {
                kill(candidate);
                removed += 1;
            }
        }
        self.finish_prune(removed)
    }

    /// Drop every live candidate whose id is `false` in `seen`.
    ///
    /// `seen` is a per-candidate mask produced by scanning one file
    /// against this index; ids beyond its length count as unseen.
    pub fn retain_seen(&mut self, seen: &[bool]) -> usize {
        let mut removed = 0;
        for (id, candidate) in self.candidates.iter_mut().enumerate() {
            if candidate.live && !seen.get(id).copied().unwrap_or(false) {
                kill(candidate);
                removed += 1;
            }
        }
        self.finish_prune(removed)
    }

    /// Total candidates ever inserted (unique pivot records)
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Candidates still in the running
    pub fn live_count(&self) -> usize {
        self.live
    }

    /// Live candidates as (first-occurrence position, payload), in order
    pub fn iter_live(&self) -> impl Iterator<Item = (u64, &[u8])> + '_ {
        self.candidates
            .iter()
            .filter(|c| c.live)
            .map(|c| (c.position, c.payload.as_slice()))
    }

    /// Consume the index, yielding surviving payloads in first-occurrence order
    pub fn into_records(self) -> Vec<Record> {
        self.candidates
            .into_iter()
            .filter(|c| c.live)
            .map(|c| c.payload)
            .collect()
    }

    fn finish_prune(&mut self, removed: usize) -> usize {
        if removed > 0 {
            let candidates = &self.candidates;
            self.buckets.retain(|_, ids| {
                ids.retain(|&id| candidates[id].live);
                !ids.is_empty()
            });
            self.live -= removed;
        }
        removed
    }
}

fn kill(candidate: &mut Candidate) {
    candidate.live = false;
    // release the payload now; the slot keeps ids stable
    candidate.payload = Vec::new();
}
