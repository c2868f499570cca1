//! Multi-way Intersection Engine
//!
//! Intersects N set files while holding only the pivot (first) file's
//! unique records in memory.

use std::path::Path;

use crate::config::Config;
use crate::error::{FpsetError, Result};
use crate::setfile::{Record, SetReader};

use super::CandidateIndex;

/// Intersection of the set files at `paths` using the default config
pub fn intersect_sets<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<Record>> {
    intersect_sets_with(paths, &Config::default())
}

/// Records present in every file at `paths`, deduplicated, in order of
/// first occurrence in `paths[0]`.
///
/// Every path is opened and header-checked before any scanning starts, so
/// a bad input list fails fast and reports all unusable paths together.
pub fn intersect_sets_with<P: AsRef<Path>>(paths: &[P], config: &Config) -> Result<Vec<Record>> {
    if paths.is_empty() {
        return Err(FpsetError::EmptyInput);
    }

    let mut readers = open_all(paths, config)?;
    let mut rest = readers.split_off(1);
    let pivot = readers.pop().ok_or(FpsetError::EmptyInput)?;

    let mut index = build_index(pivot)?;
    let unique = index.len();

    if config.parallel_scan && rest.len() > 1 {
        scan_parallel(&mut index, &mut rest, config.scan_threads)?;
    } else {
        for reader in &mut rest {
            scan_and_prune(&mut index, reader)?;
        }
    }

    tracing::info!(
        "Intersected {} set files: {} unique pivot records, {} in common",
        paths.len(),
        unique,
        index.live_count()
    );

    Ok(index.into_records())
}

/// Deduplicated contents of one set file, in first-occurrence order
pub fn read_unique_set<P: AsRef<Path>>(path: P) -> Result<Vec<Record>> {
    read_unique_set_with(path, &Config::default())
}

pub fn read_unique_set_with<P: AsRef<Path>>(path: P, config: &Config) -> Result<Vec<Record>> {
    intersect_sets_with(&[path], config)
}

// =============================================================================
// Steps
// =============================================================================

/// Open every input, collecting all failures rather than stopping at the first
fn open_all<P: AsRef<Path>>(paths: &[P], config: &Config) -> Result<Vec<SetReader>> {
    let mut readers = Vec::with_capacity(paths.len());
    let mut failures = Vec::new();

    for path in paths {
        match SetReader::open(path.as_ref(), config) {
            Ok(reader) => readers.push(reader),
            Err(e) => failures.push(e),
        }
    }

    if failures.is_empty() {
        Ok(readers)
    } else {
        Err(FpsetError::from_failures(failures))
    }
}

/// Step 1: stream the pivot file into a fresh index, deduplicating as we go
fn build_index(mut pivot: SetReader) -> Result<CandidateIndex> {
    let mut index = CandidateIndex::new();
    let mut buf = Vec::new();
    let mut position = 0u64;

    while let Some(fp) = pivot.read_next_into(&mut buf)? {
        index.insert(fp, &buf, position);
        position += 1;
    }

    tracing::debug!(
        "Pivot {}: {} records, {} unique",
        pivot.path().display(),
        position,
        index.len()
    );
    Ok(index)
}

/// Step 2: mark candidates seen in `reader`, then drop the rest
fn scan_and_prune(index: &mut CandidateIndex, reader: &mut SetReader) -> Result<()> {
    index.reset_seen();

    let mut buf = Vec::new();
    while let Some(fp) = reader.read_next_into(&mut buf)? {
        index.mark_seen(fp, &buf);
    }

    let removed = index.prune_unseen();
    tracing::debug!(
        "Scanned {}: eliminated {}, {} remaining",
        reader.path().display(),
        removed,
        index.live_count()
    );
    Ok(())
}

/// Seen-mask of `reader` against a read-only index
fn scan_mask(index: &CandidateIndex, reader: &mut SetReader) -> Result<Vec<bool>> {
    let mut seen = vec![false; index.len()];

    let mut buf = Vec::new();
    while let Some(fp) = reader.read_next_into(&mut buf)? {
        if let Some(id) = index.lookup(fp, &buf) {
            seen[id] = true;
        }
    }
    Ok(seen)
}

/// Step 2, parallel: scan files on scoped threads one batch at a time,
/// applying each batch's masks in argument order before starting the next.
/// Membership and order match the sequential scan, and at most `threads`
/// masks are alive at once.
fn scan_parallel(
    index: &mut CandidateIndex,
    readers: &mut [SetReader],
    threads: usize,
) -> Result<()> {
    for batch in readers.chunks_mut(threads.max(1)) {
        let shared: &CandidateIndex = index;
        let results = crossbeam::thread::scope(|s| {
            let handles: Vec<_> = batch
                .iter_mut()
                .map(|reader| s.spawn(move |_| scan_mask(shared, reader)))
                .collect();

            handles
                .into_iter()
                .map(|h| h.join().unwrap_or_else(|p| std::panic::resume_unwind(p)))
                .collect::<Vec<_>>()
        })
        .unwrap_or_else(|p| std::panic::resume_unwind(p));

        let mut masks = Vec::with_capacity(results.len());
        let mut failures = Vec::new();
        for result in results {
            match result {
                Ok(mask) => masks.push(mask),
                Err(e) => failures.push(e),
            }
        }
        if !failures.is_empty() {
            return Err(FpsetError::from_failures(failures));
        }

        for (mask, reader) in masks.into_iter().zip(batch.iter()) {
            let removed = index.retain_seen(&mask);
            tracing::debug!(
                "Scanned {} (parallel): eliminated {}, {} remaining",
                reader.path().display(),
                removed,
                index.live_count()
            );
        }
    }
    Ok(())
}
