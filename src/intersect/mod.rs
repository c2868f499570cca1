//! Intersection Module
//!
//! Multi-way intersection over set files.
//!
//! ## Algorithm
//! 1. Stream the first (pivot) file into a [`CandidateIndex`], keeping one
//!    candidate per distinct record in first-occurrence order.
//! 2. For every further file, mark the candidates it contains and discard
//!    the rest once the file is exhausted.
//! 3. Emit the survivors in pivot order.
//!
//! Time is linear in the total number of records; memory is bounded by the
//! pivot's distinct records, not by the sum of all inputs.

mod engine;
mod index;

pub use engine::{intersect_sets, intersect_sets_with, read_unique_set, read_unique_set_with};
pub use index::CandidateIndex;
