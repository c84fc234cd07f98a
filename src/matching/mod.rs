//! Seed-and-score alignment of reads against a [`ReferenceIndex`].
//!
//! - [`seed`]: k-mer seeding, scoring and candidate selection for one read
//! - [`trimming`]: cutting candidate windows back at reference boundaries
//! - [`pairing`]: combining two mate outcomes
//! - [`result`]: outcome records and per-sample summaries
//! - [`engine`]: the [`Aligner`] front end, sequential or on a worker pool
//!
//! ## Algorithm
//!
//! 1. **Seeding**: every k-mer of the read is looked up in the index; a hit at
//!    offset `p` for the k-mer at read offset `i` proposes a window at `p - i`.
//! 2. **Trimming**: each window is cut back to the reference it starts in, so
//!    sentinel bytes are never compared.
//! 3. **Scoring**: mismatches are counted over the remaining span (no gaps).
//! 4. **Selection**: the candidate with the fewest mismatches wins, then the
//!    one with fewer trimmed bases, then the smaller window start and seed
//!    offset. Other candidates equal on mismatches and trimmed bases mark the
//!    read `AMBIGUOUS`.
//!
//! ## Example
//!
//! ```rust
//! use amplicon_aligner::core::read::Read;
//! use amplicon_aligner::core::reference::{Reference, ReferenceSet};
//! use amplicon_aligner::index::build_reference_index;
//! use amplicon_aligner::matching::Aligner;
//!
//! let refs: ReferenceSet = vec![
//!     Reference::new("A", b"ACGTACGT".to_vec()),
//!     Reference::new("B", b"TTTTGGGG".to_vec()),
//! ]
//! .into_iter()
//! .collect();
//! let index = build_reference_index(&refs, 4, 2).unwrap();
//!
//! let aligner = Aligner::new(&index);
//! let result = aligner.align_read(&Read::new("r1", b"CGTA".to_vec())).unwrap();
//! let best = result.best.unwrap();
//! assert_eq!((best.ref_name.as_str(), best.ref_offset, best.mismatches), ("A", 1, 0));
//! ```
//!
//! [`ReferenceIndex`]: crate::index::ReferenceIndex

use thiserror::Error;

pub mod engine;
pub mod pairing;
pub mod result;
pub mod seed;
pub mod trimming;

pub use engine::{Aligner, PoolConfig, PoolError};
pub use result::{AlignmentCandidate, AlignmentResult, PairAlignment, ReadAlignment, SampleResult, SampleSummary};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AlignError {
    #[error("Read '{read_id}' has length {found}, expected {expected}")]
    ReadLengthMismatch {
        read_id: String,
        expected: usize,
        found: usize,
    },

    /// A trimmed window resolved outside every reference range
    #[error("Internal index error: buffer offset {offset} is not inside any reference")]
    InternalIndex { offset: usize },
}

impl AlignError {
    /// Whether the error must abort the whole sample
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::InternalIndex { .. })
    }
}
