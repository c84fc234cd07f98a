//! Reference indexing: the combined buffer and its k-mer table.
//!
//! Building an index is a single sequential pass:
//!
//! 1. [`CombinedReference::build`] concatenates the references, each followed by
//!    `read_length` sentinel bytes, and records where every reference and every
//!    pad block lives.
//! 2. [`KmerIndex::build`] maps every k-mer of that buffer to its offsets.
//!
//! The resulting [`ReferenceIndex`] is immutable. Alignment borrows it shared,
//! so any number of worker threads can look up seeds at once.
//!
//! ## Example
//!
//! ```rust
//! use amplicon_aligner::core::reference::{Reference, ReferenceSet};
//! use amplicon_aligner::index::build_reference_index;
//!
//! let refs: ReferenceSet = vec![
//!     Reference::new("A", b"ACGTACGT".to_vec()),
//!     Reference::new("B", b"TTTTGGGG".to_vec()),
//! ]
//! .into_iter()
//! .collect();
//!
//! let index = build_reference_index(&refs, 4, 2).unwrap();
//! assert_eq!(index.combined().buffer(), b"ACGTACGTxxxxTTTTGGGGxxxx");
//! assert_eq!(index.kmers().positions(b"AC"), &[0, 4]);
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::core::reference::ReferenceSet;

pub mod combined;
pub mod kmer;
pub mod store;

pub use combined::{CombinedReference, RefRange};
pub use kmer::{KmerIndex, KmerStats};

/// Default k-mer length for seeding
pub const DEFAULT_HASH_LENGTH: usize = 5;

/// Default read length (2x301 MiSeq amplicon runs)
pub const DEFAULT_READ_LENGTH: usize = 301;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IndexError {
    #[error("Invalid reference '{name}': {reason}")]
    InvalidReference { name: String, reason: String },

    #[error("Invalid hash length {hash_length}: must be between 1 and the read length ({read_length})")]
    InvalidHashLength {
        hash_length: usize,
        read_length: usize,
    },

    #[error("Invalid read length: must be greater than 0")]
    InvalidReadLength,

    #[error("No references to index")]
    EmptyReferenceSet,

    #[error("Duplicate reference name: {0}")]
    DuplicateReference(String),
}

/// Parameters fixed at index build time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Length every read of the sample must have; also the pad width
    pub read_length: usize,
    /// Seed k-mer length
    pub hash_length: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            read_length: DEFAULT_READ_LENGTH,
            hash_length: DEFAULT_HASH_LENGTH,
        }
    }
}

/// Combined reference plus its k-mer table, built once per sample run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceIndex {
    combined: CombinedReference,
    kmers: KmerIndex,
}

impl ReferenceIndex {
    /// Build both layers of the index.
    ///
    /// # Errors
    ///
    /// Returns any `IndexError` raised while concatenating the references or
    /// building the k-mer table. Nothing is aligned if this fails.
    pub fn build(references: &ReferenceSet, config: IndexConfig) -> Result<Self, IndexError> {
        // Validate k before paying for the concatenation
        if config.hash_length == 0 || config.hash_length > config.read_length {
            return Err(IndexError::InvalidHashLength {
                hash_length: config.hash_length,
                read_length: config.read_length,
            });
        }

        let combined = CombinedReference::build(references, config.read_length)?;
        let kmers = KmerIndex::build(&combined, config.hash_length)?;

        info!(
            references = combined.ranges().len(),
            buffer_len = combined.len(),
            distinct_kmers = kmers.len(),
            "reference index ready"
        );

        Ok(Self { combined, kmers })
    }

    #[must_use]
    pub fn combined(&self) -> &CombinedReference {
        &self.combined
    }

    #[must_use]
    pub fn kmers(&self) -> &KmerIndex {
        &self.kmers
    }

    #[must_use]
    pub fn read_length(&self) -> usize {
        self.combined.read_length()
    }

    #[must_use]
    pub fn hash_length(&self) -> usize {
        self.kmers.hash_length()
    }

    #[must_use]
    pub fn config(&self) -> IndexConfig {
        IndexConfig {
            read_length: self.read_length(),
            hash_length: self.hash_length(),
        }
    }
}

/// Build an index for `references` with the given read and hash lengths.
///
/// # Errors
///
/// See [`ReferenceIndex::build`].
pub fn build_reference_index(
    references: &ReferenceSet,
    read_length: usize,
    hash_length: usize,
) -> Result<ReferenceIndex, IndexError> {
    ReferenceIndex::build(
        references,
        IndexConfig {
            read_length,
            hash_length,
        },
    )
}
