use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

use crate::index::combined::CombinedReference;
use crate::index::IndexError;

/// Exact k-mer lookup table over a combined reference buffer.
///
/// Every k-length substring of the buffer, padding included, maps to the
/// ascending list of offsets where it starts. The table is only ever filled by
/// [`KmerIndex::build`]; afterwards it is read-only and can be shared freely
/// between threads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KmerIndex {
    k: usize,
    table: HashMap<Vec<u8>, Vec<usize>>,
}

/// Occupancy numbers for reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct KmerStats {
    pub hash_length: usize,
    pub distinct_kmers: usize,
    pub total_positions: usize,
    pub max_occurrences: usize,
}

impl KmerIndex {
    /// Index every k-mer of `combined`.
    ///
    /// # Errors
    ///
    /// Returns `IndexError::InvalidHashLength` unless
    /// `1 <= k <= combined.read_length()`. A longer k-mer could span a whole
    /// pad block and join two references.
    pub fn build(combined: &CombinedReference, k: usize) -> Result<Self, IndexError> {
        let read_length = combined.read_length();
        if k == 0 || k > read_length {
            return Err(IndexError::InvalidHashLength {
                hash_length: k,
                read_length,
            });
        }

        let buffer = combined.buffer();
        let mut table: HashMap<Vec<u8>, Vec<usize>> = HashMap::new();

        // windows() yields offsets in ascending order, so each list stays sorted
        for (offset, kmer) in buffer.windows(k).enumerate() {
            match table.get_mut(kmer) {
                Some(positions) => positions.push(offset),
                None => {
                    table.insert(kmer.to_vec(), vec![offset]);
                }
            }
        }

        debug!(
            hash_length = k,
            distinct_kmers = table.len(),
            "built k-mer index"
        );

        Ok(Self { k, table })
    }

    /// Length of the indexed k-mers
    #[must_use]
    pub fn hash_length(&self) -> usize {
        self.k
    }

    /// Ascending buffer offsets where `kmer` starts; empty if absent
    #[must_use]
    pub fn positions(&self, kmer: &[u8]) -> &[usize] {
        self.table.get(kmer).map_or(&[], Vec::as_slice)
    }

    /// Number of distinct k-mers
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    #[must_use]
    pub fn stats(&self) -> KmerStats {
        KmerStats {
            hash_length: self.k,
            distinct_kmers: self.table.len(),
            total_positions: self.table.values().map(Vec::len).sum(),
            max_occurrences: self.table.values().map(Vec::len).max().unwrap_or(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::reference::{Reference, ReferenceSet};

    fn combined(pairs: &[(&str, &str)], read_length: usize) -> CombinedReference {
        let set: ReferenceSet = pairs
            .iter()
            .map(|(name, seq)| Reference::new(*name, seq.as_bytes().to_vec()))
            .collect();
        CombinedReference::build(&set, read_length).unwrap()
    }

    #[test]
    fn test_positions() {
        let c = combined(&[("A", "ACGTACGT"), ("B", "TTTTGGGG")], 4);
        let index = KmerIndex::build(&c, 2).unwrap();

        assert_eq!(index.positions(b"AC"), &[0, 4]);
        assert_eq!(index.positions(b"GT"), &[2, 6]);
        assert_eq!(index.positions(b"TT"), &[12, 13, 14]);
        assert_eq!(index.positions(b"xx"), &[8, 9, 10, 20, 21, 22]);
        assert!(index.positions(b"ZZ").is_empty());
        assert!(index.positions(b"CA").is_empty());
    }

    #[test]
    fn test_every_offset_is_indexed() {
        let c = combined(&[("A", "ACGTNACGGT"), ("B", "TTAGGC"), ("C", "G")], 3);
        for k in 1..=3 {
            let index = KmerIndex::build(&c, k).unwrap();
            for (p, kmer) in c.buffer().windows(k).enumerate() {
                assert!(index.positions(kmer).contains(&p), "k={k} p={p}");
            }
            assert_eq!(index.stats().total_positions, c.len() - k + 1);
        }
    }

    #[test]
    fn test_position_lists_ascending() {
        let c = combined(&[("A", "AAAAAAAA"), ("B", "AAAA")], 2);
        let index = KmerIndex::build(&c, 2).unwrap();
        let positions = index.positions(b"AA");
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(positions.len(), 7 + 3);
    }

    #[test]
    fn test_rejects_hash_length_out_of_range() {
        let c = combined(&[("A", "ACGT")], 4);
        assert!(matches!(
            KmerIndex::build(&c, 0),
            Err(IndexError::InvalidHashLength { hash_length: 0, read_length: 4 })
        ));
        assert!(matches!(
            KmerIndex::build(&c, 5),
            Err(IndexError::InvalidHashLength { hash_length: 5, read_length: 4 })
        ));
        assert!(KmerIndex::build(&c, 4).is_ok());
    }

    #[test]
    fn test_rebuild_is_identical() {
        let c = combined(&[("A", "ACGTACGT"), ("B", "TTTTGGGG")], 4);
        let first = KmerIndex::build(&c, 3).unwrap();
        let second = KmerIndex::build(&c, 3).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_stats() {
        let c = combined(&[("A", "ACGTACGT"), ("B", "TTTTGGGG")], 4);
        let stats = KmerIndex::build(&c, 2).unwrap().stats();
        assert_eq!(stats.hash_length, 2);
        assert_eq!(stats.total_positions, 23);
        assert_eq!(stats.max_occurrences, 6); // "xx"
    }
}
