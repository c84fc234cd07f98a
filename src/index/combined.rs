use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::ops::Range;
use tracing::debug;

use crate::core::reference::ReferenceSet;
use crate::index::IndexError;
use crate::utils::validation::{display_byte, find_invalid_base, SENTINEL};

/// Location of one reference inside the combined buffer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefRange {
    pub name: String,

    /// First buffer position of the reference
    pub start: usize,

    /// One past the last buffer position of the reference
    pub end: usize,
}

impl RefRange {
    #[must_use]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    #[must_use]
    pub fn contains(&self, pos: usize) -> bool {
        self.start <= pos && pos < self.end
    }
}

/// All references concatenated into one buffer, each followed by a block of
/// `read_length` sentinel bytes.
///
/// ```text
/// ACGTACGT xxxx TTTTGGGG xxxx
/// |  A   | |pad| |  B   | |pad|
/// ```
///
/// A window of `read_length` bases can therefore touch at most the tail of one
/// reference and the head of the next through a pad, never skip over one.
/// Ranges and sentinel blocks are ascending by construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombinedReference {
    buffer: Vec<u8>,
    ranges: Vec<RefRange>,
    name_to_range: HashMap<String, usize>,
    sentinel_blocks: Vec<Range<usize>>,
    read_length: usize,
}

impl CombinedReference {
    /// Concatenate `references` in order with sentinel padding.
    ///
    /// # Errors
    ///
    /// Returns `IndexError::InvalidReadLength` if `read_length` is zero,
    /// `IndexError::EmptyReferenceSet` if there are no references,
    /// `IndexError::DuplicateReference` if a name repeats, or
    /// `IndexError::InvalidReference` if a name or sequence is empty or a
    /// sequence contains a byte outside `ACGTN`.
    pub fn build(references: &ReferenceSet, read_length: usize) -> Result<Self, IndexError> {
        if read_length == 0 {
            return Err(IndexError::InvalidReadLength);
        }
        if references.is_empty() {
            return Err(IndexError::EmptyReferenceSet);
        }

        let capacity = references.total_length() + references.len() * read_length;
        let mut buffer = Vec::with_capacity(capacity);
        let mut ranges = Vec::with_capacity(references.len());
        let mut sentinel_blocks = Vec::with_capacity(references.len());
        let mut seen: HashSet<&str> = HashSet::new();

        for reference in references {
            if reference.name.is_empty() {
                return Err(IndexError::InvalidReference {
                    name: String::new(),
                    reason: "reference name is empty".to_string(),
                });
            }
            if !seen.insert(reference.name.as_str()) {
                return Err(IndexError::DuplicateReference(reference.name.clone()));
            }
            if reference.is_empty() {
                return Err(IndexError::InvalidReference {
                    name: reference.name.clone(),
                    reason: "sequence is empty".to_string(),
                });
            }
            if let Some((pos, base)) = find_invalid_base(&reference.sequence) {
                return Err(IndexError::InvalidReference {
                    name: reference.name.clone(),
                    reason: format!(
                        "invalid base '{}' at position {}",
                        display_byte(base),
                        pos + 1
                    ),
                });
            }

            let start = buffer.len();
            buffer.extend_from_slice(&reference.sequence);
            let pad_start = buffer.len();
            buffer.resize(pad_start + read_length, SENTINEL);

            ranges.push(RefRange {
                name: reference.name.clone(),
                start,
                end: pad_start,
            });
            sentinel_blocks.push(pad_start..pad_start + read_length);
        }

        let name_to_range = ranges
            .iter()
            .enumerate()
            .map(|(idx, range)| (range.name.clone(), idx))
            .collect();

        debug!(
            references = ranges.len(),
            buffer_len = buffer.len(),
            read_length,
            "built combined reference"
        );

        Ok(Self {
            buffer,
            ranges,
            name_to_range,
            sentinel_blocks,
            read_length,
        })
    }

    #[must_use]
    pub fn buffer(&self) -> &[u8] {
        &self.buffer
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    #[must_use]
    pub fn read_length(&self) -> usize {
        self.read_length
    }

    /// Reference ranges in concatenation order
    #[must_use]
    pub fn ranges(&self) -> &[RefRange] {
        &self.ranges
    }

    /// Range of the named reference
    #[must_use]
    pub fn range(&self, name: &str) -> Option<&RefRange> {
        self.name_to_range.get(name).map(|&idx| &self.ranges[idx])
    }

    /// Padding blocks, ascending
    #[must_use]
    pub fn sentinel_blocks(&self) -> &[Range<usize>] {
        &self.sentinel_blocks
    }

    /// Find the reference whose range contains `pos` (binary search over the
    /// ascending ranges). None when `pos` is in padding or past the end.
    #[must_use]
    pub fn locate(&self, pos: usize) -> Option<&RefRange> {
        let idx = self.ranges.partition_point(|r| r.start <= pos);
        if idx == 0 {
            return None;
        }
        let range = &self.ranges[idx - 1];
        range.contains(pos).then_some(range)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::reference::Reference;

    fn refs(pairs: &[(&str, &str)]) -> ReferenceSet {
        pairs
            .iter()
            .map(|(name, seq)| Reference::new(*name, seq.as_bytes().to_vec()))
            .collect()
    }

    #[test]
    fn test_build_layout() {
        let set = refs(&[("A", "ACGTACGT"), ("B", "TTTTGGGG")]);
        let combined = CombinedReference::build(&set, 4).unwrap();

        assert_eq!(combined.buffer(), b"ACGTACGTxxxxTTTTGGGGxxxx");
        assert_eq!(combined.range("A").map(|r| (r.start, r.end)), Some((0, 8)));
        assert_eq!(combined.range("B").map(|r| (r.start, r.end)), Some((12, 20)));
        assert_eq!(combined.sentinel_blocks(), &[8..12, 20..24]);
    }

    #[test]
    fn test_buffer_length_invariant() {
        let set = refs(&[("a", "A"), ("b", "ACGTNNACGT"), ("c", "GGGCCC")]);
        for read_length in [1, 3, 150] {
            let combined = CombinedReference::build(&set, read_length).unwrap();
            assert_eq!(
                combined.len(),
                set.total_length() + set.len() * read_length
            );
        }
    }

    #[test]
    fn test_ranges_and_blocks_ascending() {
        let set = refs(&[("a", "ACG"), ("b", "T"), ("c", "GGGG")]);
        let combined = CombinedReference::build(&set, 5).unwrap();

        for pair in combined.ranges().windows(2) {
            assert!(pair[0].end <= pair[1].start);
        }
        for pair in combined.sentinel_blocks().windows(2) {
            assert!(pair[0].end <= pair[1].start);
        }
        for (range, block) in combined.ranges().iter().zip(combined.sentinel_blocks()) {
            assert_eq!(range.end, block.start);
        }
    }

    #[test]
    fn test_locate() {
        let set = refs(&[("A", "ACGTACGT"), ("B", "TTTTGGGG")]);
        let combined = CombinedReference::build(&set, 4).unwrap();

        assert_eq!(combined.locate(0).map(|r| r.name.as_str()), Some("A"));
        assert_eq!(combined.locate(7).map(|r| r.name.as_str()), Some("A"));
        assert!(combined.locate(8).is_none());
        assert!(combined.locate(11).is_none());
        assert_eq!(combined.locate(12).map(|r| r.name.as_str()), Some("B"));
        assert_eq!(combined.locate(19).map(|r| r.name.as_str()), Some("B"));
        assert!(combined.locate(20).is_none());
        assert!(combined.locate(1000).is_none());
    }

    #[test]
    fn test_rejects_zero_read_length() {
        let set = refs(&[("A", "ACGT")]);
        assert!(matches!(
            CombinedReference::build(&set, 0),
            Err(IndexError::InvalidReadLength)
        ));
    }

    #[test]
    fn test_rejects_empty_set() {
        assert!(matches!(
            CombinedReference::build(&ReferenceSet::default(), 4),
            Err(IndexError::EmptyReferenceSet)
        ));
    }

    #[test]
    fn test_rejects_empty_sequence() {
        let set = refs(&[("A", "ACGT"), ("B", "")]);
        match CombinedReference::build(&set, 4) {
            Err(IndexError::InvalidReference { name, .. }) => assert_eq!(name, "B"),
            other => panic!("expected InvalidReference, got {other:?}"),
        }
    }

    #[test]
    fn test_rejects_invalid_base() {
        let set = refs(&[("A", "ACGXT")]);
        match CombinedReference::build(&set, 4) {
            Err(IndexError::InvalidReference { name, reason }) => {
                assert_eq!(name, "A");
                assert!(reason.contains("'X'"), "unexpected reason: {reason}");
                assert!(reason.contains("position 4"), "unexpected reason: {reason}");
            }
            other => panic!("expected InvalidReference, got {other:?}"),
        }
    }

    #[test]
    fn test_rejects_sentinel_in_sequence() {
        let set = refs(&[("A", "ACxT")]);
        assert!(matches!(
            CombinedReference::build(&set, 4),
            Err(IndexError::InvalidReference { .. })
        ));
    }

    #[test]
    fn test_rejects_duplicate_names() {
        let set = refs(&[("A", "ACGT"), ("A", "GGGG")]);
        assert!(matches!(
            CombinedReference::build(&set, 4),
            Err(IndexError::DuplicateReference(name)) if name == "A"
        ));
    }

    #[test]
    fn test_build_is_deterministic() {
        let set = refs(&[("A", "ACGTACGT"), ("B", "TTTTGGGG")]);
        let first = CombinedReference::build(&set, 4).unwrap();
        let second = CombinedReference::build(&set, 4).unwrap();
        assert_eq!(first, second);
    }
}
