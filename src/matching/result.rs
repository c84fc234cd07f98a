use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::core::types::{Mate, PairStatus, Reason};
use crate::matching::AlignError;

/// One scored placement of a read on a reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlignmentCandidate {
    pub ref_name: String,

    /// 0-based offset of the first compared base within the reference
    pub ref_offset: usize,

    pub mismatches: usize,

    /// Read bases dropped at the 5' end by boundary trimming
    pub trimmed_start: usize,

    /// Read bases dropped at the 3' end by boundary trimming
    pub trimmed_end: usize,

    /// Untrimmed window start in buffer coordinates (tie-break key)
    #[serde(skip)]
    pub window_start: i64,

    /// Offset in the read of the first seed that produced this window
    #[serde(skip)]
    pub seed_offset: usize,
}

impl AlignmentCandidate {
    /// Ordering key for picking the best candidate. A full-span placement
    /// outranks a boundary-trimmed one with the same mismatch count.
    #[must_use]
    pub fn rank(&self) -> (usize, usize, i64, usize) {
        (
            self.mismatches,
            self.trimmed_total(),
            self.window_start,
            self.seed_offset,
        )
    }

    /// Read bases dropped by boundary trimming at either end
    #[must_use]
    pub fn trimmed_total(&self) -> usize {
        self.trimmed_start + self.trimmed_end
    }

    /// Whether two candidates tie for best placement
    #[must_use]
    pub fn ties_with(&self, other: &Self) -> bool {
        self.mismatches == other.mismatches && self.trimmed_total() == other.trimmed_total()
    }

    /// Number of read bases actually compared
    #[must_use]
    pub fn aligned_length(&self, read_length: usize) -> usize {
        read_length.saturating_sub(self.trimmed_total())
    }
}

/// Outcome for a single read
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadAlignment {
    pub read_id: String,
    pub mapped: bool,
    pub best: Option<AlignmentCandidate>,
    pub reason: Option<Reason>,

    /// Other distinct candidates with the same mismatch count and trimmed
    /// length as `best`
    pub alternatives: usize,
}

impl ReadAlignment {
    #[must_use]
    pub fn mapped(read_id: impl Into<String>, best: AlignmentCandidate, alternatives: usize) -> Self {
        Self {
            read_id: read_id.into(),
            mapped: true,
            best: Some(best),
            reason: (alternatives > 0).then_some(Reason::Ambiguous),
            alternatives,
        }
    }

    #[must_use]
    pub fn unmapped(read_id: impl Into<String>, reason: Reason) -> Self {
        Self {
            read_id: read_id.into(),
            mapped: false,
            best: None,
            reason: Some(reason),
            alternatives: 0,
        }
    }

    #[must_use]
    pub fn is_ambiguous(&self) -> bool {
        self.reason == Some(Reason::Ambiguous)
    }

    /// Name of the reference the read mapped to
    #[must_use]
    pub fn ref_name(&self) -> Option<&str> {
        self.best.as_ref().map(|c| c.ref_name.as_str())
    }
}

/// Outcome for a read pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairAlignment {
    pub first: ReadAlignment,
    pub second: ReadAlignment,
    pub status: PairStatus,
    pub reason: Option<Reason>,
}

impl PairAlignment {
    #[must_use]
    pub fn mate(&self, mate: Mate) -> &ReadAlignment {
        match mate {
            Mate::First => &self.first,
            Mate::Second => &self.second,
        }
    }
}

/// Outcome for one input, matching its shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AlignmentResult {
    Single(ReadAlignment),
    Paired(PairAlignment),
}

impl AlignmentResult {
    #[must_use]
    pub fn is_mapped(&self) -> bool {
        match self {
            Self::Single(read) => read.mapped,
            Self::Paired(pair) => pair.status.is_mapped(),
        }
    }

    #[must_use]
    pub fn reason(&self) -> Option<Reason> {
        match self {
            Self::Single(read) => read.reason,
            Self::Paired(pair) => pair.reason,
        }
    }

    #[must_use]
    pub fn read_id(&self) -> &str {
        match self {
            Self::Single(read) => &read.read_id,
            Self::Paired(pair) => &pair.first.read_id,
        }
    }
}

/// Result slot for one input of a sample, tagged with its input position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleResult {
    pub index: usize,
    pub outcome: Result<AlignmentResult, AlignError>,
}

/// Counts over a finished sample
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SampleSummary {
    pub total: usize,
    pub mapped: usize,
    pub unmapped: usize,
    /// Inputs rejected with a per-read error
    pub failed: usize,
    pub reasons: BTreeMap<String, usize>,
    /// Mapped reads per reference; each mapped mate counts once
    pub per_reference: BTreeMap<String, usize>,
    pub pair_statuses: BTreeMap<String, usize>,
}

impl SampleSummary {
    #[must_use]
    pub fn from_results(results: &[SampleResult]) -> Self {
        let mut summary = Self {
            total: results.len(),
            ..Self::default()
        };

        for result in results {
            let Ok(alignment) = &result.outcome else {
                summary.failed += 1;
                continue;
            };

            if alignment.is_mapped() {
                summary.mapped += 1;
            } else {
                summary.unmapped += 1;
            }
            if let Some(reason) = alignment.reason() {
                *summary.reasons.entry(reason.to_string()).or_default() += 1;
            }

            match alignment {
                AlignmentResult::Single(read) => summary.count_reference(read),
                AlignmentResult::Paired(pair) => {
                    summary.count_reference(&pair.first);
                    summary.count_reference(&pair.second);
                    *summary
                        .pair_statuses
                        .entry(pair.status.to_string())
                        .or_default() += 1;
                }
            }
        }

        summary
    }

    fn count_reference(&mut self, read: &ReadAlignment) {
        if let Some(name) = read.ref_name() {
            *self.per_reference.entry(name.to_string()).or_default() += 1;
        }
    }

    /// Fraction of non-failed inputs that mapped
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn mapped_fraction(&self) -> f64 {
        let aligned = self.mapped + self.unmapped;
        if aligned == 0 {
            0.0
        } else {
            self.mapped as f64 / aligned as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(ref_name: &str, ref_offset: usize, mismatches: usize) -> AlignmentCandidate {
        AlignmentCandidate {
            ref_name: ref_name.to_string(),
            ref_offset,
            mismatches,
            trimmed_start: 0,
            trimmed_end: 0,
            window_start: 0,
            seed_offset: 0,
        }
    }

    #[test]
    fn test_mapped_with_alternatives_is_ambiguous() {
        let read = ReadAlignment::mapped("r1", candidate("A", 0, 0), 2);
        assert!(read.mapped);
        assert!(read.is_ambiguous());
        assert_eq!(read.alternatives, 2);

        let unique = ReadAlignment::mapped("r2", candidate("A", 0, 0), 0);
        assert_eq!(unique.reason, None);
    }

    #[test]
    fn test_aligned_length() {
        let mut c = candidate("A", 0, 0);
        c.trimmed_start = 2;
        c.trimmed_end = 1;
        assert_eq!(c.aligned_length(10), 7);
    }

    #[test]
    fn test_summary_counts() {
        let results = vec![
            SampleResult {
                index: 0,
                outcome: Ok(AlignmentResult::Single(ReadAlignment::mapped(
                    "r1",
                    candidate("A", 0, 0),
                    0,
                ))),
            },
            SampleResult {
                index: 1,
                outcome: Ok(AlignmentResult::Single(ReadAlignment::unmapped(
                    "r2",
                    Reason::NoSeedHit,
                ))),
            },
            SampleResult {
                index: 2,
                outcome: Ok(AlignmentResult::Paired(PairAlignment {
                    first: ReadAlignment::mapped("r3", candidate("A", 1, 0), 0),
                    second: ReadAlignment::mapped("r3", candidate("B", 2, 1), 0),
                    status: PairStatus::Discordant,
                    reason: Some(Reason::Discordant),
                })),
            },
            SampleResult {
                index: 3,
                outcome: Err(AlignError::ReadLengthMismatch {
                    read_id: "r4".to_string(),
                    expected: 4,
                    found: 3,
                }),
            },
        ];

        let summary = SampleSummary::from_results(&results);
        assert_eq!(summary.total, 4);
        assert_eq!(summary.mapped, 2);
        assert_eq!(summary.unmapped, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.reasons.get("NO_SEED_HIT"), Some(&1));
        assert_eq!(summary.reasons.get("DISCORDANT"), Some(&1));
        assert_eq!(summary.per_reference.get("A"), Some(&2));
        assert_eq!(summary.per_reference.get("B"), Some(&1));
        assert_eq!(summary.pair_statuses.get("DISCORDANT"), Some(&1));
    }

    #[test]
    fn test_result_serializes_with_kind_tag() {
        let result = AlignmentResult::Single(ReadAlignment::unmapped("r1", Reason::AllTrimmed));
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["kind"], "single");
        assert_eq!(json["reason"], "ALL_TRIMMED");
        assert_eq!(json["mapped"], false);
    }
}
