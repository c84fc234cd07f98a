use crate::core::types::{Mate, PairStatus, Reason};
use crate::matching::result::{PairAlignment, ReadAlignment};

/// Combine independently aligned mates into a pair outcome.
///
/// - Both mapped to the same reference: concordant, flagged ambiguous if
///   either mate is.
/// - Both mapped to different references: discordant.
/// - One mapped: half-mapped, keeping that mate's reason.
/// - Neither mapped: unmapped with the more specific of the two reasons.
#[must_use]
pub fn combine(first: ReadAlignment, second: ReadAlignment) -> PairAlignment {
    let (status, reason) = match (first.ref_name(), second.ref_name()) {
        (Some(a), Some(b)) if a == b => {
            let ambiguous = first.is_ambiguous() || second.is_ambiguous();
            (PairStatus::Concordant, ambiguous.then_some(Reason::Ambiguous))
        }
        (Some(_), Some(_)) => (PairStatus::Discordant, Some(Reason::Discordant)),
        (Some(_), None) => (PairStatus::HalfMapped(Mate::First), first.reason),
        (None, Some(_)) => (PairStatus::HalfMapped(Mate::Second), second.reason),
        (None, None) => {
            let reason = match (first.reason, second.reason) {
                (Some(a), Some(b)) => Some(Reason::most_specific(a, b)),
                (a, b) => a.or(b),
            };
            (PairStatus::Unmapped, reason)
        }
    };

    PairAlignment {
        first,
        second,
        status,
        reason,
    }
}
