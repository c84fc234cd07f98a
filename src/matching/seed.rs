use std::collections::BTreeMap;
use tracing::trace;

use crate::core::read::Read;
use crate::core::types::Reason;
use crate::index::ReferenceIndex;
use crate::matching::result::{AlignmentCandidate, ReadAlignment};
use crate::matching::trimming::{to_signed, trim_window};
use crate::matching::AlignError;

/// Seed, trim, score and select for one read.
///
/// Every k-mer of the read is looked up in the index. A hit at buffer offset
/// `p` for the k-mer at read offset `i` proposes the window starting at
/// `p - i`; each distinct window is trimmed to the reference it starts in and
/// scored by Hamming distance over the remaining span. Candidates landing on
/// the same reference offset are merged, and the one with the smallest
/// `(mismatches, trimmed bases, window start, seed offset)` wins.
///
/// # Errors
///
/// Returns `AlignError::ReadLengthMismatch` if the read is not exactly the
/// index read length, or `AlignError::InternalIndex` if a trimmed window does
/// not resolve to a reference (a corrupt index).
pub fn align_read(index: &ReferenceIndex, read: &Read) -> Result<ReadAlignment, AlignError> {
    let read_length = index.read_length();
    if read.len() != read_length {
        return Err(AlignError::ReadLengthMismatch {
            read_id: read.id.clone(),
            expected: read_length,
            found: read.len(),
        });
    }

    let windows = collect_windows(index, &read.sequence);
    if windows.is_empty() {
        return Ok(ReadAlignment::unmapped(&read.id, Reason::NoSeedHit));
    }

    let combined = index.combined();
    let buffer = combined.buffer();
    let mut by_position: BTreeMap<(&str, usize), AlignmentCandidate> = BTreeMap::new();

    for (&start, &seed_offset) in &windows {
        let Some(window) = trim_window(start, read_length, combined.sentinel_blocks(), buffer.len())
        else {
            continue;
        };

        let range = combined
            .locate(window.eff_start)
            .filter(|r| window.eff_end <= r.end)
            .ok_or(AlignError::InternalIndex {
                offset: window.eff_start,
            })?;

        let segment = &read.sequence[window.trimmed_start..read_length - window.trimmed_end];
        let mismatches = count_mismatches(&buffer[window.eff_start..window.eff_end], segment);

        let candidate = AlignmentCandidate {
            ref_name: range.name.clone(),
            ref_offset: window.eff_start - range.start,
            mismatches,
            trimmed_start: window.trimmed_start,
            trimmed_end: window.trimmed_end,
            window_start: start,
            seed_offset,
        };

        match by_position.get_mut(&(range.name.as_str(), candidate.ref_offset)) {
            Some(existing) if candidate.rank() < existing.rank() => *existing = candidate,
            Some(_) => {}
            None => {
                by_position.insert((range.name.as_str(), candidate.ref_offset), candidate);
            }
        }
    }

    let Some(best) = by_position.values().min_by_key(|c| c.rank()).cloned() else {
        return Ok(ReadAlignment::unmapped(&read.id, Reason::AllTrimmed));
    };
    let alternatives = by_position
        .values()
        .filter(|c| c.ties_with(&best))
        .count()
        - 1;

    trace!(
        read = %read.id,
        reference = %best.ref_name,
        offset = best.ref_offset,
        mismatches = best.mismatches,
        alternatives,
        "aligned read"
    );

    Ok(ReadAlignment::mapped(&read.id, best, alternatives))
}

/// Distinct window starts proposed by the read's seeds, each with the
/// smallest read offset that proposed it
fn collect_windows(index: &ReferenceIndex, sequence: &[u8]) -> BTreeMap<i64, usize> {
    let mut windows = BTreeMap::new();
    for (i, kmer) in sequence.windows(index.hash_length()).enumerate() {
        for &p in index.kmers().positions(kmer) {
            // Seed offsets ascend, so the first insert is the smallest
            windows.entry(to_signed(p) - to_signed(i)).or_insert(i);
        }
    }
    windows
}

fn count_mismatches(reference: &[u8], read: &[u8]) -> usize {
    reference.iter().zip(read).filter(|(a, b)| a != b).count()
}
