use std::ops::Range;

/// The part of a candidate window that lies inside a single reference.
///
/// `eff_start..eff_end` are buffer coordinates. `trimmed_start` and
/// `trimmed_end` count the read bases dropped at each end, so the read segment
/// compared against the buffer is
/// `read[trimmed_start..read_length - trimmed_end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrimmedWindow {
    pub eff_start: usize,
    pub eff_end: usize,
    pub trimmed_start: usize,
    pub trimmed_end: usize,
}

impl TrimmedWindow {
    #[must_use]
    pub fn span(&self) -> usize {
        self.eff_end - self.eff_start
    }
}

/// Cut a read-length window starting at `start` back to the reference it
/// begins in.
///
/// `start` may be negative when a seed sits closer to the buffer start than to
/// the read start; the bases before position 0 count as leading trim.
/// `blocks` must be the ascending sentinel blocks of a buffer of length
/// `buffer_len`. Returns `None` when nothing of the window is left.
#[must_use]
pub fn trim_window(
    start: i64,
    read_length: usize,
    blocks: &[Range<usize>],
    buffer_len: usize,
) -> Option<TrimmedWindow> {
    let end = start + to_signed(read_length);
    let mut eff_start = usize::try_from(start).unwrap_or(0);

    // Left overlap: the window starts inside a pad block
    let first = blocks.partition_point(|b| b.end <= eff_start);
    if let Some(block) = blocks.get(first) {
        if block.start <= eff_start {
            eff_start = block.end;
        }
    }

    // Right overlap: the window runs into the next pad block
    let mut eff_end = usize::try_from(end).unwrap_or(0);
    let next = blocks.partition_point(|b| b.end <= eff_start);
    if let Some(block) = blocks.get(next) {
        if to_signed(block.start) < end {
            eff_end = block.start;
        }
    }
    eff_end = eff_end.min(buffer_len);

    if eff_end <= eff_start {
        return None;
    }

    Some(TrimmedWindow {
        eff_start,
        eff_end,
        trimmed_start: usize::try_from(to_signed(eff_start) - start).unwrap_or(0),
        trimmed_end: usize::try_from(end - to_signed(eff_end)).unwrap_or(0),
    })
}

/// Buffer offsets never come near `i64::MAX`
#[allow(clippy::cast_possible_wrap)]
pub(crate) fn to_signed(value: usize) -> i64 {
    value as i64
}
