//! Centralized validation and helper functions.

/// Byte used to pad between references in the combined buffer.
/// Lowercase, so it can never collide with an upper-cased base.
pub const SENTINEL: u8 = b'x';

/// Bases allowed in a reference sequence
pub const REFERENCE_ALPHABET: &[u8] = b"ACGTN";

/// Maximum number of references allowed in a single FASTA (DOS protection)
pub const MAX_REFERENCES: usize = 100_000;

/// Check whether a byte belongs to the reference alphabet.
///
/// # Examples
///
/// ```
/// use amplicon_aligner::utils::validation::is_valid_base;
///
/// assert!(is_valid_base(b'A'));
/// assert!(is_valid_base(b'N'));
/// assert!(!is_valid_base(b'a'));
/// assert!(!is_valid_base(b'x'));
/// ```
#[must_use]
pub fn is_valid_base(base: u8) -> bool {
    REFERENCE_ALPHABET.contains(&base)
}

/// Find the first byte outside the reference alphabet.
/// Returns its position and value, or None if the sequence is clean.
#[must_use]
pub fn find_invalid_base(sequence: &[u8]) -> Option<(usize, u8)> {
    sequence
        .iter()
        .position(|&b| !is_valid_base(b))
        .map(|pos| (pos, sequence[pos]))
}

/// Upper-case a sequence in place
pub fn uppercase_in_place(sequence: &mut [u8]) {
    sequence.make_ascii_uppercase();
}

/// Whether a FASTA already holding `count` references is full.
/// Call this BEFORE adding a new reference.
#[must_use]
pub fn reference_limit_reached(count: usize) -> bool {
    count >= MAX_REFERENCES
}

/// Render a byte for an error message, escaping non-printable values
#[must_use]
pub fn display_byte(b: u8) -> String {
    if b.is_ascii_graphic() {
        (b as char).to_string()
    } else {
        format!("\\x{b:02x}")
    }
}
