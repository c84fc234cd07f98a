//! Reference FASTA parsing using noodles.
//!
//! Reads every record into memory as a [`Reference`]; multi-line sequences are
//! joined by noodles. Names are the first word of the definition line and
//! sequences are upper-cased. Files ending in `.gz` or `.bgz` are read
//! through a gzip decoder.

use std::io::BufRead;
use std::path::Path;

use noodles::fasta;
use tracing::debug;

use crate::core::reference::{Reference, ReferenceSet};
use crate::parsing::{open_input, ParseError};
use crate::utils::validation::{reference_limit_reached, uppercase_in_place, MAX_REFERENCES};

/// Parse a FASTA file into an ordered reference set.
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, `ParseError::Noodles` if
/// a record is malformed, `ParseError::InvalidFormat` if no sequences are found,
/// or `ParseError::TooManyReferences` if the limit is exceeded.
pub fn parse_fasta_file(path: &Path) -> Result<ReferenceSet, ParseError> {
    let mut reader = fasta::io::Reader::new(open_input(path)?);
    let references = parse_fasta_reader(&mut reader)?;
    debug!(
        references = references.len(),
        "parsed reference FASTA {}",
        path.display()
    );
    Ok(references)
}

/// Parse from a noodles FASTA reader
///
/// # Errors
///
/// See [`parse_fasta_file`].
pub fn parse_fasta_reader<R: BufRead>(
    reader: &mut fasta::io::Reader<R>,
) -> Result<ReferenceSet, ParseError> {
    let mut references = ReferenceSet::default();

    for result in reader.records() {
        let record = result
            .map_err(|e| ParseError::Noodles(format!("Failed to parse FASTA record: {e}")))?;

        if reference_limit_reached(references.len()) {
            return Err(ParseError::TooManyReferences {
                max: MAX_REFERENCES,
            });
        }

        let name = String::from_utf8_lossy(record.name()).to_string();
        let mut sequence = record.sequence().as_ref().to_vec();
        uppercase_in_place(&mut sequence);

        references.push(Reference::new(name, sequence));
    }

    if references.is_empty() {
        return Err(ParseError::InvalidFormat(
            "No sequences found in FASTA file".to_string(),
        ));
    }

    Ok(references)
}
