//! FASTQ read parsing using noodles.
//!
//! Qualities are dropped; only the read name and upper-cased bases are kept.
//! Gzip input may be multi-member, as written by most demultiplexers.

use std::io::BufRead;
use std::path::Path;

use noodles::fastq;
use tracing::debug;

use crate::core::read::{Read, ReadInput, ReadPair};
use crate::parsing::{open_input, ParseError};
use crate::utils::validation::uppercase_in_place;

/// Parse every record of a FASTQ file.
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read or
/// `ParseError::Noodles` if a record is malformed.
pub fn parse_fastq_file(path: &Path) -> Result<Vec<Read>, ParseError> {
    let reads = parse_fastq_reader(open_input(path)?)?;
    debug!(reads = reads.len(), "parsed FASTQ {}", path.display());
    Ok(reads)
}

/// Parse every record from a buffered reader
///
/// # Errors
///
/// See [`parse_fastq_file`].
pub fn parse_fastq_reader<R: BufRead>(reader: R) -> Result<Vec<Read>, ParseError> {
    let mut reader = fastq::io::Reader::new(reader);
    let mut reads = Vec::new();

    for result in reader.records() {
        let record = result
            .map_err(|e| ParseError::Noodles(format!("Failed to parse FASTQ record: {e}")))?;

        let id = String::from_utf8_lossy(record.name()).to_string();
        let mut sequence = record.sequence().to_vec();
        uppercase_in_place(&mut sequence);

        reads.push(Read::new(id, sequence));
    }

    Ok(reads)
}

/// Read a single-end (or merged) sample
///
/// # Errors
///
/// See [`parse_fastq_file`].
pub fn read_single(path: &Path) -> Result<Vec<ReadInput>, ParseError> {
    Ok(parse_fastq_file(path)?
        .into_iter()
        .map(ReadInput::Single)
        .collect())
}

/// Read a paired-end sample, zipping the two mate files record by record.
///
/// # Errors
///
/// Returns `ParseError::MateCountMismatch` if the files hold different numbers
/// of records, or any error from [`parse_fastq_file`].
pub fn read_paired(sample: &str, first: &Path, second: &Path) -> Result<Vec<ReadInput>, ParseError> {
    let first_reads = parse_fastq_file(first)?;
    let second_reads = parse_fastq_file(second)?;

    if first_reads.len() != second_reads.len() {
        return Err(ParseError::MateCountMismatch {
            first: first_reads.len(),
            second: second_reads.len(),
        });
    }

    Ok(first_reads
        .into_iter()
        .zip(second_reads)
        .map(|(r1, r2)| ReadInput::Paired(ReadPair::new(sample, r1, r2)))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const FASTQ: &[u8] = b"@read1 1:N:0:ACGT\nacgt\n+\nIIII\n@read2\nTTGG\n+\nIIII\n";

    fn write_temp(suffix: &str, content: &[u8]) -> NamedTempFile {
        let mut temp = NamedTempFile::with_suffix(suffix).unwrap();
        temp.write_all(content).unwrap();
        temp.flush().unwrap();
        temp
    }

    #[test]
    fn test_parse_fastq_reader() {
        let reads = parse_fastq_reader(FASTQ).unwrap();
        assert_eq!(reads.len(), 2);
        assert_eq!(reads[0].id, "read1");
        assert_eq!(reads[0].sequence, b"ACGT");
        assert_eq!(reads[1].id, "read2");
    }

    #[test]
    fn test_parse_multi_member_gzip() {
        let mut compressed = Vec::new();
        for chunk in [&FASTQ[..30], &FASTQ[30..]] {
            let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
            encoder.write_all(chunk).unwrap();
            compressed.extend(encoder.finish().unwrap());
        }
        let temp = write_temp(".fastq.gz", &compressed);

        let reads = parse_fastq_file(temp.path()).unwrap();
        assert_eq!(reads.len(), 2);
        assert_eq!(reads[1].sequence, b"TTGG");
    }

    #[test]
    fn test_read_paired() {
        let r1 = write_temp("_R1.fq", FASTQ);
        let r2 = write_temp("_R2.fq", b"@read1\nGGGG\n+\nIIII\n@read2\nCCCC\n+\nIIII\n");

        let inputs = read_paired("s1", r1.path(), r2.path()).unwrap();
        assert_eq!(inputs.len(), 2);
        match &inputs[1] {
            ReadInput::Paired(pair) => {
                assert_eq!(pair.sample, "s1");
                assert_eq!(pair.first.sequence, b"TTGG");
                assert_eq!(pair.second.sequence, b"CCCC");
            }
            other => panic!("expected a pair, got {other:?}"),
        }
    }

    #[test]
    fn test_read_paired_count_mismatch() {
        let r1 = write_temp("_R1.fq", FASTQ);
        let r2 = write_temp("_R2.fq", b"@read1\nGGGG\n+\nIIII\n");

        assert!(matches!(
            read_paired("s1", r1.path(), r2.path()),
            Err(ParseError::MateCountMismatch { first: 2, second: 1 })
        ));
    }

    #[test]
    fn test_malformed_record() {
        assert!(matches!(
            parse_fastq_reader(&b"read1\nACGT\n"[..]),
            Err(ParseError::Noodles(_))
        ));
    }
}
