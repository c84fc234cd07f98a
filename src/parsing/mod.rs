//! Parsers turning files on disk into reference sets and read inputs.
//!
//! This module provides:
//!
//! - **FASTA** ([`fasta`]): reference sequences, plain or gzip compressed
//! - **FASTQ** ([`fastq`]): single-end or paired-end reads, plain or gzip
//!   compressed (multi-member gzip included)
//! - **Sample discovery** ([`samples`]): grouping the read files of a run
//!   directory into samples by file name
//!
//! Sequences are upper-cased on the way in. Reference sequences are validated
//! when the index is built; read sequences are never validated beyond length.
//!
//! ## Example
//!
//! ```rust,no_run
//! use amplicon_aligner::parsing::{fasta, fastq};
//! use std::path::Path;
//!
//! let references = fasta::parse_fasta_file(Path::new("amplicons.fa")).unwrap();
//! let inputs = fastq::read_paired(
//!     "sample1",
//!     Path::new("sample1_R1.fastq.gz"),
//!     Path::new("sample1_R2.fastq.gz"),
//! )
//! .unwrap();
//! ```

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::read::MultiGzDecoder;
use thiserror::Error;

pub mod fasta;
pub mod fastq;
pub mod samples;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("noodles error: {0}")]
    Noodles(String),

    #[error("Mate files differ in record count: {first} reads in mate 1, {second} in mate 2")]
    MateCountMismatch { first: usize, second: usize },

    #[error("Invalid file name pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Too many references: a FASTA may hold at most {max}")]
    TooManyReferences { max: usize },
}

/// Check if the path names a gzip file
#[allow(clippy::case_sensitive_file_extension_comparisons)] // Already lowercased
pub(crate) fn is_gzipped(path: &Path) -> bool {
    let path_str = path.to_string_lossy().to_lowercase();
    path_str.ends_with(".gz") || path_str.ends_with(".bgz")
}

/// Open a file for buffered reading, decompressing gzip by extension
pub(crate) fn open_input(path: &Path) -> Result<Box<dyn BufRead>, ParseError> {
    let file = File::open(path)?;
    if is_gzipped(path) {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}
