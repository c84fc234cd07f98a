//! Discovery of samples in a directory of read files.
//!
//! File names are classified in this order:
//!
//! 1. Only `*.fq` / `*.fastq`, optionally `.gz`, are considered (any case).
//! 2. Empty files (zero bytes, or gzip holding no data) become empty samples.
//! 3. Names ending in `_assembled` / `.merged` (possibly repeated) are merged
//!    single-file samples.
//! 4. Names with a mate marker `[_.](R|Read)?[12]`, the last one followed by
//!    `_`, `.` or the end of the name, are paired. The sample name is
//!    everything before the marker minus an `_L###` lane tag; mate 2 is the
//!    same name with the marker digit swapped.
//! 5. Anything else is a single-end sample named after the file.

use std::fs;
use std::io::Read as _;
use std::path::{Path, PathBuf};

use flate2::read::MultiGzDecoder;
use regex::Regex;
use serde::Serialize;
use tracing::{info, warn};

use crate::parsing::ParseError;

/// Read files belonging to one sample
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "layout", rename_all = "snake_case")]
pub enum SampleFiles {
    /// Mate files that were merged into one before alignment
    Merged { path: PathBuf },
    /// A single-end file, or a mate whose partner is missing
    Single { path: PathBuf },
    Paired { first: PathBuf, second: PathBuf },
    /// A read file with no data; never aligned
    Empty { path: PathBuf },
}

/// A named sample discovered in a read directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sample {
    pub name: String,
    #[serde(flatten)]
    pub files: SampleFiles,
}

impl Sample {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self.files, SampleFiles::Empty { .. })
    }

    /// Files of the sample, mate 1 first
    #[must_use]
    pub fn paths(&self) -> Vec<&Path> {
        match &self.files {
            SampleFiles::Merged { path } | SampleFiles::Single { path } | SampleFiles::Empty { path } => {
                vec![path.as_path()]
            }
            SampleFiles::Paired { first, second } => vec![first.as_path(), second.as_path()],
        }
    }
}

/// Compiled file name patterns used for discovery
#[derive(Debug, Clone)]
pub struct FileNamePatterns {
    read_file: Regex,
    merged: Regex,
    mate_marker: Regex,
    lane: Regex,
}

impl FileNamePatterns {
    /// Compile the discovery patterns.
    ///
    /// # Errors
    ///
    /// Returns `regex::Error` if a pattern fails to compile.
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            read_file: Regex::new(r"(?i)^(.*)(\.f(?:ast)?q(\.gz)?)$")?,
            merged: Regex::new(r"(?i)^(.*?)(?:[_.](?:assembled|merged))+$")?,
            mate_marker: Regex::new(r"(?i)[_.](?:R(?:ead)?)?([12])")?,
            lane: Regex::new(r"(?i)_L\d{3}$")?,
        })
    }

    /// Find the last mate marker in a file stem (name without the FASTQ
    /// extension).
    #[must_use]
    pub fn find_mate_marker(&self, stem: &str) -> Option<MateMarker> {
        let bytes = stem.as_bytes();
        let marker = self
            .mate_marker
            .captures_iter(stem)
            .filter(|caps| {
                let end = caps.get(0).map_or(0, |m| m.end());
                end == bytes.len() || matches!(bytes[end], b'_' | b'.')
            })
            .last()?;

        let whole = marker.get(0)?;
        let digit = marker.get(1)?;
        let prefix = &stem[..whole.start()];
        let sample = self.lane.replace(prefix, "").into_owned();

        Some(MateMarker {
            sample,
            mate: if digit.as_str() == "1" { 1 } else { 2 },
            digit_pos: digit.start(),
        })
    }
}

/// Mate marker found in a file stem
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MateMarker {
    /// Sample name with marker and lane tag removed
    pub sample: String,
    /// 1 or 2
    pub mate: u8,
    /// Byte position of the marker digit in the stem
    pub digit_pos: usize,
}

/// Name of the other mate's file: same name, marker digit swapped
#[must_use]
pub fn mate_file_name(file_name: &str, marker: &MateMarker) -> String {
    let other = if marker.mate == 1 { "2" } else { "1" };
    let mut name = file_name.to_string();
    name.replace_range(marker.digit_pos..=marker.digit_pos, other);
    name
}

/// Whether a read file holds no data
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read or decompressed.
pub fn is_empty_read_file(path: &Path, gzipped: bool) -> Result<bool, ParseError> {
    if fs::metadata(path)?.len() == 0 {
        return Ok(true);
    }
    if gzipped {
        let mut decoder = MultiGzDecoder::new(fs::File::open(path)?);
        let mut byte = [0u8; 1];
        return Ok(decoder.read(&mut byte)? == 0);
    }
    Ok(false)
}

/// Group the read files in `dir` into samples, sorted by sample name.
///
/// # Errors
///
/// Returns `ParseError::Io` if the directory or a file in it cannot be read,
/// or `ParseError::Pattern` if the file name patterns fail to compile.
pub fn discover_samples(dir: &Path) -> Result<Vec<Sample>, ParseError> {
    let mut file_names: Vec<String> = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            file_names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    file_names.sort();

    let patterns = FileNamePatterns::new()?;
    let mut samples = Vec::new();
    for file_name in &file_names {
        let Some(caps) = patterns.read_file.captures(file_name) else {
            continue;
        };
        let stem = caps.get(1).map_or("", |m| m.as_str());
        let gzipped = caps.get(3).is_some();
        let path = dir.join(file_name);

        if is_empty_read_file(&path, gzipped)? {
            warn!("Read file {file_name} has no data, skipping...");
            samples.push(Sample {
                name: stem.to_string(),
                files: SampleFiles::Empty { path },
            });
            continue;
        }

        if let Some(merged) = patterns.merged.captures(stem) {
            samples.push(Sample {
                name: merged.get(1).map_or(stem, |m| m.as_str()).to_string(),
                files: SampleFiles::Merged { path },
            });
            continue;
        }

        let Some(marker) = patterns.find_mate_marker(stem) else {
            samples.push(Sample {
                name: stem.to_string(),
                files: SampleFiles::Single { path },
            });
            continue;
        };

        let mate_name = mate_file_name(file_name, &marker);
        let mate_path = dir.join(&mate_name);
        let mate_usable = file_names.contains(&mate_name)
            && !is_empty_read_file(&mate_path, gzipped)?;

        let files = match (marker.mate, mate_usable) {
            (1, true) => SampleFiles::Paired {
                first: path,
                second: mate_path,
            },
            // Collected when its mate 1 file is visited
            (_, true) => continue,
            (_, false) => {
                warn!(
                    "Cannot find {mate_name} with data, the matching read to {file_name}. Including as unpaired..."
                );
                SampleFiles::Single { path }
            }
        };
        samples.push(Sample {
            name: marker.sample,
            files,
        });
    }

    samples.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.paths().cmp(&b.paths())));
    info!(samples = samples.len(), "discovered samples in {}", dir.display());
    Ok(samples)
}
