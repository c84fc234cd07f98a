//! On-disk persistence for a built [`ReferenceIndex`].
//!
//! The file is a bincode `u32` format version followed by the bincode-encoded
//! index. The version is read and checked first, so an index written by an
//! incompatible release is rejected instead of being misread.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

use crate::index::ReferenceIndex;

/// Index file format version for compatibility checking
pub const INDEX_FORMAT_VERSION: u32 = 1;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to access index file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode or decode index: {0}")]
    Encoding(#[from] bincode::Error),

    #[error("Unsupported index format version {found} (expected {expected})")]
    Version { found: u32, expected: u32 },
}

impl ReferenceIndex {
    /// Write the index to `path`, replacing any existing file.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Io` if the file cannot be created or flushed, or
    /// `StoreError::Encoding` if serialization fails.
    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        if path.exists() {
            warn!("Overwriting existing index file {}", path.display());
        }
        let mut writer = BufWriter::new(File::create(path)?);
        bincode::serialize_into(&mut writer, &INDEX_FORMAT_VERSION)?;
        bincode::serialize_into(&mut writer, self)?;
        writer.flush()?;
        debug!("wrote index to {}", path.display());
        Ok(())
    }

    /// Read an index previously written with [`ReferenceIndex::save`].
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Io` if the file cannot be opened,
    /// `StoreError::Encoding` if it is not a valid index, or
    /// `StoreError::Version` if it was written in another format version.
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let mut reader = BufReader::new(File::open(path)?);
        let version: u32 = bincode::deserialize_from(&mut reader)?;
        if version != INDEX_FORMAT_VERSION {
            return Err(StoreError::Version {
                found: version,
                expected: INDEX_FORMAT_VERSION,
            });
        }
        Ok(bincode::deserialize_from(&mut reader)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::reference::{Reference, ReferenceSet};
    use crate::index::build_reference_index;
    use tempfile::NamedTempFile;

    #[test]
    fn test_save_and_load() {
        let refs: ReferenceSet = vec![
            Reference::new("A", b"ACGTACGT".to_vec()),
            Reference::new("B", b"TTTTGGGG".to_vec()),
        ]
        .into_iter()
        .collect();
        let index = build_reference_index(&refs, 4, 2).unwrap();

        let temp = NamedTempFile::new().unwrap();
        index.save(temp.path()).unwrap();
        let loaded = ReferenceIndex::load(temp.path()).unwrap();

        assert_eq!(loaded, index);
        assert_eq!(loaded.kmers().positions(b"GG"), &[16, 17, 18]);
    }

    #[test]
    fn test_load_rejects_garbage() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(b"not an index").unwrap();
        temp.flush().unwrap();

        assert!(ReferenceIndex::load(temp.path()).is_err());
    }

    #[test]
    fn test_load_rejects_other_version_before_decoding() {
        // Whatever follows the header is never decoded
        let mut bytes = bincode::serialize(&(INDEX_FORMAT_VERSION + 1)).unwrap();
        bytes.extend_from_slice(b"a layout this release cannot read");
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(&bytes).unwrap();
        temp.flush().unwrap();

        assert!(matches!(
            ReferenceIndex::load(temp.path()),
            Err(StoreError::Version { found, expected: INDEX_FORMAT_VERSION })
                if found == INDEX_FORMAT_VERSION + 1
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let result = ReferenceIndex::load(Path::new("/nonexistent/index.aidx"));
        assert!(matches!(result, Err(StoreError::Io(_))));
    }
}
