use serde::{Deserialize, Serialize};

/// A single sequencing read. Quality scores are not carried.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Read {
    /// Read identifier (FASTQ name, without description)
    pub id: String,

    /// Upper-case base calls
    pub sequence: Vec<u8>,
}

impl Read {
    pub fn new(id: impl Into<String>, sequence: impl Into<Vec<u8>>) -> Self {
        Self {
            id: id.into(),
            sequence: sequence.into(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }
}

/// The two mates of a paired-end fragment from one sample
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadPair {
    pub sample: String,
    pub first: Read,
    pub second: Read,
}

impl ReadPair {
    pub fn new(sample: impl Into<String>, first: Read, second: Read) -> Self {
        Self {
            sample: sample.into(),
            first,
            second,
        }
    }
}

/// One unit of work for the aligner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReadInput {
    Single(Read),
    Paired(ReadPair),
}

impl ReadInput {
    /// Identifier used in output (mate 1's id for pairs)
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Single(read) => &read.id,
            Self::Paired(pair) => &pair.first.id,
        }
    }
}

impl From<Read> for ReadInput {
    fn from(read: Read) -> Self {
        Self::Single(read)
    }
}

impl From<ReadPair> for ReadInput {
    fn from(pair: ReadPair) -> Self {
        Self::Paired(pair)
    }
}
