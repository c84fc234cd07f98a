use serde::{Deserialize, Serialize};

/// A single named reference sequence (e.g. one amplicon)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    /// Sequence name (first word of the FASTA definition line)
    pub name: String,

    /// Upper-case nucleotide sequence
    pub sequence: Vec<u8>,
}

impl Reference {
    pub fn new(name: impl Into<String>, sequence: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
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

    /// MD5 of the sequence, lowercase hex
    #[must_use]
    pub fn md5(&self) -> String {
        let uppercase: Vec<u8> = self.sequence.iter().map(u8::to_ascii_uppercase).collect();
        format!("{:x}", md5::compute(&uppercase))
    }
}

/// An ordered set of references.
///
/// Order is significant: it fixes the concatenation order of the combined
/// reference buffer. Name uniqueness and sequence validity are checked when the
/// index is built, not on insertion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceSet {
    references: Vec<Reference>,
}

impl ReferenceSet {
    #[must_use]
    pub fn new(references: Vec<Reference>) -> Self {
        Self { references }
    }

    pub fn push(&mut self, reference: Reference) {
        self.references.push(reference);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.references.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.references.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Reference> {
        self.references.iter()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Reference> {
        self.references.iter().find(|r| r.name == name)
    }

    /// Sum of all sequence lengths
    #[must_use]
    pub fn total_length(&self) -> usize {
        self.references.iter().map(Reference::len).sum()
    }
}

impl FromIterator<Reference> for ReferenceSet {
    fn from_iter<I: IntoIterator<Item = Reference>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a ReferenceSet {
    type Item = &'a Reference;
    type IntoIter = std::slice::Iter<'a, Reference>;

    fn into_iter(self) -> Self::IntoIter {
        self.references.iter()
    }
}
