use serde::{Deserialize, Serialize};

/// Mate designation within a read pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mate {
    First,
    Second,
}

impl Mate {
    /// The numeric mate label used in file names and tabular output (1 or 2)
    #[must_use]
    pub fn number(self) -> u8 {
        match self {
            Self::First => 1,
            Self::Second => 2,
        }
    }
}

impl std::fmt::Display for Mate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.number())
    }
}

/// Soft outcome recorded on an alignment result.
///
/// These never abort a run; they explain why a read is unmapped or why a
/// mapped read or pair deserves attention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Reason {
    /// No k-mer of the read occurs in the index
    NoSeedHit,
    /// Seeds hit, but every candidate window lay entirely in padding
    AllTrimmed,
    /// Several distinct candidates share the best mismatch count
    Ambiguous,
    /// Both mates mapped, but to different references
    Discordant,
}

impl Reason {
    /// Severity rank used when two unmapped mates disagree on the reason.
    /// Lower is more specific.
    fn rank(self) -> u8 {
        match self {
            Self::NoSeedHit => 0,
            Self::AllTrimmed => 1,
            Self::Ambiguous => 2,
            Self::Discordant => 3,
        }
    }

    /// Pick the more specific of two reasons
    #[must_use]
    pub fn most_specific(a: Self, b: Self) -> Self {
        if b.rank() < a.rank() {
            b
        } else {
            a
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NoSeedHit => "NO_SEED_HIT",
            Self::AllTrimmed => "ALL_TRIMMED",
            Self::Ambiguous => "AMBIGUOUS",
            Self::Discordant => "DISCORDANT",
        }
    }
}

impl std::fmt::Display for Reason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the two mates of a pair relate after alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PairStatus {
    /// Both mates mapped to the same reference
    Concordant,
    /// Both mates mapped, to different references
    Discordant,
    /// Only the given mate mapped
    HalfMapped(Mate),
    /// Neither mate mapped
    Unmapped,
}

impl PairStatus {
    #[must_use]
    pub fn is_mapped(self) -> bool {
        !matches!(self, Self::Unmapped)
    }
}

impl std::fmt::Display for PairStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Concordant => write!(f, "CONCORDANT"),
            Self::Discordant => write!(f, "DISCORDANT"),
            Self::HalfMapped(mate) => write!(f, "HALF_MAPPED_{mate}"),
            Self::Unmapped => write!(f, "UNMAPPED"),
        }
    }
}
