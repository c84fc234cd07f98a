//! # amplicon-aligner
//!
//! A fast, approximate aligner for amplicon sequencing reads.
//!
//! Amplicon panels have few, short references, and reads that come from them
//! rarely need gapped alignment. `amplicon-aligner` concatenates the references
//! into one padded buffer, indexes every k-mer of it, and places each read by
//! exact seed lookups followed by a mismatch count.
//!
//! ## Features
//!
//! - **Sentinel padding**: references are separated by read-length pad blocks,
//!   so a candidate window can be trimmed back to a single reference
//! - **Deterministic selection**: fewest mismatches wins, ties broken by
//!   position, with remaining ties flagged `AMBIGUOUS`
//! - **Paired-end support**: mates are aligned independently and classified as
//!   concordant, discordant, half-mapped or unmapped
//! - **Parallel alignment**: reads are spread over a worker pool sharing one
//!   read-only index
//! - **Run orchestration**: sample discovery and job submission to SLURM, PBS,
//!   SGE or local background processes
//!
//! ## Example
//!
//! ```rust
//! use amplicon_aligner::{build_reference_index, Aligner, Read, Reference, ReferenceSet};
//!
//! let refs: ReferenceSet = vec![
//!     Reference::new("A", b"ACGTACGT".to_vec()),
//!     Reference::new("B", b"TTTTGGGG".to_vec()),
//! ]
//! .into_iter()
//! .collect();
//!
//! let index = build_reference_index(&refs, 4, 2).unwrap();
//! let aligner = Aligner::new(&index);
//!
//! let result = aligner.align_read(&Read::new("r1", b"TTGG".to_vec())).unwrap();
//! let best = result.best.unwrap();
//! println!("{}:{} ({} mismatches)", best.ref_name, best.ref_offset, best.mismatches);
//! ```
//!
//! ## Modules
//!
//! - [`core`]: Reads, references and outcome codes
//! - [`index`]: Combined reference buffer and k-mer index
//! - [`matching`]: Seeding, trimming, scoring and the aligner front end
//! - [`parsing`]: FASTA/FASTQ parsers and sample discovery
//! - [`dispatch`]: Job submission backends
//! - [`cli`]: Command-line interface implementation

pub mod cli;
pub mod core;
pub mod dispatch;
pub mod index;
pub mod matching;
pub mod parsing;
pub mod utils;

// Re-export commonly used types for convenience
pub use core::read::{Read, ReadInput, ReadPair};
pub use core::reference::{Reference, ReferenceSet};
pub use core::types::*;
pub use index::{build_reference_index, IndexError, ReferenceIndex};
pub use matching::{AlignError, Aligner, AlignmentResult, PoolConfig, SampleResult};
