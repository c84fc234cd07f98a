//! Core data types for amplicon alignment.
//!
//! This module provides the fundamental records used throughout the library:
//!
//! - [`Reference`], [`ReferenceSet`]: Named reference sequences, in concatenation order
//! - [`Read`], [`ReadPair`], [`ReadInput`]: Sequencing reads handed to the aligner
//! - [`Mate`], [`Reason`], [`PairStatus`]: Result classification types
//!
//! [`Reference`]: reference::Reference
//! [`ReferenceSet`]: reference::ReferenceSet
//! [`Read`]: read::Read
//! [`ReadPair`]: read::ReadPair
//! [`ReadInput`]: read::ReadInput
//! [`Mate`]: types::Mate
//! [`Reason`]: types::Reason
//! [`PairStatus`]: types::PairStatus
//!
//! ## Alphabet
//!
//! References are restricted to `A`, `C`, `G`, `T` and `N`. Parsers upper-case
//! sequences before they reach the index. Reads are not validated beyond their
//! length: a base that never occurs in the references simply fails to seed.

pub mod read;
pub mod reference;
pub mod types;
