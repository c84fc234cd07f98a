//! Command-line interface for amplicon-aligner.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **align**: Align one sample's reads against a reference FASTA or a saved index
//! - **index**: Build (and optionally save) a reference index and report on it
//! - **discover**: List the samples found in a directory of read files
//! - **dispatch**: Submit one `align` job per sample to a scheduler or locally
//!
//! ## Usage
//!
//! ```text
//! # Align a paired-end sample
//! amplicon-aligner align --reference amplicons.fa --r1 S1_R1.fq.gz --r2 S1_R2.fq.gz --sample S1
//!
//! # TSV for downstream tools
//! amplicon-aligner --format tsv align --reference amplicons.fa --r1 S1.fq --read-length 151
//!
//! # Build once, align many times
//! amplicon-aligner index --reference amplicons.fa --output amplicons.aidx
//! amplicon-aligner align --index amplicons.aidx --r1 S1.fq
//!
//! # Align a whole run on SLURM
//! amplicon-aligner dispatch --read-dir run/ --reference amplicons.fa --out-dir out/ --job-manager slurm
//! ```

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use clap::{Parser, Subcommand};

pub mod align;
pub mod discover;
pub mod dispatch;
pub mod index;

#[derive(Parser)]
#[command(name = "amplicon-aligner")]
#[command(version)]
#[command(about = "Fast k-mer seed aligner for amplicon sequencing reads")]
#[command(
    long_about = "amplicon-aligner maps short single- or paired-end reads against a small panel of amplicon references.\n\nReads are seeded with exact k-mer lookups, candidate windows are trimmed at reference boundaries and scored by mismatch count. No gapped alignment is performed."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Align a sample's reads against the references
    Align(align::AlignArgs),

    /// Build a reference index and report on it
    Index(index::IndexArgs),

    /// List samples discovered in a read directory
    Discover(discover::DiscoverArgs),

    /// Submit one alignment job per sample
    Dispatch(dispatch::DispatchArgs),
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Tsv,
}

/// Run the parsed command
///
/// # Errors
///
/// Returns whatever error the subcommand fails with.
pub fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Align(args) => align::run(args, cli.format, cli.verbose),
        Commands::Index(args) => index::run(args, cli.format, cli.verbose),
        Commands::Discover(args) => discover::run(args, cli.format, cli.verbose),
        Commands::Dispatch(args) => dispatch::run(args, cli.format, cli.verbose),
    }
}

/// Buffered writer for `path`, or stdout when none is given
pub(crate) fn open_output(path: Option<&Path>) -> anyhow::Result<Box<dyn Write>> {
    match path {
        Some(path) => {
            let file = File::create(path)
                .map_err(|e| anyhow::anyhow!("Failed to create {}: {e}", path.display()))?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(BufWriter::new(io::stdout().lock()))),
    }
}
