use std::path::PathBuf;

use clap::Args;

use crate::cli::OutputFormat;
use crate::core::reference::ReferenceSet;
use crate::index::{IndexConfig, ReferenceIndex, DEFAULT_HASH_LENGTH, DEFAULT_READ_LENGTH};
use crate::parsing::fasta;

#[derive(Args)]
pub struct IndexArgs {
    /// Reference FASTA (plain or gzip)
    #[arg(long)]
    pub reference: PathBuf,

    /// Read length the index is built for
    #[arg(long, default_value_t = DEFAULT_READ_LENGTH)]
    pub read_length: usize,

    /// Seed k-mer length
    #[arg(long, default_value_t = DEFAULT_HASH_LENGTH)]
    pub hash_length: usize,

    /// Save the index to this file
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Execute index subcommand
///
/// # Errors
///
/// Returns an error if the FASTA cannot be parsed, the references are invalid,
/// or the index cannot be written.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: IndexArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let references = fasta::parse_fasta_file(&args.reference)?;
    if verbose {
        eprintln!(
            "Loaded {} references ({} bp) from {}",
            references.len(),
            references.total_length(),
            args.reference.display()
        );
    }

    let config = IndexConfig {
        read_length: args.read_length,
        hash_length: args.hash_length,
    };
    let index = ReferenceIndex::build(&references, config)?;

    if let Some(output) = &args.output {
        index.save(output)?;
        if verbose {
            eprintln!("Saved index to {}", output.display());
        }
    }

    match format {
        OutputFormat::Text => print_text(&references, &index),
        OutputFormat::Json => print_json(&references, &index)?,
        OutputFormat::Tsv => print_tsv(&references, &index),
    }

    Ok(())
}

fn print_text(references: &ReferenceSet, index: &ReferenceIndex) {
    let combined = index.combined();
    let stats = index.kmers().stats();

    println!("References: {}", references.len());
    println!("Read length: {}", index.read_length());
    println!("Buffer length: {}", combined.len());

    println!("\nReferences:");
    for (reference, range) in references.iter().zip(combined.ranges()) {
        println!(
            "   {} ({} bp, MD5 {}) [{}, {})",
            reference.name,
            reference.len(),
            reference.md5(),
            range.start,
            range.end
        );
    }

    println!("\nK-mer index:");
    println!("   Hash length: {}", stats.hash_length);
    println!("   Distinct k-mers: {}", stats.distinct_kmers);
    println!("   Total positions: {}", stats.total_positions);
    println!("   Largest position list: {}", stats.max_occurrences);
}

fn print_json(references: &ReferenceSet, index: &ReferenceIndex) -> anyhow::Result<()> {
    let refs: Vec<serde_json::Value> = references
        .iter()
        .zip(index.combined().ranges())
        .map(|(reference, range)| {
            serde_json::json!({
                "name": reference.name,
                "length": reference.len(),
                "md5": reference.md5(),
                "start": range.start,
                "end": range.end,
            })
        })
        .collect();

    let output = serde_json::json!({
        "read_length": index.read_length(),
        "buffer_length": index.combined().len(),
        "references": refs,
        "kmers": index.kmers().stats(),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_tsv(references: &ReferenceSet, index: &ReferenceIndex) {
    println!("name\tlength\tmd5\tstart\tend");
    for (reference, range) in references.iter().zip(index.combined().ranges()) {
        println!(
            "{}\t{}\t{}\t{}\t{}",
            reference.name,
            reference.len(),
            reference.md5(),
            range.start,
            range.end
        );
    }
}
