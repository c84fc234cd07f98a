use std::io::Write;
use std::path::{Path, PathBuf};

use clap::Args;

use crate::cli::{open_output, OutputFormat};
use crate::core::types::Mate;
use crate::index::{ReferenceIndex, DEFAULT_HASH_LENGTH, DEFAULT_READ_LENGTH};
use crate::matching::engine::DEFAULT_CHUNK_SIZE;
use crate::matching::{
    Aligner, AlignmentResult, PoolConfig, ReadAlignment, SampleResult, SampleSummary,
};
use crate::parsing::{fasta, fastq};

#[derive(Args)]
pub struct AlignArgs {
    /// Reference FASTA (plain or gzip)
    #[arg(long, required_unless_present = "index", conflicts_with = "index")]
    pub reference: Option<PathBuf>,

    /// Index file written by `amplicon-aligner index --output`
    #[arg(long)]
    pub index: Option<PathBuf>,

    /// FASTQ with mate 1 reads, or all reads of a single-end sample
    #[arg(long = "r1")]
    pub r1: PathBuf,

    /// FASTQ with mate 2 reads
    #[arg(long = "r2")]
    pub r2: Option<PathBuf>,

    /// Sample name (defaults to the mate 1 file name)
    #[arg(short, long)]
    pub sample: Option<String>,

    /// Length of every read; ignored with --index
    #[arg(long, default_value_t = DEFAULT_READ_LENGTH)]
    pub read_length: usize,

    /// Seed k-mer length; ignored with --index
    #[arg(long, default_value_t = DEFAULT_HASH_LENGTH)]
    pub hash_length: usize,

    /// Worker threads (0 = all cores)
    #[arg(short, long, default_value_t = 0)]
    pub threads: usize,

    /// Reads handed to a worker at a time
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
    pub chunk_size: usize,

    /// Write results here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Execute align subcommand
///
/// # Errors
///
/// Returns an error if the references or reads cannot be loaded, the index
/// cannot be built, or an internal index error aborts the sample.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: AlignArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let index = load_index(&args, verbose)?;
    let sample = args
        .sample
        .clone()
        .unwrap_or_else(|| sample_name_from_path(&args.r1));

    let inputs = match &args.r2 {
        Some(r2) => fastq::read_paired(&sample, &args.r1, r2)?,
        None => fastq::read_single(&args.r1)?,
    };
    if verbose {
        eprintln!("Loaded {} inputs for sample {sample}", inputs.len());
    }

    let pool = PoolConfig {
        threads: args.threads,
        chunk_size: args.chunk_size,
    };
    let results = Aligner::new(&index).align_sample_parallel(&inputs, &pool)?;
    let summary = SampleSummary::from_results(&results);

    if verbose {
        eprintln!(
            "Aligned {} inputs on {} threads: {} mapped, {} unmapped, {} failed",
            summary.total,
            pool.effective_threads(),
            summary.mapped,
            summary.unmapped,
            summary.failed
        );
    }

    let mut out = open_output(args.output.as_deref())?;
    match format {
        OutputFormat::Text => write_text(&mut out, &sample, &summary)?,
        OutputFormat::Json => write_json(&mut out, &sample, &summary, &results)?,
        OutputFormat::Tsv => write_tsv(&mut out, &results)?,
    }
    out.flush()?;

    Ok(())
}

fn load_index(args: &AlignArgs, verbose: bool) -> anyhow::Result<ReferenceIndex> {
    if let Some(path) = &args.index {
        let index = ReferenceIndex::load(path)?;
        if verbose {
            eprintln!(
                "Loaded index {} (read length {}, hash length {})",
                path.display(),
                index.read_length(),
                index.hash_length()
            );
        }
        return Ok(index);
    }

    let Some(reference) = &args.reference else {
        anyhow::bail!("Either --reference or --index is required");
    };
    let references = fasta::parse_fasta_file(reference)?;
    if verbose {
        eprintln!(
            "Loaded {} references from {}",
            references.len(),
            reference.display()
        );
    }
    Ok(crate::index::build_reference_index(
        &references,
        args.read_length,
        args.hash_length,
    )?)
}

/// File name without FASTQ and gzip extensions
fn sample_name_from_path(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    for ext in [".fastq.gz", ".fq.gz", ".fastq", ".fq"] {
        let Some(split) = name.len().checked_sub(ext.len()) else {
            continue;
        };
        if name.get(split..).is_some_and(|tail| tail.eq_ignore_ascii_case(ext)) {
            return name[..split].to_string();
        }
    }
    name
}

fn write_text(out: &mut dyn Write, sample: &str, summary: &SampleSummary) -> anyhow::Result<()> {
    writeln!(out, "Sample: {sample}")?;
    writeln!(out, "Inputs: {}", summary.total)?;
    writeln!(
        out,
        "Mapped: {} ({:.1}%)",
        summary.mapped,
        summary.mapped_fraction() * 100.0
    )?;
    writeln!(out, "Unmapped: {}", summary.unmapped)?;
    if summary.failed > 0 {
        writeln!(out, "Failed: {}", summary.failed)?;
    }

    if !summary.reasons.is_empty() {
        writeln!(out, "\nReasons:")?;
        for (reason, count) in &summary.reasons {
            writeln!(out, "   {reason}: {count}")?;
        }
    }
    if !summary.per_reference.is_empty() {
        writeln!(out, "\nReads per reference:")?;
        for (name, count) in &summary.per_reference {
            writeln!(out, "   {name}: {count}")?;
        }
    }
    if !summary.pair_statuses.is_empty() {
        writeln!(out, "\nPair status:")?;
        for (status, count) in &summary.pair_statuses {
            writeln!(out, "   {status}: {count}")?;
        }
    }
    Ok(())
}

fn write_json(
    out: &mut dyn Write,
    sample: &str,
    summary: &SampleSummary,
    results: &[SampleResult],
) -> anyhow::Result<()> {
    let entries: Vec<serde_json::Value> = results
        .iter()
        .map(|r| match &r.outcome {
            Ok(result) => serde_json::json!({ "index": r.index, "result": result }),
            Err(err) => serde_json::json!({ "index": r.index, "error": err.to_string() }),
        })
        .collect();

    let output = serde_json::json!({
        "sample": sample,
        "summary": summary,
        "results": entries,
    });
    writeln!(out, "{}", serde_json::to_string_pretty(&output)?)?;
    Ok(())
}

const TSV_HEADER: &str =
    "read_id\tmapped\tref_name\tref_offset\tmismatches\ttrim_start\ttrim_end\treason";

/// One row per read; pairs get a row per mate plus `mate` and `pair_status`.
/// Inputs that failed are left out.
pub(crate) fn write_tsv(out: &mut dyn Write, results: &[SampleResult]) -> anyhow::Result<()> {
    let paired = results
        .iter()
        .any(|r| matches!(r.outcome, Ok(AlignmentResult::Paired(_))));

    if paired {
        writeln!(out, "{TSV_HEADER}\tmate\tpair_status")?;
    } else {
        writeln!(out, "{TSV_HEADER}")?;
    }

    for result in results {
        match &result.outcome {
            Ok(AlignmentResult::Single(read)) if paired => {
                writeln!(out, "{}\t.\t.", tsv_fields(read))?;
            }
            Ok(AlignmentResult::Single(read)) => writeln!(out, "{}", tsv_fields(read))?,
            Ok(AlignmentResult::Paired(pair)) => {
                for mate in [Mate::First, Mate::Second] {
                    writeln!(
                        out,
                        "{}\t{mate}\t{}",
                        tsv_fields(pair.mate(mate)),
                        pair.status
                    )?;
                }
            }
            Err(_) => {}
        }
    }
    Ok(())
}

fn tsv_fields(read: &ReadAlignment) -> String {
    let reason = read.reason.map_or_else(|| ".".to_string(), |r| r.to_string());
    match &read.best {
        Some(best) => format!(
            "{}\ttrue\t{}\t{}\t{}\t{}\t{}\t{reason}",
            read.read_id,
            best.ref_name,
            best.ref_offset,
            best.mismatches,
            best.trimmed_start,
            best.trimmed_end
        ),
        None => format!("{}\tfalse\t.\t.\t.\t.\t.\t{reason}", read.read_id),
    }
}
