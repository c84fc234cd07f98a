use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;

use crate::cli::discover::layout_name;
use crate::cli::OutputFormat;
use crate::dispatch::{
    submitter_for, JobManager, JobResources, DEFAULT_CPUS, DEFAULT_MEMORY_GB,
    DEFAULT_WALLTIME_HOURS,
};
use crate::index::{build_reference_index, DEFAULT_HASH_LENGTH, DEFAULT_READ_LENGTH};
use crate::parsing::fasta;
use crate::parsing::samples::{discover_samples, Sample, SampleFiles};

/// File name of the shared index written into the output directory
pub const INDEX_FILE_NAME: &str = "reference.aidx";

#[derive(Args)]
pub struct DispatchArgs {
    /// Directory containing FASTQ files
    #[arg(long)]
    pub read_dir: PathBuf,

    /// Reference FASTA (plain or gzip)
    #[arg(long)]
    pub reference: PathBuf,

    /// Directory for the shared index, job logs and per-sample results
    #[arg(long)]
    pub out_dir: PathBuf,

    /// Scheduler to submit to
    #[arg(short, long, value_enum, default_value = "local")]
    pub job_manager: JobManager,

    /// Length of every read
    #[arg(long, default_value_t = DEFAULT_READ_LENGTH)]
    pub read_length: usize,

    /// Seed k-mer length
    #[arg(long, default_value_t = DEFAULT_HASH_LENGTH)]
    pub hash_length: usize,

    /// CPUs per job (also the aligner thread count)
    #[arg(long, default_value_t = DEFAULT_CPUS)]
    pub cpus: u32,

    /// Memory per job in GB
    #[arg(long, default_value_t = DEFAULT_MEMORY_GB)]
    pub memory: u32,

    /// Walltime per job in hours
    #[arg(long, default_value_t = DEFAULT_WALLTIME_HOURS)]
    pub walltime: u32,

    /// Queue or partition
    #[arg(short, long)]
    pub queue: Option<String>,

    /// Submit jobs in a held state
    #[arg(long)]
    pub hold: bool,

    /// Mail when jobs end
    #[arg(long)]
    pub notify: bool,

    /// Print the job commands without submitting
    #[arg(long)]
    pub dry_run: bool,
}

/// Execute dispatch subcommand
///
/// # Errors
///
/// Returns an error if the references are invalid, the read directory cannot
/// be scanned, or a job cannot be submitted.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: DispatchArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    // Validate the references once, before anything is submitted
    let references = fasta::parse_fasta_file(&args.reference)?;
    let index = build_reference_index(&references, args.read_length, args.hash_length)?;

    let samples = discover_samples(&args.read_dir)?;
    let runnable: Vec<&Sample> = samples.iter().filter(|s| !s.is_empty()).collect();
    if runnable.is_empty() {
        eprintln!("Warning: No read files with data in {}", args.read_dir.display());
        return Ok(());
    }

    let out_dir = absolute(&args.out_dir)?;
    let index_path = out_dir.join(INDEX_FILE_NAME);
    if !args.dry_run {
        fs::create_dir_all(&out_dir)?;
        index.save(&index_path)?;
        if verbose {
            eprintln!("Saved index to {}", index_path.display());
        }
    }

    let exe = std::env::current_exe()
        .map_or_else(|_| "amplicon-aligner".to_string(), |p| p.display().to_string());
    let submitter = submitter_for(args.job_manager);

    let mut submitted = Vec::with_capacity(runnable.len());
    for sample in runnable {
        let command = align_command(&exe, &index_path, &out_dir, sample, args.cpus);
        let resources = JobResources {
            name: format!("align_{}", sample.name),
            work_dir: out_dir.clone(),
            cpus: args.cpus,
            memory_gb: args.memory,
            walltime_hours: args.walltime,
            queue: args.queue.clone(),
            extra_args: Vec::new(),
            hold: args.hold,
            notify: args.notify,
        };

        let job = if args.dry_run {
            None
        } else {
            let handle = submitter.submit(&command, &resources, None)?;
            if verbose {
                eprintln!("Submitted {} as {handle}", sample.name);
            }
            Some(handle.id)
        };
        submitted.push((sample, command, job));
    }

    match format {
        OutputFormat::Text => {
            for (sample, command, job) in &submitted {
                match job {
                    Some(id) => println!(
                        "{} ({}): {} job {id}",
                        sample.name,
                        layout_name(&sample.files),
                        args.job_manager
                    ),
                    None => println!("{}: {command}", sample.name),
                }
            }
        }
        OutputFormat::Json => {
            let output: Vec<serde_json::Value> = submitted
                .iter()
                .map(|(sample, command, job)| {
                    serde_json::json!({
                        "sample": sample.name,
                        "layout": layout_name(&sample.files),
                        "command": command,
                        "job_id": job,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Tsv => {
            println!("sample\tlayout\tjob_id\tcommand");
            for (sample, command, job) in &submitted {
                println!(
                    "{}\t{}\t{}\t{command}",
                    sample.name,
                    layout_name(&sample.files),
                    job.as_deref().unwrap_or(".")
                );
            }
        }
    }

    Ok(())
}

fn absolute(path: &Path) -> anyhow::Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

/// Shell command that aligns one sample against the saved index
pub(crate) fn align_command(
    exe: &str,
    index_path: &Path,
    out_dir: &Path,
    sample: &Sample,
    threads: u32,
) -> String {
    let mut parts = vec![
        shell_quote(exe),
        "--format".to_string(),
        "tsv".to_string(),
        "align".to_string(),
        "--index".to_string(),
        shell_quote(&index_path.display().to_string()),
    ];

    let (r1, r2) = match &sample.files {
        SampleFiles::Paired { first, second } => (first, Some(second)),
        SampleFiles::Merged { path } | SampleFiles::Single { path } | SampleFiles::Empty { path } => {
            (path, None)
        }
    };
    parts.push("--r1".to_string());
    parts.push(shell_quote(&r1.display().to_string()));
    if let Some(r2) = r2 {
        parts.push("--r2".to_string());
        parts.push(shell_quote(&r2.display().to_string()));
    }

    let output = out_dir.join(format!("{}.tsv", sample.name));
    parts.extend([
        "--sample".to_string(),
        shell_quote(&sample.name),
        "--threads".to_string(),
        threads.to_string(),
        "--output".to_string(),
        shell_quote(&output.display().to_string()),
    ]);
    parts.join(" ")
}

/// Quote a word for `sh` unless it is made of safe characters only
pub(crate) fn shell_quote(word: &str) -> String {
    let safe = !word.is_empty()
        && word
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b"-_./:=+,@".contains(&b));
    if safe {
        word.to_string()
    } else {
        format!("'{}'", word.replace('\'', r"'\''"))
    }
}
