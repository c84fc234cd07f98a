use std::path::PathBuf;

use clap::Args;

use crate::cli::OutputFormat;
use crate::parsing::samples::{discover_samples, Sample, SampleFiles};

#[derive(Args)]
pub struct DiscoverArgs {
    /// Directory containing FASTQ files
    #[arg(required = true)]
    pub dir: PathBuf,
}

/// Execute discover subcommand
///
/// # Errors
///
/// Returns an error if the directory cannot be read.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: DiscoverArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let samples = discover_samples(&args.dir)?;

    if verbose {
        let empty = samples.iter().filter(|s| s.is_empty()).count();
        eprintln!(
            "Found {} samples in {} ({empty} empty)",
            samples.len(),
            args.dir.display()
        );
    }

    match format {
        OutputFormat::Text => print_text(&samples),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&samples)?),
        OutputFormat::Tsv => print_tsv(&samples),
    }

    Ok(())
}

pub(crate) fn layout_name(files: &SampleFiles) -> &'static str {
    match files {
        SampleFiles::Merged { .. } => "merged",
        SampleFiles::Single { .. } => "single",
        SampleFiles::Paired { .. } => "paired",
        SampleFiles::Empty { .. } => "empty",
    }
}

fn print_text(samples: &[Sample]) {
    if samples.is_empty() {
        println!("No samples found.");
        return;
    }

    for sample in samples {
        println!("{} ({})", sample.name, layout_name(&sample.files));
        for path in sample.paths() {
            println!("   {}", path.display());
        }
    }
}

fn print_tsv(samples: &[Sample]) {
    println!("sample\tlayout\tr1\tr2");
    for sample in samples {
        let paths = sample.paths();
        let r2 = paths
            .get(1)
            .map_or_else(|| ".".to_string(), |p| p.display().to_string());
        println!(
            "{}\t{}\t{}\t{r2}",
            sample.name,
            layout_name(&sample.files),
            paths[0].display()
        );
    }
}
