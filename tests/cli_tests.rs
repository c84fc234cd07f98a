//! Command-line tests that run the built `amplicon-aligner` binary against
//! small FASTA/FASTQ fixtures.

use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const REFERENCE: &str = ">A\nACGTACGT\n>B\nTTTTGGGG\n";

fn fixture(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).expect("Failed to write fixture");
    path
}

fn aligner() -> Command {
    Command::cargo_bin("amplicon-aligner").expect("binary is built")
}

/// `index` reports the padded layout of the combined buffer
#[test]
fn test_index_text_output() {
    let dir = TempDir::new().unwrap();
    let fa = fixture(&dir, "ref.fa", REFERENCE);

    aligner()
        .args(["index", "--read-length", "4", "--hash-length", "2", "--reference"])
        .arg(&fa)
        .assert()
        .success()
        .stdout(predicate::str::contains("References: 2"))
        .stdout(predicate::str::contains("Buffer length: 24"))
        .stdout(predicate::str::contains("A (8 bp, MD5"))
        .stdout(predicate::str::contains("[12, 20)"));
}

/// A k-mer longer than the reads is rejected before any alignment
#[test]
fn test_invalid_hash_length_fails() {
    let dir = TempDir::new().unwrap();
    let fa = fixture(&dir, "ref.fa", REFERENCE);
    let fq = fixture(&dir, "S1.fq", "@r1\nACGT\n+\nIIII\n");

    aligner()
        .args(["align", "--read-length", "4", "--hash-length", "5", "--reference"])
        .arg(&fa)
        .arg("--r1")
        .arg(&fq)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid hash length 5"));
}

/// References with characters outside ACGTN are rejected
#[test]
fn test_invalid_reference_fails() {
    let dir = TempDir::new().unwrap();
    let fa = fixture(&dir, "ref.fa", ">bad\nACGRT\n");

    aligner()
        .args(["index", "--read-length", "4", "--hash-length", "2", "--reference"])
        .arg(&fa)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid reference 'bad'"));
}

/// Single-end TSV output, one row per read
#[test]
fn test_align_single_end_tsv() {
    let dir = TempDir::new().unwrap();
    let fa = fixture(&dir, "ref.fa", REFERENCE);
    let fq = fixture(
        &dir,
        "S1.fq",
        "@r1\nCGTA\n+\nIIII\n@r2\nZZZZ\n+\nIIII\n@r3\nTTGG\n+\nIIII\n",
    );

    aligner()
        .args(["--format", "tsv", "align", "--read-length", "4", "--hash-length", "2"])
        .arg("--reference")
        .arg(&fa)
        .arg("--r1")
        .arg(&fq)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("read_id\tmapped\tref_name"))
        .stdout(predicate::str::contains("r1\ttrue\tA\t1\t0\t0\t0\t."))
        .stdout(predicate::str::contains("r2\tfalse\t.\t.\t.\t.\t.\tNO_SEED_HIT"))
        .stdout(predicate::str::contains("r3\ttrue\tB\t2\t0\t0\t0\t."));
}

/// Paired input with a saved index and the text summary
#[test]
fn test_align_paired_with_saved_index() {
    let dir = TempDir::new().unwrap();
    let fa = fixture(&dir, "ref.fa", REFERENCE);
    let r1 = fixture(&dir, "S1_R1.fq", "@p1\nTTGG\n+\nIIII\n@p2\nCGTA\n+\nIIII\n");
    let r2 = fixture(&dir, "S1_R2.fq", "@p1\nZZZZ\n+\nIIII\n@p2\nGTAC\n+\nIIII\n");
    let index = dir.path().join("ref.aidx");

    aligner()
        .args(["index", "--read-length", "4", "--hash-length", "2", "--reference"])
        .arg(&fa)
        .arg("--output")
        .arg(&index)
        .assert()
        .success();
    assert!(index.exists());

    aligner()
        .args(["align", "--sample", "S1", "--threads", "2", "--index"])
        .arg(&index)
        .arg("--r1")
        .arg(&r1)
        .arg("--r2")
        .arg(&r2)
        .assert()
        .success()
        .stdout(predicate::str::contains("Sample: S1"))
        .stdout(predicate::str::contains("Inputs: 2"))
        .stdout(predicate::str::contains("Pair status:"))
        .stdout(predicate::str::contains("HALF_MAPPED_1: 1"));
}

/// Mate files with different record counts are an error
#[test]
fn test_align_mate_count_mismatch() {
    let dir = TempDir::new().unwrap();
    let fa = fixture(&dir, "ref.fa", REFERENCE);
    let r1 = fixture(&dir, "S1_R1.fq", "@p1\nTTGG\n+\nIIII\n@p2\nCGTA\n+\nIIII\n");
    let r2 = fixture(&dir, "S1_R2.fq", "@p1\nZZZZ\n+\nIIII\n");

    aligner()
        .args(["align", "--read-length", "4", "--hash-length", "2", "--reference"])
        .arg(&fa)
        .arg("--r1")
        .arg(&r1)
        .arg("--r2")
        .arg(&r2)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Mate files differ in record count"));
}

/// `--reference` and `--index` cannot be combined
#[test]
fn test_align_reference_conflicts_with_index() {
    aligner()
        .args([
            "align",
            "--reference",
            "ref.fa",
            "--index",
            "ref.aidx",
            "--r1",
            "reads.fq",
        ])
        .assert()
        .failure();
}

/// Discovery pairs mate files and reports empty ones
#[test]
fn test_discover_tsv() {
    let dir = TempDir::new().unwrap();
    fixture(&dir, "S1_R1.fq", "@p1\nTTGG\n+\nIIII\n");
    fixture(&dir, "S1_R2.fq", "@p1\nCCAA\n+\nIIII\n");
    fixture(&dir, "S2.fq", "");

    aligner()
        .args(["--format", "tsv", "discover"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("S1\tpaired"))
        .stdout(predicate::str::contains("S2\tempty"));
}

/// A dry run prints one align command per sample and writes nothing
#[test]
fn test_dispatch_dry_run() {
    let dir = TempDir::new().unwrap();
    let fa = fixture(&dir, "ref.fa", REFERENCE);
    let reads = dir.path().join("reads");
    fs::create_dir(&reads).unwrap();
    fs::write(reads.join("S1_R1.fq"), "@p1\nTTGG\n+\nIIII\n").unwrap();
    fs::write(reads.join("S1_R2.fq"), "@p1\nCCAA\n+\nIIII\n").unwrap();
    let out = dir.path().join("out");

    aligner()
        .args(["dispatch", "--job-manager", "slurm", "--dry-run"])
        .args(["--read-length", "4", "--hash-length", "2"])
        .arg("--reference")
        .arg(&fa)
        .arg("--read-dir")
        .arg(&reads)
        .arg("--out-dir")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("S1: "))
        .stdout(predicate::str::contains("align --index"))
        .stdout(predicate::str::contains("--sample S1"));

    assert!(!out.exists());
}

/// Dispatch refuses to start when the references are invalid
#[test]
fn test_dispatch_validates_references() {
    let dir = TempDir::new().unwrap();
    let fa = fixture(&dir, "ref.fa", ">bad\nACGRT\n");
    let reads = dir.path().join("reads");
    fs::create_dir(&reads).unwrap();
    fs::write(reads.join("S1.fq"), "@r1\nTTGG\n+\nIIII\n").unwrap();

    aligner()
        .args(["dispatch", "--dry-run", "--read-length", "4", "--hash-length", "2"])
        .arg("--reference")
        .arg(&fa)
        .arg("--read-dir")
        .arg(&reads)
        .arg("--out-dir")
        .arg(dir.path().join("out"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid reference"));
}
