//! Job submission to batch schedulers or local background processes.
//!
//! The aligner itself never submits anything; the CLI `dispatch` command uses
//! a [`JobSubmitter`] to run one `align` job per sample.
//!
//! - [`cluster`]: SLURM (`sbatch`), PBS (`qsub`) and SGE (`qsub`)
//! - [`local`]: a detached `sh -c` process that waits for its dependencies and
//!   for enough free memory before running

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

pub mod cluster;
pub mod local;

pub use cluster::ClusterSubmitter;
pub use local::LocalSubmitter;

/// Default CPUs requested per job
pub const DEFAULT_CPUS: u32 = 2;

/// Default memory requested per job, in GB
pub const DEFAULT_MEMORY_GB: u32 = 8;

/// Default walltime per job, in hours
pub const DEFAULT_WALLTIME_HOURS: u32 = 24;

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Job not submitted: {output}")]
    NotSubmitted { output: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Where jobs are run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum JobManager {
    Slurm,
    Pbs,
    Sge,
    Local,
}

impl fmt::Display for JobManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Slurm => "SLURM",
            Self::Pbs => "PBS",
            Self::Sge => "SGE",
            Self::Local => "local",
        };
        f.write_str(name)
    }
}

/// Resources and options for one job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobResources {
    /// Job name; also names the local output log
    pub name: String,
    pub work_dir: PathBuf,
    pub cpus: u32,
    pub memory_gb: u32,
    pub walltime_hours: u32,
    pub queue: Option<String>,
    /// Passed through to the scheduler verbatim
    pub extra_args: Vec<String>,
    /// Submit in a held state
    pub hold: bool,
    /// Mail on completion as well as on failure
    pub notify: bool,
}

impl Default for JobResources {
    fn default() -> Self {
        Self {
            name: "amplicon_aligner".to_string(),
            work_dir: PathBuf::from("."),
            cpus: DEFAULT_CPUS,
            memory_gb: DEFAULT_MEMORY_GB,
            walltime_hours: DEFAULT_WALLTIME_HOURS,
            queue: None,
            extra_args: Vec::new(),
            hold: false,
            notify: false,
        }
    }
}

/// Condition a dependent job waits for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DependencyKind {
    #[default]
    Afterok,
    Afterany,
    Afternotok,
    After,
}

impl fmt::Display for DependencyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Afterok => "afterok",
            Self::Afterany => "afterany",
            Self::Afternotok => "afternotok",
            Self::After => "after",
        };
        f.write_str(name)
    }
}

/// Jobs that must finish before a new one starts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    pub job_ids: Vec<String>,
    pub kind: DependencyKind,
}

impl Dependency {
    /// Wait for `job_ids` to finish successfully
    #[must_use]
    pub fn after_ok(job_ids: Vec<String>) -> Self {
        Self {
            job_ids,
            kind: DependencyKind::Afterok,
        }
    }

    /// `kind:id1:id2...` as SLURM and PBS expect
    #[must_use]
    pub fn to_scheduler_string(&self) -> String {
        format!("{}:{}", self.kind, self.job_ids.join(":"))
    }
}

/// A submitted job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobHandle {
    pub manager: JobManager,
    /// Scheduler job id, or process id for local jobs
    pub id: String,
}

impl fmt::Display for JobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} job {}", self.manager, self.id)
    }
}

/// Submits a shell command as a job
pub trait JobSubmitter {
    /// Submit `command` with the given resources, optionally after other jobs.
    ///
    /// # Errors
    ///
    /// Returns `DispatchError` if the submission program cannot be run or its
    /// output does not contain a job id.
    fn submit(
        &self,
        command: &str,
        resources: &JobResources,
        dependency: Option<&Dependency>,
    ) -> Result<JobHandle, DispatchError>;
}

/// Submitter for the given job manager
#[must_use]
pub fn submitter_for(manager: JobManager) -> Box<dyn JobSubmitter> {
    match manager {
        JobManager::Local => Box::new(LocalSubmitter),
        cluster => Box::new(ClusterSubmitter::new(cluster)),
    }
}
