use std::io::Write;
use std::process::{Command, Stdio};

use regex::Regex;
use tracing::{debug, info, warn};

use crate::dispatch::{Dependency, DispatchError, JobHandle, JobManager, JobResources, JobSubmitter};

/// Submits jobs to SLURM, PBS or SGE through their command-line tools
#[derive(Debug, Clone, Copy)]
pub struct ClusterSubmitter {
    manager: JobManager,
}

impl ClusterSubmitter {
    #[must_use]
    pub fn new(manager: JobManager) -> Self {
        Self { manager }
    }

    /// Program and arguments that submit `command`.
    ///
    /// For PBS and SGE the command itself is written to the program's stdin.
    #[must_use]
    pub fn submit_command(
        &self,
        command: &str,
        resources: &JobResources,
        dependency: Option<&Dependency>,
    ) -> (&'static str, Vec<String>) {
        match self.manager {
            JobManager::Slurm => ("sbatch", slurm_args(command, resources, dependency)),
            JobManager::Pbs => ("qsub", pbs_args(resources, dependency)),
            // submitter_for never builds a cluster submitter for local jobs
            JobManager::Sge | JobManager::Local => ("qsub", sge_args(resources, dependency)),
        }
    }

    fn uses_stdin(&self) -> bool {
        !matches!(self.manager, JobManager::Slurm)
    }
}

impl JobSubmitter for ClusterSubmitter {
    fn submit(
        &self,
        command: &str,
        resources: &JobResources,
        dependency: Option<&Dependency>,
    ) -> Result<JobHandle, DispatchError> {
        let (program, args) = self.submit_command(command, resources, dependency);
        debug!("submit command = {program} {}", args.join(" "));

        let spawn_error = |source| DispatchError::Spawn {
            program: program.to_string(),
            source,
        };

        let mut child = Command::new(program)
            .args(&args)
            .stdin(if self.uses_stdin() { Stdio::piped() } else { Stdio::null() })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(spawn_error)?;

        if self.uses_stdin() {
            if let Some(mut stdin) = child.stdin.take() {
                writeln!(stdin, "{command}")?;
            }
        }

        let output = child.wait_with_output().map_err(spawn_error)?;
        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));
        debug!("output = {}", text.trim());

        match parse_job_id(self.manager, &text) {
            Some(id) => {
                info!("jobid = {id}");
                Ok(JobHandle {
                    manager: self.manager,
                    id,
                })
            }
            None => {
                warn!("Job not submitted!!");
                Err(DispatchError::NotSubmitted {
                    output: text.trim().to_string(),
                })
            }
        }
    }
}

/// `sbatch` arguments; the command is passed with `--wrap`
#[must_use]
pub fn slurm_args(
    command: &str,
    resources: &JobResources,
    dependency: Option<&Dependency>,
) -> Vec<String> {
    let mut args = vec![
        "-D".to_string(),
        resources.work_dir.display().to_string(),
        format!("-c{}", resources.cpus),
        format!("--mem={}000", resources.memory_gb),
        "--mail-type=FAIL".to_string(),
        "-J".to_string(),
        resources.name.clone(),
    ];
    if let Some(dep) = dependency.filter(|d| !d.job_ids.is_empty()) {
        args.push("-d".to_string());
        args.push(dep.to_scheduler_string());
    }
    if let Some(queue) = &resources.queue {
        args.push("-p".to_string());
        args.push(queue.clone());
    }
    args.extend(resources.extra_args.iter().cloned());
    if resources.hold {
        args.push("-H".to_string());
    }
    if resources.notify {
        args.push("--mail-type=END".to_string());
    }
    args.push(format!("--wrap={command}"));
    args
}

/// PBS `qsub` arguments; the command is read from stdin
#[must_use]
pub fn pbs_args(resources: &JobResources, dependency: Option<&Dependency>) -> Vec<String> {
    let work_dir = resources.work_dir.display().to_string();
    let mut args = vec![
        "-V".to_string(),
        "-d".to_string(),
        work_dir.clone(),
        "-w".to_string(),
        work_dir,
        "-l".to_string(),
        format!(
            "ncpus={},mem={}gb,walltime={}:00:00",
            resources.cpus, resources.memory_gb, resources.walltime_hours
        ),
        "-m".to_string(),
        "a".to_string(),
        "-N".to_string(),
        resources.name.clone(),
    ];
    if let Some(dep) = dependency.filter(|d| !d.job_ids.is_empty()) {
        args.push("-W".to_string());
        args.push(format!("depend={}", dep.to_scheduler_string()));
    }
    push_common_tail(&mut args, resources);
    args
}

/// SGE `qsub` arguments; the command is read from stdin.
///
/// SGE has no per-job CPU request here; the queue decides.
#[must_use]
pub fn sge_args(resources: &JobResources, dependency: Option<&Dependency>) -> Vec<String> {
    let mut args = vec![
        "-V".to_string(),
        "-cwd".to_string(),
        "-wd".to_string(),
        resources.work_dir.display().to_string(),
        "-l".to_string(),
        format!(
            "h_data={},h_rt={}:00:00",
            u64::from(resources.memory_gb) * 1024 * 1024,
            resources.walltime_hours
        ),
        "-m".to_string(),
        "a".to_string(),
        "-N".to_string(),
        resources.name.clone(),
    ];
    if let Some(dep) = dependency.filter(|d| !d.job_ids.is_empty()) {
        args.push("-hold_jid".to_string());
        args.push(dep.job_ids.join(","));
    }
    push_common_tail(&mut args, resources);
    args
}

/// Queue, extra args, hold and notify flags, then `-` for stdin
fn push_common_tail(args: &mut Vec<String>, resources: &JobResources) {
    if let Some(queue) = &resources.queue {
        args.push("-q".to_string());
        args.push(queue.clone());
    }
    args.extend(resources.extra_args.iter().cloned());
    if resources.hold {
        args.push("-h".to_string());
    }
    if resources.notify {
        args.push("-m".to_string());
        args.push("e".to_string());
    }
    args.push("-".to_string());
}

/// Extract the job id from a submission program's output
#[must_use]
pub fn parse_job_id(manager: JobManager, output: &str) -> Option<String> {
    let pattern = match manager {
        JobManager::Slurm => r"(?m)^Submitted batch job (\d+)\s*$",
        JobManager::Pbs => r"(?m)^(\d+)\.",
        // SGE prints `Your job N ("name") has been submitted`
        JobManager::Sge => r#"(?m)^(?:Your job (\d+) |(\d+)\.)"#,
        JobManager::Local => r"^(\d+)$",
    };
    let re = Regex::new(pattern).ok()?;
    let caps = re.captures(output.trim())?;
    caps.iter()
        .skip(1)
        .flatten()
        .next()
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::DependencyKind;
    use std::path::PathBuf;

    fn resources() -> JobResources {
        JobResources {
            name: "align_S1".to_string(),
            work_dir: PathBuf::from("/scratch/run"),
            ..JobResources::default()
        }
    }

    #[test]
    fn test_slurm_args() {
        let args = slurm_args("amplicon-aligner align --sample S1", &resources(), None);
        assert_eq!(
            args,
            vec![
                "-D",
                "/scratch/run",
                "-c2",
                "--mem=8000",
                "--mail-type=FAIL",
                "-J",
                "align_S1",
                "--wrap=amplicon-aligner align --sample S1",
            ]
        );
    }

    #[test]
    fn test_slurm_args_with_options() {
        let mut res = resources();
        res.queue = Some("short".to_string());
        res.hold = true;
        res.notify = true;
        let dep = Dependency::after_ok(vec!["100".to_string(), "101".to_string()]);

        let args = slurm_args("true", &res, Some(&dep));
        let joined = args.join(" ");
        assert!(joined.contains("-d afterok:100:101 -p short -H --mail-type=END --wrap=true"));
    }

    #[test]
    fn test_pbs_args() {
        let mut res = resources();
        res.notify = true;
        let dep = Dependency {
            job_ids: vec!["55".to_string()],
            kind: DependencyKind::Afterany,
        };

        let args = pbs_args(&res, Some(&dep));
        assert_eq!(
            args.join(" "),
            "-V -d /scratch/run -w /scratch/run -l ncpus=2,mem=8gb,walltime=24:00:00 \
             -m a -N align_S1 -W depend=afterany:55 -m e -"
        );
    }

    #[test]
    fn test_sge_args() {
        let mut res = resources();
        res.queue = Some("all.q".to_string());
        res.hold = true;
        let dep = Dependency::after_ok(vec!["1".to_string(), "2".to_string()]);

        let args = sge_args(&res, Some(&dep));
        assert_eq!(
            args.join(" "),
            "-V -cwd -wd /scratch/run -l h_data=8388608,h_rt=24:00:00 \
             -m a -N align_S1 -hold_jid 1,2 -q all.q -h -"
        );
    }

    #[test]
    fn test_empty_dependency_is_ignored() {
        let dep = Dependency::after_ok(Vec::new());
        assert!(!slurm_args("true", &resources(), Some(&dep)).contains(&"-d".to_string()));
    }

    #[test]
    fn test_parse_job_id() {
        assert_eq!(
            parse_job_id(JobManager::Slurm, "Submitted batch job 123456\n"),
            Some("123456".to_string())
        );
        assert_eq!(
            parse_job_id(JobManager::Pbs, "4242.pbs-server.cluster\n"),
            Some("4242".to_string())
        );
        assert_eq!(
            parse_job_id(JobManager::Sge, "Your job 77 (\"align_S1\") has been submitted"),
            Some("77".to_string())
        );
        assert_eq!(parse_job_id(JobManager::Sge, "78.1-10:1"), Some("78".to_string()));
        assert_eq!(parse_job_id(JobManager::Slurm, "sbatch: error: invalid partition"), None);
        assert_eq!(parse_job_id(JobManager::Pbs, "qsub: Unknown queue"), None);
    }

    #[test]
    fn test_submit_command_program() {
        let submitter = ClusterSubmitter::new(JobManager::Sge);
        let (program, args) = submitter.submit_command("true", &resources(), None);
        assert_eq!(program, "qsub");
        assert_eq!(args.last().map(String::as_str), Some("-"));
    }
}
