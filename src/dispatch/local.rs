use std::fs::{self, File};
use std::process::{Command, Stdio};

use tracing::{debug, info};

use crate::dispatch::{Dependency, DispatchError, JobHandle, JobManager, JobResources, JobSubmitter};

/// Free memory required per requested GB, in MB
pub const MB_PER_REQUESTED_GB: u64 = 750;

/// Seconds between dependency and memory polls
const POLL_SECONDS: u32 = 300;

/// Runs jobs as detached background shells on this machine
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalSubmitter;

impl JobSubmitter for LocalSubmitter {
    fn submit(
        &self,
        command: &str,
        resources: &JobResources,
        dependency: Option<&Dependency>,
    ) -> Result<JobHandle, DispatchError> {
        let total_gb = fs::read_to_string("/proc/meminfo")
            .ok()
            .and_then(|meminfo| parse_mem_total_gb(&meminfo));
        let script = build_script(command, resources, dependency, total_gb);
        debug!("submit command = {script}");

        let log_path = resources.work_dir.join(format!("{}.out", resources.name));
        let log = File::create(&log_path)?;
        let log_err = log.try_clone()?;

        let child = Command::new("sh")
            .arg("-c")
            .arg(&script)
            .current_dir(&resources.work_dir)
            .stdin(Stdio::null())
            .stdout(log)
            .stderr(log_err)
            .spawn()
            .map_err(|source| DispatchError::Spawn {
                program: "sh".to_string(),
                source,
            })?;

        let id = child.id().to_string();
        info!("jobid = {id}");
        Ok(JobHandle {
            manager: JobManager::Local,
            id,
        })
    }
}

/// Shell script that waits for `dependency` pids to exit, then for enough
/// available memory, then runs `command`.
///
/// The memory request is clamped to `total_memory_gb` when known, so a job
/// asking for more than the machine has still runs eventually.
#[must_use]
pub fn build_script(
    command: &str,
    resources: &JobResources,
    dependency: Option<&Dependency>,
    total_memory_gb: Option<u64>,
) -> String {
    let mut script = String::new();

    for pid in dependency.iter().flat_map(|d| &d.job_ids) {
        script.push_str(&format!(
            "while kill -0 {pid} 2>/dev/null; do sleep {POLL_SECONDS}; done; "
        ));
    }

    let requested = u64::from(resources.memory_gb);
    let requested = total_memory_gb.map_or(requested, |total| requested.min(total));
    let needed_mb = requested * MB_PER_REQUESTED_GB;
    script.push_str(&format!(
        "while [ \"$(awk '/^MemAvailable:/ {{ print int($2 / 1024) }}' /proc/meminfo)\" -lt {needed_mb} ]; \
         do sleep {POLL_SECONDS}; done; "
    ));

    script.push_str(&command.trim().replace('\n', "; "));
    script
}

/// `MemTotal` from `/proc/meminfo` contents, in whole GB
#[must_use]
pub fn parse_mem_total_gb(meminfo: &str) -> Option<u64> {
    meminfo
        .lines()
        .find_map(|line| line.strip_prefix("MemTotal:"))
        .and_then(|rest| rest.split_whitespace().next())
        .and_then(|kb| kb.parse::<u64>().ok())
        .map(|kb| kb / (1024 * 1024))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    const MEMINFO: &str = "MemTotal:       16303428 kB\nMemFree:         1022680 kB\nMemAvailable:    9251144 kB\n";

    #[test]
    fn test_parse_mem_total_gb() {
        assert_eq!(parse_mem_total_gb(MEMINFO), Some(15));
        assert_eq!(parse_mem_total_gb("MemFree: 10 kB\n"), None);
    }

    #[test]
    fn test_build_script_waits_for_dependencies_and_memory() {
        let dep = Dependency::after_ok(vec!["101".to_string(), "102".to_string()]);
        let script = build_script("echo hi\necho bye", &JobResources::default(), Some(&dep), None);

        assert!(script.starts_with("while kill -0 101 2>/dev/null; do sleep 300; done; "));
        assert!(script.contains("while kill -0 102 2>/dev/null"));
        assert!(script.contains("-lt 6000 ]"));
        assert!(script.ends_with("echo hi; echo bye"));
    }

    #[test]
    fn test_memory_request_clamped_to_total() {
        let resources = JobResources {
            memory_gb: 64,
            ..JobResources::default()
        };
        let script = build_script("true", &resources, None, Some(4));
        assert!(script.contains("-lt 3000 ]"));
        assert!(!script.contains("kill -0"));
    }

    #[test]
    fn test_submit_runs_command_and_logs_output() {
        let dir = TempDir::new().unwrap();
        let resources = JobResources {
            name: "echo_job".to_string(),
            work_dir: PathBuf::from(dir.path()),
            memory_gb: 0,
            ..JobResources::default()
        };

        let handle = LocalSubmitter.submit("echo hello", &resources, None).unwrap();
        assert_eq!(handle.manager, JobManager::Local);
        assert!(handle.id.parse::<u32>().is_ok());
        assert!(dir.path().join("echo_job.out").exists());
    }
}
