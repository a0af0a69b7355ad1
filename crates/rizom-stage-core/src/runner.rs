//! Running staged tool invocations
//!
//! Executes the program of a [`ToolSetup`] inside the job directory, waits
//! for it (optionally with a timeout), removes the generated script and
//! reports what happened.

use crate::config::ToolConfig;
use crate::tool::ToolSetup;
use crate::{Error, Result};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Outcome of a finished tool run
#[derive(Debug, Clone)]
pub struct ToolReport {
    /// Exit code
    pub code: Option<i32>,
    /// Captured standard output
    pub stdout: String,
    /// Captured standard error
    pub stderr: String,
    /// Wall-clock run time
    pub elapsed: Duration,
    /// Requested outputs the tool did not produce
    pub missing_outputs: Vec<PathBuf>,
}

impl ToolReport {
    /// Whether every requested output exists
    pub fn is_complete(&self) -> bool {
        self.missing_outputs.is_empty()
    }
}

impl std::fmt::Display for ToolReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Finished in {:.1}s with code {}",
            self.elapsed.as_secs_f64(),
            self.code.map_or_else(|| "none".to_string(), |c| c.to_string())
        )?;
        if !self.missing_outputs.is_empty() {
            write!(f, " ({} output(s) missing)", self.missing_outputs.len())?;
        }
        Ok(())
    }
}

/// Run a staged invocation in `work_dir`
///
/// The generated script is removed afterwards unless the config keeps it,
/// whether or not the run succeeded. A non-zero exit status becomes
/// [`Error::ToolFailed`]; exceeding the configured timeout kills the
/// process and returns [`Error::Timeout`].
pub async fn run_setup(
    config: &ToolConfig,
    setup: &ToolSetup,
    work_dir: &Path,
) -> Result<ToolReport> {
    info!("Running: {}", setup.command);

    let mut command = Command::new(&setup.executable);
    command
        .args(&setup.args)
        .current_dir(work_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let start = Instant::now();
    let result = execute(command, config.timeout()).await;
    let elapsed = start.elapsed();

    if !config.keep_script {
        remove_script(&setup.script_path).await;
    }

    let output = result?;
    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
    let code = output.status.code();

    if !output.status.success() {
        warn!("{} exited with {:?}", setup.executable.display(), code);
        return Err(Error::ToolFailed { code, stderr });
    }

    let mut missing_outputs = Vec::new();
    for path in &setup.outputs {
        if !tokio::fs::try_exists(path).await.unwrap_or(false) {
            warn!("Expected output was not written: {}", path.display());
            missing_outputs.push(path.clone());
        }
    }

    let report = ToolReport {
        code,
        stdout,
        stderr,
        elapsed,
        missing_outputs,
    };
    info!("{}", report);
    Ok(report)
}

async fn execute(mut command: Command, timeout: Option<Duration>) -> Result<std::process::Output> {
    let child = command.spawn().map_err(Error::Spawn)?;
    debug!("Spawned process {:?}", child.id());

    match timeout {
        // Dropping the wait future drops the child, which kills it
        Some(limit) => tokio::time::timeout(limit, child.wait_with_output())
            .await
            .map_err(|_| Error::Timeout(limit))?
            .map_err(Error::from),
        None => Ok(child.wait_with_output().await?),
    }
}

async fn remove_script(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => debug!("Removed script {}", path.display()),
        Err(e) => warn!("Failed to remove script {}: {}", path.display(), e),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use super::*;

    fn scratch_dir() -> PathBuf {
        std::env::temp_dir().join(format!(
            "rizom_stage_runner_{}",
            uuid::Uuid::new_v4().simple()
        ))
    }

    /// A setup that runs `sh -c <body>` with a dummy script file
    fn shell_setup(dir: &Path, body: &str, outputs: Vec<PathBuf>) -> ToolSetup {
        let script_path = dir.join("_rizomuv_test.lua");
        std::fs::write(&script_path, "ZomQuit()").expect("write script");
        ToolSetup {
            command: format!("sh -c '{}'", body),
            executable: PathBuf::from("sh"),
            args: vec!["-c".to_string(), body.to_string()],
            script_file: "_rizomuv_test.lua".to_string(),
            script_path,
            script: "ZomQuit()".to_string(),
            outputs,
        }
    }

    fn config(timeout_secs: Option<u64>, keep_script: bool) -> ToolConfig {
        ToolConfig {
            executable: PathBuf::from("sh"),
            timeout_secs,
            keep_script,
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_successful_run_removes_script() {
        let dir = scratch_dir();
        std::fs::create_dir_all(&dir).expect("temp dir");
        let out = dir.join("out.obj");
        let setup = shell_setup(&dir, "echo unwrapped > out.obj; echo done", vec![out.clone()]);

        let report = run_setup(&config(None, false), &setup, &dir)
            .await
            .expect("run succeeds");

        assert_eq!(report.code, Some(0));
        assert_eq!(report.stdout.trim(), "done");
        assert!(report.is_complete());
        assert!(out.exists());
        assert!(!setup.script_path.exists());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_keep_script_and_missing_outputs() {
        let dir = scratch_dir();
        std::fs::create_dir_all(&dir).expect("temp dir");
        let setup = shell_setup(&dir, "exit 0", vec![dir.join("never.fbx")]);

        let report = run_setup(&config(None, true), &setup, &dir)
            .await
            .expect("run succeeds");

        assert!(!report.is_complete());
        assert_eq!(report.missing_outputs, vec![dir.join("never.fbx")]);
        assert!(setup.script_path.exists());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failed_run() {
        let dir = scratch_dir();
        std::fs::create_dir_all(&dir).expect("temp dir");
        let setup = shell_setup(&dir, "echo bad mesh >&2; exit 3", Vec::new());

        match run_setup(&config(None, false), &setup, &dir).await {
            Err(Error::ToolFailed { code, stderr }) => {
                assert_eq!(code, Some(3));
                assert_eq!(stderr.trim(), "bad mesh");
            }
            other => panic!("expected tool failure, got {:?}", other),
        }
        assert!(!setup.script_path.exists());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_timeout() {
        let dir = scratch_dir();
        std::fs::create_dir_all(&dir).expect("temp dir");
        let setup = shell_setup(&dir, "sleep 5", Vec::new());

        let mut config = config(None, false);
        config.timeout_secs = Some(0);

        let result = run_setup(&config, &setup, &dir).await;
        assert!(matches!(result, Err(Error::Timeout(_))));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn test_spawn_failure() {
        let dir = scratch_dir();
        std::fs::create_dir_all(&dir).expect("temp dir");
        let mut setup = shell_setup(&dir, "", Vec::new());
        setup.executable = dir.join("no-such-rizomuv");

        let result = run_setup(&config(None, false), &setup, &dir).await;
        assert!(matches!(result, Err(Error::Spawn(_))));

        std::fs::remove_dir_all(&dir).ok();
    }
}
