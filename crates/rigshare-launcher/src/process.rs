//! Detached demo process launcher

use rigshare_store::{AuditEvent, AuditLog};
use rigshare_util::LaunchId;
use std::os::unix::process::CommandExt;
use std::process::{Command, Stdio};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::{LaunchError, LaunchHandle, LaunchResult, Launcher};

/// Launcher that spawns the configured demo command
pub struct ProcessLauncher {
    argv: Vec<String>,
    audit: Arc<AuditLog>,
}

impl ProcessLauncher {
    pub fn new(argv: Vec<String>, audit: Arc<AuditLog>) -> Self {
        Self { argv, audit }
    }
}

impl Launcher for ProcessLauncher {
    fn launch(&self) -> LaunchHandle {
        let launch_id = LaunchId::new();
        let argv = self.argv.clone();
        let audit = self.audit.clone();
        let id = launch_id.clone();

        let task = tokio::spawn(async move {
            audit.append(&AuditEvent::LaunchStarted {
                launch_id: id.clone(),
            });

            match spawn_detached(&argv) {
                Ok(pid) => {
                    debug!(launch_id = %id, pid = pid, "Demo application spawned");
                    audit.append(&AuditEvent::LaunchSucceeded { launch_id: id });
                }
                Err(e) => {
                    warn!(launch_id = %id, error = %e, "Demo launch failed");
                    audit.append(&AuditEvent::LaunchFailed {
                        launch_id: id,
                        cause: e.to_string(),
                    });
                }
            }
        });

        LaunchHandle::new(launch_id, task)
    }
}

/// Spawn the demo process in its own session, stdio detached.
///
/// The child is not reaped here; it owns its session and outlives the
/// service the way the original marketplace demo did.
fn spawn_detached(argv: &[String]) -> LaunchResult<u32> {
    if argv.is_empty() {
        return Err(LaunchError::SpawnFailed("Empty argv".into()));
    }

    let program = &argv[0];
    let args = &argv[1..];

    let mut cmd = Command::new(program);
    cmd.args(args);
    cmd.stdin(Stdio::null());
    cmd.stdout(Stdio::null());
    cmd.stderr(Stdio::null());

    // SAFETY: This is safe in the pre-exec context
    unsafe {
        cmd.pre_exec(|| {
            // New session (and process group) so the demo survives us
            nix::unistd::setsid()
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
            Ok(())
        });
    }

    let child = cmd
        .spawn()
        .map_err(|e| LaunchError::SpawnFailed(format!("Failed to spawn {}: {}", program, e)))?;

    Ok(child.id())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_temp_audit() -> (tempfile::TempDir, Arc<AuditLog>) {
        let dir = tempfile::tempdir().unwrap();
        let audit = Arc::new(AuditLog::open(dir.path().join("execution.log")).unwrap());
        (dir, audit)
    }

    #[test]
    fn spawn_simple_process() {
        let argv = vec!["true".to_string()];
        assert!(spawn_detached(&argv).is_ok());
    }

    #[test]
    fn spawn_missing_program_fails() {
        let argv = vec!["rigshare-no-such-program".to_string()];
        assert!(matches!(
            spawn_detached(&argv),
            Err(LaunchError::SpawnFailed(_))
        ));
    }

    #[tokio::test]
    async fn launch_logs_success() {
        let (_dir, audit) = open_temp_audit();
        let launcher = ProcessLauncher::new(vec!["true".to_string()], audit.clone());

        launcher.launch().wait().await;

        let log = audit.read_all().unwrap();
        assert!(log.contains("Launching demo application"));
        assert!(log.contains("Application launched successfully"));
    }

    #[tokio::test]
    async fn launch_failure_is_logged_not_raised() {
        let (_dir, audit) = open_temp_audit();
        let launcher =
            ProcessLauncher::new(vec!["rigshare-no-such-program".to_string()], audit.clone());

        launcher.launch().wait().await;

        let log = audit.read_all().unwrap();
        assert!(log.contains("Launching demo application"));
        assert!(log.contains("Launch failed"));
    }
}
