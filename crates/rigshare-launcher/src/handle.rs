//! Launch handle

use rigshare_util::LaunchId;
use tokio::task::JoinHandle;

/// Handle to a detached launch task.
///
/// The booking flow never awaits the outcome; the handle exists so the
/// task can be cancelled at shutdown and observed by tests.
#[derive(Debug)]
pub struct LaunchHandle {
    launch_id: LaunchId,
    task: JoinHandle<()>,
}

impl LaunchHandle {
    pub fn new(launch_id: LaunchId, task: JoinHandle<()>) -> Self {
        Self { launch_id, task }
    }

    pub fn launch_id(&self) -> &LaunchId {
        &self.launch_id
    }

    /// Whether the launch task has run to completion
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Cancel the launch task
    pub fn abort(&self) {
        self.task.abort();
    }

    /// Wait for the launch task to finish. Cancellation surfaces as
    /// completion; the task itself never reports an outcome.
    pub async fn wait(self) {
        let _ = self.task.await;
    }
}
