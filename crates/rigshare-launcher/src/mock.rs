//! Mock launcher for testing

use rigshare_util::LaunchId;
use std::sync::{Arc, Mutex};

use crate::{LaunchHandle, Launcher};

/// Launcher that records invocations instead of spawning anything
#[derive(Default)]
pub struct MockLauncher {
    launches: Arc<Mutex<Vec<LaunchId>>>,
}

impl MockLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of launches requested so far
    pub fn launch_count(&self) -> usize {
        self.launches.lock().unwrap().len()
    }

    /// IDs of launches requested so far
    pub fn launch_ids(&self) -> Vec<LaunchId> {
        self.launches.lock().unwrap().clone()
    }
}

impl Launcher for MockLauncher {
    fn launch(&self) -> LaunchHandle {
        let launch_id = LaunchId::new();
        self.launches.lock().unwrap().push(launch_id.clone());

        let task = tokio::spawn(async {});
        LaunchHandle::new(launch_id, task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_records_each_launch() {
        let mock = MockLauncher::new();
        assert_eq!(mock.launch_count(), 0);

        let h1 = mock.launch();
        let h2 = mock.launch();
        assert_eq!(mock.launch_count(), 2);
        assert_ne!(h1.launch_id(), h2.launch_id());

        h1.wait().await;
        h2.wait().await;
    }
}
