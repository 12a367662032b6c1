//! Fake collaborators for integration tests

use kincanvas::{ImageLoader, LoadState};
use std::sync::{Arc, Mutex};

/// Calls seen by a [`RecordingLoader`]
#[derive(Debug, Default)]
pub struct LoaderLog {
    pub loads: Vec<(String, u32)>,
    pub cancels: Vec<(String, u32)>,
}

/// Loader that answers every request with a fixed state and records calls
///
/// The log is shared so tests can inspect it after the loader moves into
/// the engine.
pub struct RecordingLoader {
    state: LoadState,
    log: Arc<Mutex<LoaderLog>>,
}

impl RecordingLoader {
    pub fn new(state: LoadState) -> (Self, Arc<Mutex<LoaderLog>>) {
        let log = Arc::new(Mutex::new(LoaderLog::default()));
        (
            Self {
                state,
                log: log.clone(),
            },
            log,
        )
    }
}

impl ImageLoader for RecordingLoader {
    fn load(&mut self, url: &str, bucket: u32) -> LoadState {
        self.log.lock().unwrap().loads.push((url.to_string(), bucket));
        self.state
    }

    fn cancel(&mut self, url: &str, bucket: u32) {
        self.log.lock().unwrap().cancels.push((url.to_string(), bucket));
    }
}
