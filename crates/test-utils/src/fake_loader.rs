use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use splitscript::router::{HandlerError, HandlerLoader, LoadedUnit};

/// A loader that serves pre-built units from memory instead of running files.
///
/// Paths without a unit fail to load.
#[derive(Debug, Default)]
pub struct InMemoryLoader {
    units: Mutex<HashMap<PathBuf, LoadedUnit>>,
    loads: AtomicUsize,
}

impl InMemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, unit: LoadedUnit) {
        self.units.lock().unwrap().insert(unit.path.clone(), unit);
    }

    /// Number of `load` calls so far.
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

impl HandlerLoader for InMemoryLoader {
    fn load<'a>(
        &'a self,
        path: &'a Path,
    ) -> Pin<Box<dyn Future<Output = Result<LoadedUnit, HandlerError>> + Send + 'a>> {
        Box::pin(async move {
            self.loads.fetch_add(1, Ordering::SeqCst);
            self.units
                .lock()
                .unwrap()
                .get(path)
                .cloned()
                .ok_or_else(|| HandlerError::Load {
                    file: path.to_path_buf(),
                    message: "no unit registered".to_string(),
                })
        })
    }
}
