use std::path::{Path, PathBuf};
use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::config::DashboardConfig;
use crate::error::AppError;
use crate::parser::{load_dataset, Dataset};

/// Dataset loaded at most once per process and shared read-only between
/// filter passes. A failed load is not remembered; the next call retries.
#[derive(Debug, Default)]
pub struct SharedDataset {
    loaded: OnceCell<(PathBuf, Arc<Dataset>)>,
}

impl SharedDataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached dataset, loading it from `path` on first use.
    /// Once loaded, later calls return the same dataset whatever `path` they pass.
    pub fn get_or_load(
        &self,
        path: &Path,
        config: &DashboardConfig,
    ) -> Result<Arc<Dataset>, AppError> {
        let (source, dataset) = self.loaded.get_or_try_init(|| {
            let output = load_dataset(path, config)?;
            Ok::<_, AppError>((path.to_path_buf(), Arc::new(output.dataset)))
        })?;
        if source != path {
            log::debug!(
                "Dataset already loaded from {}, ignoring {}",
                source.display(),
                path.display()
            );
        }
        Ok(Arc::clone(dataset))
    }

    pub fn get(&self) -> Option<Arc<Dataset>> {
        self.loaded.get().map(|(_, ds)| Arc::clone(ds))
    }

    pub fn source(&self) -> Option<&Path> {
        self.loaded.get().map(|(p, _)| p.as_path())
    }
}
