use std::path::{Path, PathBuf};

use crate::prelude::*;

/// Graceful shutdown request signalled by the mere presence of a marker file.
///
/// The file is never read nor removed here: cleaning it up is up to the operator.
#[must_use]
#[derive(Clone, Debug)]
pub struct ShutdownSentinel {
    path: PathBuf,
}

impl ShutdownSentinel {
    /// Watch for `file_name` inside the module directory.
    ///
    /// Fails if the directory itself is inaccessible, since the shutdown request could never be
    /// observed then.
    pub fn new(module_dir: &Path, file_name: &str) -> Result<Self> {
        let metadata = std::fs::metadata(module_dir).with_context(|| {
            format!("module directory `{}` is inaccessible", module_dir.display())
        })?;
        ensure!(metadata.is_dir(), "`{}` is not a directory", module_dir.display());
        Ok(Self { path: module_dir.join(file_name) })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check whether the operator has asked to stop.
    #[must_use]
    pub fn is_requested(&self) -> bool {
        match self.path.try_exists() {
            Ok(exists) => exists,
            Err(error) => {
                warn!(path = %self.path.display(), "failed to check the shutdown sentinel: {error:#}");
                false
            }
        }
    }
}
