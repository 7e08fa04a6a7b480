//! Exclusive scratch directory for one evaluation attempt
//!
//! Backed by a temporary directory that is removed on every exit path,
//! including panics and early returns, so attempts never observe each
//! other's files.

use std::path::{Component, Path, PathBuf};

use tempfile::TempDir;
use tokio::fs;

use crate::error::{EvalError, EvalResult};

/// Disposable, attempt-private storage for build artifacts and run output
pub struct Scratch {
    temp_dir: TempDir,
}

impl Scratch {
    /// Create a fresh scratch directory
    pub fn new() -> EvalResult<Self> {
        let temp_dir = TempDir::new().map_err(EvalError::Scratch)?;
        tracing::debug!(path = ?temp_dir.path(), "created scratch directory");
        Ok(Self { temp_dir })
    }

    /// Root path of the scratch directory
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Stage a file under the scratch root.
    ///
    /// Relative paths only; parent-directory components are rejected so a
    /// staged name can never escape the sandbox.
    pub async fn write_file(
        &self,
        name: impl AsRef<Path>,
        contents: &str,
    ) -> std::io::Result<PathBuf> {
        let full = self.join_checked(name.as_ref())?;
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&full, contents).await?;
        Ok(full)
    }

    /// Absolute path for a relative name inside the scratch directory
    pub fn join(&self, name: impl AsRef<Path>) -> PathBuf {
        self.path().join(name)
    }

    fn join_checked(&self, relative: &Path) -> std::io::Result<PathBuf> {
        if relative.is_absolute()
            || relative
                .components()
                .any(|c| matches!(c, Component::ParentDir | Component::Prefix(_)))
        {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("path escapes scratch directory: {}", relative.display()),
            ));
        }
        Ok(self.path().join(relative))
    }
}

impl std::fmt::Debug for Scratch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scratch").field("path", &self.path()).finish()
    }
}
