//! Process-wide temporary directory for build jobs.
//!
//! Every archive request gets its own job directory underneath a single
//! temp root:
//!
//! ```text
//! /tmp/cb2m/
//! ├── job-compilation-<uuid>/
//! │   ├── src/    # generated .java file
//! │   └── build/  # javac output, packed into the jar
//! └── job-compilation-<uuid>/
//! ```

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use uuid::Uuid;

use crate::error::{Error, Result};

/// Default location of the temp root.
pub const DEFAULT_TEMP_ROOT: &str = "/tmp/cb2m";

/// Outcome of removing one job directory, passed to a [`RemovalHook`].
#[derive(Debug, Clone)]
pub struct JobRemoval {
    pub job_id: Uuid,
    pub work_dir: PathBuf,
    /// `Err` holds the message of the failed removal.
    pub result: std::result::Result<(), String>,
}

/// Observer called after every job directory removal attempt.
pub type RemovalHook = Arc<dyn Fn(&JobRemoval) + Send + Sync>;

/// The directory all build jobs are created under.
#[derive(Clone)]
pub struct TempRoot {
    path: PathBuf,
    on_removal: Option<RemovalHook>,
}

impl TempRoot {
    /// Create the temp root if needed and check that it is writable.
    ///
    /// # Errors
    /// Returns [`Error::JobSetupFailed`] if the directory cannot be created
    /// or written to.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if !path.exists() {
            fs::create_dir_all(&path).map_err(|e| Error::job_setup(&path, e))?;
            tracing::info!("Created temporary server directory {}", path.display());
        }

        let probe = path.join(format!(".write-probe-{}", Uuid::new_v4()));
        fs::write(&probe, b"")
            .and_then(|_| fs::remove_file(&probe))
            .map_err(|e| Error::job_setup(&path, format!("cannot write to temporary directory: {}", e)))?;

        Ok(Self {
            path,
            on_removal: None,
        })
    }

    /// Register an observer for job directory removals.
    pub fn with_removal_hook(mut self, hook: RemovalHook) -> Self {
        self.on_removal = Some(hook);
        self
    }

    /// The temp root directory.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Work directory for a job id.
    pub fn job_dir(&self, id: Uuid) -> PathBuf {
        self.path.join(format!("job-compilation-{}", id))
    }

    pub(crate) fn notify_removal(&self, removal: &JobRemoval) {
        if let Some(hook) = &self.on_removal {
            hook(removal);
        }
    }
}

impl fmt::Debug for TempRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TempRoot")
            .field("path", &self.path)
            .field("on_removal", &self.on_removal.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_create_missing_root() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let root_path = temp.path().join("nested").join("cb2m");

        let root = TempRoot::create(&root_path).expect("Failed to create temp root");

        assert!(root.path().is_dir());
        // The write probe must not be left behind
        assert_eq!(fs::read_dir(root.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_create_existing_root() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        assert!(TempRoot::create(temp.path()).is_ok());
    }

    #[test]
    fn test_root_is_a_file() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let file = temp.path().join("not-a-dir");
        fs::write(&file, "x").unwrap();

        let err = TempRoot::create(&file).unwrap_err();
        assert!(matches!(err, Error::JobSetupFailed { .. }));
    }

    #[test]
    fn test_job_dir_naming() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let root = TempRoot::create(temp.path()).unwrap();
        let id = Uuid::nil();

        assert_eq!(
            root.job_dir(id),
            temp.path().join("job-compilation-00000000-0000-0000-0000-000000000000")
        );
    }
}
