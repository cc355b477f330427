//! Per-request build jobs.
//!
//! A [`BuildJob`] owns a fresh work directory under the [`TempRoot`] for the
//! lifetime of one archive request. The directory is removed when the job is
//! closed or dropped, so a failed or cancelled request cleans up as well.
//!
//! Directory creation and source writes go through `tokio::fs`, and
//! [`BuildJob::close`] removes the tree on the blocking pool. Only the
//! [`Drop`] fallback removes synchronously, since a dropped future cannot
//! await anything.

use std::fs;
use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::compile::{CompilerResult, CompilerSettings, CompilerSpec, JavaToolchain, SourceUnit};
use crate::error::{Error, Result};
use crate::paths::{JobRemoval, TempRoot};

/// Isolated filesystem scope for a single archive build.
#[derive(Debug)]
pub struct BuildJob {
    id: Uuid,
    work_dir: PathBuf,
    source_dir: PathBuf,
    output_dir: PathBuf,
    root: TempRoot,
    compiled: bool,
    closed: bool,
}

impl BuildJob {
    /// Create a job with a new id and its directories.
    ///
    /// # Errors
    /// Returns [`Error::JobSetupFailed`] if any directory cannot be created.
    /// Nothing is left on disk in that case.
    pub async fn open(root: &TempRoot) -> Result<Self> {
        let id = Uuid::new_v4();
        let work_dir = root.job_dir(id);

        // Non-recursive on purpose: an existing directory is never adopted
        tokio::fs::create_dir(&work_dir)
            .await
            .map_err(|e| Error::job_setup(&work_dir, e))?;

        // From here on, dropping the job removes work_dir
        let job = Self {
            id,
            source_dir: work_dir.join("src"),
            output_dir: work_dir.join("build"),
            work_dir,
            root: root.clone(),
            compiled: false,
            closed: false,
        };

        for dir in [&job.source_dir, &job.output_dir] {
            tokio::fs::create_dir(dir)
                .await
                .map_err(|e| Error::job_setup(dir, e))?;
        }

        tracing::debug!(job = %id, "Opened build job at {}", job.work_dir.display());

        Ok(job)
    }

    /// Job identifier.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Root of the job's directories.
    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Directory holding the generated source file.
    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    /// Directory the compiler writes class files into.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Write a source unit into the source directory.
    pub async fn write_source(&self, unit: &SourceUnit) -> Result<PathBuf> {
        let path = self.source_dir.join(&unit.file_name);
        tokio::fs::write(&path, &unit.contents)
            .await
            .map_err(|e| Error::job_setup(&path, e))?;
        Ok(path)
    }

    /// Compile `sources` into this job's output directory.
    ///
    /// A job compiles at most once; a second call is an
    /// [`Error::InvalidOperation`].
    pub async fn compile(
        &mut self,
        toolchain: &JavaToolchain,
        settings: &CompilerSettings,
        sources: Vec<PathBuf>,
    ) -> Result<CompilerResult> {
        if self.compiled {
            return Err(Error::InvalidOperation(format!(
                "build job {} has already been compiled",
                self.id
            )));
        }
        self.compiled = true;

        let spec = CompilerSpec::from_settings(settings)
            .with_sources(sources)
            .with_destination(&self.output_dir);

        toolchain.compile(&spec, settings.timeout).await
    }

    /// Remove the job's directories on the blocking pool.
    ///
    /// Failure is logged and otherwise ignored. The removal finishes even if
    /// the returned future is dropped.
    pub async fn close(mut self) {
        self.closed = true;

        let (id, work_dir, root) = (self.id, self.work_dir.clone(), self.root.clone());
        let removal = tokio::task::spawn_blocking(move || remove_work_dir(id, &work_dir, &root));
        if let Err(e) = removal.await {
            tracing::warn!(job = %self.id, "Job directory removal task failed: {}", e);
        }
    }
}

impl Drop for BuildJob {
    fn drop(&mut self) {
        if !self.closed {
            self.closed = true;
            remove_work_dir(self.id, &self.work_dir, &self.root);
        }
    }
}

fn remove_work_dir(id: Uuid, work_dir: &Path, root: &TempRoot) {
    let result = fs::remove_dir_all(work_dir).map_err(|e| e.to_string());
    match &result {
        Ok(()) => tracing::debug!(job = %id, "Removed build job directory"),
        Err(e) => tracing::warn!(
            job = %id,
            "Failed to remove job directory {}: {}",
            work_dir.display(),
            e
        ),
    }

    root.notify_removal(&JobRemoval {
        job_id: id,
        work_dir: work_dir.to_path_buf(),
        result,
    });
}
