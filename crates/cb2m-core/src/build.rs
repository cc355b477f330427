//! Archive builds: source unit → build job → javac → jar.

use crate::classify::SourceShape;
use crate::compile::{CompilerResult, CompilerSettings, JavaToolchain, SourceUnit};
use crate::error::{Error, Result};
use crate::job::BuildJob;
use crate::package::pack;
use crate::paths::TempRoot;
use crate::snippet::{Revision, Snippet};

/// Result of an archive build that reached the compiler.
#[derive(Debug)]
pub enum ArchiveOutcome {
    /// The jar bytes.
    Built(Vec<u8>),
    /// javac rejected the code.
    CompileFailed(CompilerResult),
}

/// Builds jars for classified revisions, one isolated job per call.
///
/// Holds no per-request state, so one builder is shared by all requests.
#[derive(Debug, Clone)]
pub struct ArchiveBuilder {
    root: TempRoot,
    toolchain: JavaToolchain,
    settings: CompilerSettings,
}

impl ArchiveBuilder {
    /// Create a builder that places jobs under `root`.
    pub fn new(root: TempRoot, toolchain: JavaToolchain, settings: CompilerSettings) -> Self {
        Self {
            root,
            toolchain,
            settings,
        }
    }

    /// The temp root jobs are created under.
    pub fn root(&self) -> &TempRoot {
        &self.root
    }

    /// The compiler used for every job.
    pub fn toolchain(&self) -> &JavaToolchain {
        &self.toolchain
    }

    /// Compile `revision` of `snippet` and pack the class files.
    ///
    /// The job directory is removed before this returns, whatever the
    /// outcome. If the returned future is dropped midway, dropping the job
    /// and the compiler process still cleans up.
    pub async fn build(
        &self,
        snippet: &Snippet,
        revision: &Revision,
        shape: &SourceShape,
    ) -> Result<ArchiveOutcome> {
        let mut job = BuildJob::open(&self.root).await?;
        tracing::info!(
            job = %job.id(),
            "Building {}:{}:{} ({})",
            snippet.username,
            snippet.id,
            revision.id,
            shape
        );

        let unit = SourceUnit::for_shape(shape, &revision.code, &snippet.username, &snippet.id);
        let source = job.write_source(&unit).await?;

        let result = job
            .compile(&self.toolchain, &self.settings, vec![source])
            .await?;
        if !result.is_success() {
            job.close().await;
            return Ok(ArchiveOutcome::CompileFailed(result));
        }

        let output_dir = job.output_dir().to_path_buf();
        let bytes = tokio::task::spawn_blocking(move || pack(&output_dir))
            .await
            .map_err(|e| Error::PackagingFailed(format!("packaging task failed: {}", e)))??;

        job.close().await;
        Ok(ArchiveOutcome::Built(bytes))
    }
}
