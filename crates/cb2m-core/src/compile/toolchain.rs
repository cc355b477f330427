//! Java toolchain discovery and compiler invocation.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::io::AsyncReadExt;
use tokio::process::Command;

use super::types::{CompilerResult, CompilerSpec};
use crate::error::{Error, Result};

/// The javac binary used to compile snippets.
#[derive(Debug, Clone)]
pub struct JavaToolchain {
    /// Program to execute
    program: PathBuf,

    /// Arguments placed before the javac arguments, for running javac
    /// through a launcher (`sh -c ...`, a container runner, ...)
    launcher_args: Vec<OsString>,
}

impl JavaToolchain {
    /// Locate javac in PATH.
    pub fn detect() -> Result<Self> {
        let program = which::which("javac")
            .map_err(|_| Error::Toolchain("javac not found in PATH".to_string()))?;
        Ok(Self::from_path(program))
    }

    /// Use an explicit javac binary.
    pub fn from_path(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            launcher_args: Vec::new(),
        }
    }

    /// Run javac through a launcher program.
    pub fn with_launcher_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.launcher_args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Get the compiler program path.
    pub fn program(&self) -> &Path {
        &self.program
    }

    fn command(&self, spec: &CompilerSpec) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.launcher_args)
            .args(spec.args())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }

    /// Run the compiler once and wait for it to finish.
    ///
    /// stderr is drained concurrently so a chatty compiler cannot block on a
    /// full pipe. Waiting for the exit and for the end of stderr share one
    /// deadline, so a call never takes much longer than `timeout`. A non-zero
    /// exit code is returned as a normal [`CompilerResult`].
    ///
    /// # Errors
    /// - [`Error::CompilerSpawnFailed`] if the process cannot be started
    /// - [`Error::CompilerTimeout`] if the process runs past the deadline
    ///   (it is killed first), or if stderr is still held open by a leftover
    ///   child when the deadline passes
    pub async fn compile(&self, spec: &CompilerSpec, timeout: Duration) -> Result<CompilerResult> {
        let deadline = tokio::time::Instant::now() + timeout;
        let mut cmd = self.command(spec);
        tracing::debug!("Running compiler: {:?}", cmd);

        let mut child = cmd.spawn().map_err(|e| Error::CompilerSpawnFailed {
            program: self.program.clone(),
            message: e.to_string(),
        })?;
        let pid = child.id().unwrap_or(0);

        let Some(mut stderr) = child.stderr.take() else {
            let _ = child.kill().await;
            return Err(Error::CompilerSpawnFailed {
                program: self.program.clone(),
                message: "stderr was not captured".to_string(),
            });
        };

        let mut drain = tokio::spawn(async move {
            let mut buf = Vec::new();
            if let Err(e) = stderr.read_to_end(&mut buf).await {
                tracing::warn!("Failed to read compiler stderr: {}", e);
            }
            buf
        });

        let waited = tokio::time::timeout_at(deadline, child.wait()).await;
        let status = match waited {
            Ok(Ok(status)) => status,
            Ok(Err(e)) => {
                let _ = child.kill().await;
                drain.abort();
                return Err(Error::Io(e));
            }
            Err(_) => {
                tracing::warn!("Compiler process {} timed out, killing it", pid);
                let _ = child.kill().await;
                drain.abort();
                return Err(Error::CompilerTimeout(timeout));
            }
        };

        let drained = tokio::time::timeout_at(deadline, &mut drain).await;
        let diagnostics = match drained {
            Ok(Ok(buf)) => String::from_utf8_lossy(&buf).into_owned(),
            Ok(Err(e)) => {
                tracing::warn!("Compiler stderr reader failed: {}", e);
                String::new()
            }
            Err(_) => {
                tracing::warn!(
                    "Compiler process {} exited but its stderr stayed open past the deadline",
                    pid
                );
                drain.abort();
                return Err(Error::CompilerTimeout(timeout));
            }
        };

        let exit_code = status.code().unwrap_or(-1);
        tracing::info!("Compiler process {} exited with code {}", pid, exit_code);

        Ok(CompilerResult {
            exit_code,
            diagnostics,
        })
    }
}
