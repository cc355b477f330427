//! Common types for the compilation pipeline.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Java language level used when nothing else is configured.
pub const DEFAULT_RELEASE: &str = "1.8";

/// Source encoding used when nothing else is configured.
pub const DEFAULT_ENCODING: &str = "UTF-8";

/// Upper bound for one compiler run.
pub const DEFAULT_COMPILE_TIMEOUT: Duration = Duration::from_secs(60);

/// Server-wide compiler configuration, applied to every job.
#[derive(Debug, Clone)]
pub struct CompilerSettings {
    /// Source/target language level (`-source`/`-target`)
    pub release: Option<String>,

    /// Source file encoding (`-encoding`)
    pub encoding: String,

    /// Additional classpath entries
    pub classpath: Vec<PathBuf>,

    /// Additional javac flags, passed before the source files
    pub extra_flags: Vec<String>,

    /// Time after which the compiler process is killed
    pub timeout: Duration,
}

impl Default for CompilerSettings {
    fn default() -> Self {
        Self {
            release: Some(DEFAULT_RELEASE.to_string()),
            encoding: DEFAULT_ENCODING.to_string(),
            classpath: Vec::new(),
            extra_flags: Vec::new(),
            timeout: DEFAULT_COMPILE_TIMEOUT,
        }
    }
}

/// Everything needed to run javac once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerSpec {
    pub source_files: Vec<PathBuf>,
    pub classpath: Vec<PathBuf>,
    pub destination: Option<PathBuf>,
    pub release: Option<String>,
    pub encoding: String,
    pub extra_flags: Vec<String>,
}

impl Default for CompilerSpec {
    fn default() -> Self {
        Self {
            source_files: Vec::new(),
            classpath: Vec::new(),
            destination: None,
            release: Some(DEFAULT_RELEASE.to_string()),
            encoding: DEFAULT_ENCODING.to_string(),
            extra_flags: Vec::new(),
        }
    }
}

impl CompilerSpec {
    /// Start a spec from server-wide settings.
    pub fn from_settings(settings: &CompilerSettings) -> Self {
        Self {
            classpath: settings.classpath.clone(),
            release: settings.release.clone(),
            encoding: settings.encoding.clone(),
            extra_flags: settings.extra_flags.clone(),
            ..Default::default()
        }
    }

    /// Replace the source file list.
    pub fn with_sources(mut self, sources: Vec<PathBuf>) -> Self {
        self.source_files = sources;
        self
    }

    /// Append one source file.
    pub fn add_source(mut self, path: impl Into<PathBuf>) -> Self {
        self.source_files.push(path.into());
        self
    }

    /// Append one classpath entry.
    pub fn add_classpath(mut self, path: impl Into<PathBuf>) -> Self {
        self.classpath.push(path.into());
        self
    }

    /// Set the class file output directory.
    pub fn with_destination(mut self, dir: &Path) -> Self {
        self.destination = Some(dir.to_path_buf());
        self
    }

    /// Set (or clear) the language level.
    pub fn with_release(mut self, release: Option<String>) -> Self {
        self.release = release;
        self
    }

    /// Command line arguments, in a fixed order: classpath, destination,
    /// language level, encoding, extra flags, then the source files.
    pub fn args(&self) -> Vec<OsString> {
        let mut args = Vec::new();

        if !self.classpath.is_empty() {
            let separator = if cfg!(windows) { ";" } else { ":" };
            let mut joined = OsString::new();
            for (i, entry) in self.classpath.iter().enumerate() {
                if i > 0 {
                    joined.push(separator);
                }
                joined.push(entry);
            }
            args.push("-classpath".into());
            args.push(joined);
        }

        if let Some(dest) = &self.destination {
            args.push("-d".into());
            args.push(dest.into());
        }

        if let Some(release) = &self.release {
            args.push("-source".into());
            args.push(release.into());
            args.push("-target".into());
            args.push(release.into());
        }

        args.push("-encoding".into());
        args.push((&self.encoding).into());

        args.extend(self.extra_flags.iter().map(OsString::from));
        args.extend(self.source_files.iter().map(OsString::from));

        args
    }
}

/// Terminal outcome of one compiler run.
///
/// A non-zero exit code means the user's code did not compile; it is not an
/// infrastructure failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerResult {
    /// Process exit code, `-1` if the process was terminated by a signal
    pub exit_code: i32,

    /// Everything the compiler wrote to stderr
    pub diagnostics: String,
}

impl CompilerResult {
    /// Returns true if the compiler exited with code 0.
    pub fn is_success(&self) -> bool {
        self.exit_code == 0
    }
}
