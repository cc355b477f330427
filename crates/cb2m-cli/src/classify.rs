//! Classify command implementation for cb2m CLI.

use std::fs;
use std::path::Path;

use cb2m_core::classify_revision;

/// Classify a local source file and print its shape.
///
/// A rejected file is reported as an error, so the process exits non-zero.
pub fn execute(file: &Path, username: &str, language: &str) -> anyhow::Result<()> {
    let code = fs::read_to_string(file)
        .map_err(|e| anyhow::anyhow!("Cannot read {}: {}", file.display(), e))?;

    match classify_revision(language, &code, username) {
        Ok(shape) => {
            println!("{}", shape);
            Ok(())
        }
        Err(rejection) => anyhow::bail!("{}: {}", file.display(), rejection),
    }
}
