//! Artifact URL grammar.
//!
//! Maven resolves `groupId:artifactId:version` to
//! `io/codebottle/<username>/<snippetId>/<revisionId>/<file>.<ext>`, optionally
//! below a repository prefix.

use std::sync::LazyLock;

use regex::Regex;

static ARTIFACT_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^/(?:.*/)?io/codebottle/(?P<username>[^/]+)/(?P<snippet>[^/]+)/(?P<revision>\d+)/(?P<file>[^/]+)$",
    )
    .expect("artifact path regex is valid")
});

/// What a request asks for, by file extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactKind {
    /// `.xml` or `.pom`
    Descriptor,
    /// `.jar`
    Archive,
    /// Anything else, such as checksums
    Other(String),
}

impl ArtifactKind {
    fn from_file_name(file: &str) -> Self {
        let ext = file.rsplit_once('.').map(|(_, ext)| ext).unwrap_or("");
        match ext {
            "xml" | "pom" => Self::Descriptor,
            "jar" => Self::Archive,
            other => Self::Other(other.to_string()),
        }
    }
}

/// A parsed artifact request path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactRoute {
    pub username: String,
    pub snippet_id: String,
    pub revision_id: u32,
    pub file_name: String,
    pub kind: ArtifactKind,
}

impl ArtifactRoute {
    /// Parse a request path. Returns `None` if it is not an artifact path.
    pub fn parse(path: &str) -> Option<Self> {
        let caps = ARTIFACT_PATH.captures(path)?;
        let revision_id = caps["revision"].parse().ok()?;
        let file_name = caps["file"].to_string();

        Some(Self {
            username: caps["username"].to_string(),
            snippet_id: caps["snippet"].to_string(),
            revision_id,
            kind: ArtifactKind::from_file_name(&file_name),
            file_name,
        })
    }

    /// `username:snippetId:revisionId`, as used in not-found messages.
    pub fn coordinates(&self) -> String {
        format!("{}:{}:{}", self.username, self.snippet_id, self.revision_id)
    }
}
