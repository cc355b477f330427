//! Snippet and revision records as served by the snippet store.

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

/// The only language the archive pipeline can compile.
pub const SUPPORTED_LANGUAGE: &str = "java";

/// A hosted piece of user-authored code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snippet {
    /// Snippet identifier.
    pub id: String,
    /// Author handle.
    pub username: String,
    /// Human readable title.
    pub title: String,
}

/// One versioned body of source text within a snippet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Revision {
    /// Revision number, unique within its snippet.
    pub id: u32,
    /// Source text.
    pub code: String,
    /// Language name as reported by the store (e.g. `"Java"`).
    pub language: String,
    /// Creation timestamp, if the store knows it.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Revision {
    /// Whether this revision is written in the compiled language.
    pub fn is_supported_language(&self) -> bool {
        self.language.eq_ignore_ascii_case(SUPPORTED_LANGUAGE)
    }

    /// Calendar year of the creation timestamp.
    pub fn created_year(&self) -> Option<i32> {
        self.created_at.map(|ts| ts.year())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_check_ignores_case() {
        let mut revision = Revision {
            id: 1,
            code: String::new(),
            language: "Java".to_string(),
            created_at: None,
        };
        assert!(revision.is_supported_language());

        revision.language = "kotlin".to_string();
        assert!(!revision.is_supported_language());
    }

    #[test]
    fn test_revision_json_uses_camel_case() {
        let json = r#"{"id":3,"code":"x","language":"java","createdAt":"2019-05-01T10:00:00Z"}"#;
        let revision: Revision = serde_json::from_str(json).unwrap();
        assert_eq!(revision.id, 3);
        assert_eq!(revision.created_year(), Some(2019));

        let json = r#"{"id":4,"code":"x","language":"java"}"#;
        let revision: Revision = serde_json::from_str(json).unwrap();
        assert_eq!(revision.created_year(), None);
    }
}
