//! Structural classification of snippet source code.
//!
//! A revision can only be turned into an archive if its code has one of two
//! shapes:
//!
//! - a whole compilation unit: `package io.codebottle.<username>;` followed by
//!   exactly one public class whose body runs to the end of the text
//! - a single public method with no enclosing class or package statement
//!
//! This is a heuristic, not a Java grammar check. The declaration headers
//! are matched with regular expressions and the body is accepted when its
//! braces balance over the whole remainder of the text. Braces inside string
//! literals, char literals and comments are skipped; anything else a real
//! parser would reject is left for `javac` to report.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::snippet::SUPPORTED_LANGUAGE;

/// Package prefix every class-shaped snippet must live under.
pub const NAMESPACE_ROOT: &str = "io.codebottle.";

static CLASS_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\s*package\s+(?P<package>[A-Za-z_$][\w$]*(?:\.[A-Za-z_$][\w$]*)*)\s*;\s*public\s+(?:(?:final|abstract|strictfp)\s+)*class\s+(?P<name>[A-Za-z_$][\w$]*)[^{;]*\{",
    )
    .expect("class header pattern is valid")
});

static METHOD_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\s*public\s+(?:static\s+)?(?:final\s+)?(?P<ret>void|[A-Za-z_$][\w$]*(?:\s*\[\s*\])*)\s+(?P<name>[A-Za-z_$][\w$]*)\s*\([^)]*\)\s*(?:throws\s+[\w$.]+(?:\s*,\s*[\w$.]+)*\s*)?\{",
    )
    .expect("method header pattern is valid")
});

/// Recognized structure of a snippet's source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceShape {
    /// A full compilation unit declaring one public class.
    Class {
        /// Package suffix under [`NAMESPACE_ROOT`]; always the author's username.
        package_suffix: String,
        /// Name of the declared class.
        class_name: String,
    },
    /// A lone public method.
    Method {
        /// Name of the declared method.
        method_name: String,
    },
}

/// Why a snippet's source cannot be built.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    /// The revision is not written in Java.
    #[error("snippet must be written in Java, found {language}")]
    UnsupportedLanguage { language: String },

    /// The code is neither a class nor a method shape.
    #[error("cannot generate artifact from snippet: source is neither a single public class nor a single public method")]
    UnrecognizedShape,

    /// The class does not live in the author's package.
    #[error("cannot generate artifact from snippet: class must declare package {expected}, found {found}")]
    PackageMismatch { expected: String, found: String },
}

impl fmt::Display for SourceShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Class {
                package_suffix,
                class_name,
            } => write!(f, "class {}{}.{}", NAMESPACE_ROOT, package_suffix, class_name),
            Self::Method { method_name } => write!(f, "method {}", method_name),
        }
    }
}

/// The package a class-shaped snippet by `username` must declare.
pub fn expected_package(username: &str) -> String {
    format!("{}{}", NAMESPACE_ROOT, username)
}

/// Classify a revision, checking its language before its structure.
pub fn classify_revision(
    language: &str,
    code: &str,
    username: &str,
) -> Result<SourceShape, Rejection> {
    if !language.eq_ignore_ascii_case(SUPPORTED_LANGUAGE) {
        return Err(Rejection::UnsupportedLanguage {
            language: language.to_string(),
        });
    }
    classify(code, username)
}

/// Classify Java source written by `username`.
///
/// The class shape is tried first, then the method shape.
pub fn classify(code: &str, username: &str) -> Result<SourceShape, Rejection> {
    if let Some(caps) = CLASS_HEADER.captures(code) {
        let header = caps.get(0).map_or(0..0, |m| m.range());
        if !body_spans_remainder(code, header.end - 1) {
            return Err(Rejection::UnrecognizedShape);
        }

        let package = &caps["package"];
        let expected = expected_package(username);
        if package != expected {
            return Err(Rejection::PackageMismatch {
                expected,
                found: package.to_string(),
            });
        }

        return Ok(SourceShape::Class {
            package_suffix: username.to_string(),
            class_name: caps["name"].to_string(),
        });
    }

    if let Some(caps) = METHOD_HEADER.captures(code) {
        let header = caps.get(0).map_or(0..0, |m| m.range());
        if body_spans_remainder(code, header.end - 1) {
            return Ok(SourceShape::Method {
                method_name: caps["name"].to_string(),
            });
        }
    }

    Err(Rejection::UnrecognizedShape)
}

/// Whether the block opened at byte `open` closes exactly at the end of
/// `code` (ignoring trailing whitespace).
fn body_spans_remainder(code: &str, open: usize) -> bool {
    let bytes = code.as_bytes();
    debug_assert_eq!(bytes.get(open), Some(&b'{'));

    let mut depth = 0usize;
    let mut i = open;
    while i < bytes.len() {
        match bytes[i] {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return code[i + 1..].trim().is_empty();
                }
            }
            b'"' | b'\'' => i = skip_literal(bytes, i),
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                i = bytes[i..]
                    .iter()
                    .position(|&b| b == b'\n')
                    .map_or(bytes.len(), |p| i + p);
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i = code[i + 2..]
                    .find("*/")
                    .map_or(bytes.len(), |p| i + 2 + p + 1);
            }
            _ => {}
        }
        i += 1;
    }
    false
}

/// Index of the closing quote of the literal starting at `start`.
fn skip_literal(bytes: &[u8], start: usize) -> usize {
    let quote = bytes[start];
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 1,
            b if b == quote => return i,
            b'\n' => return i,
            _ => {}
        }
        i += 1;
    }
    bytes.len()
}
