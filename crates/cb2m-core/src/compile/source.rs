//! Turns a classified snippet into a single compilable Java file.

use crate::classify::{NAMESPACE_ROOT, SourceShape};

/// Name of the class generated around method-shaped snippets.
pub const WRAPPER_CLASS: &str = "Snippet";

/// One Java source file ready to be written into a build job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUnit {
    /// File name, e.g. `Foo.java`.
    pub file_name: String,
    /// Full file contents.
    pub contents: String,
}

impl SourceUnit {
    /// Build the source unit for `code` of the given shape.
    ///
    /// Class-shaped code is used verbatim. Method-shaped code is wrapped in
    /// `public class Snippet` inside `io.codebottle.<username>.<snippet_id>`.
    pub fn for_shape(shape: &SourceShape, code: &str, username: &str, snippet_id: &str) -> Self {
        match shape {
            SourceShape::Class { class_name, .. } => Self {
                file_name: format!("{}.java", class_name),
                contents: code.to_string(),
            },
            SourceShape::Method { .. } => Self {
                file_name: format!("{}.java", WRAPPER_CLASS),
                contents: generate_wrapper(code, username, snippet_id),
            },
        }
    }
}

fn generate_wrapper(code: &str, username: &str, snippet_id: &str) -> String {
    let mut out = String::new();

    out.push_str("// Generated by cb2m from a method snippet\n");
    out.push_str(&format!(
        "package {}{}.{};\n\n",
        NAMESPACE_ROOT,
        java_identifier(username),
        java_identifier(snippet_id)
    ));
    out.push_str(&format!("public class {} {{\n", WRAPPER_CLASS));
    out.push_str(code.trim_end());
    out.push_str("\n}\n");

    out
}

/// Make `raw` usable as a Java package segment.
///
/// Characters outside `[A-Za-z0-9_]` become `_`, and a leading digit gets an
/// underscore prefix.
pub fn java_identifier(raw: &str) -> String {
    let mut ident: String = raw
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if ident.is_empty() || ident.starts_with(|c: char| c.is_ascii_digit()) {
        ident.insert(0, '_');
    }
    ident
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_unit_is_verbatim() {
        let code = "package io.codebottle.alice;\npublic class Foo {}";
        let shape = SourceShape::Class {
            package_suffix: "alice".to_string(),
            class_name: "Foo".to_string(),
        };
        let unit = SourceUnit::for_shape(&shape, code, "alice", "abc123");
        assert_eq!(unit.file_name, "Foo.java");
        assert_eq!(unit.contents, code);
    }

    #[test]
    fn test_method_unit_is_wrapped() {
        let code = "public static void run(){ System.out.println(1); }\n";
        let shape = SourceShape::Method {
            method_name: "run".to_string(),
        };
        let unit = SourceUnit::for_shape(&shape, code, "alice", "abc123");

        assert_eq!(unit.file_name, "Snippet.java");
        assert!(unit.contents.contains("package io.codebottle.alice.abc123;"));
        assert!(unit.contents.contains("public class Snippet {"));
        assert!(unit.contents.contains("public static void run(){ System.out.println(1); }"));
        assert!(unit.contents.trim_end().ends_with('}'));
    }

    #[test]
    fn test_java_identifier() {
        assert_eq!(java_identifier("alice"), "alice");
        assert_eq!(java_identifier("7f3a"), "_7f3a");
        assert_eq!(java_identifier("the-dev.42"), "the_dev_42");
        assert_eq!(java_identifier(""), "_");
    }
}
