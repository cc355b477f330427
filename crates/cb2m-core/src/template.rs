//! Project descriptor templating.
//!
//! A descriptor template is plain text with `${name}` placeholders. Rendering
//! walks the template line by line and substitutes each placeholder from a
//! [`BuildContext`]:
//!
//! | placeholder           | value                               |
//! |-----------------------|-------------------------------------|
//! | `${snippetId}`        | snippet id                          |
//! | `${revisionId}`       | revision id                         |
//! | `${snippetName}`      | snippet title                       |
//! | `${revisionUrl}`      | link to the revision on the site    |
//! | `${revisionDateYear}` | year the revision was created       |
//!
//! Any other name renders as `null`. Substituted values are never scanned
//! for placeholders again. Templates that produce XML (the built-in POM and
//! any `.xml`/`.pom` file) escape the values they insert.

use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::error::{Error, Result};
use crate::snippet::{Revision, Snippet};

/// Year used when a revision has no usable creation timestamp.
pub const FALLBACK_YEAR: i32 = 2020;

/// Default site that revision URLs point at.
pub const DEFAULT_SITE_URL: &str = "https://codebottle.io";

/// Descriptor shipped with the binary.
const BUILTIN_TEMPLATE: &str = include_str!("../templates/pom.xml");

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{(\w+)\}").expect("placeholder pattern is valid"));

/// Values available to a descriptor template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildContext {
    pub snippet_id: String,
    pub revision_id: String,
    pub snippet_title: String,
    pub revision_url: String,
    /// `None` when the creation year is unknown.
    pub revision_year: Option<i32>,
}

impl BuildContext {
    /// Assemble the context for one revision of a snippet.
    pub fn new(snippet: &Snippet, revision: &Revision, site_url: &str) -> Self {
        Self {
            snippet_id: snippet.id.clone(),
            revision_id: revision.id.to_string(),
            snippet_title: snippet.title.clone(),
            revision_url: format!(
                "{}/s/{}/revisions/{}",
                site_url.trim_end_matches('/'),
                snippet.id,
                revision.id
            ),
            revision_year: revision.created_year(),
        }
    }

    fn lookup(&self, name: &str) -> String {
        match name {
            "snippetId" => self.snippet_id.clone(),
            "revisionId" => self.revision_id.clone(),
            "snippetName" => self.snippet_title.clone(),
            "revisionUrl" => self.revision_url.clone(),
            "revisionDateYear" => self.revision_year.unwrap_or(FALLBACK_YEAR).to_string(),
            _ => "null".to_string(),
        }
    }
}

/// Render template lines against `ctx`, joining the result with `\n`.
///
/// Values are inserted verbatim.
pub fn render<S: AsRef<str>>(template_lines: &[S], ctx: &BuildContext) -> String {
    render_with(template_lines, ctx, false)
}

fn render_with<S: AsRef<str>>(template_lines: &[S], ctx: &BuildContext, xml: bool) -> String {
    template_lines
        .iter()
        .map(|line| render_line(line.as_ref(), ctx, xml))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_line(line: &str, ctx: &BuildContext, xml: bool) -> String {
    PLACEHOLDER
        .replace_all(line, |caps: &Captures| {
            let value = ctx.lookup(&caps[1]);
            if xml { escape_xml(&value) } else { value }
        })
        .into_owned()
}

/// Escape the five XML special characters.
fn escape_xml(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// A loaded descriptor template.
#[derive(Debug, Clone)]
pub struct DescriptorTemplate {
    lines: Vec<String>,
    xml: bool,
}

impl DescriptorTemplate {
    /// The POM template embedded in the binary.
    pub fn builtin() -> Self {
        Self::parse(BUILTIN_TEMPLATE).with_xml_escaping(true)
    }

    /// Split template text into lines. Values are inserted verbatim.
    pub fn parse(text: &str) -> Self {
        Self {
            lines: text.lines().map(str::to_string).collect(),
            xml: false,
        }
    }

    /// Load a template from disk.
    ///
    /// Files ending in `.xml` or `.pom` escape inserted values.
    ///
    /// # Errors
    /// Returns [`Error::TemplateSourceMissing`] if the file cannot be read.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| Error::TemplateSourceMissing {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let xml = matches!(
            path.extension().and_then(|ext| ext.to_str()),
            Some("xml" | "pom")
        );
        Ok(Self::parse(&text).with_xml_escaping(xml))
    }

    /// Choose whether inserted values are XML-escaped.
    pub fn with_xml_escaping(mut self, xml: bool) -> Self {
        self.xml = xml;
        self
    }

    /// Template lines in order.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Render this template against `ctx`.
    pub fn render(&self, ctx: &BuildContext) -> String {
        render_with(&self.lines, ctx, self.xml)
    }
}
