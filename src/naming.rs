//! Output file naming.
//!
//! File names come from a template evaluated against the chunk being
//! exported. Three fields are recognized, written Go-template style:
//!
//! | Field | Meaning |
//! |-------|---------|
//! | `{{.DB}}` | database name |
//! | `{{.Table}}` | table name |
//! | `{{.Index}}` | file sequence number, starting at the chunk index |
//!
//! Templates are compiled once, when the configuration is built, so unknown
//! fields are reported before any row is read. The writer appends the file
//! extension; templates never include it.
//!
//! # Example
//!
//! ```rust
//! use tabledump::naming::{FileNamer, OutputTemplate};
//! use tabledump::source::ChunkIdentity;
//!
//! let template = OutputTemplate::parse("{{.DB}}.{{.Table}}.{{.Index}}").unwrap();
//! let mut namer = FileNamer::new(&template, &ChunkIdentity::new("d", "t", 2));
//!
//! assert_eq!(namer.next_name().unwrap(), "d.t.2");
//! assert_eq!(namer.next_name().unwrap(), "d.t.3");
//! ```

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{DumpError, Result};
use crate::source::ChunkIdentity;

/// Template used when none is configured.
pub const DEFAULT_OUTPUT_FILE_TEMPLATE: &str = "{{.DB}}.{{.Table}}.{{.Index}}";

static ACTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{(.*?)\}\}").expect("valid action pattern"));

static FIELD_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\.([A-Za-z_][A-Za-z0-9_]*)$").expect("valid field pattern"));

/// A field a template may reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateField {
    Index,
    Db,
    Table,
}

impl TemplateField {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "Index" => Some(TemplateField::Index),
            "DB" => Some(TemplateField::Db),
            "Table" => Some(TemplateField::Table),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Field(TemplateField),
}

/// A compiled output file name template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OutputTemplate {
    source: String,
    segments: Vec<Segment>,
}

impl OutputTemplate {
    /// Compiles a template, rejecting unknown fields and unbalanced braces.
    pub fn parse(source: &str) -> Result<Self> {
        let mut segments = Vec::new();
        let mut last = 0;

        for caps in ACTION.captures_iter(source) {
            let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            push_literal(source, &source[last..whole.start()], &mut segments)?;

            let action = inner.as_str().trim();
            if action.is_empty() {
                return Err(DumpError::template(source, "empty action '{{}}'"));
            }
            let name = FIELD_REF
                .captures(action)
                .and_then(|c| c.get(1))
                .ok_or_else(|| {
                    DumpError::template(
                        source,
                        format!("unsupported action '{action}', expected a field such as .Index"),
                    )
                })?
                .as_str();
            let field = TemplateField::from_name(name).ok_or_else(|| {
                DumpError::template(
                    source,
                    format!("unknown field '{name}', expected one of Index, DB, Table"),
                )
            })?;
            segments.push(Segment::Field(field));
            last = whole.end();
        }
        push_literal(source, &source[last..], &mut segments)?;

        if segments.is_empty() {
            return Err(DumpError::template(source, "template is empty"));
        }

        Ok(Self {
            source: source.to_string(),
            segments,
        })
    }

    /// The template source text.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Whether the template references `{{.Index}}`.
    ///
    /// Without it, every file of a split table would get the same name.
    pub fn uses_index(&self) -> bool {
        self.segments
            .iter()
            .any(|s| matches!(s, Segment::Field(TemplateField::Index)))
    }

    /// Renders a file base name.
    ///
    /// Fails if the result is not a plain file name: empty, `.`/`..`, or
    /// containing a path separator or NUL byte.
    pub fn render(&self, index: u64, database: &str, table: &str) -> Result<String> {
        let mut name = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => name.push_str(text),
                Segment::Field(TemplateField::Index) => name.push_str(&index.to_string()),
                Segment::Field(TemplateField::Db) => name.push_str(database),
                Segment::Field(TemplateField::Table) => name.push_str(table),
            }
        }

        if let Some(problem) = file_name_problem(&name) {
            return Err(DumpError::template(
                &self.source,
                format!("rendered file name '{name}' {problem}"),
            ));
        }
        Ok(name)
    }
}

/// Why `name` cannot be used as a plain file name inside the output
/// directory, if it cannot.
pub(crate) fn file_name_problem(name: &str) -> Option<&'static str> {
    if name.is_empty() || name == "." || name == ".." {
        Some("is not usable")
    } else if name.contains(['/', '\\', '\0']) {
        Some("contains a path separator")
    } else {
        None
    }
}

fn push_literal(source: &str, text: &str, segments: &mut Vec<Segment>) -> Result<()> {
    if text.contains("{{") {
        return Err(DumpError::template(source, "unterminated action, missing '}}'"));
    }
    if !text.is_empty() {
        segments.push(Segment::Literal(text.to_string()));
    }
    Ok(())
}

impl Default for OutputTemplate {
    fn default() -> Self {
        Self {
            source: DEFAULT_OUTPUT_FILE_TEMPLATE.to_string(),
            segments: vec![
                Segment::Field(TemplateField::Db),
                Segment::Literal(".".to_string()),
                Segment::Field(TemplateField::Table),
                Segment::Literal(".".to_string()),
                Segment::Field(TemplateField::Index),
            ],
        }
    }
}

impl std::str::FromStr for OutputTemplate {
    type Err = DumpError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for OutputTemplate {
    type Error = DumpError;

    fn try_from(s: String) -> Result<Self> {
        Self::parse(&s)
    }
}

impl From<OutputTemplate> for String {
    fn from(template: OutputTemplate) -> Self {
        template.source
    }
}

impl fmt::Display for OutputTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Monotonic file sequence counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceCursor {
    next: u64,
}

impl SequenceCursor {
    pub fn new(start: u64) -> Self {
        Self { next: start }
    }

    /// Returns the current index and moves past it.
    pub fn advance(&mut self) -> u64 {
        let current = self.next;
        self.next += 1;
        current
    }

    /// The index the next [`advance`](Self::advance) will return.
    pub fn peek(&self) -> u64 {
        self.next
    }
}

/// Produces the successive file names of one chunk export.
///
/// One namer lives for one `write_table_data` call.
#[derive(Debug)]
pub struct FileNamer<'t> {
    template: &'t OutputTemplate,
    sequence: SequenceCursor,
    database: String,
    table: String,
}

impl<'t> FileNamer<'t> {
    pub fn new(template: &'t OutputTemplate, identity: &ChunkIdentity) -> Self {
        Self {
            template,
            sequence: SequenceCursor::new(identity.chunk_index),
            database: identity.database.clone(),
            table: identity.table.clone(),
        }
    }

    /// Renders the next base name.
    ///
    /// The index advances even when rendering fails, so an index is never
    /// handed out twice.
    pub fn next_name(&mut self) -> Result<String> {
        let index = self.sequence.advance();
        self.template.render(index, &self.database, &self.table)
    }

    /// The index the next name will use.
    pub fn next_index(&self) -> u64 {
        self.sequence.peek()
    }
}
