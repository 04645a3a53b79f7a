//! A span-preserving view of Terraform configuration, read with `hcl-edit`.
//!
//! The reader turns source text into a [`Body`] tree. Literal values (strings,
//! numbers, bools, tuples, objects) become [`Expression`] nodes, while
//! everything else (references, function calls, conditionals, `for`
//! expressions) is kept as opaque source text. Every attribute, block and label
//! remembers its byte [`Span`], so callers can splice replacement text into the
//! original document without disturbing anything they did not touch.

pub mod body;
pub mod expression;
mod reader;

pub use body::*;
pub use expression::*;

use crate::error::ParseError;

/// A half-open byte range into the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Returns the slice of `src` covered by this span.
    pub fn slice<'a>(&self, src: &'a str) -> &'a str {
        &src[self.start..self.end]
    }
}

/// A traversal such as `cloudflare_access_policy.allow.id`, wherever it
/// appears: attribute values, nested expressions or `${...}` interpolations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    /// The root variable, e.g. `cloudflare_access_policy`.
    pub root: String,
    /// The first attribute after the root, e.g. `allow`.
    pub name: String,
    /// Span of the root variable only.
    pub span: Span,
}

/// A parsed configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Document {
    pub body: Body,
    /// Every reference in the file, in source order.
    pub references: Vec<Reference>,
}

/// Parses a configuration file into its body and references.
pub fn parse_document(src: &str) -> Result<Document, ParseError> {
    let parsed = hcl_edit::parser::parse_body(src).map_err(|err| {
        let location = err.location();
        ParseError::Syntax {
            message: err.message().to_string(),
            line: location.line(),
            column: location.column(),
        }
    })?;
    Ok(reader::read_document(src, &parsed))
}

/// Parses a configuration file into its body.
pub fn parse_body(src: &str) -> Result<Body, ParseError> {
    parse_document(src).map(|document| document.body)
}
