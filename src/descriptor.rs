//! Message descriptor and source-location data types.
//!
//! A [`MessageDescriptor`] is the translatable unit extracted from one message
//! site: its canonical id, optional default message and optional description.
//! [`ExtractedMessage`] wraps it with the source location computed when
//! `extractSourceLocation` is enabled. All of these serialize to the same JSON
//! shape react-intl tooling expects (camelCase keys, optional fields omitted).

use serde::Serialize;

/// A translator-facing description attached to a message.
///
/// Descriptions are usually plain strings, but the object form carries extra
/// metadata for translation pipelines:
///
/// ```js
/// description: { text: 'Something for the translator.', metadata: 'routed to vendor X' }
/// ```
///
/// Either way the description only survives into the extracted artifact; the
/// rewritten source never contains it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Description {
    /// Plain string description.
    Text(String),
    /// Object description with `text` and `metadata` sub-fields.
    Object { text: String, metadata: String },
}

impl Description {
    /// The translator-facing text, regardless of form.
    pub fn text(&self) -> &str {
        match self {
            Description::Text(text) => text,
            Description::Object { text, .. } => text,
        }
    }
}

/// One extracted message: id, optional default message, optional description.
///
/// `id` is always non-empty; sites whose id cannot be statically resolved are
/// skipped before a descriptor is ever built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageDescriptor {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Description>,
}

/// A line/column pair. Lines are 1-based; columns are 0-based display columns
/// counted from the start of the line (swc's `col_display`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LineCol {
    pub line: usize,
    pub col: usize,
}

/// Span of a message site in its source file, from the opening token to the
/// closing token of the declaring construct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceLocation {
    pub file: String,
    pub start: LineCol,
    pub end: LineCol,
}

/// A [`MessageDescriptor`] plus the source location of its defining construct.
///
/// `loc` is only present when extraction ran with `extractSourceLocation`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedMessage {
    #[serde(flatten)]
    pub descriptor: MessageDescriptor,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loc: Option<SourceLocation>,
}
