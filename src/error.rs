//! Error types surfaced to the host.
//!
//! Extraction either succeeds for a whole file or fails for the whole file:
//! an invalid ICU message or an unresolvable id aborts the pass and no partial
//! output is produced. Per-site skips (dynamic ids, spread-only elements) are
//! not errors.

use thiserror::Error;

use crate::icu::IcuError;

/// A fatal extraction failure for one file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    /// The source text could not be parsed as a TSX module. Only produced by
    /// [`crate::extract_source`]; hosts that parse themselves never see it.
    #[error("failed to parse {file}: {message}")]
    Parse { file: String, message: String },

    /// A default message failed ICU MessageFormat validation.
    #[error("SyntaxError: {source}")]
    IcuSyntax {
        file: String,
        /// The declared id of the offending message, when it had a static one.
        message_id: Option<String>,
        #[source]
        source: IcuError,
    },

    /// A message site declared content but no id could be produced: no static
    /// id, no override function, no interpolation pattern. This is a
    /// configuration error, not a per-site skip.
    #[error("unable to resolve a message id at {file}:{line}:{col}")]
    UnresolvableId { file: String, line: usize, col: usize },
}
