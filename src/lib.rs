//! intl-extract - FormatJS message extraction for JS/TS source
//!
//! intl-extract is a transform library that walks a parsed JavaScript/TypeScript
//! module, finds react-intl message declarations (`<FormattedMessage/>` elements,
//! `defineMessage`/`defineMessages` factory calls, `formatMessage` lookups),
//! validates their ICU content and emits the rewritten module together with the
//! extracted message descriptors and pragma metadata.
//!
//! The library never touches the file system: hosts hand it source text (or an
//! already-parsed swc module) and receive the rewritten tree plus two side
//! artifacts back. Parsing, printing and build-pipeline plumbing stay with the
//! host.
//!
//! ## Module Structure
//!
//! - `extract`: Host-facing entry points and the `Extraction` result
//! - `options`: Extraction configuration (`ExtractOptions`)
//! - `descriptor`: Message descriptor and source-location data types
//! - `visitor`: The single-pass AST visitor (recognize, extract, rewrite)
//! - `value`: Static string resolution and whitespace normalization
//! - `icu`: ICU MessageFormat syntax validation
//! - `id`: Message id resolution (explicit, override fn, interpolation pattern)
//! - `pragma`: Pragma comment scanning into a per-file meta map
//! - `parser`: Convenience TSX parsing for hosts that start from text
//! - `error`: Error types surfaced to the host

pub mod descriptor;
pub mod error;
pub mod extract;
pub mod icu;
pub mod id;
pub mod options;
pub mod parser;
pub mod pragma;
pub mod value;
pub mod visitor;

pub use descriptor::{Description, ExtractedMessage, LineCol, MessageDescriptor, SourceLocation};
pub use error::ExtractError;
pub use extract::{Extraction, extract_module, extract_source};
pub use icu::{IcuError, IcuErrorKind};
pub use options::{ExtractOptions, OverrideIdFn};
