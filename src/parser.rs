//! Convenience TSX parsing for hosts that start from source text.
//!
//! Parsing is otherwise the host's concern; [`crate::extract_module`] accepts
//! an already-parsed module. This wrapper exists for hosts and tests that hold
//! plain source strings.

use swc_common::{FileName, SourceMap, comments::SingleThreadedComments};
use swc_ecma_ast::Module;
use swc_ecma_parser::{Parser, StringInput, Syntax, TsSyntax};

use crate::error::ExtractError;

/// A parsed module plus the side tables extraction needs.
pub struct ParsedSource {
    pub module: Module,
    pub source_map: SourceMap,
    pub comments: SingleThreadedComments,
}

impl std::fmt::Debug for ParsedSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParsedSource")
            .field("module", &self.module)
            .finish_non_exhaustive()
    }
}

/// Parse JSX/TSX source text into a module, keeping comments.
pub fn parse_source(code: String, file_path: &str) -> Result<ParsedSource, ExtractError> {
    let source_map = SourceMap::default();
    let source_file = source_map.new_source_file(FileName::Real(file_path.into()).into(), code);

    let syntax = Syntax::Typescript(TsSyntax {
        tsx: true,
        ..Default::default()
    });
    let comments = SingleThreadedComments::default();
    let mut parser = Parser::new(syntax, StringInput::from(&*source_file), Some(&comments));
    let module = parser.parse_module().map_err(|e| ExtractError::Parse {
        file: file_path.to_string(),
        message: format!("{:?}", e),
    })?;
    Ok(ParsedSource {
        module,
        source_map,
        comments,
    })
}
