//! Host-facing entry points.
//!
//! Extraction is a pure function of (parsed module, options): the input tree
//! is never mutated. Rewrites happen on a private clone, so an ICU or id
//! failure can never hand back a half-rewritten tree. The host gets either a
//! complete [`Extraction`] or an error.

use std::collections::HashMap;

use swc_common::SourceMap;
use swc_common::comments::SingleThreadedComments;
use swc_ecma_ast::Module;
use swc_ecma_visit::VisitMutWith;

use crate::descriptor::ExtractedMessage;
use crate::error::ExtractError;
use crate::options::ExtractOptions;
use crate::parser::parse_source;
use crate::pragma::collect_pragma_meta;
use crate::visitor::ExtractVisitor;

/// The result of extracting one file.
#[derive(Debug)]
pub struct Extraction {
    /// The rewritten module: descriptions stripped, defaultMessages
    /// optionally stripped, generated ids written back.
    pub module: Module,
    /// Extracted messages in document order.
    pub messages: Vec<ExtractedMessage>,
    /// File-level `key:value` metadata from pragma comments.
    pub meta: HashMap<String, String>,
    /// The pristine parse, present when `options.ast` is set.
    pub raw: Option<Module>,
}

/// Run extraction over an already-parsed module.
pub fn extract_module(
    module: &Module,
    comments: &SingleThreadedComments,
    source_map: &SourceMap,
    file_path: &str,
    options: &ExtractOptions,
) -> Result<Extraction, ExtractError> {
    let meta = collect_pragma_meta(comments, &options.pragma);

    let mut rewritten = module.clone();
    let mut visitor = ExtractVisitor::new(source_map, options, file_path);
    rewritten.visit_mut_with(&mut visitor);

    if let Some(error) = visitor.error {
        return Err(error);
    }

    Ok(Extraction {
        module: rewritten,
        messages: visitor.messages,
        meta,
        raw: options.ast.then(|| module.clone()),
    })
}

/// Parse source text and run extraction over it.
pub fn extract_source(
    code: &str,
    file_path: &str,
    options: &ExtractOptions,
) -> Result<Extraction, ExtractError> {
    let parsed = parse_source(code.to_string(), file_path)?;
    extract_module(
        &parsed.module,
        &parsed.comments,
        &parsed.source_map,
        file_path,
        options,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_module_is_untouched_on_success() {
        let code = r#"const m = defineMessage({id: "x", defaultMessage: "Hi", description: "d"});"#;
        let parsed = parse_source(code.to_string(), "test.tsx").unwrap();
        let before = parsed.module.clone();

        let extraction = extract_module(
            &parsed.module,
            &parsed.comments,
            &parsed.source_map,
            "test.tsx",
            &ExtractOptions::default(),
        )
        .unwrap();

        assert_eq!(parsed.module, before);
        assert_ne!(extraction.module, before);
        assert_eq!(extraction.messages.len(), 1);
    }

    #[test]
    fn test_raw_module_returned_when_ast_set() {
        let code = r#"const m = defineMessage({id: "x", defaultMessage: "Hi", description: "d"});"#;
        let options = ExtractOptions {
            ast: true,
            ..Default::default()
        };
        let parsed = parse_source(code.to_string(), "test.tsx").unwrap();
        let extraction = extract_module(
            &parsed.module,
            &parsed.comments,
            &parsed.source_map,
            "test.tsx",
            &options,
        )
        .unwrap();
        assert_eq!(extraction.raw.as_ref(), Some(&parsed.module));
    }

    #[test]
    fn test_error_yields_no_partial_output() {
        let code = r#"
            const a = defineMessage({id: "ok", defaultMessage: "Fine"});
            const b = defineMessage({id: "bad", defaultMessage: "{foo! bar"});
        "#;
        let err = extract_source(code, "test.tsx", &ExtractOptions::default()).unwrap_err();
        assert!(matches!(err, ExtractError::IcuSyntax { .. }));
    }
}
