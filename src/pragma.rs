//! Pragma comment scanning.
//!
//! Files can carry a pragma comment whose `key:value` tokens become file-level
//! metadata alongside the extracted messages:
//!
//! ```js
//! // @react-intl project:amazing locale:en
//! ```
//!
//! Every comment in the file is scanned, in source order. When the same key
//! appears more than once, the later occurrence wins. The comments themselves
//! are left untouched in the rewritten module.

use std::collections::HashMap;

use swc_common::BytePos;
use swc_common::comments::{Comment, SingleThreadedComments};

/// Collect `key:value` metadata from every comment carrying the pragma tag.
pub fn collect_pragma_meta(
    comments: &SingleThreadedComments,
    pragma: &str,
) -> HashMap<String, String> {
    let (leading, trailing) = comments.borrow_all();

    let mut all: Vec<(BytePos, &Comment)> = Vec::new();
    for (pos, list) in leading.iter().chain(trailing.iter()) {
        for comment in list {
            all.push((*pos, comment));
        }
    }
    all.sort_by_key(|(pos, _)| *pos);

    let mut meta = HashMap::new();
    for (_, comment) in all {
        let Some(rest) = comment.text.trim().strip_prefix(pragma) else {
            continue;
        };
        for token in rest.split_whitespace() {
            if let Some((key, value)) = token.split_once(':') {
                meta.insert(key.to_string(), value.to_string());
            }
        }
    }
    meta
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_source;

    fn meta_of(code: &str, pragma: &str) -> HashMap<String, String> {
        let parsed = parse_source(code.to_string(), "test.tsx").unwrap();
        collect_pragma_meta(&parsed.comments, pragma)
    }

    #[test]
    fn test_pragma_comment_yields_meta() {
        let meta = meta_of("// @react-intl project:amazing\nconst a = 1;", "@react-intl");
        assert_eq!(meta.len(), 1);
        assert_eq!(meta.get("project"), Some(&"amazing".to_string()));
    }

    #[test]
    fn test_block_comment_and_multiple_pairs() {
        let meta = meta_of(
            "/* @react-intl project:amazing locale:en */\nconst a = 1;",
            "@react-intl",
        );
        assert_eq!(meta.get("project"), Some(&"amazing".to_string()));
        assert_eq!(meta.get("locale"), Some(&"en".to_string()));
    }

    #[test]
    fn test_later_occurrence_overwrites() {
        let meta = meta_of(
            "// @react-intl project:first\nconst a = 1;\n// @react-intl project:second\nconst b = 2;",
            "@react-intl",
        );
        assert_eq!(meta.get("project"), Some(&"second".to_string()));
    }

    #[test]
    fn test_unrelated_comments_are_ignored() {
        let meta = meta_of(
            "// plain comment\n// @other-pragma project:x\nconst a = 1;",
            "@react-intl",
        );
        assert!(meta.is_empty());
    }

    #[test]
    fn test_tokens_without_colon_are_skipped() {
        let meta = meta_of("// @react-intl loose project:amazing\nconst a = 1;", "@react-intl");
        assert_eq!(meta.len(), 1);
        assert_eq!(meta.get("project"), Some(&"amazing".to_string()));
    }
}
