//! Static string resolution and whitespace normalization.
//!
//! Descriptor fields only count when their value is statically known: a string
//! literal or a template literal with no interpolations. Everything else
//! (identifiers, calls, concatenations, templates with `${}` holes) is
//! dynamic, and each call site decides whether dynamic means "skip" or
//! "emit without the field".

use std::sync::LazyLock;

use regex::Regex;
use swc_ecma_ast::{Expr, JSXAttrValue, JSXExpr, Lit};

static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Outcome of resolving an expression to a compile-time string.
///
/// Note the third state lives at the call site: an *absent* field is not
/// `NotStatic`: `<FormattedMessage id="x"/>` has no defaultMessage at all,
/// which is different from `defaultMessage={msg}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StaticValue {
    Resolved(String),
    NotStatic,
}

impl StaticValue {
    pub fn resolved(self) -> Option<String> {
        match self {
            StaticValue::Resolved(value) => Some(value),
            StaticValue::NotStatic => None,
        }
    }
}

/// Resolve an expression to a static string, unwrapping parentheses.
///
/// String literals resolve to their cooked value. Template literals resolve
/// only when they carry no interpolations; their quasis are concatenated.
pub fn resolve_expr(expr: &Expr) -> StaticValue {
    match expr {
        Expr::Lit(Lit::Str(s)) => match s.value.as_str() {
            Some(value) => StaticValue::Resolved(value.to_string()),
            None => StaticValue::NotStatic,
        },
        Expr::Tpl(tpl) if tpl.exprs.is_empty() => {
            let mut value = String::new();
            for quasi in &tpl.quasis {
                match quasi.cooked.as_ref().and_then(|c| c.as_str()) {
                    Some(cooked) => value.push_str(cooked),
                    None => return StaticValue::NotStatic,
                }
            }
            StaticValue::Resolved(value)
        }
        Expr::Paren(paren) => resolve_expr(&paren.expr),
        _ => StaticValue::NotStatic,
    }
}

/// Resolve a JSX attribute value to a static string.
///
/// Covers the plain string form (`id="x"`) and the expression-container forms
/// (`id={"x"}`, `id={`x`}`). Element and fragment values are never static.
pub fn resolve_jsx_value(value: &JSXAttrValue) -> StaticValue {
    match value {
        JSXAttrValue::Str(s) => match s.value.as_str() {
            Some(value) => StaticValue::Resolved(value.to_string()),
            None => StaticValue::NotStatic,
        },
        JSXAttrValue::JSXExprContainer(container) => match &container.expr {
            JSXExpr::Expr(expr) => resolve_expr(expr),
            JSXExpr::JSXEmptyExpr(_) => StaticValue::NotStatic,
        },
        JSXAttrValue::JSXElement(_) | JSXAttrValue::JSXFragment(_) => StaticValue::NotStatic,
    }
}

/// Collapse runs of whitespace to single spaces and trim, unless the caller
/// asked to preserve whitespace verbatim.
pub fn normalize_whitespace(text: &str, preserve: bool) -> String {
    if preserve {
        text.to_string()
    } else {
        WHITESPACE_RE.replace_all(text, " ").trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use swc_common::{DUMMY_SP, SyntaxContext};
    use swc_ecma_ast::{Ident, ParenExpr, Str};

    fn str_expr(value: &str) -> Expr {
        Expr::Lit(Lit::Str(Str::from(value)))
    }

    #[test]
    fn test_string_literal_resolves() {
        assert_eq!(
            resolve_expr(&str_expr("Hello World!")),
            StaticValue::Resolved("Hello World!".to_string())
        );
    }

    #[test]
    fn test_paren_unwraps() {
        let expr = Expr::Paren(ParenExpr {
            span: DUMMY_SP,
            expr: Box::new(str_expr("wrapped")),
        });
        assert_eq!(
            resolve_expr(&expr),
            StaticValue::Resolved("wrapped".to_string())
        );
    }

    #[test]
    fn test_ident_is_not_static() {
        let expr = Expr::Ident(Ident::new("msg".into(), DUMMY_SP, SyntaxContext::empty()));
        assert_eq!(resolve_expr(&expr), StaticValue::NotStatic);
    }

    #[test]
    fn test_normalize_collapses_and_trims() {
        assert_eq!(
            normalize_whitespace("  Hello\n\t  World!  ", false),
            "Hello World!"
        );
    }

    #[test]
    fn test_normalize_preserve_keeps_verbatim() {
        assert_eq!(
            normalize_whitespace("  Hello\n  World!  ", true),
            "  Hello\n  World!  "
        );
    }
}
