//! The single-pass extraction visitor.
//!
//! One `VisitMut` walk recognizes every message site, builds its descriptor,
//! and rewrites the site in place: `description` is always stripped,
//! `defaultMessage` optionally, and generated ids are written back so
//! downstream passes see the canonical id. Messages are recorded in pre-order
//! document position, which is the order the host receives them in.
//!
//! A fatal condition (invalid ICU message, unresolvable id) is stored on the
//! visitor and short-circuits the rest of the walk; the caller discards the
//! partially rewritten clone and surfaces the error.

use swc_common::{DUMMY_SP, SourceMap, Span};
use swc_ecma_ast::{
    CallExpr, Callee, Expr, IdentName, JSXAttr, JSXAttrName, JSXAttrOrSpread, JSXAttrValue,
    JSXElement, JSXElementName, JSXExpr, JSXNamespacedName, KeyValueProp, Lit, MemberProp,
    ObjectLit, Prop, PropName, PropOrSpread, Str,
};
use swc_ecma_visit::{VisitMut, VisitMutWith};

use crate::descriptor::{Description, ExtractedMessage, LineCol, MessageDescriptor, SourceLocation};
use crate::error::ExtractError;
use crate::icu::validate_message;
use crate::id::{hash_content, interpolate_pattern};
use crate::options::{ExtractOptions, MULTI_FACTORY, SINGLE_FACTORY};
use crate::value::{StaticValue, normalize_whitespace, resolve_expr, resolve_jsx_value};

/// The four recognized site shapes. Dispatch happens on the variant, never on
/// probing one shape through another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiteKind {
    /// `<FormattedMessage id=".." defaultMessage=".."/>`
    Markup,
    /// `defineMessage({...})`
    SingleFactory,
    /// `defineMessages({a: {...}, b: {...}})`, one descriptor per property
    MultiFactory,
    /// `formatMessage({...})` / `intl.formatMessage({...})`
    Lookup,
}

/// A descriptor field as found at the site. Absent and dynamic are distinct:
/// an absent id falls through to id resolution, a dynamic id skips the site.
#[derive(Debug, Clone, PartialEq, Eq)]
enum FieldState {
    Absent,
    Dynamic,
    Static(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum DescriptionState {
    Absent,
    Dynamic,
    Text(String),
    Object { text: String, metadata: String },
}

#[derive(Debug)]
struct SiteFields {
    id: FieldState,
    default_message: FieldState,
    description: DescriptionState,
}

impl SiteFields {
    /// A site whose attributes carry neither id nor defaultMessage (the
    /// `{...descriptor}` spread form) declares nothing extractable.
    fn declares_nothing(&self) -> bool {
        self.id == FieldState::Absent && self.default_message == FieldState::Absent
    }
}

enum SiteOutcome {
    /// Leave the site completely untouched.
    Skip,
    Extracted {
        descriptor: MessageDescriptor,
        /// The id came from the override fn or the interpolation pattern and
        /// must be written back into the rewritten site.
        generated_id: bool,
    },
}

/// Extracts message descriptors from one module while rewriting it.
pub struct ExtractVisitor<'a> {
    source_map: &'a SourceMap,
    options: &'a ExtractOptions,
    file_path: &'a str,

    pub messages: Vec<ExtractedMessage>,
    pub error: Option<ExtractError>,
}

impl<'a> ExtractVisitor<'a> {
    pub fn new(
        source_map: &'a SourceMap,
        options: &'a ExtractOptions,
        file_path: &'a str,
    ) -> Self {
        Self {
            source_map,
            options,
            file_path,
            messages: Vec::new(),
            error: None,
        }
    }

    fn normalize(&self, text: &str) -> String {
        normalize_whitespace(text, self.options.preserve_whitespace)
    }

    fn field_from_expr(&self, expr: Option<&Expr>) -> FieldState {
        match expr {
            None => FieldState::Absent,
            Some(expr) => match resolve_expr(expr) {
                StaticValue::Resolved(value) => FieldState::Static(self.normalize(&value)),
                StaticValue::NotStatic => FieldState::Dynamic,
            },
        }
    }

    fn field_from_jsx(&self, value: Option<&JSXAttrValue>) -> FieldState {
        match value {
            None => FieldState::Absent,
            Some(value) => match resolve_jsx_value(value) {
                StaticValue::Resolved(text) => FieldState::Static(self.normalize(&text)),
                StaticValue::NotStatic => FieldState::Dynamic,
            },
        }
    }

    fn description_from_expr(&self, expr: &Expr) -> DescriptionState {
        if let StaticValue::Resolved(text) = resolve_expr(expr) {
            return DescriptionState::Text(self.normalize(&text));
        }
        if let Expr::Object(obj) = expr
            && let (FieldState::Static(text), FieldState::Static(metadata)) = (
                self.field_from_expr(find_prop(obj, "text")),
                self.field_from_expr(find_prop(obj, "metadata")),
            )
        {
            return DescriptionState::Object { text, metadata };
        }
        DescriptionState::Dynamic
    }

    fn description_from_jsx(&self, value: Option<&JSXAttrValue>) -> DescriptionState {
        match value {
            None => DescriptionState::Absent,
            Some(JSXAttrValue::JSXExprContainer(container)) => match &container.expr {
                JSXExpr::Expr(expr) => self.description_from_expr(expr),
                JSXExpr::JSXEmptyExpr(_) => DescriptionState::Dynamic,
            },
            Some(value) => match resolve_jsx_value(value) {
                StaticValue::Resolved(text) => DescriptionState::Text(self.normalize(&text)),
                StaticValue::NotStatic => DescriptionState::Dynamic,
            },
        }
    }

    /// Apply the skip rules, ICU validation and id resolution for one site.
    fn build_descriptor(
        &self,
        fields: SiteFields,
        site_span: Span,
    ) -> Result<SiteOutcome, ExtractError> {
        if fields.declares_nothing() || fields.id == FieldState::Dynamic {
            return Ok(SiteOutcome::Skip);
        }

        // A dynamic defaultMessage only drops the field, not the site.
        let default_message = match &fields.default_message {
            FieldState::Static(message) => Some(message.clone()),
            FieldState::Absent | FieldState::Dynamic => None,
        };

        let description = match fields.description {
            DescriptionState::Text(text) => Some(Description::Text(text)),
            DescriptionState::Object { text, metadata } => {
                Some(Description::Object { text, metadata })
            }
            DescriptionState::Absent | DescriptionState::Dynamic => None,
        };

        if let Some(message) = &default_message {
            validate_message(message).map_err(|source| ExtractError::IcuSyntax {
                file: self.file_path.to_string(),
                message_id: match &fields.id {
                    FieldState::Static(id) => Some(id.clone()),
                    _ => None,
                },
                source,
            })?;
        }

        let description_text = description.as_ref().map(|d| d.text().to_string());
        let (id, generated_id) = match fields.id {
            FieldState::Static(id) => (id, false),
            FieldState::Absent => {
                if let Some(override_id) = &self.options.override_id_fn {
                    let id = override_id(
                        None,
                        default_message.as_deref(),
                        description_text.as_deref(),
                        self.file_path,
                    );
                    (id, true)
                } else if let Some(pattern) = &self.options.id_interpolation_pattern {
                    let content = hash_content(
                        default_message.as_deref().unwrap_or(""),
                        description_text.as_deref(),
                    );
                    (interpolate_pattern(pattern, self.file_path, &content), true)
                } else {
                    let loc = self.source_map.lookup_char_pos(site_span.lo);
                    return Err(ExtractError::UnresolvableId {
                        file: self.file_path.to_string(),
                        line: loc.line,
                        col: loc.col_display + 1,
                    });
                }
            }
            FieldState::Dynamic => unreachable!("dynamic ids are skipped above"),
        };

        Ok(SiteOutcome::Extracted {
            descriptor: MessageDescriptor {
                id,
                default_message,
                description,
            },
            generated_id,
        })
    }

    fn source_location(&self, span: Span) -> Option<SourceLocation> {
        if !self.options.extract_source_location {
            return None;
        }
        let start = self.source_map.lookup_char_pos(span.lo);
        let end = self.source_map.lookup_char_pos(span.hi);
        Some(SourceLocation {
            file: self.file_path.to_string(),
            start: LineCol {
                line: start.line,
                col: start.col_display,
            },
            end: LineCol {
                line: end.line,
                col: end.col_display,
            },
        })
    }

    fn record(&mut self, descriptor: MessageDescriptor, site_span: Span) {
        let loc = self.source_location(site_span);
        self.messages.push(ExtractedMessage { descriptor, loc });
    }

    /// Extract and rewrite one object-literal site (factory entry or lookup
    /// argument).
    fn process_object_site(&mut self, obj: &mut ObjectLit, site_span: Span) {
        let fields = SiteFields {
            id: self.field_from_expr(find_prop(obj, "id")),
            default_message: self.field_from_expr(find_prop(obj, "defaultMessage")),
            description: match find_prop(obj, "description") {
                None => DescriptionState::Absent,
                Some(expr) => self.description_from_expr(expr),
            },
        };

        match self.build_descriptor(fields, site_span) {
            Err(error) => self.error = Some(error),
            Ok(SiteOutcome::Skip) => {}
            Ok(SiteOutcome::Extracted {
                descriptor,
                generated_id,
            }) => {
                self.rewrite_object(obj, &descriptor, generated_id);
                self.record(descriptor, site_span);
            }
        }
    }

    fn rewrite_object(&self, obj: &mut ObjectLit, descriptor: &MessageDescriptor, generated_id: bool) {
        obj.props.retain(|prop| match prop {
            PropOrSpread::Prop(prop) => match prop_key(prop).as_deref() {
                Some("description") => false,
                Some("defaultMessage") => !self.options.remove_default_message,
                _ => true,
            },
            PropOrSpread::Spread(_) => true,
        });

        if generated_id {
            obj.props.insert(
                0,
                PropOrSpread::Prop(Box::new(Prop::KeyValue(KeyValueProp {
                    key: PropName::Ident(IdentName::new("id".into(), DUMMY_SP)),
                    value: Box::new(Expr::Lit(Lit::Str(Str::from(descriptor.id.as_str())))),
                }))),
            );
        }
    }

    /// Classify a call expression against the recognized call-site shapes.
    /// Factories must be bare calls; lookups also match member calls by their
    /// final name (`intl.formatMessage`).
    fn classify_call(&self, node: &CallExpr) -> Option<SiteKind> {
        let Callee::Expr(expr) = &node.callee else {
            return None;
        };
        match &**expr {
            Expr::Ident(ident) => {
                let name = ident.sym.as_str();
                if name == SINGLE_FACTORY {
                    Some(SiteKind::SingleFactory)
                } else if name == MULTI_FACTORY {
                    Some(SiteKind::MultiFactory)
                } else if self.options.is_lookup(name) {
                    Some(SiteKind::Lookup)
                } else {
                    None
                }
            }
            Expr::Member(member) => match &member.prop {
                MemberProp::Ident(prop) if self.options.is_lookup(prop.sym.as_str()) => {
                    Some(SiteKind::Lookup)
                }
                _ => None,
            },
            _ => None,
        }
    }

    fn rewrite_jsx_attrs(
        &self,
        attrs: &mut Vec<JSXAttrOrSpread>,
        descriptor: &MessageDescriptor,
        generated_id: bool,
    ) {
        attrs.retain(|attr| match attr {
            JSXAttrOrSpread::JSXAttr(attr) => match jsx_attr_key(&attr.name) {
                "description" => false,
                "defaultMessage" => !self.options.remove_default_message,
                _ => true,
            },
            JSXAttrOrSpread::SpreadElement(_) => true,
        });

        if generated_id {
            attrs.insert(
                0,
                JSXAttrOrSpread::JSXAttr(JSXAttr {
                    span: DUMMY_SP,
                    name: JSXAttrName::Ident(IdentName::new("id".into(), DUMMY_SP)),
                    value: Some(JSXAttrValue::Str(Str::from(
                        descriptor.id.as_str(),
                    ))),
                }),
            );
        }
    }
}

impl VisitMut for ExtractVisitor<'_> {
    fn visit_mut_jsx_element(&mut self, node: &mut JSXElement) {
        if self.error.is_some() {
            return;
        }

        let is_site = matches!(
            &node.opening.name,
            JSXElementName::Ident(ident) if self.options.is_component(ident.sym.as_str())
        );

        if is_site {
            let fields = SiteFields {
                id: self.field_from_jsx(find_jsx_attr(&node.opening.attrs, "id")),
                default_message: self
                    .field_from_jsx(find_jsx_attr(&node.opening.attrs, "defaultMessage")),
                description: self
                    .description_from_jsx(find_jsx_attr(&node.opening.attrs, "description")),
            };

            // The whole element is the extracted construct, so the recorded
            // span runs from `<` to the closing tag.
            match self.build_descriptor(fields, node.span) {
                Err(error) => {
                    self.error = Some(error);
                    return;
                }
                Ok(SiteOutcome::Skip) => {}
                Ok(SiteOutcome::Extracted {
                    descriptor,
                    generated_id,
                }) => {
                    self.rewrite_jsx_attrs(&mut node.opening.attrs, &descriptor, generated_id);
                    self.record(descriptor, node.span);
                }
            }
        }

        node.visit_mut_children_with(self);
    }

    fn visit_mut_call_expr(&mut self, node: &mut CallExpr) {
        if self.error.is_some() {
            return;
        }

        match self.classify_call(node) {
            Some(SiteKind::SingleFactory) | Some(SiteKind::Lookup) => {
                if let Some(arg) = node.args.first_mut()
                    && arg.spread.is_none()
                    && let Expr::Object(obj) = &mut *arg.expr
                {
                    let span = node.span;
                    self.process_object_site(obj, span);
                }
            }
            Some(SiteKind::MultiFactory) => {
                if let Some(arg) = node.args.first_mut()
                    && arg.spread.is_none()
                    && let Expr::Object(obj) = &mut *arg.expr
                {
                    // Each keyed entry is its own site; a skip or error is
                    // scoped to the entry, not the whole call.
                    for prop in &mut obj.props {
                        if self.error.is_some() {
                            return;
                        }
                        if let PropOrSpread::Prop(prop) = prop
                            && let Prop::KeyValue(kv) = &mut **prop
                            && let Expr::Object(entry) = &mut *kv.value
                        {
                            let span = entry.span;
                            self.process_object_site(entry, span);
                        }
                    }
                }
            }
            Some(SiteKind::Markup) | None => {}
        }

        if self.error.is_some() {
            return;
        }
        node.visit_mut_children_with(self);
    }
}

fn jsx_attr_key(name: &JSXAttrName) -> &str {
    match name {
        JSXAttrName::Ident(name)
        | JSXAttrName::JSXNamespacedName(JSXNamespacedName { name, .. }) => name.sym.as_str(),
    }
}

/// Key of an object-literal property, matching bare identifiers and
/// string-literal keys alike.
fn prop_key(prop: &Prop) -> Option<String> {
    let Prop::KeyValue(kv) = prop else {
        return None;
    };
    match &kv.key {
        PropName::Ident(ident) => Some(ident.sym.to_string()),
        PropName::Str(s) => s.value.as_str().map(|s| s.to_string()),
        _ => None,
    }
}

fn find_prop<'n>(obj: &'n ObjectLit, key: &str) -> Option<&'n Expr> {
    obj.props.iter().find_map(|prop| match prop {
        PropOrSpread::Prop(prop) => match &**prop {
            Prop::KeyValue(kv) if prop_key(prop).as_deref() == Some(key) => Some(&*kv.value),
            _ => None,
        },
        PropOrSpread::Spread(_) => None,
    })
}

fn find_jsx_attr<'n>(attrs: &'n [JSXAttrOrSpread], key: &str) -> Option<&'n JSXAttrValue> {
    attrs.iter().find_map(|attr| match attr {
        JSXAttrOrSpread::JSXAttr(attr) if jsx_attr_key(&attr.name) == key => attr.value.as_ref(),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_source;

    fn run(code: &str, options: &ExtractOptions) -> (Vec<ExtractedMessage>, Option<ExtractError>) {
        let mut parsed = parse_source(code.to_string(), "test.tsx").unwrap();
        let mut visitor = ExtractVisitor::new(&parsed.source_map, options, "test.tsx");
        parsed.module.visit_mut_with(&mut visitor);
        (visitor.messages, visitor.error)
    }

    #[test]
    fn test_markup_site_extracts() {
        let (messages, error) = run(
            r#"const App = () => <FormattedMessage id="greeting" defaultMessage="Hello World!"/>;"#,
            &ExtractOptions::default(),
        );
        assert!(error.is_none());
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].descriptor.id, "greeting");
        assert_eq!(
            messages[0].descriptor.default_message.as_deref(),
            Some("Hello World!")
        );
    }

    #[test]
    fn test_dynamic_id_skips_site() {
        let (messages, error) = run(
            r#"const App = () => <FormattedMessage id={`greeting.${name()}`} defaultMessage="Hello"/>;"#,
            &ExtractOptions::default(),
        );
        assert!(error.is_none());
        assert!(messages.is_empty());
    }

    #[test]
    fn test_spread_only_site_skips() {
        let (messages, error) = run(
            "const App = () => <FormattedMessage {...descriptor}/>;",
            &ExtractOptions::default(),
        );
        assert!(error.is_none());
        assert!(messages.is_empty());
    }

    #[test]
    fn test_member_lookup_recognized() {
        let (messages, error) = run(
            r#"const msg = intl.formatMessage({id: "lookup", defaultMessage: "Hi"});"#,
            &ExtractOptions::default(),
        );
        assert!(error.is_none());
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].descriptor.id, "lookup");
    }

    #[test]
    fn test_invalid_icu_is_fatal() {
        let (messages, error) = run(
            r#"const msg = defineMessage({id: "bad", defaultMessage: "{foo! bar"});"#,
            &ExtractOptions::default(),
        );
        assert!(matches!(
            error,
            Some(ExtractError::IcuSyntax { ref message_id, .. }) if message_id.as_deref() == Some("bad")
        ));
        assert!(messages.is_empty());
    }

    #[test]
    fn test_unresolvable_id_is_config_error() {
        let (_, error) = run(
            r#"const msg = defineMessage({defaultMessage: "Hello"});"#,
            &ExtractOptions::default(),
        );
        assert!(matches!(error, Some(ExtractError::UnresolvableId { .. })));
    }
}
