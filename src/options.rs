//! Extraction configuration.
//!
//! `ExtractOptions` mirrors the option surface of the babel/swc FormatJS
//! plugins: which component and function names count as message sites, how
//! missing ids are generated, and what the rewritten output keeps. Options
//! deserialize from camelCase JSON so hosts can pass plugin-style config
//! straight through; the override function is programmatic only.

use std::fmt;
use std::sync::Arc;

use serde::Deserialize;

/// Host-supplied id generator, consulted when a site has no static id.
///
/// Arguments: explicit id (always `None` when this is called through the
/// resolution chain), default message, description text, file path. Returns
/// the id to use.
pub type OverrideIdFn =
    Arc<dyn Fn(Option<&str>, Option<&str>, Option<&str>, &str) -> String + Send + Sync>;

/// Names that are always recognized, regardless of configuration.
const COMPONENT_NAMES: &[&str] = &["FormattedMessage"];
const FUNCTION_NAMES: &[&str] = &["formatMessage"];

/// The two descriptor factories. These are fixed API names, not configurable.
pub const SINGLE_FACTORY: &str = "defineMessage";
pub const MULTI_FACTORY: &str = "defineMessages";

#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExtractOptions {
    /// Comment tag whose `key:value` tokens become file-level meta.
    pub pragma: String,
    /// JSX component names recognized in addition to `FormattedMessage`.
    pub additional_component_names: Vec<String>,
    /// Callee names recognized as lookups in addition to `formatMessage`.
    pub additional_function_names: Vec<String>,
    /// Pattern for generated ids, e.g. `[sha512:contenthash:hex:6]`.
    pub id_interpolation_pattern: Option<String>,
    /// Programmatic id generator; takes precedence over the pattern.
    #[serde(skip)]
    pub override_id_fn: Option<OverrideIdFn>,
    /// Strip `defaultMessage` from the rewritten source.
    pub remove_default_message: bool,
    /// Record each site's source span on the extracted message.
    pub extract_source_location: bool,
    /// Keep message whitespace verbatim instead of collapsing it.
    pub preserve_whitespace: bool,
    /// Also return the pristine parsed module alongside the rewritten one.
    pub ast: bool,
}

impl ExtractOptions {
    /// Whether a JSX element name declares a message.
    pub fn is_component(&self, name: &str) -> bool {
        COMPONENT_NAMES.contains(&name)
            || self.additional_component_names.iter().any(|n| n == name)
    }

    /// Whether a callee name is a runtime message lookup.
    pub fn is_lookup(&self, name: &str) -> bool {
        FUNCTION_NAMES.contains(&name)
            || self.additional_function_names.iter().any(|n| n == name)
    }
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            pragma: "@react-intl".to_string(),
            additional_component_names: Vec::new(),
            additional_function_names: Vec::new(),
            id_interpolation_pattern: None,
            override_id_fn: None,
            remove_default_message: false,
            extract_source_location: false,
            preserve_whitespace: false,
            ast: false,
        }
    }
}

impl fmt::Debug for ExtractOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractOptions")
            .field("pragma", &self.pragma)
            .field("additional_component_names", &self.additional_component_names)
            .field("additional_function_names", &self.additional_function_names)
            .field("id_interpolation_pattern", &self.id_interpolation_pattern)
            .field("override_id_fn", &self.override_id_fn.as_ref().map(|_| "<fn>"))
            .field("remove_default_message", &self.remove_default_message)
            .field("extract_source_location", &self.extract_source_location)
            .field("preserve_whitespace", &self.preserve_whitespace)
            .field("ast", &self.ast)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = ExtractOptions::default();
        assert_eq!(options.pragma, "@react-intl");
        assert!(!options.remove_default_message);
        assert!(options.is_component("FormattedMessage"));
        assert!(!options.is_component("CustomMessage"));
        assert!(options.is_lookup("formatMessage"));
        assert!(!options.is_lookup("t"));
    }

    #[test]
    fn test_additional_names() {
        let options = ExtractOptions {
            additional_component_names: vec!["CustomMessage".to_string()],
            additional_function_names: vec!["t".to_string()],
            ..Default::default()
        };
        assert!(options.is_component("CustomMessage"));
        assert!(options.is_lookup("t"));
    }

    #[test]
    fn test_deserialize_camel_case() {
        let options: ExtractOptions = serde_json::from_str(
            r#"{
                "pragma": "@intl-meta",
                "additionalComponentNames": ["CustomMessage"],
                "removeDefaultMessage": true,
                "extractSourceLocation": true
            }"#,
        )
        .unwrap();
        assert_eq!(options.pragma, "@intl-meta");
        assert_eq!(options.additional_component_names, vec!["CustomMessage"]);
        assert!(options.remove_default_message);
        assert!(options.extract_source_location);
        assert!(!options.preserve_whitespace);
    }
}
