//! Default-value literal rendering.

use cg_core::{DefaultValue, RawParameter, TypeRef};

use crate::error::BuildError;

/// The literal for an absent optional value.
pub(crate) const NULL_LITERAL: &str = "null";

/// The literal for a defaulted cancellation token.
pub(crate) const DEFAULT_LITERAL: &str = "default";

/// Renders a declared default value as a source literal.
///
/// Returns `None` for [`DefaultValue::Other`], which has no literal form.
fn render(value: &DefaultValue) -> Option<String> {
    let literal = match value {
        DefaultValue::Null => NULL_LITERAL.to_owned(),
        DefaultValue::String(text) => format!("\"{}\"", escape(text, '"')),
        DefaultValue::Char(c) => format!("'{}'", escape(&c.to_string(), '\'')),
        DefaultValue::Bool(flag) => flag.to_string(),
        DefaultValue::Integer(number) => number.to_string(),
        DefaultValue::Float(number) => number.to_string(),
        DefaultValue::Enum { type_name, member } => format!("{type_name}.{member}"),
        DefaultValue::Other { .. } => return None,
    };
    Some(literal)
}

fn escape(text: &str, quote: char) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            c if c == quote => {
                escaped.push('\\');
                escaped.push(c);
            }
            c => escaped.push(c),
        }
    }
    escaped
}

/// Returns `true` if the parameter must be supplied by callers.
///
/// Model-metadata required-ness only counts for types that may be absent or
/// are already optional.
pub(crate) fn is_required(parameter: &RawParameter, ty: &TypeRef) -> bool {
    parameter.required || (parameter.model_required && (!ty.is_value_type() || ty.is_optional()))
}

/// Computes the default-value literal for a raw parameter emitted as `value_type`.
///
/// An explicit default is rendered as is. Without one, optional parameters
/// default to `null` and required ones get no literal.
///
/// # Errors
///
/// Returns [`BuildError::UnsupportedDefaultValue`] if the declared default
/// has no literal form.
pub(crate) fn default_literal(
    endpoint: &str,
    parameter: &RawParameter,
    value_type: &TypeRef,
) -> Result<Option<String>, BuildError> {
    match &parameter.default {
        Some(DefaultValue::Other { type_name, .. }) => Err(BuildError::unsupported_default(
            endpoint,
            &parameter.name,
            type_name,
        )),
        Some(value) => Ok(render(value)),
        None if is_required(parameter, value_type) => Ok(None),
        None => Ok(Some(NULL_LITERAL.to_owned())),
    }
}
