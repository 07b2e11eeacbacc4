//! Output model handed to client renderers.

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

use super::type_ref::{AmbiguousTypes, NamedType, TypeRef};

/// Where a normalized parameter is sent in the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterSource {
    /// Route template segment.
    Path,
    /// Query string.
    Query,
    /// Request body.
    Body,
    /// File part of a multipart body.
    File,
    /// Request header.
    Header,
    /// Form field.
    Form,
    /// Not sent over the wire (the cancellation token).
    Other,
}

impl ParameterSource {
    /// Returns the lowercase tag used in serialized output.
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Path => "path",
            Self::Query => "query",
            Self::Body => "body",
            Self::File => "file",
            Self::Header => "header",
            Self::Form => "form",
            Self::Other => "other",
        }
    }
}

/// A normalized endpoint method parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    /// Where the value is sent.
    pub source: ParameterSource,

    /// Client-side type.
    pub value_type: TypeRef,

    /// Name as sent over the wire.
    pub name: String,

    /// Camel-cased, alphanumeric identifier for the client method argument.
    pub local_name: String,

    /// Default value as a source literal. `None` makes the argument mandatory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value_literal: Option<String>,

    /// Header whose value is fixed rather than supplied by callers.
    #[serde(default)]
    pub constant: bool,
}

/// One client method, corresponding to one endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointMethod {
    /// Documentation text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,

    /// HTTP method.
    #[serde(with = "http_method")]
    pub http_method: http::Method,

    /// Route path relative to the service root.
    pub path: String,

    /// Response body type, `void` when there is none.
    pub response_type: TypeRef,

    /// Method name, unique within its client after deduplication.
    pub name: String,

    /// Parameters in emission order.
    pub parameters: Vec<Parameter>,
}

impl EndpointMethod {
    /// Returns `true` if any parameter is sent as a file part.
    #[must_use]
    pub fn is_multipart(&self) -> bool {
        self.parameters
            .iter()
            .any(|parameter| parameter.source == ParameterSource::File)
    }

    /// Parameters a caller supplies, excluding constant headers.
    pub fn callable_parameters(&self) -> impl Iterator<Item = &Parameter> {
        self.parameters.iter().filter(|parameter| !parameter.constant)
    }

    /// Constant headers, emitted as static request headers.
    pub fn constant_headers(&self) -> impl Iterator<Item = &Parameter> {
        self.parameters.iter().filter(|parameter| parameter.constant)
    }

    /// Calls `visit` for every named type the method references.
    ///
    /// Built-in parameter and response types are skipped.
    pub fn for_each_named<'a>(&'a self, visit: &mut impl FnMut(&'a NamedType)) {
        self.parameters
            .iter()
            .map(|parameter| &parameter.value_type)
            .chain(std::iter::once(&self.response_type))
            .filter(|ty| !ty.is_builtin())
            .for_each(|ty| ty.for_each_named(visit));
    }
}

/// One generated client interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    /// Output directory relative to the generation root.
    pub location: Utf8PathBuf,

    /// Namespaces the rendered client must import.
    pub imported_namespaces: Vec<String>,

    /// Namespace the client is declared in.
    pub namespace: String,

    /// Access modifier, verbatim from options.
    pub access_modifier: String,

    /// Client type name.
    pub name: String,

    /// Methods in emission order.
    pub endpoint_methods: Vec<EndpointMethod>,
}

/// Every generated client plus the types that must be emitted fully qualified.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientCollection {
    /// Clients in first-seen group order.
    pub clients: Vec<Client>,

    /// Types whose short name collides with another referenced type.
    pub ambiguous_types: AmbiguousTypes,
}

impl ClientCollection {
    /// Renders a type for emitted source, qualified if it is ambiguous.
    #[must_use]
    pub fn display_name(&self, value_type: &TypeRef) -> String {
        value_type.display_name(&self.ambiguous_types)
    }

    /// Returns the total number of endpoint methods across all clients.
    #[must_use]
    pub fn method_count(&self) -> usize {
        self.clients
            .iter()
            .map(|client| client.endpoint_methods.len())
            .sum()
    }
}

mod http_method {
    use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

    pub fn serialize<S: Serializer>(method: &http::Method, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(method.as_str())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<http::Method, D::Error> {
        let value = String::deserialize(deserializer)?;
        http::Method::from_bytes(value.as_bytes()).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Primitive;

    fn parameter(source: ParameterSource, name: &str, constant: bool) -> Parameter {
        Parameter {
            source,
            value_type: TypeRef::string(),
            name: name.to_owned(),
            local_name: name.to_owned(),
            default_value_literal: None,
            constant,
        }
    }

    fn method(parameters: Vec<Parameter>) -> EndpointMethod {
        EndpointMethod {
            doc: None,
            http_method: http::Method::POST,
            path: "upload".to_owned(),
            response_type: TypeRef::void(),
            name: "Upload".to_owned(),
            parameters,
        }
    }

    #[test]
    fn test_for_each_named_skips_builtin_types() {
        let mut upload = method(vec![
            parameter(ParameterSource::Query, "q", false),
            Parameter {
                value_type: TypeRef::list_of(TypeRef::named("Acme", "Tag")),
                ..parameter(ParameterSource::Body, "tags", false)
            },
        ]);
        upload.response_type = TypeRef::named("Acme", "Receipt").nullable();

        let mut seen = Vec::new();
        upload.for_each_named(&mut |named| seen.push(named.name.as_str()));
        assert_eq!(seen, vec!["List", "Tag", "Receipt"]);

        let plain = method(vec![parameter(ParameterSource::Path, "id", false)]);
        let mut count = 0;
        plain.for_each_named(&mut |_| count += 1);
        assert_eq!(count, 0);
    }

    #[test]
    fn test_is_multipart() {
        let plain = method(vec![parameter(ParameterSource::Body, "body", false)]);
        assert!(!plain.is_multipart());

        let upload = method(vec![parameter(ParameterSource::File, "file", false)]);
        assert!(upload.is_multipart());
    }

    #[test]
    fn test_callable_and_constant_split() {
        let method = method(vec![
            parameter(ParameterSource::Header, "x-version", true),
            parameter(ParameterSource::Query, "q", false),
        ]);

        let callable: Vec<_> = method.callable_parameters().map(|p| p.name.as_str()).collect();
        let constant: Vec<_> = method.constant_headers().map(|p| p.name.as_str()).collect();
        assert_eq!(callable, vec!["q"]);
        assert_eq!(constant, vec!["x-version"]);
    }

    #[test]
    fn test_http_method_serialization() {
        let method = method(Vec::new());
        let json = serde_json::to_value(&method).unwrap();
        assert_eq!(json["http_method"], "POST");

        let parsed: EndpointMethod = serde_json::from_value(json).unwrap();
        assert_eq!(parsed.http_method, http::Method::POST);
    }

    #[test]
    fn test_method_count_and_display_name() {
        let collection = ClientCollection {
            clients: vec![Client {
                location: Utf8PathBuf::new(),
                imported_namespaces: Vec::new(),
                namespace: "Client".to_owned(),
                access_modifier: "public".to_owned(),
                name: "IItemsApi".to_owned(),
                endpoint_methods: vec![method(Vec::new()), method(Vec::new())],
            }],
            ambiguous_types: AmbiguousTypes::new(),
        };

        assert_eq!(collection.method_count(), 2);
        assert_eq!(
            collection.display_name(&TypeRef::array(TypeRef::Primitive(Primitive::Long))),
            "long[]"
        );
    }

    #[test]
    fn test_source_tags_match_serde() {
        for source in [ParameterSource::Path, ParameterSource::File, ParameterSource::Other] {
            let json = serde_json::to_string(&source).unwrap();
            assert_eq!(json, format!("\"{}\"", source.as_str()));
        }
    }
}
