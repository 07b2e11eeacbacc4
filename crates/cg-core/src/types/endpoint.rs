//! Input contract: endpoint descriptions produced by the host service loader.
//!
//! A [`ServiceDescription`] is a snapshot of every endpoint a service
//! declares, already flattened by the loader into [`RawEndpoint`]s. It is
//! consumed read-only by the model builder.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use super::type_ref::{NamedType, TypeRef};

/// Where the framework binds a raw parameter from.
///
/// Unrecognized tags deserialize to [`BindingSource::Other`], which the
/// classifier treats as a query parameter.
///
/// # Examples
///
/// ```
/// use cg_core::BindingSource;
///
/// let source: BindingSource = serde_json::from_str(r#""file""#).unwrap();
/// assert_eq!(source, BindingSource::FormFile);
///
/// let source: BindingSource = serde_json::from_str(r#""services""#).unwrap();
/// assert_eq!(source, BindingSource::Other);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BindingSource {
    /// Route template segment.
    Path,
    /// Query string.
    #[default]
    Query,
    /// Request header.
    Header,
    /// Request body.
    Body,
    /// Form field.
    Form,
    /// Uploaded file in a multipart form.
    #[serde(alias = "file")]
    FormFile,
    /// Any source the framework reports that has no client-side counterpart.
    #[serde(other)]
    Other,
}

/// How a raw parameter relates to the handler argument it was bound to.
///
/// Frameworks flatten a complex argument (a form or query model) into one raw
/// parameter per property. Those entries are [`Fragment`](Self::Fragment)s
/// sharing the owner argument's name and type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParameterBinding {
    /// The raw parameter is the whole handler argument.
    Scalar {
        /// Handler argument name, when it differs from the wire name.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        argument_name: Option<String>,
    },
    /// The raw parameter is one property of a compound handler argument.
    Fragment {
        /// Name of the compound handler argument.
        owner_name: String,
        /// Type of the compound handler argument.
        container_type: TypeRef,
    },
}

impl Default for ParameterBinding {
    fn default() -> Self {
        Self::Scalar {
            argument_name: None,
        }
    }
}

impl ParameterBinding {
    /// Creates a fragment binding.
    #[must_use]
    pub fn fragment(owner_name: impl Into<String>, container_type: TypeRef) -> Self {
        Self::Fragment {
            owner_name: owner_name.into(),
            container_type,
        }
    }

    /// Returns `true` for fragment bindings.
    #[inline]
    #[must_use]
    pub const fn is_fragment(&self) -> bool {
        matches!(self, Self::Fragment { .. })
    }
}

/// A declared default value, tagged with its runtime kind.
///
/// Only [`DefaultValue::Other`] cannot be rendered as a literal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum DefaultValue {
    /// Explicit null.
    Null,
    /// String value.
    String(String),
    /// Single character.
    Char(char),
    /// Boolean value.
    Bool(bool),
    /// Integral value of any width.
    Integer(i64),
    /// Floating-point or decimal value.
    Float(f64),
    /// Enum member.
    Enum {
        /// Short name of the enum type.
        type_name: String,
        /// Member name.
        member: String,
    },
    /// A value of a runtime type with no literal form.
    Other {
        /// Name of the runtime type.
        type_name: String,
        /// Textual form, for diagnostics only.
        value: String,
    },
}

/// One parameter as reported by the framework, before normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawParameter {
    /// Name as sent over the wire.
    pub name: String,

    /// Framework binding source.
    #[serde(default)]
    pub source: BindingSource,

    /// Relationship to the handler argument.
    #[serde(default)]
    pub binding: ParameterBinding,

    /// Declared value type.
    #[serde(default = "TypeRef::string")]
    pub value_type: TypeRef,

    /// Marked required by the framework or its binding.
    #[serde(default)]
    pub required: bool,

    /// Marked required by model metadata.
    #[serde(default)]
    pub model_required: bool,

    /// Declared default value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<DefaultValue>,

    /// Header value fixed by the route declaration, not supplied by callers.
    #[serde(default)]
    pub constant: bool,
}

impl RawParameter {
    /// Creates a scalar parameter with no default.
    #[must_use]
    pub fn new(name: impl Into<String>, source: BindingSource, value_type: TypeRef) -> Self {
        Self {
            name: name.into(),
            source,
            binding: ParameterBinding::default(),
            value_type,
            required: false,
            model_required: false,
            default: None,
            constant: false,
        }
    }

    /// Sets the binding.
    #[must_use]
    pub fn with_binding(mut self, binding: ParameterBinding) -> Self {
        self.binding = binding;
        self
    }

    /// Marks the parameter as required by the framework.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Sets the declared default value.
    #[must_use]
    pub fn with_default(mut self, default: DefaultValue) -> Self {
        self.default = Some(default);
        self
    }

    /// Marks the parameter as a constant header.
    #[must_use]
    pub fn constant(mut self) -> Self {
        self.constant = true;
        self
    }
}

/// A declared response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseType {
    /// HTTP status code.
    pub status_code: u16,

    /// Body type, if the response has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_type: Option<TypeRef>,
}

impl ResponseType {
    /// Creates a response with a body type.
    #[must_use]
    pub fn new(status_code: u16, value_type: TypeRef) -> Self {
        Self {
            status_code,
            value_type: Some(value_type),
        }
    }
}

/// The controller type that declares an endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EndpointOwner {
    /// Group name with any controller suffix removed (`Items` for `ItemsController`).
    pub name: String,

    /// Full type name, matched by type filters.
    pub type_name: String,

    /// Dotted namespace of the owner type.
    #[serde(default)]
    pub namespace: String,
}

impl EndpointOwner {
    /// Creates an owner whose full type name is `namespace.name` + `Controller`.
    #[must_use]
    pub fn controller(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        let namespace = namespace.into();
        let name = name.into();
        let type_name = if namespace.is_empty() {
            format!("{name}Controller")
        } else {
            format!("{namespace}.{name}Controller")
        };

        Self {
            name,
            type_name,
            namespace,
        }
    }
}

/// One discovered HTTP operation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawEndpoint {
    /// HTTP method. `None` means `GET`.
    pub http_method: Option<String>,

    /// Route template relative to the service root, without a leading `/`.
    pub relative_path: String,

    /// Declaring controller, absent for minimal-routing endpoints.
    pub owner: Option<EndpointOwner>,

    /// Explicit group label.
    pub group_name: Option<String>,

    /// Human-readable name, used in diagnostics. See [`RawEndpoint::label`].
    pub display_name: String,

    /// Explicit route name.
    pub route_name: Option<String>,

    /// Handler action name.
    pub action_name: Option<String>,

    /// Parameters in declaration order.
    pub parameters: Vec<RawParameter>,

    /// Declared responses.
    pub responses: Vec<ResponseType>,

    /// The endpoint is declared to return a file.
    pub returns_file: bool,

    /// Documentation text.
    pub doc: Option<String>,
}

impl RawEndpoint {
    /// Creates an endpoint with the given method and relative path.
    #[must_use]
    pub fn new(http_method: impl Into<String>, relative_path: impl Into<String>) -> Self {
        let http_method = http_method.into();
        let relative_path = relative_path.into();
        Self {
            display_name: format!("{http_method} {relative_path}"),
            http_method: Some(http_method),
            relative_path,
            ..Self::default()
        }
    }

    /// Sets the declaring controller.
    #[must_use]
    pub fn with_owner(mut self, owner: EndpointOwner) -> Self {
        self.owner = Some(owner);
        self
    }

    /// Appends a parameter.
    #[must_use]
    pub fn with_parameter(mut self, parameter: RawParameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Appends a response.
    #[must_use]
    pub fn with_response(mut self, response: ResponseType) -> Self {
        self.responses.push(response);
        self
    }

    /// Returns the name diagnostics refer to this endpoint by.
    ///
    /// Falls back to `"<METHOD> <path>"` when no display name was given.
    ///
    /// # Examples
    ///
    /// ```
    /// use cg_core::RawEndpoint;
    ///
    /// let endpoint: RawEndpoint = serde_json::from_str(r#"{"relative_path": "health"}"#).unwrap();
    /// assert_eq!(endpoint.label(), "GET health");
    /// ```
    #[must_use]
    pub fn label(&self) -> Cow<'_, str> {
        if self.display_name.is_empty() {
            let method = self.http_method.as_deref().unwrap_or("GET");
            Cow::Owned(format!("{method} {}", self.relative_path))
        } else {
            Cow::Borrowed(&self.display_name)
        }
    }

    /// Returns the route path with a leading `/`, as matched by path filters.
    #[must_use]
    pub fn rooted_path(&self) -> String {
        format!("/{}", self.relative_path)
    }
}

/// Every endpoint a service declares, plus the types it makes visible.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceDescription {
    /// Name of the service assembly, the last-resort group name.
    pub assembly_name: Option<String>,

    /// Endpoints in discovery order.
    pub endpoints: Vec<RawEndpoint>,

    /// Types exported by the service and its dependencies.
    pub known_types: Vec<NamedType>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Primitive;

    #[test]
    fn test_raw_parameter_defaults_from_json() {
        let parameter: RawParameter = serde_json::from_str(r#"{"name": "q"}"#).unwrap();
        assert_eq!(parameter.source, BindingSource::Query);
        assert_eq!(parameter.value_type, TypeRef::string());
        assert_eq!(parameter.binding, ParameterBinding::default());
        assert!(!parameter.required);
        assert!(parameter.default.is_none());
    }

    #[test]
    fn test_fragment_binding_from_json() {
        let json = r#"{
            "name": "Page",
            "source": "query",
            "binding": {
                "kind": "fragment",
                "owner_name": "paging",
                "container_type": {"named": {"namespace": "Acme", "name": "Paging"}}
            },
            "value_type": {"primitive": "int"}
        }"#;
        let parameter: RawParameter = serde_json::from_str(json).unwrap();
        assert!(parameter.binding.is_fragment());
        assert_eq!(parameter.value_type, TypeRef::Primitive(Primitive::Int));
    }

    #[test]
    fn test_default_value_tagging() {
        let value: DefaultValue =
            serde_json::from_str(r#"{"kind": "integer", "value": 42}"#).unwrap();
        assert_eq!(value, DefaultValue::Integer(42));

        let value: DefaultValue = serde_json::from_str(r#"{"kind": "null"}"#).unwrap();
        assert_eq!(value, DefaultValue::Null);
    }

    #[test]
    fn test_owner_controller_type_name() {
        let owner = EndpointOwner::controller("Acme.Controllers", "Items");
        assert_eq!(owner.type_name, "Acme.Controllers.ItemsController");
        assert_eq!(EndpointOwner::controller("", "Items").type_name, "ItemsController");
    }

    #[test]
    fn test_endpoint_builder() {
        let endpoint = RawEndpoint::new("GET", "items/{id}")
            .with_parameter(RawParameter::new(
                "id",
                BindingSource::Path,
                TypeRef::Primitive(Primitive::Int),
            ))
            .with_response(ResponseType::new(200, TypeRef::named("Acme", "Item")));

        assert_eq!(endpoint.display_name, "GET items/{id}");
        assert_eq!(endpoint.rooted_path(), "/items/{id}");
        assert_eq!(endpoint.parameters.len(), 1);
        assert_eq!(endpoint.responses.len(), 1);
    }

    #[test]
    fn test_service_description_from_minimal_json() {
        let service: ServiceDescription =
            serde_json::from_str(r#"{"endpoints": [{"relative_path": "health"}]}"#).unwrap();
        assert_eq!(service.endpoints.len(), 1);
        assert!(service.endpoints[0].http_method.is_none());
        assert!(service.assembly_name.is_none());
    }

    #[test]
    fn test_label_prefers_display_name() {
        let mut endpoint: RawEndpoint =
            serde_json::from_str(r#"{"http_method": "DELETE", "relative_path": "items/{id}"}"#)
                .unwrap();
        assert!(endpoint.display_name.is_empty());
        assert_eq!(endpoint.label(), "DELETE items/{id}");

        endpoint.display_name = "ItemsController.Delete".to_owned();
        assert_eq!(endpoint.label(), "ItemsController.Delete");
    }
}
