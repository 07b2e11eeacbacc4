//! Transforms raw endpoint descriptions into a conflict-free client model.
//!
//! # Overview
//!
//! The main entry point is [`ClientModelBuilder`], which runs one
//! generation pass over a [`ServiceDescription`]:
//!
//! ```text
//! raw endpoints
//!     │
//!     ├── SubstringFilter (type and path filters)
//!     ├── grouping (group name + owner namespace, common prefix)
//!     │
//!     ├── per group
//!     │       ├── ParameterClassifier (fragment collapsing, literals)
//!     │       ├── method-name disambiguation
//!     │       └── endpoint and signature deduplication
//!     │
//!     └── TypeUniverse (ambiguous types over the final methods)
//! ```
//!
//! Conflicts the builder can resolve are returned as [`Diagnostic`]s in the
//! [`BuildResult`]. Anything unrepresentable aborts with a [`BuildError`].
//!
//! # Example
//!
//! ```
//! use cg_builder::ClientModelBuilder;
//! use cg_core::{
//!     BindingSource, EndpointOwner, GenerateOptions, Primitive, RawEndpoint, RawParameter,
//!     ResponseType, ServiceDescription, TypeRef,
//! };
//!
//! let service = ServiceDescription {
//!     endpoints: vec![
//!         RawEndpoint::new("GET", "items/{id}")
//!             .with_owner(EndpointOwner::controller("Shop.Controllers", "Items"))
//!             .with_parameter(
//!                 RawParameter::new("id", BindingSource::Path, TypeRef::Primitive(Primitive::Int))
//!                     .required(),
//!             )
//!             .with_response(ResponseType::new(200, TypeRef::named("Shop.Models", "Item"))),
//!     ],
//!     ..ServiceDescription::default()
//! };
//!
//! let builder = ClientModelBuilder::new(GenerateOptions::with_namespace("Shop.Client"))?;
//! let result = builder.build(&service)?;
//!
//! let client = &result.collection.clients[0];
//! assert_eq!(client.name, "IItemsApi");
//! assert_eq!(client.namespace, "Shop.Client");
//! assert_eq!(client.endpoint_methods[0].name, "GetItemsId");
//! # Ok::<(), cg_builder::BuildError>(())
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

mod ambiguity;
mod dedup;
mod diagnostic;
mod error;
mod filter;
mod grouping;
mod literal;
mod parameters;
mod sink;

pub use ambiguity::TypeUniverse;
pub use diagnostic::Diagnostic;
pub use error::BuildError;
pub use filter::{EndpointFilter, SubstringFilter};
pub use sink::{ClientSink, CollectingSink};

use std::collections::BTreeSet;

use camino::Utf8PathBuf;
use cg_core::naming::to_pascal_case;
use cg_core::{
    Client, ClientCollection, EndpointMethod, GenerateOptions, RawEndpoint, ServiceDescription,
    TypeRef,
};
use tracing::{debug, info};

use crate::diagnostic::Diagnostics;
use crate::grouping::{EndpointGroup, common_namespace, group_endpoints, sub_path};
use crate::parameters::ParameterClassifier;

/// Result of building a client model.
#[derive(Debug, Clone)]
pub struct BuildResult {
    /// The finished model.
    pub collection: ClientCollection,

    /// Conflicts resolved during the build, in discovery order.
    pub diagnostics: Vec<Diagnostic>,

    /// Number of endpoints removed by the filters.
    pub filtered_out: usize,
}

impl BuildResult {
    /// Returns `true` if any conflict was resolved during the build.
    #[must_use]
    pub fn has_diagnostics(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    /// Returns the number of diagnostics.
    #[must_use]
    pub fn diagnostic_count(&self) -> usize {
        self.diagnostics.len()
    }
}

/// Builds a [`ClientCollection`] from a [`ServiceDescription`].
///
/// The builder holds validated options and can be reused across runs.
#[derive(Debug, Clone)]
pub struct ClientModelBuilder {
    options: GenerateOptions,
    filter: SubstringFilter,
}

impl ClientModelBuilder {
    /// Creates a builder after validating the options.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::Config`] if the options are invalid.
    pub fn new(options: GenerateOptions) -> Result<Self, BuildError> {
        options.validate()?;
        let filter = SubstringFilter::from_options(&options);
        Ok(Self { options, filter })
    }

    /// Returns the options this builder was created with.
    #[inline]
    #[must_use]
    pub fn options(&self) -> &GenerateOptions {
        &self.options
    }

    /// Runs one generation pass.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::UnsupportedDefaultValue`] if a parameter default
    /// has no literal form, and [`BuildError::InvalidHttpMethod`] if an
    /// endpoint's method is not a valid HTTP method token.
    pub fn build(&self, service: &ServiceDescription) -> Result<BuildResult, BuildError> {
        info!(
            endpoints = service.endpoints.len(),
            known_types = service.known_types.len(),
            "Building client model"
        );

        let kept: Vec<&RawEndpoint> = if self.filter.is_empty() {
            service.endpoints.iter().collect()
        } else {
            self.filter.apply(&service.endpoints)
        };
        let filtered_out = service.endpoints.len() - kept.len();
        debug!(kept = kept.len(), filtered_out, "Filtered endpoints");

        let groups = group_endpoints(kept, service.assembly_name.as_deref());
        let common = common_namespace(&groups);

        let mut diagnostics = Diagnostics::default();
        let clients = groups
            .iter()
            .map(|group| self.build_client(group, &common, &mut diagnostics))
            .collect::<Result<Vec<_>, _>>()?;

        let mut universe = TypeUniverse::with_known_types(&service.known_types);
        for method in clients.iter().flat_map(|client| &client.endpoint_methods) {
            universe.reference_method(method);
        }
        let ambiguous_types = universe.ambiguous_types(&self.options.additional_namespaces);

        let collection = ClientCollection {
            clients,
            ambiguous_types,
        };
        let diagnostics = diagnostics.into_vec();

        info!(
            clients = collection.clients.len(),
            methods = collection.method_count(),
            ambiguous_types = collection.ambiguous_types.len(),
            diagnostics = diagnostics.len(),
            "Client model built"
        );

        Ok(BuildResult {
            collection,
            diagnostics,
            filtered_out,
        })
    }

    fn build_client(
        &self,
        group: &EndpointGroup<'_>,
        common: &str,
        diagnostics: &mut Diagnostics,
    ) -> Result<Client, BuildError> {
        let segments = sub_path(
            &group.namespace,
            common,
            &self.options.namespace_segment_to_strip,
        );

        let name = self.options.client_name(&to_pascal_case(&group.name));
        let namespace = std::iter::once(self.options.namespace.as_str())
            .chain(segments.iter().copied())
            .collect::<Vec<_>>()
            .join(".");
        let location: Utf8PathBuf = segments.iter().copied().collect();

        let mut methods = Vec::with_capacity(group.endpoints.len());
        let mut raw_signatures = Vec::with_capacity(group.endpoints.len());
        for endpoint in &group.endpoints {
            methods.push(self.build_method(endpoint, diagnostics)?);
            raw_signatures.push(raw_signature(endpoint));
        }

        dedup::disambiguate_names(&mut methods, &raw_signatures);
        let methods = dedup::remove_duplicate_endpoints(&name, methods, diagnostics);
        let methods = dedup::remove_duplicate_signatures(&name, methods, diagnostics);

        let imported_namespaces = self.imported_namespaces(&namespace, &methods);

        debug!(
            client = %name,
            namespace = %namespace,
            location = %location,
            methods = methods.len(),
            "Built client"
        );

        Ok(Client {
            location,
            imported_namespaces,
            namespace,
            access_modifier: self.options.access_modifier.clone(),
            name,
            endpoint_methods: methods,
        })
    }

    fn build_method(
        &self,
        endpoint: &RawEndpoint,
        diagnostics: &mut Diagnostics,
    ) -> Result<EndpointMethod, BuildError> {
        let method_token = endpoint
            .http_method
            .as_deref()
            .unwrap_or("GET")
            .to_ascii_uppercase();
        let http_method = http::Method::from_bytes(method_token.as_bytes())
            .map_err(|_| BuildError::invalid_method(endpoint.label(), &method_token))?;

        let name = endpoint
            .route_name
            .as_deref()
            .or(endpoint.action_name.as_deref())
            .filter(|name| !name.is_empty())
            .map_or_else(
                || to_pascal_case(&format!("{method_token} {}", endpoint.relative_path)),
                str::to_owned,
            );

        let response_type = response_type(endpoint).unwrap_or_else(|| {
            diagnostics.report(Diagnostic::MissingResponseType {
                endpoint: endpoint.label().into_owned(),
            });
            TypeRef::void()
        });

        let parameters = ParameterClassifier::new(endpoint, &self.options).classify(diagnostics)?;

        Ok(EndpointMethod {
            doc: endpoint.doc.clone(),
            http_method,
            path: endpoint.relative_path.trim_end_matches('/').to_owned(),
            response_type,
            name,
            parameters,
        })
    }

    /// Namespaces of referenced types, sorted, then the configured extras.
    fn imported_namespaces(&self, own: &str, methods: &[EndpointMethod]) -> Vec<String> {
        let mut referenced: BTreeSet<&str> = BTreeSet::new();
        for method in methods {
            method.for_each_named(&mut |named| {
                referenced.insert(named.namespace.as_str());
            });
        }

        let mut namespaces: Vec<String> = referenced
            .into_iter()
            .filter(|namespace| !namespace.is_empty() && *namespace != own)
            .map(str::to_owned)
            .collect();

        for extra in &self.options.additional_namespaces {
            if !namespaces.contains(extra) {
                namespaces.push(extra.clone());
            }
        }

        namespaces
    }
}

/// Returns the lowest 2xx response type, or `Stream` for file results.
fn response_type(endpoint: &RawEndpoint) -> Option<TypeRef> {
    endpoint
        .responses
        .iter()
        .filter(|response| (200..300).contains(&response.status_code))
        .filter_map(|response| {
            response
                .value_type
                .as_ref()
                .map(|ty| (response.status_code, ty))
        })
        .min_by_key(|(status, _)| *status)
        .map(|(_, ty)| ty.clone())
        .or_else(|| endpoint.returns_file.then(TypeRef::stream))
}

/// Identifies an endpoint's raw parameter types for name disambiguation.
fn raw_signature(endpoint: &RawEndpoint) -> String {
    endpoint
        .parameters
        .iter()
        .map(|parameter| parameter.value_type.qualified_name())
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use cg_core::{
        BindingSource, DefaultValue, EndpointOwner, NamedType, ParameterSource, Primitive,
        QualifiedName, RawParameter, ResponseType,
    };

    fn int() -> TypeRef {
        TypeRef::Primitive(Primitive::Int)
    }

    fn controller(name: &str) -> EndpointOwner {
        EndpointOwner::controller("TestWebApi.Controllers", name)
    }

    fn get(path: &str, owner: &EndpointOwner) -> RawEndpoint {
        RawEndpoint::new("GET", path)
            .with_owner(owner.clone())
            .with_response(ResponseType::new(200, TypeRef::string()))
    }

    fn service(endpoints: Vec<RawEndpoint>) -> ServiceDescription {
        ServiceDescription {
            assembly_name: Some("TestWebApi".to_owned()),
            endpoints,
            known_types: Vec::new(),
        }
    }

    fn build_with(options: GenerateOptions, endpoints: Vec<RawEndpoint>) -> BuildResult {
        ClientModelBuilder::new(options)
            .unwrap()
            .build(&service(endpoints))
            .unwrap()
    }

    fn build(endpoints: Vec<RawEndpoint>) -> BuildResult {
        build_with(GenerateOptions::default(), endpoints)
    }

    #[test]
    fn test_identical_endpoints_yield_one_method() {
        let items = controller("Items");
        let with_id = |e: RawEndpoint| {
            e.with_parameter(RawParameter::new("id", BindingSource::Path, int()).required())
        };

        let result = build(vec![
            with_id(get("items/{id}", &items)),
            with_id(get("items/{id}", &items)),
        ]);

        let clients = &result.collection.clients;
        assert_eq!(clients.len(), 1);
        assert_eq!(clients[0].name, "IItemsApi");
        assert_eq!(clients[0].endpoint_methods.len(), 1);
        assert!(matches!(
            result.diagnostics.as_slice(),
            [Diagnostic::DuplicateEndpoint { .. }]
        ));
    }

    #[test]
    fn test_constant_header_kept_for_static_emission() {
        let endpoint = get("version", &controller("Version")).with_parameter(
            RawParameter::new("x-version", BindingSource::Header, TypeRef::string())
                .constant()
                .with_default(DefaultValue::String("1.0".to_owned())),
        );

        let result = build(vec![endpoint]);
        let method = &result.collection.clients[0].endpoint_methods[0];

        assert_eq!(method.callable_parameters().count(), 0);
        let headers: Vec<_> = method.constant_headers().collect();
        assert_eq!(headers.len(), 1);
        assert_eq!(headers[0].source, ParameterSource::Header);
        assert_eq!(headers[0].default_value_literal.as_deref(), Some("\"1.0\""));
    }

    #[test]
    fn test_cancellation_token_appended() {
        let options = GenerateOptions {
            add_cancellation_token_parameters: true,
            ..GenerateOptions::default()
        };
        let endpoint = get("items/{id}", &controller("Items"))
            .with_parameter(RawParameter::new("id", BindingSource::Path, int()).required());

        let result = build_with(options, vec![endpoint]);
        let parameters = &result.collection.clients[0].endpoint_methods[0].parameters;

        assert_eq!(parameters.len(), 2);
        assert_eq!(parameters[0].name, "id");
        assert_eq!(parameters[1].source, ParameterSource::Other);
        assert_eq!(parameters[1].name, "cancellationToken");
        assert_eq!(parameters[1].default_value_literal.as_deref(), Some("default"));
    }

    #[test]
    fn test_ambiguous_result_types() {
        let reports = controller("Reports");
        let result = build(vec![
            RawEndpoint::new("GET", "a")
                .with_owner(reports.clone())
                .with_response(ResponseType::new(201, TypeRef::named("Acme.Billing", "Result"))),
            RawEndpoint::new("GET", "b")
                .with_owner(reports.clone())
                .with_response(ResponseType::new(200, TypeRef::named("Acme.Shipping", "Result"))),
            RawEndpoint::new("GET", "c")
                .with_owner(reports)
                .with_response(ResponseType::new(200, TypeRef::named("Acme.Shipping", "Result2"))),
        ]);

        let ambiguous = &result.collection.ambiguous_types;
        assert!(ambiguous.contains_name(&QualifiedName::new("Acme.Billing", "Result")));
        assert!(ambiguous.contains_name(&QualifiedName::new("Acme.Shipping", "Result")));
        assert!(!ambiguous.contains_name(&QualifiedName::new("Acme.Shipping", "Result2")));
    }

    #[test]
    fn test_ambiguity_ignores_types_removed_by_dedup() {
        let items = controller("Items");
        let result = build(vec![
            RawEndpoint::new("GET", "items")
                .with_owner(items.clone())
                .with_response(ResponseType::new(200, TypeRef::named("Old", "Item"))),
            RawEndpoint::new("GET", "items")
                .with_owner(items)
                .with_response(ResponseType::new(200, TypeRef::named("New", "Item"))),
        ]);

        assert_eq!(result.collection.method_count(), 1);
        assert!(result.collection.ambiguous_types.is_empty());
    }

    #[test]
    fn test_known_types_in_additional_namespaces() {
        let options = GenerateOptions {
            additional_namespaces: vec!["Vendor.Sdk".to_owned()],
            ..GenerateOptions::default()
        };
        let mut service = service(vec![
            RawEndpoint::new("GET", "items")
                .with_owner(controller("Items"))
                .with_response(ResponseType::new(200, TypeRef::named("Acme", "Item"))),
        ]);
        service.known_types = vec![NamedType::new("Vendor.Sdk", "Item")];

        let result = ClientModelBuilder::new(options).unwrap().build(&service).unwrap();
        let collection = &result.collection;
        assert_eq!(collection.ambiguous_types.len(), 2);
        assert_eq!(
            collection.display_name(&collection.clients[0].endpoint_methods[0].response_type),
            "Acme.Item"
        );
    }

    #[test]
    fn test_sub_path_namespace_and_location() {
        let result = build(vec![
            get("items", &controller("Items")),
            get(
                "admin/users",
                &EndpointOwner::controller("TestWebApi.Controllers.Admin", "Users"),
            ),
        ]);

        let summary: Vec<String> = result
            .collection
            .clients
            .iter()
            .map(|c| format!("{} {} [{}]", c.name, c.namespace, c.location))
            .collect();
        insta::assert_debug_snapshot!(summary, @r#"
        [
            "IItemsApi Client []",
            "IUsersApi Client.Admin [Admin]",
        ]
        "#);
    }

    #[test]
    fn test_strip_segment_below_common_prefix() {
        let result = build(vec![
            get("a", &EndpointOwner::controller("Api.V1.Controllers", "Alpha")),
            get("b", &EndpointOwner::controller("Api.V2.Controllers", "Beta")),
        ]);

        let namespaces: Vec<&str> = result
            .collection
            .clients
            .iter()
            .map(|c| c.namespace.as_str())
            .collect();
        assert_eq!(namespaces, vec!["Client.V1", "Client.V2"]);
    }

    #[test]
    fn test_group_name_fallbacks() {
        let mut labelled = RawEndpoint::new("GET", "todos");
        labelled.group_name = Some("todo-items".to_owned());
        let bare = RawEndpoint::new("GET", "health");

        let result = build(vec![labelled, bare]);
        let names: Vec<&str> = result
            .collection
            .clients
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(names, vec!["ITodoItemsApi", "ITestWebApiApi"]);
    }

    #[test]
    fn test_method_name_preference() {
        let items = controller("Items");
        let mut routed = get("items/a", &items);
        routed.route_name = Some("Named".to_owned());
        routed.action_name = Some("Action".to_owned());
        let mut action = get("items/b", &items);
        action.action_name = Some("Action".to_owned());
        let fallback = get("items/c/", &items);

        let result = build(vec![routed, action, fallback]);
        let methods = &result.collection.clients[0].endpoint_methods;
        let names: Vec<&str> = methods.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Named", "Action", "GetItemsC"]);
        assert_eq!(methods[2].path, "items/c");
    }

    #[test]
    fn test_same_action_name_gets_path_suffix() {
        let items = controller("Items");
        let endpoints = ["items/{id}", "items/{id}/archive"].map(|path| {
            let mut endpoint = get(path, &items)
                .with_parameter(RawParameter::new("id", BindingSource::Path, int()).required());
            endpoint.action_name = Some("Get".to_owned());
            endpoint
        });

        let result = build(endpoints.to_vec());
        let names: Vec<&str> = result.collection.clients[0]
            .endpoint_methods
            .iter()
            .map(|m| m.name.as_str())
            .collect();
        assert_eq!(names, vec!["Get", "GetArchive"]);
        assert!(!result.has_diagnostics());
    }

    #[test]
    fn test_response_type_selection() {
        let items = controller("Items");
        let mut file = RawEndpoint::new("GET", "items/export").with_owner(items.clone());
        file.returns_file = true;
        let typed = RawEndpoint::new("POST", "items")
            .with_owner(items.clone())
            .with_response(ResponseType {
                status_code: 400,
                value_type: Some(TypeRef::named("Acme", "Problem")),
            })
            .with_response(ResponseType::new(201, TypeRef::named("Acme", "Created")))
            .with_response(ResponseType::new(200, TypeRef::named("Acme", "Item")));

        let result = build(vec![file, typed]);
        let methods = &result.collection.clients[0].endpoint_methods;
        assert_eq!(methods[0].response_type, TypeRef::stream());
        assert_eq!(methods[1].response_type, TypeRef::named("Acme", "Item"));
    }

    #[test]
    fn test_missing_response_type_is_void() {
        let result = build(vec![RawEndpoint::new("GET", "health")]);
        let method = &result.collection.clients[0].endpoint_methods[0];
        assert_eq!(method.response_type, TypeRef::void());

        insta::assert_json_snapshot!(result.diagnostics, @r#"
        [
          {
            "kind": "missing_response_type",
            "endpoint": "GET health"
          }
        ]
        "#);
    }

    #[test]
    fn test_diagnostics_name_endpoints_from_json_input() {
        let service: ServiceDescription = serde_json::from_str(
            r#"{"endpoints": [{"http_method": "GET", "relative_path": "health"}]}"#,
        )
        .unwrap();

        let result = ClientModelBuilder::new(GenerateOptions::default())
            .unwrap()
            .build(&service)
            .unwrap();
        insta::assert_snapshot!(
            result.diagnostics[0].to_string(),
            @"endpoint 'GET health': no response type found, assuming void"
        );
    }

    #[test]
    fn test_http_method_normalized() {
        let mut lower = get("items", &controller("Items"));
        lower.http_method = Some("post".to_owned());
        let mut absent = get("items/all", &controller("Items"));
        absent.http_method = None;

        let result = build(vec![lower, absent]);
        let methods = &result.collection.clients[0].endpoint_methods;
        assert_eq!(methods[0].http_method, http::Method::POST);
        assert_eq!(methods[0].name, "PostItems");
        assert_eq!(methods[1].http_method, http::Method::GET);
    }

    #[test]
    fn test_invalid_http_method_is_fatal() {
        let mut endpoint = get("items", &controller("Items"));
        endpoint.http_method = Some("GE T".to_owned());

        let err = ClientModelBuilder::new(GenerateOptions::default())
            .unwrap()
            .build(&service(vec![endpoint]))
            .unwrap_err();
        assert!(matches!(err, BuildError::InvalidHttpMethod { .. }));
    }

    #[test]
    fn test_invalid_options_rejected() {
        let options = GenerateOptions {
            type_name_pattern: "Api".to_owned(),
            ..GenerateOptions::default()
        };
        assert!(matches!(
            ClientModelBuilder::new(options),
            Err(BuildError::Config(_))
        ));
    }

    #[test]
    fn test_filters_applied_before_grouping() {
        let options = GenerateOptions {
            exclude_paths: Some("/internal".to_owned()),
            ..GenerateOptions::default()
        };
        let result = build_with(
            options,
            vec![
                get("items", &controller("Items")),
                get("internal/stats", &controller("Internal")),
            ],
        );
        assert_eq!(result.filtered_out, 1);
        assert_eq!(result.collection.clients.len(), 1);
    }

    #[test]
    fn test_everything_filtered_is_empty() {
        let options = GenerateOptions {
            include_paths: Some("/nothing".to_owned()),
            ..GenerateOptions::default()
        };
        let result = build_with(options, vec![get("items", &controller("Items"))]);
        assert!(result.collection.clients.is_empty());
        assert!(!result.has_diagnostics());
    }

    #[test]
    fn test_imported_namespaces() {
        let options = GenerateOptions {
            additional_namespaces: vec!["Refit".to_owned(), "Acme.Models".to_owned()],
            ..GenerateOptions::default()
        };
        let endpoint = RawEndpoint::new("POST", "items")
            .with_owner(controller("Items"))
            .with_parameter(
                RawParameter::new("item", BindingSource::Body, TypeRef::named("Acme.Models", "Item"))
                    .required(),
            )
            .with_response(ResponseType::new(
                200,
                TypeRef::list_of(TypeRef::named("Acme.Dtos", "ItemDto")),
            ));

        let result = build_with(options, vec![endpoint]);
        insta::assert_debug_snapshot!(result.collection.clients[0].imported_namespaces, @r#"
        [
            "Acme.Dtos",
            "Acme.Models",
            "System.Collections.Generic",
            "Refit",
        ]
        "#);
    }

    #[test]
    fn test_doc_and_access_modifier_passed_through() {
        let options = GenerateOptions {
            access_modifier: "internal".to_owned(),
            ..GenerateOptions::default()
        };
        let mut endpoint = get("items", &controller("Items"));
        endpoint.doc = Some("Lists items.".to_owned());

        let result = build_with(options, vec![endpoint]);
        let client = &result.collection.clients[0];
        assert_eq!(client.access_modifier, "internal");
        assert_eq!(client.endpoint_methods[0].doc.as_deref(), Some("Lists items."));
    }
}
