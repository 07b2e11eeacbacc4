//! Domain types for the client model transformation.
//!
//! - [`type_ref`] - Type descriptors and the type-name resolver
//! - [`endpoint`] - Endpoint descriptions consumed by the builder
//! - [`client`] - Client model produced by the builder

pub mod client;
pub mod endpoint;
pub mod type_ref;

pub use client::{Client, ClientCollection, EndpointMethod, Parameter, ParameterSource};
pub use endpoint::{
    BindingSource, DefaultValue, EndpointOwner, ParameterBinding, RawEndpoint, RawParameter,
    ResponseType, ServiceDescription,
};
pub use type_ref::{AmbiguousTypes, NamedType, Primitive, QualifiedName, TypeRef};
