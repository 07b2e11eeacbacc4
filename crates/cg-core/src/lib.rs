//! Core types, configuration, and utilities for the clientgen tool.
//!
//! This crate provides the foundational types used across the workspace:
//!
//! - Input contract ([`RawEndpoint`], [`RawParameter`], [`ServiceDescription`])
//! - Type descriptors and the type-name resolver ([`TypeRef`], [`AmbiguousTypes`])
//! - Output model ([`Parameter`], [`EndpointMethod`], [`Client`], [`ClientCollection`])
//! - Configuration structures ([`GenerateOptions`], [`Config`]) and [`ConfigError`]
//! - Case conversion and common-prefix helpers in [`naming`]
//! - Type aliases for `FxHashMap`/`FxHashSet` (faster than std)

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod naming;
pub mod types;

pub use config::{
    CONTROLLER_PLACEHOLDER, Config, GROUP_PLACEHOLDER, GenerateOptions, OutputConfig,
};
pub use error::ConfigError;
pub use types::{
    AmbiguousTypes, BindingSource, Client, ClientCollection, DefaultValue, EndpointMethod,
    EndpointOwner, NamedType, Parameter, ParameterBinding, ParameterSource, Primitive,
    QualifiedName, RawEndpoint, RawParameter, ResponseType, ServiceDescription, TypeRef,
};

/// A [`HashMap`](std::collections::HashMap) using the Fx hash algorithm.
pub type FxHashMap<K, V> = rustc_hash::FxHashMap<K, V>;

/// A [`HashSet`](std::collections::HashSet) using the Fx hash algorithm.
pub type FxHashSet<V> = rustc_hash::FxHashSet<V>;
