//! Error types for the cg-builder crate.
//!
//! [`BuildError`] covers failures that abort a generation run. Normalization
//! conflicts that the builder can recover from are reported as
//! [`Diagnostic`](crate::Diagnostic)s instead.

use cg_core::ConfigError;

/// Errors that abort building the client model.
///
/// # Examples
///
/// ```
/// use cg_builder::BuildError;
///
/// let err = BuildError::unsupported_default("GET items", "since", "System.DateTime");
/// assert!(matches!(
///     err,
///     BuildError::UnsupportedDefaultValue { ref endpoint, .. } if endpoint == "GET items"
/// ));
/// assert!(err.to_string().contains("System.DateTime"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// A declared default value has a runtime type with no literal form.
    #[error(
        "endpoint '{endpoint}': default value of parameter '{parameter}' has unsupported type {type_name}"
    )]
    UnsupportedDefaultValue {
        /// Display name of the endpoint.
        endpoint: String,
        /// Wire name of the parameter.
        parameter: String,
        /// Runtime type of the default value.
        type_name: String,
    },

    /// An endpoint declares a method that is not a valid HTTP method token.
    #[error("endpoint '{endpoint}': invalid HTTP method '{method}'")]
    InvalidHttpMethod {
        /// Display name of the endpoint.
        endpoint: String,
        /// The declared method.
        method: String,
    },

    /// The builder options are invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl BuildError {
    /// Creates a new [`BuildError::UnsupportedDefaultValue`] error.
    #[inline]
    pub fn unsupported_default(
        endpoint: impl Into<String>,
        parameter: impl Into<String>,
        type_name: impl Into<String>,
    ) -> Self {
        Self::UnsupportedDefaultValue {
            endpoint: endpoint.into(),
            parameter: parameter.into(),
            type_name: type_name.into(),
        }
    }

    /// Creates a new [`BuildError::InvalidHttpMethod`] error.
    #[inline]
    pub fn invalid_method(endpoint: impl Into<String>, method: impl Into<String>) -> Self {
        Self::InvalidHttpMethod {
            endpoint: endpoint.into(),
            method: method.into(),
        }
    }
}
