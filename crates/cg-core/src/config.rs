//! Configuration structures for the clientgen tool.
//!
//! - [`GenerateOptions`] - Options consumed by the client model builder
//! - [`OutputConfig`] - Where and how the finished model is written
//! - [`Config`] - Root configuration combining all settings
//!
//! All configuration types implement [`Default`]. Configuration files are JSON;
//! missing fields fall back to their defaults.

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Placeholder in [`GenerateOptions::type_name_pattern`] replaced by the group name.
pub const GROUP_PLACEHOLDER: &str = "[group]";

/// Legacy spelling of [`GROUP_PLACEHOLDER`], still accepted.
pub const CONTROLLER_PLACEHOLDER: &str = "[controller]";

/// Options that drive the endpoint-description-to-client-model transformation.
///
/// # Examples
///
/// ```
/// use cg_core::GenerateOptions;
///
/// let options = GenerateOptions::default();
/// assert_eq!(options.namespace, "Client");
/// assert_eq!(options.client_name("WeatherForecast"), "IWeatherForecastApi");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerateOptions {
    /// Root namespace for generated clients.
    pub namespace: String,

    /// Pattern by which client types are named, containing `[group]` or `[controller]`.
    pub type_name_pattern: String,

    /// Access modifier used for generated clients, passed through verbatim.
    pub access_modifier: String,

    /// Append a cancellation token parameter to every endpoint method.
    pub add_cancellation_token_parameters: bool,

    /// Collapse flattened query models into a single parameter of the container type.
    pub use_query_models: bool,

    /// Wrap return types in an API response envelope. Only the renderer reads this.
    pub use_api_responses: bool,

    /// Exclude owner types whose full name contains this substring.
    pub exclude_types: Option<String>,

    /// Include only owner types whose full name contains this substring.
    pub include_types: Option<String>,

    /// Exclude endpoints whose `/`-prefixed path contains this substring.
    pub exclude_paths: Option<String>,

    /// Include only endpoints whose `/`-prefixed path contains this substring.
    pub include_paths: Option<String>,

    /// Namespaces appended to every client's import list.
    pub additional_namespaces: Vec<String>,

    /// Namespace segment dropped when deriving a client's sub-path.
    pub namespace_segment_to_strip: String,

    /// Hosting environment name handed to the service loader.
    pub environment: Option<String>,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            namespace: "Client".to_owned(),
            type_name_pattern: format!("I{CONTROLLER_PLACEHOLDER}Api"),
            access_modifier: "public".to_owned(),
            add_cancellation_token_parameters: false,
            use_query_models: false,
            use_api_responses: false,
            exclude_types: None,
            include_types: None,
            exclude_paths: None,
            include_paths: None,
            additional_namespaces: Vec::new(),
            namespace_segment_to_strip: "Controllers".to_owned(),
            environment: None,
        }
    }
}

impl GenerateOptions {
    /// Creates options with the given root namespace and defaults elsewhere.
    #[must_use]
    pub fn with_namespace(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            ..Self::default()
        }
    }

    /// Substitutes an already Pascal-cased group name into the type-name pattern.
    ///
    /// # Examples
    ///
    /// ```
    /// use cg_core::GenerateOptions;
    ///
    /// let options = GenerateOptions {
    ///     type_name_pattern: "[group]Client".to_owned(),
    ///     ..GenerateOptions::default()
    /// };
    /// assert_eq!(options.client_name("Items"), "ItemsClient");
    /// ```
    #[must_use]
    pub fn client_name(&self, group_pascal: &str) -> String {
        self.type_name_pattern
            .replace(CONTROLLER_PLACEHOLDER, group_pascal)
            .replace(GROUP_PLACEHOLDER, group_pascal)
    }

    /// Checks option values that would otherwise produce an unusable model.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidOption`] if the namespace is empty or has
    /// an empty dotted segment, or if the type-name pattern has no placeholder.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.namespace.trim().is_empty() {
            return Err(ConfigError::invalid_option(
                "namespace",
                "must not be empty",
            ));
        }

        if self.namespace.split('.').any(|segment| segment.trim().is_empty()) {
            return Err(ConfigError::invalid_option(
                "namespace",
                format!("'{}' contains an empty segment", self.namespace),
            ));
        }

        if !self.type_name_pattern.contains(GROUP_PLACEHOLDER)
            && !self.type_name_pattern.contains(CONTROLLER_PLACEHOLDER)
        {
            return Err(ConfigError::invalid_option(
                "type_name_pattern",
                format!(
                    "'{}' must contain {GROUP_PLACEHOLDER} or {CONTROLLER_PLACEHOLDER}",
                    self.type_name_pattern
                ),
            ));
        }

        Ok(())
    }

    /// Returns the filter value if it is set and non-empty.
    #[must_use]
    pub fn non_empty(filter: Option<&String>) -> Option<&str> {
        filter.map(String::as_str).filter(|value| !value.is_empty())
    }
}

/// Output settings for the generation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output directory. `None` writes the whole collection to stdout.
    pub out_path: Option<Utf8PathBuf>,

    /// Pretty-print JSON output.
    pub pretty: bool,
}

/// Root configuration for the clientgen tool.
///
/// # Examples
///
/// ```
/// use cg_core::Config;
///
/// let config = Config::from_json_str(r#"{"generate": {"namespace": "Acme.Api"}}"#).unwrap();
/// assert_eq!(config.generate.namespace, "Acme.Api");
/// assert_eq!(config.generate.access_modifier, "public");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Model builder options.
    pub generate: GenerateOptions,

    /// Output settings.
    pub output: OutputConfig,
}

impl Config {
    /// Parses a configuration from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if the text is not valid configuration JSON.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Loads a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPath`] if `path` is not a file,
    /// [`ConfigError::Io`] if it cannot be read, and [`ConfigError::Parse`] if
    /// it is not valid configuration JSON.
    pub fn load(path: &Utf8Path) -> Result<Self, ConfigError> {
        if !path.is_file() {
            return Err(ConfigError::InvalidPath {
                path: path.to_owned(),
                reason: "configuration file does not exist".to_owned(),
            });
        }

        let contents = std::fs::read_to_string(path.as_std_path())?;
        Self::from_json_str(&contents)
    }
}
