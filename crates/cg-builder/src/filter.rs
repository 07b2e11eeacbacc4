//! Endpoint filtering by owner type name and route path.
//!
//! The [`EndpointFilter`] trait is a predicate over raw endpoints. The
//! builder uses [`SubstringFilter`], configured from the four substring
//! options, to drop endpoints before grouping.
//!
//! # Examples
//!
//! ```
//! use cg_builder::{EndpointFilter, SubstringFilter};
//! use cg_core::{EndpointOwner, RawEndpoint};
//!
//! let filter = SubstringFilter::new().exclude_paths("/internal");
//!
//! assert!(filter.should_keep(&RawEndpoint::new("GET", "items")));
//! assert!(!filter.should_keep(&RawEndpoint::new("GET", "internal/metrics")));
//! ```

use cg_core::{GenerateOptions, RawEndpoint};
use smallvec::SmallVec;

/// A predicate deciding which raw endpoints take part in generation.
pub trait EndpointFilter {
    /// Returns `true` if the endpoint should be kept.
    fn should_keep(&self, endpoint: &RawEndpoint) -> bool;

    /// Returns the endpoints this filter keeps, in input order.
    fn apply<'a>(&self, endpoints: &'a [RawEndpoint]) -> Vec<&'a RawEndpoint> {
        endpoints
            .iter()
            .filter(|endpoint| self.should_keep(endpoint))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Rule {
    ExcludeType(String),
    IncludeType(String),
    ExcludePath(String),
    IncludePath(String),
}

impl Rule {
    fn keeps(&self, endpoint: &RawEndpoint) -> bool {
        match self {
            // Type rules only see endpoints declared on a controller.
            Self::ExcludeType(needle) => endpoint
                .owner
                .as_ref()
                .is_none_or(|owner| !owner.type_name.contains(needle.as_str())),
            Self::IncludeType(needle) => endpoint
                .owner
                .as_ref()
                .is_none_or(|owner| owner.type_name.contains(needle.as_str())),
            Self::ExcludePath(needle) => !endpoint.rooted_path().contains(needle.as_str()),
            Self::IncludePath(needle) => endpoint.rooted_path().contains(needle.as_str()),
        }
    }
}

/// Keeps or drops endpoints by substring matches on owner type name and path.
///
/// All rules compose by intersection. Path rules match against the route
/// path with a leading `/`. Empty substrings are ignored.
///
/// # Examples
///
/// ```
/// use cg_builder::{EndpointFilter, SubstringFilter};
/// use cg_core::{EndpointOwner, RawEndpoint};
///
/// let filter = SubstringFilter::new().include_types("Admin");
///
/// let admin = RawEndpoint::new("GET", "users")
///     .with_owner(EndpointOwner::controller("Api.Admin", "Users"));
/// let public = RawEndpoint::new("GET", "items")
///     .with_owner(EndpointOwner::controller("Api.Public", "Items"));
///
/// assert!(filter.should_keep(&admin));
/// assert!(!filter.should_keep(&public));
/// ```
#[derive(Debug, Clone, Default)]
pub struct SubstringFilter {
    rules: SmallVec<[Rule; 4]>,
}

impl SubstringFilter {
    /// Creates a filter with no rules.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a filter from the substring options.
    #[must_use]
    pub fn from_options(options: &GenerateOptions) -> Self {
        let mut filter = Self::new();
        if let Some(value) = GenerateOptions::non_empty(options.exclude_types.as_ref()) {
            filter = filter.exclude_types(value);
        }
        if let Some(value) = GenerateOptions::non_empty(options.include_types.as_ref()) {
            filter = filter.include_types(value);
        }
        if let Some(value) = GenerateOptions::non_empty(options.exclude_paths.as_ref()) {
            filter = filter.exclude_paths(value);
        }
        if let Some(value) = GenerateOptions::non_empty(options.include_paths.as_ref()) {
            filter = filter.include_paths(value);
        }
        filter
    }

    fn with_rule(mut self, needle: &str, rule: fn(String) -> Rule) -> Self {
        if !needle.is_empty() {
            self.rules.push(rule(needle.to_owned()));
        }
        self
    }

    /// Drops endpoints whose owner type name contains `needle`.
    #[must_use]
    pub fn exclude_types(self, needle: &str) -> Self {
        self.with_rule(needle, Rule::ExcludeType)
    }

    /// Drops endpoints whose owner type name does not contain `needle`.
    #[must_use]
    pub fn include_types(self, needle: &str) -> Self {
        self.with_rule(needle, Rule::IncludeType)
    }

    /// Drops endpoints whose rooted path contains `needle`.
    #[must_use]
    pub fn exclude_paths(self, needle: &str) -> Self {
        self.with_rule(needle, Rule::ExcludePath)
    }

    /// Drops endpoints whose rooted path does not contain `needle`.
    #[must_use]
    pub fn include_paths(self, needle: &str) -> Self {
        self.with_rule(needle, Rule::IncludePath)
    }

    /// Returns `true` if the filter has no rules.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl EndpointFilter for SubstringFilter {
    fn should_keep(&self, endpoint: &RawEndpoint) -> bool {
        self.rules.iter().all(|rule| rule.keeps(endpoint))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cg_core::EndpointOwner;

    fn endpoints() -> Vec<RawEndpoint> {
        vec![
            RawEndpoint::new("GET", "items")
                .with_owner(EndpointOwner::controller("Api.Controllers", "Items")),
            RawEndpoint::new("GET", "admin/users")
                .with_owner(EndpointOwner::controller("Api.Controllers.Admin", "Users")),
            RawEndpoint::new("GET", "health"),
        ]
    }

    fn paths(kept: &[&RawEndpoint]) -> Vec<String> {
        kept.iter().map(|e| e.relative_path.clone()).collect()
    }

    #[test]
    fn test_filter_without_rules_keeps_everything() {
        let endpoints = endpoints();
        assert_eq!(SubstringFilter::new().apply(&endpoints).len(), 3);
    }

    #[test]
    fn test_type_filters_skip_ownerless_endpoints() {
        let endpoints = endpoints();

        let include = SubstringFilter::new().include_types("Admin");
        assert_eq!(paths(&include.apply(&endpoints)), vec!["admin/users", "health"]);

        let exclude = SubstringFilter::new().exclude_types("Admin");
        assert_eq!(paths(&exclude.apply(&endpoints)), vec!["items", "health"]);
    }

    #[test]
    fn test_path_filters_match_rooted_path() {
        let endpoints = endpoints();

        let include = SubstringFilter::new().include_paths("/admin");
        assert_eq!(paths(&include.apply(&endpoints)), vec!["admin/users"]);

        let exclude = SubstringFilter::new().exclude_paths("/health");
        assert_eq!(paths(&exclude.apply(&endpoints)), vec!["items", "admin/users"]);
    }

    #[test]
    fn test_include_without_match_is_empty() {
        let endpoints = endpoints();
        let filter = SubstringFilter::new().include_paths("/nothing-here");
        assert!(filter.apply(&endpoints).is_empty());
    }

    #[test]
    fn test_filters_compose_by_intersection() {
        let endpoints = endpoints();
        let filter = SubstringFilter::new()
            .include_types("Controllers")
            .exclude_paths("/admin");
        assert_eq!(paths(&filter.apply(&endpoints)), vec!["items", "health"]);
    }

    #[test]
    fn test_filter_is_idempotent() {
        let endpoints = endpoints();
        let filter = SubstringFilter::new().exclude_types("Admin").include_paths("/");

        let once: Vec<RawEndpoint> = filter.apply(&endpoints).into_iter().cloned().collect();
        let twice: Vec<RawEndpoint> = filter.apply(&once).into_iter().cloned().collect();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_from_options_ignores_empty_values() {
        let options = GenerateOptions {
            exclude_types: Some(String::new()),
            include_paths: Some("/items".to_owned()),
            ..GenerateOptions::default()
        };
        let filter = SubstringFilter::from_options(&options);
        assert!(!filter.is_empty());
        assert_eq!(filter.rules.len(), 1);
        assert!(SubstringFilter::from_options(&GenerateOptions::default()).is_empty());
    }
}
