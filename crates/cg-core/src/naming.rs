//! Case conversion and common-prefix helpers.
//!
//! Client, method, and parameter names are derived from controller names,
//! route templates, and argument names. These helpers keep that derivation
//! consistent across the builder.
//!
//! # Examples
//!
//! ```
//! use cg_core::naming::{common_prefix, to_camel_case, to_pascal_case};
//!
//! assert_eq!(to_pascal_case("GET items/{id}"), "GetItemsId");
//! assert_eq!(to_camel_case("HeaderParam"), "headerParam");
//! assert_eq!(common_prefix(["Api.Controllers.V1", "Api.Controllers"], "."), "Api.Controllers");
//! ```

/// Lower-cases the first character and leaves the rest untouched.
///
/// # Examples
///
/// ```
/// use cg_core::naming::to_camel_case;
///
/// assert_eq!(to_camel_case("WeatherForecast"), "weatherForecast");
/// assert_eq!(to_camel_case(""), "");
/// ```
#[must_use]
pub fn to_camel_case(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Converts arbitrary text into a `PascalCase` identifier.
///
/// The input is split on runs of characters that are not ASCII letters or
/// digits. A part written entirely in upper case keeps its first letter and
/// lower-cases the rest (`GET` becomes `Get`); any other part has its first
/// letter upper-cased and the remainder kept as is.
///
/// # Examples
///
/// ```
/// use cg_core::naming::to_pascal_case;
///
/// assert_eq!(to_pascal_case("weather-forecast"), "WeatherForecast");
/// assert_eq!(to_pascal_case("POST api/v2/items"), "PostApiV2Items");
/// assert_eq!(to_pascal_case("getHTTPStatus"), "GetHTTPStatus");
/// ```
#[must_use]
pub fn to_pascal_case(value: &str) -> String {
    let mut result = String::with_capacity(value.len());

    for part in value.split(|c: char| !c.is_ascii_alphanumeric()) {
        let mut chars = part.chars();
        let Some(first) = chars.next() else {
            continue;
        };

        result.push(first.to_ascii_uppercase());

        let rest = chars.as_str();
        if part.to_ascii_uppercase() == part {
            result.push_str(&rest.to_ascii_lowercase());
        } else {
            result.push_str(rest);
        }
    }

    result
}

/// Removes every character that is not a letter or digit.
///
/// # Examples
///
/// ```
/// use cg_core::naming::strip_non_alphanumeric;
///
/// assert_eq!(strip_non_alphanumeric("x-api-version"), "xapiversion");
/// assert_eq!(strip_non_alphanumeric("filter[name]"), "filtername");
/// ```
#[must_use]
pub fn strip_non_alphanumeric(value: &str) -> String {
    value.chars().filter(|c| c.is_alphanumeric()).collect()
}

/// Returns the longest run of leading segments shared by every value.
///
/// Segments are compared for equality after splitting on `separator`, so
/// `Api.Item` and `Api.Items` share only `Api`. An empty input yields an
/// empty string.
///
/// # Examples
///
/// ```
/// use cg_core::naming::common_prefix;
///
/// assert_eq!(common_prefix(["items/{id}", "items/{id}/tags"], "/"), "items/{id}");
/// assert_eq!(common_prefix(["Api.Item", "Api.Items"], "."), "Api");
/// assert_eq!(common_prefix(Vec::<&str>::new(), "."), "");
/// ```
#[must_use]
pub fn common_prefix<I, S>(values: I, separator: &str) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let values: Vec<S> = values.into_iter().collect();
    let split: Vec<Vec<&str>> = values
        .iter()
        .map(|value| value.as_ref().split(separator).collect())
        .collect();

    let Some((first, rest)) = split.split_first() else {
        return String::new();
    };

    let shared = first
        .iter()
        .enumerate()
        .take_while(|(i, part)| rest.iter().all(|other| other.get(*i) == Some(*part)))
        .count();

    first[..shared].join(separator)
}

/// Returns the segments of `value` that follow its `prefix` segments.
///
/// Empty segments are discarded.
///
/// # Examples
///
/// ```
/// use cg_core::naming::segments_after;
///
/// assert_eq!(segments_after("items/{id}/tags", "items", "/"), vec!["{id}", "tags"]);
/// assert!(segments_after("items", "items", "/").is_empty());
/// ```
#[must_use]
pub fn segments_after<'a>(value: &'a str, prefix: &str, separator: &str) -> Vec<&'a str> {
    let skip = if prefix.is_empty() {
        0
    } else {
        prefix.split(separator).count()
    };

    value
        .split(separator)
        .skip(skip)
        .filter(|segment| !segment.is_empty())
        .collect()
}
