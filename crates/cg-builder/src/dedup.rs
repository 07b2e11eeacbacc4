//! Method-name disambiguation and duplicate endpoint removal.
//!
//! Within one client:
//!
//! 1. Methods sharing a name and raw parameter types get a suffix derived
//!    from the part of their path that differs ([`disambiguate_names`]).
//! 2. Methods identical in HTTP method, path, and parameters are reduced to
//!    the last one ([`remove_duplicate_endpoints`]).
//! 3. Methods sharing a name and callable parameter types are reduced to the
//!    last one ([`remove_duplicate_signatures`]).
//!
//! A surviving entry keeps its own position. Every removal is reported.

use std::hash::Hash;

use cg_core::naming::{common_prefix, segments_after, to_pascal_case};
use cg_core::{EndpointMethod, FxHashMap, ParameterSource};
use smallvec::SmallVec;

use crate::diagnostic::{Diagnostic, Diagnostics};

/// Appends path-derived suffixes to methods whose names would collide.
///
/// `raw_signatures[i]` identifies the raw parameter types of `methods[i]`.
/// The suffix is the Pascal-cased remainder of the path after the segments
/// shared by every colliding method. A method whose path is the shared part
/// keeps its name. A suffixed name can still equal an existing method's name;
/// [`remove_duplicate_signatures`] then keeps the later of the two.
pub(crate) fn disambiguate_names(methods: &mut [EndpointMethod], raw_signatures: &[String]) {
    let mut collisions: FxHashMap<(&str, &str), SmallVec<[usize; 4]>> = FxHashMap::default();
    for (index, (method, signature)) in methods.iter().zip(raw_signatures).enumerate() {
        collisions
            .entry((method.name.as_str(), signature.as_str()))
            .or_default()
            .push(index);
    }

    let suffixes: Vec<(usize, String)> = collisions
        .into_values()
        .filter(|indices| indices.len() > 1)
        .flat_map(|indices| {
            let common = common_prefix(indices.iter().map(|&i| methods[i].path.as_str()), "/");
            indices
                .into_iter()
                .map(|i| {
                    let rest = segments_after(&methods[i].path, &common, "/").join("/");
                    (i, to_pascal_case(&rest))
                })
                .collect::<Vec<_>>()
        })
        .collect();

    for (index, suffix) in suffixes {
        methods[index].name.push_str(&suffix);
    }
}

/// Removes methods that repeat the HTTP method, path, and parameters of a later one.
pub(crate) fn remove_duplicate_endpoints(
    client: &str,
    methods: Vec<EndpointMethod>,
    diagnostics: &mut Diagnostics,
) -> Vec<EndpointMethod> {
    keep_last(methods, identity_key, |dropped| {
        diagnostics.report(Diagnostic::DuplicateEndpoint {
            client: client.to_owned(),
            http_method: dropped.http_method.to_string(),
            path: dropped.path.clone(),
        });
    })
}

/// Removes methods that repeat the name and callable parameter types of a later one.
pub(crate) fn remove_duplicate_signatures(
    client: &str,
    methods: Vec<EndpointMethod>,
    diagnostics: &mut Diagnostics,
) -> Vec<EndpointMethod> {
    keep_last(methods, signature_key, |dropped| {
        diagnostics.report(Diagnostic::DuplicateSignature {
            client: client.to_owned(),
            method: dropped.name.clone(),
        });
    })
}

type IdentityKey = (
    http::Method,
    String,
    Vec<(ParameterSource, String, String, Option<String>)>,
);

fn identity_key(method: &EndpointMethod) -> IdentityKey {
    let parameters = method
        .parameters
        .iter()
        .map(|parameter| {
            let constant_value = parameter
                .constant
                .then(|| parameter.default_value_literal.clone())
                .flatten();
            (
                parameter.source,
                parameter.value_type.qualified_name(),
                parameter.name.clone(),
                constant_value,
            )
        })
        .collect();

    (method.http_method.clone(), method.path.clone(), parameters)
}

fn signature_key(method: &EndpointMethod) -> (String, Vec<String>) {
    let types = method
        .callable_parameters()
        .map(|parameter| parameter.value_type.qualified_name())
        .collect();
    (method.name.clone(), types)
}

fn keep_last<K: Hash + Eq>(
    methods: Vec<EndpointMethod>,
    key: impl Fn(&EndpointMethod) -> K,
    mut on_drop: impl FnMut(&EndpointMethod),
) -> Vec<EndpointMethod> {
    let keys: Vec<K> = methods.iter().map(&key).collect();

    let mut last: FxHashMap<&K, usize> = FxHashMap::default();
    for (index, key) in keys.iter().enumerate() {
        last.insert(key, index);
    }

    methods
        .into_iter()
        .zip(&keys)
        .enumerate()
        .filter_map(|(index, (method, key))| {
            if last.get(key) == Some(&index) {
                Some(method)
            } else {
                on_drop(&method);
                None
            }
        })
        .collect()
}
