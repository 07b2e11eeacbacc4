//! Grouping endpoints into clients and deriving client locations.

use cg_core::naming::{common_prefix, segments_after};
use cg_core::{FxHashMap, RawEndpoint};

/// Endpoints that become one client, keyed by group name and namespace.
#[derive(Debug, Clone)]
pub(crate) struct EndpointGroup<'a> {
    /// Logical group name, before case conversion.
    pub name: String,
    /// Namespace of the declaring controller, empty for ownerless endpoints.
    pub namespace: String,
    /// Endpoints in input order.
    pub endpoints: Vec<&'a RawEndpoint>,
}

/// Returns the group name for an endpoint.
///
/// Preference: owner name, explicit group label, assembly name, empty.
fn group_name(endpoint: &RawEndpoint, assembly_name: Option<&str>) -> String {
    endpoint
        .owner
        .as_ref()
        .map(|owner| owner.name.as_str())
        .or(endpoint.group_name.as_deref().filter(|name| !name.is_empty()))
        .or(assembly_name)
        .unwrap_or_default()
        .to_owned()
}

/// Groups endpoints by (group name, owner namespace), keeping first-seen order.
pub(crate) fn group_endpoints<'a>(
    endpoints: impl IntoIterator<Item = &'a RawEndpoint>,
    assembly_name: Option<&str>,
) -> Vec<EndpointGroup<'a>> {
    let mut index: FxHashMap<(String, String), usize> = FxHashMap::default();
    let mut groups: Vec<EndpointGroup<'a>> = Vec::new();

    for endpoint in endpoints {
        let name = group_name(endpoint, assembly_name);
        let namespace = endpoint
            .owner
            .as_ref()
            .map(|owner| owner.namespace.clone())
            .unwrap_or_default();

        let slot = *index
            .entry((name.clone(), namespace.clone()))
            .or_insert_with(|| {
                groups.push(EndpointGroup {
                    name,
                    namespace,
                    endpoints: Vec::new(),
                });
                groups.len() - 1
            });

        groups[slot].endpoints.push(endpoint);
    }

    groups
}

/// Returns the dotted-segment prefix shared by every group namespace.
pub(crate) fn common_namespace(groups: &[EndpointGroup<'_>]) -> String {
    common_prefix(groups.iter().map(|group| group.namespace.as_str()), ".")
}

/// Returns a group namespace's segments below the common prefix.
///
/// Empty segments and segments equal to `strip` are dropped.
pub(crate) fn sub_path<'a>(namespace: &'a str, common: &str, strip: &str) -> Vec<&'a str> {
    segments_after(namespace, common, ".")
        .into_iter()
        .filter(|segment| *segment != strip)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cg_core::EndpointOwner;

    fn owned(namespace: &str, name: &str, path: &str) -> RawEndpoint {
        RawEndpoint::new("GET", path).with_owner(EndpointOwner::controller(namespace, name))
    }

    #[test]
    fn test_group_name_preference() {
        let with_owner = owned("Api", "Items", "items");
        assert_eq!(group_name(&with_owner, Some("Asm")), "Items");

        let mut labelled = RawEndpoint::new("GET", "todos");
        labelled.group_name = Some("Todos".to_owned());
        assert_eq!(group_name(&labelled, Some("Asm")), "Todos");

        let bare = RawEndpoint::new("GET", "health");
        assert_eq!(group_name(&bare, Some("Asm")), "Asm");
        assert_eq!(group_name(&bare, None), "");
    }

    #[test]
    fn test_group_endpoints_keeps_first_seen_order() {
        let endpoints = [
            owned("Api.Controllers", "Items", "items"),
            owned("Api.Controllers", "Users", "users"),
            owned("Api.Controllers", "Items", "items/{id}"),
            owned("Api.Controllers.V2", "Items", "v2/items"),
        ];

        let groups = group_endpoints(&endpoints, None);
        let summary: Vec<(String, String, usize)> = groups
            .iter()
            .map(|g| (g.name.clone(), g.namespace.clone(), g.endpoints.len()))
            .collect();

        assert_eq!(
            summary,
            vec![
                ("Items".to_owned(), "Api.Controllers".to_owned(), 2),
                ("Users".to_owned(), "Api.Controllers".to_owned(), 1),
                ("Items".to_owned(), "Api.Controllers.V2".to_owned(), 1),
            ]
        );
    }

    #[test]
    fn test_common_namespace() {
        let endpoints = [
            owned("Api.Controllers", "Items", "items"),
            owned("Api.Controllers.Admin", "Users", "users"),
        ];
        let groups = group_endpoints(&endpoints, None);
        assert_eq!(common_namespace(&groups), "Api.Controllers");
    }

    #[test]
    fn test_sub_path_strips_literal_segment_only() {
        assert_eq!(
            sub_path("Api.Controllers.Admin", "Api", "Controllers"),
            vec!["Admin"]
        );
        assert_eq!(
            sub_path("Api.AdminControllers", "Api", "Controllers"),
            vec!["AdminControllers"]
        );
        assert!(sub_path("Api.Controllers", "Api.Controllers", "Controllers").is_empty());
        assert_eq!(sub_path("Api.V1", "", "Controllers"), vec!["Api", "V1"]);
    }
}
