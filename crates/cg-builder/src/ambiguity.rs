//! Ambiguous type resolution over an explicit type universe.
//!
//! A [`TypeUniverse`] holds every type the generated clients can see: the
//! types the host registered as known, and the types the finished endpoint
//! methods actually reference. A short name is ambiguous when two or more
//! distinct visible types share it.
//!
//! # Examples
//!
//! ```
//! use cg_builder::TypeUniverse;
//! use cg_core::{NamedType, QualifiedName};
//!
//! let mut universe = TypeUniverse::new();
//! universe.reference(&NamedType::new("Acme.Billing", "Result"));
//! universe.reference(&NamedType::new("Acme.Shipping", "Result"));
//! universe.reference(&NamedType::new("Acme.Shipping", "Result2"));
//!
//! let ambiguous = universe.ambiguous_types(&[]);
//! assert_eq!(ambiguous.len(), 2);
//! assert!(ambiguous.contains_name(&QualifiedName::new("Acme.Billing", "Result")));
//! ```

use std::collections::BTreeSet;

use cg_core::{AmbiguousTypes, EndpointMethod, FxHashMap, FxHashSet, NamedType, QualifiedName};
use smallvec::SmallVec;
use tracing::debug;

/// The set of types visible to generated clients during one run.
#[derive(Debug, Clone, Default)]
pub struct TypeUniverse {
    /// Types the host registered, visible only through an imported namespace.
    known: FxHashSet<QualifiedName>,

    /// Types referenced by emitted methods.
    referenced: FxHashSet<QualifiedName>,
}

impl TypeUniverse {
    /// Creates an empty universe.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a universe seeded with the host's known types.
    #[must_use]
    pub fn with_known_types<'a>(known: impl IntoIterator<Item = &'a NamedType>) -> Self {
        Self {
            known: known.into_iter().map(NamedType::qualified).collect(),
            referenced: FxHashSet::default(),
        }
    }

    /// Records a type referenced by emitted code.
    pub fn reference(&mut self, named: &NamedType) {
        self.referenced.insert(named.qualified());
    }

    /// Records every type a method references, including generic arguments.
    pub fn reference_method(&mut self, method: &EndpointMethod) {
        method.for_each_named(&mut |named| self.reference(named));
    }

    /// Returns the number of referenced types.
    #[inline]
    #[must_use]
    pub fn referenced_count(&self) -> usize {
        self.referenced.len()
    }

    /// Computes the ambiguous types.
    ///
    /// The namespaces in scope are those of referenced types plus
    /// `additional_namespaces`. Known types outside that scope are ignored.
    #[must_use]
    pub fn ambiguous_types(&self, additional_namespaces: &[String]) -> AmbiguousTypes {
        let scope: FxHashSet<&str> = self
            .referenced
            .iter()
            .map(|name| name.namespace.as_str())
            .chain(additional_namespaces.iter().map(String::as_str))
            .collect();

        let visible: BTreeSet<&QualifiedName> = self
            .referenced
            .iter()
            .chain(
                self.known
                    .iter()
                    .filter(|name| scope.contains(name.namespace.as_str())),
            )
            .collect();

        let mut by_short_name: FxHashMap<&str, SmallVec<[&QualifiedName; 2]>> =
            FxHashMap::default();
        for name in visible {
            by_short_name.entry(name.name.as_str()).or_default().push(name);
        }

        let ambiguous: AmbiguousTypes = by_short_name
            .into_values()
            .filter(|names| names.len() > 1)
            .flatten()
            .cloned()
            .collect();

        debug!(
            referenced = self.referenced.len(),
            known = self.known.len(),
            ambiguous = ambiguous.len(),
            "Resolved ambiguous types"
        );

        ambiguous
    }
}
