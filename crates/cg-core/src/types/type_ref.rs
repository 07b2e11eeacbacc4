//! Type descriptors and the type-name resolver.
//!
//! The host service describes parameter and response types as [`TypeRef`]
//! trees. The builder inspects them (is this an uploaded file? a value type?)
//! and renderers turn them back into source text with [`TypeRef::display_name`],
//! qualifying any type listed in [`AmbiguousTypes`].
//!
//! # Examples
//!
//! ```
//! use cg_core::{AmbiguousTypes, NamedType, Primitive, TypeRef};
//!
//! let list = TypeRef::list_of(TypeRef::named("Acme.Models", "Result"));
//! let mut ambiguous = AmbiguousTypes::new();
//! assert_eq!(list.display_name(&ambiguous), "List<Result>");
//!
//! ambiguous.insert(NamedType::new("Acme.Models", "Result").qualified());
//! assert_eq!(list.display_name(&ambiguous), "List<Acme.Models.Result>");
//!
//! let id = TypeRef::Primitive(Primitive::Int).nullable();
//! assert_eq!(id.display_name(&ambiguous), "int?");
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

const HTTP_NAMESPACE: &str = "Microsoft.AspNetCore.Http";
const COLLECTIONS_NAMESPACE: &str = "System.Collections.Generic";
const IO_NAMESPACE: &str = "System.IO";
const THREADING_NAMESPACE: &str = "System.Threading";
const TASKS_NAMESPACE: &str = "System.Threading.Tasks";

/// Built-in types that render as a language keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum Primitive {
    /// No value.
    Void,
    /// The root object type.
    Object,
    /// Signed 8-bit integer.
    SByte,
    /// Unsigned 8-bit integer.
    Byte,
    /// Signed 16-bit integer.
    Short,
    /// Unsigned 16-bit integer.
    UShort,
    /// Signed 32-bit integer.
    Int,
    /// Unsigned 32-bit integer.
    UInt,
    /// Signed 64-bit integer.
    Long,
    /// Unsigned 64-bit integer.
    ULong,
    /// 128-bit decimal.
    Decimal,
    /// 32-bit float.
    Float,
    /// 64-bit float.
    Double,
    /// Boolean.
    Bool,
    /// Single UTF-16 character.
    Char,
    /// String.
    String,
}

impl Primitive {
    /// Returns the keyword this type renders as.
    ///
    /// # Examples
    ///
    /// ```
    /// use cg_core::Primitive;
    ///
    /// assert_eq!(Primitive::ULong.keyword(), "ulong");
    /// assert_eq!(Primitive::String.keyword(), "string");
    /// ```
    #[inline]
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Void => "void",
            Self::Object => "object",
            Self::SByte => "sbyte",
            Self::Byte => "byte",
            Self::Short => "short",
            Self::UShort => "ushort",
            Self::Int => "int",
            Self::UInt => "uint",
            Self::Long => "long",
            Self::ULong => "ulong",
            Self::Decimal => "decimal",
            Self::Float => "float",
            Self::Double => "double",
            Self::Bool => "bool",
            Self::Char => "char",
            Self::String => "string",
        }
    }

    /// Returns `true` if values of this type can never be absent.
    #[inline]
    #[must_use]
    pub const fn is_value_type(self) -> bool {
        !matches!(self, Self::Void | Self::Object | Self::String)
    }
}

/// A namespace plus a short type name, ignoring generic arguments.
///
/// This is the identity used for ambiguity detection: `List<int>` and
/// `List<string>` share the qualified name `System.Collections.Generic.List`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QualifiedName {
    /// Dotted namespace, possibly empty.
    pub namespace: String,
    /// Short type name without generic arity.
    pub name: String,
}

impl QualifiedName {
    /// Creates a qualified name.
    #[must_use]
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace.is_empty() {
            f.write_str(&self.name)
        } else {
            write!(f, "{}.{}", self.namespace, self.name)
        }
    }
}

/// A user-defined or framework type, optionally generic.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NamedType {
    /// Dotted namespace, possibly empty.
    pub namespace: String,

    /// Short type name without generic arity (`List`, not ``List`1``).
    pub name: String,

    /// Generic type arguments, in declaration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<TypeRef>,

    /// `true` for structs and enums, which can never be absent.
    #[serde(default)]
    pub value_type: bool,
}

impl NamedType {
    /// Creates a non-generic reference type.
    #[must_use]
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            args: Vec::new(),
            value_type: false,
        }
    }

    /// Returns the qualified name identifying this type's definition.
    #[must_use]
    pub fn qualified(&self) -> QualifiedName {
        QualifiedName::new(&self.namespace, &self.name)
    }

    fn is(&self, namespace: &str, name: &str) -> bool {
        self.namespace == namespace && self.name == name
    }
}

/// Describes the type of a parameter or response.
///
/// Serialized in externally tagged form, e.g. `{"primitive": "int"}` or
/// `{"array": {"named": {"namespace": "Acme", "name": "Item"}}}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeRef {
    /// A built-in keyword type.
    Primitive(Primitive),
    /// A named (possibly generic) type.
    Named(NamedType),
    /// A single-dimension array.
    Array(Box<TypeRef>),
    /// The optional (nullable) form of the inner type.
    Optional(Box<TypeRef>),
}

impl TypeRef {
    /// `void`.
    #[inline]
    #[must_use]
    pub const fn void() -> Self {
        Self::Primitive(Primitive::Void)
    }

    /// `string`.
    #[inline]
    #[must_use]
    pub const fn string() -> Self {
        Self::Primitive(Primitive::String)
    }

    /// A non-generic reference type.
    #[must_use]
    pub fn named(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Named(NamedType::new(namespace, name))
    }

    /// A non-generic value type such as a struct or enum.
    #[must_use]
    pub fn value(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Named(NamedType {
            value_type: true,
            ..NamedType::new(namespace, name)
        })
    }

    /// A generic reference type with the given arguments.
    #[must_use]
    pub fn generic(
        namespace: impl Into<String>,
        name: impl Into<String>,
        args: impl IntoIterator<Item = TypeRef>,
    ) -> Self {
        Self::Named(NamedType {
            args: args.into_iter().collect(),
            ..NamedType::new(namespace, name)
        })
    }

    /// An array of `element`.
    #[must_use]
    pub fn array(element: TypeRef) -> Self {
        Self::Array(Box::new(element))
    }

    /// `List<element>`.
    #[must_use]
    pub fn list_of(element: TypeRef) -> Self {
        Self::generic(COLLECTIONS_NAMESPACE, "List", [element])
    }

    /// `Dictionary<string, string>`, the shape of a raw form collection.
    #[must_use]
    pub fn string_map() -> Self {
        Self::generic(
            COLLECTIONS_NAMESPACE,
            "Dictionary",
            [Self::string(), Self::string()],
        )
    }

    /// An uploaded file as seen by the service.
    #[must_use]
    pub fn form_file() -> Self {
        Self::named(HTTP_NAMESPACE, "IFormFile")
    }

    /// A raw, untyped form body as seen by the service.
    #[must_use]
    pub fn form_collection() -> Self {
        Self::named(HTTP_NAMESPACE, "IFormCollection")
    }

    /// The stream type a client sends or receives file contents as.
    #[must_use]
    pub fn stream() -> Self {
        Self::named(IO_NAMESPACE, "Stream")
    }

    /// The cancellation token type.
    #[must_use]
    pub fn cancellation_token() -> Self {
        Self::value(THREADING_NAMESPACE, "CancellationToken")
    }

    fn as_named(&self) -> Option<&NamedType> {
        match self {
            Self::Named(named) => Some(named),
            Self::Primitive(_) | Self::Array(_) | Self::Optional(_) => None,
        }
    }

    fn is_named(&self, namespace: &str, name: &str) -> bool {
        self.as_named().is_some_and(|named| named.is(namespace, name))
    }

    /// Returns `true` for a single uploaded file.
    #[must_use]
    pub fn is_form_file(&self) -> bool {
        self.is_named(HTTP_NAMESPACE, "IFormFile")
    }

    /// Returns `true` for an array or `List` of uploaded files.
    ///
    /// # Examples
    ///
    /// ```
    /// use cg_core::TypeRef;
    ///
    /// assert!(TypeRef::array(TypeRef::form_file()).is_file_collection());
    /// assert!(TypeRef::list_of(TypeRef::form_file()).is_file_collection());
    /// assert!(!TypeRef::form_file().is_file_collection());
    /// ```
    #[must_use]
    pub fn is_file_collection(&self) -> bool {
        match self {
            Self::Array(element) => element.is_form_file(),
            Self::Named(named) => {
                named.is(COLLECTIONS_NAMESPACE, "List")
                    && matches!(named.args.as_slice(), [element] if element.is_form_file())
            }
            Self::Primitive(_) | Self::Optional(_) => false,
        }
    }

    /// Returns `true` for a raw form collection.
    #[must_use]
    pub fn is_form_collection(&self) -> bool {
        self.is_named(HTTP_NAMESPACE, "IFormCollection")
    }

    /// Returns `true` for the cancellation token type.
    #[must_use]
    pub fn is_cancellation_token(&self) -> bool {
        self.is_named(THREADING_NAMESPACE, "CancellationToken")
    }

    /// Returns `true` if this is already the optional form of a type.
    #[inline]
    #[must_use]
    pub const fn is_optional(&self) -> bool {
        matches!(self, Self::Optional(_))
    }

    /// Returns `true` if values of this type can never be absent.
    ///
    /// Optional types count as value types here; use [`is_optional`](Self::is_optional)
    /// to tell them apart.
    #[must_use]
    pub fn is_value_type(&self) -> bool {
        match self {
            Self::Primitive(primitive) => primitive.is_value_type(),
            Self::Named(named) => named.value_type,
            Self::Optional(_) => true,
            Self::Array(_) => false,
        }
    }

    /// Returns `true` for primitives and arrays or optionals of primitives.
    ///
    /// Built-in types never take part in ambiguity detection.
    #[must_use]
    pub fn is_builtin(&self) -> bool {
        match self {
            Self::Primitive(_) => true,
            Self::Array(inner) | Self::Optional(inner) => matches!(**inner, Self::Primitive(_)),
            Self::Named(_) => false,
        }
    }

    /// Returns the optional form of this type. Optional types are returned unchanged.
    #[must_use]
    pub fn nullable(self) -> Self {
        if self.is_optional() {
            self
        } else {
            Self::Optional(Box::new(self))
        }
    }

    /// Wraps a response type in `Task`, or returns plain `Task` for `void`.
    ///
    /// # Examples
    ///
    /// ```
    /// use cg_core::{AmbiguousTypes, TypeRef};
    ///
    /// let ambiguous = AmbiguousTypes::new();
    /// assert_eq!(TypeRef::void().wrap_in_task().display_name(&ambiguous), "Task");
    /// assert_eq!(TypeRef::string().wrap_in_task().display_name(&ambiguous), "Task<string>");
    /// ```
    #[must_use]
    pub fn wrap_in_task(self) -> Self {
        if self == Self::void() {
            Self::named(TASKS_NAMESPACE, "Task")
        } else {
            Self::generic(TASKS_NAMESPACE, "Task", [self])
        }
    }

    /// Renders the type for emitted source, qualifying ambiguous types.
    #[must_use]
    pub fn display_name(&self, ambiguous: &AmbiguousTypes) -> String {
        self.render(&|named| ambiguous.contains(named))
    }

    /// Renders the type with every named type fully qualified.
    ///
    /// Used wherever two types must compare equal only if they are the same type.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        self.render(&|_| true)
    }

    fn render(&self, qualify: &dyn Fn(&NamedType) -> bool) -> String {
        match self {
            Self::Primitive(primitive) => primitive.keyword().to_owned(),
            Self::Optional(inner) => format!("{}?", inner.render(qualify)),
            Self::Array(element) => format!("{}[]", element.render(qualify)),
            Self::Named(named) => {
                let mut name = if qualify(named) && !named.namespace.is_empty() {
                    format!("{}.{}", named.namespace, named.name)
                } else {
                    named.name.clone()
                };

                if !named.args.is_empty() {
                    let args: Vec<String> =
                        named.args.iter().map(|arg| arg.render(qualify)).collect();
                    name.push('<');
                    name.push_str(&args.join(", "));
                    name.push('>');
                }

                name
            }
        }
    }

    /// Calls `visit` for this type and every named type nested inside it.
    pub fn for_each_named<'a>(&'a self, visit: &mut impl FnMut(&'a NamedType)) {
        match self {
            Self::Primitive(_) => {}
            Self::Array(inner) | Self::Optional(inner) => inner.for_each_named(visit),
            Self::Named(named) => {
                visit(named);
                for arg in &named.args {
                    arg.for_each_named(visit);
                }
            }
        }
    }
}

impl From<Primitive> for TypeRef {
    #[inline]
    fn from(primitive: Primitive) -> Self {
        Self::Primitive(primitive)
    }
}

impl From<NamedType> for TypeRef {
    #[inline]
    fn from(named: NamedType) -> Self {
        Self::Named(named)
    }
}

/// Types whose short name collides with another referenced type.
///
/// Ambiguous types must be emitted fully qualified. Kept sorted and free of
/// duplicates, so the serialized list is stable between runs and lookups are
/// a binary search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<QualifiedName>", into = "Vec<QualifiedName>")]
pub struct AmbiguousTypes(Vec<QualifiedName>);

impl AmbiguousTypes {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn search(&self, namespace: &str, name: &str) -> Result<usize, usize> {
        self.0.binary_search_by(|entry| {
            (entry.namespace.as_str(), entry.name.as_str()).cmp(&(namespace, name))
        })
    }

    /// Adds a type. Returns `false` if it was already present.
    pub fn insert(&mut self, name: QualifiedName) -> bool {
        match self.search(&name.namespace, &name.name) {
            Ok(_) => false,
            Err(index) => {
                self.0.insert(index, name);
                true
            }
        }
    }

    /// Returns `true` if the named type must be qualified.
    #[must_use]
    pub fn contains(&self, named: &NamedType) -> bool {
        self.search(&named.namespace, &named.name).is_ok()
    }

    /// Returns `true` if the qualified name is in the set.
    #[must_use]
    pub fn contains_name(&self, name: &QualifiedName) -> bool {
        self.search(&name.namespace, &name.name).is_ok()
    }

    /// Returns the number of ambiguous types.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if no type is ambiguous.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates the ambiguous types in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &QualifiedName> {
        self.0.iter()
    }
}

impl From<Vec<QualifiedName>> for AmbiguousTypes {
    fn from(mut names: Vec<QualifiedName>) -> Self {
        names.sort_unstable();
        names.dedup();
        Self(names)
    }
}

impl From<AmbiguousTypes> for Vec<QualifiedName> {
    fn from(ambiguous: AmbiguousTypes) -> Self {
        ambiguous.0
    }
}

impl FromIterator<QualifiedName> for AmbiguousTypes {
    fn from_iter<I: IntoIterator<Item = QualifiedName>>(iter: I) -> Self {
        Self::from(iter.into_iter().collect::<Vec<_>>())
    }
}
