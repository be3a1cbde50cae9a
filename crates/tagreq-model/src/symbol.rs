// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Symbol model port consumed by the requirement validator.
//!
//! The validator never sees host compiler internals. Everything it needs about
//! classes, methods, parameters, and fields flows through [`SymbolModel`], a
//! narrow read-only view over one compilation round's symbol snapshot.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Type names the host classifies as primitive (never expanded).
pub const PRIMITIVE_TYPES: &[&str] = &[
    "boolean", "byte", "short", "int", "long", "char", "float", "double", "void",
];

/// Opaque handle to a symbol inside a [`SymbolModel`].
///
/// Handles are only meaningful for the model that issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SymbolId(pub(crate) u32);

impl SymbolId {
    /// Raw index of the handle (stable for the lifetime of the model).
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Structural classification of a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    /// A structural type with fields and methods.
    Class,
    /// An enumeration type (a traversal leaf).
    Enum,
    /// A method declared on a class.
    Method,
    /// A method parameter.
    Parameter,
    /// A field declared on a class.
    Field,
}

impl SymbolKind {
    /// True for kinds that name a type (`Class`, `Enum`).
    pub fn is_type(self) -> bool {
        matches!(self, Self::Class | Self::Enum)
    }
}

/// Declaration modifiers. Only `Static` and `Transient` affect validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Modifier {
    /// Class-level (not per-instance) member.
    Static,
    /// Member excluded from serialized state.
    Transient,
    /// Immutable binding.
    Final,
    /// Public visibility.
    Public,
    /// Private visibility.
    Private,
    /// Protected visibility.
    Protected,
    /// Abstract declaration.
    Abstract,
}

/// True if `type_name` is one of the host's primitive type names.
pub fn is_primitive_type(type_name: &str) -> bool {
    PRIMITIVE_TYPES.contains(&type_name.trim())
}

/// Read-only view over the host's structural symbol information.
///
/// Implementations must be deterministic: member, parameter, and discovery
/// order is declaration order and must not change between calls.
pub trait SymbolModel {
    /// Structural kind of `symbol`.
    fn kind(&self, symbol: SymbolId) -> SymbolKind;

    /// The symbol's own name (field, parameter, or method name; qualified name for types).
    fn simple_name(&self, symbol: SymbolId) -> &str;

    /// Declared type as written by the host.
    ///
    /// Parameters and fields report their declared type (which may carry
    /// generic syntax such as `java.util.List<foo.Item>`), methods report
    /// their return type, and types report their own qualified name.
    fn type_name(&self, symbol: SymbolId) -> &str;

    /// Declaration modifiers of `symbol`.
    fn modifiers(&self, symbol: SymbolId) -> &BTreeSet<Modifier>;

    /// Fully-qualified names of the tags directly attached to `symbol`.
    fn attached_tags(&self, symbol: SymbolId) -> &BTreeSet<String>;

    /// Resolves a fully-qualified type name to its type symbol, if known.
    fn resolve_type(&self, name: &str) -> Option<SymbolId>;

    /// Fields and methods declared on a type, in declaration order.
    fn members(&self, class: SymbolId) -> &[SymbolId];

    /// Parameters of a method, in declaration order.
    fn parameters(&self, method: SymbolId) -> &[SymbolId];

    /// Classes and methods carrying `tag`, in declaration order.
    fn annotated_with(&self, tag: &str) -> Vec<SymbolId>;

    /// String-list argument `element` of the `tag` annotation on `symbol`.
    ///
    /// Returns `None` when the annotation or the element is absent.
    fn annotation_values(&self, symbol: SymbolId, tag: &str, element: &str)
        -> Option<Vec<String>>;

    /// The type symbol that declares `symbol`, if any.
    fn owner(&self, symbol: SymbolId) -> Option<SymbolId>;

    /// True if the declared type of `symbol` is primitive.
    fn is_primitive(&self, symbol: SymbolId) -> bool {
        is_primitive_type(self.type_name(symbol))
    }

    /// Human-readable rendering used in diagnostics.
    ///
    /// Fields render as `Owner.field`, methods as `Owner.method(T1, T2)`,
    /// parameters by their own name.
    fn describe(&self, symbol: SymbolId) -> String {
        let name = self.simple_name(symbol);
        match self.kind(symbol) {
            SymbolKind::Class | SymbolKind::Enum | SymbolKind::Parameter => name.to_owned(),
            SymbolKind::Field => match self.owner(symbol) {
                Some(owner) => format!("{}.{name}", self.simple_name(owner)),
                None => name.to_owned(),
            },
            SymbolKind::Method => {
                let params = self
                    .parameters(symbol)
                    .iter()
                    .map(|p| self.type_name(*p))
                    .collect::<Vec<_>>()
                    .join(",");
                match self.owner(symbol) {
                    Some(owner) => format!("{}.{name}({params})", self.simple_name(owner)),
                    None => format!("{name}({params})"),
                }
            }
        }
    }
}
