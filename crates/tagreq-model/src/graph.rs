// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! In-memory [`SymbolModel`] backed by a JSON symbol manifest.
//!
//! Build tooling exports one manifest per compilation round. The manifest is
//! flattened into an arena of symbol records at load time; handles are arena
//! indices, so member and discovery order is manifest declaration order.

use std::collections::{BTreeMap, BTreeSet};
use std::io::Read;

use serde::Deserialize;
use thiserror::Error;

use crate::symbol::{Modifier, SymbolId, SymbolKind, SymbolModel};

/// Manifest version understood by this loader.
pub const MANIFEST_VERSION: &str = "tagreq-symbols/v1";

/// Errors raised while loading a symbol manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// The manifest is not valid JSON or does not match the schema.
    #[error("manifest parse error: {0}")]
    Json(#[from] serde_json::Error),
    /// The manifest could not be read.
    #[error("manifest io error: {0}")]
    Io(#[from] std::io::Error),
    /// `manifest_version` names a format this loader does not understand.
    #[error("Unsupported manifest_version: {0}")]
    UnsupportedVersion(String),
    /// Two type declarations share a qualified name.
    #[error("duplicate type declaration: {0}")]
    DuplicateType(String),
    /// The manifest declares more symbols than a handle can address.
    #[error("manifest declares too many symbols")]
    TooManySymbols,
}

/// Root of a symbol manifest document.
#[derive(Debug, Deserialize)]
pub struct SymbolManifest {
    /// Format tag; absent means [`MANIFEST_VERSION`].
    #[serde(default)]
    pub manifest_version: Option<String>,
    /// Type declarations visible in this round.
    #[serde(default)]
    pub types: Vec<TypeDecl>,
}

/// Kind of a declared type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeDeclKind {
    /// Structural type.
    #[default]
    Class,
    /// Enumeration.
    Enum,
}

/// A class or enum declaration.
#[derive(Debug, Deserialize)]
pub struct TypeDecl {
    /// Fully-qualified type name.
    pub name: String,
    /// Declared kind (defaults to `class`).
    #[serde(default)]
    pub kind: TypeDeclKind,
    /// Type modifiers.
    #[serde(default)]
    pub modifiers: Vec<Modifier>,
    /// Annotations on the type.
    #[serde(default)]
    pub annotations: Vec<AnnotationDecl>,
    /// Field declarations.
    #[serde(default)]
    pub fields: Vec<VariableDecl>,
    /// Method declarations.
    #[serde(default)]
    pub methods: Vec<MethodDecl>,
}

/// A field or parameter declaration.
#[derive(Debug, Deserialize)]
pub struct VariableDecl {
    /// Field or parameter name.
    pub name: String,
    /// Declared type, possibly generic.
    #[serde(rename = "type")]
    pub type_name: String,
    /// Declaration modifiers.
    #[serde(default)]
    pub modifiers: Vec<Modifier>,
    /// Attached annotations.
    #[serde(default)]
    pub annotations: Vec<AnnotationDecl>,
}

/// A method declaration.
#[derive(Debug, Deserialize)]
pub struct MethodDecl {
    /// Method name.
    pub name: String,
    /// Declared return type (defaults to `void`).
    #[serde(default = "void_type")]
    pub return_type: String,
    /// Method modifiers.
    #[serde(default)]
    pub modifiers: Vec<Modifier>,
    /// Annotations on the method.
    #[serde(default)]
    pub annotations: Vec<AnnotationDecl>,
    /// Parameters in declaration order.
    #[serde(default)]
    pub parameters: Vec<VariableDecl>,
}

/// An annotation occurrence with its string-list arguments.
#[derive(Debug, Clone, Deserialize)]
pub struct AnnotationDecl {
    /// Fully-qualified annotation name.
    pub name: String,
    /// Named arguments, each a list of strings (class literals render as qualified names).
    #[serde(default)]
    pub values: BTreeMap<String, Vec<String>>,
}

fn void_type() -> String {
    "void".to_owned()
}

#[derive(Debug)]
struct SymbolRecord {
    kind: SymbolKind,
    name: String,
    type_name: String,
    modifiers: BTreeSet<Modifier>,
    tags: BTreeSet<String>,
    annotations: Vec<AnnotationDecl>,
    owner: Option<SymbolId>,
    // members for types, parameters for methods
    children: Vec<SymbolId>,
}

/// Arena-backed symbol graph for one compilation round.
#[derive(Debug, Default)]
pub struct SymbolGraph {
    records: Vec<SymbolRecord>,
    types: BTreeMap<String, SymbolId>,
}

impl SymbolGraph {
    /// Parses a manifest from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, ManifestError> {
        let manifest: SymbolManifest = serde_json::from_str(json)?;
        Self::from_manifest(manifest)
    }

    /// Parses a manifest from a reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ManifestError> {
        let manifest: SymbolManifest = serde_json::from_reader(reader)?;
        Self::from_manifest(manifest)
    }

    /// Flattens a deserialized manifest into the arena.
    pub fn from_manifest(manifest: SymbolManifest) -> Result<Self, ManifestError> {
        if let Some(version) = manifest.manifest_version.as_deref() {
            if version != MANIFEST_VERSION {
                return Err(ManifestError::UnsupportedVersion(version.to_owned()));
            }
        }

        let mut graph = Self::default();
        for decl in manifest.types {
            if graph.types.contains_key(&decl.name) {
                return Err(ManifestError::DuplicateType(decl.name));
            }
            graph.insert_type(decl)?;
        }
        Ok(graph)
    }

    /// Number of symbols in the arena.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when the manifest declared no symbols.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn insert_type(&mut self, decl: TypeDecl) -> Result<SymbolId, ManifestError> {
        let kind = match decl.kind {
            TypeDeclKind::Class => SymbolKind::Class,
            TypeDeclKind::Enum => SymbolKind::Enum,
        };
        let type_id = self.push(SymbolRecord {
            kind,
            name: decl.name.clone(),
            type_name: decl.name.clone(),
            modifiers: decl.modifiers.into_iter().collect(),
            tags: tag_names(&decl.annotations),
            annotations: decl.annotations,
            owner: None,
            children: Vec::new(),
        })?;
        self.types.insert(decl.name, type_id);

        for field in decl.fields {
            let field_id = self.push_variable(SymbolKind::Field, field, type_id)?;
            self.records[type_id.index()].children.push(field_id);
        }

        for method in decl.methods {
            let method_id = self.push(SymbolRecord {
                kind: SymbolKind::Method,
                name: method.name,
                type_name: method.return_type,
                modifiers: method.modifiers.into_iter().collect(),
                tags: tag_names(&method.annotations),
                annotations: method.annotations,
                owner: Some(type_id),
                children: Vec::new(),
            })?;
            for param in method.parameters {
                let param_id = self.push_variable(SymbolKind::Parameter, param, method_id)?;
                self.records[method_id.index()].children.push(param_id);
            }
            self.records[type_id.index()].children.push(method_id);
        }

        Ok(type_id)
    }

    fn push_variable(
        &mut self,
        kind: SymbolKind,
        decl: VariableDecl,
        owner: SymbolId,
    ) -> Result<SymbolId, ManifestError> {
        self.push(SymbolRecord {
            kind,
            name: decl.name,
            type_name: decl.type_name,
            modifiers: decl.modifiers.into_iter().collect(),
            tags: tag_names(&decl.annotations),
            annotations: decl.annotations,
            owner: Some(owner),
            children: Vec::new(),
        })
    }

    fn push(&mut self, record: SymbolRecord) -> Result<SymbolId, ManifestError> {
        let id = u32::try_from(self.records.len()).map_err(|_| ManifestError::TooManySymbols)?;
        self.records.push(record);
        Ok(SymbolId(id))
    }

    fn record(&self, symbol: SymbolId) -> &SymbolRecord {
        &self.records[symbol.index()]
    }
}

fn tag_names(annotations: &[AnnotationDecl]) -> BTreeSet<String> {
    annotations.iter().map(|a| a.name.clone()).collect()
}

impl SymbolModel for SymbolGraph {
    fn kind(&self, symbol: SymbolId) -> SymbolKind {
        self.record(symbol).kind
    }

    fn simple_name(&self, symbol: SymbolId) -> &str {
        &self.record(symbol).name
    }

    fn type_name(&self, symbol: SymbolId) -> &str {
        &self.record(symbol).type_name
    }

    fn modifiers(&self, symbol: SymbolId) -> &BTreeSet<Modifier> {
        &self.record(symbol).modifiers
    }

    fn attached_tags(&self, symbol: SymbolId) -> &BTreeSet<String> {
        &self.record(symbol).tags
    }

    fn resolve_type(&self, name: &str) -> Option<SymbolId> {
        self.types.get(name).copied()
    }

    fn members(&self, class: SymbolId) -> &[SymbolId] {
        let record = self.record(class);
        if record.kind.is_type() {
            record.children.as_slice()
        } else {
            &[]
        }
    }

    fn parameters(&self, method: SymbolId) -> &[SymbolId] {
        let record = self.record(method);
        if record.kind == SymbolKind::Method {
            record.children.as_slice()
        } else {
            &[]
        }
    }

    fn annotated_with(&self, tag: &str) -> Vec<SymbolId> {
        self.records
            .iter()
            .enumerate()
            .filter(|(_, r)| {
                matches!(r.kind, SymbolKind::Class | SymbolKind::Method) && r.tags.contains(tag)
            })
            .filter_map(|(i, _)| u32::try_from(i).ok().map(SymbolId))
            .collect()
    }

    fn annotation_values(
        &self,
        symbol: SymbolId,
        tag: &str,
        element: &str,
    ) -> Option<Vec<String>> {
        self.record(symbol)
            .annotations
            .iter()
            .find(|a| a.name == tag)
            .and_then(|a| a.values.get(element))
            .cloned()
    }

    fn owner(&self, symbol: SymbolId) -> Option<SymbolId> {
        self.record(symbol).owner
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::expect_used)]

    use super::*;

    const ORDER_MANIFEST: &str = r#"{
        "manifest_version": "tagreq-symbols/v1",
        "types": [
            {
                "name": "shop.Order",
                "fields": [
                    { "name": "id", "type": "java.lang.String", "annotations": [{ "name": "shop.Validated" }] },
                    { "name": "count", "type": "int" },
                    { "name": "cache", "type": "shop.Cache", "modifiers": ["static"] }
                ],
                "methods": [
                    {
                        "name": "process",
                        "return_type": "shop.Receipt",
                        "annotations": [
                            { "name": "tagreq.annotation.RequiresAnnotation", "values": { "requires": ["shop.Validated"] } }
                        ],
                        "parameters": [{ "name": "order", "type": "shop.Order" }]
                    }
                ]
            },
            { "name": "shop.Status", "kind": "enum" }
        ]
    }"#;

    #[test]
    fn flattens_types_fields_methods_and_parameters() {
        let graph = SymbolGraph::from_json_str(ORDER_MANIFEST).unwrap();
        let order = graph.resolve_type("shop.Order").unwrap();
        assert_eq!(graph.kind(order), SymbolKind::Class);

        let members = graph.members(order);
        assert_eq!(members.len(), 4);
        let names: Vec<&str> = members.iter().map(|m| graph.simple_name(*m)).collect();
        assert_eq!(names, ["id", "count", "cache", "process"]);

        let process = members[3];
        assert_eq!(graph.kind(process), SymbolKind::Method);
        assert_eq!(graph.type_name(process), "shop.Receipt");
        let params = graph.parameters(process);
        assert_eq!(params.len(), 1);
        assert_eq!(graph.type_name(params[0]), "shop.Order");
        assert_eq!(graph.owner(params[0]), Some(process));
    }

    #[test]
    fn exposes_tags_modifiers_and_primitives() {
        let graph = SymbolGraph::from_json_str(ORDER_MANIFEST).unwrap();
        let order = graph.resolve_type("shop.Order").unwrap();
        let [id, count, cache, _] = graph.members(order) else {
            panic!("unexpected member layout");
        };
        assert!(graph.attached_tags(*id).contains("shop.Validated"));
        assert!(graph.is_primitive(*count));
        assert!(!graph.is_primitive(*id));
        assert!(graph.modifiers(*cache).contains(&Modifier::Static));
    }

    #[test]
    fn discovers_annotated_roots_and_arguments() {
        let graph = SymbolGraph::from_json_str(ORDER_MANIFEST).unwrap();
        let roots = graph.annotated_with("tagreq.annotation.RequiresAnnotation");
        assert_eq!(roots.len(), 1);
        assert_eq!(graph.simple_name(roots[0]), "process");
        assert_eq!(
            graph.annotation_values(roots[0], "tagreq.annotation.RequiresAnnotation", "requires"),
            Some(vec!["shop.Validated".to_owned()])
        );
        assert_eq!(
            graph.annotation_values(roots[0], "tagreq.annotation.RequiresAnnotation", "ignore"),
            None
        );
    }

    #[test]
    fn describes_symbols_for_diagnostics() {
        let graph = SymbolGraph::from_json_str(ORDER_MANIFEST).unwrap();
        let order = graph.resolve_type("shop.Order").unwrap();
        let members = graph.members(order);
        assert_eq!(graph.describe(members[0]), "shop.Order.id");
        assert_eq!(graph.describe(members[3]), "shop.Order.process(shop.Order)");
    }

    #[test]
    fn enum_kind_is_preserved() {
        let graph = SymbolGraph::from_json_str(ORDER_MANIFEST).unwrap();
        let status = graph.resolve_type("shop.Status").unwrap();
        assert_eq!(graph.kind(status), SymbolKind::Enum);
        assert!(graph.members(status).is_empty());
    }

    #[test]
    fn unknown_types_do_not_resolve() {
        let graph = SymbolGraph::from_json_str(ORDER_MANIFEST).unwrap();
        assert!(graph.resolve_type("shop.Receipt").is_none());
    }

    #[test]
    fn rejects_unknown_manifest_version() {
        let err = SymbolGraph::from_json_str(r#"{ "manifest_version": "tagreq-symbols/v9" }"#)
            .unwrap_err();
        assert!(matches!(err, ManifestError::UnsupportedVersion(v) if v == "tagreq-symbols/v9"));
    }

    #[test]
    fn missing_version_is_accepted() {
        let graph = SymbolGraph::from_json_str(r#"{ "types": [] }"#).unwrap();
        assert!(graph.is_empty());
    }

    #[test]
    fn rejects_duplicate_types() {
        let err = SymbolGraph::from_json_str(
            r#"{ "types": [{ "name": "a.B" }, { "name": "a.B" }] }"#,
        )
        .unwrap_err();
        assert!(matches!(err, ManifestError::DuplicateType(name) if name == "a.B"));
    }
}
