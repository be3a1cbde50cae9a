// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Requirement validator.
//!
//! Walks the structural closure of a flagged method: every parameter and the
//! return type are expanded into the fields of their declared types, and
//! those fields recursively into theirs. Fields reached this way (depth ≥ 1)
//! must carry one of the required tags. Direct method parameters (depth 0)
//! are expanded but never tag-checked themselves.
//!
//! # Leaves
//!
//! A type token is not expanded when it is primitive, trusted
//! ([`is_trusted_type`]), ignored, already visited in the current traversal,
//! unresolvable, or an enum.
//!
//! # Traversal state
//!
//! Each method gets a fresh [`TraversalState`]. Its parameters and return type
//! share it, so a type expanded for one parameter is a leaf for the next.

use std::collections::BTreeSet;

use tagreq_model::{is_primitive_type, Modifier, SymbolId, SymbolKind, SymbolModel};
use tracing::{debug, instrument, trace};

use crate::generics::type_tokens;
use crate::requirement::{is_trusted_type, RequirementSpec};

/// One symbol that lacks every required tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// The offending field (or parameter).
    pub symbol: SymbolId,
    /// The flagged method whose closure reached `symbol`.
    pub enclosing_method: SymbolId,
    /// Depth at which `symbol` was reached (always ≥ 1).
    pub depth: usize,
    /// Tags of which at least one was required, in declaration order.
    pub required: Vec<String>,
}

/// Per-method cycle guard.
#[derive(Debug, Default)]
pub struct TraversalState {
    visited: BTreeSet<String>,
}

impl TraversalState {
    /// Fresh state with nothing visited.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `type_name` visited. Returns `false` if it already was.
    pub fn visit(&mut self, type_name: &str) -> bool {
        if self.is_visited(type_name) {
            return false;
        }
        self.visited.insert(type_name.to_owned())
    }

    /// True if `type_name` has been expanded in this traversal.
    pub fn is_visited(&self, type_name: &str) -> bool {
        self.visited.contains(type_name)
    }
}

/// Validates flagged roots against a [`RequirementSpec`].
pub struct Validator<'m, M: SymbolModel + ?Sized> {
    model: &'m M,
}

impl<'m, M: SymbolModel + ?Sized> Validator<'m, M> {
    /// Creates a validator reading from `model`.
    pub fn new(model: &'m M) -> Self {
        Self { model }
    }

    /// Validates a flagged class or method.
    ///
    /// A class root validates each of its methods independently, exactly as
    /// if every method had been flagged. Other kinds produce nothing.
    #[instrument(level = "debug", skip(self, spec), fields(trigger = spec.trigger()))]
    pub fn validate_root(&self, root: SymbolId, spec: &RequirementSpec) -> Vec<Violation> {
        let mut out = Vec::new();
        match self.model.kind(root) {
            SymbolKind::Class => {
                for &member in self.model.members(root) {
                    if self.model.kind(member) == SymbolKind::Method {
                        self.validate_method(member, spec, &mut out);
                    }
                }
            }
            SymbolKind::Method => self.validate_method(root, spec, &mut out),
            kind => trace!(?kind, "root is neither class nor method; skipped"),
        }
        debug!(violations = out.len(), "root validated");
        out
    }

    /// Validates one method with a fresh [`TraversalState`].
    pub fn validate_method(
        &self,
        method: SymbolId,
        spec: &RequirementSpec,
        out: &mut Vec<Violation>,
    ) {
        let mut state = TraversalState::new();
        for &param in self.model.parameters(method) {
            self.check_parameter(method, param, spec, 0, &mut state, out);
        }
        let return_type = self.model.type_name(method);
        self.expand_type(method, return_type, spec, 0, &mut state, out);
    }

    /// Checks one parameter or field reached at `depth`.
    ///
    /// Static, transient, and ignored symbols are skipped entirely. Otherwise
    /// the declared type is expanded first, then (at depth ≥ 1) the symbol's
    /// own tags are checked.
    pub fn check_parameter(
        &self,
        method: SymbolId,
        symbol: SymbolId,
        spec: &RequirementSpec,
        depth: usize,
        state: &mut TraversalState,
        out: &mut Vec<Violation>,
    ) {
        let modifiers = self.model.modifiers(symbol);
        if modifiers.contains(&Modifier::Static) || modifiers.contains(&Modifier::Transient) {
            trace!(symbol = self.model.simple_name(symbol), "static/transient; skipped");
            return;
        }
        let name = self.model.simple_name(symbol);
        if spec.ignores(name) {
            trace!(symbol = name, "ignored by name");
            return;
        }

        if !self.model.is_primitive(symbol) {
            let type_name = self.model.type_name(symbol);
            self.expand_type(method, type_name, spec, depth, state, out);
        }

        if depth > 0 && !spec.is_satisfied_by(self.model.attached_tags(symbol)) {
            debug!(symbol = name, depth, "missing required tag");
            out.push(Violation {
                symbol,
                enclosing_method: method,
                depth,
                required: spec.required().to_vec(),
            });
        }
    }

    /// Expands every type token of `signature` into its fields at `depth + 1`.
    pub fn expand_type(
        &self,
        method: SymbolId,
        signature: &str,
        spec: &RequirementSpec,
        depth: usize,
        state: &mut TraversalState,
        out: &mut Vec<Violation>,
    ) {
        for token in type_tokens(signature) {
            if is_primitive_type(token) || is_trusted_type(token) || spec.ignores(token) {
                continue;
            }
            if !state.visit(token) {
                trace!(token, "already visited");
                continue;
            }
            let Some(ty) = self.model.resolve_type(token) else {
                trace!(token, "unresolvable type; skipped");
                continue;
            };
            if self.model.kind(ty) != SymbolKind::Class {
                continue;
            }
            debug!(token, depth = depth + 1, "expanding");
            for &member in self.model.members(ty) {
                if self.model.kind(member) == SymbolKind::Field {
                    self.check_parameter(method, member, spec, depth + 1, state, out);
                }
            }
        }
    }
}
