// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Symbol model for tagreq.
//!
//! [`SymbolModel`] is the port the validator reads program structure through;
//! [`SymbolGraph`] is the adapter that serves it from a JSON symbol manifest.

pub mod graph;
pub mod symbol;

pub use graph::{ManifestError, SymbolGraph, SymbolManifest, MANIFEST_VERSION};
pub use symbol::{is_primitive_type, Modifier, SymbolId, SymbolKind, SymbolModel, PRIMITIVE_TYPES};
