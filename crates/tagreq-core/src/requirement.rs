// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Requirement specs and the trusted-type heuristic.

use std::collections::BTreeSet;

use thiserror::Error;

/// Package prefixes whose types are traversal leaves.
///
/// Matching is substring containment on the full dotted name, so
/// `shop.java.util.Sku` is trusted too.
pub const TRUSTED_PACKAGES: &[&str] = &[
    "java.lang",
    "java.util",
    "android.os",
    "com.google",
    "io.reactivex",
];

/// True if `type_name` contains any [`TRUSTED_PACKAGES`] entry.
pub fn is_trusted_type(type_name: &str) -> bool {
    TRUSTED_PACKAGES.iter().any(|p| type_name.contains(p))
}

/// A trigger whose requirement cannot be validated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// The trigger declares no required tags.
    #[error("{trigger} requires at least one annotation as 'requires'")]
    EmptyRequires {
        /// Trigger tag that carried the empty `requires` list.
        trigger: String,
    },
}

impl ConfigurationError {
    /// The trigger tag this error belongs to.
    pub fn trigger(&self) -> &str {
        match self {
            Self::EmptyRequires { trigger } => trigger,
        }
    }
}

/// What a trigger tag demands of the structure reachable from its roots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequirementSpec {
    trigger: String,
    // declaration order, deduplicated
    required: Vec<String>,
    ignored: BTreeSet<String>,
}

impl RequirementSpec {
    /// Builds a spec for `trigger`.
    ///
    /// Blank entries are dropped. Returns
    /// [`ConfigurationError::EmptyRequires`] if no required tag remains.
    pub fn new<R, I>(
        trigger: impl Into<String>,
        required: R,
        ignored: I,
    ) -> Result<Self, ConfigurationError>
    where
        R: IntoIterator,
        R::Item: Into<String>,
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let trigger = trigger.into();
        let mut declared = Vec::new();
        for tag in non_blank(required) {
            if !declared.contains(&tag) {
                declared.push(tag);
            }
        }
        if declared.is_empty() {
            return Err(ConfigurationError::EmptyRequires { trigger });
        }
        Ok(Self {
            trigger,
            required: declared,
            ignored: non_blank(ignored).collect(),
        })
    }

    /// Trigger tag name.
    pub fn trigger(&self) -> &str {
        &self.trigger
    }

    /// Tags of which at least one must be attached to every checked symbol,
    /// in declaration order.
    pub fn required(&self) -> &[String] {
        &self.required
    }

    /// Type names and member names excluded from traversal.
    pub fn ignored(&self) -> &BTreeSet<String> {
        &self.ignored
    }

    /// Returns the spec with `extra` added to its ignore set.
    pub fn with_ignored<I>(mut self, extra: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.ignored.extend(non_blank(extra));
        self
    }

    /// True if `name` (a member simple name or a type name) is ignored.
    pub fn ignores(&self, name: &str) -> bool {
        self.ignored.contains(name)
    }

    /// True if `tags` contains at least one required tag.
    pub fn is_satisfied_by(&self, tags: &BTreeSet<String>) -> bool {
        self.required.iter().any(|tag| tags.contains(tag))
    }
}

fn non_blank<I>(items: I) -> impl Iterator<Item = String>
where
    I: IntoIterator,
    I::Item: Into<String>,
{
    items
        .into_iter()
        .map(|item| {
            let s: String = item.into();
            s.trim().to_owned()
        })
        .filter(|s| !s.is_empty())
}
