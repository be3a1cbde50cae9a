// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Processor options: extra trigger mappings and the global ignore list.
//!
//! Options come from two places. Build hosts pass flat key/value pairs
//! (`requires_<trigger>=<tag>_<tag>`, `ignore=<name>_<name>`), and the CLI
//! additionally reads a JSON document of the same shape as
//! [`ProcessorOptions`]. Both merge into one value.

use std::collections::BTreeMap;
use std::io::Read;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Key fragment marking an extra trigger mapping.
pub const REQUIRES_KEY: &str = "requires";
/// Key fragment marking a global ignore list.
pub const IGNORE_KEY: &str = "ignore";
/// Separator used inside option keys and values.
pub const SEPARATOR: char = '_';

/// Errors raised while reading options.
#[derive(Debug, Error)]
pub enum OptionsError {
    /// The options document is not valid JSON or has the wrong shape.
    #[error("options parse error: {0}")]
    Json(#[from] serde_json::Error),
    /// The options document could not be read.
    #[error("options io error: {0}")]
    Io(#[from] std::io::Error),
    /// A `key=value` option without `=`.
    #[error("malformed option (expected key=value): {0}")]
    Malformed(String),
}

/// Extra trigger mappings plus a global ignore list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProcessorOptions {
    /// Trigger tag -> required tags.
    #[serde(default)]
    pub requires: BTreeMap<String, Vec<String>>,
    /// Type and member names ignored under every trigger.
    #[serde(default)]
    pub ignore: Vec<String>,
}

impl ProcessorOptions {
    /// Builds options from host key/value pairs.
    ///
    /// A key containing `requires` names its trigger in the second
    /// `_`-separated segment; its value lists the required tags. Any other key
    /// containing `ignore` adds its value's entries to the global ignore list.
    /// Unrelated keys are skipped.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut options = Self::default();
        for (key, value) in pairs {
            let (key, value) = (key.as_ref(), value.as_ref());
            if key.contains(REQUIRES_KEY) {
                if let Some(trigger) = key.split(SEPARATOR).nth(1).filter(|t| !t.is_empty()) {
                    options
                        .requires
                        .entry(trigger.to_owned())
                        .or_default()
                        .extend(split_list(value));
                }
            } else if key.contains(IGNORE_KEY) {
                options.ignore.extend(split_list(value));
            }
        }
        options
    }

    /// Parses `key=value` strings (as passed with `-A`) into options.
    pub fn from_args<I, S>(args: I) -> Result<Self, OptionsError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut pairs = Vec::new();
        for arg in args {
            let arg = arg.as_ref();
            let (key, value) = arg
                .split_once('=')
                .ok_or_else(|| OptionsError::Malformed(arg.to_owned()))?;
            pairs.push((key.trim().to_owned(), value.trim().to_owned()));
        }
        Ok(Self::from_pairs(pairs))
    }

    /// Parses an options document.
    pub fn from_json_str(json: &str) -> Result<Self, OptionsError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parses an options document from a reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, OptionsError> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Folds `other` into `self`; required lists and the ignore list are extended.
    pub fn merge(&mut self, other: Self) {
        for (trigger, tags) in other.requires {
            self.requires.entry(trigger).or_default().extend(tags);
        }
        self.ignore.extend(other.ignore);
    }

    /// Extra trigger tags, sorted.
    pub fn triggers(&self) -> impl Iterator<Item = &str> {
        self.requires.keys().map(String::as_str)
    }
}

fn split_list(value: &str) -> impl Iterator<Item = String> + '_ {
    value
        .split(SEPARATOR)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}
