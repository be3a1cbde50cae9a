// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Type-name tokenizer for generic signatures.
//!
//! Declared types arrive as host-rendered strings such as
//! `java.util.Map<shop.Sku, java.util.List<shop.Item>>`. The validator treats
//! every embedded dotted identifier as an independent type reference, so this
//! module splits a signature into those identifiers and nothing more. It is
//! not a type parser: nesting, bounds, and arity are discarded.

use once_cell::sync::Lazy;
use regex::Regex;

/// Wildcard bound keywords that can appear inside a rendered signature.
const BOUND_KEYWORDS: &[&str] = &["extends", "super"];

/// A dotted identifier, optionally introduced by `@` (a type-use annotation).
#[allow(clippy::expect_used)]
static TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"@?[A-Za-z0-9_.]+").expect("token pattern compiles"));

/// Splits a rendered type signature into its dotted identifier tokens.
///
/// Tokens are returned in order of appearance. Type-use annotations
/// (`@a.B`), wildcard bound keywords, and vararg/array punctuation are
/// dropped.
pub fn type_tokens(signature: &str) -> Vec<&str> {
    TOKEN
        .find_iter(signature)
        .filter_map(|m| clean_token(m.as_str()))
        .collect()
}

fn clean_token(raw: &str) -> Option<&str> {
    if raw.starts_with('@') {
        return None;
    }
    let token = raw.trim_matches('.');
    if token.is_empty() || BOUND_KEYWORDS.contains(&token) {
        return None;
    }
    Some(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn is_token_char(c: char) -> bool {
        c.is_ascii_alphanumeric() || c == '_' || c == '.'
    }

    #[test]
    fn plain_type_is_single_token() {
        assert_eq!(type_tokens("shop.Order"), ["shop.Order"]);
    }

    #[test]
    fn generic_arguments_are_split_out() {
        assert_eq!(
            type_tokens("java.util.Map<shop.Sku, java.util.List<shop.Item>>"),
            ["java.util.Map", "shop.Sku", "java.util.List", "shop.Item"]
        );
    }

    #[test]
    fn wildcards_and_bounds_are_dropped() {
        assert_eq!(
            type_tokens("java.util.List<? extends shop.Item>"),
            ["java.util.List", "shop.Item"]
        );
        assert_eq!(
            type_tokens("java.util.Comparator<? super shop.Item>"),
            ["java.util.Comparator", "shop.Item"]
        );
    }

    #[test]
    fn arrays_and_varargs_keep_element_type() {
        assert_eq!(type_tokens("shop.Item[]"), ["shop.Item"]);
        assert_eq!(type_tokens("shop.Item..."), ["shop.Item"]);
        assert_eq!(type_tokens("int[][]"), ["int"]);
    }

    #[test]
    fn type_use_annotations_are_not_types() {
        assert_eq!(
            type_tokens("java.util.List<@shop.NonNull shop.Item>"),
            ["java.util.List", "shop.Item"]
        );
    }

    #[test]
    fn stray_at_sign_does_not_swallow_next_type() {
        assert_eq!(type_tokens("@ shop.Item"), ["shop.Item"]);
    }

    #[test]
    fn empty_and_punctuation_only_inputs_yield_nothing() {
        assert!(type_tokens("").is_empty());
        assert!(type_tokens("<>, ?").is_empty());
    }

    #[test]
    fn nested_and_underscored_names_survive() {
        assert_eq!(
            type_tokens("shop.Outer.Inner_2<shop.v1.Sku>"),
            ["shop.Outer.Inner_2", "shop.v1.Sku"]
        );
    }

    proptest! {
        #[test]
        fn tokens_are_clean_substrings(signature in "[a-zA-Z0-9_.<>,? @\\[\\]]{0,64}") {
            for token in type_tokens(&signature) {
                prop_assert!(!token.is_empty());
                prop_assert!(token.chars().all(is_token_char));
                prop_assert!(!token.starts_with('.') && !token.ends_with('.'));
                prop_assert!(signature.contains(token));
            }
        }
    }
}
