//! Property-based tests for tokenization and binding using proptest.

use batchkit::{bind, ArgumentMap, ParamSpec};
use proptest::prelude::*;

proptest! {
    /// Scanning never panics, whatever the tail looks like.
    #[test]
    fn scan_is_total(
        tokens in prop::collection::vec("[ -~]{0,12}", 0..8),
        offset in 0usize..10,
    ) {
        let _ = ArgumentMap::parse(&tokens, offset);
    }

    /// Distinct keys written as `--key value` pairs all come back.
    #[test]
    fn pairs_roundtrip(
        entries in prop::collection::hash_map("[a-z]{1,8}", "[a-zA-Z0-9]{1,8}", 0..6),
    ) {
        let mut tokens = Vec::new();
        for (key, value) in &entries {
            tokens.push(format!("--{key}"));
            tokens.push(value.clone());
        }

        let map = ArgumentMap::parse(&tokens, 0).unwrap();
        prop_assert_eq!(map.len(), entries.len());
        for (key, value) in &entries {
            prop_assert_eq!(map.get(key), Some(value.as_str()));
        }
    }

    /// Changing the case of a lookup never changes the result.
    #[test]
    fn lookup_ignores_case(key in "[a-z]{1,8}", value in "[a-zA-Z0-9]{1,8}") {
        let tokens = vec![format!("--{key}"), value.clone()];
        let map = ArgumentMap::parse(&tokens, 0).unwrap();
        prop_assert_eq!(map.get(&key.to_uppercase()), Some(value.as_str()));
    }

    /// A positional Text parameter always receives the exact token,
    /// however JSON-ish it looks.
    #[test]
    fn positional_text_is_verbatim(token in "[a-zA-Z0-9{}:,\"]{1,16}") {
        let args = vec![token.clone()];
        let bound = bind(&[ParamSpec::text("payload").index(0)], &args, 0).unwrap();
        prop_assert_eq!(bound.text("payload"), Some(token.as_str()));
    }

    /// Non-negative integer literals survive option binding unchanged.
    #[test]
    fn integer_literals_bind(value in 0i64..) {
        let args = vec!["--count".to_string(), value.to_string()];
        let bound = bind(&[ParamSpec::number("count")], &args, 0).unwrap();
        prop_assert_eq!(bound.integer("count"), Some(value));
    }

    /// Negative literals start with the switch prefix, so an option key
    /// never consumes one as its value. A positional slot reads the raw
    /// token at its index and coerces it regardless.
    #[test]
    fn negative_integers_bind_positionally(value in i64::MIN..0) {
        let args = vec![value.to_string()];
        let bound = bind(&[ParamSpec::number("count").index(0)], &args, 0).unwrap();
        prop_assert_eq!(bound.integer("count"), Some(value));
    }

    /// The default applies exactly when the parameter is absent. Supplied
    /// values stay non-negative so their token reads as a value, not a
    /// key; the default never tokenizes and ranges over all of i64.
    #[test]
    fn default_only_when_absent(value in 0i64.., default in any::<i64>()) {
        let params = [ParamSpec::number("n").default(default)];

        let supplied = vec!["--n".to_string(), value.to_string()];
        let bound = bind(&params, &supplied, 0).unwrap();
        prop_assert_eq!(bound.integer("n"), Some(value));

        let bound = bind(&params, &[], 0).unwrap();
        prop_assert_eq!(bound.integer("n"), Some(default));
    }
}

// Edge cases that deserve fixed inputs.

#[test]
fn all_dash_token_becomes_empty_key() {
    let tokens = vec!["---".to_string()];
    let map = ArgumentMap::parse(&tokens, 0).unwrap();
    assert_eq!(map.get(""), Some("true"));
}

#[test]
fn trailing_key_without_value_is_a_switch() {
    let tokens: Vec<String> = ["--a", "1", "--b"].iter().map(|t| t.to_string()).collect();
    let map = ArgumentMap::parse(&tokens, 0).unwrap();
    assert_eq!(map.get("a"), Some("1"));
    assert_eq!(map.get("b"), Some("true"));
}

#[test]
fn negative_number_token_reads_as_key_not_value() {
    // "-5" starts with the switch prefix, so it is a key of its own and
    // the option before it becomes a switch.
    let tokens: Vec<String> = ["--count", "-5"].iter().map(|t| t.to_string()).collect();
    let map = ArgumentMap::parse(&tokens, 0).unwrap();
    assert_eq!(map.get("count"), Some("true"));
    assert_eq!(map.get("5"), Some("true"));
}
