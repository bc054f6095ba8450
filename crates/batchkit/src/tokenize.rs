//! Argument tokenization.
//!
//! Turns the unconsumed tail of an argument vector into an
//! [`ArgumentMap`] of option key to raw string value. The grammar is
//! deliberately loose so switches work without values:
//!
//! - every token at the cursor is an option key, with leading `-`
//!   characters stripped (`--name`, `-name` and `name` are the same key)
//! - if the next token exists and does not start with `-`, it is consumed
//!   as the key's value
//! - otherwise the key stands alone and records the value `"true"`
//!
//! Values are kept as the exact strings supplied; coercion happens later,
//! per parameter, in [`crate::bind`].

use thiserror::Error;

/// The prefix character that marks option keys and short aliases.
pub const SWITCH_PREFIX: char = '-';

/// A key was supplied more than once in one invocation.
///
/// Keys compare case-insensitively, so `--Name` conflicts with `--name`.
/// The reported key is the spelling seen first.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("option '{key}' was supplied more than once")]
pub struct DuplicateOption {
    pub key: String,
}

/// The option map for one invocation.
///
/// Stored keys keep the case the caller wrote; lookups compare
/// case-insensitively. Insertion order is preserved for inspection but
/// carries no meaning.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArgumentMap {
    entries: Vec<(String, String)>,
}

impl ArgumentMap {
    /// Scans `args[offset..]` into an option map.
    ///
    /// Bare tokens are keys too, so a tail that repeats the same bare
    /// token fails just like a repeated option does.
    ///
    /// ```
    /// use batchkit::ArgumentMap;
    ///
    /// let args: Vec<String> = ["--name", "Alice", "--verbose"]
    ///     .into_iter()
    ///     .map(String::from)
    ///     .collect();
    /// let map = ArgumentMap::parse(&args, 0).unwrap();
    /// assert_eq!(map.get("name"), Some("Alice"));
    /// assert_eq!(map.get("verbose"), Some("true"));
    /// ```
    pub fn parse(args: &[String], offset: usize) -> Result<Self, DuplicateOption> {
        let mut map = ArgumentMap::default();
        let mut cursor = offset;
        while cursor < args.len() {
            let key = args[cursor].trim_start_matches(SWITCH_PREFIX);
            let value = match args.get(cursor + 1) {
                Some(next) if !next.starts_with(SWITCH_PREFIX) => {
                    cursor += 2;
                    next.clone()
                }
                _ => {
                    cursor += 1;
                    String::from("true")
                }
            };
            map.insert(key, value)?;
        }
        Ok(map)
    }

    fn insert(&mut self, key: &str, value: String) -> Result<(), DuplicateOption> {
        if let Some((existing, _)) = self
            .entries
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
        {
            return Err(DuplicateOption {
                key: existing.clone(),
            });
        }
        self.entries.push((key.to_string(), value));
        Ok(())
    }

    /// Looks up a key, ignoring ASCII case. The value is the raw string
    /// as supplied.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// True when the key is present under any casing.
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The entries in insertion order, keys as written by the caller.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_key_value_pairs_and_switches() {
        let map = ArgumentMap::parse(&args(&["--name", "Alice", "--verbose"]), 0).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("name"), Some("Alice"));
        assert_eq!(map.get("verbose"), Some("true"));
    }

    #[test]
    fn test_prefix_variants_collapse_to_one_key() {
        let map = ArgumentMap::parse(&args(&["-n", "1"]), 0).unwrap();
        assert_eq!(map.get("n"), Some("1"));

        let map = ArgumentMap::parse(&args(&["--n", "2"]), 0).unwrap();
        assert_eq!(map.get("n"), Some("2"));
    }

    #[test]
    fn test_bare_token_is_a_switch_key() {
        let map = ArgumentMap::parse(&args(&["force"]), 0).unwrap();
        assert_eq!(map.get("force"), Some("true"));
    }

    #[test]
    fn test_bare_token_followed_by_value() {
        // A bare token consumes the next non-prefixed token, same as an
        // option key would.
        let map = ArgumentMap::parse(&args(&["name", "Alice"]), 0).unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("name"), Some("Alice"));
    }

    #[test]
    fn test_adjacent_switches_both_record_true() {
        let map = ArgumentMap::parse(&args(&["--a", "--b", "value"]), 0).unwrap();
        assert_eq!(map.get("a"), Some("true"));
        assert_eq!(map.get("b"), Some("value"));
    }

    #[test]
    fn test_offset_skips_consumed_tokens() {
        let map = ArgumentMap::parse(&args(&["command", "--name", "Bob"]), 1).unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("name"), Some("Bob"));
    }

    #[test]
    fn test_offset_past_end_yields_empty_map() {
        let map = ArgumentMap::parse(&args(&["command"]), 1).unwrap();
        assert!(map.is_empty());
        let map = ArgumentMap::parse(&args(&[]), 5).unwrap();
        assert!(map.is_empty());
    }

    #[test]
    fn test_lookup_ignores_case() {
        let map = ArgumentMap::parse(&args(&["--Name", "Alice"]), 0).unwrap();
        assert_eq!(map.get("name"), Some("Alice"));
        assert_eq!(map.get("NAME"), Some("Alice"));
        assert!(map.contains("nAmE"));
    }

    #[test]
    fn test_stored_key_keeps_caller_case() {
        let map = ArgumentMap::parse(&args(&["--Name", "Alice"]), 0).unwrap();
        let keys: Vec<&str> = map.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["Name"]);
    }

    #[test]
    fn test_duplicate_key_is_rejected() {
        let err = ArgumentMap::parse(&args(&["--name", "a", "--name", "b"]), 0).unwrap_err();
        assert_eq!(err.key, "name");
    }

    #[test]
    fn test_duplicate_detection_ignores_case_and_prefix() {
        let err = ArgumentMap::parse(&args(&["--Name", "a", "-name", "b"]), 0).unwrap_err();
        // The first spelling seen is the one reported.
        assert_eq!(err.key, "Name");
        assert_eq!(
            err.to_string(),
            "option 'Name' was supplied more than once"
        );
    }

    #[test]
    fn test_value_kept_verbatim() {
        let raw = r#"{"csv":"a,b\n1,2"}"#;
        let map = ArgumentMap::parse(&args(&["--payload", raw]), 0).unwrap();
        assert_eq!(map.get("payload"), Some(raw));
    }
}
