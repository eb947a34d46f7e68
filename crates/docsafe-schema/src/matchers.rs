//! Value predicates usable as field-shape guards.

use std::collections::BTreeSet;

use regex::Regex;
use serde_json::Value;

use crate::error::{json_type_name, MatchError, Result};
use crate::patterns::{OLD_ID, URL};

/// A predicate over JSON values.
pub trait Matcher: Send + Sync {
    /// Accept or reject `value`.
    fn check(&self, value: &Value) -> std::result::Result<(), MatchError>;

    fn matches(&self, value: &Value) -> bool {
        self.check(value).is_ok()
    }
}

/// Accepts objects whose keys are all in a whitelist. Values are unconstrained
/// and every whitelisted key is optional.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WhitelistedObject {
    allowed: BTreeSet<String>,
}

impl WhitelistedObject {
    pub fn new<I, S>(allowed_keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed: allowed_keys.into_iter().map(Into::into).collect(),
        }
    }

    pub fn allowed_keys(&self) -> impl Iterator<Item = &str> {
        self.allowed.iter().map(String::as_str)
    }
}

impl Matcher for WhitelistedObject {
    fn check(&self, value: &Value) -> std::result::Result<(), MatchError> {
        let map = value
            .as_object()
            .ok_or_else(|| MatchError::NotAnObject(json_type_name(value)))?;

        match map.keys().find(|key| !self.allowed.contains(key.as_str())) {
            Some(extra) => Err(MatchError::KeyNotAllowed(extra.clone())),
            None => Ok(()),
        }
    }
}

/// Accepts strings matching a regular expression.
#[derive(Debug, Clone)]
pub struct RegEx {
    pattern: Regex,
}

impl RegEx {
    /// Compile `pattern` into a matcher.
    pub fn new(pattern: &str) -> Result<Self> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
        })
    }

    pub fn from_regex(pattern: Regex) -> Self {
        Self { pattern }
    }

    /// Matcher for legacy 17-character ids.
    pub fn old_id() -> Self {
        Self::from_regex(OLD_ID.clone())
    }

    /// Matcher for permissive URLs.
    pub fn url() -> Self {
        Self::from_regex(URL.clone())
    }

    pub fn as_str(&self) -> &str {
        self.pattern.as_str()
    }
}

impl Matcher for RegEx {
    fn check(&self, value: &Value) -> std::result::Result<(), MatchError> {
        let text = value
            .as_str()
            .ok_or_else(|| MatchError::NotAString(json_type_name(value)))?;

        if self.pattern.is_match(text) {
            Ok(())
        } else {
            Err(MatchError::NoMatch {
                value: text.to_string(),
                pattern: self.pattern.as_str().to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn whitelisted_object_accepts_subsets() {
        let matcher = WhitelistedObject::new(["a", "b"]);
        assert!(matcher.matches(&json!({"a": 1})));
        assert!(matcher.matches(&json!({"a": 1, "b": 2})));
        assert!(matcher.matches(&json!({})));
        assert!(matcher.matches(&json!({"b": {"nested": [1, 2, 3]}})));
    }

    #[test]
    fn whitelisted_object_rejects_extra_keys() {
        let matcher = WhitelistedObject::new(["a", "b"]);
        assert_eq!(
            matcher.check(&json!({"a": 1, "c": 3})),
            Err(MatchError::KeyNotAllowed("c".to_string()))
        );
    }

    #[test]
    fn whitelisted_object_rejects_non_objects() {
        let matcher = WhitelistedObject::new(["a"]);
        assert_eq!(
            matcher.check(&json!(["a"])),
            Err(MatchError::NotAnObject("array"))
        );
        assert!(!matcher.matches(&Value::Null));
    }

    #[test]
    fn regex_matches_strings_only() {
        let matcher = RegEx::new(r"^\d+$").unwrap();
        assert!(matcher.matches(&json!("123")));
        assert!(matches!(
            matcher.check(&json!("12a")),
            Err(MatchError::NoMatch { .. })
        ));
        assert_eq!(
            matcher.check(&json!(123)),
            Err(MatchError::NotAString("number"))
        );
    }

    #[test]
    fn regex_rejects_invalid_patterns() {
        assert!(RegEx::new("(unclosed").is_err());
    }

    #[test]
    fn builtin_pattern_matchers() {
        assert!(RegEx::url().matches(&json!("http://localhost/path")));
        assert!(!RegEx::url().matches(&json!("not a url")));
        assert!(RegEx::old_id().matches(&json!("ABCDEFGHJKLMNPQRS")));
    }
}
