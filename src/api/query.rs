//! Ordered query strings and default resolution
//!
//! The query string is covered by the signature, so parameters are kept in
//! insertion order and never pass through a map.

use super::error::{Result, StorageError};
use std::fmt::Write as FmtWrite;

/// Query parameters in wire order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(&'static str, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a query with the `bucket_name` and `region` pair every operation carries
    pub fn with_location(bucket_name: &str, region: &str) -> Self {
        let mut query = Self {
            pairs: Vec::with_capacity(8),
        };
        query.push("bucket_name", bucket_name);
        query.push("region", region);
        query
    }

    pub fn push(&mut self, key: &'static str, value: impl ToString) -> &mut Self {
        self.pairs.push((key, value.to_string()));
        self
    }

    pub fn extend<I, V>(&mut self, pairs: I) -> &mut Self
    where
        I: IntoIterator<Item = (&'static str, V)>,
        V: ToString,
    {
        for (key, value) in pairs {
            self.push(key, value);
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Percent-encode keys and values (RFC 3986 unreserved kept) and join with `&`
    pub fn encode(&self) -> String {
        let mut out = String::with_capacity(self.pairs.len() * 24);
        for (i, (key, value)) in self.pairs.iter().enumerate() {
            if i > 0 {
                out.push('&');
            }
            let _ = write!(
                out,
                "{}={}",
                urlencoding::encode(key),
                urlencoding::encode(value)
            );
        }
        out
    }

    /// `path?query`, or just `path` when there are no parameters
    pub fn append_to(&self, path: &str) -> String {
        if self.pairs.is_empty() {
            path.to_string()
        } else {
            format!("{}?{}", path, self.encode())
        }
    }
}

/// Operation argument, else configured default, else literal default.
/// Empty strings count as unset at every tier.
pub fn resolve<'a>(argument: Option<&'a str>, configured: Option<&'a str>, literal: &'a str) -> &'a str {
    argument
        .filter(|v| !v.is_empty())
        .or_else(|| configured.filter(|v| !v.is_empty()))
        .unwrap_or(literal)
}

/// Required string field; empty counts as missing
pub fn require<'a>(
    value: Option<&'a str>,
    field: &'static str,
    operation: &'static str,
) -> Result<&'a str> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(StorageError::missing(field, operation)),
    }
}

/// Required positive count; zero counts as missing
pub fn require_count(value: Option<u32>, field: &'static str, operation: &'static str) -> Result<u32> {
    match value {
        Some(v) if v > 0 => Ok(v),
        _ => Err(StorageError::missing(field, operation)),
    }
}

/// Percent-encode a single path segment
pub fn encode_segment(segment: &str) -> String {
    urlencoding::encode(segment).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_comes_first() {
        let mut query = QueryParams::with_location("media", "eu-central");
        query.push("key", "a.txt").push("visibility", "public");
        assert_eq!(
            query.encode(),
            "bucket_name=media&region=eu-central&key=a.txt&visibility=public"
        );
        assert_eq!(query.len(), 4);
        assert_eq!(query.get("key"), Some("a.txt"));
    }

    #[test]
    fn test_insertion_order_is_kept() {
        let mut query = QueryParams::new();
        query.extend([("zebra", "1"), ("alpha", "2")]);
        assert_eq!(query.encode(), "zebra=1&alpha=2");
    }

    #[test]
    fn test_values_are_percent_encoded() {
        let mut query = QueryParams::new();
        query.push("key", "photos/summer trip/a+b.jpg").push("prefix", "");
        assert_eq!(
            query.encode(),
            "key=photos%2Fsummer%20trip%2Fa%2Bb.jpg&prefix="
        );
    }

    #[test]
    fn test_rfc3986_not_form_encoding() {
        let mut query = QueryParams::new();
        query.push("key", "my file~v2*.txt");
        assert_eq!(query.encode(), "key=my%20file~v2%2A.txt");
    }

    #[test]
    fn test_append_to() {
        assert_eq!(QueryParams::new().append_to("/x"), "/x");
        let mut query = QueryParams::new();
        query.push("page", 2);
        assert_eq!(query.append_to("/x"), "/x?page=2");
    }

    #[test]
    fn test_resolve_tiers() {
        assert_eq!(resolve(Some("arg"), Some("cfg"), "lit"), "arg");
        assert_eq!(resolve(None, Some("cfg"), "lit"), "cfg");
        assert_eq!(resolve(Some(""), Some("cfg"), "lit"), "cfg");
        assert_eq!(resolve(None, None, "lit"), "lit");
        assert_eq!(resolve(None, Some(""), ""), "");
    }

    #[test]
    fn test_require() {
        assert_eq!(require(Some("k"), "key", "delete").unwrap(), "k");
        let err = require(Some(""), "key", "delete").unwrap_err();
        assert_eq!(err.to_string(), "key is required for delete operation");
        assert!(require(None, "key", "delete").is_err());

        assert_eq!(require_count(Some(3), "total_parts", "upload_part").unwrap(), 3);
        let err = require_count(Some(0), "total_parts", "upload_part").unwrap_err();
        assert_eq!(err.to_string(), "total_parts is required for upload_part operation");
    }

    #[test]
    fn test_encode_segment() {
        assert_eq!(encode_segment("abc-123"), "abc-123");
        assert_eq!(encode_segment("a/b c"), "a%2Fb%20c");
    }
}
