//! Ordered, append-only query-string builder.

use std::fmt;

use url::form_urlencoded::byte_serialize;

/// Accumulates `key=value` pairs and renders them as one query string.
///
/// Keys may repeat (`url=a&url=b`) and pairs render in insertion order. Keys
/// and values are encoded with `application/x-www-form-urlencoded` rules, so a
/// space becomes `+` and `&`, `=`, `/`, `:` are percent-escaped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryBuilder {
    parts: Vec<(String, String)>,
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.parts.push((key.into(), value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    /// Raw, unencoded pairs in insertion order.
    pub fn pairs(&self) -> &[(String, String)] {
        &self.parts
    }

    /// Render the encoded query string. Does not include a leading `?`.
    pub fn render(&self) -> String {
        self.parts
            .iter()
            .map(|(key, value)| format!("{}={}", encode(key), encode(value)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

impl fmt::Display for QueryBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

fn encode(raw: &str) -> String {
    byte_serialize(raw.as_bytes()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_builder_renders_empty_string() {
        let query = QueryBuilder::new();
        assert!(query.is_empty());
        assert_eq!(query.render(), "");
    }

    #[test]
    fn pairs_render_in_insertion_order() {
        let mut query = QueryBuilder::new();
        query.add("url", "b").add("content", "a").add("url", "c");
        assert_eq!(query.render(), "url=b&content=a&url=c");
        assert_eq!(query.len(), 3);
    }

    #[test]
    fn reserved_characters_are_escaped() {
        let mut query = QueryBuilder::new();
        query.add("url", "http://x/y.jpg");
        query.add("q", "a b&c=d");
        assert_eq!(query.render(), "url=http%3A%2F%2Fx%2Fy.jpg&q=a+b%26c%3Dd");
    }

    #[test]
    fn star_is_kept_and_tilde_is_escaped() {
        let mut query = QueryBuilder::new();
        query.add("q", "a*b~c-d_e.f");
        assert_eq!(query.render(), "q=a*b%7Ec-d_e.f");
    }

    #[test]
    fn keys_are_encoded_too() {
        let mut query = QueryBuilder::new();
        query.add("a key", "v");
        assert_eq!(query.render(), "a+key=v");
    }

    #[test]
    fn render_is_repeatable() {
        let mut query = QueryBuilder::new();
        query.add("resolution", "100x100,200x50");
        let first = query.render();
        assert_eq!(first, query.render());
        assert_eq!(first, query.to_string());
        assert_eq!(first, "resolution=100x100%2C200x50");
    }

    #[test]
    fn non_ascii_is_percent_encoded_as_utf8() {
        let mut query = QueryBuilder::new();
        query.add("url", "http://x/é.jpg");
        assert_eq!(query.render(), "url=http%3A%2F%2Fx%2F%C3%A9.jpg");
    }
}
