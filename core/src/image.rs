//! Typed inputs for the image endpoints: image references, non-empty
//! sequences and crop resolutions.
//!
//! # Design
//! The service accepts an image either as a public URL (`url=`) or as the id
//! of previously uploaded content (`content=`). `ImageRef` keeps that choice
//! explicit. Only the string conversions guess the kind, using the shape of
//! Imagga content ids: exactly 32 characters means a content id, anything else
//! is a URL. A 32-character URL is therefore misread as a content id; build
//! `ImageRef::Url` directly when that matters.

use std::fmt;
use std::str::FromStr;

use crate::error::{ApiError, Result};

/// Length of a content id returned by the upload endpoint.
pub const CONTENT_ID_LEN: usize = 32;

/// An image the service should analyze.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ImageRef {
    /// Publicly reachable image URL.
    Url(String),
    /// Id of content uploaded earlier through `upload`.
    ContentId(String),
}

impl ImageRef {
    pub fn url(url: impl Into<String>) -> Self {
        ImageRef::Url(url.into())
    }

    pub fn content_id(id: impl Into<String>) -> Self {
        ImageRef::ContentId(id.into())
    }

    /// Guess the kind from the string's length.
    pub fn classify(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        if raw.chars().count() == CONTENT_ID_LEN {
            ImageRef::ContentId(raw)
        } else {
            ImageRef::Url(raw)
        }
    }

    pub fn is_content_id(&self) -> bool {
        matches!(self, ImageRef::ContentId(_))
    }

    pub fn is_url(&self) -> bool {
        matches!(self, ImageRef::Url(_))
    }

    /// Query parameter name the service expects for this kind.
    pub fn query_key(&self) -> &'static str {
        match self {
            ImageRef::Url(_) => "url",
            ImageRef::ContentId(_) => "content",
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ImageRef::Url(value) | ImageRef::ContentId(value) => value,
        }
    }
}

impl From<&str> for ImageRef {
    fn from(raw: &str) -> Self {
        ImageRef::classify(raw)
    }
}

impl From<String> for ImageRef {
    fn from(raw: String) -> Self {
        ImageRef::classify(raw)
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An ordered sequence holding at least one item.
///
/// Endpoints that take "one image or several" accept `impl Into<OneOrMore<T>>`,
/// so a single `ImageRef` works as well as a prepared list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OneOrMore<T>(Vec<T>);

impl<T> OneOrMore<T> {
    pub fn new(first: T) -> Self {
        Self(vec![first])
    }

    /// Append another item.
    pub fn and(mut self, item: T) -> Self {
        self.0.push(item);
        self
    }

    /// Fails with a validation error when `items` is empty.
    pub fn from_vec(items: Vec<T>) -> Result<Self> {
        if items.is_empty() {
            return Err(ApiError::validation("at least one item is required"));
        }
        Ok(Self(items))
    }

    /// Convert and collect `items`, e.g. a list of `&str` into image refs.
    pub fn try_collect<I, S>(items: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<T>,
    {
        Self::from_vec(items.into_iter().map(Into::into).collect())
    }

    pub fn first(&self) -> &T {
        &self.0[0]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<T> {
        self.0
    }
}

impl<T> From<T> for OneOrMore<T> {
    fn from(item: T) -> Self {
        Self::new(item)
    }
}

impl<'a, T> IntoIterator for &'a OneOrMore<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Target size for a smart crop, rendered as `WIDTHxHEIGHT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for Resolution {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || ApiError::validation(format!("invalid resolution: {s}"));
        let (width, height) = s.trim().split_once(['x', 'X']).ok_or_else(invalid)?;
        Ok(Self {
            width: width.trim().parse().map_err(|_| invalid())?,
            height: height.trim().parse().map_err(|_| invalid())?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thirty_two_characters_is_a_content_id() {
        let image = ImageRef::from("abcdef0123456789abcdef0123456789");
        assert!(image.is_content_id());
        assert_eq!(image.query_key(), "content");
    }

    #[test]
    fn other_lengths_are_urls() {
        let image = ImageRef::from("http://example.com/a.jpg");
        assert!(image.is_url());
        assert_eq!(image.query_key(), "url");

        assert!(ImageRef::from("abcdef0123456789abcdef012345678").is_url());
        assert!(ImageRef::from("abcdef0123456789abcdef01234567890").is_url());
    }

    #[test]
    fn explicit_url_bypasses_length_heuristic() {
        let image = ImageRef::url("http://example.com/0123456789abc");
        assert_eq!(image.as_str().len(), CONTENT_ID_LEN);
        assert!(image.is_url());
        assert!(ImageRef::classify(image.as_str()).is_content_id());
    }

    #[test]
    fn one_or_more_rejects_empty_input() {
        let err = OneOrMore::<ImageRef>::from_vec(Vec::new()).unwrap_err();
        assert!(err.is_validation());
        let err = OneOrMore::<ImageRef>::try_collect(Vec::<&str>::new()).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn one_or_more_keeps_order() {
        let images =
            OneOrMore::<ImageRef>::try_collect(["http://a/1.jpg", "http://a/2.jpg"]).unwrap();
        let values: Vec<&str> = images.iter().map(ImageRef::as_str).collect();
        assert_eq!(values, ["http://a/1.jpg", "http://a/2.jpg"]);
        assert_eq!(images.first().as_str(), "http://a/1.jpg");
    }

    #[test]
    fn single_item_converts_into_one_or_more() {
        let images: OneOrMore<ImageRef> = ImageRef::url("http://a/1.jpg").into();
        assert_eq!(images.as_slice().len(), 1);
        let images = images.and(ImageRef::content_id("x"));
        assert_eq!(images.into_vec().len(), 2);
    }

    #[test]
    fn resolution_formats_and_parses() {
        let res = Resolution::new(100, 50);
        assert_eq!(res.to_string(), "100x50");
        assert_eq!("100x50".parse::<Resolution>().unwrap(), res);
        assert_eq!(" 640X480 ".parse::<Resolution>().unwrap(), Resolution::new(640, 480));
        assert!("100".parse::<Resolution>().unwrap_err().is_validation());
        assert!("ax1".parse::<Resolution>().is_err());
    }
}
