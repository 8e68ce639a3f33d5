//! Endpoint options and optional typed views over Imagga responses.
//!
//! # Design
//! Endpoint results are returned as `serde_json::Value` because their shape
//! belongs to the service. The upload response is the one callers almost
//! always need to pick apart (to reuse the new content id), so it gets a
//! small typed view here.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

/// Switches for the `colors` endpoint. Both default to `true`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorOptions {
    pub extract_overall_colors: bool,
    pub extract_object_colors: bool,
}

impl Default for ColorOptions {
    fn default() -> Self {
        Self {
            extract_overall_colors: true,
            extract_object_colors: true,
        }
    }
}

/// One stored file reported by the upload endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UploadedContent {
    pub id: String,
    #[serde(default)]
    pub filename: String,
}

/// Body of a successful `POST content`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UploadResponse {
    pub status: String,
    #[serde(default)]
    pub uploaded: Vec<UploadedContent>,
}

impl UploadResponse {
    pub fn from_value(value: Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// Ids usable later as `ImageRef::ContentId`.
    pub fn content_ids(&self) -> Vec<&str> {
        self.uploaded.iter().map(|u| u.id.as_str()).collect()
    }
}
