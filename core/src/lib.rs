//! Synchronous client for the Imagga image-recognition API.
//!
//! # Overview
//! Covers tagging, categorization, smart cropping, color extraction and
//! content upload/delete. Results come back as `serde_json::Value`; failures
//! of every kind come back as `ApiError`.
//!
//! # Design
//! - `QueryBuilder` renders ordered, repeatable query parameters.
//! - `ImaggaClient` is stateless apart from credentials and base URL. Each
//!   endpoint is a `build_*` method producing an `HttpRequest`, and
//!   `parse_response` consumes the `HttpResponse`, so the I/O boundary is
//!   explicit and the request logic is testable without a network.
//! - `Imagga` pairs a client with a `Transport` (ureq by default) and runs
//!   build, send and parse in one call.
//! - Images are `ImageRef::Url` or `ImageRef::ContentId`; plain strings are
//!   classified by length (32 characters is a content id).

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod image;
mod multipart;
pub mod query;
pub mod transport;
pub mod types;

pub use api::Imagga;
pub use client::{ImaggaClient, MAX_CONTENT_IDS, MAX_URLS};
pub use config::{Credentials, EnvConfig, DEFAULT_BASE_URL};
pub use error::{ApiError, Result};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use image::{ImageRef, OneOrMore, Resolution, CONTENT_ID_LEN};
pub use query::QueryBuilder;
pub use transport::{Transport, UreqTransport};
pub use types::{ColorOptions, UploadResponse, UploadedContent};
