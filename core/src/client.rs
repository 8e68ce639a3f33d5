//! Stateless HTTP request builder and response parser for the Imagga API.
//!
//! # Design
//! `ImaggaClient` holds only credentials and a base URL and carries no
//! mutable state between calls. Each endpoint has a `build_*` method that
//! validates input and produces a complete `HttpRequest`, and every response
//! goes through the single `parse_response`. The caller (usually `Imagga`)
//! executes the HTTP round-trip in between, keeping this module deterministic
//! and free of I/O apart from reading files handed to `build_upload_file`.
//!
//! Validation happens before a request exists, so a rejected call never
//! reaches the network.

use std::path::Path;

use log::warn;
use serde::Deserialize;
use serde_json::Value;
use url::Url;

use crate::config::{Credentials, DEFAULT_BASE_URL};
use crate::error::{ApiError, Result};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::image::{ImageRef, OneOrMore, Resolution};
use crate::multipart::MultipartForm;
use crate::query::QueryBuilder;
use crate::types::ColorOptions;

/// Most URL images the tagging endpoint takes in one call.
pub const MAX_URLS: usize = 10;
/// Most content ids any image endpoint takes in one call.
pub const MAX_CONTENT_IDS: usize = 30;

/// Synchronous, stateless client for the Imagga API.
///
/// Builds `HttpRequest` values and parses `HttpResponse` values without
/// touching the network.
#[derive(Debug, Clone)]
pub struct ImaggaClient {
    credentials: Credentials,
    base_url: String,
}

impl ImaggaClient {
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self::from_credentials(Credentials::new(api_key, api_secret))
    }

    pub fn from_credentials(credentials: Credentials) -> Self {
        Self {
            credentials,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Point the client at another API origin, e.g. a local mock server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    // ── Account ─────────────────────────────────────────────────────

    pub fn build_usage(&self) -> Result<HttpRequest> {
        self.get(&["usage"], &QueryBuilder::new())
    }

    // ── Analysis ────────────────────────────────────────────────────

    /// Tag up to ten URLs and up to thirty content ids in one call.
    pub fn build_tags(&self, images: impl Into<OneOrMore<ImageRef>>) -> Result<HttpRequest> {
        let images: OneOrMore<ImageRef> = images.into();
        ensure_url_limit(&images)?;
        ensure_content_limit(&images)?;
        self.get(&["tagging"], &image_query(&images))
    }

    /// Run the named categorizer over the images.
    pub fn build_categorize(
        &self,
        category: &str,
        images: impl Into<OneOrMore<ImageRef>>,
    ) -> Result<HttpRequest> {
        ensure_segment("category", category)?;
        let images: OneOrMore<ImageRef> = images.into();
        ensure_content_limit(&images)?;
        self.get(&["categorizations", category], &image_query(&images))
    }

    /// List the categorizers available to the account.
    pub fn build_categories(&self) -> Result<HttpRequest> {
        self.get(&["categorizers"], &QueryBuilder::new())
    }

    /// Smart-crop the images to every resolution. `allow_scale` lets the
    /// service upscale when the source is smaller than the target.
    pub fn build_crop(
        &self,
        images: impl Into<OneOrMore<ImageRef>>,
        resolutions: impl Into<OneOrMore<Resolution>>,
        allow_scale: bool,
    ) -> Result<HttpRequest> {
        let images: OneOrMore<ImageRef> = images.into();
        ensure_content_limit(&images)?;
        let resolutions: OneOrMore<Resolution> = resolutions.into();
        let resolution = resolutions
            .iter()
            .map(Resolution::to_string)
            .collect::<Vec<_>>()
            .join(",");

        let mut query = image_query(&images);
        query
            .add("resolution", resolution)
            .add("no_scaling", flag(!allow_scale));
        self.get(&["croppings"], &query)
    }

    pub fn build_colors(
        &self,
        images: impl Into<OneOrMore<ImageRef>>,
        options: ColorOptions,
    ) -> Result<HttpRequest> {
        let images: OneOrMore<ImageRef> = images.into();
        ensure_content_limit(&images)?;

        let mut query = image_query(&images);
        query
            .add("extract_overall_colors", flag(options.extract_overall_colors))
            .add("extract_object_colors", flag(options.extract_object_colors));
        self.get(&["colors"], &query)
    }

    // ── Content ─────────────────────────────────────────────────────

    /// Upload one image. Without a filename the service sees
    /// `<unix timestamp>.png`.
    pub fn build_upload(&self, data: &[u8], filename: Option<&str>) -> Result<HttpRequest> {
        if data.is_empty() {
            return Err(ApiError::validation("upload data must not be empty"));
        }
        let filename = match filename {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => default_filename(),
        };
        let form = MultipartForm::new().file("image", &filename, data);
        self.post(&["content"], form)
    }

    /// Upload a local file under its own file name.
    pub fn build_upload_file(&self, path: impl AsRef<Path>) -> Result<HttpRequest> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        let filename = path.file_name().and_then(|name| name.to_str());
        self.build_upload(&data, filename)
    }

    /// Plain GET for an image hosted elsewhere, ahead of `build_upload_fetched`.
    /// Carries no credentials.
    pub fn build_fetch(&self, location: &str) -> Result<HttpRequest> {
        let url = Url::parse(location)?;
        Ok(HttpRequest {
            method: HttpMethod::Get,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        })
    }

    /// Image bytes from a fetch response. Any non-2xx status is an error.
    pub fn parse_fetch(&self, response: HttpResponse) -> Result<Vec<u8>> {
        match response.status {
            200..=299 => Ok(response.body),
            status => Err(ApiError::Http {
                status,
                body: response.text().into_owned(),
            }),
        }
    }

    /// Upload bytes fetched from `location` under its last path segment.
    pub fn build_upload_fetched(&self, location: &str, data: &[u8]) -> Result<HttpRequest> {
        let url = Url::parse(location)?;
        let filename = url
            .path_segments()
            .and_then(|segments| segments.last())
            .filter(|name| !name.is_empty());
        self.build_upload(data, filename)
    }

    pub fn build_delete(&self, content_id: &str) -> Result<HttpRequest> {
        ensure_segment("content id", content_id)?;
        self.delete(&["content", content_id])
    }

    // ── Responses ───────────────────────────────────────────────────

    /// Decode a response from any endpoint.
    ///
    /// 2xx bodies come back as JSON unchanged (an empty body is `Null`).
    /// 4xx bodies must carry `{"message": ...}`, which becomes
    /// `ApiError::Remote`.
    pub fn parse_response(&self, response: HttpResponse) -> Result<Value> {
        match response.status {
            200..=299 => decode_body(&response.body),
            400..=499 => Err(remote_error(response)),
            status => Err(ApiError::Http {
                status,
                body: response.text().into_owned(),
            }),
        }
    }

    // ── Dispatch ────────────────────────────────────────────────────

    fn get(&self, segments: &[&str], query: &QueryBuilder) -> Result<HttpRequest> {
        Ok(HttpRequest {
            method: HttpMethod::Get,
            url: self.endpoint(segments, query)?,
            headers: self.base_headers(),
            body: None,
        })
    }

    fn post(&self, segments: &[&str], form: MultipartForm) -> Result<HttpRequest> {
        let mut headers = self.base_headers();
        headers.push(("content-type".to_string(), form.content_type()));
        Ok(HttpRequest {
            method: HttpMethod::Post,
            url: self.endpoint(segments, &QueryBuilder::new())?,
            headers,
            body: Some(form.finish()),
        })
    }

    fn delete(&self, segments: &[&str]) -> Result<HttpRequest> {
        Ok(HttpRequest {
            method: HttpMethod::Delete,
            url: self.endpoint(segments, &QueryBuilder::new())?,
            headers: self.base_headers(),
            body: None,
        })
    }

    fn base_headers(&self) -> Vec<(String, String)> {
        vec![
            ("authorization".to_string(), self.credentials.authorization()),
            ("accept".to_string(), "application/json".to_string()),
        ]
    }

    /// Base URL plus percent-encoded path segments plus the rendered query.
    fn endpoint(&self, segments: &[&str], query: &QueryBuilder) -> Result<String> {
        let mut url = Url::parse(&self.base_url)?;
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend(segments);
        if !query.is_empty() {
            url.set_query(Some(&query.render()));
        }
        Ok(url.into())
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

fn decode_body(body: &[u8]) -> Result<Value> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_slice(body)?)
}

fn remote_error(response: HttpResponse) -> ApiError {
    let status = response.status;
    match serde_json::from_slice::<ErrorBody>(&response.body) {
        Ok(ErrorBody { message }) => ApiError::Remote { status, message },
        Err(e) => {
            warn!("HTTP {status} error body has no message: {e}");
            ApiError::MalformedErrorBody {
                status,
                body: response.text().into_owned(),
            }
        }
    }
}

fn image_query(images: &OneOrMore<ImageRef>) -> QueryBuilder {
    let mut query = QueryBuilder::new();
    for image in images {
        query.add(image.query_key(), image.as_str());
    }
    query
}

/// Path segments that survive as themselves: `.` and `..` would be resolved
/// away by the URL parser and hit another endpoint.
fn ensure_segment(what: &str, value: &str) -> Result<()> {
    match value {
        "" => Err(ApiError::validation(format!("{what} must not be empty"))),
        "." | ".." => Err(ApiError::validation(format!("{what} must not be `{value}`"))),
        _ => Ok(()),
    }
}

fn ensure_url_limit(images: &OneOrMore<ImageRef>) -> Result<()> {
    if images.iter().filter(|image| image.is_url()).count() > MAX_URLS {
        return Err(ApiError::validation("You can only request ten URLs"));
    }
    Ok(())
}

fn ensure_content_limit(images: &OneOrMore<ImageRef>) -> Result<()> {
    if images.iter().filter(|image| image.is_content_id()).count() > MAX_CONTENT_IDS {
        return Err(ApiError::validation("You can only request thirty content ids"));
    }
    Ok(())
}

fn flag(value: bool) -> &'static str {
    if value {
        "1"
    } else {
        "0"
    }
}

fn default_filename() -> String {
    format!("{}.png", chrono::Utc::now().timestamp())
}
