//! Blocking Imagga client that performs the HTTP round-trip.
//!
//! Every method builds a request with `ImaggaClient`, sends it through the
//! configured `Transport` and parses the response. One call is exactly one
//! request; nothing is retried.

use std::path::Path;

use log::debug;
use serde_json::Value;

use crate::client::ImaggaClient;
use crate::config::EnvConfig;
use crate::error::Result;
use crate::http::HttpRequest;
use crate::image::{ImageRef, OneOrMore, Resolution};
use crate::transport::{Transport, UreqTransport};
use crate::types::ColorOptions;

/// Imagga API client.
///
/// # Example
/// ```no_run
/// use imagga_core::{Imagga, ImageRef};
///
/// # fn example() -> imagga_core::Result<()> {
/// let imagga = Imagga::new("acc_key", "secret");
/// let tags = imagga.tags(ImageRef::from("https://example.com/cat.jpg"))?;
/// println!("{tags}");
/// # Ok(())
/// # }
/// ```
pub struct Imagga<T = UreqTransport> {
    client: ImaggaClient,
    transport: T,
}

impl Imagga<UreqTransport> {
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self::with_transport(ImaggaClient::new(api_key, api_secret), UreqTransport::new())
    }

    /// Build a client from `IMAGGA_API_KEY`, `IMAGGA_API_SECRET` and the
    /// optional `IMAGGA_API_URL`.
    pub fn from_env() -> Result<Self> {
        let config = EnvConfig::from_env()?;
        let mut client = ImaggaClient::from_credentials(config.credentials);
        if let Some(base_url) = config.base_url {
            client = client.with_base_url(base_url);
        }
        Ok(Self::with_transport(client, UreqTransport::new()))
    }
}

impl<T: Transport> Imagga<T> {
    pub fn with_transport(client: ImaggaClient, transport: T) -> Self {
        Self { client, transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Account usage statistics.
    pub fn usage(&self) -> Result<Value> {
        self.dispatch(self.client.build_usage()?)
    }

    pub fn tags(&self, images: impl Into<OneOrMore<ImageRef>>) -> Result<Value> {
        self.dispatch(self.client.build_tags(images)?)
    }

    pub fn categorize(
        &self,
        category: &str,
        images: impl Into<OneOrMore<ImageRef>>,
    ) -> Result<Value> {
        self.dispatch(self.client.build_categorize(category, images)?)
    }

    /// Available categorizers.
    pub fn categories(&self) -> Result<Value> {
        self.dispatch(self.client.build_categories()?)
    }

    pub fn crop(
        &self,
        images: impl Into<OneOrMore<ImageRef>>,
        resolutions: impl Into<OneOrMore<Resolution>>,
        allow_scale: bool,
    ) -> Result<Value> {
        self.dispatch(self.client.build_crop(images, resolutions, allow_scale)?)
    }

    pub fn colors(
        &self,
        images: impl Into<OneOrMore<ImageRef>>,
        options: ColorOptions,
    ) -> Result<Value> {
        self.dispatch(self.client.build_colors(images, options)?)
    }

    /// Upload raw image bytes. See `UploadResponse` for reading the new id.
    pub fn upload(&self, data: &[u8], filename: Option<&str>) -> Result<Value> {
        self.dispatch(self.client.build_upload(data, filename)?)
    }

    pub fn upload_file(&self, path: impl AsRef<Path>) -> Result<Value> {
        self.dispatch(self.client.build_upload_file(path)?)
    }

    /// Fetch an image from `location` through the same transport and upload
    /// it under the URL's last path segment.
    pub fn upload_url(&self, location: &str) -> Result<Value> {
        let fetch = self.client.build_fetch(location)?;
        debug!("{} {}", fetch.method, fetch.url);
        let data = self.client.parse_fetch(self.transport.send(&fetch)?)?;
        self.dispatch(self.client.build_upload_fetched(location, &data)?)
    }

    pub fn delete(&self, content_id: &str) -> Result<Value> {
        self.dispatch(self.client.build_delete(content_id)?)
    }

    fn dispatch(&self, request: HttpRequest) -> Result<Value> {
        debug!("{} {}", request.method, request.url);
        let response = self.transport.send(&request)?;
        debug!("{} {} -> {}", request.method, request.url, response.status);
        self.client.parse_response(response)
    }
}
