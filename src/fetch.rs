//! HTTP retrieval of guide pages and images.
//!
//! One blocking client is shared by the page request and every image
//! download. There is no retry and no timeout beyond reqwest's defaults.

use reqwest::blocking::{Client, Response};
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue, USER_AGENT};
use tracing::debug;

use crate::error::{Error, Result};
use crate::util::{charset_from_content_type, decode_text};

/// Browser-like User-Agent sent with every request.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Source of image bytes for the asset localizer.
pub trait ImageSource {
    /// Download the image at `url`.
    fn fetch_image(&self, url: &str) -> Result<Vec<u8>>;
}

/// Blocking HTTP fetcher.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    /// Build a fetcher that sends [`BROWSER_USER_AGENT`].
    pub fn new() -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| Error::Unknown(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Fetch a page and decode it to text.
    ///
    /// The `charset` parameter of `Content-Type` is used as the decoding hint
    /// when the body is not valid UTF-8.
    pub fn fetch_page(&self, url: &str) -> Result<String> {
        let response = self.get(url)?;
        let charset = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(charset_from_content_type)
            .map(str::to_string);
        let bytes = response.bytes().map_err(|e| Error::from_reqwest(url, e))?;
        debug!(url, bytes = bytes.len(), "fetched page");
        Ok(decode_text(&bytes, charset.as_deref()).into_owned())
    }

    /// Fetch raw bytes.
    pub fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.get(url)?;
        let bytes = response.bytes().map_err(|e| Error::from_reqwest(url, e))?;
        Ok(bytes.to_vec())
    }

    fn get(&self, url: &str) -> Result<Response> {
        self.client
            .get(url)
            .send()
            .and_then(Response::error_for_status)
            .map_err(|e| Error::from_reqwest(url, e))
    }
}

impl ImageSource for Fetcher {
    fn fetch_image(&self, url: &str) -> Result<Vec<u8>> {
        self.fetch_bytes(url).map_err(|e| Error::ImageDownload {
            url: url.to_string(),
            message: e.to_string(),
        })
    }
}
