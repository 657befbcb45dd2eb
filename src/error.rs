//! Error types for guide processing.

use thiserror::Error;

/// Errors that can occur while fetching, converting or writing a guide.
#[derive(Error, Debug)]
pub enum Error {
    /// Connection failure, timeout, or non-2xx status.
    #[error("network error fetching {url}: {message}")]
    Network { url: String, message: String },

    /// A container the conversion requires is missing from the page.
    #[error("content not found: {0}")]
    ContentNotFound(String),

    /// A single image could not be downloaded or saved.
    #[error("failed to download image {url}: {message}")]
    ImageDownload { url: String, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Unknown(String),
}

impl Error {
    /// Classify a reqwest failure for `url`.
    ///
    /// Transport, timeout, body and status failures are network errors;
    /// anything else (a request that could not even be built, a redirect
    /// loop) is unknown.
    pub fn from_reqwest(url: &str, err: reqwest::Error) -> Self {
        if err.is_connect()
            || err.is_timeout()
            || err.is_status()
            || err.is_request()
            || err.is_body()
            || err.is_decode()
        {
            Error::Network {
                url: url.to_string(),
                message: err.to_string(),
            }
        } else {
            Error::Unknown(format!("error fetching {url}: {err}"))
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
