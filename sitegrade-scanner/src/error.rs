use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("{url} responded with HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("Request to {0} timed out")]
    Timeout(String),

    #[error("PageSpeed response could not be parsed: {0}")]
    PageSpeedPayload(String),
}

impl ScanError {
    /// Maps a reqwest failure for `url` onto the narrower variants where possible.
    pub(crate) fn from_request(url: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ScanError::Timeout(url.to_string())
        } else {
            ScanError::HttpError(err)
        }
    }
}

pub type Result<T> = std::result::Result<T, ScanError>;
