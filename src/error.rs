// SPDX-License-Identifier: MPL-2.0
use std::fmt;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// `open()` was called with an empty collection list or an out-of-range
    /// index. A fatal precondition violation: the caller's integration is
    /// broken and must fail fast rather than present a blank viewer.
    InvalidPosition(String),
    /// A media load failed. Recovered locally with a fallback placeholder;
    /// never halts the timeline.
    MediaLoad(MediaLoadError),
    /// A view-analytics request failed. Logged and discarded; viewing never
    /// degrades because analytics failed.
    Reporting(String),
    Config(String),
    Io(String),
}

/// Specific error types for media load issues.
/// The renderer uses these to pick a fallback presentation; none of them
/// affect the playback timeline.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaLoadError {
    /// Network failure while fetching the media (connection, DNS, HTTP status).
    Network(String),

    /// The fetch did not complete in time.
    Timeout,

    /// Bytes arrived but could not be decoded as an image.
    Decode(String),

    /// The render layer reported a load error after the fetch succeeded.
    RenderSignal(String),

    /// Generic error with raw message.
    Other(String),
}

impl MediaLoadError {
    /// Attempts to parse a raw error message into a specific `MediaLoadError`.
    /// Used to categorize errors coming out of the HTTP client and the decoder.
    pub fn from_message(msg: &str) -> Self {
        let msg_lower = msg.to_lowercase();

        if msg_lower.contains("timed out") || msg_lower.contains("timeout") {
            return MediaLoadError::Timeout;
        }

        if msg_lower.contains("connect")
            || msg_lower.contains("dns")
            || msg_lower.contains("http status")
            || msg_lower.contains("status code")
            || msg_lower.contains("network")
        {
            return MediaLoadError::Network(msg.to_string());
        }

        if msg_lower.contains("decod")
            || msg_lower.contains("unsupported")
            || msg_lower.contains("corrupt")
            || msg_lower.contains("invalid")
            || msg_lower.contains("format")
        {
            return MediaLoadError::Decode(msg.to_string());
        }

        MediaLoadError::Other(msg.to_string())
    }
}

impl fmt::Display for MediaLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaLoadError::Network(msg) => write!(f, "network error: {msg}"),
            MediaLoadError::Timeout => write!(f, "media fetch timed out"),
            MediaLoadError::Decode(msg) => write!(f, "decode error: {msg}"),
            MediaLoadError::RenderSignal(msg) => write!(f, "render-time load error: {msg}"),
            MediaLoadError::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidPosition(msg) => write!(f, "invalid playback position: {msg}"),
            Error::MediaLoad(err) => write!(f, "media load failed: {err}"),
            Error::Reporting(msg) => write!(f, "view reporting failed: {msg}"),
            Error::Config(msg) => write!(f, "configuration error: {msg}"),
            Error::Io(msg) => write!(f, "I/O error: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl From<MediaLoadError> for Error {
    fn from(err: MediaLoadError) -> Self {
        Error::MediaLoad(err)
    }
}
