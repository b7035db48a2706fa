use std::fmt;

/// Error type returned by this crate.
#[derive(Debug, thiserror::Error)]
pub enum ScraperError {
    /// The request could not produce a response after all attempts.
    #[error("transport error: {0}")]
    Transport(TransportError),
    /// Non-success HTTP status after all attempts, with a truncated body excerpt.
    #[error("http error {status}: {body}")]
    Http { status: u16, body: String },
    /// Invalid client options or scrape parameters.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// Response decoding error.
    #[error("decode error: {0}")]
    Decode(String),
    /// A spawned batch request panicked or was aborted.
    #[error("task error: {0}")]
    Task(String),
}

/// Coarse classification of a failed transport call.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TransportErrorKind {
    Timeout,
    Connect,
    Request,
    Body,
    Decode,
    Other,
}

impl TransportErrorKind {
    /// Short code reported in debug messages.
    pub fn code(self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::Connect => "connect",
            Self::Request => "request",
            Self::Body => "body",
            Self::Decode => "decode",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A transport call that did not complete with a response.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn is_timeout(&self) -> bool {
        self.kind == TransportErrorKind::Timeout
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            TransportErrorKind::Timeout
        } else if err.is_connect() {
            TransportErrorKind::Connect
        } else if err.is_body() {
            TransportErrorKind::Body
        } else if err.is_decode() {
            TransportErrorKind::Decode
        } else if err.is_request() {
            TransportErrorKind::Request
        } else {
            TransportErrorKind::Other
        };
        // reqwest includes the full URL in its message, api_key included.
        let message = err.without_url().to_string();
        Self { kind, message }
    }
}

/// Truncates `body` to at most `max_chars` characters on a char boundary.
pub(crate) fn truncate_body(body: &str, max_chars: usize) -> String {
    match body.char_indices().nth(max_chars) {
        Some((index, _)) => body[..index].to_owned(),
        None => body.to_owned(),
    }
}
