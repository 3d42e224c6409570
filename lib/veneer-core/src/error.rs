//! Error types for veneer.
//!
//! Errors fall into four groups:
//! - preparation failures ([`Error::Preparation`]), raised when a request
//!   decorator fails before anything is sent. [`Error::Authorization`] is the
//!   most common source.
//! - transport failures ([`Error::Connection`], [`Error::Tls`],
//!   [`Error::Timeout`]), raised by a [`Sender`](crate::Sender)
//! - response failures ([`Error::Http`]), raised by response decorators
//! - payload failures (JSON, body I/O)

use derive_more::{Display, Error, From};

use crate::Request;

/// Main error type for veneer operations.
#[derive(Debug, Display, Error, From)]
pub enum Error {
    /// HTTP-level errors (unexpected status codes).
    #[display("HTTP error {status}: {message}")]
    #[from(skip)]
    Http {
        /// HTTP status code.
        status: u16,
        /// Error message.
        message: String,
        /// Response body, if available.
        #[error(not(source))]
        body: Option<bytes::Bytes>,
    },

    /// Network/connection errors.
    #[display("connection error: {_0}")]
    #[from(skip)]
    Connection(#[error(not(source))] String),

    /// TLS/SSL errors.
    #[display("TLS error: {_0}")]
    #[from(skip)]
    Tls(#[error(not(source))] String),

    /// Request timeout.
    #[display("request timeout")]
    #[from(skip)]
    Timeout,

    /// Invalid request configuration.
    #[display("invalid request: {_0}")]
    #[from(skip)]
    InvalidRequest(#[error(not(source))] String),

    /// Credentials could not be obtained or applied.
    #[display("authorization failed: {_0}")]
    #[from(skip)]
    Authorization(#[error(not(source))] String),

    /// A request decorator failed; the request was not sent.
    #[display("request preparation failed: {source}")]
    #[from(skip)]
    Preparation {
        /// The error raised by the failing decorator.
        source: Box<Error>,
        /// The request as handed to the client.
        #[error(not(source))]
        request: Box<Request>,
    },

    /// Body read/write failure.
    #[display("body error: {_0}")]
    #[from]
    Body(std::io::Error),

    /// JSON serialization error.
    #[display("JSON serialization error: {_0}")]
    #[from]
    JsonSerialization(serde_json::Error),

    /// JSON deserialization error with path context.
    #[display("JSON deserialization error at '{path}': {message}")]
    #[from(skip)]
    JsonDeserialization {
        /// JSON path to the error (e.g., "user.address.city").
        path: String,
        /// Error message.
        message: String,
    },

    /// URL parsing error.
    #[display("invalid URL: {_0}")]
    #[from]
    InvalidUrl(url::ParseError),
}

/// Result type alias using [`crate::Error`].
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create an HTTP error from status code and message.
    #[must_use]
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
            body: None,
        }
    }

    /// Create an HTTP error with body.
    #[must_use]
    pub fn http_with_body(status: u16, message: impl Into<String>, body: bytes::Bytes) -> Self {
        Self::Http {
            status,
            message: message.into(),
            body: Some(body),
        }
    }

    /// Create a connection error.
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection(message.into())
    }

    /// Create a TLS error.
    #[must_use]
    pub fn tls(message: impl Into<String>) -> Self {
        Self::Tls(message.into())
    }

    /// Create an invalid request error.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// Create an authorization error.
    #[must_use]
    pub fn authorization(message: impl Into<String>) -> Self {
        Self::Authorization(message.into())
    }

    /// Wrap a decorator failure together with the unsent request.
    #[must_use]
    pub fn preparation(source: Self, request: Request) -> Self {
        Self::Preparation {
            source: Box::new(source),
            request: Box::new(request),
        }
    }

    /// Create a JSON deserialization error with path context.
    #[must_use]
    pub fn json_deserialization(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::JsonDeserialization {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Returns `true` if this is a timeout error.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout)
    }

    /// Returns `true` if this is a connection error.
    #[must_use]
    pub const fn is_connection(&self) -> bool {
        matches!(self, Self::Connection(_))
    }

    /// Returns `true` if the request never left the client.
    #[must_use]
    pub const fn is_preparation(&self) -> bool {
        matches!(self, Self::Preparation { .. })
    }

    /// Returns `true` if credentials could not be applied, directly or as
    /// the cause of a preparation failure.
    #[must_use]
    pub fn is_authorization(&self) -> bool {
        match self {
            Self::Authorization(_) => true,
            Self::Preparation { source, .. } => source.is_authorization(),
            _ => false,
        }
    }

    /// Returns the HTTP status code if this is an HTTP error.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns the response body if this is an HTTP error with a body.
    #[must_use]
    pub fn body(&self) -> Option<&bytes::Bytes> {
        match self {
            Self::Http { body, .. } => body.as_ref(),
            _ => None,
        }
    }

    /// Recover the unsent request from a preparation failure.
    #[must_use]
    pub fn into_request(self) -> Option<Request> {
        match self {
            Self::Preparation { request, .. } => Some(*request),
            _ => None,
        }
    }

    /// Try to decode the HTTP error body as JSON.
    ///
    /// Returns `None` if there is no body or this is not an HTTP error.
    pub fn decode_body<T: serde::de::DeserializeOwned>(&self) -> Option<Result<T>> {
        self.body().map(|body| crate::from_json(body))
    }
}
