//! HTTP response handling.
//!
//! [`Response`] gives access to status, headers, and an optional [`Body`]
//! stream. The body is consumed by reading it; [`Response::bytes`],
//! [`Response::json`] and [`Response::text`] drain it.
//!
//! # Example
//!
//! ```ignore
//! let user: User = response.json()?;
//! ```

use bytes::Bytes;

use crate::{Body, Headers};

/// Inbound HTTP response with status, headers, and optional body.
#[derive(Debug)]
pub struct Response {
    status: u16,
    headers: Headers,
    body: Option<Body>,
}

impl Response {
    /// Creates a new response.
    #[must_use]
    pub fn new(status: u16, headers: Headers, body: impl Into<Body>) -> Self {
        Self {
            status,
            headers,
            body: Some(body.into()),
        }
    }

    /// Creates a response without a body.
    #[must_use]
    pub const fn without_body(status: u16, headers: Headers) -> Self {
        Self {
            status,
            headers,
            body: None,
        }
    }

    /// HTTP status code.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status
    }

    /// Response headers.
    #[must_use]
    pub const fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Mutable access to headers.
    pub const fn headers_mut(&mut self) -> &mut Headers {
        &mut self.headers
    }

    /// Single header value by name (case-insensitive).
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    /// Response body.
    #[must_use]
    pub const fn body(&self) -> Option<&Body> {
        self.body.as_ref()
    }

    /// Mutable access to the body.
    pub const fn body_mut(&mut self) -> Option<&mut Body> {
        self.body.as_mut()
    }

    /// Removes and returns the body.
    pub const fn take_body(&mut self) -> Option<Body> {
        self.body.take()
    }

    /// Replaces the body.
    pub fn set_body(&mut self, body: impl Into<Body>) {
        self.body = Some(body.into());
    }

    /// Consume into (status, headers, body).
    #[must_use]
    pub fn into_parts(self) -> (u16, Headers, Option<Body>) {
        (self.status, self.headers, self.body)
    }

    /// Status is 2xx.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Status is 3xx.
    #[must_use]
    pub const fn is_redirection(&self) -> bool {
        self.status >= 300 && self.status < 400
    }

    /// Status is 4xx.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        self.status >= 400 && self.status < 500
    }

    /// Status is 5xx.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        self.status >= 500 && self.status < 600
    }

    /// Drain the body into bytes. A missing body yields no bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is closed or cannot be read.
    pub fn bytes(self) -> crate::Result<Bytes> {
        match self.body {
            Some(body) => Ok(body.into_bytes()?),
            None => Ok(Bytes::new()),
        }
    }

    /// Deserialize the response body as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if reading or deserialization fails.
    pub fn json<T: serde::de::DeserializeOwned>(self) -> crate::Result<T> {
        crate::from_json(&self.bytes()?)
    }

    /// Get the response body as text.
    ///
    /// # Errors
    ///
    /// Returns an error if reading fails or the body is not valid UTF-8.
    pub fn text(self) -> crate::Result<String> {
        let bytes = self.bytes()?;
        String::from_utf8(bytes.to_vec())
            .map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidData, err).into())
    }
}
