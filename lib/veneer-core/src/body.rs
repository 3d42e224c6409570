//! Message bodies and body serialization utilities.
//!
//! A [`Body`] is an owned, readable, closable byte stream. It is either an
//! in-memory buffer or a boxed [`std::io::Read`] source. Bodies are consumed
//! by reading: once drained, a body yields no more bytes. Decorators that need
//! to look at the content (inspection, error capture) must put a fresh body
//! back for the next consumer.

use std::fmt;
use std::io::{self, Read};

use bytes::{Buf, Bytes};

use crate::Result;

/// Readable, closable message body.
pub struct Body {
    state: State,
}

enum State {
    Buffered(Bytes),
    Reader(Box<dyn Read + Send + Sync>),
    Closed,
}

impl Body {
    /// An empty body.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            state: State::Buffered(Bytes::new()),
        }
    }

    /// A body streamed from an arbitrary reader.
    pub fn from_reader(reader: impl Read + Send + Sync + 'static) -> Self {
        Self {
            state: State::Reader(Box::new(reader)),
        }
    }

    /// Closes the body, releasing the underlying stream.
    ///
    /// Subsequent reads fail.
    pub fn close(&mut self) {
        self.state = State::Closed;
    }

    /// Returns `true` if the body has been closed.
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        matches!(self.state, State::Closed)
    }

    /// Remaining bytes, if the body is an in-memory buffer.
    #[must_use]
    pub const fn as_bytes(&self) -> Option<&Bytes> {
        match &self.state {
            State::Buffered(bytes) => Some(bytes),
            State::Reader(_) | State::Closed => None,
        }
    }

    /// Drains the remaining content.
    ///
    /// The body is left at end-of-stream.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is closed or the underlying reader fails.
    pub fn read_all(&mut self) -> io::Result<Bytes> {
        if let State::Buffered(bytes) = &mut self.state {
            return Ok(std::mem::take(bytes));
        }
        if self.is_closed() {
            return Err(closed());
        }

        let mut buffer = Vec::new();
        self.read_to_end(&mut buffer)?;
        self.state = State::Buffered(Bytes::new());
        Ok(Bytes::from(buffer))
    }

    /// Consumes the body into its remaining content.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is closed or the underlying reader fails.
    pub fn into_bytes(mut self) -> io::Result<Bytes> {
        self.read_all()
    }
}

fn closed() -> io::Error {
    io::Error::other("body is closed")
}

impl Read for Body {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match &mut self.state {
            State::Buffered(bytes) => {
                let count = bytes.len().min(buf.len());
                let (head, _) = buf.split_at_mut(count);
                bytes.copy_to_slice(head);
                Ok(count)
            }
            State::Reader(reader) => reader.read(buf),
            State::Closed => Err(closed()),
        }
    }
}

impl Default for Body {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.state {
            State::Buffered(bytes) => f.debug_tuple("Body").field(bytes).finish(),
            State::Reader(_) => f.write_str("Body(<stream>)"),
            State::Closed => f.write_str("Body(<closed>)"),
        }
    }
}

impl From<Bytes> for Body {
    fn from(bytes: Bytes) -> Self {
        Self {
            state: State::Buffered(bytes),
        }
    }
}

impl From<Vec<u8>> for Body {
    fn from(bytes: Vec<u8>) -> Self {
        Self::from(Bytes::from(bytes))
    }
}

impl From<String> for Body {
    fn from(text: String) -> Self {
        Self::from(Bytes::from(text))
    }
}

impl From<&'static str> for Body {
    fn from(text: &'static str) -> Self {
        Self::from(Bytes::from_static(text.as_bytes()))
    }
}

// ============================================================================
// Serialization
// ============================================================================

/// Content type for request bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentType {
    /// JSON content type (`application/json`).
    Json,
    /// Plain text content type (`text/plain`).
    PlainText,
    /// Binary content type (`application/octet-stream`).
    OctetStream,
}

impl ContentType {
    /// Get the MIME type string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::PlainText => "text/plain",
            Self::OctetStream => "application/octet-stream",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Serialize a value to JSON bytes.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
///
/// # Example
///
/// ```
/// use veneer_core::to_json;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct User { name: String }
///
/// let user = User { name: "Alice".to_string() };
/// let bytes = to_json(&user).expect("serialize");
/// assert_eq!(bytes.as_ref(), br#"{"name":"Alice"}"#);
/// ```
pub fn to_json<T: serde::Serialize>(value: &T) -> Result<Bytes> {
    serde_json::to_vec(value)
        .map(Bytes::from)
        .map_err(Into::into)
}

/// Deserialize JSON bytes, reporting the path of the failing field.
///
/// # Errors
///
/// Returns [`crate::Error::JsonDeserialization`] with the JSON path on failure.
pub fn from_json<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    let deserializer = &mut serde_json::Deserializer::from_slice(bytes);
    serde_path_to_error::deserialize(deserializer).map_err(|err| {
        let path = err.path().to_string();
        crate::Error::json_deserialization(path, err.into_inner().to_string())
    })
}
