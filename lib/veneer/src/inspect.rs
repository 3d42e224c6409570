//! Request/response logging inspector.
//!
//! The [`LoggingInspector`] produces decorators that write one entry per
//! message to a [`LogSink`]: a start line, the headers, a blank line and the
//! body. Inspecting a body consumes it, so the inspector buffers the content
//! and puts a fresh body back before delegating. Read failures are logged and
//! never stop the chain.
//!
//! ```text
//! REQUEST: POST https://api.example.com/items
//! Content-Type: application/json
//!
//! {"name":"widget"}
//! ```

use std::fmt;
use std::io::{self, Read, Write};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{info, warn};

use crate::{Body, Headers, PrepareDecorator, Request, RespondDecorator, Response};

/// Receives formatted log entries.
pub trait LogSink: Send + Sync {
    /// Records one entry.
    fn log(&self, entry: &str);
}

impl<F> LogSink for F
where
    F: Fn(&str) + Send + Sync,
{
    fn log(&self, entry: &str) {
        self(entry);
    }
}

/// Sink that emits entries as `tracing` events under the `veneer::inspect`
/// target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn log(&self, entry: &str) {
        info!(target: "veneer::inspect", "{entry}");
    }
}

/// Sink that writes each entry, followed by a newline, to a writer.
#[derive(Debug, Default)]
pub struct WriterSink<W> {
    writer: Mutex<W>,
}

impl<W: Write + Send> WriterSink<W> {
    /// Wrap a writer.
    pub const fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Recover the writer.
    pub fn into_inner(self) -> W {
        self.writer
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl<W: Write + Send> LogSink for WriterSink<W> {
    fn log(&self, entry: &str) {
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(err) = writeln!(writer, "{entry}").and_then(|()| writer.flush()) {
            warn!(error = %err, "cannot write inspection entry");
        }
    }
}

/// Logs requests and responses, keeping their bodies intact.
///
/// # Example
///
/// ```ignore
/// use veneer::{Client, LoggingInspector};
///
/// let inspector = LoggingInspector::new();
/// let client = Client::builder()
///     .request_inspector(inspector.with_inspection())
///     .response_inspector(inspector.by_inspecting())
///     .build();
/// ```
#[derive(Clone)]
pub struct LoggingInspector {
    sink: Arc<dyn LogSink>,
}

impl LoggingInspector {
    /// Inspector writing to a [`TracingSink`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_sink(TracingSink)
    }

    /// Inspector writing to `sink`.
    pub fn with_sink(sink: impl LogSink + 'static) -> Self {
        Self {
            sink: Arc::new(sink),
        }
    }

    /// Request decorator that logs the request, then delegates.
    #[must_use]
    pub fn with_inspection(&self) -> PrepareDecorator {
        let sink = Arc::clone(&self.sink);
        PrepareDecorator::before(move |request: &mut Request| {
            let captured = Captured::take(request.body_mut());
            let start = format!("REQUEST: {} {}", request.method(), request.url());
            sink.log(&Entry::new(&start, request.headers(), captured.as_ref()).to_string());

            if let Some(captured) = captured {
                request.set_body(captured.into_body());
            }
            Ok(())
        })
    }

    /// Response decorator that logs the response, then delegates.
    #[must_use]
    pub fn by_inspecting(&self) -> RespondDecorator {
        let sink = Arc::clone(&self.sink);
        RespondDecorator::before(move |response: &mut Response| {
            let captured = Captured::take(response.body_mut());
            let start = format!("RESPONSE: {}", response.status());
            sink.log(&Entry::new(&start, response.headers(), captured.as_ref()).to_string());

            if let Some(captured) = captured {
                response.set_body(captured.into_body());
            }
            Ok(())
        })
    }
}

impl Default for LoggingInspector {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for LoggingInspector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggingInspector").finish_non_exhaustive()
    }
}

/// Body content drained for inspection.
struct Captured {
    bytes: Vec<u8>,
    error: Option<io::Error>,
}

impl Captured {
    /// Drains `body`, keeping whatever was read before a failure.
    fn take(body: Option<&mut Body>) -> Option<Self> {
        let body = body?;
        let mut bytes = Vec::new();
        let error = body.read_to_end(&mut bytes).err();
        if let Some(err) = &error {
            warn!(error = %err, read = bytes.len(), "cannot read body for inspection");
        }
        Some(Self { bytes, error })
    }

    fn into_body(self) -> Body {
        Body::from(self.bytes)
    }
}

struct Entry<'a> {
    start: &'a str,
    headers: &'a Headers,
    body: Option<&'a Captured>,
}

impl<'a> Entry<'a> {
    const fn new(start: &'a str, headers: &'a Headers, body: Option<&'a Captured>) -> Self {
        Self {
            start,
            headers,
            body,
        }
    }
}

impl fmt::Display for Entry<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.start)?;
        for (name, value) in self.headers {
            writeln!(f, "{name}: {value}")?;
        }
        writeln!(f)?;

        match self.body {
            Some(Captured {
                error: Some(err), ..
            }) => write!(f, "<body unavailable: {err}>"),
            Some(Captured { bytes, error: None }) => {
                write!(f, "{}", String::from_utf8_lossy(bytes))
            }
            None => Ok(()),
        }
    }
}
