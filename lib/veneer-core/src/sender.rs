//! Transport seam.
//!
//! A [`Sender`] submits a fully prepared [`Request`] and yields the raw
//! [`Response`]. It knows nothing about decorators: by the time a request
//! reaches it, authorization, user-agent and inspection have already run.
//!
//! Implement it to plug in a real network stack, or a test double that
//! records calls and returns canned responses.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::{Request, Response, Result};

/// Future returned by [`Sender::send`].
pub type SendFuture<'a> = Pin<Box<dyn Future<Output = Result<Response>> + Send + 'a>>;

/// Submits prepared requests.
///
/// Retry, pooling and timeout policies belong to the implementation.
///
/// # Example
///
/// ```ignore
/// use veneer_core::{Headers, Request, Response, SendFuture, Sender};
///
/// struct Canned;
///
/// impl Sender for Canned {
///     fn send(&self, _request: Request) -> SendFuture<'_> {
///         Box::pin(async { Ok(Response::new(200, Headers::new(), "ok")) })
///     }
/// }
/// ```
pub trait Sender: Send + Sync {
    /// Sends the request and returns the response.
    ///
    /// # Errors
    ///
    /// Returns an error if the request could not be transmitted:
    /// - Network errors
    /// - TLS errors
    /// - Timeouts
    /// - Invalid request
    fn send(&self, request: Request) -> SendFuture<'_>;
}

impl<S: Sender + ?Sized> Sender for Arc<S> {
    fn send(&self, request: Request) -> SendFuture<'_> {
        (**self).send(request)
    }
}

impl<S: Sender + ?Sized> Sender for &S {
    fn send(&self, request: Request) -> SendFuture<'_> {
        (**self).send(request)
    }
}
