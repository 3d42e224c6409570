//! Composable request/response decorators for outbound HTTP API clients.
//!
//! A [`Client`] runs every outgoing request through a chain of decorators
//! (inspection, authorization, user agent) and hands the result to a
//! [`Sender`]. Decorators are Tower layers over synchronous steps, so the
//! first one listed wraps the rest and any of them can stop the chain by
//! returning an error.
//!
//! # Example
//!
//! ```ignore
//! use veneer::prelude::*;
//! use veneer::decorators::with_error_unless_status;
//!
//! let inspector = LoggingInspector::new();
//! let client = Client::builder()
//!     .bearer_auth("token")
//!     .user_agent("my-app/1.0")
//!     .request_inspector(inspector.with_inspection())
//!     .response_inspector(inspector.by_inspecting())
//!     .build();
//!
//! let request = Request::builder(Method::Get, "https://api.example.com/users/42".parse()?).build();
//! let mut response = client.send(request).await?;
//! respond(&mut response, &[client.by_inspecting(), with_error_unless_status(&[200])])?;
//!
//! let user: User = response.json()?;
//! ```

pub mod auth;
mod client;
mod connector;
pub mod decorators;
pub mod inspect;
pub mod prelude;
mod transport;

pub use auth::{
    ApiKeyAuthorizer, Authorizer, BasicAuthorizer, BearerAuthorizer, DEFAULT_API_KEY_HEADER,
    NullAuthorizer,
};
pub use client::{Client, ClientBuilder};
pub use inspect::{LogSink, LoggingInspector, TracingSink, WriterSink};
pub use transport::{HyperSender, HyperSenderBuilder, SenderConfig};

// Re-export tower for custom decorator layers
pub use tower;

// Re-export core types
pub use veneer_core::{
    Body, BoxStep, ContentType, Decorator, Error, Headers, Method, PrepareDecorator, Preparer,
    Request, RequestBuilder, RespondDecorator, Responder, Response, Result, SendFuture, Sender,
    Step, chain, from_json, names, pass_through, prepare, respond, to_json,
};

pub use url;
