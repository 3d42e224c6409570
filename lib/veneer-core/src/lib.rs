//! Core types and traits for the veneer HTTP request pipeline.
//!
//! This crate provides the transport-independent building blocks:
//! - [`Method`], [`Headers`] and [`Body`] - message parts
//! - [`Request`] and [`RequestBuilder`] - outbound requests
//! - [`Response`] - inbound responses
//! - [`Step`], [`Decorator`], [`prepare`] and [`respond`] - decorator chains
//! - [`Sender`] - the transport seam
//! - [`Error`] and [`Result`] - error handling

mod body;
pub mod decorator;
mod error;
pub mod headers;
mod method;
pub mod prelude;
mod request;
mod response;
mod sender;

pub use body::{Body, ContentType, from_json, to_json};
pub use decorator::{
    BoxStep, Decorator, PrepareDecorator, Preparer, RespondDecorator, Responder, Step, chain,
    pass_through, prepare, respond,
};
pub use error::{Error, Result};
pub use headers::{Headers, names};
pub use method::Method;
pub use request::{Request, RequestBuilder};
pub use response::Response;
pub use sender::{SendFuture, Sender};
