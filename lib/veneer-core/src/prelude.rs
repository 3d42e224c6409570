//! Prelude module for convenient imports.
//!
//! ```ignore
//! use veneer_core::prelude::*;
//! ```

pub use crate::{
    Body, Error, Headers, Method, PrepareDecorator, Request, RequestBuilder, RespondDecorator,
    Response, Result, SendFuture, Sender, Step, prepare, respond,
};
