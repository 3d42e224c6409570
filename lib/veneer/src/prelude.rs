//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types and functions for
//! glob importing:
//!
//! ```ignore
//! use veneer::prelude::*;
//! ```

pub use crate::{
    Authorizer, BearerAuthorizer, Body, Client, Error, Headers, HyperSender, LoggingInspector,
    Method, PrepareDecorator, Request, RespondDecorator, Response, Result, Sender, prepare,
    respond,
};
