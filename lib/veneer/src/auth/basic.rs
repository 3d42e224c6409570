//! Basic authentication.
//!
//! Adds an `Authorization: Basic <base64(user:pass)>` header to every request.

use std::fmt;
use std::sync::Arc;

use base64::Engine;

use crate::{Error, PrepareDecorator, Request, names};

/// Authorizer that adds basic authentication to requests.
///
/// # Example
///
/// ```ignore
/// use veneer::{BasicAuthorizer, Client};
///
/// let client = Client::builder()
///     .authorizer(BasicAuthorizer::new("username", "password"))
///     .build();
/// ```
#[derive(Clone)]
pub struct BasicAuthorizer {
    /// Base64-encoded "username:password", absent without a username.
    encoded_credentials: Option<Arc<str>>,
}

impl BasicAuthorizer {
    /// Create a basic authorizer with the given username and password.
    pub fn new(username: impl AsRef<str>, password: impl AsRef<str>) -> Self {
        let username = username.as_ref();
        let encoded_credentials = (!username.is_empty()).then(|| {
            let credentials = format!("{username}:{}", password.as_ref());
            Arc::from(base64::engine::general_purpose::STANDARD.encode(credentials))
        });
        Self {
            encoded_credentials,
        }
    }
}

impl fmt::Debug for BasicAuthorizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicAuthorizer").finish_non_exhaustive()
    }
}

impl super::Authorizer for BasicAuthorizer {
    fn with_authorization(&self) -> PrepareDecorator {
        let encoded = self.encoded_credentials.clone();
        PrepareDecorator::before(move |request: &mut Request| {
            let encoded = encoded
                .as_deref()
                .ok_or_else(|| Error::authorization("basic auth requires a username"))?;
            request.set_header(names::AUTHORIZATION, format!("Basic {encoded}"));
            Ok(())
        })
    }
}
