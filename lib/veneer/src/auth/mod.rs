//! Request authorization.
//!
//! An [`Authorizer`] hands the client a [`PrepareDecorator`] that stamps
//! credentials onto each outgoing request. Credential problems are reported by
//! the decorator when it runs, as [`Error::Authorization`], so they stop the
//! preparation chain like any other decorator failure and the request is never
//! sent.
//!
//! | Authorizer | Header |
//! |------------|--------|
//! | [`NullAuthorizer`] | none |
//! | [`BearerAuthorizer`] | `Authorization: Bearer <token>` |
//! | [`BasicAuthorizer`] | `Authorization: Basic <base64(user:pass)>` |
//! | [`ApiKeyAuthorizer`] | `X-API-Key: <key>` (configurable) |

mod basic;
mod bearer;

use std::fmt;
use std::sync::Arc;

pub use basic::BasicAuthorizer;
pub use bearer::BearerAuthorizer;

use crate::{Error, PrepareDecorator, Request};

/// Produces the decorator that authorizes requests.
pub trait Authorizer: Send + Sync {
    /// Returns a decorator that applies credentials to a request.
    fn with_authorization(&self) -> PrepareDecorator;
}

impl<A: Authorizer + ?Sized> Authorizer for Arc<A> {
    fn with_authorization(&self) -> PrepareDecorator {
        (**self).with_authorization()
    }
}

/// Authorizer that leaves requests untouched.
///
/// Used by [`Client`](crate::Client) when no authorizer is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullAuthorizer;

impl Authorizer for NullAuthorizer {
    fn with_authorization(&self) -> PrepareDecorator {
        PrepareDecorator::pass_through()
    }
}

/// Default header used by [`ApiKeyAuthorizer`].
pub const DEFAULT_API_KEY_HEADER: &str = "X-API-Key";

/// Authorizer that sends a static API key in a header.
#[derive(Clone)]
pub struct ApiKeyAuthorizer {
    header: Arc<str>,
    key: Arc<str>,
}

impl ApiKeyAuthorizer {
    /// Send `key` in the [`DEFAULT_API_KEY_HEADER`] header.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            header: Arc::from(DEFAULT_API_KEY_HEADER),
            key: Arc::from(key.into()),
        }
    }

    /// Send the key in another header.
    #[must_use]
    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.header = Arc::from(header.into());
        self
    }
}

impl fmt::Debug for ApiKeyAuthorizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiKeyAuthorizer")
            .field("header", &self.header)
            .field("key", &"<redacted>")
            .finish()
    }
}

impl Authorizer for ApiKeyAuthorizer {
    fn with_authorization(&self) -> PrepareDecorator {
        let header = Arc::clone(&self.header);
        let key = Arc::clone(&self.key);
        PrepareDecorator::before(move |request: &mut Request| {
            if key.trim().is_empty() {
                return Err(Error::authorization(format!("no API key for {header}")));
            }
            request.set_header(&*header, &*key);
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use assert2::let_assert;

    use super::*;
    use crate::{Method, prepare};

    pub(super) fn request() -> Request {
        let url = url::Url::parse("https://api.example.com/items").expect("url");
        Request::builder(Method::Get, url).build()
    }

    #[test]
    fn null_authorizer_is_pass_through() {
        let mut request = request();
        prepare(&mut request, &[NullAuthorizer.with_authorization()]).expect("prepare");

        assert!(request.headers().is_empty());
    }

    #[test]
    fn api_key_default_header() {
        let mut request = request();
        let authorizer = ApiKeyAuthorizer::new("secret");
        prepare(&mut request, &[authorizer.with_authorization()]).expect("prepare");

        assert_eq!(request.header("x-api-key"), Some("secret"));
    }

    #[test]
    fn api_key_custom_header() {
        let mut request = request();
        let authorizer = ApiKeyAuthorizer::new("secret").with_header("X-Token");
        prepare(&mut request, &[authorizer.with_authorization()]).expect("prepare");

        assert_eq!(request.header("X-Token"), Some("secret"));
        assert!(!request.headers().contains(DEFAULT_API_KEY_HEADER));
    }

    #[test]
    fn empty_api_key_fails_when_applied() {
        let authorizer = ApiKeyAuthorizer::new("  ");
        let decorator = authorizer.with_authorization();

        let mut request = request();
        let result = prepare(&mut request, &[decorator]);

        let_assert!(Err(Error::Authorization(message)) = result);
        assert!(message.contains("X-API-Key"));
        assert!(request.headers().is_empty());
    }

    #[test]
    fn api_key_debug_is_redacted() {
        let debug = format!("{:?}", ApiKeyAuthorizer::new("secret"));
        assert!(!debug.contains("secret"));
    }

    #[test]
    fn shared_authorizer_delegates() {
        let authorizer: Arc<dyn Authorizer> = Arc::new(ApiKeyAuthorizer::new("k"));
        let mut request = request();
        prepare(&mut request, &[authorizer.with_authorization()]).expect("prepare");

        assert_eq!(request.header("X-API-Key"), Some("k"));
    }
}
