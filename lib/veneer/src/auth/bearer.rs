//! Bearer token authorization.
//!
//! Adds an `Authorization: Bearer <token>` header to every request. The token
//! is either fixed or pulled from a source function each time a request is
//! prepared.

use std::fmt;
use std::sync::Arc;

use crate::{Error, PrepareDecorator, Request, Result, names};

type TokenSource = Arc<dyn Fn() -> Result<String> + Send + Sync>;

/// Authorizer that adds bearer token authentication to requests.
///
/// # Example
///
/// ```ignore
/// use veneer::{BearerAuthorizer, Client};
///
/// let client = Client::builder()
///     .authorizer(BearerAuthorizer::new("my-secret-token"))
///     .build();
/// ```
#[derive(Clone)]
pub struct BearerAuthorizer {
    source: TokenSource,
}

impl BearerAuthorizer {
    /// Create a bearer authorizer with a fixed token.
    pub fn new(token: impl Into<String>) -> Self {
        let token: Arc<str> = Arc::from(token.into());
        Self {
            source: Arc::new(move || Ok(token.to_string())),
        }
    }

    /// Create a bearer authorizer that asks `source` for a token on every
    /// request.
    pub fn from_source<F>(source: F) -> Self
    where
        F: Fn() -> Result<String> + Send + Sync + 'static,
    {
        Self {
            source: Arc::new(source),
        }
    }

    fn token(source: &TokenSource) -> Result<String> {
        let token = source().map_err(|err| match err {
            Error::Authorization(_) => err,
            other => Error::authorization(format!("cannot obtain bearer token: {other}")),
        })?;

        if token.trim().is_empty() {
            return Err(Error::authorization("bearer token is empty"));
        }
        Ok(token)
    }
}

impl fmt::Debug for BearerAuthorizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BearerAuthorizer").finish_non_exhaustive()
    }
}

impl super::Authorizer for BearerAuthorizer {
    fn with_authorization(&self) -> PrepareDecorator {
        let source = Arc::clone(&self.source);
        PrepareDecorator::before(move |request: &mut Request| {
            let token = Self::token(&source)?;
            request.set_header(names::AUTHORIZATION, format!("Bearer {token}"));
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use assert2::let_assert;

    use super::*;
    use crate::auth::{Authorizer, tests::request};
    use crate::prepare;

    #[test]
    fn static_token() {
        let mut request = request();
        let decorator = BearerAuthorizer::new("test-token").with_authorization();
        prepare(&mut request, &[decorator]).expect("prepare");

        assert_eq!(request.header("authorization"), Some("Bearer test-token"));
    }

    #[test]
    fn source_is_called_per_request() {
        let calls = Arc::new(AtomicUsize::new(0));
        let authorizer = {
            let calls = Arc::clone(&calls);
            BearerAuthorizer::from_source(move || {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                Ok(format!("token-{n}"))
            })
        };
        let decorator = authorizer.with_authorization();

        let mut first = request();
        prepare(&mut first, std::slice::from_ref(&decorator)).expect("prepare");
        let mut second = request();
        prepare(&mut second, &[decorator]).expect("prepare");

        assert_eq!(first.header("Authorization"), Some("Bearer token-1"));
        assert_eq!(second.header("Authorization"), Some("Bearer token-2"));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn source_failure_is_an_authorization_error() {
        let authorizer = BearerAuthorizer::from_source(|| Err(Error::connection("refused")));

        let mut request = request();
        let result = prepare(&mut request, &[authorizer.with_authorization()]);

        let_assert!(Err(Error::Authorization(message)) = result);
        assert_eq!(
            message,
            "cannot obtain bearer token: connection error: refused"
        );
        assert!(!request.headers().contains("Authorization"));
    }

    #[test]
    fn empty_token_fails() {
        let mut request = request();
        let result = prepare(&mut request, &[BearerAuthorizer::new("").with_authorization()]);

        let_assert!(Err(Error::Authorization(_)) = result);
    }

    #[test]
    fn debug_hides_token() {
        let debug = format!("{:?}", BearerAuthorizer::new("hunter2"));
        assert!(!debug.contains("hunter2"));
    }
}
