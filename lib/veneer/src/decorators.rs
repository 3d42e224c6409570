//! Stock request and response decorators.

use std::sync::Arc;

use tracing::warn;

use crate::{Error, PrepareDecorator, Request, RespondDecorator, Response, names};

/// Sets a request header, replacing any previous value, then delegates.
pub fn with_header(name: impl Into<String>, value: impl Into<String>) -> PrepareDecorator {
    let name: Arc<str> = Arc::from(name.into());
    let value: Arc<str> = Arc::from(value.into());
    PrepareDecorator::before(move |request: &mut Request| {
        request.set_header(&*name, &*value);
        Ok(())
    })
}

/// Sets the `User-Agent` header.
///
/// An empty user agent leaves the request untouched.
pub fn with_user_agent(user_agent: impl Into<String>) -> PrepareDecorator {
    let user_agent = user_agent.into();
    if user_agent.is_empty() {
        return PrepareDecorator::pass_through();
    }
    with_header(names::USER_AGENT, user_agent)
}

/// Fails responses whose status is not in `expected`.
///
/// The rest of the chain runs first. On an unexpected status the body is
/// captured into [`Error::Http`] and a copy is put back on the response.
///
/// ```ignore
/// use veneer::{decorators::with_error_unless_status, respond};
///
/// respond(&mut response, &[with_error_unless_status(&[200, 204])])?;
/// ```
#[must_use]
pub fn with_error_unless_status(expected: &[u16]) -> RespondDecorator {
    let expected: Arc<[u16]> = Arc::from(expected);
    RespondDecorator::after(move |response: &mut Response| {
        let status = response.status();
        if expected.contains(&status) {
            return Ok(());
        }

        let body = response.body_mut().and_then(|body| match body.read_all() {
            Ok(bytes) => Some(bytes),
            Err(err) => {
                warn!(status, error = %err, "cannot capture error body");
                None
            }
        });
        if let Some(bytes) = &body {
            response.set_body(bytes.clone());
        }

        let message = http::StatusCode::from_u16(status)
            .ok()
            .and_then(|code| code.canonical_reason())
            .unwrap_or("unexpected status");

        Err(match body {
            Some(bytes) => Error::http_with_body(status, message, bytes),
            None => Error::http(status, message),
        })
    })
}

#[cfg(test)]
mod tests {
    use assert2::let_assert;

    use super::*;
    use crate::{Headers, Method, prepare, respond};

    fn request() -> Request {
        let url = url::Url::parse("https://api.example.com/").expect("url");
        Request::builder(Method::Get, url).build()
    }

    #[test]
    fn header_is_set() {
        let mut request = request();
        prepare(&mut request, &[with_header("x-trace", "abc")]).expect("prepare");

        assert_eq!(request.header("X-Trace"), Some("abc"));
    }

    #[test]
    fn later_header_wins() {
        let mut request = request();
        prepare(
            &mut request,
            &[with_header("X-Env", "dev"), with_header("X-Env", "prod")],
        )
        .expect("prepare");

        assert_eq!(request.header("X-Env"), Some("prod"));
        assert_eq!(request.headers().len(), 1);
    }

    #[test]
    fn user_agent_is_set() {
        let mut request = request();
        prepare(&mut request, &[with_user_agent("UA-1")]).expect("prepare");

        assert_eq!(request.header("user-agent"), Some("UA-1"));
    }

    #[test]
    fn empty_user_agent_is_skipped() {
        let mut request = request();
        prepare(&mut request, &[with_user_agent("")]).expect("prepare");

        assert!(!request.headers().contains(names::USER_AGENT));
    }

    #[test]
    fn expected_status_passes() {
        let mut response = Response::new(204, Headers::new(), "");
        respond(&mut response, &[with_error_unless_status(&[200, 204])]).expect("respond");
    }

    #[test]
    fn unexpected_status_fails_with_body() {
        let mut response = Response::new(503, Headers::new(), "try later");
        let result = respond(&mut response, &[with_error_unless_status(&[200])]);

        let_assert!(Err(Error::Http { status, message, body }) = result);
        assert_eq!(status, 503);
        assert_eq!(message, "Service Unavailable");
        assert_eq!(body.as_deref(), Some(&b"try later"[..]));

        assert_eq!(response.text().expect("text"), "try later");
    }

    #[test]
    fn unreadable_body_still_fails_with_status() {
        let mut response = Response::new(418, Headers::new(), "");
        response.body_mut().expect("body").close();

        let result = respond(&mut response, &[with_error_unless_status(&[200])]);

        let_assert!(Err(err) = result);
        assert_eq!(err.status(), Some(418));
        assert!(err.body().is_none());
        assert_eq!(err.to_string(), "HTTP error 418: I'm a teapot");
    }

    #[test]
    fn status_check_runs_after_the_rest_of_the_chain() {
        let rewrite = RespondDecorator::before(|response: &mut Response| {
            *response = Response::new(200, Headers::new(), "recovered");
            Ok(())
        });
        let mut response = Response::new(500, Headers::new(), "boom");

        respond(&mut response, &[with_error_unless_status(&[200]), rewrite]).expect("respond");
        assert_eq!(response.status(), 200);
    }
}
