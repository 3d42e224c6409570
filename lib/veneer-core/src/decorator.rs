//! Decorator chains for requests and responses.
//!
//! A [`Step`] transforms a message in place. A [`Decorator`] is a Tower
//! [`Layer`] that wraps the next step with its own behavior, so decorators
//! compose exactly like middleware layers: the first decorator in a list is
//! the outermost one and runs first.
//!
//! A step that fails returns its error instead of delegating, which stops the
//! chain. Nothing after it runs and the error reaches the caller unchanged.
//!
//! # Example
//!
//! ```
//! use veneer_core::{Method, PrepareDecorator, Request, prepare};
//!
//! let tag = PrepareDecorator::before(|request: &mut Request| {
//!     request.set_header("X-Request-Id", "42");
//!     Ok(())
//! });
//!
//! let mut request = Request::builder(Method::Get, "https://example.com".parse().unwrap()).build();
//! prepare(&mut request, &[tag]).expect("prepare");
//!
//! assert_eq!(request.header("x-request-id"), Some("42"));
//! ```

use std::fmt;
use std::sync::Arc;

use tower::Layer;

use crate::{Request, Response, Result};

/// One transformation step applied to a message.
///
/// Implemented for every `Fn(&mut M) -> Result<()>` closure.
pub trait Step<M>: Send + Sync {
    /// Applies the step to the message.
    ///
    /// # Errors
    ///
    /// Returns the error that stops the chain.
    fn apply(&self, message: &mut M) -> Result<()>;
}

impl<M, F> Step<M> for F
where
    F: Fn(&mut M) -> Result<()> + Send + Sync,
{
    fn apply(&self, message: &mut M) -> Result<()> {
        self(message)
    }
}

/// Shared, type-erased step.
pub type BoxStep<M> = Arc<dyn Step<M>>;

/// Step over outgoing requests.
pub type Preparer = BoxStep<Request>;

/// Step over incoming responses.
pub type Responder = BoxStep<Response>;

/// Decorator over request steps.
pub type PrepareDecorator = Decorator<Request>;

/// Decorator over response steps.
pub type RespondDecorator = Decorator<Response>;

type BoxLayer<M> = Arc<dyn Layer<BoxStep<M>, Service = BoxStep<M>> + Send + Sync>;

/// Wraps a step with additional behavior.
pub struct Decorator<M> {
    layer: BoxLayer<M>,
}

impl<M: 'static> Decorator<M> {
    /// Creates a decorator from any Tower layer over boxed steps.
    pub fn new<L>(layer: L) -> Self
    where
        L: Layer<BoxStep<M>, Service = BoxStep<M>> + Send + Sync + 'static,
    {
        Self {
            layer: Arc::new(layer),
        }
    }

    /// Creates a decorator from a function of the next step.
    pub fn from_fn<F>(decorate: F) -> Self
    where
        F: Fn(BoxStep<M>) -> BoxStep<M> + Send + Sync + 'static,
    {
        Self::new(tower::layer::layer_fn(decorate))
    }

    /// Runs `step`, then delegates to the next step unless `step` failed.
    pub fn before<F>(step: F) -> Self
    where
        F: Fn(&mut M) -> Result<()> + Send + Sync + 'static,
    {
        let step = Arc::new(step);
        Self::from_fn(move |next: BoxStep<M>| {
            let step = Arc::clone(&step);
            Arc::new(move |message: &mut M| {
                step(message)?;
                next.apply(message)
            }) as BoxStep<M>
        })
    }

    /// Delegates to the next step, then runs `step` if the rest of the
    /// chain succeeded.
    pub fn after<F>(step: F) -> Self
    where
        F: Fn(&mut M) -> Result<()> + Send + Sync + 'static,
    {
        let step = Arc::new(step);
        Self::from_fn(move |next: BoxStep<M>| {
            let step = Arc::clone(&step);
            Arc::new(move |message: &mut M| {
                next.apply(message)?;
                step(message)
            }) as BoxStep<M>
        })
    }

    /// A decorator that adds nothing.
    #[must_use]
    pub fn pass_through() -> Self {
        Self::from_fn(|next| next)
    }

    /// Wraps `next` with this decorator.
    #[must_use]
    pub fn decorate(&self, next: BoxStep<M>) -> BoxStep<M> {
        self.layer.layer(next)
    }
}

impl<M> Clone for Decorator<M> {
    fn clone(&self) -> Self {
        Self {
            layer: Arc::clone(&self.layer),
        }
    }
}

impl<M> fmt::Debug for Decorator<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Decorator").finish_non_exhaustive()
    }
}

impl<M> Layer<BoxStep<M>> for Decorator<M> {
    type Service = BoxStep<M>;

    fn layer(&self, inner: BoxStep<M>) -> Self::Service {
        self.layer.layer(inner)
    }
}

/// The base step: leaves the message untouched and succeeds.
#[must_use]
pub fn pass_through<M: 'static>() -> BoxStep<M> {
    Arc::new(|_: &mut M| Ok(()))
}

/// Folds decorators around `base`: `d1(d2(..dn(base)))`.
#[must_use]
pub fn chain<M: 'static>(base: BoxStep<M>, decorators: &[Decorator<M>]) -> BoxStep<M> {
    decorators
        .iter()
        .rev()
        .fold(base, |next, decorator| decorator.decorate(next))
}

/// Applies request decorators in order.
///
/// # Errors
///
/// Returns the error of the first decorator that fails.
pub fn prepare(request: &mut Request, decorators: &[PrepareDecorator]) -> Result<()> {
    chain(pass_through(), decorators).apply(request)
}

/// Applies response decorators in order.
///
/// # Errors
///
/// Returns the error of the first decorator that fails.
pub fn respond(response: &mut Response, decorators: &[RespondDecorator]) -> Result<()> {
    chain(pass_through(), decorators).apply(response)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use assert2::let_assert;

    use super::*;
    use crate::{Error, Headers, Method};

    type Journal = Arc<Mutex<Vec<&'static str>>>;

    fn request() -> Request {
        let url = url::Url::parse("https://api.example.com/items").expect("valid URL");
        Request::builder(Method::Post, url)
            .header("Accept", "text/plain")
            .body("payload")
            .build()
    }

    fn record(journal: &Journal, name: &'static str) -> PrepareDecorator {
        let journal = Arc::clone(journal);
        PrepareDecorator::before(move |_| {
            journal.lock().expect("journal lock").push(name);
            Ok(())
        })
    }

    fn fail(journal: &Journal, name: &'static str) -> PrepareDecorator {
        let journal = Arc::clone(journal);
        PrepareDecorator::before(move |_| {
            journal.lock().expect("journal lock").push(name);
            Err(Error::invalid_request(name))
        })
    }

    fn entries(journal: &Journal) -> Vec<&'static str> {
        journal.lock().expect("journal lock").clone()
    }

    #[test]
    fn empty_chain_is_pass_through() {
        let mut request = request();
        prepare(&mut request, &[]).expect("prepare");

        assert_eq!(request.method(), Method::Post);
        assert_eq!(request.header("accept"), Some("text/plain"));
        assert_eq!(request.headers().len(), 1);
        let body = request.take_body().expect("body").into_bytes().expect("bytes");
        assert_eq!(body.as_ref(), b"payload");
    }

    #[test]
    fn first_decorator_runs_first() {
        let journal = Journal::default();
        let decorators = [
            record(&journal, "one"),
            record(&journal, "two"),
            record(&journal, "three"),
        ];

        prepare(&mut request(), &decorators).expect("prepare");
        assert_eq!(entries(&journal), vec!["one", "two", "three"]);
    }

    #[test]
    fn reordering_changes_side_effect_order() {
        let journal = Journal::default();
        prepare(
            &mut request(),
            &[record(&journal, "b"), record(&journal, "a")],
        )
        .expect("prepare");

        assert_eq!(entries(&journal), vec!["b", "a"]);
    }

    #[test]
    fn failing_decorator_stops_the_chain() {
        for failing in 0..3 {
            let journal = Journal::default();
            let names = ["first", "second", "third"];
            let decorators: Vec<_> = names
                .iter()
                .enumerate()
                .map(|(index, &name)| {
                    if index == failing {
                        fail(&journal, name)
                    } else {
                        record(&journal, name)
                    }
                })
                .collect();

            let result = prepare(&mut request(), &decorators);

            let_assert!(Err(Error::InvalidRequest(message)) = result);
            assert_eq!(message, names.get(failing).copied().expect("name"));
            assert_eq!(
                entries(&journal),
                names.get(..=failing).expect("prefix").to_vec()
            );
        }
    }

    #[test]
    fn later_values_overwrite_earlier_ones() {
        let first = PrepareDecorator::before(|request: &mut Request| {
            request.set_header("X-Tag", "first");
            Ok(())
        });
        let second = PrepareDecorator::before(|request: &mut Request| {
            request.set_header("x-tag", "second");
            Ok(())
        });

        let mut request = request();
        prepare(&mut request, &[first.clone(), second.clone()]).expect("prepare");
        assert_eq!(request.header("X-Tag"), Some("second"));

        let mut request = self::request();
        prepare(&mut request, &[second, first]).expect("prepare");
        assert_eq!(request.header("X-Tag"), Some("first"));
    }

    #[test]
    fn after_runs_once_inner_steps_succeed() {
        let journal = Journal::default();
        let after = {
            let journal = Arc::clone(&journal);
            PrepareDecorator::after(move |_| {
                journal.lock().expect("journal lock").push("after");
                Ok(())
            })
        };

        prepare(&mut request(), &[after.clone(), record(&journal, "inner")]).expect("prepare");
        assert_eq!(entries(&journal), vec!["inner", "after"]);

        let journal_on_failure = Journal::default();
        let result = prepare(&mut request(), &[after, fail(&journal_on_failure, "inner")]);
        assert!(result.is_err());
        assert_eq!(entries(&journal), vec!["inner", "after"]);
    }

    #[test]
    fn pass_through_decorator_keeps_order() {
        let journal = Journal::default();
        let decorators = [
            record(&journal, "one"),
            PrepareDecorator::pass_through(),
            record(&journal, "two"),
        ];

        prepare(&mut request(), &decorators).expect("prepare");
        assert_eq!(entries(&journal), vec!["one", "two"]);
    }

    #[test]
    fn custom_layer_is_a_decorator() {
        struct Uppercase;

        impl Layer<Responder> for Uppercase {
            type Service = Responder;

            fn layer(&self, inner: Responder) -> Responder {
                Arc::new(move |response: &mut Response| {
                    if let Some(body) = response.take_body() {
                        let text = body.into_bytes()?;
                        response.set_body(text.to_ascii_uppercase());
                    }
                    inner.apply(response)
                })
            }
        }

        let mut response = Response::new(200, Headers::new(), "quiet");
        respond(&mut response, &[RespondDecorator::new(Uppercase)]).expect("respond");

        assert_eq!(response.text().expect("text"), "QUIET");
    }
}
