//! Decorating HTTP client.

use std::sync::{Arc, OnceLock};
use std::time::Instant;

use tracing::{debug, warn};

use crate::{
    Authorizer, BasicAuthorizer, BearerAuthorizer, Error, HyperSender, LoggingInspector,
    NullAuthorizer, PrepareDecorator, Request, RespondDecorator, Response, Result, Sender,
    decorators, prepare,
};

/// HTTP client that prepares each request through a decorator chain before
/// handing it to a [`Sender`].
///
/// Every [`send`](Self::send) applies, in order:
/// 1. the request inspector, if configured
/// 2. the authorizer, if configured
/// 3. the `User-Agent` header, if not empty
///
/// A failing step stops the chain and the sender is never called. Responses
/// are returned as the sender produced them; apply
/// [`by_inspecting`](Self::by_inspecting) to inspect them.
///
/// Clones share configuration and the default sender.
///
/// # Example
///
/// ```ignore
/// use veneer::{BearerAuthorizer, Client, Method, Request};
///
/// let client = Client::builder()
///     .authorizer(BearerAuthorizer::new("token"))
///     .user_agent("my-app/1.0")
///     .build();
///
/// let request = Request::builder(Method::Get, "https://api.example.com/me".parse()?).build();
/// let response = client.send(request).await?;
/// ```
#[derive(Clone, Default)]
pub struct Client {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    sender: OnceLock<Arc<dyn Sender>>,
    authorizer: Option<Arc<dyn Authorizer>>,
    request_inspector: Option<PrepareDecorator>,
    response_inspector: Option<RespondDecorator>,
    user_agent: String,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("sender", &self.inner.sender.get().map(|_| "configured"))
            .field("authorizer", &self.inner.authorizer.is_some())
            .field("request_inspector", &self.inner.request_inspector.is_some())
            .field("response_inspector", &self.inner.response_inspector.is_some())
            .field("user_agent", &self.inner.user_agent)
            .finish()
    }
}

impl Client {
    /// Create a client with no authorizer, no inspectors and the default
    /// sender.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a default client that sends the given `User-Agent`.
    #[must_use]
    pub fn with_user_agent(user_agent: impl Into<String>) -> Self {
        Self::builder().user_agent(user_agent).build()
    }

    /// Create a client builder.
    #[must_use]
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// Prepare and send a request.
    ///
    /// # Errors
    ///
    /// - [`Error::Preparation`] if a decorator fails. It carries the request
    ///   with its URL and headers as they were handed in.
    /// - the sender's error, unchanged, if sending fails
    pub async fn send(&self, mut request: Request) -> Result<Response> {
        let url = request.url().clone();
        let headers = request.headers().clone();

        if let Err(err) = self.prepare(&mut request) {
            debug!(method = %request.method(), %url, error = %err, "request preparation failed");
            *request.url_mut() = url;
            *request.headers_mut() = headers;
            return Err(Error::preparation(err, request));
        }

        let method = request.method();
        debug!(%method, url = %request.url(), "sending request");
        let start = Instant::now();

        let result = self.sender().send(request).await;

        let elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
        match &result {
            Ok(response) => {
                let status = response.status();
                debug!(%method, %url, status, elapsed_ms, "request completed");
            }
            Err(err) => {
                warn!(%method, %url, error = %err, elapsed_ms, "request failed");
            }
        }

        result
    }

    /// Apply the preparation chain to a request without sending it.
    ///
    /// # Errors
    ///
    /// Returns the error of the first decorator that fails.
    pub fn prepare(&self, request: &mut Request) -> Result<()> {
        prepare(
            request,
            &[
                self.with_inspection(),
                self.with_authorization(),
                decorators::with_user_agent(self.inner.user_agent.as_str()),
            ],
        )
    }

    /// The configured request inspector, or a pass-through.
    #[must_use]
    pub fn with_inspection(&self) -> PrepareDecorator {
        self.inner
            .request_inspector
            .clone()
            .unwrap_or_else(PrepareDecorator::pass_through)
    }

    /// The configured response inspector, or a pass-through.
    #[must_use]
    pub fn by_inspecting(&self) -> RespondDecorator {
        self.inner
            .response_inspector
            .clone()
            .unwrap_or_else(RespondDecorator::pass_through)
    }

    /// The configured authorizer's decorator, or a pass-through.
    #[must_use]
    pub fn with_authorization(&self) -> PrepareDecorator {
        self.authorizer().with_authorization()
    }

    /// The configured sender, or the default [`HyperSender`], created on
    /// first use.
    #[must_use]
    pub fn sender(&self) -> Arc<dyn Sender> {
        Arc::clone(self.inner.sender.get_or_init(default_sender))
    }

    /// The configured authorizer, or [`NullAuthorizer`].
    #[must_use]
    pub fn authorizer(&self) -> Arc<dyn Authorizer> {
        self.inner
            .authorizer
            .clone()
            .unwrap_or_else(|| Arc::new(NullAuthorizer))
    }

    /// The `User-Agent` sent with every request. Empty means none.
    #[must_use]
    pub fn user_agent(&self) -> &str {
        &self.inner.user_agent
    }
}

fn default_sender() -> Arc<dyn Sender> {
    Arc::new(HyperSender::new())
}

/// Builder for [`Client`].
///
/// # Example
///
/// ```ignore
/// use veneer::{Client, HyperSender};
/// use std::time::Duration;
///
/// let client = Client::builder()
///     .sender(HyperSender::builder().timeout(Duration::from_secs(5)).build())
///     .basic_auth("user", "pass")
///     .with_logging()
///     .build();
/// ```
#[derive(Default)]
pub struct ClientBuilder {
    sender: Option<Arc<dyn Sender>>,
    authorizer: Option<Arc<dyn Authorizer>>,
    request_inspector: Option<PrepareDecorator>,
    response_inspector: Option<RespondDecorator>,
    user_agent: String,
}

impl std::fmt::Debug for ClientBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientBuilder")
            .field("sender", &self.sender.is_some())
            .field("authorizer", &self.authorizer.is_some())
            .field("request_inspector", &self.request_inspector.is_some())
            .field("response_inspector", &self.response_inspector.is_some())
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl ClientBuilder {
    /// Send through `sender` instead of the default [`HyperSender`].
    #[must_use]
    pub fn sender(mut self, sender: impl Sender + 'static) -> Self {
        self.sender = Some(Arc::new(sender));
        self
    }

    /// Authorize requests with `authorizer`.
    #[must_use]
    pub fn authorizer(mut self, authorizer: impl Authorizer + 'static) -> Self {
        self.authorizer = Some(Arc::new(authorizer));
        self
    }

    /// Authorize requests with a bearer token.
    #[must_use]
    pub fn bearer_auth(self, token: impl Into<String>) -> Self {
        self.authorizer(BearerAuthorizer::new(token))
    }

    /// Authorize requests with basic authentication.
    #[must_use]
    pub fn basic_auth(self, username: impl AsRef<str>, password: impl AsRef<str>) -> Self {
        self.authorizer(BasicAuthorizer::new(username, password))
    }

    /// Decorator applied first to every request.
    #[must_use]
    pub fn request_inspector(mut self, inspector: PrepareDecorator) -> Self {
        self.request_inspector = Some(inspector);
        self
    }

    /// Decorator returned by [`Client::by_inspecting`].
    #[must_use]
    pub fn response_inspector(mut self, inspector: RespondDecorator) -> Self {
        self.response_inspector = Some(inspector);
        self
    }

    /// Inspect requests and responses with a [`LoggingInspector`] writing to
    /// `tracing`.
    #[must_use]
    pub fn with_logging(self) -> Self {
        let inspector = LoggingInspector::new();
        self.request_inspector(inspector.with_inspection())
            .response_inspector(inspector.by_inspecting())
    }

    /// Set the `User-Agent` header.
    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Build the client.
    #[must_use]
    pub fn build(self) -> Client {
        Client {
            inner: Arc::new(Inner {
                sender: self.sender.map_or_else(OnceLock::new, OnceLock::from),
                authorizer: self.authorizer,
                request_inspector: self.request_inspector,
                response_inspector: self.response_inspector,
                user_agent: self.user_agent,
            }),
        }
    }
}
