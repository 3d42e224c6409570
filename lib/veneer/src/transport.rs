//! Default network sender built on hyper-util.

use std::time::{Duration, Instant};

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper_rustls::HttpsConnector;
use hyper_util::{
    client::legacy::{Client, connect::HttpConnector},
    rt::TokioExecutor,
};
use tracing::debug;

use crate::{
    Error, Headers, Request, Response, Result, SendFuture, Sender, connector::https_connector,
};

/// Settings of a [`HyperSender`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SenderConfig {
    /// Deadline for one exchange: connecting, sending the request and
    /// collecting the whole response body.
    pub timeout: Duration,
    /// Deadline for establishing a connection. Capped by `timeout`.
    pub connect_timeout: Duration,
    /// Maximum idle connections kept per host.
    pub pool_idle_per_host: usize,
    /// How long an idle connection stays in the pool.
    pub pool_idle_timeout: Duration,
}

impl SenderConfig {
    /// The connect deadline actually applied: never longer than the exchange
    /// deadline.
    #[must_use]
    pub fn effective_connect_timeout(&self) -> Duration {
        self.connect_timeout.min(self.timeout)
    }
}

impl Default for SenderConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            pool_idle_per_host: 32,
            pool_idle_timeout: Duration::from_secs(90),
        }
    }
}

/// Network [`Sender`] with connection pooling and rustls TLS.
///
/// Request bodies are drained into memory before dispatch and response
/// bodies are fully collected, so the returned [`Response`] carries an
/// in-memory body.
///
/// # Example
///
/// ```ignore
/// use std::time::Duration;
/// use veneer::HyperSender;
///
/// let sender = HyperSender::builder()
///     .timeout(Duration::from_secs(5))
///     .pool_idle_per_host(4)
///     .build();
/// ```
#[derive(Clone)]
pub struct HyperSender {
    inner: Client<HttpsConnector<HttpConnector>, Full<Bytes>>,
    config: SenderConfig,
}

impl std::fmt::Debug for HyperSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HyperSender")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl HyperSender {
    /// Create a sender with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(SenderConfig::default())
    }

    /// Create a sender with custom configuration.
    #[must_use]
    pub fn with_config(config: SenderConfig) -> Self {
        let connector = https_connector(config.effective_connect_timeout());

        let inner = Client::builder(TokioExecutor::new())
            .pool_idle_timeout(config.pool_idle_timeout)
            .pool_max_idle_per_host(config.pool_idle_per_host)
            .build(connector);

        Self { inner, config }
    }

    /// Start building a sender.
    #[must_use]
    pub fn builder() -> HyperSenderBuilder {
        HyperSenderBuilder::default()
    }

    /// Get the sender configuration.
    #[must_use]
    pub const fn config(&self) -> &SenderConfig {
        &self.config
    }

    /// Build a hyper request, draining the body into memory.
    fn build_hyper_request(request: Request) -> Result<http::Request<Full<Bytes>>> {
        let (method, url, headers, body) = request.into_parts();

        let mut builder = http::Request::builder()
            .method(http::Method::from(method))
            .uri(url.as_str());

        for (name, value) in &headers {
            builder = builder.header(name, value);
        }

        let body = match body {
            Some(body) => Full::new(body.into_bytes()?),
            None => Full::default(),
        };

        builder
            .body(body)
            .map_err(|e| Error::invalid_request(e.to_string()))
    }

    /// Extract response headers. Repeated headers keep their last value.
    fn extract_headers(headers: &http::HeaderMap) -> Headers {
        headers
            .iter()
            .filter_map(|(name, value)| value.to_str().ok().map(|v| (name.as_str(), v)))
            .collect()
    }

    async fn execute(&self, request: Request) -> Result<Response> {
        let method = request.method();
        let url = request.url().to_string();
        let hyper_request = Self::build_hyper_request(request)?;
        let start = Instant::now();

        let response = tokio::time::timeout(self.config.timeout, self.exchange(hyper_request))
            .await
            .map_err(|_| Error::Timeout)??;

        let elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
        debug!(%method, %url, status = response.status(), elapsed_ms, "response received");

        Ok(response)
    }

    /// Dispatches the request and collects the whole response body.
    async fn exchange(&self, hyper_request: http::Request<Full<Bytes>>) -> Result<Response> {
        let response = self
            .inner
            .request(hyper_request)
            .await
            .map_err(Self::map_hyper_error)?;

        let status = response.status().as_u16();
        let headers = Self::extract_headers(response.headers());

        let body = response
            .into_body()
            .collect()
            .await
            .map_err(|e| Error::connection(e.to_string()))?
            .to_bytes();

        Ok(Response::new(status, headers, body))
    }

    #[allow(clippy::needless_pass_by_value)]
    fn map_hyper_error(err: hyper_util::client::legacy::Error) -> Error {
        let msg = err.to_string();

        if err.is_connect() {
            return Error::connection(msg);
        }

        if msg.contains("ssl") || msg.contains("tls") || msg.contains("certificate") {
            return Error::tls(msg);
        }

        Error::connection(msg)
    }
}

impl Default for HyperSender {
    fn default() -> Self {
        Self::new()
    }
}

impl Sender for HyperSender {
    fn send(&self, request: Request) -> SendFuture<'_> {
        Box::pin(self.execute(request))
    }
}

/// Builder for [`HyperSender`]. Unset values keep their
/// [`SenderConfig::default`].
#[derive(Debug, Clone, Default)]
pub struct HyperSenderBuilder {
    config: SenderConfig,
}

impl HyperSenderBuilder {
    /// Set the exchange deadline.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the connect deadline.
    #[must_use]
    pub const fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Set the maximum idle connections per host.
    #[must_use]
    pub const fn pool_idle_per_host(mut self, count: usize) -> Self {
        self.config.pool_idle_per_host = count;
        self
    }

    /// Set how long idle connections are kept.
    #[must_use]
    pub const fn pool_idle_timeout(mut self, timeout: Duration) -> Self {
        self.config.pool_idle_timeout = timeout;
        self
    }

    /// Build the sender.
    #[must_use]
    pub fn build(self) -> HyperSender {
        HyperSender::with_config(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Method;

    #[test]
    fn sender_default_config() {
        let sender = HyperSender::new();
        assert_eq!(sender.config().timeout, Duration::from_secs(30));
    }

    #[test]
    fn builder_applies_config() {
        let sender = HyperSender::builder()
            .timeout(Duration::from_secs(3))
            .pool_idle_per_host(2)
            .build();

        assert_eq!(sender.config().timeout, Duration::from_secs(3));
        assert_eq!(sender.config().pool_idle_per_host, 2);
        assert_eq!(sender.config().connect_timeout, Duration::from_secs(10));
    }

    #[test]
    fn connect_timeout_is_capped_by_timeout() {
        let config = HyperSender::builder()
            .timeout(Duration::from_secs(2))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .config()
            .to_owned();

        assert_eq!(config.effective_connect_timeout(), Duration::from_secs(2));
        assert_eq!(
            SenderConfig::default().effective_connect_timeout(),
            Duration::from_secs(10)
        );
    }

    #[test]
    fn sender_is_debug() {
        let debug = format!("{:?}", HyperSender::new());
        assert!(debug.contains("HyperSender"));
    }

    #[test]
    fn hyper_request_carries_headers_and_body() {
        let url = url::Url::parse("https://api.example.com/items").expect("url");
        let request = Request::builder(Method::Put, url)
            .header("user-agent", "UA-1")
            .body("payload")
            .build();

        let hyper_request = HyperSender::build_hyper_request(request).expect("request");

        assert_eq!(hyper_request.method(), &http::Method::PUT);
        assert_eq!(hyper_request.uri(), "https://api.example.com/items");
        assert_eq!(
            hyper_request
                .headers()
                .get("user-agent")
                .and_then(|v| v.to_str().ok()),
            Some("UA-1")
        );
    }

    #[test]
    fn invalid_header_value_is_rejected() {
        let url = url::Url::parse("https://api.example.com/").expect("url");
        let request = Request::builder(Method::Get, url)
            .header("X-Bad", "line\nbreak")
            .build();

        let err = HyperSender::build_hyper_request(request).expect_err("invalid header");
        assert!(matches!(err, Error::InvalidRequest(_)));
    }

    #[test]
    fn closed_body_cannot_be_sent() {
        let url = url::Url::parse("https://api.example.com/").expect("url");
        let mut request = Request::builder(Method::Post, url).body("gone").build();
        if let Some(body) = request.body_mut() {
            body.close();
        }

        let err = HyperSender::build_hyper_request(request).expect_err("closed body");
        assert!(matches!(err, Error::Body(_)));
    }
}
