//! Shared test doubles.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use veneer::{Error, Headers, Method, Request, Response, SendFuture, Sender};

/// Sender that records what it receives and answers with a canned response.
#[derive(Clone, Default)]
pub struct MockSender {
    attempts: Arc<AtomicUsize>,
    last: Arc<Mutex<Option<Recorded>>>,
    status: u16,
    body: &'static str,
}

/// What the mock saw of the last request.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub url: String,
    pub headers: Headers,
    pub body: Option<Vec<u8>>,
}

impl MockSender {
    pub fn new() -> Self {
        Self::responding(200, "ok")
    }

    pub fn responding(status: u16, body: &'static str) -> Self {
        Self {
            status,
            body,
            ..Self::default()
        }
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<Recorded> {
        self.last.lock().expect("lock").clone()
    }
}

impl Sender for MockSender {
    fn send(&self, request: Request) -> SendFuture<'_> {
        Box::pin(async move {
            self.attempts.fetch_add(1, Ordering::SeqCst);

            let (method, url, headers, body) = request.into_parts();
            let body = body
                .map(|body| body.into_bytes().map(|bytes| bytes.to_vec()))
                .transpose()?;
            *self.last.lock().expect("lock") = Some(Recorded {
                method,
                url: url.to_string(),
                headers,
                body,
            });

            Ok::<_, Error>(Response::new(self.status, Headers::new(), self.body))
        })
    }
}

pub fn request(method: Method, url: &str) -> Request {
    let url = url::Url::parse(url).expect("url");
    Request::builder(method, url).build()
}
