//! Shared fakes for unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::http::{HttpClient, HttpError, HttpRequest, HttpResponse};

/// Scripted HTTP client. Replies are consumed in order; once the script is
/// exhausted every request gets the fallback reply.
pub(crate) struct StubClient {
    script: Mutex<VecDeque<Result<HttpResponse, String>>>,
    fallback: Result<HttpResponse, String>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl StubClient {
    pub(crate) fn ok(status: u16, body: &str) -> Self {
        Self::with_fallback(Ok(HttpResponse::new(status, body)))
    }

    pub(crate) fn failing(reason: &str) -> Self {
        Self::with_fallback(Err(reason.to_owned()))
    }

    fn with_fallback(fallback: Result<HttpResponse, String>) -> Self {
        Self { script: Mutex::new(VecDeque::new()), fallback, requests: Mutex::new(Vec::new()) }
    }

    pub(crate) fn then(self, status: u16, body: &str) -> Self {
        self.script.lock().unwrap().push_back(Ok(HttpResponse::new(status, body)));
        self
    }

    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpClient for StubClient {
    async fn request(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        self.requests.lock().unwrap().push(request);
        let reply = self.script.lock().unwrap().pop_front().unwrap_or_else(|| self.fallback.clone());
        reply.map_err(HttpError::Request)
    }
}

/// HTTP client whose requests never complete.
pub(crate) struct PendingClient;

#[async_trait]
impl HttpClient for PendingClient {
    async fn request(&self, _request: HttpRequest) -> Result<HttpResponse, HttpError> {
        std::future::pending().await
    }
}
