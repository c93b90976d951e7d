//! `Transport` over the blocking ureq client.
//!
//! Each request gets its own agent configured with the request timeout and
//! with status codes returned as data, so 4xx/5xx responses reach the
//! client's classifier instead of surfacing as transport errors. Inside a
//! tokio runtime the blocking call runs on its blocking pool; elsewhere it
//! runs inline on the polling thread.

use async_trait::async_trait;
use ureq::Agent;

use super::Transport;
use crate::error::TransportError;
use crate::http::{HttpRequest, HttpResponse, TransportOutcome};

#[derive(Debug, Clone, Copy, Default)]
pub struct UreqTransport;

impl UreqTransport {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Transport for UreqTransport {
    async fn send(&self, request: HttpRequest) -> TransportOutcome {
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle
                .spawn_blocking(move || execute(request))
                .await
                .unwrap_or_else(|e| {
                    TransportOutcome::Error(TransportError::new(format!("transport task failed: {e}")))
                }),
            Err(_) => execute(request),
        }
    }
}

fn execute(request: HttpRequest) -> TransportOutcome {
    let agent: Agent = Agent::config_builder()
        .http_status_as_error(false)
        .timeout_global(request.timeout)
        .build()
        .new_agent();

    let mut builder = ureq::http::Request::builder()
        .method(request.method.as_str())
        .uri(request.uri.as_str());
    for (name, value) in &request.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }

    let result = match request.body {
        Some(body) => builder.body(body).map(|req| agent.run(req)),
        None => builder.body(()).map(|req| agent.run(req)),
    };

    let mut response = match result {
        Ok(Ok(response)) => response,
        Ok(Err(ureq::Error::Timeout(_))) => return TransportOutcome::Timeout(None),
        Ok(Err(e)) => return TransportOutcome::Error(TransportError::new(e.to_string())),
        Err(e) => {
            return TransportOutcome::Error(TransportError::new(format!("invalid request: {e}")))
        }
    };

    let status = response.status();
    let head = HttpResponse::new(status.as_u16(), String::new())
        .with_status_text(status.canonical_reason().unwrap_or_default());

    match response.body_mut().read_to_string() {
        Ok(body) => TransportOutcome::Load(HttpResponse { body, ..head }),
        Err(ureq::Error::Timeout(_)) => TransportOutcome::Timeout(Some(head)),
        Err(e) => TransportOutcome::Error(TransportError::new(e.to_string())),
    }
}
