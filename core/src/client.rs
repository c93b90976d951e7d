//! Network client: request construction, execution and outcome
//! classification.
//!
//! # Design
//! `NetworkClient` holds only immutable configuration (endpoint, timeout,
//! logger, transport) and carries no state between calls. Every operation
//! is split the same way:
//!
//! 1. `build_request` produces an `HttpRequest` (URI, headers, body).
//! 2. A `Transport` resolves it to one `TransportOutcome`.
//! 3. `classify` maps the outcome to the response text or a `PalError`,
//!    and the JSON layer optionally runs `decode_json` on top.
//!
//! Steps 1 and 3 are pure, so hosts that do their own I/O can call them
//! directly and skip step 2.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::config::ClientConfig;
use crate::endpoint::EndPoint;
use crate::error::{ErrorContext, PalError};
use crate::http::{Headers, HttpMethod, HttpRequest, TransportOutcome};
use crate::logging::{Logger, NullLogger};
use crate::query::QueryParams;
use crate::transport::Transport;
use crate::uri::compose_uri;

const CONTENT_TYPE: &str = "Content-Type";
const APPLICATION_JSON: &str = "application/json";

/// What a request carries besides its path and headers.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Empty,
    /// Query string for GET/DELETE, JSON body for other methods.
    Params(QueryParams),
    /// Raw body text, sent as is. Not allowed on GET/DELETE.
    Text(String),
    /// Must be an object of scalars for GET/DELETE, any JSON otherwise.
    Json(Value),
}

/// HTTP client bound to one endpoint.
#[derive(Clone)]
pub struct NetworkClient {
    endpoint: EndPoint,
    timeout: Option<Duration>,
    logger: Arc<dyn Logger>,
    transport: Arc<dyn Transport>,
}

impl NetworkClient {
    /// Validate `config` and resolve its defaults.
    ///
    /// Fails when the endpoint is missing or the timeout is negative.
    pub fn new(config: ClientConfig, transport: Arc<dyn Transport>) -> Result<Self, PalError> {
        let endpoint = config
            .endpoint
            .ok_or_else(|| PalError::invalid("The endpoint must be defined"))?;
        if config.timeout_ms < 0 {
            return Err(PalError::invalid(format!(
                "The timeout must be >= 0, it is {}",
                config.timeout_ms
            )));
        }
        let timeout = (config.timeout_ms > 0).then(|| Duration::from_millis(config.timeout_ms as u64));
        let logger: Arc<dyn Logger> = match config.logger {
            Some(logger) => logger,
            None => Arc::new(NullLogger),
        };

        Ok(Self {
            endpoint,
            timeout,
            logger,
            transport,
        })
    }

    pub fn endpoint(&self) -> &EndPoint {
        &self.endpoint
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// GET, returning the raw response text.
    pub async fn get(
        &self,
        params: Option<&QueryParams>,
        additional_path: Option<&str>,
        headers: Option<&Headers>,
    ) -> Result<String, PalError> {
        let payload = params.cloned().map_or(Payload::Empty, Payload::Params);
        let request = self.build_request(HttpMethod::Get, payload, additional_path, headers)?;
        self.send(request).await
    }

    /// POST `body` verbatim, returning the raw response text.
    pub async fn post(
        &self,
        body: &str,
        additional_path: Option<&str>,
        headers: Option<&Headers>,
    ) -> Result<String, PalError> {
        let payload = Payload::Text(body.to_string());
        let request = self.build_request(HttpMethod::Post, payload, additional_path, headers)?;
        self.send(request).await
    }

    /// Send `body` as JSON (or as the query string for GET/DELETE) and
    /// decode the response as JSON. `method` defaults to POST.
    pub async fn json<T, U>(
        &self,
        body: Option<&T>,
        method: Option<HttpMethod>,
        additional_path: Option<&str>,
        headers: Option<&Headers>,
    ) -> Result<U, PalError>
    where
        T: Serialize + ?Sized,
        U: DeserializeOwned,
    {
        let payload = match body {
            Some(body) => Payload::Json(serde_json::to_value(body).map_err(|e| {
                PalError::invalid(format!("Unable to serialize the request body: {e}"))
            })?),
            None => Payload::Empty,
        };
        let method = method.unwrap_or(HttpMethod::Post);
        let request = self.build_request(method, payload, additional_path, headers)?;
        self.send_json(request).await
    }

    pub async fn get_json<U: DeserializeOwned>(
        &self,
        params: Option<&QueryParams>,
        additional_path: Option<&str>,
        headers: Option<&Headers>,
    ) -> Result<U, PalError> {
        let payload = params.cloned().map_or(Payload::Empty, Payload::Params);
        let request = self.build_request(HttpMethod::Get, payload, additional_path, headers)?;
        self.send_json(request).await
    }

    pub async fn post_json<T, U>(
        &self,
        body: &T,
        additional_path: Option<&str>,
        headers: Option<&Headers>,
    ) -> Result<U, PalError>
    where
        T: Serialize + ?Sized,
        U: DeserializeOwned,
    {
        self.json(Some(body), Some(HttpMethod::Post), additional_path, headers)
            .await
    }

    /// Build the request a call would send, without sending it.
    pub fn build_request(
        &self,
        method: HttpMethod,
        payload: Payload,
        additional_path: Option<&str>,
        headers: Option<&Headers>,
    ) -> Result<HttpRequest, PalError> {
        let (query, body) = match payload {
            Payload::Empty => (None, None),
            Payload::Params(params) if method.uses_query() => (Some(params), None),
            Payload::Params(params) => (None, Some(Body::Json(params.to_json()))),
            Payload::Text(_) if method.uses_query() => {
                return Err(PalError::invalid(format!(
                    "A {method} request cannot carry a body"
                )))
            }
            Payload::Text(text) => (None, Some(Body::Text(text))),
            Payload::Json(Value::Null) if method.uses_query() => (None, None),
            Payload::Json(value) if method.uses_query() => (Some(QueryParams::from_json(&value)?), None),
            Payload::Json(value) => (None, Some(Body::Json(value))),
        };

        let uri = compose_uri(&self.endpoint.uri(), additional_path, query.as_ref());

        let mut all_headers = headers.cloned().unwrap_or_default();
        let body = body.map(|body| match body {
            Body::Text(text) => text,
            Body::Json(value) => {
                all_headers.insert(CONTENT_TYPE.to_string(), APPLICATION_JSON.to_string());
                value.to_string()
            }
        });

        Ok(HttpRequest {
            method,
            uri,
            headers: all_headers.into_iter().collect(),
            body,
            timeout: self.timeout,
        })
    }

    /// Send a request built by `build_request` and classify the outcome.
    ///
    /// Inside a tokio runtime (with the time driver enabled) the client
    /// timeout applies even if the transport ignores it. On any other
    /// executor only the transport enforces `HttpRequest::timeout`.
    pub async fn send(&self, request: HttpRequest) -> Result<String, PalError> {
        let method = request.method;
        let uri = request.uri.clone();
        self.logger.info(&format!("{method} {uri}"), None);

        let outcome = match self.timeout {
            Some(limit) if tokio::runtime::Handle::try_current().is_ok() => {
                tokio::time::timeout(limit, self.transport.send(request))
                    .await
                    .unwrap_or(TransportOutcome::Timeout(None))
            }
            _ => self.transport.send(request).await,
        };

        let result = classify(method, &uri, outcome);
        match &result {
            Ok(text) => self
                .logger
                .log(&format!("{method} {uri} returned {} bytes", text.len()), None),
            Err(err) => self.report(err),
        }
        result
    }

    /// `send`, then decode the response text as JSON.
    pub async fn send_json<U: DeserializeOwned>(&self, request: HttpRequest) -> Result<U, PalError> {
        let method = request.method;
        let uri = request.uri.clone();
        let text = self.send(request).await?;
        decode_json(method, &uri, &text).inspect_err(|err| self.report(err))
    }

    fn report(&self, err: &PalError) {
        let context = err.context().and_then(|c| serde_json::to_value(c).ok());
        self.logger.error(&err.to_string(), context.as_ref());
    }
}

impl fmt::Debug for NetworkClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NetworkClient")
            .field("endpoint", &self.endpoint)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

enum Body {
    Text(String),
    Json(Value),
}

/// Map a transport outcome to the response text or a classified error.
/// Only status 200 is a success.
pub fn classify(method: HttpMethod, uri: &str, outcome: TransportOutcome) -> Result<String, PalError> {
    match outcome {
        TransportOutcome::Load(response) if response.status == 200 => Ok(response.body),
        TransportOutcome::Load(response) => {
            let text = if response.body.is_empty() {
                response.status_text
            } else {
                response.body
            };
            Err(PalError::Http {
                method,
                context: ErrorContext {
                    endpoint: uri.to_string(),
                    status: Some(response.status),
                    response: Some(text).filter(|t| !t.is_empty()),
                },
            })
        }
        TransportOutcome::Timeout(partial) => Err(PalError::Timeout {
            method,
            context: ErrorContext {
                endpoint: uri.to_string(),
                status: partial.as_ref().map(|r| r.status),
                response: partial.map(|r| r.body).filter(|b| !b.is_empty()),
            },
        }),
        TransportOutcome::Error(source) => Err(PalError::Transport {
            method,
            context: ErrorContext::new(uri),
            source,
        }),
    }
}

/// Decode a successful response body as JSON.
pub fn decode_json<U: DeserializeOwned>(method: HttpMethod, uri: &str, text: &str) -> Result<U, PalError> {
    serde_json::from_str(text).map_err(|source| PalError::ResponseDecode {
        method,
        context: ErrorContext {
            endpoint: uri.to_string(),
            status: None,
            response: Some(text.to_string()),
        },
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::json;

    use crate::error::{ErrorKind, TransportError};
    use crate::http::HttpResponse;
    use crate::query::QueryValue;

    /// Records every request and answers with a fixed outcome.
    struct FakeTransport {
        outcome: TransportOutcome,
        delay: Option<Duration>,
        seen: Mutex<Vec<HttpRequest>>,
    }

    impl FakeTransport {
        fn new(outcome: TransportOutcome) -> Arc<Self> {
            Arc::new(Self {
                outcome,
                delay: None,
                seen: Mutex::new(Vec::new()),
            })
        }

        fn ok(body: &str) -> Arc<Self> {
            Self::new(TransportOutcome::Load(HttpResponse::new(200, body)))
        }

        fn slow(delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                outcome: TransportOutcome::Load(HttpResponse::new(200, "late")),
                delay: Some(delay),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn last(&self) -> HttpRequest {
            self.seen.lock().unwrap().last().cloned().unwrap()
        }
    }

    #[async_trait]
    impl Transport for FakeTransport {
        async fn send(&self, request: HttpRequest) -> TransportOutcome {
            self.seen.lock().unwrap().push(request);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.outcome.clone()
        }
    }

    /// Answers 200 with the request URI as the body.
    struct EchoUri;

    #[async_trait]
    impl Transport for EchoUri {
        async fn send(&self, request: HttpRequest) -> TransportOutcome {
            tokio::time::sleep(Duration::from_millis(1)).await;
            TransportOutcome::Load(HttpResponse::new(200, request.uri))
        }
    }

    #[derive(Default)]
    struct RecordingLogger {
        errors: Mutex<Vec<(String, Option<Value>)>>,
    }

    impl Logger for RecordingLogger {
        fn banner(&self, _: &str, _: Option<&Value>) {}
        fn log(&self, _: &str, _: Option<&Value>) {}
        fn info(&self, _: &str, _: Option<&Value>) {}
        fn warning(&self, _: &str, _: Option<&Value>) {}
        fn error(&self, message: &str, context: Option<&Value>) {
            self.errors
                .lock()
                .unwrap()
                .push((message.to_string(), context.cloned()));
        }
    }

    fn endpoint() -> EndPoint {
        EndPoint::new("http", "localhost", None, Some(14265)).unwrap()
    }

    fn client(transport: Arc<dyn Transport>) -> NetworkClient {
        NetworkClient::new(ClientConfig::new(endpoint()), transport).unwrap()
    }

    fn headers(pairs: &[(&str, &str)]) -> Headers {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    // --- construction ---

    #[test]
    fn can_be_created() {
        let c = client(FakeTransport::ok(""));
        assert_eq!(c.endpoint().uri(), "http://localhost:14265");
        assert!(c.timeout().is_none());
    }

    #[test]
    fn fails_without_endpoint() {
        let err = NetworkClient::new(ClientConfig::default(), FakeTransport::ok("")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert!(err.to_string().contains("must be defined"));
    }

    #[test]
    fn fails_with_negative_timeout() {
        let config = ClientConfig::new(endpoint()).with_timeout_ms(-1);
        let err = NetworkClient::new(config, FakeTransport::ok("")).unwrap_err();
        assert!(err.to_string().contains(">= 0"));
    }

    #[test]
    fn zero_timeout_means_none() {
        let config = ClientConfig::new(endpoint()).with_timeout_ms(0);
        let c = NetworkClient::new(config, FakeTransport::ok("")).unwrap();
        assert!(c.timeout().is_none());
    }

    // --- request building ---

    #[test]
    fn build_get_with_params_appends_query_and_no_body() {
        let params = QueryParams::new()
            .with("a param", 2)
            .with("b param", true)
            .with("c param", QueryValue::Null);
        let req = client(FakeTransport::ok(""))
            .build_request(HttpMethod::Get, Payload::Params(params), None, None)
            .unwrap();
        assert_eq!(
            req.uri,
            "http://localhost:14265?a%20param=2&b%20param=true&c%20param="
        );
        assert!(req.body.is_none());
        assert!(req.headers.is_empty());
    }

    #[test]
    fn build_get_with_empty_params_leaves_uri() {
        let req = client(FakeTransport::ok(""))
            .build_request(HttpMethod::Get, Payload::Params(QueryParams::new()), Some("/p"), None)
            .unwrap();
        assert_eq!(req.uri, "http://localhost:14265/p");
    }

    #[test]
    fn build_post_with_params_sends_json_body() {
        let params = QueryParams::new().with("a", 1);
        let req = client(FakeTransport::ok(""))
            .build_request(HttpMethod::Post, Payload::Params(params), None, None)
            .unwrap();
        assert_eq!(req.uri, "http://localhost:14265");
        assert_eq!(req.body.as_deref(), Some(r#"{"a":1}"#));
        assert_eq!(
            req.headers,
            vec![(CONTENT_TYPE.to_string(), APPLICATION_JSON.to_string())]
        );
    }

    #[test]
    fn build_json_content_type_overrides_caller_value() {
        let req = client(FakeTransport::ok(""))
            .build_request(
                HttpMethod::Put,
                Payload::Json(json!({ "x": 1 })),
                None,
                Some(&headers(&[(CONTENT_TYPE, "text/plain"), ("bar", "123")])),
            )
            .unwrap();
        assert_eq!(
            req.headers,
            vec![
                (CONTENT_TYPE.to_string(), APPLICATION_JSON.to_string()),
                ("bar".to_string(), "123".to_string()),
            ]
        );
    }

    #[test]
    fn build_delete_with_json_object_uses_query() {
        let req = client(FakeTransport::ok(""))
            .build_request(HttpMethod::Delete, Payload::Json(json!({ "id": "a/b" })), Some("items"), None)
            .unwrap();
        assert_eq!(req.uri, "http://localhost:14265/items?id=a%2Fb");
        assert!(req.body.is_none());
    }

    #[test]
    fn build_get_rejects_text_body() {
        let err = client(FakeTransport::ok(""))
            .build_request(HttpMethod::Get, Payload::Text("x".into()), None, None)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn build_get_rejects_non_object_json() {
        let err = client(FakeTransport::ok(""))
            .build_request(HttpMethod::Get, Payload::Json(json!([1])), None, None)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn build_carries_timeout() {
        let config = ClientConfig::new(endpoint()).with_timeout_ms(250);
        let c = NetworkClient::new(config, FakeTransport::ok("")).unwrap();
        let req = c.build_request(HttpMethod::Get, Payload::Empty, None, None).unwrap();
        assert_eq!(req.timeout, Some(Duration::from_millis(250)));
    }

    // --- classification ---

    #[test]
    fn classify_uses_status_text_when_body_empty() {
        let outcome = TransportOutcome::Load(HttpResponse::new(503, "").with_status_text("Service Unavailable"));
        let err = classify(HttpMethod::Get, "http://x", outcome).unwrap_err();
        let ctx = err.context().unwrap();
        assert_eq!(ctx.status, Some(503));
        assert_eq!(ctx.response.as_deref(), Some("Service Unavailable"));
    }

    #[test]
    fn classify_non_200_success_codes_are_errors() {
        let outcome = TransportOutcome::Load(HttpResponse::new(201, "created"));
        let err = classify(HttpMethod::Post, "http://x", outcome).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Http);
        assert_eq!(err.status(), Some(201));
    }

    #[test]
    fn classify_timeout_keeps_partial_status() {
        let outcome = TransportOutcome::Timeout(Some(HttpResponse::new(200, "")));
        let err = classify(HttpMethod::Get, "http://x", outcome).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Timeout);
        assert_eq!(err.status(), Some(200));
        assert!(err.context().unwrap().response.is_none());
    }

    // --- get ---

    #[tokio::test]
    async fn get_returns_raw_text() {
        let c = client(FakeTransport::ok("foo"));
        assert_eq!(c.get(None, None, None).await.unwrap(), "foo");
    }

    #[tokio::test]
    async fn get_forwards_headers() {
        let transport = FakeTransport::ok("foo");
        let c = client(transport.clone());
        let ret = c.get(None, None, Some(&headers(&[("bar", "123")]))).await.unwrap();
        assert_eq!(ret, "foo");
        assert_eq!(transport.last().headers, vec![("bar".to_string(), "123".to_string())]);
    }

    #[tokio::test]
    async fn get_with_additional_path() {
        let transport = FakeTransport::ok("foo");
        let ep = EndPoint::new("http", "localhost", Some("//pop//"), Some(14265)).unwrap();
        let c = NetworkClient::new(ClientConfig::new(ep), transport.clone()).unwrap();
        c.get(None, Some("////path"), None).await.unwrap();
        assert_eq!(transport.last().uri, "http://localhost:14265/pop/path");
        assert!(transport.last().body.is_none());
    }

    #[tokio::test]
    async fn get_fails_on_transport_error() {
        let transport = FakeTransport::new(TransportOutcome::Error(TransportError::new("err!")));
        let err = client(transport).get(None, None, None).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert!(err.to_string().contains("Failed GET request"));
    }

    #[tokio::test]
    async fn get_fails_on_404() {
        let transport = FakeTransport::new(TransportOutcome::Load(HttpResponse::new(404, "missing")));
        let err = client(transport).get(None, None, None).await.unwrap_err();
        assert!(err.to_string().contains("Failed GET request"));
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.context().unwrap().response.as_deref(), Some("missing"));
    }

    #[tokio::test]
    async fn get_times_out() {
        let config = ClientConfig::new(endpoint()).with_timeout_ms(10);
        let c = NetworkClient::new(config, FakeTransport::slow(Duration::from_secs(5))).unwrap();
        let err = c.get(None, None, None).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Timeout);
        assert!(err.to_string().contains("timed out"));
    }

    #[tokio::test]
    async fn transport_reported_timeout_is_classified() {
        let c = client(FakeTransport::new(TransportOutcome::Timeout(None)));
        let err = c.get(None, None, None).await.unwrap_err();
        assert!(err.to_string().contains("timed out"));
    }

    #[tokio::test]
    async fn slow_transport_without_timeout_completes() {
        let c = client(FakeTransport::slow(Duration::from_millis(20)));
        assert_eq!(c.get(None, None, None).await.unwrap(), "late");
    }

    #[test]
    fn send_outside_tokio_relies_on_transport_timeout() {
        let transport = FakeTransport::ok("foo");
        let config = ClientConfig::new(endpoint()).with_timeout_ms(10);
        let c = NetworkClient::new(config, transport.clone()).unwrap();
        let text = futures::executor::block_on(c.get(None, None, None)).unwrap();
        assert_eq!(text, "foo");
        assert_eq!(transport.last().timeout, Some(Duration::from_millis(10)));
    }

    // --- post ---

    #[tokio::test]
    async fn post_sends_body_verbatim() {
        let transport = FakeTransport::ok("foo");
        let c = client(transport.clone());
        let ret = c.post("blah", None, Some(&headers(&[("bar", "123")]))).await.unwrap();
        assert_eq!(ret, "foo");
        let req = transport.last();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.body.as_deref(), Some("blah"));
        assert_eq!(req.headers, vec![("bar".to_string(), "123".to_string())]);
    }

    #[tokio::test]
    async fn post_fails_on_transport_error() {
        let transport = FakeTransport::new(TransportOutcome::Error(TransportError::new("err!")));
        let err = client(transport).post("blah", None, None).await.unwrap_err();
        assert!(err.to_string().contains("Failed POST request"));
    }

    #[tokio::test]
    async fn post_fails_on_404() {
        let transport = FakeTransport::new(TransportOutcome::Load(HttpResponse::new(404, "")));
        let err = client(transport).post("blah", None, None).await.unwrap_err();
        assert!(err.to_string().contains("Failed POST request"));
    }

    #[tokio::test]
    async fn post_times_out() {
        let config = ClientConfig::new(endpoint()).with_timeout_ms(10);
        let c = NetworkClient::new(config, FakeTransport::slow(Duration::from_secs(5))).unwrap();
        let err = c.post("blah", None, None).await.unwrap_err();
        assert!(err.to_string().contains("timed out"));
    }

    // --- JSON layer ---

    #[tokio::test]
    async fn get_json_decodes() {
        let c = client(FakeTransport::ok(r#"{ "foo": 123 }"#));
        let ret: Value = c.get_json(None, None, None).await.unwrap();
        assert_eq!(ret, json!({ "foo": 123 }));
    }

    #[tokio::test]
    async fn get_json_fails_on_bad_json_while_get_succeeds() {
        let c = client(FakeTransport::ok("!"));
        let err = c.get_json::<Value>(None, None, None).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ResponseDecode);
        assert!(err
            .to_string()
            .contains("Failed GET request, unable to parse response"));
        assert_eq!(err.context().unwrap().response.as_deref(), Some("!"));
        assert_eq!(c.get(None, None, None).await.unwrap(), "!");
    }

    #[tokio::test]
    async fn post_json_sets_content_type() {
        let transport = FakeTransport::ok(r#"{ "foo": 123 }"#);
        let c = client(transport.clone());
        let ret: Value = c.post_json(&json!({ "bar": true }), None, None).await.unwrap();
        assert_eq!(ret, json!({ "foo": 123 }));
        let req = transport.last();
        assert_eq!(req.body.as_deref(), Some(r#"{"bar":true}"#));
        assert!(req
            .headers
            .contains(&(CONTENT_TYPE.to_string(), APPLICATION_JSON.to_string())));
    }

    #[tokio::test]
    async fn post_json_fails_on_bad_json_while_post_succeeds() {
        let c = client(FakeTransport::ok("!"));
        let err = c
            .post_json::<_, Value>(&json!({ "bar": true }), None, None)
            .await
            .unwrap_err();
        assert!(err
            .to_string()
            .contains("Failed POST request, unable to parse response"));
        assert_eq!(c.post("!", None, None).await.unwrap(), "!");
    }

    #[tokio::test]
    async fn json_propagates_request_failure_unchanged() {
        let transport = FakeTransport::new(TransportOutcome::Load(HttpResponse::new(500, "boom")));
        let err = client(transport)
            .json::<Value, Value>(None, Some(HttpMethod::Put), None, None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Http);
        assert_eq!(err.to_string(), "Failed PUT request");
    }

    #[tokio::test]
    async fn json_with_get_moves_body_to_query() {
        let transport = FakeTransport::ok("[]");
        let c = client(transport.clone());
        let _: Vec<u8> = c
            .json(Some(&json!({ "q": "x y" })), Some(HttpMethod::Get), Some("search"), None)
            .await
            .unwrap();
        assert_eq!(transport.last().uri, "http://localhost:14265/search?q=x%20y");
    }

    #[tokio::test]
    async fn json_without_method_posts_body() {
        let transport = FakeTransport::ok(r#"{ "ok": true }"#);
        let c = client(transport.clone());
        let ret: Value = c
            .json(Some(&json!({ "command": "getNodeInfo" })), None, Some("api"), None)
            .await
            .unwrap();
        assert_eq!(ret, json!({ "ok": true }));
        let req = transport.last();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.uri, "http://localhost:14265/api");
        assert_eq!(req.body.as_deref(), Some(r#"{"command":"getNodeInfo"}"#));
    }

    // --- logging ---

    #[tokio::test]
    async fn failures_are_logged_with_context() {
        let logger = Arc::new(RecordingLogger::default());
        let config = ClientConfig::new(endpoint()).with_logger(logger.clone());
        let transport = FakeTransport::new(TransportOutcome::Load(HttpResponse::new(404, "nope")));
        let c = NetworkClient::new(config, transport).unwrap();
        let err = c.get(None, Some("x"), None).await.unwrap_err();
        assert_eq!(err.status(), Some(404));

        let errors = logger.errors.lock().unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].0, "Failed GET request");
        let ctx = errors[0].1.as_ref().unwrap();
        assert_eq!(ctx["endPoint"], "http://localhost:14265/x");
        assert_eq!(ctx["httpStatusCode"], 404);
    }

    // --- concurrency ---

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_requests_do_not_interfere() {
        let c = client(Arc::new(EchoUri));
        let handles: Vec<_> = (0..32)
            .map(|i| {
                let c = c.clone();
                tokio::spawn(async move { (i, c.get(None, Some(&format!("n/{i}")), None).await) })
            })
            .collect();
        for handle in handles {
            let (i, result) = handle.await.unwrap();
            assert_eq!(result.unwrap(), format!("http://localhost:14265/n/{i}"));
        }
    }
}
