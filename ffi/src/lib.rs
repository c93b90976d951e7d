//! C-ABI wrapper around `pal-core`.
//!
//! # Overview
//! Exposes request building, outcome classification, request execution and
//! the random bytes service through `extern "C"` functions, so a host that
//! performs its own I/O can still share the URI, query and error rules.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - Structured inputs (payloads, headers) cross as JSON text.
//! - A single `FfiPalResult` envelope with `FfiDataTag` + `void* data`
//!   conveys success payloads and errors uniformly.
//! - The C caller owns all returned pointers and must call the matching
//!   `pal_free_*` function to release them.

pub mod types;

use std::ffi::CString;
use std::os::raw::c_char;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use pal_core::{
    classify, decode_json, ClientConfig, EndPoint, Headers, HttpMethod, NetworkClient, Payload,
    PalError, RngService, TracingLogger, UreqTransport,
};
use serde_json::Value;

use types::*;

// ---------------------------------------------------------------------------
// Client lifecycle
// ---------------------------------------------------------------------------

/// Create a `NetworkClient` bound to `endpoint_uri` that sends through the
/// bundled ureq transport. `timeout_ms` of zero disables the timeout.
///
/// Returns null if `endpoint_uri` is null or not a valid endpoint, if
/// `timeout_ms` is negative, or if an internal panic occurs.
/// The caller must free the returned pointer with `pal_client_free`.
#[unsafe(no_mangle)]
pub extern "C" fn pal_client_new(endpoint_uri: *const c_char, timeout_ms: i64) -> *mut FfiNetworkClient {
    catch_unwind(|| {
        let Some(uri) = from_c_str(endpoint_uri) else {
            return std::ptr::null_mut();
        };
        let Ok(endpoint) = EndPoint::parse(&uri) else {
            return std::ptr::null_mut();
        };
        let config = ClientConfig::new(endpoint)
            .with_timeout_ms(timeout_ms)
            .with_logger(Arc::new(TracingLogger));
        match NetworkClient::new(config, Arc::new(UreqTransport::new())) {
            Ok(client) => Box::into_raw(Box::new(FfiNetworkClient { inner: client })),
            Err(_) => std::ptr::null_mut(),
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a client created by `pal_client_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn pal_client_free(client: *mut FfiNetworkClient) {
    if !client.is_null() {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            drop(unsafe { Box::from_raw(client) });
        }));
    }
}

// ---------------------------------------------------------------------------
// Build
// ---------------------------------------------------------------------------

fn parse_payload(kind: FfiPayloadKind, payload: *const c_char) -> Result<Payload, PalError> {
    let text = from_c_str(payload);
    match (kind, text) {
        (FfiPayloadKind::Empty, _) | (_, None) => Ok(Payload::Empty),
        (FfiPayloadKind::Text, Some(text)) => Ok(Payload::Text(text)),
        (FfiPayloadKind::Json, Some(text)) => serde_json::from_str::<Value>(&text)
            .map(Payload::Json)
            .map_err(|e| PalError::InvalidArgument(format!("payload is not valid JSON: {e}"))),
    }
}

fn parse_headers(headers_json: *const c_char) -> Result<Option<Headers>, PalError> {
    from_c_str(headers_json)
        .map(|text| {
            serde_json::from_str::<Headers>(&text)
                .map_err(|e| PalError::InvalidArgument(format!("headers must be a JSON object of strings: {e}")))
        })
        .transpose()
}

/// Build the HTTP request a client call would send.
///
/// `payload` is read according to `payload_kind`: for `Json` on GET/DELETE
/// the object becomes query parameters, otherwise the body. `additional_path`
/// and `headers_json` (a JSON object of strings) may be null.
///
/// Returns null if `client` is null, if `payload` or `headers_json` cannot
/// be parsed, or if the method cannot carry the payload.
/// The caller must free the returned pointer with `pal_free_request`.
#[unsafe(no_mangle)]
pub extern "C" fn pal_build_request(
    client: *const FfiNetworkClient,
    method: FfiHttpMethod,
    payload_kind: FfiPayloadKind,
    payload: *const c_char,
    additional_path: *const c_char,
    headers_json: *const c_char,
) -> *mut FfiHttpRequest {
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        let built = parse_payload(payload_kind, payload).and_then(|payload| {
            let headers = parse_headers(headers_json)?;
            let path = from_c_str(additional_path);
            client
                .inner
                .build_request(method.into(), payload, path.as_deref(), headers.as_ref())
        });
        match built {
            Ok(req) => FfiHttpRequest::from_core(req),
            Err(_) => std::ptr::null_mut(),
        }
    }))
    .unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Classify / execute
// ---------------------------------------------------------------------------

/// Classify the outcome of a request the host executed itself.
///
/// `uri` is the request URI (used as the error endpoint). When `decode` is
/// true a successful body must also parse as JSON, otherwise the result is
/// a response-decode error.
/// Returns a result with `data_tag = Text` carrying the body on success.
#[unsafe(no_mangle)]
pub extern "C" fn pal_classify_response(
    method: FfiHttpMethod,
    uri: *const c_char,
    outcome: *const FfiTransportOutcome,
    decode: bool,
) -> *mut FfiPalResult {
    catch_unwind(|| {
        let Some(uri) = from_c_str(uri) else {
            return FfiPalResult::null_arg("uri");
        };
        if outcome.is_null() {
            return FfiPalResult::null_arg("outcome");
        }
        let outcome = unsafe { &*outcome }.to_core();
        let method: HttpMethod = method.into();
        let result = classify(method, &uri, outcome).and_then(|text| {
            if decode {
                decode_json::<Value>(method, &uri, &text)?;
            }
            Ok(text)
        });
        match result {
            Ok(text) => FfiPalResult::ok_text(text),
            Err(e) => FfiPalResult::from_error(e),
        }
    })
    .unwrap_or_else(|_| FfiPalResult::panic("panic in pal_classify_response"))
}

/// Send a request built by `pal_build_request` through the client's
/// transport and classify the outcome. Blocks the calling thread.
///
/// Returns a result with `data_tag = Text` carrying the body on success.
#[unsafe(no_mangle)]
pub extern "C" fn pal_client_execute(
    client: *const FfiNetworkClient,
    request: *const FfiHttpRequest,
    decode: bool,
) -> *mut FfiPalResult {
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() {
            return FfiPalResult::null_arg("client");
        }
        if request.is_null() {
            return FfiPalResult::null_arg("request");
        }
        let client = unsafe { &*client };
        let Some(request) = unsafe { &*request }.to_core() else {
            return FfiPalResult::null_arg("request.uri");
        };

        let runtime = match tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
        {
            Ok(rt) => rt,
            Err(e) => return FfiPalResult::panic(&format!("unable to start runtime: {e}")),
        };

        let result = runtime.block_on(async {
            if decode {
                client
                    .inner
                    .send_json::<Value>(request)
                    .await
                    .map(|value| value.to_string())
            } else {
                client.inner.send(request).await
            }
        });
        match result {
            Ok(text) => FfiPalResult::ok_text(text),
            Err(e) => FfiPalResult::from_error(e),
        }
    }))
    .unwrap_or_else(|_| FfiPalResult::panic("panic in pal_client_execute"))
}

// ---------------------------------------------------------------------------
// Random bytes
// ---------------------------------------------------------------------------

/// Generate `length` random bytes from the operating system source.
///
/// Returns a result with `data_tag = Bytes` on success; `data` is null when
/// `length` is zero. A negative `length` is an invalid-argument error.
#[unsafe(no_mangle)]
pub extern "C" fn pal_rng_generate(length: i64) -> *mut FfiPalResult {
    catch_unwind(|| {
        let length = match usize::try_from(length) {
            Ok(n) => n,
            Err(_) => {
                return FfiPalResult::from_error(PalError::InvalidArgument(format!(
                    "The length must be >= 0, it is {length}"
                )))
            }
        };
        match RngService::new().generate(length) {
            Ok(bytes) => FfiPalResult::ok_bytes(bytes),
            Err(e) => FfiPalResult::from_error(e),
        }
    })
    .unwrap_or_else(|_| FfiPalResult::panic("panic in pal_rng_generate"))
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

fn free_c_string(s: *mut c_char) {
    if !s.is_null() {
        drop(unsafe { CString::from_raw(s) });
    }
}

/// Free an `FfiHttpRequest` returned by `pal_build_request`.
/// Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn pal_free_request(req: *mut FfiHttpRequest) {
    if req.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let req = unsafe { Box::from_raw(req) };
        free_c_string(req.uri);
        free_c_string(req.body);
        if !req.headers.is_null() && req.headers_len > 0 {
            let headers = unsafe {
                Box::from_raw(std::ptr::slice_from_raw_parts_mut(req.headers, req.headers_len as usize))
            };
            for h in headers.iter() {
                free_c_string(h.key);
                free_c_string(h.value);
            }
        }
    });
}

/// Free an `FfiPalResult`. Safe to call with null. Uses `data_tag` to
/// determine what `data` points to.
#[unsafe(no_mangle)]
pub extern "C" fn pal_free_result(result: *mut FfiPalResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let result = unsafe { Box::from_raw(result) };
        free_c_string(result.error_message);
        free_c_string(result.endpoint);
        free_c_string(result.response);
        if !result.data.is_null() {
            match result.data_tag {
                FfiDataTag::Text => free_c_string(result.data as *mut c_char),
                FfiDataTag::Bytes => drop(unsafe {
                    Box::from_raw(std::ptr::slice_from_raw_parts_mut(
                        result.data as *mut u8,
                        result.data_len as usize,
                    ))
                }),
                FfiDataTag::None => {}
            }
        }
    });
}

/// Free a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn pal_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = catch_unwind(|| free_c_string(s));
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
