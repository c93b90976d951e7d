//! `#[repr(C)]` mirrors of the core request, outcome and result types.
//!
//! # Design
//! Strings cross as NUL-terminated `char*`, sequences as pointer + length,
//! and every enum has fixed discriminants so the generated header is stable.
//! Everything this module allocates is released by a `pal_free_*` function
//! in `lib.rs`; caller-owned inputs such as `FfiTransportOutcome` are only
//! read.

use std::ffi::{c_void, CStr, CString};
use std::os::raw::c_char;
use std::time::Duration;

use pal_core::{ErrorKind, HttpMethod, HttpRequest, HttpResponse, PalError, TransportError, TransportOutcome};

/// Opaque handle to a `NetworkClient`. C callers receive a pointer to this
/// and pass it back into every client function.
pub struct FfiNetworkClient {
    pub(crate) inner: pal_core::NetworkClient,
}

// ---------------------------------------------------------------------------
// String helpers
// ---------------------------------------------------------------------------

/// Copy `s` into a C string owned by the caller. Interior NULs are replaced
/// so the copy cannot fail.
pub(crate) fn to_c_string(s: String) -> *mut c_char {
    let s = if s.contains('\0') { s.replace('\0', "\u{FFFD}") } else { s };
    CString::new(s).unwrap_or_default().into_raw()
}

/// Borrow a nullable C string. Invalid UTF-8 reads as `None`.
pub(crate) fn from_c_str(p: *const c_char) -> Option<String> {
    if p.is_null() {
        return None;
    }
    unsafe { CStr::from_ptr(p) }.to_str().ok().map(str::to_string)
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// HTTP method as a C enum.
#[repr(C)]
#[derive(Clone, Copy)]
pub enum FfiHttpMethod {
    Get = 0,
    Post = 1,
    Put = 2,
    Patch = 3,
    Delete = 4,
    Head = 5,
    Options = 6,
}

impl From<HttpMethod> for FfiHttpMethod {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Get => FfiHttpMethod::Get,
            HttpMethod::Post => FfiHttpMethod::Post,
            HttpMethod::Put => FfiHttpMethod::Put,
            HttpMethod::Patch => FfiHttpMethod::Patch,
            HttpMethod::Delete => FfiHttpMethod::Delete,
            HttpMethod::Head => FfiHttpMethod::Head,
            HttpMethod::Options => FfiHttpMethod::Options,
        }
    }
}

impl From<FfiHttpMethod> for HttpMethod {
    fn from(m: FfiHttpMethod) -> Self {
        match m {
            FfiHttpMethod::Get => HttpMethod::Get,
            FfiHttpMethod::Post => HttpMethod::Post,
            FfiHttpMethod::Put => HttpMethod::Put,
            FfiHttpMethod::Patch => HttpMethod::Patch,
            FfiHttpMethod::Delete => HttpMethod::Delete,
            FfiHttpMethod::Head => HttpMethod::Head,
            FfiHttpMethod::Options => HttpMethod::Options,
        }
    }
}

/// How `pal_build_request` interprets its `payload` argument.
#[repr(C)]
#[derive(Clone, Copy)]
pub enum FfiPayloadKind {
    Empty = 0,
    /// Raw body text.
    Text = 1,
    /// JSON text: query parameters for GET/DELETE, body otherwise.
    Json = 2,
}

/// A single HTTP header as a key-value pair of C strings.
#[repr(C)]
pub struct FfiHeader {
    pub key: *mut c_char,
    pub value: *mut c_char,
}

/// An HTTP request described as C-compatible plain data.
///
/// Built by `pal_build_request`. The C caller either executes it itself and
/// classifies the result with `pal_classify`, or hands it to
/// `pal_client_execute`.
#[repr(C)]
pub struct FfiHttpRequest {
    pub method: FfiHttpMethod,
    pub uri: *mut c_char,
    pub headers: *mut FfiHeader,
    pub headers_len: u32,
    pub body: *mut c_char,
    /// Zero when no timeout applies.
    pub timeout_ms: u64,
}

impl FfiHttpRequest {
    /// Convert a core `HttpRequest` into a heap-allocated `FfiHttpRequest`.
    pub(crate) fn from_core(req: HttpRequest) -> *mut Self {
        let uri = to_c_string(req.uri);
        let body = req.body.map_or(std::ptr::null_mut(), to_c_string);

        let headers_len = req.headers.len() as u32;
        let headers = if req.headers.is_empty() {
            std::ptr::null_mut()
        } else {
            let ffi_headers: Box<[FfiHeader]> = req
                .headers
                .into_iter()
                .map(|(k, v)| FfiHeader {
                    key: to_c_string(k),
                    value: to_c_string(v),
                })
                .collect();
            Box::into_raw(ffi_headers) as *mut FfiHeader
        };

        let timeout_ms = req.timeout.map_or(0, |t| t.as_millis() as u64);

        Box::into_raw(Box::new(FfiHttpRequest {
            method: req.method.into(),
            uri,
            headers,
            headers_len,
            body,
            timeout_ms,
        }))
    }

    /// Read the request back into core form. `None` if the URI is missing.
    pub(crate) fn to_core(&self) -> Option<HttpRequest> {
        let uri = from_c_str(self.uri)?;
        let headers = if self.headers.is_null() || self.headers_len == 0 {
            Vec::new()
        } else {
            let slice = unsafe { std::slice::from_raw_parts(self.headers, self.headers_len as usize) };
            slice
                .iter()
                .filter_map(|h| Some((from_c_str(h.key)?, from_c_str(h.value).unwrap_or_default())))
                .collect()
        };
        Some(HttpRequest {
            method: self.method.into(),
            uri,
            headers,
            body: from_c_str(self.body),
            timeout: (self.timeout_ms > 0).then(|| Duration::from_millis(self.timeout_ms)),
        })
    }
}

// ---------------------------------------------------------------------------
// Transport outcome input (caller-provided, not heap-allocated by us)
// ---------------------------------------------------------------------------

/// Which terminal event the host observed.
#[repr(C)]
#[derive(Clone, Copy)]
pub enum FfiOutcomeKind {
    Load = 0,
    Error = 1,
    Timeout = 2,
}

/// The outcome of a request executed by the C host.
///
/// The caller constructs this on the stack and passes a pointer to
/// `pal_classify`. The FFI layer reads but does not free these fields.
/// For `Timeout`, a non-zero `status` means a partial response is known.
#[repr(C)]
pub struct FfiTransportOutcome {
    pub kind: FfiOutcomeKind,
    pub status: u16,
    pub status_text: *const c_char,
    pub body: *const c_char,
    pub error_message: *const c_char,
}

impl FfiTransportOutcome {
    pub(crate) fn to_core(&self) -> TransportOutcome {
        let response = || {
            HttpResponse::new(self.status, from_c_str(self.body).unwrap_or_default())
                .with_status_text(from_c_str(self.status_text).unwrap_or_default())
        };
        match self.kind {
            FfiOutcomeKind::Load => TransportOutcome::Load(response()),
            FfiOutcomeKind::Timeout => TransportOutcome::Timeout((self.status != 0).then(response)),
            FfiOutcomeKind::Error => TransportOutcome::Error(TransportError::new(
                from_c_str(self.error_message).unwrap_or_else(|| "transport error".to_string()),
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Error codes returned in `FfiPalResult`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    InvalidArgument = 1,
    Http = 2,
    Timeout = 3,
    Transport = 4,
    ResponseDecode = 5,
    RandomSource = 6,
    Panic = 7,
    NullArg = 8,
}

impl From<ErrorKind> for FfiErrorCode {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::InvalidArgument => FfiErrorCode::InvalidArgument,
            ErrorKind::Http => FfiErrorCode::Http,
            ErrorKind::Timeout => FfiErrorCode::Timeout,
            ErrorKind::Transport => FfiErrorCode::Transport,
            ErrorKind::ResponseDecode => FfiErrorCode::ResponseDecode,
            ErrorKind::RandomSource => FfiErrorCode::RandomSource,
        }
    }
}

/// Tag that tells `pal_free_result` what `FfiPalResult::data` points to.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiDataTag {
    None = 0,
    /// `data` is a NUL-terminated C string.
    Text = 1,
    /// `data` points to `data_len` bytes.
    Bytes = 2,
}

/// Result envelope for classify, execute and RNG operations.
///
/// On success `error_code` is `Ok`, `error_message` is null, and `data`
/// points to the payload (tagged by `data_tag`).
/// On failure `error_code` describes the category, `error_message` is a
/// human-readable C string, `endpoint`/`http_status`/`response` carry the
/// request context when there is one, and `data` is null.
#[repr(C)]
pub struct FfiPalResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub endpoint: *mut c_char,
    pub http_status: u16,
    pub response: *mut c_char,
    pub data_tag: FfiDataTag,
    pub data: *mut c_void,
    pub data_len: u32,
}

impl FfiPalResult {
    fn empty(error_code: FfiErrorCode) -> Self {
        FfiPalResult {
            error_code,
            error_message: std::ptr::null_mut(),
            endpoint: std::ptr::null_mut(),
            http_status: 0,
            response: std::ptr::null_mut(),
            data_tag: FfiDataTag::None,
            data: std::ptr::null_mut(),
            data_len: 0,
        }
    }

    /// Build a success result carrying response text.
    pub(crate) fn ok_text(text: String) -> *mut Self {
        let data_len = text.len() as u32;
        Box::into_raw(Box::new(FfiPalResult {
            data_tag: FfiDataTag::Text,
            data: to_c_string(text) as *mut c_void,
            data_len,
            ..Self::empty(FfiErrorCode::Ok)
        }))
    }

    /// Build a success result carrying raw bytes.
    pub(crate) fn ok_bytes(bytes: Vec<u8>) -> *mut Self {
        let data_len = bytes.len() as u32;
        let data = if bytes.is_empty() {
            std::ptr::null_mut()
        } else {
            Box::into_raw(bytes.into_boxed_slice()) as *mut u8 as *mut c_void
        };
        Box::into_raw(Box::new(FfiPalResult {
            data_tag: FfiDataTag::Bytes,
            data,
            data_len,
            ..Self::empty(FfiErrorCode::Ok)
        }))
    }

    /// Build an error result from a `PalError`.
    pub(crate) fn from_error(err: PalError) -> *mut Self {
        let mut result = Self::empty(err.kind().into());
        if let Some(ctx) = err.context() {
            result.endpoint = to_c_string(ctx.endpoint.clone());
            result.http_status = ctx.status.unwrap_or(0);
            result.response = ctx.response.clone().map_or(std::ptr::null_mut(), to_c_string);
        }
        result.error_message = to_c_string(err.to_string());
        Box::into_raw(Box::new(result))
    }

    /// Build an error result for a null argument.
    pub(crate) fn null_arg(name: &str) -> *mut Self {
        let mut result = Self::empty(FfiErrorCode::NullArg);
        result.error_message = to_c_string(format!("null argument: {name}"));
        Box::into_raw(Box::new(result))
    }

    /// Build an error result for a caught panic.
    pub(crate) fn panic(msg: &str) -> *mut Self {
        let mut result = Self::empty(FfiErrorCode::Panic);
        result.error_message = to_c_string(msg.to_string());
        Box::into_raw(Box::new(result))
    }
}
