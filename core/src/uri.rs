//! Request URI composition.

use crate::query::QueryParams;

/// Join `base`, an optional additional path and an optional query string.
///
/// A non-empty `additional_path` always adds exactly one separator: its
/// leading slashes collapse into it, so `"///"` yields a trailing `/`. The
/// base URI is used as given.
pub fn compose_uri(base: &str, additional_path: Option<&str>, query: Option<&QueryParams>) -> String {
    let mut uri = base.to_string();
    if let Some(path) = additional_path.filter(|p| !p.is_empty()) {
        uri.push('/');
        uri.push_str(path.trim_start_matches('/'));
    }
    if let Some(query) = query {
        uri.push_str(&query.to_query_string());
    }
    uri
}
