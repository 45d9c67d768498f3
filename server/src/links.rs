//! Absolute detail URLs for todo items.

use axum::http::{HeaderMap, header};

use crate::model::TodoId;

const FORWARDED_PROTO: &str = "x-forwarded-proto";
const FORWARDED_HOST: &str = "x-forwarded-host";

/// `{scheme}://{host}` the client used to reach us. Forwarding headers win
/// over `Host`; with neither present the host is `localhost`.
pub fn request_base_url(headers: &HeaderMap) -> String {
    let scheme = header_str(headers, FORWARDED_PROTO).unwrap_or("http");
    let host = header_str(headers, FORWARDED_HOST)
        .or_else(|| header_str(headers, header::HOST.as_str()))
        .unwrap_or("localhost");
    format!("{scheme}://{host}")
}

pub fn detail_url(base_url: &str, id: TodoId) -> String {
    format!("{}/todos/{id}", base_url.trim_end_matches('/'))
}

/// First value of a possibly comma-separated header, trimmed.
fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)?
        .to_str()
        .ok()?
        .split(',')
        .next()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}
