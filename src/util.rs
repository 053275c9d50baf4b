//! Shared request helpers.

use axum::http::HeaderMap;

/// Extract the client IP from proxy headers.
///
/// Tries `x-forwarded-for` first (for proxied requests), then `x-real-ip`.
pub fn client_ip(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .or_else(|| headers.get("x-real-ip"))
        .and_then(|v| v.to_str().ok())
        .map(String::from)
}

/// Render request headers as a JSON object string for the webhook log.
/// Non-UTF-8 header values are dropped.
pub fn headers_to_json(headers: &HeaderMap) -> String {
    let map: serde_json::Map<String, serde_json::Value> = headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), serde_json::Value::from(v)))
        })
        .collect();
    serde_json::Value::Object(map).to_string()
}
