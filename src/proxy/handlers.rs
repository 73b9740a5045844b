use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{
        header::{
            ACCEPT, ACCEPT_LANGUAGE, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
            ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_MAX_AGE, CACHE_CONTROL, CONTENT_TYPE, ETAG,
            LAST_MODIFIED, USER_AGENT,
        },
        HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri,
    },
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use url::Url;

use super::{error::ProxyError, ProxyState, PROXY_PREFIX};
use crate::client::API_KEY_HEADER;

/// Inbound headers copied to the upstream request; everything else is dropped
pub const FORWARDED_REQUEST_HEADERS: [HeaderName; 3] = [ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL];

/// Upstream headers copied to the client response besides `content-type`
pub const FORWARDED_RESPONSE_HEADERS: [HeaderName; 3] = [CACHE_CONTROL, ETAG, LAST_MODIFIED];

const PROXY_USER_AGENT: &str = concat!("volcast-proxy/", env!("CARGO_PKG_VERSION"));

fn apply_cors(headers: &mut HeaderMap) {
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, PUT, DELETE, OPTIONS"),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type, Authorization"),
    );
}

/// CORS preflight; answered locally without contacting upstream
pub async fn preflight() -> Response {
    let mut headers = HeaderMap::new();
    apply_cors(&mut headers);
    headers.insert(ACCESS_CONTROL_MAX_AGE, HeaderValue::from_static("86400"));
    (StatusCode::OK, headers).into_response()
}

/// Resolve the upstream URL for a proxied request path and query.
///
/// The endpoint is everything after the proxy prefix, resolved against the
/// base URL; the query string is carried over untouched.
pub fn target_url(base_url: &str, path: &str, query: Option<&str>) -> Result<Url, ProxyError> {
    let base = Url::parse(base_url).map_err(|e| ProxyError::Upstream(format!("invalid base URL: {}", e)))?;

    let endpoint = path
        .strip_prefix(PROXY_PREFIX)
        .unwrap_or(path)
        .trim_start_matches('/');

    let mut target = base
        .join(endpoint)
        .map_err(|e| ProxyError::InvalidEndpoint(e.to_string()))?;

    if target.origin() != base.origin() {
        return Err(ProxyError::InvalidEndpoint(format!(
            "{} does not resolve under the API base URL",
            endpoint
        )));
    }

    target.set_query(query.filter(|q| !q.is_empty()));
    Ok(target)
}

/// Forward a request to the metrics API with the server-side key injected.
pub async fn forward(
    State(state): State<Arc<ProxyState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ProxyError> {
    let (Some(base_url), Some(api_key)) = (state.base_url(), state.api_key()) else {
        tracing::error!("Proxy request rejected: upstream base URL or API key not configured");
        return Err(ProxyError::MissingConfiguration);
    };

    let target = target_url(base_url, uri.path(), uri.query())?;

    let mut request = state
        .http
        .request(method.clone(), target.clone())
        .header(API_KEY_HEADER, api_key)
        .header(CONTENT_TYPE, "application/json")
        .header(USER_AGENT, PROXY_USER_AGENT);

    for name in &FORWARDED_REQUEST_HEADERS {
        if let Some(value) = headers.get(name) {
            request = request.header(name, value.clone());
        }
    }

    if method != Method::GET && method != Method::HEAD {
        request = request.body(body);
    }

    let upstream = request.send().await.map_err(|e| {
        tracing::error!(error = %e, %method, path = target.path(), "Proxy error");
        ProxyError::from(e)
    })?;

    let status = upstream.status();
    let mut response_headers = HeaderMap::new();
    response_headers.insert(
        CONTENT_TYPE,
        upstream
            .headers()
            .get(CONTENT_TYPE)
            .cloned()
            .unwrap_or_else(|| HeaderValue::from_static("application/json")),
    );
    apply_cors(&mut response_headers);
    for name in &FORWARDED_RESPONSE_HEADERS {
        if let Some(value) = upstream.headers().get(name) {
            response_headers.insert(name.clone(), value.clone());
        }
    }

    let payload = upstream.bytes().await.map_err(|e| {
        tracing::error!(error = %e, %method, path = target.path(), "Failed to read upstream body");
        ProxyError::from(e)
    })?;

    tracing::info!(
        %method,
        path = target.path(),
        status = status.as_u16(),
        bytes = payload.len(),
        "Proxied request"
    );

    Ok((status, response_headers, payload).into_response())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyHealth {
    pub configured: bool,
    pub has_api_url: bool,
    pub has_api_key: bool,
}

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
    pub proxy: ProxyHealth,
}

pub async fn health_check(State(state): State<Arc<ProxyState>>) -> Json<HealthStatus> {
    let has_api_url = state.upstream.has_base_url();
    let has_api_key = state.upstream.has_api_key();

    Json(HealthStatus {
        status: "ok",
        timestamp: Utc::now(),
        proxy: ProxyHealth {
            configured: has_api_url && has_api_key,
            has_api_url,
            has_api_key,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_url_keeps_query_verbatim() {
        let url = target_url(
            "https://vo2.example.com/v1/",
            "/api/vo2/athletes/abc/metrics/volume",
            Some("provider=strava&sport=running&sport=cycling&startDate=2024-01-01"),
        )
        .unwrap();
        assert_eq!(
            url.as_str(),
            "https://vo2.example.com/v1/athletes/abc/metrics/volume?provider=strava&sport=running&sport=cycling&startDate=2024-01-01"
        );
    }

    #[test]
    fn test_target_url_without_query() {
        let url = target_url("https://vo2.example.com/v1/", "/api/vo2/health", Some("")).unwrap();
        assert_eq!(url.as_str(), "https://vo2.example.com/v1/health");
    }

    #[test]
    fn test_target_url_rejects_foreign_origin() {
        let err = target_url("https://vo2.example.com/v1/", "/api/vo2/https://evil.example.com/x", None)
            .unwrap_err();
        assert!(matches!(err, ProxyError::InvalidEndpoint(_)));
    }

    #[test]
    fn test_target_url_invalid_base() {
        let err = target_url("not a url", "/api/vo2/x", None).unwrap_err();
        assert!(matches!(err, ProxyError::Upstream(_)));
    }
}
