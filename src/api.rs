//! JSON REST client with merged default headers and optional debug logging.

use crate::error::{QbError, QbResult};
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde_json::Value as Json;
use std::time::Duration;

pub use reqwest::Method;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// A small client for JSON APIs.
///
/// Headers resolve in three layers: `Content-Type: application/json`
/// baseline, then the client's default headers, then per-call headers —
/// later layers win.
pub struct ApiClient {
    http: reqwest::Client,
    default_headers: HeaderMap,
    debug: bool,
}

impl ApiClient {
    /// Create a client with no default headers.
    pub fn new() -> QbResult<Self> {
        Self::with_headers(HeaderMap::new())
    }

    /// Create a client with default headers applied to every request.
    pub fn with_headers(default_headers: HeaderMap) -> QbResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            default_headers,
            debug: false,
        })
    }

    /// Replace the default headers.
    pub fn set_default_headers(&mut self, headers: HeaderMap) {
        self.default_headers = headers;
    }

    /// Toggle debug logging of requests and responses (via `tracing`).
    pub fn enable_debug(&mut self, debug: bool) {
        self.debug = debug;
    }

    /// Send a request and decode the JSON response body.
    ///
    /// GET encodes `data` (a flat JSON object of scalars) as query
    /// parameters; POST and PUT send it as a JSON body; DELETE ignores it.
    pub async fn request(
        &self,
        url: &str,
        method: Method,
        data: Option<&Json>,
        headers: HeaderMap,
    ) -> QbResult<Json> {
        if self.debug {
            tracing::debug!(
                url,
                method = %method,
                payload = %data.map(Json::to_string).unwrap_or_default(),
                "dispatching request"
            );
        }

        let mut request = if method == Method::GET {
            let builder = self.http.get(url);
            match data {
                Some(d) => builder.query(&query_pairs(d)?),
                None => builder,
            }
        } else if method == Method::POST || method == Method::PUT {
            let builder = self.http.request(method, url);
            match data {
                Some(d) => builder.json(d),
                None => builder,
            }
        } else {
            self.http.request(method, url)
        };
        request = request.headers(self.merged_headers(headers));

        let response = request.send().await?;
        let status = response.status();
        let body: Json = response.json().await?;

        if self.debug {
            tracing::debug!(status = %status, body = %body, "received response");
        }
        Ok(body)
    }

    /// GET a resource collection.
    pub async fn fetch_all(&self, url: &str, headers: HeaderMap) -> QbResult<Json> {
        self.request(url, Method::GET, None, headers).await
    }

    /// POST a new resource.
    pub async fn create(&self, url: &str, data: &Json, headers: HeaderMap) -> QbResult<Json> {
        self.request(url, Method::POST, Some(data), headers).await
    }

    /// PUT an updated resource.
    pub async fn update(&self, url: &str, data: &Json, headers: HeaderMap) -> QbResult<Json> {
        self.request(url, Method::PUT, Some(data), headers).await
    }

    /// DELETE a resource.
    pub async fn delete(&self, url: &str, headers: HeaderMap) -> QbResult<Json> {
        self.request(url, Method::DELETE, None, headers).await
    }

    fn merged_headers(&self, headers: HeaderMap) -> HeaderMap {
        let mut merged = HeaderMap::new();
        merged.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        merged.extend(self.default_headers.clone());
        merged.extend(headers);
        merged
    }
}

/// Flatten a JSON object of scalars into query-string pairs.
fn query_pairs(data: &Json) -> QbResult<Vec<(String, String)>> {
    let object = data
        .as_object()
        .ok_or_else(|| QbError::usage("GET payload must be a JSON object"))?;
    object
        .iter()
        .map(|(key, value)| {
            let rendered = match value {
                Json::String(s) => s.clone(),
                Json::Number(n) => n.to_string(),
                Json::Bool(b) => b.to_string(),
                Json::Null => String::new(),
                _ => {
                    return Err(QbError::usage(format!(
                        "GET payload value for '{key}' must be a scalar"
                    )));
                }
            };
            Ok((key.clone(), rendered))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn query_pairs_flattens_scalars() {
        let pairs = query_pairs(&json!({"page": 2, "q": "bob", "active": true})).unwrap();
        assert!(pairs.contains(&("page".to_string(), "2".to_string())));
        assert!(pairs.contains(&("q".to_string(), "bob".to_string())));
        assert!(pairs.contains(&("active".to_string(), "true".to_string())));
    }

    #[test]
    fn query_pairs_rejects_nested_values() {
        assert!(query_pairs(&json!({"filter": {"a": 1}})).unwrap_err().is_usage());
        assert!(query_pairs(&json!([1, 2])).unwrap_err().is_usage());
    }

    #[test]
    fn per_call_headers_win_over_defaults() {
        let mut defaults = HeaderMap::new();
        defaults.insert("x-api-key", HeaderValue::from_static("default"));
        let client = ApiClient::with_headers(defaults).unwrap();

        let mut per_call = HeaderMap::new();
        per_call.insert("x-api-key", HeaderValue::from_static("override"));
        let merged = client.merged_headers(per_call);

        assert_eq!(merged.get("x-api-key").unwrap(), "override");
        assert_eq!(merged.get(CONTENT_TYPE).unwrap(), "application/json");
    }

    #[test]
    fn content_type_can_be_overridden() {
        let client = ApiClient::new().unwrap();
        let mut per_call = HeaderMap::new();
        per_call.insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        let merged = client.merged_headers(per_call);
        assert_eq!(merged.get(CONTENT_TYPE).unwrap(), "text/plain");
    }
}
