use std::fmt;

use reqwest::Url;

use crate::Params;

/// Query parameter carrying the API key.
pub const API_KEY_PARAM: &str = "api_key";
/// Query parameter carrying the target URL.
pub const URL_PARAM: &str = "url";
/// Placeholder shown instead of the API key in debug output.
pub const API_KEY_PLACEHOLDER: &str = "API_KEY";

/// HTTP method forwarded through the service.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Method {
    Get,
    Post,
    Put,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
        }
    }
}

/// Request body. Only one form can be attached to a request.
#[derive(Clone, Debug, PartialEq)]
pub enum Payload {
    /// Raw bytes sent as-is.
    Body(Vec<u8>),
    /// `application/x-www-form-urlencoded` fields.
    Form(Vec<(String, String)>),
    /// JSON document.
    Json(serde_json::Value),
}

impl Payload {
    pub fn body(bytes: impl Into<Vec<u8>>) -> Self {
        Self::Body(bytes.into())
    }

    pub fn form<I, K, V>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::Form(
            fields
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }

    pub fn json(value: serde_json::Value) -> Self {
        Self::Json(value)
    }
}

/// One logical request as the caller describes it, before defaults apply.
#[derive(Clone, Debug, PartialEq)]
pub struct ScrapeRequest {
    pub method: Method,
    pub url: String,
    pub params: Params,
    pub headers: Params,
    pub payload: Option<Payload>,
}

impl ScrapeRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            params: Params::new(),
            headers: Params::new(),
            payload: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::Get, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::Post, url)
    }

    pub fn put(url: impl Into<String>) -> Self {
        Self::new(Method::Put, url)
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key, value);
        self
    }

    /// Merges `params` over the per-call parameters set so far.
    pub fn params(mut self, params: impl Into<Params>) -> Self {
        self.params.merge(&params.into());
        self
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key, value);
        self
    }

    pub fn headers(mut self, headers: impl Into<Params>) -> Self {
        self.headers.merge(&headers.into());
        self
    }

    /// Attaches a payload, replacing any payload set earlier.
    pub fn payload(mut self, payload: Payload) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Attaches a raw body, replacing any payload set earlier.
    pub fn body(self, bytes: impl Into<Vec<u8>>) -> Self {
        self.payload(Payload::body(bytes))
    }

    /// Attaches form fields, replacing any payload set earlier.
    pub fn form<I, K, V>(self, fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.payload(Payload::form(fields))
    }

    /// Attaches a JSON document, replacing any payload set earlier.
    pub fn json(self, value: serde_json::Value) -> Self {
        self.payload(Payload::json(value))
    }
}

/// Fully merged request, ready for the transport.
#[derive(Clone, PartialEq)]
pub struct RequestDescriptor {
    pub method: Method,
    /// Service endpoint the request is sent to.
    pub endpoint: String,
    /// Page the service is asked to fetch.
    pub target: String,
    /// Final query parameters, always including `api_key` and `url`.
    pub query: Params,
    pub headers: Params,
    pub payload: Option<Payload>,
}

impl fmt::Debug for RequestDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestDescriptor")
            .field("method", &self.method)
            .field("uri", &self.effective_uri(false))
            .field("headers", &self.headers)
            .field("payload", &self.payload)
            .finish()
    }
}

impl RequestDescriptor {
    /// Merges client defaults with the per-call request.
    ///
    /// Overrides win over defaults; `api_key` and `url` are written last so
    /// callers cannot replace them.
    pub fn build(
        endpoint: &str,
        api_key: &str,
        default_params: &Params,
        default_headers: &Params,
        request: ScrapeRequest,
    ) -> Self {
        let mut query = default_params.merged(&request.params);
        query.insert(API_KEY_PARAM, api_key);
        query.insert(URL_PARAM, request.url.as_str());

        Self {
            method: request.method,
            endpoint: endpoint.to_owned(),
            target: request.url,
            query,
            headers: default_headers.merged(&request.headers),
            payload: request.payload,
        }
    }

    /// Renders the URI actually requested from the service.
    ///
    /// The API key is replaced by [`API_KEY_PLACEHOLDER`] unless `show_api_key`.
    pub fn effective_uri(&self, show_api_key: bool) -> String {
        let pairs = self.query.iter().map(|(key, value)| {
            if key == API_KEY_PARAM && !show_api_key {
                (key, API_KEY_PLACEHOLDER)
            } else {
                (key, value)
            }
        });
        match Url::parse_with_params(&self.endpoint, pairs) {
            Ok(url) => url.to_string(),
            Err(_) => self.endpoint.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{RequestDescriptor, ScrapeRequest, API_KEY_PLACEHOLDER};
    use crate::{Method, Params, Payload};

    fn build(request: ScrapeRequest) -> RequestDescriptor {
        RequestDescriptor::build(
            "https://api.scraperapi.com/",
            "secret-key",
            &Params::from([("render", "false"), ("country_code", "us")]),
            &Params::from([("X-Default", "1")]),
            request,
        )
    }

    #[test]
    fn overrides_win_and_defaults_survive() {
        let descriptor = build(
            ScrapeRequest::get("https://example.com")
                .param("render", "true")
                .header("X-Call", "2"),
        );
        assert_eq!(descriptor.query.get("render"), Some("true"));
        assert_eq!(descriptor.query.get("country_code"), Some("us"));
        assert_eq!(descriptor.headers.get("X-Default"), Some("1"));
        assert_eq!(descriptor.headers.get("X-Call"), Some("2"));
    }

    #[test]
    fn reserved_params_cannot_be_spoofed() {
        let descriptor = build(
            ScrapeRequest::get("https://example.com")
                .param("api_key", "spoofed")
                .param("url", "https://evil.example"),
        );
        assert_eq!(descriptor.query.get("api_key"), Some("secret-key"));
        assert_eq!(descriptor.query.get("url"), Some("https://example.com"));
        assert_eq!(descriptor.target, "https://example.com");
    }

    #[test]
    fn empty_overrides_keep_defaults() {
        let descriptor = build(ScrapeRequest::get("https://example.com"));
        assert_eq!(descriptor.query.len(), 4);
        assert_eq!(descriptor.headers.len(), 1);
    }

    #[test]
    fn last_payload_wins() {
        let request = ScrapeRequest::post("https://example.com")
            .form([("a", "1")])
            .json(json!({"b": 2}));
        assert_eq!(request.payload, Some(Payload::Json(json!({"b": 2}))));
        assert_eq!(request.method, Method::Post);
    }

    #[test]
    fn effective_uri_redacts_api_key() {
        let descriptor = build(ScrapeRequest::get("https://example.com"));
        let redacted = descriptor.effective_uri(false);
        assert!(!redacted.contains("secret-key"));
        assert!(redacted.contains(&format!("api_key={API_KEY_PLACEHOLDER}")));

        let shown = descriptor.effective_uri(true);
        assert!(shown.contains("api_key=secret-key"));
        assert!(shown.starts_with("https://api.scraperapi.com/?"));
    }

    #[test]
    fn debug_output_never_contains_api_key() {
        let descriptor = build(ScrapeRequest::get("https://example.com"));
        assert!(!format!("{descriptor:?}").contains("secret-key"));
    }
}
