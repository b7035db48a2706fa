use std::{future::Future, time::Duration};

use crate::{Payload, RequestDescriptor, TransportError};

/// Response returned by the service for one attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Response {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    /// Body decoded as UTF-8, with invalid sequences replaced.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// First header value with the given name, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Performs a single physical HTTP exchange.
///
/// Implementations must not retry; the client drives attempts itself.
pub trait Transport: Send + Sync + 'static {
    fn send(
        &self,
        request: &RequestDescriptor,
        timeout: Duration,
    ) -> impl Future<Output = Result<Response, TransportError>> + Send;
}

/// [`Transport`] backed by a shared `reqwest::Client`.
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransport {
    http: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }

    fn build(&self, request: &RequestDescriptor, timeout: Duration) -> reqwest::RequestBuilder {
        let query: Vec<(&str, &str)> = request.query.iter().collect();
        let mut builder = self
            .http
            .request(request.method.into(), &request.endpoint)
            .query(&query)
            .timeout(timeout);

        for (name, value) in request.headers.iter() {
            builder = builder.header(name, value);
        }

        match &request.payload {
            Some(Payload::Body(bytes)) => builder.body(bytes.clone()),
            Some(Payload::Form(fields)) => builder.form(fields),
            Some(Payload::Json(value)) => builder.json(value),
            None => builder,
        }
    }
}

impl Transport for ReqwestTransport {
    fn send(
        &self,
        request: &RequestDescriptor,
        timeout: Duration,
    ) -> impl Future<Output = Result<Response, TransportError>> + Send {
        let builder = self.build(request, timeout);
        async move {
            let response = builder.send().await?;
            let status = response.status().as_u16();
            let headers = response
                .headers()
                .iter()
                .filter_map(|(name, value)| {
                    value
                        .to_str()
                        .ok()
                        .map(|value| (name.as_str().to_owned(), value.to_owned()))
                })
                .collect();
            let body = response.bytes().await?.to_vec();
            Ok::<_, TransportError>(Response {
                status,
                headers,
                body,
            })
        }
    }
}
