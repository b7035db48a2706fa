use std::{fmt, sync::Arc, time::Duration};

use tokio::time::{sleep, Instant};

use crate::{
    debug::{DebugSink, Debugger, Level, StdoutSink},
    error::truncate_body,
    progress::ProgressSlot,
    request::API_KEY_PARAM,
    retry::{AttemptOutcome, RetryDecision, RetryEngine, RetryPolicy},
    wire, AccountInfo, ClientOptions, Method, Params, Payload, ReqwestTransport,
    RequestDescriptor, Response, Result, ScrapeRequest, ScraperError, Transport,
};

/// Default service endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.scraperapi.com/";

/// Client for the scraping proxy API.
///
/// Configuration is fixed once requests start; use
/// [`ScraperClient::derive_with`] to get a client with different defaults.
pub struct ScraperClient<T = ReqwestTransport> {
    transport: Arc<T>,
    endpoint: String,
    api_key: String,
    options: ClientOptions,
    default_params: Params,
    default_headers: Params,
    sink: Option<Arc<dyn DebugSink>>,
}

impl<T> Clone for ScraperClient<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            endpoint: self.endpoint.clone(),
            api_key: self.api_key.clone(),
            options: self.options.clone(),
            default_params: self.default_params.clone(),
            default_headers: self.default_headers.clone(),
            sink: self.sink.clone(),
        }
    }
}

impl<T> fmt::Debug for ScraperClient<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScraperClient")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .field("options", &self.options)
            .field("default_params", &self.default_params)
            .field("default_headers", &self.default_headers)
            .finish()
    }
}

impl ScraperClient {
    /// Creates a client for the default endpoint.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_endpoint(DEFAULT_ENDPOINT, api_key)
    }

    /// Creates a client for a custom endpoint, e.g. a regional or mock one.
    pub fn with_endpoint(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self::with_transport(endpoint, api_key, ReqwestTransport::default())
    }

    /// Creates a client from environment variables.
    ///
    /// Reads:
    /// - `SCRAPERAPI_KEY`: API key (required)
    /// - `SCRAPERAPI_ENDPOINT`: endpoint override (optional)
    ///
    /// # Example
    ///
    /// ```no_run
    /// use scraperapi_http::ScraperClient;
    ///
    /// let client = ScraperClient::from_env().expect("missing SCRAPERAPI_KEY");
    /// ```
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("SCRAPERAPI_KEY").map_err(|_| {
            ScraperError::Configuration("missing SCRAPERAPI_KEY environment variable".to_owned())
        })?;
        if api_key.trim().is_empty() {
            return Err(ScraperError::Configuration(
                "SCRAPERAPI_KEY is set but empty".to_owned(),
            ));
        }
        let endpoint = std::env::var("SCRAPERAPI_ENDPOINT")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_owned());
        Ok(Self::with_endpoint(endpoint, api_key.trim()))
    }
}

impl<T: Transport> ScraperClient<T> {
    /// Creates a client over a custom [`Transport`].
    pub fn with_transport(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        transport: T,
    ) -> Self {
        Self {
            transport: Arc::new(transport),
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            options: ClientOptions::default(),
            default_params: Params::new(),
            default_headers: Params::new(),
            sink: None,
        }
    }

    /// Applies timeout, retry and debug options.
    pub fn with_options(mut self, opts: ClientOptions) -> Result<Self> {
        opts.validate()?;
        self.options = opts;
        Ok(self)
    }

    /// Merges `params` into the parameters sent with every request.
    pub fn with_default_params(mut self, params: impl Into<Params>) -> Self {
        self.default_params.merge(&params.into());
        self
    }

    /// Merges `headers` into the headers sent with every request.
    pub fn with_default_headers(mut self, headers: impl Into<Params>) -> Self {
        self.default_headers.merge(&headers.into());
        self
    }

    /// Routes debug messages to `sink` instead of standard output.
    ///
    /// Messages are only produced when [`ClientOptions::debug`] is set.
    pub fn with_debug_sink(mut self, sink: Arc<dyn DebugSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Returns a new client sharing this one's transport, with extra defaults.
    pub fn derive_with(&self, params: impl Into<Params>, headers: impl Into<Params>) -> Self {
        self.clone()
            .with_default_params(params)
            .with_default_headers(headers)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    pub fn default_params(&self) -> &Params {
        &self.default_params
    }

    pub fn default_headers(&self) -> &Params {
        &self.default_headers
    }

    /// Merges client defaults into `request`.
    pub fn descriptor(&self, request: ScrapeRequest) -> RequestDescriptor {
        RequestDescriptor::build(
            &self.endpoint,
            &self.api_key,
            &self.default_params,
            &self.default_headers,
            request,
        )
    }

    /// Sends one request and waits for its final outcome.
    pub async fn send(&self, request: ScrapeRequest) -> Result<Response> {
        let descriptor = self.descriptor(request);
        self.execute(&descriptor).await
    }

    pub async fn get(&self, url: impl Into<String>) -> Result<Response> {
        self.send(ScrapeRequest::get(url)).await
    }

    pub async fn post(&self, url: impl Into<String>, payload: Payload) -> Result<Response> {
        self.send(ScrapeRequest::post(url).payload(payload)).await
    }

    pub async fn put(&self, url: impl Into<String>, payload: Payload) -> Result<Response> {
        self.send(ScrapeRequest::put(url).payload(payload)).await
    }

    /// Runs an already merged request under the retry policy.
    pub async fn execute(&self, request: &RequestDescriptor) -> Result<Response> {
        self.run(request, None).await
    }

    /// Fetches the raw account usage document.
    pub async fn account(&self) -> Result<String> {
        let response = self.execute(&self.account_descriptor()).await?;
        Ok(response.text())
    }

    /// Fetches and decodes the account usage document.
    pub async fn account_info(&self) -> Result<AccountInfo> {
        let body = self.account().await?;
        wire::decode_account(&body)
    }

    fn account_descriptor(&self) -> RequestDescriptor {
        let endpoint = format!("{}/account", self.endpoint.trim_end_matches('/'));
        let mut query = Params::new();
        query.insert(API_KEY_PARAM, self.api_key.as_str());
        RequestDescriptor {
            method: Method::Get,
            target: endpoint.clone(),
            endpoint,
            query,
            headers: self.default_headers.clone(),
            payload: None,
        }
    }

    pub(crate) fn debugger(&self) -> Debugger {
        if !self.options.debug {
            return Debugger::default();
        }
        let sink = self
            .sink
            .clone()
            .unwrap_or_else(|| Arc::new(StdoutSink) as Arc<dyn DebugSink>);
        Debugger::new(Some(sink))
    }

    pub(crate) async fn run(
        &self,
        request: &RequestDescriptor,
        progress: Option<&ProgressSlot>,
    ) -> Result<Response> {
        let debugger = self.debugger();
        let timeout = Duration::from_millis(self.options.timeout_ms);
        let started = Instant::now();
        let mut engine = RetryEngine::new(RetryPolicy::from(&self.options), &debugger, progress);

        debugger.emit(
            Level::Info,
            format!("starting {} request for {}", request.method, request.target),
        );

        loop {
            let attempt_started = Instant::now();
            let result = self.transport.send(request, timeout).await;
            let elapsed = attempt_started.elapsed();

            if debugger.is_enabled() {
                debugger.emit(
                    Level::Debug,
                    format!(
                        "{} {} in {} ms",
                        request.method,
                        self.display_uri(request),
                        elapsed.as_millis()
                    ),
                );
            }

            let (outcome, decision) = engine.record(result, elapsed);
            match decision {
                RetryDecision::RetryAfter(delay) => self.wait_before_retry(delay).await,
                RetryDecision::Stop => {
                    debugger.emit(
                        Level::Info,
                        format!(
                            "finished {} request for {} after {} attempt(s) in {} ms",
                            request.method,
                            request.target,
                            outcome.attempt,
                            started.elapsed().as_millis()
                        ),
                    );
                    return self.finish(outcome);
                }
            }
        }
    }

    fn display_uri(&self, request: &RequestDescriptor) -> String {
        request.effective_uri(self.options.show_api_key)
    }

    // Only a 200 is a success; any other final status is an HTTP error.
    fn finish(&self, outcome: AttemptOutcome) -> Result<Response> {
        let succeeded = outcome.is_success();
        match outcome.result {
            Ok(response) if succeeded => Ok(response),
            Ok(response) => Err(ScraperError::Http {
                status: response.status,
                body: truncate_body(&response.text(), self.options.max_error_length),
            }),
            Err(err) => Err(ScraperError::Transport(err)),
        }
    }

    async fn wait_before_retry(&self, delay: Duration) {
        #[cfg(feature = "tracing")]
        tracing::debug!("retrying scrape request after {} ms", delay.as_millis());

        sleep(delay).await;
    }
}

#[cfg(test)]
mod tests {
    use super::{ScraperClient, DEFAULT_ENDPOINT};
    use crate::{ClientOptions, Params, ScrapeRequest, ScraperError};

    #[test]
    fn debug_redacts_api_key() {
        let client = ScraperClient::new("secret-key");
        let debug = format!("{client:?}");
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains("secret-key"));
    }

    #[test]
    fn invalid_options_are_rejected() {
        let result = ScraperClient::new("key").with_options(ClientOptions {
            max_attempts: 0,
            ..ClientOptions::default()
        });
        assert!(matches!(result, Err(ScraperError::Configuration(_))));
    }

    #[test]
    fn derive_with_leaves_original_untouched() {
        let base = ScraperClient::new("key").with_default_params([("country_code", "us")]);
        let derived = base.derive_with([("render", "true")], [("X-Trace", "1")]);

        assert_eq!(base.default_params(), &Params::from([("country_code", "us")]));
        assert_eq!(
            derived.default_params(),
            &Params::from([("country_code", "us"), ("render", "true")])
        );
        assert_eq!(derived.default_headers().get("X-Trace"), Some("1"));
        assert!(base.default_headers().is_empty());
    }

    #[test]
    fn descriptor_targets_endpoint_with_reserved_params() {
        let client = ScraperClient::new("key");
        let descriptor = client.descriptor(ScrapeRequest::get("https://example.com"));
        assert_eq!(descriptor.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(descriptor.query.get("api_key"), Some("key"));
        assert_eq!(descriptor.query.get("url"), Some("https://example.com"));
    }

    #[test]
    fn account_descriptor_has_only_api_key() {
        let client = ScraperClient::with_endpoint("http://127.0.0.1:9/", "key");
        let descriptor = client.account_descriptor();
        assert_eq!(descriptor.endpoint, "http://127.0.0.1:9/account");
        assert_eq!(descriptor.query, Params::from([("api_key", "key")]));
    }

    #[test]
    fn display_uri_only_redacts_the_api_key_param() {
        let client = ScraperClient::new("1");
        let descriptor = client.descriptor(
            ScrapeRequest::get("https://example.com/page1").param("session_number", "1"),
        );

        let uri = client.display_uri(&descriptor);
        assert!(uri.contains("api_key=API_KEY"));
        assert!(uri.contains("session_number=1"));
        assert!(uri.contains("page1"));
    }
}
