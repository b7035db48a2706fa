//! `scraperapi-http` is an async client for the ScraperAPI web-scraping proxy.
//!
//! Requests are forwarded through the service with the API key and target
//! URL as query parameters, retried with linear back-off, and can be run
//! one at a time or dispatched concurrently and resolved as a batch:
//! - [`ScraperClient::send`], [`ScraperClient::get`], [`ScraperClient::post`],
//!   [`ScraperClient::put`]
//! - [`ScraperClient::enqueue`] + [`ScraperClient::resolve_all`]
//! - [`ScraperClient::account`]

mod batch;
mod client;
mod debug;
mod error;
mod options;
mod params;
mod progress;
mod request;
mod retry;
mod transport;
mod types;
mod wire;

pub use batch::{BatchResults, PendingRequest};
pub use client::{ScraperClient, DEFAULT_ENDPOINT};
#[cfg(feature = "tracing")]
pub use debug::TracingSink;
pub use debug::{DebugSink, Level, StdoutSink};
pub use error::{ScraperError, TransportError, TransportErrorKind};
pub use options::ClientOptions;
pub use params::{DeviceType, Params, ScrapeParams};
pub use request::{Method, Payload, RequestDescriptor, ScrapeRequest, API_KEY_PLACEHOLDER};
pub use retry::{AttemptOutcome, RetryDecision, RetryPolicy};
pub use transport::{ReqwestTransport, Response, Transport};
pub use types::AccountInfo;

pub type Result<T> = std::result::Result<T, ScraperError>;
