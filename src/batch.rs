use std::sync::Arc;

use tokio::{
    task::{JoinHandle, JoinSet},
    time::Instant,
};

use crate::{
    debug::Level,
    progress::{BatchProgress, ProgressSlot},
    RequestDescriptor, Response, Result, ScrapeRequest, ScraperClient, ScraperError, Transport,
};

/// Handle to a request that is already in flight.
///
/// Dropping the handle does not cancel the request.
#[derive(Debug)]
pub struct PendingRequest {
    handle: JoinHandle<Result<Response>>,
    progress: Arc<ProgressSlot>,
}

impl PendingRequest {
    /// Whether the request reached its final outcome.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Waits for this request alone.
    pub async fn wait(self) -> Result<Response> {
        self.handle
            .await
            .map_err(|err| ScraperError::Task(err.to_string()))?
    }
}

/// Responses of a resolved batch, in the caller's order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BatchResults {
    entries: Vec<(String, Response)>,
}

impl BatchResults {
    /// First response stored under `key`.
    pub fn get(&self, key: &str) -> Option<&Response> {
        self.entries
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, response)| response)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Response)> {
        self.entries
            .iter()
            .map(|(name, response)| (name.as_str(), response))
    }
}

impl IntoIterator for BatchResults {
    type Item = (String, Response);
    type IntoIter = std::vec::IntoIter<(String, Response)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<T: Transport> ScraperClient<T> {
    /// Dispatches `request` immediately and returns a handle to it.
    ///
    /// Must be called from within a tokio runtime.
    pub fn enqueue(&self, request: ScrapeRequest) -> PendingRequest {
        let descriptor = self.descriptor(request);
        self.enqueue_descriptor(descriptor)
    }

    /// Like [`ScraperClient::enqueue`], for an already merged request.
    pub fn enqueue_descriptor(&self, request: RequestDescriptor) -> PendingRequest {
        let client = self.clone();
        let progress = Arc::new(ProgressSlot::default());
        let slot = Arc::clone(&progress);
        let handle = tokio::spawn(async move { client.run(&request, Some(&*slot)).await });
        PendingRequest { handle, progress }
    }

    /// Waits for every pending request and returns their responses keyed
    /// as given.
    ///
    /// Fails with the first terminal error observed. Requests still running
    /// at that point are not cancelled; they finish on their own.
    pub async fn resolve_all<I, K>(&self, pending: I) -> Result<BatchResults>
    where
        I: IntoIterator<Item = (K, PendingRequest)>,
        K: Into<String>,
    {
        let pending: Vec<(String, PendingRequest)> = pending
            .into_iter()
            .map(|(key, request)| (key.into(), request))
            .collect();
        if pending.is_empty() {
            return Ok(BatchResults::default());
        }

        let debugger = self.debugger();
        let started = Instant::now();
        let progress = Arc::new(BatchProgress::new(pending.len()));
        debugger.emit(
            Level::Info,
            format!("resolving batch of {} requests", progress.total()),
        );

        let mut keys = Vec::with_capacity(pending.len());
        let mut joins = JoinSet::new();
        for (index, (key, request)) in pending.into_iter().enumerate() {
            if let Some((fulfilled, total)) = request.progress.attach(Arc::clone(&progress)) {
                debugger.emit(
                    Level::Info,
                    format!("request '{key}' already succeeded ({fulfilled}/{total})"),
                );
            }
            keys.push(key);
            joins.spawn(async move { (index, request.handle.await) });
        }

        let mut responses: Vec<Option<Response>> = vec![None; keys.len()];
        while let Some(joined) = joins.join_next().await {
            let (index, finished) = joined.map_err(|err| ScraperError::Task(err.to_string()))?;
            match finished {
                Ok(Ok(response)) => responses[index] = Some(response),
                Ok(Err(err)) => {
                    debugger.emit(
                        Level::Error,
                        format!("batch failed on request '{}': {err}", keys[index]),
                    );
                    return Err(err);
                }
                Err(err) => {
                    return Err(ScraperError::Task(format!(
                        "request '{}' did not complete: {err}",
                        keys[index]
                    )))
                }
            }
        }

        debugger.emit(
            Level::Info,
            format!(
                "batch resolved ({}/{}) in {} ms",
                progress.fulfilled(),
                progress.total(),
                started.elapsed().as_millis()
            ),
        );

        let entries = keys
            .into_iter()
            .zip(responses)
            .map(|(key, response)| response.map(|response| (key, response)))
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| ScraperError::Task("batch result missing a response".to_owned()))?;
        Ok(BatchResults { entries })
    }
}
