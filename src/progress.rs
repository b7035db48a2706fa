use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex, PoisonError,
};

/// Completion counters of one batch resolution.
///
/// Created fresh for every call to
/// [`ScraperClient::resolve_all`](crate::ScraperClient::resolve_all), so
/// overlapping batches from the same client never share counters.
#[derive(Debug)]
pub(crate) struct BatchProgress {
    total: usize,
    fulfilled: AtomicUsize,
}

impl BatchProgress {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            fulfilled: AtomicUsize::new(0),
        }
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn fulfilled(&self) -> usize {
        self.fulfilled.load(Ordering::SeqCst)
    }

    /// Counts one more successful request and returns the new count.
    pub fn record_success(&self) -> usize {
        self.fulfilled.fetch_add(1, Ordering::SeqCst) + 1
    }
}

#[derive(Debug, Default)]
struct SlotState {
    progress: Option<Arc<BatchProgress>>,
    succeeded: bool,
}

/// Link between one pending request and the batch that later resolves it.
///
/// A request may succeed before its batch is attached; the success is then
/// counted at attach time so `fulfilled` never loses it.
#[derive(Debug, Default)]
pub(crate) struct ProgressSlot {
    state: Mutex<SlotState>,
}

impl ProgressSlot {
    /// Links the slot to `progress`; returns `(fulfilled, total)` when the
    /// request had already succeeded and was counted just now.
    pub(crate) fn attach(&self, progress: Arc<BatchProgress>) -> Option<(usize, usize)> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let counted = state
            .succeeded
            .then(|| (progress.record_success(), progress.total()));
        state.progress = Some(progress);
        counted
    }

    /// Marks the request successful; returns `(fulfilled, total)` when a
    /// batch is attached.
    pub(crate) fn mark_succeeded(&self) -> Option<(usize, usize)> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.succeeded = true;
        state
            .progress
            .as_ref()
            .map(|progress| (progress.record_success(), progress.total()))
    }
}
