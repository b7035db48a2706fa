//! Retry and back-off policy.
//!
//! Failure classification is deliberately coarse: only HTTP 200 ends the
//! loop early. Any other status and every transport failure share the same
//! linear back-off schedule.

use std::time::Duration;

use crate::{
    debug::{Debugger, Level},
    progress::ProgressSlot,
    ClientOptions, Response, TransportError,
};

/// Result of one physical attempt.
#[derive(Debug)]
pub struct AttemptOutcome {
    /// 1-based attempt index.
    pub attempt: u32,
    pub result: Result<Response, TransportError>,
    pub elapsed: Duration,
}

impl AttemptOutcome {
    /// Status code, when the transport produced a response.
    pub fn status(&self) -> Option<u16> {
        self.result.as_ref().ok().map(|response| response.status)
    }

    /// Transport error code, when no response was produced.
    pub fn error_code(&self) -> Option<&'static str> {
        self.result.as_ref().err().map(|err| err.kind.code())
    }

    pub fn is_success(&self) -> bool {
        self.status() == Some(200)
    }
}

/// Decision returned by the retry policy.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RetryDecision {
    /// Do not attempt again; the current outcome is final.
    Stop,
    /// Attempt again after the given delay.
    RetryAfter(Duration),
}

impl RetryDecision {
    pub fn is_retry(self) -> bool {
        matches!(self, Self::RetryAfter(_))
    }

    pub fn delay(self) -> Duration {
        match self {
            Self::Stop => Duration::ZERO,
            Self::RetryAfter(delay) => delay,
        }
    }
}

/// Linear back-off: the delay after failed attempt `n` is
/// `delay_multiplier * n` seconds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the first).
    pub max_attempts: u32,
    /// Back-off factor in seconds.
    pub delay_multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&ClientOptions::default())
    }
}

impl From<&ClientOptions> for RetryPolicy {
    fn from(options: &ClientOptions) -> Self {
        Self {
            max_attempts: options.max_attempts,
            delay_multiplier: options.delay_multiplier,
        }
    }
}

impl RetryPolicy {
    /// Decides what follows the attempt described by `outcome`.
    ///
    /// `attempt` is 1-based (1 = first attempt).
    pub fn decide(&self, attempt: u32, outcome: &AttemptOutcome) -> RetryDecision {
        if outcome.is_success() || attempt >= self.max_attempts {
            return RetryDecision::Stop;
        }
        RetryDecision::RetryAfter(self.delay_for(attempt))
    }

    /// Delay inserted after failed attempt `attempt`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let millis = self.delay_multiplier * f64::from(attempt) * 1000.0;
        // `as` saturates, so a huge multiplier cannot wrap.
        Duration::from_millis(millis.round() as u64)
    }
}

/// Per-request retry state: attempt counter plus reporting.
pub(crate) struct RetryEngine<'a> {
    policy: RetryPolicy,
    attempt: u32,
    debugger: &'a Debugger,
    progress: Option<&'a ProgressSlot>,
}

impl<'a> RetryEngine<'a> {
    pub(crate) fn new(
        policy: RetryPolicy,
        debugger: &'a Debugger,
        progress: Option<&'a ProgressSlot>,
    ) -> Self {
        Self {
            policy,
            attempt: 0,
            debugger,
            progress,
        }
    }

    /// Records the result of the next attempt and decides what follows.
    pub(crate) fn record(
        &mut self,
        result: Result<Response, TransportError>,
        elapsed: Duration,
    ) -> (AttemptOutcome, RetryDecision) {
        self.attempt += 1;
        let outcome = AttemptOutcome {
            attempt: self.attempt,
            result,
            elapsed,
        };
        let decision = self.policy.decide(self.attempt, &outcome);

        if outcome.is_success() {
            let fraction = self.progress.and_then(ProgressSlot::mark_succeeded);
            match fraction {
                Some((fulfilled, total)) => self.debugger.emit(
                    Level::Info,
                    format!(
                        "attempt {} succeeded ({fulfilled}/{total})",
                        outcome.attempt
                    ),
                ),
                None => self
                    .debugger
                    .emit(Level::Info, format!("attempt {} succeeded", outcome.attempt)),
            }
            return (outcome, decision);
        }

        let reason = failure_reason(&outcome);
        match decision {
            RetryDecision::Stop => self.debugger.emit(
                Level::Warn,
                format!(
                    "attempt {} failed{reason}; {} attempts exhausted",
                    outcome.attempt, self.policy.max_attempts
                ),
            ),
            RetryDecision::RetryAfter(delay) => self.debugger.emit(
                Level::Info,
                format!(
                    "attempt {} failed{reason}; retrying in {} ms",
                    outcome.attempt,
                    delay.as_millis()
                ),
            ),
        }
        (outcome, decision)
    }
}

fn failure_reason(outcome: &AttemptOutcome) -> String {
    match (outcome.status(), outcome.error_code()) {
        (Some(status), _) => format!(" with status {status}"),
        (None, Some(code)) => format!(" with error {code}"),
        (None, None) => String::new(),
    }
}
