//! Convergence loop
//!
//! Polls an [`EventSource`] until every expected name shows up in the
//! filtered result, the retry budget runs out, or a poll fails.
//!
//! ```text
//! POLLING --expected ⊆ observed--> CONVERGED
//! POLLING --budget spent--------> TIMED_OUT
//! POLLING --poll error----------> FAILED
//! POLLING --otherwise: sleep----> POLLING
//! ```
//!
//! The first poll is immediate and does not consume the budget, so a policy
//! with `max_retries = n` polls at most `n + 1` times.

use chrono::TimeDelta;
use std::borrow::Cow;
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use vigil_client::ClientError;
use vigil_core::domain::predicate::Predicate;
use vigil_core::domain::query::EventQuery;

use crate::clock::Clock;
use crate::error::WatchError;
use crate::source::EventSource;

/// Poll cadence and retry budget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Wait between two polls
    pub poll_interval: Duration,
    /// Polls allowed after the first one
    pub max_retries: u32,
}

impl RetryPolicy {
    pub fn new(poll_interval: Duration, max_retries: u32) -> Self {
        Self {
            poll_interval,
            max_retries,
        }
    }

    /// Upper bound on polls, counting the immediate first one
    pub fn max_polls(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Total time spent waiting if the loop never converges
    ///
    /// `None` when the product does not fit in a `Duration`.
    pub fn budget(&self) -> Option<Duration> {
        self.poll_interval.checked_mul(self.max_retries)
    }
}

impl Default for RetryPolicy {
    /// Five minutes between polls, twelve retries: about an hour
    fn default() -> Self {
        Self::new(Duration::from_secs(5 * 60), 12)
    }
}

/// State of the convergence state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvergenceState {
    Polling,
    Converged,
    TimedOut,
    Failed,
}

/// What a single successful poll saw
#[derive(Debug)]
pub struct PollReport<'a> {
    /// 1-based poll number
    pub iteration: u32,
    /// Names passing the predicate, in server order
    pub observed: &'a [String],
    /// Expected names not observed yet, in expected order
    pub missing: &'a [String],
    /// Retries still available after this poll
    pub retries_left: u32,
}

/// Receives progress while the loop runs
pub trait ProgressSink: Send {
    /// Called after every successful poll
    fn on_poll(&mut self, report: &PollReport<'_>);

    /// Called before the loop waits for the next poll
    fn on_wait(&mut self, _delay: Duration, _retries_left: u32) {}
}

/// Discards all progress
#[derive(Debug, Default)]
pub struct SilentProgress;

impl ProgressSink for SilentProgress {
    fn on_poll(&mut self, _report: &PollReport<'_>) {}
}

/// Terminal result of [`ConvergenceLoop::wait_for_completion`]
#[derive(Debug)]
pub enum Outcome {
    /// Every expected name was observed
    Converged { observed: Vec<String>, polls: u32 },
    /// Budget spent; `observed` is what the last poll saw
    TimedOut {
        observed: Vec<String>,
        missing: Vec<String>,
        polls: u32,
    },
    /// A poll failed; the loop stopped without retrying
    Failed { error: ClientError, polls: u32 },
}

impl Outcome {
    pub fn state(&self) -> ConvergenceState {
        match self {
            Outcome::Converged { .. } => ConvergenceState::Converged,
            Outcome::TimedOut { .. } => ConvergenceState::TimedOut,
            Outcome::Failed { .. } => ConvergenceState::Failed,
        }
    }

    /// Polls performed, including the failing one
    pub fn polls(&self) -> u32 {
        match self {
            Outcome::Converged { polls, .. }
            | Outcome::TimedOut { polls, .. }
            | Outcome::Failed { polls, .. } => *polls,
        }
    }

    /// Polls beyond the first
    pub fn retries_consumed(&self) -> u32 {
        self.polls().saturating_sub(1)
    }

    /// Names seen by the last successful poll
    pub fn observed(&self) -> &[String] {
        match self {
            Outcome::Converged { observed, .. } | Outcome::TimedOut { observed, .. } => observed,
            Outcome::Failed { .. } => &[],
        }
    }

    /// Observed names on convergence, a typed error otherwise
    pub fn into_result(self) -> Result<Vec<String>, WatchError> {
        match self {
            Outcome::Converged { observed, .. } => Ok(observed),
            Outcome::TimedOut { missing, polls, .. } => {
                Err(WatchError::TimeoutExceeded { polls, missing })
            }
            Outcome::Failed { error, .. } => Err(error.into()),
        }
    }
}

/// Expected names absent from `observed`, in expected order
pub fn missing_names(expected: &[String], observed: &[String]) -> Vec<String> {
    let seen: HashSet<&str> = observed.iter().map(String::as_str).collect();
    expected
        .iter()
        .filter(|name| !seen.contains(name.as_str()))
        .cloned()
        .collect()
}

/// Repeatedly polls a source until the expected names converge
pub struct ConvergenceLoop<S, C> {
    source: S,
    clock: C,
    policy: RetryPolicy,
    sliding_window: Option<TimeDelta>,
}

impl<S: EventSource, C: Clock> ConvergenceLoop<S, C> {
    /// Creates a loop sending the query template unchanged on every poll
    pub fn new(source: S, clock: C, policy: RetryPolicy) -> Self {
        Self {
            source,
            clock,
            policy,
            sliding_window: None,
        }
    }

    /// Re-anchors the time window to `[now - lookback, now]` before each poll
    pub fn with_sliding_window(mut self, lookback: TimeDelta) -> Self {
        self.sliding_window = Some(lookback);
        self
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Runs the loop to a terminal state
    ///
    /// # Arguments
    /// * `expected` - Names that must all be observed
    /// * `template` - Query sent on each poll (window adjusted when sliding)
    /// * `predicate` - Classifies entities; only passing names count as observed
    /// * `progress` - Receives a report after each poll
    pub async fn wait_for_completion(
        &self,
        expected: &[String],
        template: &EventQuery,
        predicate: &Predicate,
        progress: &mut dyn ProgressSink,
    ) -> Outcome {
        info!(
            expected = expected.len(),
            predicate = predicate.name(),
            interval = ?self.policy.poll_interval,
            max_polls = self.policy.max_polls(),
            "Waiting for convergence"
        );

        let mut state = ConvergenceState::Polling;
        let mut polls = 0;
        let mut retries_left = self.policy.max_retries;
        let mut observed = Vec::new();
        let mut missing = Vec::new();
        let mut failure = None;

        while state == ConvergenceState::Polling {
            polls += 1;
            let query = self.query_for_poll(template);
            debug!(poll = polls, "Polling event source");

            state = match self.source.fetch(&query, predicate).await {
                Err(err) => {
                    error!(poll = polls, "Poll failed: {}", err);
                    failure = Some(err);
                    ConvergenceState::Failed
                }
                Ok(entities) => {
                    observed = entities.into_iter().map(|e| e.name).collect();
                    missing = missing_names(expected, &observed);

                    progress.on_poll(&PollReport {
                        iteration: polls,
                        observed: &observed,
                        missing: &missing,
                        retries_left,
                    });

                    if missing.is_empty() {
                        info!(polls, "All {} expected name(s) observed", expected.len());
                        ConvergenceState::Converged
                    } else if retries_left == 0 {
                        warn!(polls, missing = ?missing, "Retry budget exhausted");
                        ConvergenceState::TimedOut
                    } else {
                        retries_left -= 1;
                        debug!(
                            missing = missing.len(),
                            retries_left,
                            "Not converged, sleeping {:?}",
                            self.policy.poll_interval
                        );
                        progress.on_wait(self.policy.poll_interval, retries_left);
                        self.clock.sleep(self.policy.poll_interval).await;
                        ConvergenceState::Polling
                    }
                }
            };
        }

        match (state, failure) {
            (_, Some(error)) => Outcome::Failed { error, polls },
            (ConvergenceState::Converged, None) => Outcome::Converged { observed, polls },
            _ => Outcome::TimedOut {
                observed,
                missing,
                polls,
            },
        }
    }

    fn query_for_poll<'q>(&self, template: &'q EventQuery) -> Cow<'q, EventQuery> {
        match self.sliding_window {
            Some(lookback) => {
                let now = self.clock.now();
                match template.clone().with_lookback(now, lookback) {
                    Some(query) => Cow::Owned(query),
                    None => {
                        // Lookback reaches past the earliest date; leave the start open
                        warn!(?lookback, "Lookback out of range, sending an open start");
                        let mut query = template.clone();
                        query.start = None;
                        query.end = Some(now);
                        Cow::Owned(query)
                    }
                }
            }
            None => Cow::Borrowed(template),
        }
    }
}
