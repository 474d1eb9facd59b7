//! Retry policy for the transport.
//!
//! Two independent budgets apply to each logical call: one forced token
//! refresh after a 401, and `max_retries` backoff replays after a
//! transient failure (no response, HTTP 5xx, or HTTP 429).

use std::time::Duration;

/// Configuration for retry behavior.
///
/// The delay before transient replay `n` (starting at 0) is
/// `base_delay * 2^n`, capped at `max_delay`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Transient-failure replays per call (default: 1)
    pub max_retries: u32,
    /// Delay before the first replay (default: 1s)
    pub base_delay: Duration,
    /// Upper bound on any single delay (default: 10s)
    pub max_delay: Duration,
    /// Refresh the token and replay once on HTTP 401 (default: true)
    pub refresh_on_unauthorized: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 1,
            base_delay: Duration::from_millis(1000),
            max_delay: Duration::from_millis(10_000),
            refresh_on_unauthorized: true,
        }
    }
}

impl RetryPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Default policy with a custom transient budget
    pub fn with_max_retries(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Self::default()
        }
    }

    /// Policy that never replays
    pub fn disabled() -> Self {
        Self {
            max_retries: 0,
            refresh_on_unauthorized: false,
            ..Self::default()
        }
    }

    /// Backoff before transient replay number `attempt`
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.base_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }
}

/// How a failed attempt should be treated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FailureKind {
    /// HTTP 401
    Unauthorized,
    /// No response, HTTP 5xx, or HTTP 429
    Transient,
    /// Anything else
    Terminal,
}

impl FailureKind {
    pub(crate) fn from_status(status: u16) -> Self {
        match status {
            401 => FailureKind::Unauthorized,
            429 => FailureKind::Transient,
            s if s >= 500 => FailureKind::Transient,
            _ => FailureKind::Terminal,
        }
    }
}

/// What to do after a failed attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Step {
    RefreshAndReplay,
    BackoffAndReplay(Duration),
    Fail,
}

/// Budgets consumed so far by one logical call
#[derive(Debug, Default)]
pub(crate) struct RetryState {
    refreshed: bool,
    transient_retries: u32,
}

impl RetryState {
    pub(crate) fn next_step(&mut self, policy: &RetryPolicy, failure: FailureKind) -> Step {
        match failure {
            FailureKind::Unauthorized if policy.refresh_on_unauthorized && !self.refreshed => {
                self.refreshed = true;
                Step::RefreshAndReplay
            }
            FailureKind::Transient if self.transient_retries < policy.max_retries => {
                let delay = policy.delay_for_attempt(self.transient_retries);
                self.transient_retries += 1;
                Step::BackoffAndReplay(delay)
            }
            _ => Step::Fail,
        }
    }

    /// Replays performed so far
    pub(crate) fn replays(&self) -> u32 {
        self.transient_retries + u32::from(self.refreshed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delay_progression_is_capped() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for_attempt(0), Duration::from_millis(1000));
        assert_eq!(policy.delay_for_attempt(1), Duration::from_millis(2000));
        assert_eq!(policy.delay_for_attempt(3), Duration::from_millis(8000));
        assert_eq!(policy.delay_for_attempt(4), Duration::from_millis(10_000));
        assert_eq!(policy.delay_for_attempt(40), Duration::from_millis(10_000));
    }

    #[test]
    fn test_status_classification() {
        assert_eq!(FailureKind::from_status(401), FailureKind::Unauthorized);
        assert_eq!(FailureKind::from_status(429), FailureKind::Transient);
        assert_eq!(FailureKind::from_status(500), FailureKind::Transient);
        assert_eq!(FailureKind::from_status(503), FailureKind::Transient);
        assert_eq!(FailureKind::from_status(400), FailureKind::Terminal);
        assert_eq!(FailureKind::from_status(404), FailureKind::Terminal);
        assert_eq!(FailureKind::from_status(422), FailureKind::Terminal);
    }

    #[test]
    fn test_single_transient_replay_by_default() {
        let policy = RetryPolicy::default();
        let mut state = RetryState::default();

        assert_eq!(
            state.next_step(&policy, FailureKind::Transient),
            Step::BackoffAndReplay(Duration::from_millis(1000))
        );
        assert_eq!(state.next_step(&policy, FailureKind::Transient), Step::Fail);
    }

    #[test]
    fn test_single_refresh_per_call() {
        let policy = RetryPolicy::default();
        let mut state = RetryState::default();

        assert_eq!(
            state.next_step(&policy, FailureKind::Unauthorized),
            Step::RefreshAndReplay
        );
        assert_eq!(state.next_step(&policy, FailureKind::Unauthorized), Step::Fail);
    }

    #[test]
    fn test_budgets_are_independent() {
        let policy = RetryPolicy::default();
        let mut state = RetryState::default();

        assert_eq!(
            state.next_step(&policy, FailureKind::Unauthorized),
            Step::RefreshAndReplay
        );
        assert!(matches!(
            state.next_step(&policy, FailureKind::Transient),
            Step::BackoffAndReplay(_)
        ));
        assert_eq!(state.replays(), 2);
    }

    #[test]
    fn test_terminal_and_disabled() {
        let mut state = RetryState::default();
        assert_eq!(
            state.next_step(&RetryPolicy::default(), FailureKind::Terminal),
            Step::Fail
        );

        let mut state = RetryState::default();
        let disabled = RetryPolicy::disabled();
        assert_eq!(state.next_step(&disabled, FailureKind::Unauthorized), Step::Fail);
        assert_eq!(state.next_step(&disabled, FailureKind::Transient), Step::Fail);
    }

    #[test]
    fn test_custom_budget() {
        let policy = RetryPolicy::with_max_retries(3);
        let mut state = RetryState::default();
        let delays: Vec<_> = (0..4)
            .map(|_| state.next_step(&policy, FailureKind::Transient))
            .collect();

        assert_eq!(
            delays,
            vec![
                Step::BackoffAndReplay(Duration::from_millis(1000)),
                Step::BackoffAndReplay(Duration::from_millis(2000)),
                Step::BackoffAndReplay(Duration::from_millis(4000)),
                Step::Fail,
            ]
        );
    }
}
