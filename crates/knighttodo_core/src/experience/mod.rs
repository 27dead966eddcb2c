//! Experience-award collaborator.
//!
//! # Responsibility
//! - Define the injected client contract used by the routine ready transition.
//! - Own the wire shapes exchanged with the remote experience service.
//! - Make retry/backoff an explicit policy instead of a hidden behavior.
//!
//! # Invariants
//! - A returned award is always non-negative.
//! - Failures are distinguishable: transport, timeout, status, bad body.

mod http;

pub use http::HttpExperienceClient;

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Body posted to the experience service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperienceRequest {
    pub todo_id: Uuid,
    /// Not populated yet; serialized as `null`.
    pub user_id: Option<Uuid>,
}

impl ExperienceRequest {
    pub fn for_todo(todo_id: Uuid) -> Self {
        Self {
            todo_id,
            user_id: None,
        }
    }
}

/// Raw response body; validated into a `u32` award.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ExperienceResponse {
    pub experience: i64,
}

impl ExperienceResponse {
    pub(crate) fn into_award(self) -> Result<u32, ExperienceError> {
        u32::try_from(self.experience).map_err(|_| {
            ExperienceError::InvalidResponse(format!(
                "experience must be a non-negative integer, got {}",
                self.experience
            ))
        })
    }
}

/// Experience client failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExperienceError {
    /// Connection could not be established or was interrupted.
    Transport(String),
    /// No response within the configured timeout.
    Timeout,
    /// Remote answered with a non-success status.
    Status(u16),
    /// Response body is not a valid award.
    InvalidResponse(String),
    /// Client could not be constructed from the given settings.
    Misconfigured(String),
}

impl ExperienceError {
    /// Whether another attempt may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(_) | Self::Timeout => true,
            Self::Status(code) => *code >= 500,
            Self::InvalidResponse(_) | Self::Misconfigured(_) => false,
        }
    }

    /// Stable label used in log events.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Transport(_) => "transport",
            Self::Timeout => "timeout",
            Self::Status(_) => "status",
            Self::InvalidResponse(_) => "invalid_response",
            Self::Misconfigured(_) => "misconfigured",
        }
    }
}

impl Display for ExperienceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transport(message) => write!(f, "experience service unreachable: {message}"),
            Self::Timeout => write!(f, "experience service timed out"),
            Self::Status(code) => write!(f, "experience service answered status {code}"),
            Self::InvalidResponse(message) => {
                write!(f, "invalid experience service response: {message}")
            }
            Self::Misconfigured(message) => {
                write!(f, "experience client misconfigured: {message}")
            }
        }
    }
}

impl Error for ExperienceError {}

/// Contract for awarding experience to a completed todo instance.
pub trait ExperienceClient {
    /// Requests the award for `todo_id`. Called once per ready transition.
    fn award(&self, todo_id: Uuid) -> Result<u32, ExperienceError>;
}

impl<T: ExperienceClient + ?Sized> ExperienceClient for &T {
    fn award(&self, todo_id: Uuid) -> Result<u32, ExperienceError> {
        (**self).award(todo_id)
    }
}

impl<T: ExperienceClient + ?Sized> ExperienceClient for Arc<T> {
    fn award(&self, todo_id: Uuid) -> Result<u32, ExperienceError> {
        (**self).award(todo_id)
    }
}

/// Retry policy for remote award calls.
///
/// `max_attempts` counts the first call; the default of one means no retry.
/// The delay before attempt `n + 1` is `backoff * 2^(n - 1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 1,
            backoff: Duration::from_millis(200),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }

    /// Delay to wait after failed attempt `attempt` (1-based), or `None`
    /// when the error or the attempt budget forbids another try.
    pub fn next_delay(&self, attempt: u32, error: &ExperienceError) -> Option<Duration> {
        if attempt >= self.max_attempts || !error.is_transient() {
            return None;
        }
        let factor = 1u32.checked_shl(attempt.saturating_sub(1)).unwrap_or(u32::MAX);
        Some(self.backoff.saturating_mul(factor))
    }

    /// Runs `call` until it succeeds, fails permanently, or the budget runs out.
    pub fn run<T>(
        &self,
        mut call: impl FnMut(u32) -> Result<T, ExperienceError>,
    ) -> Result<T, ExperienceError> {
        let mut attempt = 1;
        loop {
            match call(attempt) {
                Ok(value) => return Ok(value),
                Err(err) => match self.next_delay(attempt, &err) {
                    Some(delay) => {
                        log::warn!(
                            "event=experience_retry module=experience status=retry attempt={} kind={} delay_ms={}",
                            attempt,
                            err.kind(),
                            delay.as_millis()
                        );
                        std::thread::sleep(delay);
                        attempt += 1;
                    }
                    None => return Err(err),
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ExperienceError, ExperienceRequest, ExperienceResponse, RetryPolicy};
    use std::cell::Cell;
    use std::time::Duration;
    use uuid::Uuid;

    #[test]
    fn default_policy_is_single_attempt() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 1);
        assert_eq!(policy.next_delay(1, &ExperienceError::Timeout), None);
    }

    #[test]
    fn backoff_doubles_per_attempt() {
        let policy = RetryPolicy::new(4, Duration::from_millis(10));
        let err = ExperienceError::Status(503);
        assert_eq!(policy.next_delay(1, &err), Some(Duration::from_millis(10)));
        assert_eq!(policy.next_delay(2, &err), Some(Duration::from_millis(20)));
        assert_eq!(policy.next_delay(3, &err), Some(Duration::from_millis(40)));
        assert_eq!(policy.next_delay(4, &err), None);
    }

    #[test]
    fn client_errors_are_not_retried() {
        let policy = RetryPolicy::new(3, Duration::ZERO);
        assert_eq!(policy.next_delay(1, &ExperienceError::Status(404)), None);
        assert_eq!(
            policy.next_delay(1, &ExperienceError::InvalidResponse("x".to_string())),
            None
        );
    }

    #[test]
    fn zero_attempts_is_clamped_to_one() {
        assert_eq!(RetryPolicy::new(0, Duration::ZERO).max_attempts, 1);
    }

    #[test]
    fn run_stops_after_first_success() {
        let policy = RetryPolicy::new(3, Duration::ZERO);
        let calls = Cell::new(0);
        let result = policy.run(|attempt| {
            calls.set(calls.get() + 1);
            if attempt < 2 {
                Err(ExperienceError::Timeout)
            } else {
                Ok(7)
            }
        });
        assert_eq!(result, Ok(7));
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn run_returns_last_error_when_budget_is_spent() {
        let policy = RetryPolicy::new(2, Duration::ZERO);
        let calls = Cell::new(0);
        let result: Result<u32, _> = policy.run(|_| {
            calls.set(calls.get() + 1);
            Err(ExperienceError::Transport("refused".to_string()))
        });
        assert_eq!(
            result,
            Err(ExperienceError::Transport("refused".to_string()))
        );
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn negative_award_is_rejected() {
        let err = ExperienceResponse { experience: -1 }
            .into_award()
            .expect_err("negative experience must be rejected");
        assert!(matches!(err, ExperienceError::InvalidResponse(_)));
    }

    #[test]
    fn request_uses_camel_case_and_null_user() {
        let todo_id = Uuid::nil();
        let body = serde_json::to_value(ExperienceRequest::for_todo(todo_id)).unwrap();
        assert_eq!(
            body,
            serde_json::json!({ "todoId": todo_id.to_string(), "userId": null })
        );
    }
}
