use std::fmt;
use std::time::Duration;

use crate::ConfigError;

/// Result of one retried external call.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome<T> {
    Success(T),
    Failure { reason: FetchError, attempts: u32 },
}

impl<T> FetchOutcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, FetchOutcome::Success(_))
    }

    pub fn attempts(&self) -> Option<u32> {
        match self {
            FetchOutcome::Success(_) => None,
            FetchOutcome::Failure { attempts, .. } => Some(*attempts),
        }
    }

    pub fn into_result(self) -> Result<T, FetchError> {
        match self {
            FetchOutcome::Success(value) => Ok(value),
            FetchOutcome::Failure { reason, .. } => Err(reason),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> FetchOutcome<U> {
        match self {
            FetchOutcome::Success(value) => FetchOutcome::Success(f(value)),
            FetchOutcome::Failure { reason, attempts } => FetchOutcome::Failure { reason, attempts },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn is_transient(&self) -> bool {
        self.kind.is_transient()
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{}: {}", self.kind, self.message)
        }
    }
}

impl std::error::Error for FetchError {}

/// Failure classification reported by a fetch operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    Network,
    Timeout,
    HttpStatus(u16),
    InvalidUrl,
    InvalidInput,
    MalformedResponse,
    MissingField(String),
    NotFound,
}

impl FailureKind {
    /// Transport failures and server-side statuses are worth another attempt.
    pub fn is_transient(&self) -> bool {
        match self {
            FailureKind::Network | FailureKind::Timeout => true,
            FailureKind::HttpStatus(code) => *code >= 500 || *code == 408 || *code == 429,
            FailureKind::InvalidUrl
            | FailureKind::InvalidInput
            | FailureKind::MalformedResponse
            | FailureKind::MissingField(_)
            | FailureKind::NotFound => false,
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::InvalidInput => write!(f, "invalid input"),
            FailureKind::MalformedResponse => write!(f, "malformed response"),
            FailureKind::MissingField(field) => write!(f, "missing field {field}"),
            FailureKind::NotFound => write!(f, "no result"),
        }
    }
}

/// Bounded retry budget with a fixed pause between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff: Duration) -> Result<Self, ConfigError> {
        let policy = Self {
            max_attempts,
            backoff,
        };
        policy.validate()?;
        Ok(policy)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_attempts == 0 {
            return Err(ConfigError::InvalidRetryBudget);
        }
        Ok(())
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            backoff: Duration::from_secs(2),
        }
    }
}
