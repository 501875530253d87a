use chrono::NaiveDate;
use thiserror::Error;

/// Invalid configuration. Never retried; surfaced to the caller as-is.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid keyword lexicon: {0}")]
    InvalidLexicon(String),
    #[error("retry budget must allow at least one attempt")]
    InvalidRetryBudget,
    #[error("unknown locale '{0}'")]
    UnknownLocale(String),
    #[error("invalid postal code pattern for locale '{locale}': {message}")]
    InvalidPostalPattern { locale: String, message: String },
    #[error("date range ends ({end}) before it starts ({start})")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },
    #[error("invalid base url for {service}: {message}")]
    InvalidBaseUrl { service: &'static str, message: String },
    #[error("missing api key for {0}")]
    MissingApiKey(&'static str),
    #[error("batch concurrency must be at least 1")]
    InvalidConcurrency,
}
