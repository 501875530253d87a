use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{Datelike, NaiveDate};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{ConfigError, KeywordLexicon, RetryPolicy};

pub const ZIPCODEBASE_KEY_VAR: &str = "ZIPCODEBASE_API_KEY";
pub const METEOSTAT_KEY_VAR: &str = "METEOSTAT_API_KEY";

/// Run configuration, usually read from a RON file.
///
/// Every field has a default so a config file only needs to name what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocatorConfig {
    pub locale: String,
    pub zipcode_api_key: String,
    pub meteostat_api_key: String,
    pub max_attempts: u32,
    pub backoff_secs: u64,
    pub batch_concurrency: usize,
    pub lexicons: BTreeMap<String, BTreeMap<u32, String>>,
    pub postal_patterns: BTreeMap<String, String>,
    pub http: HttpConfig,
    pub zipcode_base_url: String,
    pub meteostat_base_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 10,
            request_timeout_secs: 30,
        }
    }
}

impl Default for LocatorConfig {
    fn default() -> Self {
        let lexicons = [
            ("pt", KeywordLexicon::portuguese()),
            ("en", KeywordLexicon::english()),
        ]
        .into_iter()
        .map(|(locale, lexicon)| {
            let table = lexicon
                .iter()
                .map(|(rank, keyword)| (rank, keyword.to_string()))
                .collect();
            (locale.to_string(), table)
        })
        .collect();

        let postal_patterns = [("pt", "[1-9][0-9]{3}-[0-9]{3}"), ("en", "[0-9]{4}-[0-9]{3}")]
            .into_iter()
            .map(|(locale, pattern)| (locale.to_string(), pattern.to_string()))
            .collect();

        Self {
            locale: "pt".to_string(),
            zipcode_api_key: String::new(),
            meteostat_api_key: String::new(),
            max_attempts: 5,
            backoff_secs: 2,
            batch_concurrency: 1,
            lexicons,
            postal_patterns,
            http: HttpConfig::default(),
            zipcode_base_url: "https://app.zipcodebase.com".to_string(),
            meteostat_base_url: "https://meteostat.p.rapidapi.com".to_string(),
        }
    }
}

/// Lexicon and postal code pattern for one locale.
#[derive(Debug, Clone)]
pub struct LocaleProfile {
    pub locale: String,
    pub lexicon: KeywordLexicon,
    pub postal_pattern: Regex,
}

impl LocatorConfig {
    /// Api keys set in the environment replace the configured ones.
    pub fn with_env_overrides(mut self) -> Self {
        self.apply_overrides(|name| std::env::var(name).ok());
        self
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup(ZIPCODEBASE_KEY_VAR).filter(|k| !k.is_empty()) {
            self.zipcode_api_key = key;
        }
        if let Some(key) = lookup(METEOSTAT_KEY_VAR).filter(|k| !k.is_empty()) {
            self.meteostat_api_key = key;
        }
    }

    pub fn locale_profile(&self) -> Result<LocaleProfile, ConfigError> {
        let locale = self.locale.as_str();
        let table = self
            .lexicons
            .get(locale)
            .ok_or_else(|| ConfigError::UnknownLocale(locale.to_string()))?;
        let lexicon = KeywordLexicon::new(table.iter().map(|(rank, kw)| (*rank, kw.as_str())))?;

        let pattern = self
            .postal_patterns
            .get(locale)
            .ok_or_else(|| ConfigError::UnknownLocale(locale.to_string()))?;
        let postal_pattern =
            Regex::new(pattern).map_err(|err| ConfigError::InvalidPostalPattern {
                locale: locale.to_string(),
                message: err.to_string(),
            })?;

        Ok(LocaleProfile {
            locale: locale.to_string(),
            lexicon,
            postal_pattern,
        })
    }

    pub fn retry_policy(&self) -> Result<RetryPolicy, ConfigError> {
        RetryPolicy::new(self.max_attempts, Duration::from_secs(self.backoff_secs))
    }

    pub fn concurrency(&self) -> Result<usize, ConfigError> {
        if self.batch_concurrency == 0 {
            return Err(ConfigError::InvalidConcurrency);
        }
        Ok(self.batch_concurrency)
    }

    /// Checks every derived setting without building anything long-lived.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.locale_profile()?;
        self.retry_policy()?;
        self.concurrency()?;
        Ok(())
    }
}

/// Inclusive range of calendar days for weather observations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ConfigError> {
        if end < start {
            return Err(ConfigError::InvalidDateRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// From the first day of yesterday's month up to yesterday.
    pub fn month_to_yesterday(today: NaiveDate) -> Self {
        let end = today.pred_opt().unwrap_or(today);
        let start = end.with_day(1).unwrap_or(end);
        Self { start, end }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn days(&self) -> u32 {
        (self.end - self.start).num_days() as u32 + 1
    }

    /// Consecutive sub-ranges of at most `max_days` days covering this range.
    pub fn split(&self, max_days: u32) -> Vec<DateRange> {
        let step = chrono::Days::new(u64::from(max_days.max(1)) - 1);
        let mut windows = Vec::new();
        let mut start = self.start;
        while start <= self.end {
            let end = start
                .checked_add_days(step)
                .map_or(self.end, |end| end.min(self.end));
            windows.push(DateRange { start, end });
            match end.succ_opt() {
                Some(next) => start = next,
                None => break,
            }
        }
        windows
    }
}
