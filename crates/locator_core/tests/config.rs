use chrono::NaiveDate;
use locator_core::{ConfigError, DateRange, LocatorConfig};
use pretty_assertions::assert_eq;

#[test]
fn defaults_validate_for_both_builtin_locales() {
    let mut config = LocatorConfig::default();
    assert!(config.validate().is_ok());
    config.locale = "en".to_string();
    let profile = config.locale_profile().unwrap();
    assert_eq!(profile.lexicon.match_text("Shops"), Some(1));
    assert!(profile.postal_pattern.is_match("1000-001"));
}

#[test]
fn portuguese_postal_pattern_rejects_leading_zero() {
    let profile = LocatorConfig::default().locale_profile().unwrap();
    let found: Vec<_> = profile
        .postal_pattern
        .find_iter("0999-123 and 4700-123")
        .map(|m| m.as_str())
        .collect();
    assert_eq!(found, vec!["4700-123"]);
}

#[test]
fn partial_ron_file_keeps_defaults() {
    let text = r#"(
        locale: "en",
        max_attempts: 3,
        backoff_secs: 1,
    )"#;
    let config: LocatorConfig = ron::from_str(text).unwrap();
    assert_eq!(config.locale, "en");
    assert_eq!(config.max_attempts, 3);
    assert_eq!(config.http.request_timeout_secs, 30);
    assert_eq!(config.retry_policy().unwrap().backoff.as_secs(), 1);
}

#[test]
fn custom_lexicon_from_ron() {
    let text = r#"(
        locale: "fr",
        lexicons: { "fr": { 1: "magasin", 4: "Contact" } },
        postal_patterns: { "fr": "[0-9]{5}" },
    )"#;
    let config: LocatorConfig = ron::from_str(text).unwrap();
    let profile = config.locale_profile().unwrap();
    assert_eq!(profile.lexicon.match_text("Nos MAGASINS"), Some(1));
    assert_eq!(profile.lexicon.match_text("contactez-nous"), Some(4));
}

#[test]
fn configuration_errors_fail_fast() {
    let config = LocatorConfig {
        locale: "de".to_string(),
        ..LocatorConfig::default()
    };
    assert_eq!(
        config.validate(),
        Err(ConfigError::UnknownLocale("de".to_string()))
    );

    let config = LocatorConfig {
        max_attempts: 0,
        ..LocatorConfig::default()
    };
    assert_eq!(config.validate(), Err(ConfigError::InvalidRetryBudget));

    let config = LocatorConfig {
        batch_concurrency: 0,
        ..LocatorConfig::default()
    };
    assert_eq!(config.validate(), Err(ConfigError::InvalidConcurrency));

    let mut config = LocatorConfig::default();
    config
        .postal_patterns
        .insert("pt".to_string(), "[0-9".to_string());
    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidPostalPattern { .. })
    ));
}

#[test]
fn date_range_counts_days_inclusively() {
    let start = NaiveDate::from_ymd_opt(2022, 5, 1).unwrap();
    let end = NaiveDate::from_ymd_opt(2022, 5, 3).unwrap();
    assert_eq!(DateRange::new(start, end).unwrap().days(), 3);
    assert_eq!(DateRange::new(start, start).unwrap().days(), 1);
    assert_eq!(
        DateRange::new(end, start),
        Err(ConfigError::InvalidDateRange { start: end, end: start })
    );
}
