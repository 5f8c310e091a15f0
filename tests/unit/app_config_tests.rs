/*!
 * Tests for configuration loading, saving and validation
 */

use subsyncer::app_config::{Config, LogLevel, MatchConfig, MAX_PROFILES};
use subsyncer::errors::ConfigError;
use crate::common;

/// Test that a saved configuration loads back unchanged
#[test]
fn test_saveThenLoad_withCustomProfiles_shouldPreserveValues() -> anyhow::Result<()> {
    let dir = common::create_temp_dir()?;
    let path = dir.path().join("subsyncer.json");

    let mut config = Config::default();
    config.profiles.push(MatchConfig::new(50, 8_000, 3, 20_000, 0.2, 8)?);
    config.output.write_json_report = true;
    config.reference.redownload = false;
    config.log_level = LogLevel::Debug;
    config.save(&path)?;

    let loaded = Config::load(&path)?;

    assert_eq!(loaded.profiles, config.profiles);
    assert!(loaded.output.write_json_report);
    assert!(!loaded.reference.redownload);
    assert_eq!(loaded.log_level, LogLevel::Debug);
    Ok(())
}

/// Test that an empty JSON object yields the documented defaults
#[test]
fn test_load_withEmptyObject_shouldUseDefaults() -> anyhow::Result<()> {
    let dir = common::create_temp_dir()?;
    let path = common::create_test_file(dir.path(), "subsyncer.json", "{}")?;

    let config = Config::load(&path)?;

    assert_eq!(config.profiles, vec![MatchConfig::default()]);
    assert!(config.output.watermark);
    assert!(!config.output.overwrite);
    assert!((config.output.low_match_rate - 0.8).abs() < f64::EPSILON);
    assert_eq!(config.reference.timeout_secs, 30);
    assert_eq!(config.caption.exclude_pattern, None);
    assert_eq!(config.log_level, LogLevel::Info);
    Ok(())
}

#[test]
fn test_load_withNegativeMergeGap_shouldFailValidation() -> anyhow::Result<()> {
    let dir = common::create_temp_dir()?;
    let path = common::create_test_file(
        dir.path(),
        "subsyncer.json",
        r#"{ "profiles": [ { "multiline_merge_max_offset_ms": -1 } ] }"#,
    )?;

    let err = Config::load(&path).unwrap_err();

    assert!(format!("{:#}", err).contains("multiline_merge_max_offset_ms"));
    Ok(())
}

#[test]
fn test_load_withMissingFile_shouldFail() -> anyhow::Result<()> {
    let dir = common::create_temp_dir()?;

    assert!(Config::load(dir.path().join("absent.json")).is_err());
    Ok(())
}

#[test]
fn test_validate_withNoProfiles_shouldFail() {
    let config = Config {
        profiles: Vec::new(),
        ..Default::default()
    };

    assert!(matches!(config.validate(), Err(ConfigError::NoProfiles)));
}

#[test]
fn test_validate_withMaximumProfiles_shouldPass() {
    let config = Config {
        profiles: vec![MatchConfig::default(); MAX_PROFILES],
        ..Default::default()
    };

    assert!(config.validate().is_ok());
}

#[test]
fn test_validate_withLowMatchRateAboveOne_shouldFail() {
    let mut config = Config::default();
    config.output.low_match_rate = 1.2;

    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidValue { field: "low_match_rate", .. })
    ));
}

#[test]
fn test_exclusionRegex_withEmptyPattern_shouldBeNone() -> anyhow::Result<()> {
    let mut config = Config::default();
    config.caption.exclude_pattern = Some(String::new());

    assert!(config.caption.exclusion_regex()?.is_none());

    config.caption.exclude_pattern = Some("Comment:".to_string());
    let regex = config.caption.exclusion_regex()?.expect("pattern should compile");
    assert!(regex.is_match("Comment: 0,0:00:01.00"));
    Ok(())
}

#[test]
fn test_logLevel_toLevelFilter_shouldMapEveryLevel() {
    assert_eq!(LogLevel::Error.to_level_filter(), log::LevelFilter::Error);
    assert_eq!(LogLevel::Warn.to_level_filter(), log::LevelFilter::Warn);
    assert_eq!(LogLevel::Info.to_level_filter(), log::LevelFilter::Info);
    assert_eq!(LogLevel::Debug.to_level_filter(), log::LevelFilter::Debug);
    assert_eq!(LogLevel::Trace.to_level_filter(), log::LevelFilter::Trace);
}
