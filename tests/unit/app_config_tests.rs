/*!
 * Tests for application configuration functionality
 */

use std::path::PathBuf;

use retitle::app_config::{Config, LogLevel};
use retitle::errors::ConfigError;
use retitle::migration::{MigrationPlan, StepAction};

use crate::common::{create_temp_dir, create_test_file};

#[test]
fn test_default_config_shouldRunBuiltInPlan() {
    let config = Config::default();

    assert_eq!(config.database_path, None);
    assert_eq!(config.log_level, LogLevel::Info);
    assert_eq!(config.plan, MigrationPlan::default_bible_versions());
    assert!(config.validate().is_ok());
}

#[test]
fn test_load_withMissingFile_shouldReturnDefaults() {
    let dir = create_temp_dir().unwrap();

    let config = Config::load(dir.path().join("absent.json")).unwrap();

    assert_eq!(config, Config::default());
    assert!(!dir.path().join("absent.json").exists());
}

#[test]
fn test_load_withPartialFile_shouldFillDefaults() {
    let dir = create_temp_dir().unwrap();
    let path = create_test_file(
        dir.path(),
        "retitle.json",
        r#"{ "database_path": "/srv/corpus.db", "log_level": "debug" }"#,
    )
    .unwrap();

    let config = Config::load(&path).unwrap();

    assert_eq!(config.database_path, Some(PathBuf::from("/srv/corpus.db")));
    assert_eq!(config.log_level, LogLevel::Debug);
    assert_eq!(config.plan.steps.len(), 12);
}

#[test]
fn test_load_withCustomPlan_shouldReplaceBuiltIn() {
    let dir = create_temp_dir().unwrap();
    let path = create_test_file(
        dir.path(),
        "retitle.json",
        r#"{
            "plan": {
                "name": "english-fix",
                "steps": [
                    { "description": "fixing typo", "kind": "rename_texts", "from": "Sonicno", "to": "Soncino", "language": "en" },
                    { "kind": "rename_history", "from": "Sonicno", "to": "Soncino", "language": "en" },
                    { "kind": "delete_texts", "title": "Scratch", "language": "en" }
                ]
            }
        }"#,
    )
    .unwrap();

    let config = Config::load(&path).unwrap();

    assert_eq!(config.plan.name, "english-fix");
    assert_eq!(config.plan.steps.len(), 3);
    assert_eq!(config.plan.steps[0].description.as_deref(), Some("fixing typo"));
    assert_eq!(config.plan.steps[1].description, None);
    assert!(matches!(
        config.plan.steps[2].action,
        StepAction::DeleteTexts { ref title, .. } if title == "Scratch"
    ));
    assert!(config.validate().is_ok());
}

#[test]
fn test_load_withMalformedJson_shouldReportParseError() {
    let dir = create_temp_dir().unwrap();
    let path = create_test_file(dir.path(), "retitle.json", "{ not json").unwrap();

    let err = Config::load(&path).unwrap_err();

    assert!(matches!(err, ConfigError::Parse { .. }));
}

#[test]
fn test_validate_withInvalidStep_shouldFail() {
    let dir = create_temp_dir().unwrap();
    let path = create_test_file(
        dir.path(),
        "retitle.json",
        r#"{ "plan": { "name": "bad", "steps": [ { "kind": "rename_texts", "from": "A", "to": "A", "language": "he" } ] } }"#,
    )
    .unwrap();

    let config = Config::load(&path).unwrap();

    assert!(matches!(config.validate(), Err(ConfigError::Plan(_))));
}
